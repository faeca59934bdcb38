//! Form rendering to HTML
//!
//! Renders [`FormBuilder`]s with escaping and inline validation errors.
//! Checkbox groups render as a list of `<input type="checkbox">` sharing one
//! name, so the browser submits one `name=value` pair per checked box.

use std::fmt::Write;

use super::builder::FormBuilder;
use super::error::{FieldError, ValidationErrors};
use super::field::{FieldKind, FormField, InputType, SelectOption};

/// Renders forms to HTML
#[derive(Debug)]
pub struct FormRenderer;

impl FormRenderer {
    /// Render a form to an HTML string
    #[must_use]
    pub fn render(form: &FormBuilder<'_>) -> String {
        let mut html = String::with_capacity(1024);

        html.push_str("<form");
        write_attr(&mut html, "action", &form.action);
        write_attr(&mut html, "method", &form.method);
        if let Some(ref class) = form.class {
            write_attr(&mut html, "class", class);
        }
        if let Some(ref url) = form.htmx.get {
            write_attr(&mut html, "hx-get", url);
        }
        if let Some(ref target) = form.htmx.target {
            write_attr(&mut html, "hx-target", target);
        }
        if let Some(ref trigger) = form.htmx.trigger {
            write_attr(&mut html, "hx-trigger", trigger);
        }
        if form.htmx.push_url {
            write_attr(&mut html, "hx-push-url", "true");
        }
        html.push_str(">\n");

        if let Some(errors) = form.errors {
            Self::render_errors(&mut html, errors.non_field(), "  ");
        }

        for field in &form.fields {
            Self::render_field(&mut html, field, form.errors);
        }

        if let Some(ref text) = form.submit_text {
            let _ = writeln!(
                html,
                r#"  <button type="submit" class="form-submit">{}</button>"#,
                escape_html(text)
            );
        }

        html.push_str("</form>");
        html
    }

    fn render_field(html: &mut String, field: &FormField, errors: Option<&ValidationErrors>) {
        if field.is_hidden() {
            html.push_str("  <input");
            write_attr(html, "type", InputType::Hidden.as_str());
            write_attr(html, "name", &field.name);
            write_attr(html, "value", field.value.as_deref().unwrap_or_default());
            html.push_str(">\n");
            return;
        }

        let field_errors = errors.map_or(&[][..], |e| e.for_field(&field.name));
        let has_errors = !field_errors.is_empty();
        let id = field.element_id();

        html.push_str("  <div class=\"form-group\">\n");

        let is_checkbox = matches!(field.kind, FieldKind::Checkbox { .. });
        if let Some(ref label) = field.label {
            if !is_checkbox {
                let _ = writeln!(
                    html,
                    r#"    <label for="{}" class="form-label">{}</label>"#,
                    escape_attr(&id),
                    escape_html(label)
                );
            }
        }

        match &field.kind {
            FieldKind::Input(input_type) => {
                Self::render_input(html, field, *input_type, &id, has_errors);
            }
            FieldKind::Select { options } => {
                Self::render_select(html, field, options, &id, has_errors);
            }
            FieldKind::Checkbox { checked } => Self::render_checkbox(html, field, *checked, &id),
            FieldKind::CheckboxGroup { options, selected } => {
                Self::render_checkbox_group(html, field, options, selected, &id);
            }
        }

        Self::render_errors(html, field_errors, "    ");

        if let Some(ref help) = field.help_text {
            let _ = writeln!(html, r#"    <span class="form-help">{}</span>"#, escape_html(help));
        }

        html.push_str("  </div>\n");
    }

    fn render_errors(html: &mut String, errors: &[FieldError], indent: &str) {
        for error in errors {
            let _ = writeln!(
                html,
                r#"{indent}<span class="form-error">{}</span>"#,
                escape_html(&error.message)
            );
        }
    }

    fn render_input(
        html: &mut String,
        field: &FormField,
        input_type: InputType,
        id: &str,
        has_errors: bool,
    ) {
        html.push_str("    <input");
        write_attr(html, "type", input_type.as_str());
        write_attr(html, "name", &field.name);
        write_attr(html, "id", id);
        write_attr(html, "class", input_class(has_errors));

        // Password values are never echoed back.
        if input_type != InputType::Password {
            if let Some(ref value) = field.value {
                write_attr(html, "value", value);
            }
        }
        if let Some(ref placeholder) = field.placeholder {
            write_attr(html, "placeholder", placeholder);
        }
        if let Some(len) = field.max_length {
            write_attr(html, "maxlength", &len.to_string());
        }
        if let Some(ref autocomplete) = field.autocomplete {
            write_attr(html, "autocomplete", autocomplete);
        }
        if field.flags.required {
            html.push_str(" required");
        }
        if field.flags.autofocus {
            html.push_str(" autofocus");
        }
        html.push_str(">\n");
    }

    fn render_select(
        html: &mut String,
        field: &FormField,
        options: &[SelectOption],
        id: &str,
        has_errors: bool,
    ) {
        html.push_str("    <select");
        write_attr(html, "name", &field.name);
        write_attr(html, "id", id);
        write_attr(html, "class", input_class(has_errors));
        if field.flags.required {
            html.push_str(" required");
        }
        html.push_str(">\n");

        for option in options {
            html.push_str("      <option");
            write_attr(html, "value", &option.value);
            if field.value.as_deref() == Some(option.value.as_str()) {
                html.push_str(" selected");
            }
            let _ = writeln!(html, ">{}</option>", escape_html(&option.label));
        }

        html.push_str("    </select>\n");
    }

    fn render_checkbox(html: &mut String, field: &FormField, checked: bool, id: &str) {
        html.push_str("    <input");
        write_attr(html, "type", "checkbox");
        write_attr(html, "name", &field.name);
        write_attr(html, "id", id);
        write_attr(html, "value", "on");
        if checked {
            html.push_str(" checked");
        }
        html.push('>');
        if let Some(ref label) = field.label {
            let _ = write!(
                html,
                r#" <label for="{}" class="form-label">{}</label>"#,
                escape_attr(id),
                escape_html(label)
            );
        }
        html.push('\n');
    }

    fn render_checkbox_group(
        html: &mut String,
        field: &FormField,
        options: &[SelectOption],
        selected: &[String],
        id: &str,
    ) {
        let _ = writeln!(html, r#"    <div id="{}" class="checkbox-group">"#, escape_attr(id));
        for (i, option) in options.iter().enumerate() {
            let option_id = format!("{id}_{i}");
            html.push_str("      <div class=\"form-check\"><input");
            write_attr(html, "type", "checkbox");
            write_attr(html, "name", &field.name);
            write_attr(html, "id", &option_id);
            write_attr(html, "value", &option.value);
            if selected.contains(&option.value) {
                html.push_str(" checked");
            }
            let _ = writeln!(
                html,
                r#"> <label for="{}">{}</label></div>"#,
                escape_attr(&option_id),
                escape_html(&option.label)
            );
        }
        html.push_str("    </div>\n");
    }
}

const fn input_class(has_errors: bool) -> &'static str {
    if has_errors {
        "form-input form-input-error"
    } else {
        "form-input"
    }
}

fn write_attr(html: &mut String, name: &str, value: &str) {
    html.push(' ');
    html.push_str(name);
    html.push_str("=\"");
    html.push_str(&escape_attr(value));
    html.push('"');
}

/// Escape a string for use inside a double-quoted attribute
#[must_use]
pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape a string for use in HTML text content
#[must_use]
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
