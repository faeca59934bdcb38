//! Form builder API with fluent interface

use super::error::ValidationErrors;
use super::field::{FieldKind, FormField, InputType, SelectOption};
use super::render::FormRenderer;
use crate::middleware::csrf::CSRF_FORM_FIELD;

/// Builder for HTML forms
///
/// # Examples
///
/// ```rust
/// use taxi_service::forms::{FormBuilder, InputType};
///
/// let html = FormBuilder::new("/manufacturers/create/", "post")
///     .field("name", InputType::Text)
///         .label("Name")
///         .required()
///         .max_length(255)
///         .done()
///     .field("country", InputType::Text)
///         .label("Country")
///         .required()
///         .done()
///     .submit("Create")
///     .build();
///
/// assert!(html.contains(r#"name="country""#));
/// ```
#[derive(Debug, Clone)]
pub struct FormBuilder<'a> {
    pub(crate) action: String,
    pub(crate) method: String,
    pub(crate) class: Option<String>,
    pub(crate) fields: Vec<FormField>,
    pub(crate) submit_text: Option<String>,
    pub(crate) errors: Option<&'a ValidationErrors>,
    pub(crate) htmx: HtmxFormAttrs,
}

/// HTMX attributes for the form element
#[derive(Debug, Clone, Default)]
pub struct HtmxFormAttrs {
    /// hx-get URL
    pub get: Option<String>,
    /// hx-target selector
    pub target: Option<String>,
    /// hx-trigger event
    pub trigger: Option<String>,
    /// hx-push-url
    pub push_url: bool,
}

impl<'a> FormBuilder<'a> {
    /// New form posting to `action` with `method`
    #[must_use]
    pub fn new(action: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            method: method.into(),
            class: None,
            fields: Vec::new(),
            submit_text: None,
            errors: None,
            htmx: HtmxFormAttrs::default(),
        }
    }

    /// Set the form CSS class
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Validation errors to display next to fields
    #[must_use]
    pub const fn errors(mut self, errors: &'a ValidationErrors) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Submit button text
    #[must_use]
    pub fn submit(mut self, text: impl Into<String>) -> Self {
        self.submit_text = Some(text.into());
        self
    }

    /// Swap `target` with the result of a GET to `url` on `trigger`,
    /// pushing the URL to the history
    #[must_use]
    pub fn htmx_live_search(
        mut self,
        url: impl Into<String>,
        target: impl Into<String>,
        trigger: impl Into<String>,
    ) -> Self {
        self.htmx = HtmxFormAttrs {
            get: Some(url.into()),
            target: Some(target.into()),
            trigger: Some(trigger.into()),
            push_url: true,
        };
        self
    }

    /// Start an input field
    #[must_use]
    pub fn field(self, name: impl Into<String>, input_type: InputType) -> FieldBuilder<'a> {
        FieldBuilder::new(self, FormField::input(name, input_type))
    }

    /// Start a select field
    #[must_use]
    pub fn select(self, name: impl Into<String>) -> FieldBuilder<'a> {
        FieldBuilder::new(self, FormField::select(name))
    }

    /// Start a single checkbox
    #[must_use]
    pub fn checkbox(self, name: impl Into<String>) -> FieldBuilder<'a> {
        FieldBuilder::new(self, FormField::checkbox(name))
    }

    /// Start a checkbox group
    #[must_use]
    pub fn checkbox_group(self, name: impl Into<String>) -> FieldBuilder<'a> {
        FieldBuilder::new(self, FormField::checkbox_group(name))
    }

    /// Add a hidden field
    #[must_use]
    pub fn hidden(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut field = FormField::input(name, InputType::Hidden);
        field.value = Some(value.into());
        self.fields.push(field);
        self
    }

    /// Add the session's CSRF token as a hidden field
    #[must_use]
    pub fn csrf_token(self, token: impl Into<String>) -> Self {
        self.hidden(CSRF_FORM_FIELD, token)
    }

    /// Fields added so far
    #[must_use]
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Look up a field by name
    #[must_use]
    pub fn field_named(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Render the form HTML
    #[must_use]
    pub fn build(self) -> String {
        FormRenderer::render(&self)
    }
}

/// Builder for a single field, returned by [`FormBuilder::field`] and friends
#[derive(Debug)]
pub struct FieldBuilder<'a> {
    form: FormBuilder<'a>,
    field: FormField,
}

impl<'a> FieldBuilder<'a> {
    const fn new(form: FormBuilder<'a>, field: FormField) -> Self {
        Self { form, field }
    }

    /// Set the field label
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.field.label = Some(label.into());
        self
    }

    /// Set placeholder text
    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.field.placeholder = Some(placeholder.into());
        self
    }

    /// Set the current value (the selected value for selects)
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.field.value = Some(value.into());
        self
    }

    /// Mark field as required
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.field.flags.required = true;
        self
    }

    /// Enable autofocus
    #[must_use]
    pub const fn autofocus(mut self) -> Self {
        self.field.flags.autofocus = true;
        self
    }

    /// Set the maximum input length
    #[must_use]
    pub const fn max_length(mut self, len: usize) -> Self {
        self.field.max_length = Some(len);
        self
    }

    /// Set the autocomplete attribute
    #[must_use]
    pub fn autocomplete(mut self, value: impl Into<String>) -> Self {
        self.field.autocomplete = Some(value.into());
        self
    }

    /// Set help text
    #[must_use]
    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.field.help_text = Some(text.into());
        self
    }

    /// Add an option (selects and checkbox groups)
    #[must_use]
    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        if let FieldKind::Select { options } | FieldKind::CheckboxGroup { options, .. } =
            &mut self.field.kind
        {
            options.push(SelectOption::new(value, label));
        }
        self
    }

    /// Add an empty first option for selects
    #[must_use]
    pub fn placeholder_option(self, label: impl Into<String>) -> Self {
        self.option("", label)
    }

    /// Check the checkbox (single checkboxes)
    #[must_use]
    pub fn checked(mut self, checked: bool) -> Self {
        if let FieldKind::Checkbox { checked: state } = &mut self.field.kind {
            *state = checked;
        }
        self
    }

    /// Mark values as checked (checkbox groups)
    #[must_use]
    pub fn selected<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let FieldKind::CheckboxGroup { selected, .. } = &mut self.field.kind {
            selected.extend(values.into_iter().map(Into::into));
        }
        self
    }

    /// Finish the field and return to the form
    #[must_use]
    pub fn done(mut self) -> FormBuilder<'a> {
        self.form.fields.push(self.field);
        self.form
    }
}
