//! Form field types and input configuration

/// Field attribute flags
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldFlags {
    /// Whether field is required
    pub required: bool,
    /// Autofocus this field
    pub autofocus: bool,
}

/// HTML input types used by the fleet forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputType {
    /// Text input (default)
    #[default]
    Text,
    /// Password input (masked)
    Password,
    /// Search input
    Search,
    /// Hidden input
    Hidden,
}

impl InputType {
    /// HTML type attribute value
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Password => "password",
            Self::Search => "search",
            Self::Hidden => "hidden",
        }
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Option for selects and checkbox groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Value attribute
    pub value: String,
    /// Display text
    pub label: String,
}

impl SelectOption {
    /// New option
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Kind of form field
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Standard input field
    Input(InputType),
    /// Single-choice dropdown
    Select {
        /// Available options
        options: Vec<SelectOption>,
    },
    /// Single boolean checkbox
    Checkbox {
        /// Whether checkbox is checked
        checked: bool,
    },
    /// Multiple-choice checkbox list sharing one name
    CheckboxGroup {
        /// Available options
        options: Vec<SelectOption>,
        /// Values currently checked
        selected: Vec<String>,
    },
}

/// A form field with its attributes
#[derive(Debug, Clone)]
pub struct FormField {
    /// Field name (used for form submission)
    pub name: String,
    /// Field kind
    pub kind: FieldKind,
    /// Label text
    pub label: Option<String>,
    /// Placeholder text
    pub placeholder: Option<String>,
    /// Current value
    pub value: Option<String>,
    /// Required and autofocus flags
    pub flags: FieldFlags,
    /// Maximum length for text inputs
    pub max_length: Option<usize>,
    /// Autocomplete attribute
    pub autocomplete: Option<String>,
    /// Help text shown below the field
    pub help_text: Option<String>,
}

impl FormField {
    /// Input field
    #[must_use]
    pub fn input(name: impl Into<String>, input_type: InputType) -> Self {
        Self::new(name, FieldKind::Input(input_type))
    }

    /// Select field
    #[must_use]
    pub fn select(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Select { options: Vec::new() })
    }

    /// Checkbox field
    #[must_use]
    pub fn checkbox(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Checkbox { checked: false })
    }

    /// Checkbox group field
    #[must_use]
    pub fn checkbox_group(name: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldKind::CheckboxGroup {
                options: Vec::new(),
                selected: Vec::new(),
            },
        )
    }

    fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            label: None,
            placeholder: None,
            value: None,
            flags: FieldFlags::default(),
            max_length: None,
            autocomplete: None,
            help_text: None,
        }
    }

    /// Element ID (`id_` + name)
    #[must_use]
    pub fn element_id(&self) -> String {
        format!("id_{}", self.name)
    }

    /// Whether this is a hidden input
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        matches!(self.kind, FieldKind::Input(InputType::Hidden))
    }
}
