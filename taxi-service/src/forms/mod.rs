//! Form handling: validation, rendering and body extraction
//!
//! Forms are plain structs deriving [`serde::Deserialize`] and
//! [`validator::Validate`]. Each has a `clean` step that trims input, runs the
//! field rules and any database lookups (uniqueness, existing choices), and
//! either returns model input or a [`ValidationErrors`] map used to re-render
//! the form with messages next to the offending fields.
//!
//! HTML is produced with [`FormBuilder`]:
//!
//! ```rust
//! use taxi_service::forms::{FormBuilder, InputType, ValidationErrors};
//!
//! let mut errors = ValidationErrors::new();
//! errors.add("license_number", "Last 5 characters should be digits");
//!
//! let html = FormBuilder::new("/drivers/1/update/", "post")
//!     .errors(&errors)
//!     .field("license_number", InputType::Text)
//!         .label("License number")
//!         .value("ABC1234X")
//!         .done()
//!     .submit("Update")
//!     .build();
//!
//! assert!(html.contains("Last 5 characters should be digits"));
//! ```

mod admin;
mod builder;
mod car;
mod driver;
mod error;
mod extract;
mod field;
mod login;
mod manufacturer;
mod render;
mod rules;
mod search;

pub use admin::AdminDriverForm;
pub use builder::{FieldBuilder, FormBuilder, HtmxFormAttrs};
pub use car::CarForm;
pub use driver::{driver_taken_errors, DriverCreationForm, DriverLicenseUpdateForm};
pub use error::{FieldError, FormError, ValidationErrors, NON_FIELD_ERRORS};
pub use extract::FormData;
pub use field::{FieldFlags, FieldKind, FormField, InputType, SelectOption};
pub use login::{LoginForm, INVALID_LOGIN};
pub use manufacturer::ManufacturerForm;
pub use render::{escape_attr, escape_html, FormRenderer};
pub use rules::{
    password_problems, validate_license_number, validate_required, validate_username,
    LICENSE_LENGTH, MAX_USERNAME_LENGTH, MIN_PASSWORD_LENGTH, REQUIRED,
};
pub use search::{CarSearchForm, DriverSearchForm, ManufacturerSearchForm, SearchForm};
