//! Declarative HTML forms for formwork
//!
//! This crate builds forms from a declarative configuration and covers:
//! - Field kinds for text, numbers, dates, choices, toggles, uploads and buttons
//! - Per-field filter pipelines and validator chains
//! - Value groups that nest submitted values one level deep
//! - CSRF protection backed by a session store
//! - Bootstrap-style editable rendering and read-only definition-list rendering
//!
//! ## Quick Start
//!
//! ```rust
//! use formwork_forms::{Form, FormConfig, FieldConfig, SubmittedRequest};
//! use formwork_sessions::InMemorySessionStore;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let config = FormConfig::new("contact")
//!     .with_element("email", "email", FieldConfig::new().with_label("E-mail").required())
//!     .with_element("send", "submit", FieldConfig::new().with_label("Send"));
//! let mut form = Form::new(config, Arc::new(InMemorySessionStore::new())).unwrap();
//!
//! let html = form.render();
//! assert!(html.contains(r#"<input type="email" name="email" id="contact_email""#));
//!
//! let request = SubmittedRequest::post(json!({"email": "not-an-address", "_csrf": form.csrf_token()}));
//! assert!(!form.is_valid(&request));
//! assert_eq!(form.get_field("email").unwrap().errors(), ["Must be a valid e-mail address"]);
//! ```

pub mod choices;
pub mod config;
pub mod field;
pub mod fields;
pub mod form;
pub mod html;
pub mod registry;
pub mod request;
pub mod upload;

pub use choices::{Choice, Choices};
pub use config::{ElementDecl, FieldConfig, FormConfig, GroupConfig};
pub use field::{
	FieldCore, FieldError, FieldKind, FieldLookup, FieldOptions, FieldResult, Filter, FormField,
	NoLookup, REQUIRED_MESSAGE, Validator, build_field, configure_base, full_field_name,
	is_empty_value, validate_base,
};
pub use form::{
	CSRF_FIELD_NAME, DEFAULT_FORM_NAME, DEFAULT_METHOD, Form, FormError, FormGroup, FormResult,
	ValidationMessage,
};
pub use registry::{BuildContext, FieldFactory, FieldRegistry, FieldSpec};
pub use request::SubmittedRequest;
pub use upload::{
	UPLOAD_ERR_FORM_SIZE, UPLOAD_ERR_INI_SIZE, UPLOAD_ERR_NO_FILE, UPLOAD_ERR_OK, UPLOAD_ERR_PARTIAL,
	UploadedFile, normalize_uploads,
};
