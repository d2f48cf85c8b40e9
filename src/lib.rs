//! # formwork
//!
//! Declarative HTML forms: build a form from configuration, render it, then
//! populate, filter and validate the submission and read the cleaned values.
//!
//! ## Feature Flags
//!
//! - `core` - HTML escaping and CSRF token primitives
//! - `sessions` - Session store capability and CSRF token table
//! - `forms` - Field kinds, forms and rendering (enables `core` and `sessions`)
//! - `full` (default) - Everything
//!
//! ## Quick Example
//!
//! ```rust
//! # #[cfg(feature = "full")]
//! # {
//! use formwork::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let config = FormConfig::from_json(r#"{
//!     "name": "newsletter",
//!     "groups": {
//!         "you": {
//!             "legend": "About you",
//!             "elements": {
//!                 "email": ["email", {"label": "E-mail", "required": true}],
//!                 "topics": ["checkbox", {"label": "Topics", "choices": {"rust": "Rust", "web": "Web"}}]
//!             }
//!         }
//!     }
//! }"#).unwrap();
//!
//! let session = Arc::new(InMemorySessionStore::new());
//! let mut form = Form::new(config, session).unwrap();
//! let html = form.render();
//! assert!(html.contains("<legend"));
//!
//! let request = SubmittedRequest::post(json!({
//!     "email": "reader@example.com",
//!     "topics": ["rust"],
//!     "_csrf": form.csrf_token(),
//! }));
//! assert!(form.is_valid(&request));
//! assert_eq!(form.get_values()["topics"], json!(["rust"]));
//! # }
//! ```

pub mod core;
pub mod forms;
pub mod sessions;

/// Commonly used types
pub mod prelude {
	#[cfg(feature = "core")]
	pub use crate::core::{escape_html, escape_html_attr};

	#[cfg(feature = "sessions")]
	pub use crate::sessions::{CsrfSessionManager, InMemorySessionStore, SessionStore};

	#[cfg(feature = "forms")]
	pub use crate::forms::{
		Choices, FieldConfig, FieldLookup, FieldRegistry, Filter, Form, FormConfig, FormError,
		FormField, FormResult, GroupConfig, SubmittedRequest, UploadedFile, Validator,
	};
}
