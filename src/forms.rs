//! Forms module.
//!
//! Declarative configuration, field kinds, validation and rendering.
//!
//! # Examples
//!
//! ```rust
//! # #[cfg(feature = "forms")]
//! # {
//! use formwork::forms::fields::NumberField;
//! use formwork::forms::{FieldConfig, FormField, build_field};
//! use serde_json::json;
//!
//! let field = build_field(NumberField::new("qty", None), FieldConfig::new().with_default(json!("2.6"))).unwrap();
//! assert_eq!(field.value(), Some(&json!(3)));
//! # }
//! ```

#[cfg(feature = "forms")]
pub use formwork_forms::*;
