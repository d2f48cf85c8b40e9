//! Security primitives module.
//!
//! HTML escaping and CSRF token helpers shared by the form layer.
//!
//! # Examples
//!
//! ```rust
//! # #[cfg(feature = "core")]
//! # {
//! use formwork::core::{escape_html, escape_html_attr};
//!
//! assert_eq!(escape_html("<b>"), "&lt;b&gt;");
//! assert_eq!(escape_html_attr(r#"a"b"#), "a&quot;b");
//! # }
//! ```

#[cfg(feature = "core")]
pub use formwork_core::*;
