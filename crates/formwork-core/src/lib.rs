//! # formwork core
//!
//! Security primitives shared by the formwork crates:
//!
//! - HTML escaping for text nodes and attribute values
//! - CSRF token generation and constant-time token comparison

pub mod security;

pub use security::csrf::{CSRF_TOKEN_BYTES, constant_time_eq, generate_token};
pub use security::xss::{escape_html, escape_html_attr};
