//! Security utilities

pub mod csrf;
pub mod xss;

pub use csrf::{constant_time_eq, generate_token};
pub use xss::{escape_html, escape_html_attr};
