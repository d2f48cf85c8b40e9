//! E-mail address input

use crate::field::{FieldCore, FieldKind, FieldLookup, FormField, is_empty_value};
use crate::html::{render_input, value_to_string};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

pub const INVALID_EMAIL_MESSAGE: &str = "Must be a valid e-mail address";

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_REGEX: invalid regex pattern")
});

/// Input that only accepts well-formed e-mail addresses
///
/// # Examples
///
/// ```
/// use formwork_forms::{FormField, NoLookup};
/// use formwork_forms::fields::EmailField;
/// use serde_json::json;
///
/// let mut field = EmailField::new("email", None);
/// assert!(field.is_valid(Some(json!("user@example.com")), &NoLookup));
/// assert!(!field.is_valid(Some(json!("not-an-email")), &NoLookup));
/// ```
#[derive(Debug)]
pub struct EmailField {
	core: FieldCore,
}

impl EmailField {
	pub fn new(name: impl Into<String>, group: Option<&str>) -> Self {
		Self {
			core: FieldCore::new(name, group),
		}
	}
}

impl FormField for EmailField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn kind(&self) -> FieldKind {
		FieldKind::Email
	}

	fn type_check(&self, value: &Value, _lookup: &dyn FieldLookup) -> Result<(), String> {
		if is_empty_value(value) {
			return Ok(());
		}
		match value.as_str() {
			Some(address) if EMAIL_REGEX.is_match(address.trim()) => Ok(()),
			_ => Err(INVALID_EMAIL_MESSAGE.to_string()),
		}
	}

	fn control(&self, form_name: &str) -> String {
		render_input(&self.core, form_name, "email", &value_to_string(&self.core.value))
	}
}
