//! URL input

use crate::field::{FieldCore, FieldKind, FieldLookup, FormField, is_empty_value};
use crate::html::{render_input, value_to_string};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

pub const INVALID_URL_MESSAGE: &str = "Must be a valid URL.";

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://[^\s/?#]+([/?#][^\s]*)?$")
		.expect("URL_REGEX: invalid regex pattern")
});

/// Input that only accepts absolute URLs with a scheme and host
#[derive(Debug)]
pub struct UrlField {
	core: FieldCore,
}

impl UrlField {
	pub fn new(name: impl Into<String>, group: Option<&str>) -> Self {
		Self {
			core: FieldCore::new(name, group),
		}
	}
}

impl FormField for UrlField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn kind(&self) -> FieldKind {
		FieldKind::Url
	}

	fn type_check(&self, value: &Value, _lookup: &dyn FieldLookup) -> Result<(), String> {
		if is_empty_value(value) {
			return Ok(());
		}
		match value.as_str() {
			Some(url) if URL_REGEX.is_match(url.trim()) => Ok(()),
			_ => Err(INVALID_URL_MESSAGE.to_string()),
		}
	}

	fn control(&self, form_name: &str) -> String {
		render_input(&self.core, form_name, "url", &value_to_string(&self.core.value))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::field::NoLookup;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("https://example.com", true)]
	#[case("http://example.com/path?q=1#top", true)]
	#[case("ftp://files.example.org", true)]
	#[case("example.com", false)]
	#[case("https://", false)]
	#[case("https://exa mple.com", false)]
	#[case("", true)]
	fn test_url_validation(#[case] url: &str, #[case] expected: bool) {
		// Arrange
		let mut field = UrlField::new("site", None);

		// Act
		let valid = field.is_valid(Some(json!(url)), &NoLookup);

		// Assert
		assert_eq!(valid, expected);
	}

	#[rstest]
	fn test_url_error_message() {
		// Arrange
		let mut field = UrlField::new("site", None);

		// Act
		field.is_valid(Some(json!("nope")), &NoLookup);

		// Assert
		assert_eq!(field.errors(), [INVALID_URL_MESSAGE.to_string()]);
	}
}
