//! Markup helpers shared by the field renderers

use crate::field::FieldCore;
use formwork_core::escape_html_attr;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\W+").expect("NON_WORD: invalid regex pattern"));

/// `id` attribute of a field's control: `<form>_<field>`
pub fn input_id(form_name: &str, full_name: &str) -> String {
	format!("{}_{}", form_name, full_name)
}

/// Lowercase slug with runs of non-word characters collapsed to `-`
pub fn slugify(text: &str) -> String {
	NON_WORD
		.replace_all(text, "-")
		.trim_matches('-')
		.to_lowercase()
}

/// Flat textual form of a value, as submitted or displayed
pub fn value_to_string(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::Bool(true) => "1".to_string(),
		Value::Bool(false) => String::new(),
		Value::Number(n) => n.to_string(),
		Value::String(s) => s.clone(),
		Value::Array(items) => items
			.iter()
			.map(value_to_string)
			.collect::<Vec<_>>()
			.join(", "),
		Value::Object(_) => value.to_string(),
	}
}

/// Render `attributes` as ` key="value"` pairs.
///
/// `true` renders a bare attribute; `false`, null and empty strings are
/// dropped. Keys listed in `skip` are left out.
pub fn attribute_string(attributes: &IndexMap<String, Value>, skip: &[&str]) -> String {
	let mut output = String::new();
	for (key, value) in attributes {
		if skip.contains(&key.as_str()) {
			continue;
		}
		match value {
			Value::Bool(true) => {
				output.push(' ');
				output.push_str(&escape_html_attr(key));
			}
			Value::Bool(false) | Value::Null => {}
			Value::String(s) if s.is_empty() => {}
			other => output.push_str(&format!(
				r#" {}="{}""#,
				escape_html_attr(key),
				escape_html_attr(&value_to_string(other))
			)),
		}
	}
	output
}

/// `<input>` control for text-like kinds
pub fn render_input(core: &FieldCore, form_name: &str, input_type: &str, value: &str) -> String {
	format!(
		r#"<input type="{}" name="{}" id="{}" value="{}"{} />"#,
		escape_html_attr(input_type),
		escape_html_attr(core.full_name()),
		escape_html_attr(&input_id(form_name, core.full_name())),
		escape_html_attr(value),
		attribute_string(&core.attributes, &["type"])
	)
}

/// The `type` attribute configured on a field, or `fallback`
pub fn input_type<'a>(core: &'a FieldCore, fallback: &'a str) -> &'a str {
	core.attributes
		.get("type")
		.and_then(Value::as_str)
		.unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("Hello World", "hello-world")]
	#[case("address_city", "address_city")]
	#[case("  Trim me!  ", "trim-me")]
	#[case("a.b/c", "a-b-c")]
	fn test_slugify(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(slugify(input), expected);
	}

	#[rstest]
	#[case(json!(null), "")]
	#[case(json!(true), "1")]
	#[case(json!(false), "")]
	#[case(json!(12), "12")]
	#[case(json!(1.5), "1.5")]
	#[case(json!("text"), "text")]
	#[case(json!(["a", "b"]), "a, b")]
	fn test_value_to_string(#[case] value: Value, #[case] expected: &str) {
		assert_eq!(value_to_string(&value), expected);
	}

	#[rstest]
	fn test_attribute_string() {
		// Arrange
		let mut attributes = IndexMap::new();
		attributes.insert("placeholder".to_string(), json!("Your \"name\""));
		attributes.insert("autofocus".to_string(), json!(true));
		attributes.insert("disabled".to_string(), json!(false));
		attributes.insert("title".to_string(), json!(""));
		attributes.insert("maxlength".to_string(), json!(40));
		attributes.insert("type".to_string(), json!("text"));

		// Act
		let rendered = attribute_string(&attributes, &["type"]);

		// Assert
		assert_eq!(
			rendered,
			r#" placeholder="Your &quot;name&quot;" autofocus maxlength="40""#
		);
	}

	#[rstest]
	fn test_render_input() {
		// Arrange
		let mut core = FieldCore::new("city", Some("address"));
		core.attributes.insert("class".to_string(), json!("wide"));

		// Act
		let html = render_input(&core, "signup", "text", "O'Hare");

		// Assert
		assert_eq!(
			html,
			r#"<input type="text" name="address_city" id="signup_address_city" value="O&#x27;Hare" class="wide" />"#
		);
	}
}
