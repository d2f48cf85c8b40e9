//! Display-only markup

use crate::field::{FieldCore, FieldKind, FieldLookup, FormField};
use serde_json::Value;

/// Emits the `markup` attribute verbatim. Holds no value and is always valid.
///
/// # Examples
///
/// ```
/// use formwork_forms::{FieldConfig, FormField, build_field};
/// use formwork_forms::fields::MarkupField;
/// use serde_json::json;
///
/// let field = build_field(
///     MarkupField::new("intro", None),
///     FieldConfig::new().with_attribute("markup", json!("<p>Welcome!</p>")),
/// )
/// .unwrap();
/// assert_eq!(field.control("f"), "<p>Welcome!</p>");
/// assert_eq!(field.value(), None);
/// ```
#[derive(Debug)]
pub struct MarkupField {
	core: FieldCore,
}

impl MarkupField {
	pub fn new(name: impl Into<String>, group: Option<&str>) -> Self {
		Self {
			core: FieldCore::new(name, group),
		}
	}
}

impl FormField for MarkupField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn kind(&self) -> FieldKind {
		FieldKind::Markup
	}

	fn set_value(&mut self, _value: Value) {}

	fn value(&self) -> Option<&Value> {
		None
	}

	fn clear_value(&mut self) {}

	fn validate(&mut self, _lookup: &dyn FieldLookup) -> bool {
		self.core.errors.clear();
		true
	}

	fn control(&self, _form_name: &str) -> String {
		self.core
			.attributes
			.get("markup")
			.and_then(Value::as_str)
			.unwrap_or_default()
			.to_string()
	}

	fn render_view(&self, _show_empty: bool) -> String {
		String::new()
	}
}
