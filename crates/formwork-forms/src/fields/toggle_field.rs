//! Boolean on/off switch

use crate::config::FieldConfig;
use crate::field::{FieldCore, FieldKind, FieldResult, FormField, configure_base, definition};
use crate::html::{attribute_string, input_id};
use formwork_core::{escape_html, escape_html_attr};
use serde::Deserialize;
use serde_json::Value;

/// Read-only texts for the two states
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToggleOptions {
	pub selected_text: String,
	pub deselected_text: String,
}

impl Default for ToggleOptions {
	fn default() -> Self {
		Self {
			selected_text: "Yes".to_string(),
			deselected_text: "No".to_string(),
		}
	}
}

/// Checkbox holding a boolean.
///
/// The control pairs the checkbox with a hidden `0` input of the same name,
/// so an unchecked box still submits a value.
///
/// # Examples
///
/// ```
/// use formwork_forms::FormField;
/// use formwork_forms::fields::ToggleField;
/// use serde_json::json;
///
/// let mut field = ToggleField::new("subscribe", None);
/// field.set_value(json!("1"));
/// assert_eq!(field.value(), Some(&json!(true)));
/// field.set_value(json!("0"));
/// assert_eq!(field.value(), Some(&json!(false)));
/// ```
#[derive(Debug)]
pub struct ToggleField {
	core: FieldCore,
	toggle_options: ToggleOptions,
}

impl ToggleField {
	pub fn new(name: impl Into<String>, group: Option<&str>) -> Self {
		let mut core = FieldCore::new(name, group);
		core.value = Value::Bool(false);
		Self {
			core,
			toggle_options: ToggleOptions::default(),
		}
	}

	pub fn is_on(&self) -> bool {
		self.core.value.as_bool().unwrap_or(false)
	}

	pub fn toggle_options(&self) -> &ToggleOptions {
		&self.toggle_options
	}
}

impl FormField for ToggleField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn kind(&self) -> FieldKind {
		FieldKind::Toggle
	}

	fn configure(&mut self, mut config: FieldConfig) -> FieldResult<()> {
		self.toggle_options =
			config.take_options(self.core.name(), &["selected_text", "deselected_text"])?;
		configure_base(self, config)
	}

	fn coerce(&self, value: Value) -> Value {
		Value::Bool(match value {
			Value::Null => false,
			Value::Bool(b) => b,
			Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
			Value::String(s) => !(s.is_empty() || s == "0"),
			Value::Array(items) => !items.is_empty(),
			Value::Object(map) => !map.is_empty(),
		})
	}

	fn empty_value(&self) -> Value {
		Value::Bool(false)
	}

	/// The label is part of the control
	fn label_html(&self, _form_name: &str) -> String {
		String::new()
	}

	fn control(&self, form_name: &str) -> String {
		let full_name = escape_html_attr(self.core.full_name());
		let id = escape_html_attr(&input_id(form_name, self.core.full_name()));
		let class = self
			.core
			.attributes
			.get("class")
			.and_then(Value::as_str)
			.unwrap_or_default();
		let checked = if self.is_on() { r#" checked="checked""# } else { "" };

		format!(
			concat!(
				r#"<input type="hidden" name="{name}" value="0" />"#,
				r#"<input type="checkbox" name="{name}" id="{id}" value="1"{attributes}{checked} class="toggle-switch {class}" />"#,
				r#"<label for="{id}">{label}</label>"#
			),
			name = full_name,
			id = id,
			attributes = attribute_string(&self.core.attributes, &["type", "class"]),
			checked = checked,
			class = escape_html_attr(class),
			label = self.label().unwrap_or_default()
		)
	}

	fn display_value(&self) -> Option<String> {
		let options = &self.toggle_options;
		Some(if self.is_on() {
			options.selected_text.clone()
		} else {
			options.deselected_text.clone()
		})
	}

	fn render_view(&self, _show_empty: bool) -> String {
		definition(self.label(), &escape_html(&self.display_value().unwrap_or_default()))
	}
}
