//! Buttons and submit buttons

use crate::config::FieldConfig;
use crate::field::{FieldCore, FieldKind, FieldLookup, FieldResult, FormField, configure_base};
use crate::html::{render_input, value_to_string};
use serde_json::Value;

/// Push button. The configured label becomes the button text; the field has
/// no label of its own, keeps its value fixed and never takes part in value
/// extraction or validation.
///
/// # Examples
///
/// ```
/// use formwork_forms::{FieldConfig, FormField, build_field};
/// use formwork_forms::fields::ButtonField;
///
/// let field = build_field(ButtonField::submit("save", None), FieldConfig::new().with_label("Save")).unwrap();
/// assert_eq!(field.control("edit"), r#"<input type="submit" name="save" id="edit_save" value="Save" />"#);
/// assert_eq!(field.label(), None);
/// assert_eq!(field.value(), None);
/// ```
#[derive(Debug)]
pub struct ButtonField {
	core: FieldCore,
	submit: bool,
}

impl ButtonField {
	pub fn button(name: impl Into<String>, group: Option<&str>) -> Self {
		Self {
			core: FieldCore::new(name, group),
			submit: false,
		}
	}

	pub fn submit(name: impl Into<String>, group: Option<&str>) -> Self {
		Self {
			core: FieldCore::new(name, group),
			submit: true,
		}
	}

	fn input_type(&self) -> &'static str {
		if self.submit { "submit" } else { "button" }
	}

	/// Text shown on the button
	pub fn text(&self) -> &str {
		self.core.value.as_str().unwrap_or_default()
	}
}

impl FormField for ButtonField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn kind(&self) -> FieldKind {
		if self.submit {
			FieldKind::Submit
		} else {
			FieldKind::Button
		}
	}

	fn configure(&mut self, config: FieldConfig) -> FieldResult<()> {
		configure_base(self, config)?;
		let text = self.core.options.label.take().unwrap_or_default();
		self.core.value = Value::String(text);
		let input_type = self.input_type();
		self.core
			.attributes
			.insert("type".to_string(), Value::from(input_type));
		Ok(())
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

	fn control(&self, form_name: &str) -> String {
		render_input(&self.core, form_name, self.input_type(), &value_to_string(&self.core.value))
	}

	fn render_view(&self, _show_empty: bool) -> String {
		String::new()
	}
}
