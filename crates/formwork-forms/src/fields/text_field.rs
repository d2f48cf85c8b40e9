//! Free text inputs

use crate::config::FieldConfig;
use crate::field::{FieldCore, FieldKind, FieldResult, FormField, configure_base};
use crate::html::{attribute_string, input_id, input_type, render_input, value_to_string};
use formwork_core::{escape_html, escape_html_attr};
use serde_json::Value;

const DEFAULT_ROWS: u32 = 6;
const DEFAULT_COLS: u32 = 60;

/// Single-line text input
///
/// The `type` attribute defaults to `text`; set it to `tel`, `search` or
/// similar to reuse this kind for other free-text inputs.
///
/// # Examples
///
/// ```
/// use formwork_forms::{FieldConfig, FormField, NoLookup, build_field};
/// use formwork_forms::fields::TextField;
/// use serde_json::json;
///
/// let mut field = build_field(TextField::new("nickname", None), FieldConfig::new().required()).unwrap();
/// assert!(!field.is_valid(Some(json!("")), &NoLookup));
/// assert!(field.is_valid(Some(json!("neo")), &NoLookup));
/// ```
#[derive(Debug)]
pub struct TextField {
	core: FieldCore,
}

impl TextField {
	pub fn new(name: impl Into<String>, group: Option<&str>) -> Self {
		Self {
			core: FieldCore::new(name, group),
		}
	}
}

impl FormField for TextField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn kind(&self) -> FieldKind {
		FieldKind::Text
	}

	fn control(&self, form_name: &str) -> String {
		render_input(
			&self.core,
			form_name,
			input_type(&self.core, "text"),
			&value_to_string(&self.core.value),
		)
	}
}

/// Multi-line text input, `rows=6 cols=60` unless configured otherwise
#[derive(Debug)]
pub struct TextAreaField {
	core: FieldCore,
}

impl TextAreaField {
	pub fn new(name: impl Into<String>, group: Option<&str>) -> Self {
		Self {
			core: FieldCore::new(name, group),
		}
	}
}

impl FormField for TextAreaField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn kind(&self) -> FieldKind {
		FieldKind::TextArea
	}

	fn configure(&mut self, config: FieldConfig) -> FieldResult<()> {
		configure_base(self, config)?;
		let attributes = &mut self.core.attributes;
		attributes
			.entry("rows".to_string())
			.or_insert(Value::from(DEFAULT_ROWS));
		attributes
			.entry("cols".to_string())
			.or_insert(Value::from(DEFAULT_COLS));
		Ok(())
	}

	fn control(&self, form_name: &str) -> String {
		format!(
			r#"<textarea name="{}" id="{}"{}>{}</textarea>"#,
			escape_html_attr(self.core.full_name()),
			escape_html_attr(&input_id(form_name, self.core.full_name())),
			attribute_string(&self.core.attributes, &[]),
			escape_html(&value_to_string(&self.core.value))
		)
	}
}
