//! Hidden input

use crate::config::FieldConfig;
use crate::field::{FieldCore, FieldKind, FieldResult, FormField, configure_base};
use crate::html::{render_input, value_to_string};
use serde_json::Value;

/// Hidden input: no label, no wrapper, omitted from read-only rendering.
/// Forms render hidden fields after every fieldset.
#[derive(Debug)]
pub struct HiddenField {
	core: FieldCore,
}

impl HiddenField {
	pub fn new(name: impl Into<String>, group: Option<&str>) -> Self {
		Self {
			core: FieldCore::new(name, group),
		}
	}
}

impl FormField for HiddenField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn kind(&self) -> FieldKind {
		FieldKind::Hidden
	}

	fn configure(&mut self, config: FieldConfig) -> FieldResult<()> {
		configure_base(self, config)?;
		self.core.options.label = None;
		self.core
			.attributes
			.insert("type".to_string(), Value::from("hidden"));
		Ok(())
	}

	fn control(&self, form_name: &str) -> String {
		render_input(&self.core, form_name, "hidden", &value_to_string(&self.core.value))
	}

	fn render(&self, form_name: &str) -> String {
		self.control(form_name)
	}

	fn render_view(&self, _show_empty: bool) -> String {
		String::new()
	}
}
