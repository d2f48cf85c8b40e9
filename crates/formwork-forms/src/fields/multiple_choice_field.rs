//! Multi-choice inputs: checkbox lists and multi-selects

use super::choice_field::{INVALID_CHOICE_MESSAGE, choice_label, option_id, option_tags};
use crate::choices::Choices;
use crate::config::FieldConfig;
use crate::field::{FieldCore, FieldKind, FieldLookup, FieldResult, FormField, configure_base, definition};
use crate::html::{attribute_string, input_id, value_to_string};
use formwork_core::escape_html_attr;
use serde::Deserialize;
use serde_json::Value;

/// How a multi-choice field is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultipleChoiceWidget {
	Checkbox,
	MultiSelect,
}

/// Options specific to multi-choice fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MultipleChoiceOptions {
	/// Fewest keys a non-empty submission must select
	pub minimum_selected: usize,
	pub escape_choices: bool,
}

/// Multi-choice field. The value is always a list of selected keys.
///
/// # Examples
///
/// ```
/// use formwork_forms::{Choices, FieldConfig, FormField, NoLookup, build_field};
/// use formwork_forms::fields::MultipleChoiceField;
/// use serde_json::json;
///
/// let choices = Choices::new().with_choice("a", "A").with_choice("b", "B");
/// let mut field = build_field(
///     MultipleChoiceField::checkbox("letters", None),
///     FieldConfig::new().with_choices(choices),
/// )
/// .unwrap();
///
/// field.set_value(json!("a"));
/// assert_eq!(field.value(), Some(&json!(["a"])));
/// assert!(field.is_valid(None, &NoLookup));
/// ```
#[derive(Debug)]
pub struct MultipleChoiceField {
	core: FieldCore,
	widget: MultipleChoiceWidget,
	multiple_options: MultipleChoiceOptions,
}

impl MultipleChoiceField {
	pub fn new(name: impl Into<String>, group: Option<&str>, widget: MultipleChoiceWidget) -> Self {
		let mut core = FieldCore::new(name, group);
		core.value = Value::Array(Vec::new());
		Self {
			core,
			widget,
			multiple_options: MultipleChoiceOptions::default(),
		}
	}

	pub fn checkbox(name: impl Into<String>, group: Option<&str>) -> Self {
		Self::new(name, group, MultipleChoiceWidget::Checkbox)
	}

	pub fn multi_select(name: impl Into<String>, group: Option<&str>) -> Self {
		Self::new(name, group, MultipleChoiceWidget::MultiSelect)
	}

	pub fn widget(&self) -> MultipleChoiceWidget {
		self.widget
	}

	pub fn choices(&self) -> Option<&Choices> {
		self.core.options.choices.as_ref()
	}

	pub fn multiple_options(&self) -> &MultipleChoiceOptions {
		&self.multiple_options
	}

	/// Selected keys in submission order
	pub fn selected_keys(&self) -> Vec<String> {
		match &self.core.value {
			Value::Array(items) => items.iter().map(value_to_string).collect(),
			_ => Vec::new(),
		}
	}

	/// Labels of the selected keys that name a declared choice
	pub fn selected_labels(&self) -> Vec<&str> {
		let (Some(choices), Value::Array(items)) = (self.choices(), &self.core.value) else {
			return Vec::new();
		};
		items
			.iter()
			.filter_map(|item| choices.label_for(item))
			.collect()
	}

	fn checkbox_list(&self, form_name: &str, choices: &Choices) -> String {
		let selected = self.selected_keys();
		let full_name = self.core.full_name();
		let attributes = attribute_string(&self.core.attributes, &["type"]);

		choices
			.flatten()
			.into_iter()
			.map(|(key, label)| {
				let id = option_id(form_name, full_name, key);
				let checked = if selected.iter().any(|s| s == key) {
					r#" checked="checked""#
				} else {
					""
				};
				format!(
					r#"<input type="checkbox" name="{}[]" id="{}" value="{}"{}{} /><label for="{}">{}</label>"#,
					escape_html_attr(full_name),
					escape_html_attr(&id),
					escape_html_attr(key),
					attributes,
					checked,
					escape_html_attr(&id),
					choice_label(label, self.multiple_options.escape_choices)
				)
			})
			.collect::<Vec<_>>()
			.join("\n")
	}
}

impl FormField for MultipleChoiceField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn kind(&self) -> FieldKind {
		match self.widget {
			MultipleChoiceWidget::Checkbox => FieldKind::Checkbox,
			MultipleChoiceWidget::MultiSelect => FieldKind::MultiSelect,
		}
	}

	fn configure(&mut self, mut config: FieldConfig) -> FieldResult<()> {
		self.multiple_options =
			config.take_options(self.core.name(), &["minimum_selected", "escape_choices"])?;
		configure_base(self, config)
	}

	fn coerce(&self, value: Value) -> Value {
		match value {
			Value::Null => Value::Array(Vec::new()),
			Value::String(s) if s.is_empty() => Value::Array(Vec::new()),
			Value::Array(items) => Value::Array(items),
			Value::Object(map) => Value::Array(map.into_iter().map(|(_, item)| item).collect()),
			scalar => Value::Array(vec![scalar]),
		}
	}

	fn empty_value(&self) -> Value {
		Value::Array(Vec::new())
	}

	fn type_check(&self, value: &Value, _lookup: &dyn FieldLookup) -> Result<(), String> {
		let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
		if items.is_empty() && !self.is_required() {
			return Ok(());
		}

		let minimum = self.multiple_options.minimum_selected;
		if items.len() < minimum {
			return Err(format!("At least {} options must be selected", minimum));
		}

		match self.choices() {
			Some(choices) if items.iter().all(|item| choices.contains(item)) => Ok(()),
			_ => Err(INVALID_CHOICE_MESSAGE.to_string()),
		}
	}

	fn control(&self, form_name: &str) -> String {
		let empty = Choices::new();
		let choices = self.choices().unwrap_or(&empty);
		match self.widget {
			MultipleChoiceWidget::Checkbox => self.checkbox_list(form_name, choices),
			MultipleChoiceWidget::MultiSelect => {
				let selected = self.selected_keys();
				format!(
					r#"<select name="{}[]" id="{}" multiple="multiple"{}>{}</select>"#,
					escape_html_attr(self.core.full_name()),
					escape_html_attr(&input_id(form_name, self.core.full_name())),
					attribute_string(&self.core.attributes, &["type", "multiple"]),
					option_tags(
						choices,
						&|key| selected.iter().any(|s| s == key),
						self.multiple_options.escape_choices
					)
				)
			}
		}
	}

	fn display_value(&self) -> Option<String> {
		Some(self.selected_labels().join(", "))
	}

	fn render_view(&self, show_empty: bool) -> String {
		let labels = self.selected_labels();
		if labels.is_empty() && !show_empty {
			return String::new();
		}
		let body = labels
			.into_iter()
			.map(|label| choice_label(label, self.multiple_options.escape_choices))
			.collect::<Vec<_>>()
			.join("<br>");
		definition(self.label(), &body)
	}
}
