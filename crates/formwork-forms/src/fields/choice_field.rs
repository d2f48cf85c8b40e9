//! Single-choice inputs: select boxes and radio lists

use crate::choices::{Choice, Choices};
use crate::config::FieldConfig;
use crate::field::{
	FieldCore, FieldKind, FieldLookup, FieldResult, FormField, configure_base, definition, is_empty_value,
};
use crate::html::{attribute_string, input_id, slugify, value_to_string};
use formwork_core::{escape_html, escape_html_attr};
use serde::Deserialize;
use serde_json::Value;

pub const INVALID_CHOICE_MESSAGE: &str = "Choice is not one of the available options.";

/// How a single-choice field is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceWidget {
	Select,
	Radio,
}

/// Options shared by the choice-based kinds
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChoiceOptions {
	/// Escape choice labels instead of emitting them as markup
	pub escape_choices: bool,
}

/// Single-choice field.
///
/// An unselected field holds an explicit sentinel key (commonly `""`), so the
/// field never counts as empty: a required select whose `""` placeholder is
/// not a declared choice fails with the invalid-choice message.
///
/// # Examples
///
/// ```
/// use formwork_forms::{Choices, FieldConfig, FormField, NoLookup, build_field};
/// use formwork_forms::fields::ChoiceField;
/// use serde_json::json;
///
/// let choices = Choices::new().with_choice("s", "Small").with_choice("l", "Large");
/// let mut field = build_field(
///     ChoiceField::select("size", None),
///     FieldConfig::new().with_choices(choices),
/// )
/// .unwrap();
///
/// assert!(field.is_valid(Some(json!("l")), &NoLookup));
/// assert_eq!(field.selected_label(), Some("Large"));
/// assert!(!field.is_valid(Some(json!("xl")), &NoLookup));
/// ```
#[derive(Debug)]
pub struct ChoiceField {
	core: FieldCore,
	widget: ChoiceWidget,
	choice_options: ChoiceOptions,
}

impl ChoiceField {
	pub fn new(name: impl Into<String>, group: Option<&str>, widget: ChoiceWidget) -> Self {
		Self {
			core: FieldCore::new(name, group),
			widget,
			choice_options: ChoiceOptions::default(),
		}
	}

	pub fn select(name: impl Into<String>, group: Option<&str>) -> Self {
		Self::new(name, group, ChoiceWidget::Select)
	}

	pub fn radio(name: impl Into<String>, group: Option<&str>) -> Self {
		Self::new(name, group, ChoiceWidget::Radio)
	}

	pub fn widget(&self) -> ChoiceWidget {
		self.widget
	}

	pub fn choices(&self) -> Option<&Choices> {
		self.core.options.choices.as_ref()
	}

	/// Label of the currently selected choice
	pub fn selected_label(&self) -> Option<&str> {
		self.choices()?.label_for(&self.core.value)
	}

	fn radio_list(&self, form_name: &str, choices: &Choices) -> String {
		let selected = value_to_string(&self.core.value);
		let full_name = self.core.full_name();
		let attributes = attribute_string(&self.core.attributes, &["type"]);

		choices
			.flatten()
			.into_iter()
			.map(|(key, label)| {
				let id = option_id(form_name, full_name, key);
				let checked = if selected == key && !self.core.value.is_null() {
					r#" checked="checked""#
				} else {
					""
				};
				format!(
					r#"<input type="radio" name="{}" id="{}" value="{}"{}{} /><label for="{}">{}</label>"#,
					escape_html_attr(full_name),
					escape_html_attr(&id),
					escape_html_attr(key),
					attributes,
					checked,
					escape_html_attr(&id),
					choice_label(label, self.choice_options.escape_choices)
				)
			})
			.collect::<Vec<_>>()
			.join("\n")
	}
}

impl FormField for ChoiceField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn kind(&self) -> FieldKind {
		match self.widget {
			ChoiceWidget::Select => FieldKind::Select,
			ChoiceWidget::Radio => FieldKind::Radio,
		}
	}

	fn configure(&mut self, mut config: FieldConfig) -> FieldResult<()> {
		self.choice_options = config.take_options(self.core.name(), &["escape_choices"])?;
		configure_base(self, config)
	}

	fn is_empty(&self, _value: &Value) -> bool {
		false
	}

	fn type_check(&self, value: &Value, _lookup: &dyn FieldLookup) -> Result<(), String> {
		if !self.is_required() && is_empty_value(value) {
			return Ok(());
		}
		match self.choices() {
			Some(choices) if choices.contains(value) => Ok(()),
			_ => Err(INVALID_CHOICE_MESSAGE.to_string()),
		}
	}

	fn control(&self, form_name: &str) -> String {
		let empty = Choices::new();
		let choices = self.choices().unwrap_or(&empty);
		match self.widget {
			ChoiceWidget::Select => {
				let selected = value_to_string(&self.core.value);
				format!(
					r#"<select name="{}" id="{}"{}>{}</select>"#,
					escape_html_attr(self.core.full_name()),
					escape_html_attr(&input_id(form_name, self.core.full_name())),
					attribute_string(&self.core.attributes, &["type"]),
					option_tags(
						choices,
						&|key| !self.core.value.is_null() && key == selected,
						self.choice_options.escape_choices
					)
				)
			}
			ChoiceWidget::Radio => self.radio_list(form_name, choices),
		}
	}

	fn display_value(&self) -> Option<String> {
		self.selected_label().map(str::to_string)
	}

	fn render_view(&self, show_empty: bool) -> String {
		let display = self.display_value().unwrap_or_default();
		if display.is_empty() && !show_empty {
			return String::new();
		}
		definition(self.label(), &choice_label(&display, self.choice_options.escape_choices))
	}
}

/// `<option>`/`<optgroup>` markup for a choice set
pub(crate) fn option_tags(choices: &Choices, is_selected: &dyn Fn(&str) -> bool, escape: bool) -> String {
	let mut output = String::new();
	for (key, choice) in choices.iter() {
		match choice {
			Choice::Label(label) => {
				let selected = if is_selected(key) {
					r#" selected="selected""#
				} else {
					""
				};
				output.push_str(&format!(
					r#"<option value="{}"{}>{}</option>"#,
					escape_html_attr(key),
					selected,
					choice_label(label, escape)
				));
			}
			Choice::Group(group) => {
				output.push_str(&format!(
					r#"<optgroup label="{}">{}</optgroup>"#,
					escape_html_attr(key),
					option_tags(group, is_selected, escape)
				));
			}
		}
	}
	output
}

/// `id` of one option in a radio or checkbox list
pub(crate) fn option_id(form_name: &str, full_name: &str, key: &str) -> String {
	format!("{}_{}", input_id(form_name, &slugify(full_name)), slugify(key))
}

pub(crate) fn choice_label(label: &str, escape: bool) -> String {
	if escape {
		escape_html(label)
	} else {
		label.to_string()
	}
}
