//! The field contract shared by every input kind
//!
//! A field is a small state machine around one input: typed options, free-form
//! rendering attributes, the current value, an ordered filter pipeline, an
//! ordered validator chain and the error list of the last validation pass.
//! Concrete kinds embed a [`FieldCore`] and override only what differs.

use crate::choices::Choices;
use crate::config::FieldConfig;
use crate::html;
use formwork_core::{escape_html, escape_html_attr};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Message recorded when a required field has an empty value
pub const REQUIRED_MESSAGE: &str = "This field is required.";

#[derive(Debug, thiserror::Error)]
pub enum FieldError {
	#[error("Invalid option for field {field}: {message}")]
	InvalidOption { field: String, message: String },
	#[error("Field configuration error: {0}")]
	Configuration(String),
}

pub type FieldResult<T> = Result<T, FieldError>;

/// Value normalizer applied whenever a new raw value is set
pub type Filter = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Value judge: `Ok(())` accepts, `Err(message)` rejects with a human-readable message.
///
/// Validators get read access to sibling values through [`FieldLookup`] so
/// cross-field checks never need a reference to the owning form.
pub type Validator = Arc<dyn Fn(&Value, &dyn FieldLookup) -> Result<(), String> + Send + Sync>;

/// Read-only access to the values of other fields, keyed by full name
pub trait FieldLookup {
	fn value_of(&self, full_name: &str) -> Option<&Value>;
}

/// Lookup with no siblings, for validating a field outside a form
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl FieldLookup for NoLookup {
	fn value_of(&self, _full_name: &str) -> Option<&Value> {
		None
	}
}

impl FieldLookup for IndexMap<String, Value> {
	fn value_of(&self, full_name: &str) -> Option<&Value> {
		self.get(full_name)
	}
}

impl FieldLookup for serde_json::Map<String, Value> {
	fn value_of(&self, full_name: &str) -> Option<&Value> {
		self.get(full_name)
	}
}

/// Built-in field kinds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
	Text,
	TextArea,
	Email,
	Url,
	Number,
	Password,
	Date,
	Time,
	Hidden,
	Select,
	Radio,
	Checkbox,
	MultiSelect,
	Toggle,
	File,
	Markup,
	Button,
	Submit,
	Csrf,
	Recaptcha,
	/// A kind registered by the application
	Custom(String),
}

impl FieldKind {
	pub fn as_str(&self) -> &str {
		match self {
			Self::Text => "text",
			Self::TextArea => "textarea",
			Self::Email => "email",
			Self::Url => "url",
			Self::Number => "number",
			Self::Password => "password",
			Self::Date => "date",
			Self::Time => "time",
			Self::Hidden => "hidden",
			Self::Select => "select",
			Self::Radio => "radio",
			Self::Checkbox => "checkbox",
			Self::MultiSelect => "multiselect",
			Self::Toggle => "toggle",
			Self::File => "file",
			Self::Markup => "markup",
			Self::Button => "button",
			Self::Submit => "submit",
			Self::Csrf => "csrf",
			Self::Recaptcha => "recaptcha",
			Self::Custom(name) => name,
		}
	}

	/// Kinds rendered in the trailing hidden block rather than inside fieldsets
	pub fn is_hidden(&self) -> bool {
		matches!(self, Self::Hidden | Self::Csrf)
	}

	pub fn is_file_upload(&self) -> bool {
		matches!(self, Self::File)
	}
}

impl fmt::Display for FieldKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Semantic options common to every field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOptions {
	pub label: Option<String>,
	pub label_class: Option<String>,
	pub required: bool,
	pub choices: Option<Choices>,
	pub description: Option<String>,
	pub description_class: Option<String>,
	pub form_group_class: Option<String>,
}

/// State shared by all field kinds
pub struct FieldCore {
	name: String,
	group: Option<String>,
	full_name: String,
	pub options: FieldOptions,
	pub attributes: IndexMap<String, Value>,
	pub value: Value,
	pub(crate) filters: Vec<Filter>,
	pub(crate) validators: Vec<Validator>,
	pub(crate) errors: Vec<String>,
}

impl FieldCore {
	/// Create the core for a field named `name`, optionally nested under `group`
	///
	/// # Examples
	///
	/// ```
	/// use formwork_forms::FieldCore;
	///
	/// let core = FieldCore::new("city", Some("address"));
	/// assert_eq!(core.full_name(), "address_city");
	/// assert_eq!(core.name(), "city");
	/// ```
	pub fn new(name: impl Into<String>, group: Option<&str>) -> Self {
		let name = name.into();
		let group = group.map(str::to_string);
		let full_name = full_field_name(&name, group.as_deref());
		Self {
			name,
			group,
			full_name,
			options: FieldOptions::default(),
			attributes: IndexMap::new(),
			value: Value::Null,
			filters: Vec::new(),
			validators: Vec::new(),
			errors: Vec::new(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn group(&self) -> Option<&str> {
		self.group.as_deref()
	}

	pub fn full_name(&self) -> &str {
		&self.full_name
	}

	pub fn filters(&self) -> &[Filter] {
		&self.filters
	}

	pub fn validators(&self) -> &[Validator] {
		&self.validators
	}

	pub fn errors(&self) -> &[String] {
		&self.errors
	}

	pub fn errors_mut(&mut self) -> &mut Vec<String> {
		&mut self.errors
	}
}

impl fmt::Debug for FieldCore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldCore")
			.field("full_name", &self.full_name)
			.field("options", &self.options)
			.field("attributes", &self.attributes)
			.field("value", &self.value)
			.field("filters", &self.filters.len())
			.field("validators", &self.validators.len())
			.field("errors", &self.errors)
			.finish()
	}
}

/// Compose the registry key of a field: `group_name` when grouped, `name` otherwise
pub fn full_field_name(name: &str, group: Option<&str>) -> String {
	match group {
		Some(group) => format!("{}_{}", group, name),
		None => name.to_string(),
	}
}

/// Default emptiness policy: every falsy value counts as empty.
///
/// That is null, `false`, numeric zero, the empty string, the string `"0"`
/// and empty containers. A required number field therefore rejects `0`.
pub fn is_empty_value(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::Bool(b) => !b,
		Value::String(s) => s.is_empty() || s == "0",
		Value::Array(items) => items.is_empty(),
		Value::Object(map) => map.is_empty(),
		Value::Number(n) => n.as_f64() == Some(0.0),
	}
}

/// Behaviour every form input implements.
///
/// Only [`core`](FormField::core), [`core_mut`](FormField::core_mut),
/// [`kind`](FormField::kind) and [`control`](FormField::control) are required;
/// everything else has the base behaviour as its default.
pub trait FormField: Send + Sync {
	fn core(&self) -> &FieldCore;
	fn core_mut(&mut self) -> &mut FieldCore;
	fn kind(&self) -> FieldKind;

	fn name(&self) -> &str {
		self.core().name()
	}

	fn full_name(&self) -> &str {
		self.core().full_name()
	}

	fn group(&self) -> Option<&str> {
		self.core().group()
	}

	fn options(&self) -> &FieldOptions {
		&self.core().options
	}

	fn options_mut(&mut self) -> &mut FieldOptions {
		&mut self.core_mut().options
	}

	fn attributes(&self) -> &IndexMap<String, Value> {
		&self.core().attributes
	}

	fn set_attribute(&mut self, key: &str, value: Value) {
		self.core_mut().attributes.insert(key.to_string(), value);
	}

	fn label(&self) -> Option<&str> {
		self.core().options.label.as_deref()
	}

	fn is_required(&self) -> bool {
		self.core().options.required
	}

	/// Apply a declarative configuration. Re-invocable: options are reset,
	/// filters and validators are appended, attributes are merged.
	fn configure(&mut self, config: FieldConfig) -> FieldResult<()> {
		configure_base(self, config)
	}

	/// Kind-specific conversion applied before the filter pipeline
	fn coerce(&self, value: Value) -> Value {
		value
	}

	/// Kind-specific normalization applied after the registered filters
	fn type_filter(&self, value: Value) -> Value {
		value
	}

	fn set_value(&mut self, value: Value) {
		let mut value = self.coerce(value);
		let filters = self.core().filters.clone();
		for filter in &filters {
			value = filter(value);
		}
		let value = self.type_filter(value);
		self.core_mut().value = value;
	}

	/// Current value, or `None` when the field is excluded from bulk extraction
	fn value(&self) -> Option<&Value> {
		let value = &self.core().value;
		(!value.is_null()).then_some(value)
	}

	/// Value a field holds after [`clear_value`](FormField::clear_value)
	fn empty_value(&self) -> Value {
		Value::String(String::new())
	}

	fn clear_value(&mut self) {
		let empty = self.empty_value();
		self.core_mut().value = empty;
	}

	fn is_empty(&self, value: &Value) -> bool {
		is_empty_value(value)
	}

	/// Kind-specific check run after the registered validators
	fn type_check(&self, _value: &Value, _lookup: &dyn FieldLookup) -> Result<(), String> {
		Ok(())
	}

	/// Optionally set a new value, then validate the stored one
	fn is_valid(&mut self, new_value: Option<Value>, lookup: &dyn FieldLookup) -> bool {
		if let Some(value) = new_value {
			self.set_value(value);
		}
		self.validate(lookup)
	}

	/// Validate the stored value, replacing the error list
	fn validate(&mut self, lookup: &dyn FieldLookup) -> bool {
		validate_base(self, lookup)
	}

	fn errors(&self) -> &[String] {
		self.core().errors()
	}

	fn has_errors(&self) -> bool {
		!self.core().errors.is_empty()
	}

	fn add_error(&mut self, message: String) {
		self.core_mut().errors.push(message);
	}

	fn add_filter(&mut self, filter: Filter) {
		self.core_mut().filters.push(filter);
	}

	fn clear_filters(&mut self) {
		self.core_mut().filters.clear();
	}

	fn add_validator(&mut self, validator: Validator) {
		self.core_mut().validators.push(validator);
	}

	fn clear_validators(&mut self) {
		self.core_mut().validators.clear();
	}

	/// Control markup only, without wrapper or label
	fn control(&self, form_name: &str) -> String;

	fn label_html(&self, form_name: &str) -> String {
		let options = self.options();
		let Some(label) = options.label.as_deref().filter(|l| !l.is_empty()) else {
			return String::new();
		};
		let required = if options.required {
			r#"<span class="text-danger" title="Required">*</span>"#
		} else {
			""
		};
		format!(
			r#"<label for="{}" class="{}">{} {}</label>"#,
			html::input_id(form_name, self.full_name()),
			escape_html_attr(options.label_class.as_deref().unwrap_or_default()),
			label,
			required
		)
	}

	/// Editable markup: wrapper, label, control, description and errors
	fn render(&self, form_name: &str) -> String {
		let options = self.options();
		let mut output = format!(
			r#"<div class="form-group {}" id="field_{}">"#,
			escape_html_attr(options.form_group_class.as_deref().unwrap_or_default()),
			escape_html_attr(self.full_name())
		);
		output.push_str(&self.label_html(form_name));
		output.push_str(r#"<div class="form-field">"#);
		output.push_str(&self.control(form_name));
		output.push_str("</div>");

		if let Some(description) = options.description.as_deref().filter(|d| !d.is_empty()) {
			output.push_str(&format!(
				r#"<small class="help-block {}">{}</small>"#,
				escape_html_attr(options.description_class.as_deref().unwrap_or_default()),
				description
			));
		}

		if self.has_errors() {
			let errors: Vec<String> = self.errors().iter().map(|e| escape_html(e)).collect();
			output.push_str(&format!(
				r#"<small class="help-block form-error">{}</small>"#,
				errors.join("<br>")
			));
		}

		output.push_str("</div>");
		output
	}

	/// Plain-text rendition of the value used by read-only rendering
	fn display_value(&self) -> Option<String> {
		self.value().map(html::value_to_string)
	}

	/// Read-only `<dt>`/`<dd>` pair, empty when there is nothing to show
	fn render_view(&self, show_empty: bool) -> String {
		let display = self.display_value().unwrap_or_default();
		if display.is_empty() && !show_empty {
			return String::new();
		}
		definition(self.label(), &escape_html(&display))
	}
}

/// Base configuration step used by [`FormField::configure`] and by overrides
/// that extract their own typed options first.
pub fn configure_base<F: FormField + ?Sized>(field: &mut F, config: FieldConfig) -> FieldResult<()> {
	let FieldConfig {
		label,
		label_class,
		required,
		choices,
		description,
		description_class,
		form_group_class,
		default,
		value,
		belongs_to: _,
		attributes,
		filters,
		validators,
	} = config;

	let core = field.core_mut();
	core.options = FieldOptions {
		label,
		label_class,
		required,
		choices,
		description,
		description_class,
		form_group_class,
	};
	core.filters.extend(filters);
	core.validators.extend(validators);
	core.attributes.extend(attributes);

	if let Some(default) = default {
		field.set_value(default);
	}
	if let Some(value) = value {
		field.set_value(value);
	}
	Ok(())
}

/// Base validation: required/empty check, then validators in order, then the
/// kind-specific check. The first failure becomes the only error.
pub fn validate_base<F: FormField + ?Sized>(field: &mut F, lookup: &dyn FieldLookup) -> bool {
	field.core_mut().errors.clear();
	let value = field.core().value.clone();

	if field.is_required() && field.is_empty(&value) {
		field.add_error(REQUIRED_MESSAGE.to_string());
		return false;
	}

	let validators = field.core().validators.clone();
	for validator in &validators {
		if let Err(message) = validator(&value, lookup) {
			field.add_error(message);
			return false;
		}
	}

	if let Err(message) = field.type_check(&value, lookup) {
		field.add_error(message);
		return false;
	}

	true
}

/// Configure `field` and hand it back, for building fields outside a form
///
/// # Examples
///
/// ```
/// use formwork_forms::{FieldConfig, FormField, build_field};
/// use formwork_forms::fields::TextField;
///
/// let field = build_field(TextField::new("title", None), FieldConfig::new().with_label("Title")).unwrap();
/// assert_eq!(field.label(), Some("Title"));
/// ```
pub fn build_field<F: FormField>(mut field: F, config: FieldConfig) -> FieldResult<F> {
	field.configure(config)?;
	Ok(field)
}

pub(crate) fn definition(label: Option<&str>, body: &str) -> String {
	let mut output = String::new();
	if let Some(label) = label.filter(|l| !l.is_empty()) {
		output.push_str(&format!("<dt>{}</dt>", label));
	}
	output.push_str(&format!("<dd>{}</dd>", body));
	output
}
