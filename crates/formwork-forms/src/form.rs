//! The form aggregate
//!
//! A [`Form`] owns its fields, keyed by full name in registration order, plus
//! two independent groupings:
//!
//! - the rendering layout: declaration groups, each drawn as one fieldset;
//! - value groups (`belongsTo`): prefix the full name of their members and
//!   nest their values one level deep in [`Form::get_values`].

use crate::config::{ElementDecl, FieldConfig, FormConfig, GroupConfig};
use crate::field::{FieldError, FormField, full_field_name};
use crate::registry::{BuildContext, FieldRegistry, FieldSpec};
use crate::request::SubmittedRequest;
use crate::upload::normalize_uploads;
use formwork_core::{escape_html, escape_html_attr};
use formwork_sessions::{CsrfSessionManager, SessionStore};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Name of the CSRF field every configured form carries
pub const CSRF_FIELD_NAME: &str = "_csrf";
/// Form name used when the configuration has none
pub const DEFAULT_FORM_NAME: &str = "formwork_form";
pub const DEFAULT_METHOD: &str = "POST";

#[derive(Debug, thiserror::Error)]
pub enum FormError {
	#[error("Input type \"{0}\" not found.")]
	FieldTypeNotFound(String),
	#[error("Field with name \"{0}\" already exists.")]
	FieldAlreadyExists(String),
	#[error("Field name \"{0}\" not found.")]
	FieldNotFound(String),
	#[error("Field error in {field}: {error}")]
	Field { field: String, error: FieldError },
	#[error("Invalid form configuration: {0}")]
	Config(#[from] serde_json::Error),
	#[error("Invalid TOML form configuration: {0}")]
	Toml(#[from] toml::de::Error),
}

pub type FormResult<T> = Result<T, FormError>;

/// One entry of the aggregated error list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessage {
	pub message: String,
	/// Label (or name) of the field the message belongs to; `None` for form-level errors
	pub label: Option<String>,
}

impl fmt::Display for ValidationMessage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.label {
			Some(label) => write!(f, "{}: {}", label, self.message),
			None => f.write_str(&self.message),
		}
	}
}

/// A declaration group as kept for rendering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormGroup {
	pub key: String,
	pub legend: Option<String>,
	pub legend_class: Option<String>,
	pub description: Option<String>,
	pub description_class: Option<String>,
	pub class: Option<String>,
	pub hide_fieldset: bool,
	pub belongs_to: Option<String>,
	/// Full names of the fields drawn in this group, in declaration order
	pub elements: Vec<String>,
}

impl FormGroup {
	fn from_config(key: String, group: &GroupConfig) -> Self {
		Self {
			key,
			legend: group.legend.clone(),
			legend_class: group.legend_class.clone(),
			description: group.description.clone(),
			description_class: group.description_class.clone(),
			class: group.class.clone(),
			hide_fieldset: group.hide_fieldset,
			belongs_to: group.belongs_to.clone(),
			elements: Vec::new(),
		}
	}

	fn legend(&self) -> Option<&str> {
		self.legend.as_deref().filter(|legend| !legend.is_empty())
	}
}

/// A configured form
///
/// # Examples
///
/// ```
/// use formwork_forms::{Form, FormConfig, SubmittedRequest};
/// use formwork_sessions::InMemorySessionStore;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let config = FormConfig::from_value(json!({
///     "name": "signup",
///     "elements": {
///         "email": ["email", {"label": "E-mail", "required": true}],
///         "age": ["number", {"label": "Age"}]
///     }
/// }))
/// .unwrap();
/// let session = Arc::new(InMemorySessionStore::new());
/// let mut form = Form::new(config, session).unwrap();
///
/// form.render();
/// let token = form.csrf_token().unwrap();
/// let request = SubmittedRequest::post(json!({"email": "a@b.co", "age": "42", "_csrf": token}));
///
/// assert!(form.is_valid(&request));
/// assert_eq!(form.get_values(), *json!({"email": "a@b.co", "age": 42}).as_object().unwrap());
/// ```
pub struct Form {
	name: String,
	action: Option<String>,
	method: String,
	class: Option<String>,
	csrf_single_use: bool,
	csrf_key: String,
	layout: Vec<FormGroup>,
	fields: IndexMap<String, Box<dyn FormField>>,
	groups: IndexMap<String, Vec<String>>,
	errors: Vec<String>,
	all_errors: OnceLock<Vec<ValidationMessage>>,
	registry: Arc<FieldRegistry>,
	session: Arc<dyn SessionStore>,
}

impl Form {
	/// Build a form from `config` using the built-in field kinds
	pub fn new(config: FormConfig, session: Arc<dyn SessionStore>) -> FormResult<Self> {
		Self::with_registry(config, session, FieldRegistry::shared())
	}

	/// Build a form resolving field types through `registry`
	pub fn with_registry(
		config: FormConfig,
		session: Arc<dyn SessionStore>,
		registry: Arc<FieldRegistry>,
	) -> FormResult<Self> {
		let mut form = Self {
			name: DEFAULT_FORM_NAME.to_string(),
			action: None,
			method: DEFAULT_METHOD.to_string(),
			class: None,
			csrf_single_use: false,
			csrf_key: DEFAULT_FORM_NAME.to_string(),
			layout: Vec::new(),
			fields: IndexMap::new(),
			groups: IndexMap::new(),
			errors: Vec::new(),
			all_errors: OnceLock::new(),
			registry,
			session,
		};
		form.configure(config)?;
		Ok(form)
	}

	/// Build a form and populate it with `defaults` (e.g. a stored record)
	pub fn with_defaults(
		config: FormConfig,
		session: Arc<dyn SessionStore>,
		defaults: &Map<String, Value>,
	) -> FormResult<Self> {
		let mut form = Self::new(config, session)?;
		form.populate(defaults, false);
		Ok(form)
	}

	/// (Re)build every field from `config`, discarding the previous state
	pub fn configure(&mut self, config: FormConfig) -> FormResult<()> {
		self.name = config.form_name().to_string();
		self.csrf_key = self.name.clone();
		let FormConfig {
			action,
			method,
			class,
			csrf_single_use,
			groups,
			elements,
			..
		} = config;
		self.action = action;
		self.method = method;
		self.class = class;
		self.csrf_single_use = csrf_single_use;

		self.layout.clear();
		self.fields.clear();
		self.groups.clear();
		self.errors.clear();
		self.invalidate();

		let mut declared: Vec<(String, GroupConfig)> = groups.into_iter().collect();
		if !elements.is_empty() {
			let key = declared.len().to_string();
			declared.push((
				key,
				GroupConfig {
					elements,
					..GroupConfig::default()
				},
			));
		}

		for (key, mut group) in declared {
			let elements = std::mem::take(&mut group.elements);
			self.layout.push(FormGroup::from_config(key, &group));
			for (name, ElementDecl { field_type, config }) in elements {
				let belongs_to = config
					.belongs_to
					.clone()
					.or_else(|| group.belongs_to.clone());
				self.add_field(&name, &field_type, config, belongs_to.as_deref(), false)?;
			}
		}

		let csrf_config = FieldConfig::new()
			.with_attribute("csrf_key", Value::from(self.csrf_key.clone()))
			.with_attribute("csrf_single_use", Value::from(self.csrf_single_use));
		self.register_field(CSRF_FIELD_NAME, "csrf", csrf_config, None, true)?;

		tracing::debug!(form = %self.name, fields = self.fields.len(), "form configured");
		Ok(())
	}

	/// Register one field and draw it in the last declaration group.
	///
	/// Returns the field's full name.
	///
	/// # Errors
	///
	/// - [`FormError::FieldAlreadyExists`] when the full name is taken and
	///   `overwrite` is false
	/// - [`FormError::FieldTypeNotFound`] when no factory matches `field_type`
	/// - [`FormError::Field`] when the field rejects its configuration
	pub fn add_field(
		&mut self,
		name: &str,
		field_type: &str,
		config: FieldConfig,
		group: Option<&str>,
		overwrite: bool,
	) -> FormResult<String> {
		let full_name = self.register_field(name, field_type, config, group, overwrite)?;

		if self.layout.is_empty() {
			self.layout.push(FormGroup {
				key: "0".to_string(),
				..FormGroup::default()
			});
		}
		let drawn = self.layout.iter().any(|g| g.elements.contains(&full_name));
		if !drawn && let Some(last) = self.layout.last_mut() {
			last.elements.push(full_name.clone());
		}
		Ok(full_name)
	}

	fn register_field(
		&mut self,
		name: &str,
		field_type: &str,
		config: FieldConfig,
		group: Option<&str>,
		overwrite: bool,
	) -> FormResult<String> {
		let full_name = full_field_name(name, group);
		let exists = self.fields.contains_key(&full_name);
		if exists && !overwrite {
			return Err(FormError::FieldAlreadyExists(full_name));
		}

		let context = BuildContext {
			form_name: self.name.clone(),
			session: Arc::clone(&self.session),
		};
		let field = self.registry.build(
			field_type,
			FieldSpec {
				name,
				group,
				config,
				context: &context,
			},
		)?;

		if exists {
			tracing::debug!(form = %self.name, field = %full_name, field_type = %field_type, "field overwritten");
		} else {
			tracing::debug!(form = %self.name, field = %full_name, field_type = %field_type, "field registered");
		}
		self.fields.insert(full_name.clone(), field);

		if let Some(group) = group {
			let members = self.groups.entry(group.to_string()).or_default();
			if !members.contains(&full_name) {
				members.push(full_name.clone());
			}
		}
		self.invalidate();
		Ok(full_name)
	}

	/// Set field values from `data`.
	///
	/// Keys naming a value group with an object value are redirected to the
	/// group's members (`{"address": {"city": ..}}` sets `address_city`).
	/// Unknown keys are ignored.
	pub fn populate(&mut self, data: &Map<String, Value>, clear_first: bool) {
		if clear_first {
			for field in self.fields.values_mut() {
				field.clear_value();
			}
		}

		for (key, value) in data {
			if self.groups.contains_key(key)
				&& let Value::Object(members) = value
			{
				for (member, member_value) in members {
					if let Some(field) = self.fields.get_mut(&full_field_name(member, Some(key))) {
						field.set_value(member_value.clone());
					}
				}
				continue;
			}
			if let Some(field) = self.fields.get_mut(key) {
				field.set_value(value.clone());
			}
		}
		self.invalidate();
	}

	/// Populate from a submission and validate every field.
	///
	/// A request whose method differs (case-insensitively) from the form's
	/// is rejected without touching any field.
	pub fn is_valid(&mut self, request: &SubmittedRequest) -> bool {
		if !request.method.eq_ignore_ascii_case(&self.method) {
			tracing::warn!(
				form = %self.name,
				expected = %self.method,
				received = %request.method,
				"request method does not match form method"
			);
			return false;
		}

		self.populate(&request.body, true);
		if !request.files.is_empty() {
			let files = normalize_uploads(&request.files);
			self.populate(&files, false);
		}
		self.validate()
	}

	/// Validate every field against its current value, never stopping early
	pub fn validate(&mut self) -> bool {
		let snapshot: IndexMap<String, Value> = self
			.fields
			.iter()
			.map(|(name, field)| (name.clone(), field.core().value.clone()))
			.collect();

		let mut invalid = 0usize;
		for field in self.fields.values_mut() {
			if !field.validate(&snapshot) {
				invalid += 1;
			}
		}
		self.invalidate();

		tracing::debug!(form = %self.name, invalid_fields = invalid, "form validated");
		invalid == 0
	}

	/// Values of every data-carrying field, grouped fields nested under their group
	pub fn get_values(&self) -> Map<String, Value> {
		let mut values = Map::new();
		for field in self.fields.values() {
			let Some(value) = field.value() else {
				continue;
			};
			match field.group() {
				Some(group) => {
					let nested = values
						.entry(group.to_string())
						.or_insert_with(|| Value::Object(Map::new()));
					if let Value::Object(nested) = nested {
						nested.insert(field.name().to_string(), value.clone());
					}
				}
				None => {
					values.insert(field.full_name().to_string(), value.clone());
				}
			}
		}
		values
	}

	/// Value of the field registered as `name` (`None` for excluded kinds)
	pub fn get_value(&self, name: &str) -> FormResult<Option<&Value>> {
		Ok(self.get_field(name)?.value())
	}

	pub fn get_field(&self, name: &str) -> FormResult<&dyn FormField> {
		match self.fields.get(name) {
			Some(field) => Ok(field.as_ref()),
			None => Err(FormError::FieldNotFound(name.to_string())),
		}
	}

	pub fn get_field_mut(&mut self, name: &str) -> FormResult<&mut dyn FormField> {
		self.invalidate();
		match self.fields.get_mut(name) {
			Some(field) => Ok(field.as_mut()),
			None => Err(FormError::FieldNotFound(name.to_string())),
		}
	}

	pub fn has_field(&self, name: &str) -> bool {
		self.fields.contains_key(name)
	}

	/// Fields in registration order, keyed by full name
	pub fn fields(&self) -> impl Iterator<Item = (&str, &dyn FormField)> {
		self.fields
			.iter()
			.map(|(name, field)| (name.as_str(), field.as_ref() as &dyn FormField))
	}

	/// Full names of the members of value group `group`
	pub fn group_members(&self, group: &str) -> &[String] {
		self.groups.get(group).map(Vec::as_slice).unwrap_or_default()
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Rename the form. Only rendering is affected; the CSRF key keeps the
	/// name the form was configured with.
	pub fn set_name(&mut self, name: impl Into<String>) {
		self.name = name.into();
	}

	pub fn action(&self) -> Option<&str> {
		self.action.as_deref()
	}

	pub fn method(&self) -> &str {
		&self.method
	}

	pub fn class(&self) -> Option<&str> {
		self.class.as_deref()
	}

	/// Declaration groups in rendering order
	pub fn get_options(&self) -> &[FormGroup] {
		&self.layout
	}

	/// The CSRF token issued by the most recent render
	pub fn csrf_token(&self) -> Option<String> {
		CsrfSessionManager::new()
			.get_token(self.session.as_ref(), &self.csrf_key)
			.ok()
			.flatten()
	}

	/// Record an error that belongs to the form rather than a field
	pub fn add_error(&mut self, message: impl Into<String>) {
		self.errors.push(message.into());
		self.invalidate();
	}

	/// Form-level errors
	pub fn errors(&self) -> &[String] {
		&self.errors
	}

	pub fn has_errors(&self) -> bool {
		!self.errors.is_empty()
	}

	/// Form-level errors followed by every field error, labelled
	pub fn all_errors(&self) -> &[ValidationMessage] {
		self.all_errors.get_or_init(|| {
			let form_errors = self.errors.iter().map(|message| ValidationMessage {
				message: message.clone(),
				label: None,
			});
			let field_errors = self.fields.values().flat_map(|field| {
				let label = field.label().unwrap_or(field.name()).to_string();
				field.errors().iter().map(move |message| ValidationMessage {
					message: message.clone(),
					label: Some(label.clone()),
				})
			});
			form_errors.chain(field_errors).collect()
		})
	}

	pub fn has_any_errors(&self) -> bool {
		!self.all_errors().is_empty()
	}

	fn invalidate(&mut self) {
		self.all_errors.take();
	}

	pub fn open_form(&self) -> String {
		let enctype = if self.fields.values().any(|f| f.kind().is_file_upload()) {
			r#" enctype="multipart/form-data""#
		} else {
			""
		};
		format!(
			r#"<form id="{}" action="{}" method="{}" class="form {}"{}>"#,
			escape_html_attr(&self.name),
			escape_html_attr(self.action.as_deref().unwrap_or_default()),
			escape_html_attr(&self.method),
			escape_html_attr(self.class.as_deref().unwrap_or_default()),
			enctype
		)
	}

	pub fn close_form(&self) -> String {
		"</form>".to_string()
	}

	/// Editable markup of the whole form
	pub fn render(&self) -> String {
		let mut output = self.open_form();

		// Hidden fields have no wrapper of their own, so their errors join the form-level ones
		let hidden_errors = self
			.fields
			.values()
			.filter(|field| field.kind().is_hidden())
			.flat_map(|field| field.errors().iter());
		let errors: Vec<String> = self
			.errors
			.iter()
			.chain(hidden_errors)
			.map(|e| escape_html(e))
			.collect();
		if !errors.is_empty() {
			output.push_str(&format!(
				r#"<div class="alert alert-danger" role="alert">{}</div>"#,
				errors.join("<br>")
			));
		}

		for group in &self.layout {
			let body: String = self
				.visible_fields(group)
				.map(|field| field.render(&self.name))
				.collect();

			if group.hide_fieldset {
				output.push_str(&body);
				continue;
			}

			output.push_str(&format!(
				r#"<fieldset id="{}" class="{}">"#,
				escape_html_attr(&group.key),
				escape_html_attr(group.class.as_deref().unwrap_or_default())
			));
			if let Some(legend) = group.legend() {
				output.push_str(&format!(
					r#"<legend class="{}"><div>{}</div></legend>"#,
					escape_html_attr(group.legend_class.as_deref().unwrap_or_default()),
					legend
				));
				if let Some(description) = group.description.as_deref().filter(|d| !d.is_empty()) {
					output.push_str(&format!(
						r#"<p class="{}">{}</p>"#,
						escape_html_attr(group.description_class.as_deref().unwrap_or_default()),
						description
					));
				}
			}
			output.push_str(&body);
			output.push_str("</fieldset>");
		}

		output.push_str(&self.render_hidden());
		output.push_str(&self.close_form());
		output
	}

	/// Hidden inputs (including the CSRF token), one per line
	pub fn render_hidden(&self) -> String {
		self.fields
			.values()
			.filter(|field| field.kind().is_hidden())
			.map(|field| field.render(&self.name))
			.collect::<Vec<_>>()
			.join("\n")
	}

	/// Read-only definition-list rendering of the current values
	pub fn render_view(&self, show_empty: bool) -> String {
		let mut output = String::new();
		for group in &self.layout {
			let items: String = self
				.visible_fields(group)
				.map(|field| field.render_view(show_empty))
				.collect();
			if items.is_empty() {
				continue;
			}

			let legend = group.legend();
			if let Some(legend) = legend {
				output.push_str(&format!(
					r#"<fieldset id="{}" class="{}"><legend class="{}">{}</legend>"#,
					escape_html_attr(&group.key),
					escape_html_attr(group.class.as_deref().unwrap_or_default()),
					escape_html_attr(group.legend_class.as_deref().unwrap_or_default()),
					legend
				));
				if let Some(description) = group.description.as_deref().filter(|d| !d.is_empty()) {
					output.push_str(&format!("<p>{}</p>", description));
				}
			}
			output.push_str("<dl>");
			output.push_str(&items);
			output.push_str("</dl>");
			if legend.is_some() {
				output.push_str("</fieldset>");
			}
		}
		output
	}

	fn visible_fields<'a>(&'a self, group: &'a FormGroup) -> impl Iterator<Item = &'a dyn FormField> + 'a {
		group
			.elements
			.iter()
			.filter_map(|name| self.fields.get(name))
			.filter(|field| !field.kind().is_hidden())
			.map(|field| field.as_ref() as &dyn FormField)
	}
}

impl fmt::Debug for Form {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Form")
			.field("name", &self.name)
			.field("method", &self.method)
			.field("fields", &self.fields.keys().collect::<Vec<_>>())
			.field("groups", &self.groups)
			.field("errors", &self.errors)
			.finish_non_exhaustive()
	}
}
