//! Declarative form configuration
//!
//! A form is described by a [`FormConfig`]: ordered groups (fieldsets), each
//! holding ordered element declarations `[type, { ...field config... }]`.
//! Configurations deserialize from JSON or TOML and can also be assembled
//! with the `with_*` builders. Filters and validators are closures and are
//! only ever attached through the builders.

use crate::choices::Choices;
use crate::field::{FieldError, FieldResult, Filter, Validator};
use crate::form::{DEFAULT_FORM_NAME, FormError, FormResult};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::fmt;

/// Configuration of a single field
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
	#[serde(deserialize_with = "deserialize_label")]
	pub label: Option<String>,
	pub label_class: Option<String>,
	pub required: bool,
	#[serde(alias = "options")]
	pub choices: Option<Choices>,
	pub description: Option<String>,
	pub description_class: Option<String>,
	pub form_group_class: Option<String>,
	pub default: Option<Value>,
	pub value: Option<Value>,
	/// Value-nesting group; overrides the enclosing group's `belongsTo`
	#[serde(rename = "belongsTo", alias = "belongs_to")]
	pub belongs_to: Option<String>,
	/// Everything else: rendering attributes plus kind-specific options
	#[serde(flatten)]
	pub attributes: IndexMap<String, Value>,
	#[serde(skip)]
	pub filters: Vec<Filter>,
	#[serde(skip)]
	pub validators: Vec<Validator>,
}

impl FieldConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_label_class(mut self, class: impl Into<String>) -> Self {
		self.label_class = Some(class.into());
		self
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn with_choices(mut self, choices: Choices) -> Self {
		self.choices = Some(choices);
		self
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn with_description_class(mut self, class: impl Into<String>) -> Self {
		self.description_class = Some(class.into());
		self
	}

	pub fn with_form_group_class(mut self, class: impl Into<String>) -> Self {
		self.form_group_class = Some(class.into());
		self
	}

	pub fn with_default(mut self, default: Value) -> Self {
		self.default = Some(default);
		self
	}

	pub fn with_value(mut self, value: Value) -> Self {
		self.value = Some(value);
		self
	}

	pub fn belongs_to(mut self, group: impl Into<String>) -> Self {
		self.belongs_to = Some(group.into());
		self
	}

	/// Set a rendering attribute or kind-specific option (`step`, `min_length`, ...)
	pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
		self.attributes.insert(key.into(), value);
		self
	}

	pub fn with_filter(mut self, filter: Filter) -> Self {
		self.filters.push(filter);
		self
	}

	pub fn with_filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
		self.filters.extend(filters);
		self
	}

	pub fn with_validator(mut self, validator: Validator) -> Self {
		self.validators.push(validator);
		self
	}

	pub fn with_validators(mut self, validators: impl IntoIterator<Item = Validator>) -> Self {
		self.validators.extend(validators);
		self
	}

	/// Remove `keys` from the attributes and deserialize them into a typed
	/// option struct. Missing keys fall back to the struct's serde defaults.
	pub fn take_options<T: DeserializeOwned>(&mut self, field: &str, keys: &[&str]) -> FieldResult<T> {
		let mut extracted = Map::new();
		for key in keys {
			if let Some(value) = self.attributes.shift_remove(*key) {
				extracted.insert((*key).to_string(), value);
			}
		}
		serde_json::from_value(Value::Object(extracted)).map_err(|e| FieldError::InvalidOption {
			field: field.to_string(),
			message: e.to_string(),
		})
	}
}

impl fmt::Debug for FieldConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldConfig")
			.field("label", &self.label)
			.field("required", &self.required)
			.field("choices", &self.choices)
			.field("default", &self.default)
			.field("value", &self.value)
			.field("belongs_to", &self.belongs_to)
			.field("attributes", &self.attributes)
			.field("filters", &self.filters.len())
			.field("validators", &self.validators.len())
			.finish_non_exhaustive()
	}
}

/// Labels accept a string, or `false`/null for "no label"
fn deserialize_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<Value>::deserialize(deserializer)? {
		None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
		Some(Value::String(label)) => Ok(Some(label)),
		Some(Value::Number(n)) => Ok(Some(n.to_string())),
		Some(other) => Err(serde::de::Error::custom(format!(
			"label must be a string or false, found {}",
			other
		))),
	}
}

/// One element declaration: field type tag plus its configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawElementDecl")]
pub struct ElementDecl {
	pub field_type: String,
	pub config: FieldConfig,
}

impl ElementDecl {
	pub fn new(field_type: impl Into<String>, config: FieldConfig) -> Self {
		Self {
			field_type: field_type.into(),
			config,
		}
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawElementDecl {
	Pair(String, FieldConfig),
	Single((String,)),
	Bare(String),
}

impl From<RawElementDecl> for ElementDecl {
	fn from(raw: RawElementDecl) -> Self {
		match raw {
			RawElementDecl::Pair(field_type, config) => Self::new(field_type, config),
			RawElementDecl::Single((field_type,)) | RawElementDecl::Bare(field_type) => {
				Self::new(field_type, FieldConfig::default())
			}
		}
	}
}

/// A declaration group: rendered as one fieldset
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
	pub legend: Option<String>,
	pub legend_class: Option<String>,
	pub description: Option<String>,
	pub description_class: Option<String>,
	pub class: Option<String>,
	pub hide_fieldset: bool,
	/// Value-nesting group applied to every element of this fieldset
	#[serde(rename = "belongsTo", alias = "belongs_to")]
	pub belongs_to: Option<String>,
	pub elements: IndexMap<String, ElementDecl>,
}

impl GroupConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_legend(mut self, legend: impl Into<String>) -> Self {
		self.legend = Some(legend.into());
		self
	}

	pub fn with_legend_class(mut self, class: impl Into<String>) -> Self {
		self.legend_class = Some(class.into());
		self
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn with_description_class(mut self, class: impl Into<String>) -> Self {
		self.description_class = Some(class.into());
		self
	}

	pub fn with_class(mut self, class: impl Into<String>) -> Self {
		self.class = Some(class.into());
		self
	}

	pub fn hide_fieldset(mut self) -> Self {
		self.hide_fieldset = true;
		self
	}

	pub fn belongs_to(mut self, group: impl Into<String>) -> Self {
		self.belongs_to = Some(group.into());
		self
	}

	pub fn with_element(
		mut self,
		name: impl Into<String>,
		field_type: impl Into<String>,
		config: FieldConfig,
	) -> Self {
		self.elements
			.insert(name.into(), ElementDecl::new(field_type, config));
		self
	}
}

/// Top-level form configuration
///
/// # Examples
///
/// ```
/// use formwork_forms::FormConfig;
///
/// let config = FormConfig::from_json(r#"{
///     "name": "contact",
///     "groups": {
///         "main": {
///             "legend": "Contact",
///             "elements": {
///                 "email": ["email", {"label": "E-mail", "required": true}],
///                 "send": ["submit", {"label": "Send"}]
///             }
///         }
///     }
/// }"#).unwrap();
///
/// assert_eq!(config.name.as_deref(), Some("contact"));
/// assert_eq!(config.method, "POST");
/// assert_eq!(config.groups["main"].elements.len(), 2);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormConfig {
	pub name: Option<String>,
	pub action: Option<String>,
	pub method: String,
	pub class: Option<String>,
	/// Discard the CSRF token after one successful verification
	pub csrf_single_use: bool,
	#[serde(deserialize_with = "deserialize_groups")]
	pub groups: IndexMap<String, GroupConfig>,
	/// Shorthand for a single unnamed group, appended after `groups`
	pub elements: IndexMap<String, ElementDecl>,
}

impl Default for FormConfig {
	fn default() -> Self {
		Self {
			name: None,
			action: None,
			method: crate::form::DEFAULT_METHOD.to_string(),
			class: None,
			csrf_single_use: false,
			groups: IndexMap::new(),
			elements: IndexMap::new(),
		}
	}
}

impl FormConfig {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: Some(name.into()),
			..Self::default()
		}
	}

	pub fn from_json(json: &str) -> FormResult<Self> {
		Ok(serde_json::from_str(json)?)
	}

	pub fn from_value(value: Value) -> FormResult<Self> {
		Ok(serde_json::from_value(value)?)
	}

	pub fn from_toml(source: &str) -> FormResult<Self> {
		toml::from_str(source).map_err(FormError::Toml)
	}

	/// Name used for the `<form>` id and the CSRF key
	pub fn form_name(&self) -> &str {
		self.name.as_deref().unwrap_or(DEFAULT_FORM_NAME)
	}

	pub fn with_action(mut self, action: impl Into<String>) -> Self {
		self.action = Some(action.into());
		self
	}

	pub fn with_method(mut self, method: impl Into<String>) -> Self {
		self.method = method.into();
		self
	}

	pub fn with_class(mut self, class: impl Into<String>) -> Self {
		self.class = Some(class.into());
		self
	}

	pub fn csrf_single_use(mut self) -> Self {
		self.csrf_single_use = true;
		self
	}

	pub fn with_group(mut self, key: impl Into<String>, group: GroupConfig) -> Self {
		self.groups.insert(key.into(), group);
		self
	}

	pub fn with_element(
		mut self,
		name: impl Into<String>,
		field_type: impl Into<String>,
		config: FieldConfig,
	) -> Self {
		self.elements
			.insert(name.into(), ElementDecl::new(field_type, config));
		self
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GroupsDecl {
	Map(IndexMap<String, GroupConfig>),
	List(Vec<GroupConfig>),
}

/// Groups may be keyed or listed; listed groups are keyed by position
fn deserialize_groups<'de, D>(deserializer: D) -> Result<IndexMap<String, GroupConfig>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match GroupsDecl::deserialize(deserializer)? {
		GroupsDecl::Map(groups) => groups,
		GroupsDecl::List(groups) => groups
			.into_iter()
			.enumerate()
			.map(|(index, group)| (index.to_string(), group))
			.collect(),
	})
}
