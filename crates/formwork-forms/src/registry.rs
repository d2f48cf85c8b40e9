//! Field type registry
//!
//! Maps type tags used in form configurations to factories that build
//! configured fields. Lookups try the exact tag, then the alias table, then
//! the lowercased tag, so `"TextArea"`, `"textarea"` and registered aliases
//! all resolve to the same factory.

use crate::config::FieldConfig;
use crate::field::{FieldResult, FormField, build_field};
use crate::fields::{
	ButtonField, ChoiceField, CsrfField, DateField, EmailField, FileField, HiddenField,
	MarkupField, MultipleChoiceField, NumberField, PasswordField, RecaptchaField, TextAreaField,
	TextField, TimeField, ToggleField, UrlField,
};
use crate::form::{FormError, FormResult};
use formwork_sessions::SessionStore;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Form-level collaborators a factory may need
#[derive(Clone)]
pub struct BuildContext {
	pub form_name: String,
	pub session: Arc<dyn SessionStore>,
}

impl fmt::Debug for BuildContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BuildContext")
			.field("form_name", &self.form_name)
			.finish_non_exhaustive()
	}
}

/// Everything a factory receives to build one field
#[derive(Debug)]
pub struct FieldSpec<'a> {
	pub name: &'a str,
	pub group: Option<&'a str>,
	pub config: FieldConfig,
	pub context: &'a BuildContext,
}

pub type FieldFactory = Arc<dyn Fn(FieldSpec<'_>) -> FieldResult<Box<dyn FormField>> + Send + Sync>;

static DEFAULT_REGISTRY: LazyLock<Arc<FieldRegistry>> =
	LazyLock::new(|| Arc::new(FieldRegistry::with_builtin_fields()));

/// Registry of field factories keyed by type tag
#[derive(Clone, Default)]
pub struct FieldRegistry {
	factories: HashMap<String, FieldFactory>,
	aliases: HashMap<String, String>,
}

impl FieldRegistry {
	/// Empty registry
	pub fn new() -> Self {
		Self::default()
	}

	/// Shared registry holding the built-in kinds
	pub fn shared() -> Arc<FieldRegistry> {
		Arc::clone(&DEFAULT_REGISTRY)
	}

	/// Registry holding every built-in kind and alias
	///
	/// # Examples
	///
	/// ```
	/// use formwork_forms::FieldRegistry;
	///
	/// let registry = FieldRegistry::with_builtin_fields();
	/// assert!(registry.contains("text"));
	/// assert!(registry.contains("TextArea"));
	/// assert!(registry.contains("checkboxes"));
	/// assert!(registry.contains("Recaptcha"));
	/// assert!(!registry.contains("captcha"));
	/// ```
	pub fn with_builtin_fields() -> Self {
		let mut registry = Self::new();
		registry.register("text", plain(|name, group| TextField::new(name, group)));
		registry.register("textarea", plain(|name, group| TextAreaField::new(name, group)));
		registry.register("email", plain(|name, group| EmailField::new(name, group)));
		registry.register("url", plain(|name, group| UrlField::new(name, group)));
		registry.register("number", plain(|name, group| NumberField::new(name, group)));
		registry.register("password", plain(|name, group| PasswordField::new(name, group)));
		registry.register("date", plain(|name, group| DateField::new(name, group)));
		registry.register("time", plain(|name, group| TimeField::new(name, group)));
		registry.register("hidden", plain(|name, group| HiddenField::new(name, group)));
		registry.register("select", plain(|name, group| ChoiceField::select(name, group)));
		registry.register("radio", plain(|name, group| ChoiceField::radio(name, group)));
		registry.register("checkbox", plain(|name, group| MultipleChoiceField::checkbox(name, group)));
		registry.register("multiselect", plain(|name, group| MultipleChoiceField::multi_select(name, group)));
		registry.register("toggle", plain(|name, group| ToggleField::new(name, group)));
		registry.register("file", plain(|name, group| FileField::new(name, group)));
		registry.register("markup", plain(|name, group| MarkupField::new(name, group)));
		registry.register("button", plain(|name, group| ButtonField::button(name, group)));
		registry.register("submit", plain(|name, group| ButtonField::submit(name, group)));
		registry.register("recaptcha", plain(|name, group| RecaptchaField::new(name, group)));
		registry.register(
			"csrf",
			Arc::new(|spec: FieldSpec<'_>| -> FieldResult<Box<dyn FormField>> {
				let field = CsrfField::new(spec.name, spec.group, Arc::clone(&spec.context.session));
				Ok(Box::new(build_field(field, spec.config)?) as Box<dyn FormField>)
			}),
		);

		registry.register_alias("checkboxes", "checkbox");
		registry.register_alias("multicheckbox", "checkbox");
		registry.register_alias("multipleselect", "multiselect");
		registry
	}

	/// Register (or replace) the factory for `tag`
	pub fn register(&mut self, tag: impl Into<String>, factory: FieldFactory) {
		self.factories.insert(tag.into(), factory);
	}

	/// Make `alias` resolve to the factory registered under `tag`
	pub fn register_alias(&mut self, alias: impl Into<String>, tag: impl Into<String>) {
		self.aliases.insert(alias.into(), tag.into());
	}

	pub fn contains(&self, field_type: &str) -> bool {
		self.resolve(field_type).is_some()
	}

	/// Find the factory for a configured type name
	pub fn resolve(&self, field_type: &str) -> Option<&FieldFactory> {
		self.lookup(field_type).or_else(|| {
			let lowered = field_type.to_lowercase();
			(lowered != field_type)
				.then(|| self.lookup(&lowered))
				.flatten()
		})
	}

	fn lookup(&self, field_type: &str) -> Option<&FieldFactory> {
		self.factories.get(field_type).or_else(|| {
			self.aliases
				.get(field_type)
				.and_then(|tag| self.factories.get(tag))
		})
	}

	/// Build and configure a field of type `field_type`
	pub fn build(&self, field_type: &str, spec: FieldSpec<'_>) -> FormResult<Box<dyn FormField>> {
		let Some(factory) = self.resolve(field_type) else {
			tracing::warn!(field_type = %field_type, field = %spec.name, "unknown field type");
			return Err(FormError::FieldTypeNotFound(field_type.to_string()));
		};
		let name = spec.name.to_string();
		factory(spec).map_err(|error| FormError::Field { field: name, error })
	}
}

impl fmt::Debug for FieldRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut tags: Vec<&String> = self.factories.keys().collect();
		tags.sort();
		f.debug_struct("FieldRegistry")
			.field("tags", &tags)
			.field("aliases", &self.aliases)
			.finish()
	}
}

/// Factory for kinds whose constructor only needs a name and group
fn plain<F, C>(constructor: C) -> FieldFactory
where
	F: FormField + 'static,
	C: Fn(&str, Option<&str>) -> F + Send + Sync + 'static,
{
	Arc::new(move |spec: FieldSpec<'_>| -> FieldResult<Box<dyn FormField>> {
		let field = build_field(constructor(spec.name, spec.group), spec.config)?;
		Ok(Box::new(field) as Box<dyn FormField>)
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::field::{FieldCore, FieldKind};
	use formwork_sessions::InMemorySessionStore;
	use rstest::*;

	struct StarField {
		core: FieldCore,
	}

	impl FormField for StarField {
		fn core(&self) -> &FieldCore {
			&self.core
		}

		fn core_mut(&mut self) -> &mut FieldCore {
			&mut self.core
		}

		fn kind(&self) -> FieldKind {
			FieldKind::Custom("stars".to_string())
		}

		fn control(&self, _form_name: &str) -> String {
			"*****".to_string()
		}
	}

	#[fixture]
	fn context() -> BuildContext {
		BuildContext {
			form_name: "test".to_string(),
			session: Arc::new(InMemorySessionStore::new()),
		}
	}

	fn spec<'a>(name: &'a str, context: &'a BuildContext) -> FieldSpec<'a> {
		FieldSpec {
			name,
			group: None,
			config: FieldConfig::new(),
			context,
		}
	}

	#[rstest]
	#[case("text", FieldKind::Text)]
	#[case("TextArea", FieldKind::TextArea)]
	#[case("textarea", FieldKind::TextArea)]
	#[case("checkboxes", FieldKind::Checkbox)]
	#[case("multicheckbox", FieldKind::Checkbox)]
	#[case("MultipleSelect", FieldKind::MultiSelect)]
	#[case("Submit", FieldKind::Submit)]
	#[case("csrf", FieldKind::Csrf)]
	#[case("recaptcha", FieldKind::Recaptcha)]
	#[case("ReCaptcha", FieldKind::Recaptcha)]
	fn test_builtin_resolution(context: BuildContext, #[case] tag: &str, #[case] kind: FieldKind) {
		// Arrange
		let registry = FieldRegistry::with_builtin_fields();

		// Act
		let field = registry.build(tag, spec("f", &context)).unwrap();

		// Assert
		assert_eq!(field.kind(), kind);
	}

	#[rstest]
	fn test_unknown_type(context: BuildContext) {
		// Arrange
		let registry = FieldRegistry::with_builtin_fields();

		// Act
		let result = registry.build("captcha", spec("f", &context));

		// Assert
		assert!(matches!(result, Err(FormError::FieldTypeNotFound(ref t)) if t == "captcha"));
	}

	#[rstest]
	fn test_custom_registration(context: BuildContext) {
		// Arrange
		let mut registry = FieldRegistry::with_builtin_fields();
		registry.register(
			"stars",
			Arc::new(|spec: FieldSpec<'_>| -> FieldResult<Box<dyn FormField>> {
				let field = StarField {
					core: FieldCore::new(spec.name, spec.group),
				};
				Ok(Box::new(build_field(field, spec.config)?) as Box<dyn FormField>)
			}),
		);
		registry.register_alias("rating", "stars");

		// Act
		let field = registry.build("Rating", spec("score", &context)).unwrap();

		// Assert
		assert_eq!(field.kind(), FieldKind::Custom("stars".to_string()));
		assert_eq!(field.control("test"), "*****");
	}

	#[rstest]
	fn test_invalid_options_map_to_field_error(context: BuildContext) {
		// Arrange
		let registry = FieldRegistry::with_builtin_fields();
		let mut spec = spec("pw", &context);
		spec.config = FieldConfig::new().with_attribute("min_length", serde_json::json!("many"));

		// Act
		let result = registry.build("password", spec);

		// Assert
		assert!(matches!(result, Err(FormError::Field { ref field, .. }) if field == "pw"));
	}
}
