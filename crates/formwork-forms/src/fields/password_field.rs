//! Password input with length and confirmation checks

use crate::config::FieldConfig;
use crate::field::{FieldCore, FieldKind, FieldLookup, FieldResult, FormField, configure_base, is_empty_value};
use crate::html::render_input;
use serde::Deserialize;
use serde_json::Value;

pub const CONFIRMATION_MISMATCH_MESSAGE: &str = "Field and confirmation field do not match.";

/// Options specific to password inputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PasswordOptions {
	/// Minimum number of characters, 0 disables the check
	pub min_length: usize,
	/// Full name of the sibling field that must hold the same value
	pub confirm: Option<String>,
}

/// Password input. The control never echoes the stored value and read-only
/// rendering omits the field.
///
/// # Examples
///
/// ```
/// use formwork_forms::{FieldConfig, FormField, NoLookup, build_field};
/// use formwork_forms::fields::PasswordField;
/// use serde_json::json;
///
/// let mut field = build_field(
///     PasswordField::new("password", None),
///     FieldConfig::new().with_attribute("min_length", json!(8)),
/// )
/// .unwrap();
/// assert!(!field.is_valid(Some(json!("short")), &NoLookup));
/// assert_eq!(field.errors(), ["Must be more than 8 characters.".to_string()]);
/// ```
#[derive(Debug)]
pub struct PasswordField {
	core: FieldCore,
	password_options: PasswordOptions,
}

impl PasswordField {
	pub fn new(name: impl Into<String>, group: Option<&str>) -> Self {
		let mut core = FieldCore::new(name, group);
		core.attributes
			.insert("type".to_string(), Value::from("password"));
		Self {
			core,
			password_options: PasswordOptions::default(),
		}
	}

	pub fn password_options(&self) -> &PasswordOptions {
		&self.password_options
	}
}

impl FormField for PasswordField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn kind(&self) -> FieldKind {
		FieldKind::Password
	}

	fn configure(&mut self, mut config: FieldConfig) -> FieldResult<()> {
		self.password_options = config.take_options(self.core.name(), &["min_length", "confirm"])?;
		configure_base(self, config)?;
		self.core
			.attributes
			.insert("type".to_string(), Value::from("password"));
		Ok(())
	}

	fn type_check(&self, value: &Value, lookup: &dyn FieldLookup) -> Result<(), String> {
		if is_empty_value(value) {
			return Ok(());
		}
		let password = value.as_str().unwrap_or_default();

		let min_length = self.password_options.min_length;
		if min_length > 0 && password.chars().count() < min_length {
			return Err(format!("Must be more than {} characters.", min_length));
		}

		if let Some(confirm) = self.password_options.confirm.as_deref()
			&& lookup.value_of(confirm) != Some(value)
		{
			return Err(CONFIRMATION_MISMATCH_MESSAGE.to_string());
		}

		Ok(())
	}

	fn control(&self, form_name: &str) -> String {
		render_input(&self.core, form_name, "password", "")
	}

	fn display_value(&self) -> Option<String> {
		None
	}

	fn render_view(&self, _show_empty: bool) -> String {
		String::new()
	}
}
