//! Anti-forgery token field

use crate::config::FieldConfig;
use crate::field::{FieldCore, FieldKind, FieldLookup, FieldResult, FormField, configure_base};
use crate::html::render_input;
use formwork_sessions::{CsrfSessionManager, SessionStore};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub const CSRF_FAILURE_MESSAGE: &str = "CSRF validation failure.";

/// Options specific to the CSRF field
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CsrfOptions {
	/// Session key of the token, defaults to the field's full name
	pub csrf_key: Option<String>,
	/// Discard the token after one successful verification
	pub csrf_single_use: bool,
}

/// Hidden field carrying a per-session token.
///
/// Every render issues a fresh token, stores it in the session under the
/// field's key and keeps it as the field's issued value (see
/// [`issued_token`](CsrfField::issued_token)). Validation compares the
/// submitted value against the stored token in constant time, then runs any
/// registered validators. Failures never reveal why they failed.
///
/// The field is excluded from [`value`](FormField::value) so tokens never
/// leak into extracted form data.
///
/// # Examples
///
/// ```
/// use formwork_forms::{FieldConfig, FormField, NoLookup, build_field};
/// use formwork_forms::fields::CsrfField;
/// use formwork_sessions::InMemorySessionStore;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let session = Arc::new(InMemorySessionStore::new());
/// let mut field = build_field(
///     CsrfField::new("_csrf", None, session),
///     FieldConfig::new().with_attribute("csrf_key", json!("login")),
/// )
/// .unwrap();
///
/// let html = field.control("login");
/// let token = field.current_token().unwrap();
/// assert!(html.contains(&token));
/// assert_eq!(field.issued_token(), Some(token.clone()));
/// assert!(field.is_valid(Some(json!(token)), &NoLookup));
/// assert!(!field.is_valid(Some(json!("forged")), &NoLookup));
/// ```
pub struct CsrfField {
	core: FieldCore,
	csrf_options: CsrfOptions,
	session: Arc<dyn SessionStore>,
	manager: CsrfSessionManager,
	issued: Mutex<Option<String>>,
}

impl CsrfField {
	pub fn new(name: impl Into<String>, group: Option<&str>, session: Arc<dyn SessionStore>) -> Self {
		let mut core = FieldCore::new(name, group);
		core.options.required = true;
		core.attributes
			.insert("autocomplete".to_string(), Value::from("off"));
		Self {
			core,
			csrf_options: CsrfOptions::default(),
			session,
			manager: CsrfSessionManager::new(),
			issued: Mutex::new(None),
		}
	}

	/// Use a non-default session namespace for the token table
	pub fn with_manager(mut self, manager: CsrfSessionManager) -> Self {
		self.manager = manager;
		self
	}

	/// Session key the token is stored under
	pub fn csrf_key(&self) -> &str {
		self.csrf_options
			.csrf_key
			.as_deref()
			.unwrap_or(self.core.full_name())
	}

	/// The token most recently issued for this field's key
	pub fn current_token(&self) -> Option<String> {
		self.manager
			.get_token(self.session.as_ref(), self.csrf_key())
			.ok()
			.flatten()
	}

	/// Token embedded by the most recent render of this field
	pub fn issued_token(&self) -> Option<String> {
		self.issued.lock().clone()
	}

	fn verify(&self, submitted: &str) -> bool {
		match self.manager.verify(self.session.as_ref(), self.csrf_key(), submitted) {
			Ok(verified) => verified,
			Err(error) => {
				tracing::warn!(csrf_key = %self.csrf_key(), error = %error, "CSRF session lookup failed");
				false
			}
		}
	}
}

impl FormField for CsrfField {
	fn core(&self) -> &FieldCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut FieldCore {
		&mut self.core
	}

	fn kind(&self) -> FieldKind {
		FieldKind::Csrf
	}

	fn configure(&mut self, mut config: FieldConfig) -> FieldResult<()> {
		self.csrf_options = config.take_options(self.core.name(), &["csrf_key", "csrf_single_use"])?;
		configure_base(self, config)?;
		let core = &mut self.core;
		core.options.required = true;
		core.options.label = None;
		core.attributes
			.insert("autocomplete".to_string(), Value::from("off"));
		Ok(())
	}

	fn value(&self) -> Option<&Value> {
		None
	}

	fn validate(&mut self, lookup: &dyn FieldLookup) -> bool {
		self.core.errors.clear();
		let submitted = self.core.value.as_str().unwrap_or_default();

		if submitted.is_empty() || !self.verify(submitted) {
			tracing::warn!(csrf_key = %self.csrf_key(), "CSRF token rejected");
			self.add_error(CSRF_FAILURE_MESSAGE.to_string());
			return false;
		}

		// A rejection here keeps a single-use token alive for the retry
		let value = self.core.value.clone();
		let validators = self.core.validators.clone();
		for validator in &validators {
			if let Err(message) = validator(&value, lookup) {
				self.add_error(message);
				return false;
			}
		}

		if self.csrf_options.csrf_single_use
			&& let Err(error) = self.manager.clear_token(self.session.as_ref(), self.csrf_key())
		{
			tracing::warn!(csrf_key = %self.csrf_key(), error = %error, "failed to discard CSRF token");
		}
		true
	}

	fn control(&self, form_name: &str) -> String {
		let token = match self.manager.generate_token(self.session.as_ref(), self.csrf_key()) {
			Ok(token) => token,
			Err(error) => {
				tracing::warn!(csrf_key = %self.csrf_key(), error = %error, "failed to issue CSRF token");
				String::new()
			}
		};
		let html = render_input(&self.core, form_name, "hidden", &token);
		*self.issued.lock() = (!token.is_empty()).then_some(token);
		html
	}

	fn render(&self, form_name: &str) -> String {
		self.control(form_name)
	}

	fn render_view(&self, _show_empty: bool) -> String {
		String::new()
	}
}

impl fmt::Debug for CsrfField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CsrfField")
			.field("full_name", &self.core.full_name())
			.field("csrf_key", &self.csrf_key())
			.field("csrf_single_use", &self.csrf_options.csrf_single_use)
			.field("issued", &self.issued.lock().is_some())
			.finish_non_exhaustive()
	}
}
