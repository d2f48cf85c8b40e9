//! CSRF token bookkeeping on top of a [`SessionStore`]
//!
//! Tokens live in one session entry holding an object keyed by the CSRF key
//! (normally the form name), so several forms can be open at once.

use crate::store::{SessionError, SessionResult, SessionStore};
use formwork_core::{constant_time_eq, generate_token};
use serde_json::{Map, Value};

/// Session key under which all form tokens are kept
pub const CSRF_SESSION_NAMESPACE: &str = "formwork_csrf";

/// Generates, verifies and discards per-key CSRF tokens
#[derive(Debug, Clone)]
pub struct CsrfSessionManager {
	namespace: String,
}

impl CsrfSessionManager {
	pub fn new() -> Self {
		Self {
			namespace: CSRF_SESSION_NAMESPACE.to_string(),
		}
	}

	/// Use a custom session key instead of [`CSRF_SESSION_NAMESPACE`]
	pub fn with_namespace(namespace: impl Into<String>) -> Self {
		Self {
			namespace: namespace.into(),
		}
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	/// Generate a new token for `csrf_key`, replacing any previous one
	pub fn generate_token(&self, store: &dyn SessionStore, csrf_key: &str) -> SessionResult<String> {
		let token = generate_token();
		let mut tokens = self.load(store)?;
		tokens.insert(csrf_key.to_string(), Value::String(token.clone()));
		store.set(&self.namespace, Value::Object(tokens))?;

		tracing::trace!(csrf_key = %csrf_key, "generated CSRF token");
		Ok(token)
	}

	/// Token currently stored for `csrf_key`, if any
	pub fn get_token(&self, store: &dyn SessionStore, csrf_key: &str) -> SessionResult<Option<String>> {
		let tokens = self.load(store)?;
		Ok(tokens
			.get(csrf_key)
			.and_then(Value::as_str)
			.map(str::to_string))
	}

	/// Compare `submitted` against the stored token in constant time.
	///
	/// A missing stored token never verifies.
	pub fn verify(&self, store: &dyn SessionStore, csrf_key: &str, submitted: &str) -> SessionResult<bool> {
		let Some(expected) = self.get_token(store, csrf_key)? else {
			tracing::debug!(csrf_key = %csrf_key, "no CSRF token stored for key");
			return Ok(false);
		};
		Ok(constant_time_eq(expected.as_bytes(), submitted.as_bytes()))
	}

	/// Discard the token for `csrf_key`
	pub fn clear_token(&self, store: &dyn SessionStore, csrf_key: &str) -> SessionResult<()> {
		let mut tokens = self.load(store)?;
		if tokens.remove(csrf_key).is_some() {
			store.set(&self.namespace, Value::Object(tokens))?;
		}
		Ok(())
	}

	fn load(&self, store: &dyn SessionStore) -> SessionResult<Map<String, Value>> {
		match store.get(&self.namespace)? {
			None => Ok(Map::new()),
			Some(Value::Object(map)) => Ok(map),
			Some(other) => Err(SessionError::Malformed {
				key: self.namespace.clone(),
				reason: format!("expected an object, found {}", other),
			}),
		}
	}
}

impl Default for CsrfSessionManager {
	fn default() -> Self {
		Self::new()
	}
}
