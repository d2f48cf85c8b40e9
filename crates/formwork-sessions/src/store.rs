//! Session store abstraction and the in-memory backend

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

/// Errors raised by session backends
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
	#[error("Session backend unavailable: {0}")]
	Unavailable(String),
	#[error("Session data for key '{key}' is malformed: {reason}")]
	Malformed { key: String, reason: String },
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Key/value storage scoped to one user session.
///
/// Implementations must be shareable across threads; forms hold them behind
/// an `Arc`.
pub trait SessionStore: Send + Sync {
	/// Fetch the value stored under `key`
	fn get(&self, key: &str) -> SessionResult<Option<Value>>;

	/// Store `value` under `key`, replacing any previous value
	fn set(&self, key: &str, value: Value) -> SessionResult<()>;

	/// Remove `key`, returning the previous value
	fn remove(&self, key: &str) -> SessionResult<Option<Value>>;
}

/// Session store backed by a process-local map
///
/// # Examples
///
/// ```
/// use formwork_sessions::{InMemorySessionStore, SessionStore};
/// use serde_json::json;
///
/// let store = InMemorySessionStore::new();
/// store.set("user_id", json!(42)).unwrap();
/// assert_eq!(store.get("user_id").unwrap(), Some(json!(42)));
/// ```
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
	data: RwLock<HashMap<String, Value>>,
}

impl InMemorySessionStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of keys currently stored
	pub fn len(&self) -> usize {
		self.data.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.read().is_empty()
	}

	/// Drop every stored key
	pub fn clear(&self) {
		self.data.write().clear();
	}
}

impl SessionStore for InMemorySessionStore {
	fn get(&self, key: &str) -> SessionResult<Option<Value>> {
		Ok(self.data.read().get(key).cloned())
	}

	fn set(&self, key: &str, value: Value) -> SessionResult<()> {
		tracing::trace!(key = %key, "session value stored");
		self.data.write().insert(key.to_string(), value);
		Ok(())
	}

	fn remove(&self, key: &str) -> SessionResult<Option<Value>> {
		tracing::trace!(key = %key, "session value removed");
		Ok(self.data.write().remove(key))
	}
}
