//! Session storage module.
//!
//! The [`SessionStore`] capability and the CSRF token table kept in it.
//!
//! # Examples
//!
//! ```rust
//! # #[cfg(feature = "sessions")]
//! # {
//! use formwork::sessions::{CsrfSessionManager, InMemorySessionStore};
//!
//! let store = InMemorySessionStore::new();
//! let token = CsrfSessionManager::new().generate_token(&store, "login").unwrap();
//! assert_eq!(token.len(), 64);
//! # }
//! ```

#[cfg(feature = "sessions")]
pub use formwork_sessions::*;
