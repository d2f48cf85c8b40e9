//! # formwork sessions
//!
//! Per-user session storage used by formwork's CSRF protection.
//!
//! The form layer never talks to a concrete backend: it holds an
//! `Arc<dyn SessionStore>` and keeps its tokens under a single namespace key.
//!
//! ## Quick Start
//!
//! ```rust
//! use formwork_sessions::{CsrfSessionManager, InMemorySessionStore};
//!
//! let store = InMemorySessionStore::new();
//! let manager = CsrfSessionManager::new();
//!
//! let token = manager.generate_token(&store, "login").unwrap();
//! assert!(manager.verify(&store, "login", &token).unwrap());
//! assert!(!manager.verify(&store, "login", "forged").unwrap());
//! ```

pub mod csrf;
pub mod store;

pub use csrf::{CSRF_SESSION_NAMESPACE, CsrfSessionManager};
pub use store::{InMemorySessionStore, SessionError, SessionResult, SessionStore};
