//! Core library for the Tableside restaurant platform client.
//!
//! This crate owns the client side of authentication:
//!
//! - [`SessionManager`]: the session state machine - login, registration,
//!   logout, profile updates, and startup token revalidation
//! - [`ApiClient`]: HTTP transport for the platform's auth endpoints
//! - [`CredentialStore`]: durable persistence for the bearer token and
//!   cached profile (file, OS keychain, or in-memory)
//! - [`ApiError`]: the normalized error taxonomy every operation returns
//!
//! UI surfaces construct one `SessionManager` and observe it through
//! [`SessionManager::subscribe`] or the direct accessors.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, AuthApi};
pub use auth::{
    CredentialStore, FileStore, KeyringStore, MemoryStore, SessionManager, SessionState,
};
pub use config::Config;
pub use models::{LoginRequest, ProfileUpdate, RegisterRequest, Token, User};
