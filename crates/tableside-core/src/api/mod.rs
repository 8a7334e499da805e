//! REST API client module for the Tableside platform.
//!
//! This module provides the `ApiClient` for communicating with the
//! backend's auth endpoints, behind the `AuthApi` trait so the session
//! manager can be exercised against a scripted transport in tests.
//!
//! The API uses bearer token authentication; tokens are issued by the
//! `/api/auth/login/json` endpoint.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;

use async_trait::async_trait;

use crate::models::{LoginRequest, ProfileUpdate, RegisterRequest, Token, User};

/// Transport boundary consumed by the session manager.
///
/// Every failure crossing this boundary is already normalized into an
/// [`ApiError`]; the session manager never re-interprets it.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Create a new account. Returns the created profile; does not log in.
    async fn register(&self, input: &RegisterRequest) -> Result<User, ApiError>;

    /// Exchange credentials for a bearer token.
    async fn login(&self, credentials: &LoginRequest) -> Result<Token, ApiError>;

    /// Fetch the profile the given token authenticates as.
    async fn current_user(&self, token: &str) -> Result<User, ApiError>;

    /// Update the authenticated user's profile.
    async fn update_profile(&self, token: &str, update: &ProfileUpdate) -> Result<User, ApiError>;
}
