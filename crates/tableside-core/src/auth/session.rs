//! Client session state machine.
//!
//! `SessionManager` is the single authority for "who is the current user".
//! It orchestrates login, registration, logout, profile updates, and
//! startup revalidation; it is the sole writer of the credential store;
//! and it broadcasts state to consumers over a watch channel so many
//! independent surfaces can observe one session instance.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{ApiError, AuthApi};
use crate::models::{LoginRequest, ProfileUpdate, RegisterRequest, User};

use super::store::{CredentialStore, TOKEN_KEY, USER_KEY};

/// Authentication status of the running client.
///
/// The profile and token live only inside the `Authenticated` variant, so
/// "user is present iff authenticated" holds by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Startup revalidation has not run yet.
    Uninitialized,
    /// Startup revalidation is in flight.
    Loading,
    /// A token was accepted by the backend; `user` is the profile it
    /// authenticates as.
    Authenticated { user: User, token: String },
    /// No valid session.
    Anonymous,
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            SessionState::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }
}

/// Owner of the session state machine.
///
/// Operations may be called concurrently; credential store writes are
/// serialized internally so token and profile are always written or
/// cleared as a pair. Overlapping state-mutating operations are otherwise
/// last-write-wins - suppressing redundant concurrent submissions is the
/// caller's job (e.g. disabling a submit control while a request is out).
pub struct SessionManager {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn CredentialStore>,
    state: watch::Sender<SessionState>,
    // Guards every store write so a pair of entries is never interleaved
    // with another operation's pair.
    store_lock: Mutex<()>,
}

impl SessionManager {
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn CredentialStore>) -> Self {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        Self {
            api,
            store,
            state,
            store_lock: Mutex::new(()),
        }
    }

    /// Current state snapshot.
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Subscribe to state transitions. The receiver always yields the
    /// latest state; intermediate transitions may be skipped.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_string)
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Startup revalidation. Runs on every startup; never cached.
    ///
    /// A stored token is only trusted after the backend accepts it on
    /// `/me`. Any failure resolves the session to `Anonymous` silently -
    /// an expired token at startup is expected, not exceptional.
    pub async fn initialize(&self) {
        self.set_state(SessionState::Loading);

        let token = match self.store.get(TOKEN_KEY) {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("no stored token; starting anonymous");
                self.set_state(SessionState::Anonymous);
                return;
            }
            Err(err) => {
                warn!(error = %err, "failed to read credential store");
                self.set_state(SessionState::Anonymous);
                return;
            }
        };

        match self.api.current_user(&token).await {
            Ok(user) => {
                debug!(email = %user.email, "stored token revalidated");
                let _ = self.commit_session(token, user);
            }
            Err(err) => {
                debug!(error = %err, "stored token rejected; clearing session");
                self.clear_store();
                self.set_state(SessionState::Anonymous);
            }
        }
    }

    /// Exchange credentials for a session.
    ///
    /// Token exchange and the follow-up profile fetch must both succeed
    /// before anything is persisted or the state transitions; a token
    /// whose profile fetch failed is discarded, never committed. Failures
    /// leave state and store untouched. No automatic retry.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let credentials = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let token = self.api.login(&credentials).await?;

        let user = match self.api.current_user(&token.access_token).await {
            Ok(user) => user,
            Err(err) => {
                debug!(error = %err, "profile fetch after login failed; discarding token");
                return Err(err);
            }
        };

        debug!(email = %user.email, "login succeeded");
        self.commit_session(token.access_token, user)
    }

    /// Create a new account. Does not log in and does not touch session
    /// state or the store - the caller follows up with [`login`].
    ///
    /// [`login`]: SessionManager::login
    pub async fn register(&self, input: &RegisterRequest) -> Result<User, ApiError> {
        let user = self.api.register(input).await?;
        debug!(email = %user.email, "account registered");
        Ok(user)
    }

    /// Unconditional teardown: clears the store and resolves to
    /// `Anonymous` regardless of prior state. Idempotent; never fails.
    pub fn logout(&self) {
        self.clear_store();
        self.set_state(SessionState::Anonymous);
    }

    /// Update the authenticated user's profile. Calling this without an
    /// authenticated session is a programming error and fails fast.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let token = match self.current() {
            SessionState::Authenticated { token, .. } => token,
            _ => {
                return Err(ApiError::ClientError(
                    "profile update requires an authenticated session".to_string(),
                ))
            }
        };

        let user = self.api.update_profile(&token, update).await?;
        debug!(email = %user.email, "profile updated");
        self.commit_session(token, user)
    }

    fn set_state(&self, state: SessionState) {
        self.state.send_replace(state);
    }

    /// Persist token + profile and transition to `Authenticated`. If the
    /// store write fails the half-written pair is rolled back and the
    /// session resolves to `Anonymous`, keeping state and store in step.
    fn commit_session(&self, token: String, user: User) -> Result<User, ApiError> {
        match self.persist(&token, &user) {
            Ok(()) => {
                self.set_state(SessionState::Authenticated {
                    user: user.clone(),
                    token,
                });
                Ok(user)
            }
            Err(err) => {
                self.set_state(SessionState::Anonymous);
                Err(err)
            }
        }
    }

    fn persist(&self, token: &str, user: &User) -> Result<(), ApiError> {
        let encoded = serde_json::to_string(user)
            .map_err(|e| ApiError::ClientError(format!("failed to encode profile: {}", e)))?;

        let _guard = self.store_lock.lock();
        if let Err(err) = self
            .store
            .set(TOKEN_KEY, token)
            .and_then(|_| self.store.set(USER_KEY, &encoded))
        {
            self.clear_store_locked();
            return Err(ApiError::ClientError(format!(
                "failed to persist session: {}",
                err
            )));
        }
        Ok(())
    }

    fn clear_store(&self) {
        let _guard = self.store_lock.lock();
        self.clear_store_locked();
    }

    fn clear_store_locked(&self) {
        if let Err(err) = self.store.remove(TOKEN_KEY) {
            warn!(error = %err, "failed to remove stored token");
        }
        if let Err(err) = self.store.remove(USER_KEY) {
            warn!(error = %err, "failed to remove stored profile");
        }
    }
}
