//! Authentication session: login, logout and restore from persisted state

use std::sync::Arc;

use parking_lot::RwLock;

use crate::{
    api::{InventoryApi, LoginResponse},
    error::{AppError, AppResult},
    models::{Capability, Session, User},
    storage::KeyValueStore,
};

/// Storage key holding the bearer token
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the JSON-serialized user
pub const USER_KEY: &str = "user";

/// Shown when the API rejects a login without saying why
pub const LOGIN_FALLBACK: &str = "Authentication failed.";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unauthenticated { last_error: Option<String> },
    Authenticating,
    Authenticated(Session),
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Unauthenticated { last_error: None }
    }
}

/// Puts an abandoned sign-in back to unauthenticated
struct Attempt<'a>(&'a RwLock<SessionState>);

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        let mut state = self.0.write();
        if *state == SessionState::Authenticating {
            tracing::debug!("Sign-in abandoned before completion");
            *state = SessionState::default();
        }
    }
}

/// Owns the current [`Session`] and keeps the persisted copy in step with it.
///
/// Token and user are always written and cleared together.
pub struct AuthSession {
    store: Arc<dyn KeyValueStore>,
    api: Arc<dyn InventoryApi>,
    state: RwLock<SessionState>,
}

impl AuthSession {
    pub fn new(store: Arc<dyn KeyValueStore>, api: Arc<dyn InventoryApi>) -> Self {
        Self {
            store,
            api,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Rebuild the session from storage. Run once at startup.
    ///
    /// A user entry that does not parse clears both entries and returns
    /// `SessionCorruption`; the session is left unauthenticated either way.
    pub fn restore(&self) -> AppResult<()> {
        let token = self.store.get(TOKEN_KEY)?.filter(|t| !t.is_empty());
        let raw_user = self.store.get(USER_KEY)?.filter(|u| !u.is_empty());

        match (token, raw_user) {
            (Some(token), Some(raw_user)) => match serde_json::from_str::<User>(&raw_user) {
                Ok(user) => {
                    tracing::info!("Restored session for user {} ({})", user.id, user.role);
                    *self.state.write() = SessionState::Authenticated(Session::new(user, token));
                    Ok(())
                }
                Err(e) => {
                    tracing::error!("Persisted user is corrupted, clearing session: {}", e);
                    self.clear_storage();
                    *self.state.write() = SessionState::default();
                    Err(AppError::SessionCorruption(e.to_string()))
                }
            },
            (None, None) => {
                *self.state.write() = SessionState::default();
                Ok(())
            }
            _ => {
                tracing::warn!("Found only half of a persisted session, clearing it");
                self.clear_storage();
                *self.state.write() = SessionState::default();
                Ok(())
            }
        }
    }

    /// Exchange credentials for a session.
    ///
    /// On failure nothing is persisted and the display message is kept in
    /// [`SessionState::Unauthenticated`].
    pub async fn login(&self, username: &str, password: &str) -> AppResult<()> {
        let previous = {
            let mut state = self.state.write();
            if *state == SessionState::Authenticating {
                return Err(AppError::Busy("A sign-in is already in progress.".to_string()));
            }
            std::mem::replace(&mut *state, SessionState::Authenticating)
        };
        let _attempt = Attempt(&self.state);
        if matches!(previous, SessionState::Authenticated(_)) {
            // Signing in again replaces the current session
            self.clear_storage();
        }

        tracing::info!("Signing in as {}", username);

        let result = match self.api.login(username, password).await {
            Ok(response) => self.persist(&response).map(|()| response),
            Err(e) => Err(e),
        };

        let mut state = self.state.write();
        match result {
            Ok(LoginResponse { token, user }) => {
                tracing::info!("Signed in as user {} ({})", user.id, user.role);
                *state = SessionState::Authenticated(Session::new(user, token));
                Ok(())
            }
            Err(e) => {
                let message = e.user_message(LOGIN_FALLBACK);
                tracing::warn!("Sign-in failed for {}: {}", username, e);
                *state = SessionState::Unauthenticated {
                    last_error: Some(message),
                };
                Err(e)
            }
        }
        // `state` is released before `_attempt` runs its drop
    }

    /// Drop the session and its persisted copy. Never fails.
    pub fn logout(&self) {
        self.clear_storage();
        *self.state.write() = SessionState::default();
        tracing::info!("Signed out");
    }

    fn persist(&self, response: &LoginResponse) -> AppResult<()> {
        let user_json = serde_json::to_string(&response.user)?;

        self.store.set(TOKEN_KEY, &response.token)?;
        if let Err(e) = self.store.set(USER_KEY, &user_json) {
            if let Err(rollback) = self.store.remove(TOKEN_KEY) {
                tracing::warn!("Failed to roll back token after storage error: {}", rollback);
            }
            return Err(e);
        }
        Ok(())
    }

    fn clear_storage(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!("Failed to clear persisted {}: {}", key, e);
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn session(&self) -> Option<Session> {
        match &*self.state.read() {
            SessionState::Authenticated(session) => Some(session.clone()),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.read(), SessionState::Authenticated(_))
    }

    pub fn user(&self) -> Option<User> {
        self.session().map(|s| s.user)
    }

    pub fn user_id(&self) -> Option<i64> {
        self.session().map(|s| s.user.id)
    }

    pub fn token(&self) -> Option<String> {
        self.session().map(|s| s.token)
    }

    pub fn is_admin(&self) -> bool {
        self.session().is_some_and(|s| s.is_admin())
    }

    pub fn can(&self, capability: Capability) -> bool {
        crate::models::user::can(self.session().as_ref(), capability)
    }

    /// Message from the last failed sign-in, if the session is unauthenticated
    pub fn last_error(&self) -> Option<String> {
        match &*self.state.read() {
            SessionState::Unauthenticated { last_error } => last_error.clone(),
            _ => None,
        }
    }
}
