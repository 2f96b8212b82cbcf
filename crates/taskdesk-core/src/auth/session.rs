use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::{ApiError, AuthClient};
use crate::models::User;

use super::claims::{decode_claims_at, ClaimsStatus};
use super::CredentialStore;

/// Callback the gateway fires when the backend rejects the bearer token.
pub type LogoutHook = Arc<dyn Fn() + Send + Sync>;

/// The persisted `{user, token}` pair identifying a logged-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCredential {
    pub user: User,
    pub token: String,
}

impl SessionCredential {
    /// Parse a persisted credential, rejecting anything not fully formed
    pub fn from_persisted(raw: &str, now: DateTime<Utc>) -> Result<Self, ApiError> {
        let credential: SessionCredential = serde_json::from_str(raw)
            .map_err(|e| ApiError::Decode(format!("invalid credential: {}", e)))?;

        match decode_claims_at(&credential.token, now) {
            ClaimsStatus::Valid(_) => Ok(credential),
            ClaimsStatus::Expired => Err(ApiError::Decode("token expired".to_string())),
            ClaimsStatus::Malformed => Err(ApiError::Decode("token payload unreadable".to_string())),
        }
    }

    pub fn to_persisted(&self) -> Result<String, ApiError> {
        serde_json::to_string(self).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Read just the bearer token out of a persisted credential value.
///
/// Only requires a non-empty `token` field, so it keeps working for values
/// the session store has not validated yet.
pub(crate) fn persisted_token(raw: &str) -> Result<Option<String>, ApiError> {
    #[derive(Deserialize)]
    struct TokenOnly {
        token: Option<String>,
    }

    let parsed: TokenOnly = serde_json::from_str(raw)
        .map_err(|e| ApiError::Decode(format!("invalid credential: {}", e)))?;
    Ok(parsed.token.filter(|t| !t.is_empty()))
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub credential: Option<SessionCredential>,
    pub is_loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            credential: None,
            is_loading: true,
        }
    }
}

/// Single source of truth for who is logged in.
///
/// Owns the in-memory session state and the one persisted copy of the
/// credential. Expiry is checked when the store initializes; after that a
/// session stays authenticated until logout or a 401 from the gateway.
pub struct SessionStore {
    storage: Arc<dyn CredentialStore>,
    auth: AuthClient,
    state: RwLock<SessionState>,
}

impl SessionStore {
    /// Create a store that has not read persisted storage yet
    pub fn new(storage: Arc<dyn CredentialStore>, auth: AuthClient) -> Self {
        Self {
            storage,
            auth,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Create a store and resolve its initial state from persisted storage
    pub fn open(storage: Arc<dyn CredentialStore>, auth: AuthClient) -> Self {
        let store = Self::new(storage, auth);
        store.initialize();
        store
    }

    pub fn initialize(&self) {
        self.initialize_at(Utc::now());
    }

    /// Resolve the session from persisted storage, purging anything expired
    /// or malformed. Never fails; always finishes loading.
    pub fn initialize_at(&self, now: DateTime<Utc>) {
        let credential = match self.storage.load() {
            Ok(Some(raw)) => match SessionCredential::from_persisted(&raw, now) {
                Ok(credential) => {
                    debug!(user_id = credential.user.id, "Restored persisted session");
                    Some(credential)
                }
                Err(e) => {
                    warn!(error = %e, "Discarding persisted session");
                    self.purge_storage();
                    None
                }
            },
            Ok(None) => {
                debug!("No persisted session");
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session");
                None
            }
        };

        let mut state = self.write_state();
        state.credential = credential;
        state.is_loading = false;
    }

    /// Authenticate against the backend and persist the resulting credential.
    /// Navigation after a successful login is left to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionCredential, ApiError> {
        let response = self.auth.login(email, password).await?;
        let credential = SessionCredential {
            user: response.user,
            token: response.token,
        };

        if matches!(decode_claims_at(&credential.token, Utc::now()), ClaimsStatus::Malformed) {
            return Err(ApiError::Decode("server returned an unreadable token".to_string()));
        }

        self.storage.store(&credential.to_persisted()?)?;
        self.write_state().credential = Some(credential.clone());

        info!(user_id = credential.user.id, "Logged in");
        Ok(credential)
    }

    /// Purge persisted storage and clear the in-memory session. Idempotent.
    pub fn logout(&self) {
        self.purge_storage();
        let previous = self.write_state().credential.take();
        if let Some(credential) = previous {
            info!(user_id = credential.user.id, "Logged out");
        }
    }

    /// True iff a credential is held in memory. Does not re-check expiry.
    pub fn is_authenticated(&self) -> bool {
        self.read_state().credential.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.read_state().is_loading
    }

    pub fn state(&self) -> SessionState {
        self.read_state().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.read_state().credential.as_ref().map(|c| c.user.clone())
    }

    pub fn is_admin(&self) -> bool {
        self.read_state()
            .credential
            .as_ref()
            .map(|c| c.user.is_admin())
            .unwrap_or(false)
    }

    /// The public auth endpoints client this store logs in through
    pub fn auth_client(&self) -> &AuthClient {
        &self.auth
    }

    pub(crate) fn storage(&self) -> &Arc<dyn CredentialStore> {
        &self.storage
    }

    /// Hook for the gateway to force a logout on this store.
    ///
    /// Holds a weak reference; once the store is dropped the hook does nothing.
    pub fn logout_hook(self: &Arc<Self>) -> LogoutHook {
        let store = Arc::downgrade(self);
        Arc::new(move || {
            if let Some(store) = store.upgrade() {
                warn!("Session rejected by server, logging out");
                store.logout();
            }
        })
    }

    fn purge_storage(&self) {
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "Failed to purge persisted session");
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}
