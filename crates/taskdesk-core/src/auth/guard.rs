use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::claims::{decode_claims_at, ClaimsStatus};
use super::session::persisted_token;
use super::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    ForgotPassword,
    ResetPassword(String),
    Home,
    Tasks,
    Profile,
    Users,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::ResetPassword(token) => format!("/reset-password/{}", token),
            Route::Home => "/".to_string(),
            Route::Tasks => "/tasks".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::Users => "/users".to_string(),
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Home | Route::Tasks | Route::Profile | Route::Users)
    }

    pub fn requires_admin(&self) -> bool {
        matches!(self, Route::Users)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still resolving; show a placeholder, neither content nor redirect
    Loading,
    Render,
    /// Navigate away, replacing history when `replace` is set
    Redirect { to: Route, replace: bool },
    /// Authenticated, but the route needs an admin
    Forbidden,
}

/// Gates protected routes behind a valid session.
pub struct RouteGuard {
    store: Arc<SessionStore>,
    strict: bool,
}

impl RouteGuard {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store, strict: false }
    }

    /// Guard that also re-checks the persisted token's expiry before rendering
    pub fn strict(store: Arc<SessionStore>) -> Self {
        Self { store, strict: true }
    }

    pub fn check(&self, route: &Route) -> GuardDecision {
        self.check_at(route, Utc::now())
    }

    pub fn check_at(&self, route: &Route, now: DateTime<Utc>) -> GuardDecision {
        if self.store.is_loading() {
            return GuardDecision::Loading;
        }
        if !route.is_protected() {
            return GuardDecision::Render;
        }
        if !self.store.is_authenticated() {
            debug!(route = %route.path(), "Not authenticated, redirecting to login");
            return Self::to_login();
        }
        if self.strict && !self.persisted_token_valid(now) {
            warn!(route = %route.path(), "Persisted token missing or expired, logging out");
            self.store.logout();
            return Self::to_login();
        }
        if route.requires_admin() && !self.store.is_admin() {
            return GuardDecision::Forbidden;
        }
        GuardDecision::Render
    }

    fn persisted_token_valid(&self, now: DateTime<Utc>) -> bool {
        let token = match self.store.storage().load() {
            Ok(Some(raw)) => persisted_token(&raw).ok().flatten(),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session");
                None
            }
        };
        match token {
            Some(token) => matches!(decode_claims_at(&token, now), ClaimsStatus::Valid(_)),
            None => false,
        }
    }

    fn to_login() -> GuardDecision {
        GuardDecision::Redirect {
            to: Route::Login,
            replace: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AuthClient;
    use crate::auth::claims::tests::token_expiring_at;
    use crate::auth::{CredentialStore, MemoryCredentialStore, SessionCredential};
    use crate::models::{Role, User};
    use chrono::Duration;

    fn persisted(role: Role, token: &str) -> String {
        let user = User {
            id: 5,
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            role,
            birth_date: None,
            created_at: None,
        };
        serde_json::to_string(&SessionCredential {
            user,
            token: token.to_string(),
        })
        .unwrap()
    }

    fn session_store(storage: Arc<MemoryCredentialStore>) -> Arc<SessionStore> {
        let auth = AuthClient::new("http://127.0.0.1:9", None).unwrap();
        Arc::new(SessionStore::new(storage, auth))
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Tasks.path(), "/tasks");
        assert!(Route::Users.requires_admin() && Route::Users.is_protected());
        assert!(!Route::ForgotPassword.is_protected());
        assert_eq!(Route::ResetPassword("xyz".to_string()).path(), "/reset-password/xyz");
    }

    #[test]
    fn test_loading_never_redirects() {
        let guard = RouteGuard::new(session_store(Arc::new(MemoryCredentialStore::new())));
        assert_eq!(guard.check(&Route::Tasks), GuardDecision::Loading);
        assert_eq!(guard.check(&Route::Login), GuardDecision::Loading);
    }

    #[test]
    fn test_unauthenticated_redirects_with_replace() {
        let store = session_store(Arc::new(MemoryCredentialStore::new()));
        store.initialize();
        let guard = RouteGuard::new(store);

        assert_eq!(
            guard.check(&Route::Tasks),
            GuardDecision::Redirect { to: Route::Login, replace: true }
        );
        assert_eq!(guard.check(&Route::Register), GuardDecision::Render);
    }

    #[test]
    fn test_authenticated_renders() {
        let token = token_expiring_at(Utc::now() + Duration::hours(1));
        let store = session_store(Arc::new(MemoryCredentialStore::with_value(persisted(Role::User, &token))));
        store.initialize();
        let guard = RouteGuard::strict(store);

        assert_eq!(guard.check(&Route::Profile), GuardDecision::Render);
        assert_eq!(guard.check(&Route::Users), GuardDecision::Forbidden);
    }

    #[test]
    fn test_admin_can_open_users() {
        let token = token_expiring_at(Utc::now() + Duration::hours(1));
        let store = session_store(Arc::new(MemoryCredentialStore::with_value(persisted(Role::Admin, &token))));
        store.initialize();
        assert_eq!(RouteGuard::new(store).check(&Route::Users), GuardDecision::Render);
    }

    #[test]
    fn test_strict_guard_purges_expired_token() {
        let now = Utc::now();
        let token = token_expiring_at(now + Duration::minutes(10));
        let storage = Arc::new(MemoryCredentialStore::with_value(persisted(Role::User, &token)));
        let store = session_store(storage.clone());
        store.initialize_at(now);

        let later = now + Duration::minutes(11);

        // The plain guard trusts in-memory state
        assert_eq!(RouteGuard::new(store.clone()).check_at(&Route::Tasks, later), GuardDecision::Render);

        let guard = RouteGuard::strict(store.clone());
        assert_eq!(
            guard.check_at(&Route::Tasks, later),
            GuardDecision::Redirect { to: Route::Login, replace: true }
        );
        assert!(!store.is_authenticated());
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_strict_guard_catches_missing_persisted_token() {
        let token = token_expiring_at(Utc::now() + Duration::hours(1));
        let storage = Arc::new(MemoryCredentialStore::with_value(persisted(Role::User, &token)));
        let store = session_store(storage.clone());
        store.initialize();

        // Storage wiped behind the store's back
        storage.clear().unwrap();

        let guard = RouteGuard::strict(store.clone());
        assert_eq!(
            guard.check(&Route::Home),
            GuardDecision::Redirect { to: Route::Login, replace: true }
        );
        assert!(!store.is_authenticated());
    }
}
