//! Core library for taskdesk, a client for a task-management backend.
//!
//! The interesting part is the session lifecycle: `auth::SessionStore` owns
//! who is logged in, `api::ApiClient` is the single gateway for authenticated
//! calls, and `auth::RouteGuard` keeps protected views behind a valid session.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

use std::sync::Arc;

use anyhow::Result;

use api::{ApiClient, AuthClient, TaskService, UserService};
use auth::{CredentialStore, RouteGuard, SessionStore};
use config::Config;

/// Everything a front end needs, wired once at startup.
///
/// The gateway gets the session store's logout hook injected, so a 401 from
/// any service call clears the session.
#[derive(Clone)]
pub struct Client {
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
    pub tasks: TaskService,
    pub users: UserService,
}

impl Client {
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_storage(config, config.credential_store()?)
    }

    pub fn with_storage(config: &Config, storage: Arc<dyn CredentialStore>) -> Result<Self> {
        let auth = AuthClient::from_config(config)?;
        let session = Arc::new(SessionStore::open(storage.clone(), auth.clone()));
        let api = auth.gateway(storage, session.logout_hook());

        Ok(Self {
            tasks: TaskService::new(api.clone()),
            users: UserService::new(api.clone()),
            session,
            api,
        })
    }

    pub fn auth(&self) -> &AuthClient {
        self.session.auth_client()
    }

    pub fn guard(&self) -> RouteGuard {
        RouteGuard::strict(self.session.clone())
    }
}
