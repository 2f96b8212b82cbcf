use tracing::debug;

use crate::models::{Registration, User, UserUpdate};

use super::{ApiClient, ApiError};

/// Profile and admin user management over the authenticated gateway.
#[derive(Clone)]
pub struct UserService {
    api: ApiClient,
}

impl UserService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn profile(&self) -> Result<User, ApiError> {
        self.api.get("/users/profile").await
    }

    /// All accounts (admin only; the backend enforces it)
    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        let users: Vec<User> = self.api.get("/users").await?;
        debug!(count = users.len(), "Fetched users");
        Ok(users)
    }

    /// Create an account as an admin, through the register endpoint
    pub async fn create(&self, registration: &Registration) -> Result<Option<User>, ApiError> {
        let value: serde_json::Value = self.api.post_json("/users/register", registration).await?;
        Ok(User::from_response(value))
    }

    pub async fn update(&self, id: i64, update: &UserUpdate) -> Result<Option<User>, ApiError> {
        let value: serde_json::Value = self.api.put_json(&format!("/users/{}", id), update).await?;
        Ok(User::from_response(value))
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let _: serde_json::Value = self.api.delete(&format!("/users/{}", id)).await?;
        Ok(())
    }
}
