//! REST API clients for the taskdesk backend.
//!
//! - `AuthClient`: login, registration and password reset (no token)
//! - `ApiClient`: the authenticated gateway every bearer call goes through
//! - `TaskService`, `UserService`: CRUD built on the gateway

pub mod client;
pub mod error;
pub mod public;
pub mod tasks;
pub mod users;

pub use client::{ApiClient, RequestBody, RequestOptions};
pub use error::ApiError;
pub use public::{AuthClient, LoginResponse};
pub use tasks::TaskService;
pub use users::UserService;
