//! Client-side session lifecycle.
//!
//! This module provides:
//! - `SessionStore`: who is logged in, persisted across restarts
//! - `CredentialStore`: storage backends for the persisted credential
//! - `decode_claims`: unverified token expiry decoding
//! - `RouteGuard`: gating of protected routes behind a valid session
//!
//! Expiry is enforced when the store initializes, by the strict route guard,
//! and when the gateway receives a 401.

pub mod claims;
pub mod credentials;
pub mod guard;
pub mod session;

pub use claims::{decode_claims, decode_claims_at, ClaimsStatus, TokenClaims};
pub use credentials::{
    CredentialStore, FileCredentialStore, KeyringCredentialStore, MemoryCredentialStore,
    AUTH_TOKEN_KEY,
};
pub use guard::{GuardDecision, Route, RouteGuard};
pub use session::{LogoutHook, SessionCredential, SessionState, SessionStore};
