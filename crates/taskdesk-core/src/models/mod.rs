//! Data models for taskdesk entities.
//!
//! - `User`, `Role`: account identity as returned by the backend
//! - `Task`, `TaskFile`: tasks and their attachments
//! - Write payloads: `NewTask`, `TaskUpdate`, `Registration`, `UserUpdate`

pub mod task;
pub mod user;

pub use task::{Attachment, NewTask, Task, TaskFile, TaskUpdate};
pub use user::{Registration, Role, User, UserUpdate};
