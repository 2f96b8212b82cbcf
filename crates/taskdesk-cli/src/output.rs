//! Plain-text and JSON rendering of command results.

use anyhow::Result;
use serde::Serialize;
use taskdesk_core::api::ApiError;
use taskdesk_core::auth::{decode_claims, ClaimsStatus};
use taskdesk_core::models::{Task, User};

const TITLE_WIDTH: usize = 32;
const STATUS_WIDTH: usize = 12;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_tasks(tasks: &[Task]) {
    println!("Found {} tasks", tasks.len());
    for task in tasks {
        println!("{}", task_row(task));
    }
}

pub fn print_task(task: &Task) {
    println!("#{} {}", task.id, task.title);
    println!("  Status:      {}", format_optional(&task.status, "—"));
    println!("  Due:         {}", task.due_date_display());
    if let Some(ref description) = task.description {
        println!("  Description: {}", description);
    }
    if !task.files.is_empty() {
        println!("  Files:");
        for file in &task.files {
            println!("    [{}] {}", file.id, file.display_name());
        }
    }
}

pub fn print_users(users: &[User]) {
    for user in users {
        println!("{:>5}  {:<24}  {:<32}  {}", user.id, truncate_string(&user.name, 24), user.email, user.role);
    }
}

pub fn print_user(user: &User) {
    println!("Name:       {}", user.name);
    println!("Email:      {}", user.email);
    println!("Role:       {}", user.role);
    println!("Birth date: {}", format_optional(&user.birth_date, "N/A"));
    if let Some(ref created) = user.created_at {
        println!("Joined:     {}", created);
    }
}

fn task_row(task: &Task) -> String {
    let attachments = match task.files.len() {
        0 => String::new(),
        1 => "  (1 file)".to_string(),
        n => format!("  ({} files)", n),
    };
    format!(
        "{:>5}  {:<title$}  {:<status$}  {}{}",
        task.id,
        truncate_string(&task.title, TITLE_WIDTH),
        truncate_string(task.status.as_deref().unwrap_or("—"), STATUS_WIDTH),
        task.due_date_display(),
        attachments,
        title = TITLE_WIDTH,
        status = STATUS_WIDTH,
    )
}

/// Display-only expiry hint; the server decides whether the token is accepted
pub fn expiry_hint(token: &str) -> String {
    match decode_claims(token) {
        ClaimsStatus::Valid(claims) => match claims.expires_at() {
            Some(at) => format!("Session expires {}", at.format("%b %d, %Y %H:%M UTC")),
            None => "Session expiry unknown".to_string(),
        },
        ClaimsStatus::Expired => "Session token has expired; the next request will require a new login".to_string(),
        ClaimsStatus::Malformed => "Session expiry unknown".to_string(),
    }
}

/// One-line alert text for an error surfaced to the user
pub fn alert_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::Unauthorized) => "Session expired. Please log in again.".to_string(),
        Some(ApiError::NoSession) => "Not logged in. Run `taskdesk login` first.".to_string(),
        Some(ApiError::Network(e)) if e.is_connect() || e.is_timeout() => {
            "Unable to connect to server. Check your connection.".to_string()
        }
        _ => err.to_string(),
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None
fn format_optional(value: &Option<String>, default: &str) -> String {
    value.as_deref().unwrap_or(default).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_task_row() {
        let task: Task = serde_json::from_str(
            r#"{"id":7,"title":"Write report","status":"pending","dueDate":"2025-07-10","files":[{"id":1},{"id":2}]}"#,
        )
        .unwrap();
        let row = task_row(&task);
        assert!(row.starts_with("    7  Write report"));
        assert!(row.contains("pending"));
        assert!(row.ends_with("2025-07-10  (2 files)"));
    }

    #[test]
    fn test_expiry_hint_for_garbage_token() {
        assert_eq!(expiry_hint("garbage"), "Session expiry unknown");
    }

    #[test]
    fn test_alert_message() {
        let err = anyhow::Error::from(ApiError::Unauthorized);
        assert_eq!(alert_message(&err), "Session expired. Please log in again.");

        let err = anyhow::Error::from(ApiError::Request {
            status: 400,
            message: "Title is required".to_string(),
        });
        assert_eq!(alert_message(&err), "Title is required");
    }
}
