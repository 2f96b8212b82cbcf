use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub files: Vec<TaskFile>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Task {
    /// Due date formatted for display, or a dash when unset
    pub fn due_date_display(&self) -> String {
        match self.due_date.as_deref() {
            Some(date) => format_date(date),
            None => "—".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFile {
    pub id: i64,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub mimetype: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
}

impl TaskFile {
    pub fn display_name(&self) -> &str {
        self.original_name
            .as_deref()
            .or(self.filename.as_deref())
            .unwrap_or("(unnamed)")
    }
}

/// A file to upload alongside a task, sent as the multipart `file` part.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: String,
    pub content: Vec<u8>,
    pub mime_type: Option<String>,
}

impl Attachment {
    /// Read an attachment from disk, using the file name as the part name
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read(path)
            .with_context(|| format!("Failed to read attachment: {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        Ok(Self {
            file_name,
            content,
            mime_type: None,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip)]
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip)]
    pub attachment: Option<Attachment>,
}

/// Format a date string to a more readable format
fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if date.len() >= 10 {
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_with_files() {
        let json = r#"{
            "id": 7,
            "title": "Write report",
            "status": "pending",
            "dueDate": "2025-07-10T00:00:00.000Z",
            "userId": 2,
            "files": [{"id": 3, "filename": "a1b2.pdf", "originalName": "report.pdf", "mimetype": "application/pdf"}]
        }"#;
        let task: Task = serde_json::from_str(json).expect("Failed to parse task");
        assert_eq!(task.files.len(), 1);
        assert_eq!(task.files[0].display_name(), "report.pdf");
        assert_eq!(task.due_date_display(), "Jul 10, 2025");
        assert!(task.description.is_none());
    }

    #[test]
    fn test_due_date_display_without_date() {
        let task: Task = serde_json::from_str(r#"{"id":1,"title":"x"}"#).expect("Failed to parse task");
        assert_eq!(task.due_date_display(), "—");
        assert!(task.files.is_empty());
    }

    #[test]
    fn test_new_task_serialization_skips_attachment() {
        let task = NewTask {
            title: "Upload".to_string(),
            due_date: Some("2025-08-01".to_string()),
            attachment: Some(Attachment {
                file_name: "a.txt".to_string(),
                content: b"hi".to_vec(),
                mime_type: None,
            }),
            ..Default::default()
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value, serde_json::json!({"title": "Upload", "dueDate": "2025-08-01"}));
    }
}
