use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::debug;

use crate::models::{Attachment, NewTask, Task, TaskUpdate};

use super::{ApiClient, ApiError};

/// Task CRUD over the authenticated gateway.
#[derive(Clone)]
pub struct TaskService {
    api: ApiClient,
}

impl TaskService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Tasks visible to the current user (all tasks for admins)
    pub async fn list(&self) -> Result<Vec<Task>, ApiError> {
        let tasks: Vec<Task> = self.api.get("/tasks").await?;
        debug!(count = tasks.len(), "Fetched tasks");
        Ok(tasks)
    }

    pub async fn get(&self, id: i64) -> Result<Task, ApiError> {
        self.api.get(&format!("/tasks/{}", id)).await
    }

    /// Create a task, sent as multipart when it carries an attachment
    pub async fn create(&self, mut task: NewTask) -> Result<Task, ApiError> {
        match task.attachment.take() {
            Some(attachment) => {
                let form = multipart_form(&task, attachment)?;
                self.api.post_multipart("/tasks", form).await
            }
            None => self.api.post_json("/tasks", &task).await,
        }
    }

    pub async fn update(&self, id: i64, mut update: TaskUpdate) -> Result<Task, ApiError> {
        let path = format!("/tasks/{}", id);
        match update.attachment.take() {
            Some(attachment) => {
                let form = multipart_form(&update, attachment)?;
                self.api.put_multipart(&path, form).await
            }
            None => self.api.put_json(&path, &update).await,
        }
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let _: serde_json::Value = self.api.delete(&format!("/tasks/{}", id)).await?;
        Ok(())
    }

    /// Remove one attachment from a task
    pub async fn delete_file(&self, task_id: i64, file_id: i64) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .api
            .delete(&format!("/tasks/{}/files/{}", task_id, file_id))
            .await?;
        Ok(())
    }
}

/// Text parts for each set field, plus the attachment as the `file` part
fn multipart_form<B: Serialize>(fields: &B, attachment: Attachment) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for (name, value) in text_fields(fields)? {
        form = form.text(name, value);
    }

    let mut part = Part::bytes(attachment.content).file_name(attachment.file_name);
    if let Some(mime) = attachment.mime_type {
        part = part.mime_str(&mime)?;
    }
    Ok(form.part("file", part))
}

fn text_fields<B: Serialize>(fields: &B) -> Result<Vec<(String, String)>, ApiError> {
    let value = serde_json::to_value(fields).map_err(|e| ApiError::Encode(e.to_string()))?;
    let serde_json::Value::Object(map) = value else {
        return Err(ApiError::Encode("task fields must serialize to an object".to_string()));
    };

    Ok(map
        .into_iter()
        .filter_map(|(name, value)| match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some((name, s)),
            other => Some((name, other.to_string())),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_fields_skip_unset() {
        let update = TaskUpdate {
            status: Some("done".to_string()),
            ..Default::default()
        };
        let fields = text_fields(&update).unwrap();
        assert_eq!(fields, vec![("status".to_string(), "done".to_string())]);
    }

    #[test]
    fn test_text_fields_for_new_task() {
        let task = NewTask {
            title: "Plan".to_string(),
            description: Some("Q3".to_string()),
            ..Default::default()
        };
        let mut fields = text_fields(&task).unwrap();
        fields.sort();
        assert_eq!(
            fields,
            vec![
                ("description".to_string(), "Q3".to_string()),
                ("title".to_string(), "Plan".to_string()),
            ]
        );
    }
}
