use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A timestamped text entry attached to a task. Ownership is a weak
/// back-reference: the datastore links comments to tasks through the task's
/// reference list, written separately from the comment record itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<Uuid>,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
    pub task_id: String,
    // Editing is not wired up anywhere yet; the fields exist so stored
    // records keep their shape once it is.
    #[serde(default)]
    pub edited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
    /// Set when the content came from the voice-transcription path.
    #[serde(default)]
    pub voice: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_wire_comment() {
        let json = r#"{
            "id": "recC1",
            "content": "hola",
            "authorName": "Ana",
            "createdAt": "2024-03-01T10:00:00Z",
            "taskId": "recT1"
        }"#;

        let comment: Comment = serde_json::from_str(json).unwrap();
        assert_eq!(comment.author_name, "Ana");
        assert_eq!(comment.task_id, "recT1");
        assert!(!comment.edited);
        assert!(!comment.voice);
        assert!(comment.author_id.is_none());
        assert!(comment.edited_at.is_none());
    }
}
