use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use tareas_shared::api::{CreateTaskRequest, UpdateTaskRequest};
use tareas_shared::{Comment, Task};

use super::mapping::{
    self, COMMENTS_TABLE, F_COMMENT_CREATED, F_CREATED_AT, TASKS_TABLE, TEAM_TABLE,
};
use super::{formula, RecordStore, SelectOptions, SortDirection, StoreError};

/// Coarse failures surfaced to the API layer. The wrapped store detail is
/// logged, never shown to clients.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Failed to fetch tasks")]
    FetchTasks(#[source] StoreError),

    #[error("Failed to fetch task")]
    FetchTask(#[source] StoreError),

    #[error("Failed to create task")]
    CreateTask(#[source] StoreError),

    #[error("Failed to update task")]
    UpdateTask(#[source] StoreError),

    #[error("Failed to fetch comments")]
    FetchComments(#[source] StoreError),

    #[error("Failed to add comment")]
    AddComment(#[source] StoreError),

    #[error("Failed to resolve team member")]
    MemberLookup(#[source] StoreError),
}

/// Translation layer between the canonical task model and the remote
/// tables. No retries anywhere; every remote failure maps to one coarse
/// `GatewayError`.
#[derive(Clone)]
pub struct TaskGateway {
    store: Arc<dyn RecordStore>,
}

impl TaskGateway {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// All tasks, newest first, with their comment threads hydrated from
    /// the reference lists.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, GatewayError> {
        let options = SelectOptions {
            sort: Some((F_CREATED_AT.to_string(), SortDirection::Desc)),
            ..Default::default()
        };
        let records = self
            .store
            .list(TASKS_TABLE, options)
            .await
            .map_err(GatewayError::FetchTasks)?;

        let mut tasks = Vec::with_capacity(records.len());
        for record in &records {
            let comments = self
                .comments_by_ids(mapping::comment_ref_ids(record))
                .await
                .map_err(GatewayError::FetchTasks)?;
            tasks.push(mapping::task_from_record(record, comments));
        }
        Ok(tasks)
    }

    pub async fn get_task(&self, task_id: &str) -> Result<Task, GatewayError> {
        let record = self
            .store
            .find(TASKS_TABLE, task_id)
            .await
            .map_err(GatewayError::FetchTask)?;
        let comments = self
            .comments_by_ids(mapping::comment_ref_ids(&record))
            .await
            .map_err(GatewayError::FetchTask)?;
        Ok(mapping::task_from_record(&record, comments))
    }

    pub async fn create_task(
        &self,
        req: &CreateTaskRequest,
        created_by: &str,
    ) -> Result<Task, GatewayError> {
        let record = self
            .store
            .create(TASKS_TABLE, mapping::create_task_fields(req, created_by))
            .await
            .map_err(GatewayError::CreateTask)?;
        Ok(mapping::task_from_record(&record, Vec::new()))
    }

    /// Partial write by id. Last writer wins; there is no concurrency check
    /// against the stored record.
    pub async fn update_task(
        &self,
        task_id: &str,
        req: &UpdateTaskRequest,
    ) -> Result<Task, GatewayError> {
        let record = self
            .store
            .update(TASKS_TABLE, task_id, mapping::update_task_fields(req))
            .await
            .map_err(GatewayError::UpdateTask)?;
        let comments = self
            .comments_by_ids(mapping::comment_ref_ids(&record))
            .await
            .map_err(GatewayError::UpdateTask)?;
        Ok(mapping::task_from_record(&record, comments))
    }

    /// Two-step, non-atomic: create the comment record, then rewrite the
    /// task's reference list with the new id appended. If the second write
    /// fails the comment stays behind unlinked (orphan) and the caller sees
    /// a plain failure. Two sessions racing the read-append-write here can
    /// also drop each other's reference.
    pub async fn add_comment(
        &self,
        task_id: &str,
        content: &str,
        author_id: Uuid,
        author_name: &str,
        voice: bool,
    ) -> Result<Comment, GatewayError> {
        let created_at = Utc::now();
        let comment_record = self
            .store
            .create(
                COMMENTS_TABLE,
                mapping::comment_fields(content, author_id, author_name, created_at, task_id, voice),
            )
            .await
            .map_err(GatewayError::AddComment)?;

        let task_record = self
            .store
            .find(TASKS_TABLE, task_id)
            .await
            .map_err(GatewayError::AddComment)?;
        let mut refs = mapping::comment_ref_ids(&task_record);
        refs.push(comment_record.id.clone());

        self.store
            .update(TASKS_TABLE, task_id, mapping::comment_refs_update(refs))
            .await
            .map_err(GatewayError::AddComment)?;

        Ok(mapping::comment_from_record(&comment_record))
    }

    /// Comments referencing the task, newest first.
    pub async fn list_comments(&self, task_id: &str) -> Result<Vec<Comment>, GatewayError> {
        let options = SelectOptions {
            filter_by_formula: Some(formula::task_link_contains(task_id)),
            sort: Some((F_COMMENT_CREATED.to_string(), SortDirection::Desc)),
            ..Default::default()
        };
        let records = self
            .store
            .list(COMMENTS_TABLE, options)
            .await
            .map_err(GatewayError::FetchComments)?;
        Ok(records.iter().map(mapping::comment_from_record).collect())
    }

    /// Team-directory display name for an email, if the member exists.
    pub async fn member_name(&self, email: &str) -> Result<Option<String>, GatewayError> {
        let options = SelectOptions {
            filter_by_formula: Some(formula::email_equals(email)),
            max_records: Some(1),
            ..Default::default()
        };
        let records = self
            .store
            .list(TEAM_TABLE, options)
            .await
            .map_err(GatewayError::MemberLookup)?;
        Ok(records.first().and_then(mapping::member_name_from_record))
    }

    /// Comment records for a task's reference list, kept in list order.
    async fn comments_by_ids(&self, ids: Vec<String>) -> Result<Vec<Comment>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let options = SelectOptions {
            filter_by_formula: Some(formula::any_record_id(&ids)),
            ..Default::default()
        };
        let records = self.store.list(COMMENTS_TABLE, options).await?;

        let mut comments: Vec<Comment> =
            records.iter().map(mapping::comment_from_record).collect();
        comments.sort_by_key(|c| ids.iter().position(|id| *id == c.id));
        Ok(comments)
    }
}
