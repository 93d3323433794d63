//! Field-name translation between the canonical models and the remote
//! tables. The datastore keeps Spanish column names and capitalized status
//! labels; everything past this file speaks the lower-case canonical shape.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use uuid::Uuid;

use tareas_shared::api::{CreateTaskRequest, UpdateTaskRequest};
use tareas_shared::{Comment, Task, TaskPriority, TaskStatus};

use super::{Fields, Record};

pub const TASKS_TABLE: &str = "Tareas";
pub const COMMENTS_TABLE: &str = "Comments";
pub const TEAM_TABLE: &str = "Equipo";

// Tareas columns
const F_TITLE: &str = "Titulo";
const F_STATUS: &str = "Estado";
const F_PRIORITY: &str = "Prioridad";
const F_DEADLINE: &str = "Fecha limite";
const F_ASSIGNED_TO: &str = "Asignado A";
const F_CREATED_BY: &str = "Creado por";
pub(crate) const F_COMMENT_REFS: &str = "Comentarios";
pub(crate) const F_CREATED_AT: &str = "Fecha de creación";
const F_UPDATED_AT: &str = "Ultima Actualizacion";

// Comments columns
const F_CONTENT: &str = "content";
const F_AUTHOR_ID: &str = "authorId";
const F_AUTHOR_NAME: &str = "authorName";
pub(crate) const F_COMMENT_CREATED: &str = "createdAt";
pub(crate) const F_TASK_LINK: &str = "Task";
const F_VOICE: &str = "isVoiceComment";
const F_EDITED: &str = "edited";
const F_EDITED_AT: &str = "editedAt";

// Equipo columns
const F_MEMBER_NAME: &str = "name";

fn str_field<'a>(fields: &'a Fields, name: &str) -> Option<&'a str> {
    fields.get(name).and_then(Value::as_str)
}

fn bool_field(fields: &Fields, name: &str) -> bool {
    fields.get(name).and_then(Value::as_bool).unwrap_or(false)
}

fn string_list(fields: &Fields, name: &str) -> Vec<String> {
    fields
        .get(name)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn date_field(fields: &Fields, name: &str) -> Option<NaiveDate> {
    str_field(fields, name).and_then(|s| s.parse().ok())
}

fn datetime_field(fields: &Fields, name: &str) -> Option<DateTime<Utc>> {
    str_field(fields, name)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Maps one task record into the canonical shape. Status and priority are
/// lower-cased here; missing cells fall back to defaults rather than
/// failing the whole list.
pub fn task_from_record(record: &Record, comments: Vec<Comment>) -> Task {
    let fields = &record.fields;

    Task {
        id: record.id.clone(),
        title: str_field(fields, F_TITLE).unwrap_or_default().to_string(),
        status: str_field(fields, F_STATUS)
            .map(TaskStatus::from_label)
            .unwrap_or_default(),
        priority: str_field(fields, F_PRIORITY)
            .map(TaskPriority::from_label)
            .unwrap_or_default(),
        deadline: date_field(fields, F_DEADLINE),
        assigned_to: string_list(fields, F_ASSIGNED_TO),
        created_by: str_field(fields, F_CREATED_BY)
            .unwrap_or_default()
            .to_string(),
        comments,
        created_at: datetime_field(fields, F_CREATED_AT).unwrap_or_else(Utc::now),
        updated_at: datetime_field(fields, F_UPDATED_AT).unwrap_or_else(Utc::now),
    }
}

/// The comment record ids linked from a task's reference list.
pub fn comment_ref_ids(record: &Record) -> Vec<String> {
    string_list(&record.fields, F_COMMENT_REFS)
}

pub fn comment_from_record(record: &Record) -> Comment {
    let fields = &record.fields;

    Comment {
        id: record.id.clone(),
        content: str_field(fields, F_CONTENT).unwrap_or_default().to_string(),
        author_id: str_field(fields, F_AUTHOR_ID).and_then(|s| Uuid::parse_str(s).ok()),
        author_name: str_field(fields, F_AUTHOR_NAME)
            .unwrap_or_default()
            .to_string(),
        created_at: datetime_field(fields, F_COMMENT_CREATED).unwrap_or_else(Utc::now),
        task_id: string_list(fields, F_TASK_LINK)
            .into_iter()
            .next()
            .unwrap_or_default(),
        edited: bool_field(fields, F_EDITED),
        edited_at: datetime_field(fields, F_EDITED_AT),
        voice: bool_field(fields, F_VOICE),
    }
}

pub fn member_name_from_record(record: &Record) -> Option<String> {
    str_field(&record.fields, F_MEMBER_NAME).map(str::to_string)
}

/// Only the recognized columns are written; anything else in the payload is
/// dropped before it reaches the datastore.
pub fn create_task_fields(req: &CreateTaskRequest, created_by: &str) -> Fields {
    let mut fields = Fields::new();
    fields.insert(F_TITLE.into(), Value::String(req.title.clone()));
    if let Some(status) = req.status {
        fields.insert(F_STATUS.into(), Value::String(status.label().into()));
    }
    if let Some(priority) = req.priority {
        fields.insert(F_PRIORITY.into(), Value::String(priority.label().into()));
    }
    if let Some(deadline) = req.deadline {
        fields.insert(F_DEADLINE.into(), Value::String(deadline.to_string()));
    }
    if !req.assigned_to.is_empty() {
        fields.insert(
            F_ASSIGNED_TO.into(),
            Value::Array(req.assigned_to.iter().cloned().map(Value::String).collect()),
        );
    }
    fields.insert(F_CREATED_BY.into(), Value::String(created_by.to_string()));
    fields
}

pub fn update_task_fields(req: &UpdateTaskRequest) -> Fields {
    let mut fields = Fields::new();
    if let Some(ref title) = req.title {
        fields.insert(F_TITLE.into(), Value::String(title.clone()));
    }
    if let Some(status) = req.status {
        fields.insert(F_STATUS.into(), Value::String(status.label().into()));
    }
    if let Some(priority) = req.priority {
        fields.insert(F_PRIORITY.into(), Value::String(priority.label().into()));
    }
    if let Some(deadline) = req.deadline {
        fields.insert(F_DEADLINE.into(), Value::String(deadline.to_string()));
    }
    if let Some(ref assigned) = req.assigned_to {
        fields.insert(
            F_ASSIGNED_TO.into(),
            Value::Array(assigned.iter().cloned().map(Value::String).collect()),
        );
    }
    fields
}

pub fn comment_fields(
    content: &str,
    author_id: Uuid,
    author_name: &str,
    created_at: DateTime<Utc>,
    task_id: &str,
    voice: bool,
) -> Fields {
    let mut fields = Fields::new();
    fields.insert(F_CONTENT.into(), Value::String(content.to_string()));
    fields.insert(F_AUTHOR_ID.into(), Value::String(author_id.to_string()));
    fields.insert(F_AUTHOR_NAME.into(), Value::String(author_name.to_string()));
    fields.insert(
        F_COMMENT_CREATED.into(),
        Value::String(created_at.to_rfc3339()),
    );
    fields.insert(
        F_TASK_LINK.into(),
        Value::Array(vec![Value::String(task_id.to_string())]),
    );
    if voice {
        fields.insert(F_VOICE.into(), Value::Bool(true));
    }
    fields
}

pub fn comment_refs_update(refs: Vec<String>) -> Fields {
    let mut fields = Fields::new();
    fields.insert(
        F_COMMENT_REFS.into(),
        Value::Array(refs.into_iter().map(Value::String).collect()),
    );
    fields
}
