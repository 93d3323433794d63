mod airtable;
mod gateway;
mod mapping;

pub use airtable::AirtableBase;
pub use gateway::{GatewayError, TaskGateway};
pub use mapping::{COMMENTS_TABLE, TASKS_TABLE, TEAM_TABLE};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type Fields = serde_json::Map<String, Value>;

/// One row of a remote table: the datastore-assigned id plus a loose bag of
/// named cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: Fields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    pub filter_by_formula: Option<String>,
    pub sort: Option<(String, SortDirection)>,
    pub max_records: Option<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("datastore returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// Minimal record operations the gateway needs from the tabular datastore.
/// `AirtableBase` is the production implementation; tests substitute an
/// in-memory one.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list(&self, table: &str, options: SelectOptions) -> Result<Vec<Record>, StoreError>;

    async fn find(&self, table: &str, id: &str) -> Result<Record, StoreError>;

    async fn create(&self, table: &str, fields: Fields) -> Result<Record, StoreError>;

    async fn update(&self, table: &str, id: &str, fields: Fields) -> Result<Record, StoreError>;
}

/// Filter-formula builders for the handful of queries the gateway issues.
pub mod formula {
    /// Matches any of the given record ids.
    pub fn any_record_id(ids: &[String]) -> String {
        let clauses: Vec<String> = ids
            .iter()
            .map(|id| format!("RECORD_ID() = '{}'", id))
            .collect();
        format!("OR({})", clauses.join(","))
    }

    /// Matches comment records whose Task link list contains the task id.
    pub fn task_link_contains(task_id: &str) -> String {
        format!(r#"SEARCH("{}", ARRAYJOIN(Task, ","))"#, task_id)
    }

    /// Matches a team-directory row by email.
    pub fn email_equals(email: &str) -> String {
        format!("{{email}} = '{}'", email)
    }
}
