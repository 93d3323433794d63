use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use tareas_server::store::{
    Fields, Record, RecordStore, SelectOptions, SortDirection, StoreError, TASKS_TABLE,
};

/// In-memory `RecordStore` with just enough filter-formula support for the
/// queries the gateway issues.
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Record>>>,
    next_id: AtomicU64,
    /// When set, updates against the tasks table fail. Used to reproduce
    /// the orphaned-comment scenario.
    pub fail_task_updates: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            fail_task_updates: AtomicBool::new(false),
        }
    }

    pub fn seed(&self, table: &str, fields: Value) -> String {
        let id = format!("rec{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = Record {
            id: id.clone(),
            fields: fields.as_object().cloned().unwrap_or_default(),
        };
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(record);
        id
    }

    pub fn record(&self, table: &str, id: &str) -> Option<Record> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .and_then(|records| records.iter().find(|r| r.id == id))
            .cloned()
    }

    pub fn table_len(&self, table: &str) -> usize {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn matches(record: &Record, formula: &str) -> bool {
        if formula.starts_with("OR(") {
            // OR(RECORD_ID() = 'a',RECORD_ID() = 'b')
            quoted_values(formula, '\'').iter().any(|id| *id == record.id)
        } else if formula.starts_with("SEARCH(") {
            // SEARCH("taskId", ARRAYJOIN(Task, ","))
            let Some(needle) = quoted_values(formula, '"').into_iter().next() else {
                return false;
            };
            record
                .fields
                .get("Task")
                .and_then(Value::as_array)
                .map(|links| links.iter().filter_map(Value::as_str).any(|l| l == needle))
                .unwrap_or(false)
        } else if formula.starts_with("{email}") {
            let Some(email) = quoted_values(formula, '\'').into_iter().next() else {
                return false;
            };
            record.fields.get("email").and_then(Value::as_str) == Some(email.as_str())
        } else {
            true
        }
    }

    fn sort_key(record: &Record, field: &str) -> String {
        record
            .fields
            .get(field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

fn quoted_values(formula: &str, quote: char) -> Vec<String> {
    formula
        .split(quote)
        .enumerate()
        .filter(|(i, _)| i % 2 == 1)
        .map(|(_, s)| s.to_string())
        .collect()
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(&self, table: &str, options: SelectOptions) -> Result<Vec<Record>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let mut records: Vec<Record> = tables
            .get(table)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| {
                        options
                            .filter_by_formula
                            .as_deref()
                            .map(|f| Self::matches(r, f))
                            .unwrap_or(true)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some((ref field, direction)) = options.sort {
            records.sort_by_key(|r| Self::sort_key(r, field));
            if direction == SortDirection::Desc {
                records.reverse();
            }
        }
        if let Some(max) = options.max_records {
            records.truncate(max as usize);
        }
        Ok(records)
    }

    async fn find(&self, table: &str, id: &str) -> Result<Record, StoreError> {
        self.record(table, id).ok_or(StoreError::Api {
            status: 404,
            message: format!("record {} not found", id),
        })
    }

    async fn create(&self, table: &str, fields: Fields) -> Result<Record, StoreError> {
        let id = format!("rec{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = Record {
            id,
            fields,
        };
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update(&self, table: &str, id: &str, fields: Fields) -> Result<Record, StoreError> {
        if table == TASKS_TABLE && self.fail_task_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Api {
                status: 503,
                message: "simulated task write failure".to_string(),
            });
        }

        let mut tables = self.tables.lock().unwrap();
        let records = tables.get_mut(table).ok_or(StoreError::Api {
            status: 404,
            message: format!("table {} not found", table),
        })?;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::Api {
                status: 404,
                message: format!("record {} not found", id),
            })?;

        for (name, value) in fields {
            record.fields.insert(name, value);
        }
        Ok(record.clone())
    }
}
