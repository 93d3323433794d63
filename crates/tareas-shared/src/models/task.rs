use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::Comment;

/// Canonical task states. The datastore stores capitalized human labels
/// ("Pendiente", "En_progreso", ...); these tokens are the lower-case form
/// used everywhere past the gateway boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pendiente,
    EnProgreso,
    Completada,
    Rechazada,
}

impl TaskStatus {
    /// Parse a datastore label, case-insensitively. Unrecognized labels
    /// (including the unshipped "Aceptada" seen in old records) fall back
    /// to the default state.
    pub fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "pendiente" => Self::Pendiente,
            "en_progreso" | "en progreso" => Self::EnProgreso,
            "completada" => Self::Completada,
            "rechazada" => Self::Rechazada,
            _ => Self::default(),
        }
    }

    /// The capitalized label the datastore expects on writes.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pendiente => "Pendiente",
            Self::EnProgreso => "En_progreso",
            Self::Completada => "Completada",
            Self::Rechazada => "Rechazada",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendiente => "pendiente",
            Self::EnProgreso => "en_progreso",
            Self::Completada => "completada",
            Self::Rechazada => "rechazada",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Alta,
    #[default]
    Media,
    Baja,
}

impl TaskPriority {
    pub fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "alta" => Self::Alta,
            "media" => Self::Media,
            "baja" => Self::Baja,
            _ => Self::default(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Alta => "Alta",
            Self::Media => "Media",
            Self::Baja => "Baja",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alta => "alta",
            Self::Media => "media",
            Self::Baja => "baja",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Record id assigned by the datastore.
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub assigned_to: Vec<String>,
    pub created_by: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
