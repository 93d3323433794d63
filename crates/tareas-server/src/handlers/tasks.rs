use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tareas_shared::{
    api::{CreateTaskRequest, UpdateTaskRequest},
    Task,
};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::routes::AppState;

/// GET /api/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<Vec<Task>>, AppError> {
    let tasks = state.gateway.list_tasks().await?;
    Ok(Json(tasks))
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<Json<Task>, AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("Task title is required".to_string()));
    }

    // Callers may name the creator explicitly; otherwise the session
    // identity fills it in.
    let created_by = req
        .created_by
        .clone()
        .or_else(|| user.name.clone())
        .unwrap_or(user.email);

    let task = state.gateway.create_task(&req, &created_by).await?;
    Ok(Json(task))
}

/// PATCH /api/task/:task_id
pub async fn update_task(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
    Path(task_id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, AppError> {
    let task = state.gateway.update_task(&task_id, &req).await?;
    Ok(Json(task))
}
