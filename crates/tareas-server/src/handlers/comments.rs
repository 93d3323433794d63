use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tareas_shared::{api::CreateCommentRequest, Comment};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::routes::AppState;

/// GET /api/task/:task_id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
    Path(task_id): Path<String>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let comments = state.gateway.list_comments(&task_id).await?;
    Ok(Json(comments))
}

/// POST /api/task/:task_id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(task_id): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<Json<Comment>, AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::Validation(
            "Comment content is required".to_string(),
        ));
    }

    // Display name comes from the team directory when the member is
    // registered there, then the session name, then the anonymous fallback.
    let author_name = match state.gateway.member_name(&user.email).await? {
        Some(name) => name,
        None => user.name.clone().unwrap_or_else(|| "Anonymous".to_string()),
    };

    let comment = state
        .gateway
        .add_comment(&task_id, &req.content, user.id, &author_name, req.voice)
        .await?;
    Ok(Json(comment))
}
