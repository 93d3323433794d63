use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::auth::auth_middleware;
use crate::config::Config;
use crate::handlers::{comments as comment_handlers, tasks as task_handlers};
use crate::store::{RecordStore, TaskGateway};

#[derive(Clone)]
pub struct AppState {
    pub gateway: TaskGateway,
    pub config: Config,
}

pub fn create_router(store: Arc<dyn RecordStore>, config: Config) -> Router {
    let state = AppState {
        gateway: TaskGateway::new(store),
        config,
    };

    // Everything except the health probe requires a session token
    let protected_routes = Router::new()
        .route("/tasks", get(task_handlers::list_tasks))
        .route("/tasks", post(task_handlers::create_task))
        .route("/task/:task_id", patch(task_handlers::update_task))
        .route(
            "/task/:task_id/comments",
            get(comment_handlers::list_comments),
        )
        .route(
            "/task/:task_id/comments",
            post(comment_handlers::create_comment),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
