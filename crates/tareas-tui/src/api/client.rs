use anyhow::Result;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use tareas_shared::api::{CreateCommentRequest, CreateTaskRequest, UpdateTaskRequest};
use tareas_shared::{Comment, Task, TaskStatus};

use super::auth::SessionToken;

/// JWT payload claims we need for expiry checking
#[derive(serde::Deserialize)]
struct JwtClaims {
    exp: i64,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not authenticated")]
    Unauthorized,
    #[error("Resource not found")]
    NotFound,
    #[error("Server error: {0}")]
    Server(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Load the session token from the environment or disk
    pub fn load_token(&mut self) -> Result<bool> {
        self.token = SessionToken::load()?.map(|t| t.token);
        Ok(self.token.is_some())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Build URL for endpoint
    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Decode JWT payload and extract expiration time
    fn decode_token_exp(token: &str) -> Option<i64> {
        // JWT format: header.payload.signature
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return None;
        }

        let payload = URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
        let claims: JwtClaims = serde_json::from_slice(&payload).ok()?;

        Some(claims.exp)
    }

    /// The bearer token, or Unauthorized if it is absent or already
    /// expired. There is no refresh path; an expired session means a new
    /// token from the provider.
    fn bearer(&self) -> Result<&str, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::Unauthorized)?;

        if let Some(exp) = Self::decode_token_exp(token) {
            if exp < chrono::Utc::now().timestamp() {
                return Err(ApiError::Unauthorized);
            }
        }

        Ok(token)
    }

    async fn handle<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        match status.as_u16() {
            401 => Err(ApiError::Unauthorized),
            404 => Err(ApiError::NotFound),
            _ => {
                let message = response
                    .json::<ErrorBody>()
                    .await
                    .map(|b| b.error)
                    .unwrap_or_else(|_| format!("HTTP {}", status));
                Err(ApiError::Server(message))
            }
        }
    }

    async fn authed_get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(self.bearer()?)
            .send()
            .await?;
        Self::handle(response).await
    }

    async fn authed_post<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(self.bearer()?)
            .json(body)
            .send()
            .await?;
        Self::handle(response).await
    }

    async fn authed_patch<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .patch(self.url(path))
            .bearer_auth(self.bearer()?)
            .json(body)
            .send()
            .await?;
        Self::handle(response).await
    }

    // ============ Tasks ============

    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.authed_get("/tasks").await
    }

    pub async fn create_task(&self, req: &CreateTaskRequest) -> Result<Task, ApiError> {
        self.authed_post("/tasks", req).await
    }

    pub async fn set_status(&self, task_id: &str, status: TaskStatus) -> Result<Task, ApiError> {
        let req = UpdateTaskRequest {
            status: Some(status),
            ..Default::default()
        };
        self.authed_patch(&format!("/task/{}", task_id), &req).await
    }

    // ============ Comments ============

    pub async fn list_comments(&self, task_id: &str) -> Result<Vec<Comment>, ApiError> {
        self.authed_get(&format!("/task/{}/comments", task_id)).await
    }

    pub async fn create_comment(
        &self,
        task_id: &str,
        content: &str,
        voice: bool,
    ) -> Result<Comment, ApiError> {
        let req = CreateCommentRequest {
            content: content.to_string(),
            voice,
        };
        self.authed_post(&format!("/task/{}/comments", task_id), &req)
            .await
    }
}
