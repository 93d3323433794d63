use std::path::Path;

use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("Could not read recording: {0}")]
    Read(#[from] std::io::Error),

    #[error("Transcription upload failed: {0}")]
    Upload(#[from] reqwest::Error),

    #[error("Transcription service returned HTTP {0}")]
    Webhook(u16),
}

#[derive(Debug, serde::Deserialize)]
struct TranscriptionResponse {
    content: Option<String>,
}

/// Client for the workflow webhook that turns a recorded audio file into
/// text. Failure here aborts the whole voice-comment flow before any
/// comment record exists.
#[derive(Clone)]
pub struct Transcriber {
    client: reqwest::Client,
    webhook_url: String,
}

impl Transcriber {
    pub fn new(webhook_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: webhook_url.to_string(),
        }
    }

    /// Upload a recording and return the transcribed text.
    pub async fn transcribe(&self, path: &Path, author: &str) -> Result<String, VoiceError> {
        let bytes = tokio::fs::read(path).await?;
        let timestamp = Utc::now().timestamp_millis();

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("recording-{}.webm", timestamp));
        // Safari records mp4; everything else sends opus-in-webm
        let mime = if filename.ends_with(".mp4") || filename.ends_with(".m4a") {
            "audio/mp4"
        } else {
            "audio/webm;codecs=opus"
        };

        let metadata = json!({
            "createdBy": author,
            "timestamp": timestamp,
            "filename": filename,
            "mimeType": mime,
        });

        let form = Form::new()
            .part(
                "audio",
                Part::bytes(bytes).file_name(filename).mime_str(mime)?,
            )
            .text("metadata", metadata.to_string());

        let response = self
            .client
            .post(&self.webhook_url)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VoiceError::Webhook(response.status().as_u16()));
        }

        let body: TranscriptionResponse = response.json().await?;
        Ok(body
            .content
            .unwrap_or_else(|| "Transcripción no disponible".to_string()))
    }
}
