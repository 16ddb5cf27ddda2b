use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::domain::AssessmentId;
use super::responses::ResponseSet;
use crate::config::BackendConfig;

/// Bearer token identifying the candidate to the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn bearer(&self) -> &str {
        &self.0
    }
}

// Tokens never end up in logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Durable record body for `POST /assessments/{id}/respond`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub assessment_id: AssessmentId,
    pub responses: ResponseSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_time_seconds: Option<u64>,
}

/// Whatever the backend echoes back; only kept for logging.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionReceipt(pub Value);

/// Port to the backend that stores completed assessments.
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn submit(
        &self,
        credential: &Credential,
        request: &SubmissionRequest,
    ) -> Result<SubmissionReceipt, SubmissionError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("backend unreachable: {0}")]
    Transport(String),
    #[error("backend rejected the credential")]
    Unauthorized,
    #[error("backend rejected the submission ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// reqwest-backed gateway to the platform backend.
#[derive(Debug, Clone)]
pub struct HttpSubmissionGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSubmissionGateway {
    pub fn new(config: &BackendConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self::with_client(client, config.base_url.clone()))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SubmissionGateway for HttpSubmissionGateway {
    async fn submit(
        &self,
        credential: &Credential,
        request: &SubmissionRequest,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let url = format!(
            "{}/assessments/{}/respond",
            self.base_url, request.assessment_id
        );
        debug!(%url, "persisting completed assessment");

        let response = self
            .client
            .post(&url)
            .bearer_auth(credential.bearer())
            .json(request)
            .send()
            .await
            .map_err(|err| SubmissionError::Transport(err.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SubmissionError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }

        // An empty 2xx body still counts as stored; a body cut off mid-read does not.
        let body = response.text().await.map_err(|err| {
            SubmissionError::Transport(format!("reading response body: {err}"))
        })?;
        Ok(SubmissionReceipt(
            serde_json::from_str(&body).unwrap_or(Value::Null),
        ))
    }
}
