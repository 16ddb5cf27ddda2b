use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{
    AnalysisContext, AnalysisError, AnalysisGateway, AnalysisResult, GradingRequest, GradingResult,
};
use crate::assessments::domain::AssessmentId;
use crate::assessments::responses::ResponseSet;
use crate::config::AnalysisConfig;

/// reqwest-backed gateway to the analysis service.
#[derive(Debug, Clone)]
pub struct HttpAnalysisGateway {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    responses: &'a ResponseSet,
    context: &'a AnalysisContext,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    analysis: Option<Value>,
}

impl HttpAnalysisGateway {
    pub fn new(config: &AnalysisConfig) -> Result<Self, reqwest::Error> {
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

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, AnalysisError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "submitting to analysis service");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| AnalysisError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(AnalysisError::new(status.as_u16(), error_message(&body, status)))
    }
}

/// Pull a readable message out of an error body, falling back to the status text.
fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ["error", "message", "detail"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
    });

    from_json
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("analysis request failed")
                .to_string()
        })
}

#[async_trait]
impl AnalysisGateway for HttpAnalysisGateway {
    async fn analyze(
        &self,
        assessment_id: &AssessmentId,
        responses: &ResponseSet,
        context: &AnalysisContext,
    ) -> Result<AnalysisResult, AnalysisError> {
        let path = format!("/analyze/{}", assessment_id);
        let response = self
            .post(&path, &AnalyzeRequest { responses, context })
            .await?;

        let payload: AnalyzeResponse = response
            .json()
            .await
            .map_err(|err| AnalysisError::malformed(err.to_string()))?;

        match payload.analysis {
            Some(Value::Object(document)) => {
                Ok(AnalysisResult::from_value(Value::Object(document)))
            }
            Some(_) | None => Err(AnalysisError::malformed(
                "response did not include an analysis object",
            )),
        }
    }

    async fn grade_open_ended(
        &self,
        request: &GradingRequest,
    ) -> Result<GradingResult, AnalysisError> {
        let response = self.post("/grade-open-ended", request).await?;

        response
            .json::<GradingResult>()
            .await
            .map_err(|err| AnalysisError::malformed(err.to_string()))
    }
}
