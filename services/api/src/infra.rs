use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use talent_match::assessments::{
    AnalysisContext, AnalysisError, AnalysisGateway, AnalysisResult, AssessmentId, Credential,
    GradingRequest, GradingResult, MatchListInvalidator, MatchListKey, ResponseSet,
    SubmissionError, SubmissionGateway, SubmissionReceipt, SubmissionRequest,
};
use talent_match::config::BackendConfig;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Stand-in for the client-side match-list cache: remembers the key it must refetch with.
#[derive(Default, Clone)]
pub(crate) struct InMemoryMatchListCache {
    stale_keys: Arc<Mutex<Vec<MatchListKey>>>,
}

impl InMemoryMatchListCache {
    pub(crate) fn stale_keys(&self) -> Vec<MatchListKey> {
        self.stale_keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MatchListInvalidator for InMemoryMatchListCache {
    fn invalidate(&self, key: MatchListKey) {
        info!(
            completed_assessments = key.completed_assessments,
            "match list invalidated"
        );
        self.stale_keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(key);
    }
}

/// Submission store used when the backend is not reachable (offline demo).
#[derive(Default, Clone)]
pub(crate) struct InMemorySubmissionStore {
    requests: Arc<Mutex<Vec<SubmissionRequest>>>,
}

impl InMemorySubmissionStore {
    pub(crate) fn requests(&self) -> Vec<SubmissionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SubmissionGateway for InMemorySubmissionStore {
    async fn submit(
        &self,
        _credential: &Credential,
        request: &SubmissionRequest,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let mut guard = self.requests.lock().unwrap_or_else(PoisonError::into_inner);
        guard.push(request.clone());
        Ok(SubmissionReceipt(json!({ "id": format!("local-{}", guard.len()) })))
    }
}

/// Analysis gateway that is never reachable, exercising the local-only fallback.
#[derive(Default, Clone, Copy)]
pub(crate) struct OfflineAnalysisGateway;

#[async_trait]
impl AnalysisGateway for OfflineAnalysisGateway {
    async fn analyze(
        &self,
        _assessment_id: &AssessmentId,
        _responses: &ResponseSet,
        _context: &AnalysisContext,
    ) -> Result<AnalysisResult, AnalysisError> {
        Err(AnalysisError::transport("analysis service disabled (offline)"))
    }

    async fn grade_open_ended(
        &self,
        _request: &GradingRequest,
    ) -> Result<GradingResult, AnalysisError> {
        Err(AnalysisError::transport("grading service disabled (offline)"))
    }
}

/// Explicit `--token` wins over `APP_AUTH_TOKEN`; blank tokens mean signed out.
pub(crate) fn resolve_credential(
    token: Option<String>,
    backend: &BackendConfig,
) -> Option<Credential> {
    token
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| backend.auth_token.clone())
        .map(Credential::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn backend(token: Option<&str>) -> BackendConfig {
        BackendConfig {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            timeout: Duration::from_secs(15),
            auth_token: token.map(str::to_string),
        }
    }

    #[test]
    fn cli_token_overrides_configured_token() {
        let credential = resolve_credential(Some(" cli ".to_string()), &backend(Some("env")));
        assert_eq!(credential, Some(Credential::new("cli")));
    }

    #[test]
    fn blank_cli_token_falls_back_to_configuration() {
        assert_eq!(
            resolve_credential(Some("   ".to_string()), &backend(Some("env"))),
            Some(Credential::new("env"))
        );
        assert_eq!(resolve_credential(None, &backend(None)), None);
    }

    #[test]
    fn cache_records_each_invalidation() {
        let cache = InMemoryMatchListCache::default();
        cache.invalidate(MatchListKey {
            completed_assessments: 3,
        });
        assert_eq!(
            cache.stale_keys(),
            vec![MatchListKey {
                completed_assessments: 3
            }]
        );
    }
}
