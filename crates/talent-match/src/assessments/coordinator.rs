use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::{info, warn};

use super::submission::{Credential, SubmissionGateway, SubmissionRequest};

/// Cache key of the downstream match-list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MatchListKey {
    pub completed_assessments: u64,
}

/// Hook that forces the match list to be refetched for a given key.
pub trait MatchListInvalidator: Send + Sync {
    fn invalidate(&self, key: MatchListKey);
}

/// Locally tracked count of durably stored assessments.
#[derive(Debug, Default)]
pub struct CompletionTracker {
    completed: Mutex<u64>,
}

impl CompletionTracker {
    pub fn new(completed: u64) -> Self {
        Self {
            completed: Mutex::new(completed),
        }
    }

    pub fn completed(&self) -> u64 {
        *self.completed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bump the count and invalidate with the new value while still holding the lock,
    /// so concurrent completions invalidate `n + 1` then `n + 2` in order.
    pub fn record<M: MatchListInvalidator + ?Sized>(&self, invalidator: &M) -> MatchListKey {
        let mut completed = self.completed.lock().unwrap_or_else(PoisonError::into_inner);
        *completed += 1;
        let key = MatchListKey {
            completed_assessments: *completed,
        };
        invalidator.invalidate(key);
        key
    }
}

/// What happened to the durable copy of a completed assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Skipped,
    Persisted { key: MatchListKey },
    Failed { reason: String },
}

impl SubmissionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped (not signed in)",
            Self::Persisted { .. } => "saved",
            Self::Failed { .. } => "not saved",
        }
    }
}

/// Best-effort persistence followed by match-list invalidation.
pub struct SubmissionCoordinator<S, M> {
    gateway: Arc<S>,
    invalidator: Arc<M>,
    tracker: CompletionTracker,
}

impl<S, M> SubmissionCoordinator<S, M>
where
    S: SubmissionGateway + 'static,
    M: MatchListInvalidator + 'static,
{
    pub fn new(gateway: Arc<S>, invalidator: Arc<M>) -> Self {
        Self::with_tracker(gateway, invalidator, CompletionTracker::default())
    }

    pub fn with_tracker(gateway: Arc<S>, invalidator: Arc<M>, tracker: CompletionTracker) -> Self {
        Self {
            gateway,
            invalidator,
            tracker,
        }
    }

    pub fn completed_assessments(&self) -> u64 {
        self.tracker.completed()
    }

    /// Store the response set; failures are logged and reported, never raised.
    pub async fn persist(
        &self,
        credential: Option<&Credential>,
        request: &SubmissionRequest,
    ) -> SubmissionOutcome {
        let Some(credential) = credential else {
            info!(
                assessment_id = %request.assessment_id,
                "no credential; skipping durable submission"
            );
            return SubmissionOutcome::Skipped;
        };

        match self.gateway.submit(credential, request).await {
            Ok(_) => {
                let key = self.tracker.record(self.invalidator.as_ref());
                info!(
                    assessment_id = %request.assessment_id,
                    completed_assessments = key.completed_assessments,
                    "assessment persisted; match list invalidated"
                );
                SubmissionOutcome::Persisted { key }
            }
            Err(err) => {
                warn!(
                    assessment_id = %request.assessment_id,
                    error = %err,
                    "durable submission failed"
                );
                SubmissionOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }
}
