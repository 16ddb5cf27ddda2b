use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::analysis::{
    AnalysisContext, AnalysisError, AnalysisGateway, ExternalAnalysis, GradingRequest,
};
use super::catalog::{AssessmentCatalog, CatalogError};
use super::coordinator::{MatchListInvalidator, SubmissionCoordinator, SubmissionOutcome};
use super::domain::{AnalysisRoute, AnswerValue, AssessmentDefinition, AssessmentId, ItemId};
use super::responses::ResponseSet;
use super::scoring::{summarize, LocalSummary};
use super::session::{AssessmentSession, SessionError, SessionState};
use super::submission::{Credential, SubmissionGateway, SubmissionRequest};

type AnalysisTask = JoinHandle<Result<ExternalAnalysis, AnalysisError>>;

/// Composes the catalog, the analysis gateway, and the submission coordinator.
pub struct AssessmentPipeline<A, S, M> {
    catalog: Arc<AssessmentCatalog>,
    analysis: Arc<A>,
    coordinator: Arc<SubmissionCoordinator<S, M>>,
}

impl<A, S, M> AssessmentPipeline<A, S, M>
where
    A: AnalysisGateway + 'static,
    S: SubmissionGateway + 'static,
    M: MatchListInvalidator + 'static,
{
    pub fn new(
        catalog: Arc<AssessmentCatalog>,
        analysis: Arc<A>,
        coordinator: Arc<SubmissionCoordinator<S, M>>,
    ) -> Self {
        Self {
            catalog,
            analysis,
            coordinator,
        }
    }

    pub fn catalog(&self) -> &AssessmentCatalog {
        &self.catalog
    }

    pub fn coordinator(&self) -> &SubmissionCoordinator<S, M> {
        &self.coordinator
    }

    /// Open a fresh session; each call starts from an empty response set.
    pub fn start(
        &self,
        assessment_id: &AssessmentId,
        credential: Option<Credential>,
    ) -> Result<ActiveAssessment, PipelineError> {
        let definition = self.catalog.get_assessment(assessment_id)?;
        let mut session = AssessmentSession::new(definition);
        session.start()?;

        info!(
            assessment_id = %assessment_id,
            items = session.definition().items.len(),
            signed_in = credential.is_some(),
            "assessment started"
        );

        Ok(ActiveAssessment {
            session,
            credential,
            cancel: CancellationToken::new(),
            analysis: None,
            submission: None,
        })
    }

    /// Complete the session, show the local summary, and kick off the network work.
    ///
    /// Neither background task is awaited here. Must be called from within a tokio
    /// runtime.
    pub fn finish(&self, active: &mut ActiveAssessment) -> Result<LocalSummary, PipelineError> {
        active.session.complete()?;

        let responses = completed_responses(&active.session);
        let summary = summarize(active.session.definition(), &responses);
        active.session.show_local_summary(summary.clone())?;

        info!(
            assessment_id = %active.session.assessment_id(),
            normalized_percent = summary.normalized_percent,
            "assessment completed"
        );

        active.analysis = self.spawn_analysis(&active.session, &responses, &active.cancel);

        let request = SubmissionRequest {
            assessment_id: active.session.assessment_id().clone(),
            responses,
            completion_time_seconds: active.session.completion_time_seconds(),
        };
        let coordinator = Arc::clone(&self.coordinator);
        let credential = active.credential.clone();
        active.submission = Some(tokio::spawn(async move {
            coordinator.persist(credential.as_ref(), &request).await
        }));

        Ok(summary)
    }

    /// Explicit "try again" after a failed analysis; a request already in flight is kept.
    pub fn retry_analysis(&self, active: &mut ActiveAssessment) -> Result<(), PipelineError> {
        if !matches!(active.session.state(), SessionState::ResultsShown { .. }) {
            return Err(SessionError::InvalidTransition {
                operation: "retry analysis",
                state: active.session.state().label(),
            }
            .into());
        }
        if active.analysis.is_some() {
            return Ok(());
        }

        let responses = completed_responses(&active.session);
        active.analysis = self.spawn_analysis(&active.session, &responses, &active.cancel);
        Ok(())
    }

    fn spawn_analysis(
        &self,
        session: &AssessmentSession,
        responses: &ResponseSet,
        cancel: &CancellationToken,
    ) -> Option<AnalysisTask> {
        let definition = session.definition();
        let call = match analysis_call(definition, responses, session.completion_time_seconds()) {
            Some(call) => call,
            None => {
                debug!(assessment_id = %definition.id, "local-only assessment; no analysis call");
                return None;
            }
        };

        let gateway = Arc::clone(&self.analysis);
        let cancel = cancel.clone();
        let assessment_id = definition.id.clone();

        Some(tokio::spawn(async move {
            let request = async {
                match &call {
                    AnalysisCall::Analyze { responses, context } => gateway
                        .analyze(&assessment_id, responses, context)
                        .await
                        .map(ExternalAnalysis::Analysis),
                    AnalysisCall::Grade(request) => gateway
                        .grade_open_ended(request)
                        .await
                        .map(ExternalAnalysis::Grading),
                }
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(
                        assessment_id = %assessment_id,
                        "assessment abandoned; discarding analysis"
                    );
                    Err(AnalysisError::cancelled())
                }
                result = request => result,
            }
        }))
    }
}

enum AnalysisCall {
    Analyze {
        responses: ResponseSet,
        context: AnalysisContext,
    },
    Grade(GradingRequest),
}

fn analysis_call(
    definition: &AssessmentDefinition,
    responses: &ResponseSet,
    completion_time_seconds: Option<u64>,
) -> Option<AnalysisCall> {
    match definition.analysis_route {
        AnalysisRoute::LocalOnly => None,
        AnalysisRoute::Analyze => Some(AnalysisCall::Analyze {
            responses: responses.clone(),
            context: AnalysisContext::for_assessment(definition, completion_time_seconds),
        }),
        AnalysisRoute::GradeOpenEnded { video_url } => {
            let answers: BTreeMap<String, String> = responses
                .iter()
                .filter_map(|(item_id, value)| {
                    value
                        .as_text()
                        .map(|text| (item_id.to_string(), text.trim().to_string()))
                })
                .collect();
            Some(AnalysisCall::Grade(GradingRequest {
                video_url: video_url.to_string(),
                answers,
            }))
        }
    }
}

fn completed_responses(session: &AssessmentSession) -> ResponseSet {
    session.state().responses().cloned().unwrap_or_default()
}

/// A session owned by one flow, plus the background work it started.
///
/// Dropping it (or calling [`ActiveAssessment::abandon`]) cancels any analysis still
/// in flight. The durable submission keeps running.
#[derive(Debug)]
pub struct ActiveAssessment {
    session: AssessmentSession,
    credential: Option<Credential>,
    cancel: CancellationToken,
    analysis: Option<AnalysisTask>,
    submission: Option<JoinHandle<SubmissionOutcome>>,
}

impl ActiveAssessment {
    pub fn session(&self) -> &AssessmentSession {
        &self.session
    }

    pub fn answer(&mut self, item_id: ItemId, value: AnswerValue) -> Result<(), SessionError> {
        self.session.answer(item_id, value)
    }

    pub fn next(&mut self) -> Result<usize, SessionError> {
        self.session.next()
    }

    pub fn previous(&mut self) -> Result<usize, SessionError> {
        self.session.previous()
    }

    /// Start the same assessment over with an empty response set.
    ///
    /// Background work from the previous run is cut loose: the analysis is cancelled
    /// and its handle dropped, so its result can never land on the new run. A
    /// submission already in flight still completes but is no longer reported here.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.analysis = None;
        self.submission = None;

        debug!(
            assessment_id = %self.session.assessment_id(),
            state = self.session.state().label(),
            "assessment restarted"
        );
        self.session.reset();
        self.session.start()
    }

    pub fn analysis_pending(&self) -> bool {
        self.analysis.is_some()
    }

    /// Wait for the analysis task and fold its result into `ResultsShown`.
    pub async fn resolve_analysis(&mut self) -> Result<(), PipelineError> {
        let Some(task) = self.analysis.take() else {
            return Ok(());
        };

        match task.await {
            Ok(Ok(analysis)) => self.session.attach_external_analysis(analysis)?,
            Ok(Err(err)) => {
                warn!(
                    assessment_id = %self.session.assessment_id(),
                    status = err.status,
                    error = %err.message,
                    "analysis failed"
                );
                self.session.record_analysis_error(err.to_string())?;
            }
            Err(join_err) => {
                warn!(
                    assessment_id = %self.session.assessment_id(),
                    error = %join_err,
                    "analysis task did not finish"
                );
                self.session
                    .record_analysis_error(format!("analysis interrupted: {join_err}"))?;
            }
        }
        Ok(())
    }

    /// Outcome of the durable submission, once it has run.
    pub async fn submission_outcome(&mut self) -> Option<SubmissionOutcome> {
        let task = self.submission.take()?;
        Some(task.await.unwrap_or_else(|join_err| SubmissionOutcome::Failed {
            reason: join_err.to_string(),
        }))
    }

    /// Walk away from the assessment, discarding its state and any pending analysis.
    pub fn abandon(self) {
        debug!(
            assessment_id = %self.session.assessment_id(),
            state = self.session.state().label(),
            "assessment abandoned"
        );
    }
}

impl Drop for ActiveAssessment {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Session(#[from] SessionError),
}
