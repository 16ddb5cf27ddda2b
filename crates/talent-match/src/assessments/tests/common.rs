use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;

use crate::assessments::analysis::{
    AnalysisContext, AnalysisError, AnalysisGateway, AnalysisResult, GradingRequest,
    GradingResult,
};
use crate::assessments::catalog::AssessmentCatalog;
use crate::assessments::coordinator::{MatchListInvalidator, MatchListKey, SubmissionCoordinator};
use crate::assessments::domain::{AnswerValue, AssessmentDefinition, AssessmentId, ItemBody, ItemId};
use crate::assessments::pipeline::{ActiveAssessment, AssessmentPipeline};
use crate::assessments::responses::ResponseSet;
use crate::assessments::session::AssessmentSession;
use crate::assessments::submission::{
    Credential, SubmissionError, SubmissionGateway, SubmissionReceipt, SubmissionRequest,
};

pub(super) const COGNITIVE_STYLE: &str = "cognitive-style";
pub(super) const SENSORY_PROFILE: &str = "sensory-profile";
pub(super) const VIDEO_COMPREHENSION: &str = "video-comprehension";
pub(super) const INFORMATION_SORTING: &str = "information-sorting";

pub(super) fn catalog() -> Arc<AssessmentCatalog> {
    Arc::new(AssessmentCatalog::standard())
}

pub(super) fn definition(id: &str) -> Arc<AssessmentDefinition> {
    AssessmentCatalog::standard()
        .get_assessment(&AssessmentId::new(id))
        .expect("assessment is in the standard catalog")
}

pub(super) fn started_session(id: &str) -> AssessmentSession {
    let mut session = AssessmentSession::new(definition(id));
    session.start().expect("fresh session starts");
    session
}

/// A valid answer for any item kind.
pub(super) fn sample_answer(definition: &AssessmentDefinition, item_id: &ItemId) -> AnswerValue {
    let item = definition.item(item_id).expect("item exists");
    match &item.body {
        ItemBody::Choice { options, .. } => AnswerValue::text(options[0]),
        ItemBody::Slider { max, .. } => AnswerValue::Number(*max),
        ItemBody::FreeText { .. } => {
            AnswerValue::text("The team agreed to unblock the release before the demo.")
        }
        ItemBody::Categorization { tokens, buckets } => {
            let token = tokens.iter().next().expect("token");
            let bucket = buckets.iter().next().expect("bucket");
            AnswerValue::Placement([(token.to_string(), bucket.to_string())].into())
        }
    }
}

/// Answer every item in order, advancing after each one.
pub(super) fn answer_everything(session: &mut AssessmentSession) {
    let definition = session.definition().clone();
    for item in &definition.items {
        session
            .answer(item.id.clone(), sample_answer(&definition, &item.id))
            .expect("sample answer accepted");
        session.next().expect("answered item advances");
    }
}

/// Same as [`answer_everything`], through the pipeline's session handle.
pub(super) fn answer_all(active: &mut ActiveAssessment) {
    let definition = active.session().definition().clone();
    for item in &definition.items {
        active
            .answer(item.id.clone(), sample_answer(&definition, &item.id))
            .expect("sample answer accepted");
        active.next().expect("answered item advances");
    }
}

pub(super) fn sliders(values: &[(&str, f64)]) -> ResponseSet {
    values
        .iter()
        .map(|(id, value)| (ItemId::new(*id), AnswerValue::Number(*value)))
        .collect()
}

pub(super) fn analysis_document() -> Value {
    json!({
        "summary": "  Structured thinker who prefers written instructions.  ",
        "cognitiveProfile": {
            "primaryStrengths": ["Pattern recognition", "Sustained focus"],
            "processingPreferences": ["Written instructions"],
            "optimalWorkConditions": "Quiet mornings"
        },
        "insights": {
            "strengths": ["Spots inconsistencies quickly"],
            "growthAreas": []
        },
        "recommendations": {
            "roles": ["Data quality analyst"],
            "environment": ["Async-first team"]
        },
        "confidenceScore": 0.82
    })
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum AnalysisCall {
    Analyze {
        assessment_id: AssessmentId,
        responses: ResponseSet,
        context: AnalysisContext,
    },
    Grade(GradingRequest),
}

/// Scripted gateway recording every call it receives.
pub(super) struct ScriptedAnalysis {
    outcome: Result<Value, AnalysisError>,
    calls: Mutex<Vec<AnalysisCall>>,
}

impl ScriptedAnalysis {
    pub(super) fn succeeding() -> Self {
        Self {
            outcome: Ok(analysis_document()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn failing(status: u16, message: &str) -> Self {
        Self {
            outcome: Err(AnalysisError::new(status, message)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn calls(&self) -> Vec<AnalysisCall> {
        self.calls.lock().expect("analysis mutex poisoned").clone()
    }
}

#[async_trait]
impl AnalysisGateway for ScriptedAnalysis {
    async fn analyze(
        &self,
        assessment_id: &AssessmentId,
        responses: &ResponseSet,
        context: &AnalysisContext,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.calls
            .lock()
            .expect("analysis mutex poisoned")
            .push(AnalysisCall::Analyze {
                assessment_id: assessment_id.clone(),
                responses: responses.clone(),
                context: context.clone(),
            });
        self.outcome.clone().map(AnalysisResult::from_value)
    }

    async fn grade_open_ended(
        &self,
        request: &GradingRequest,
    ) -> Result<GradingResult, AnalysisError> {
        self.calls
            .lock()
            .expect("analysis mutex poisoned")
            .push(AnalysisCall::Grade(request.clone()));
        self.outcome.clone().map(|_| GradingResult {
            grading: json!({ "score": 8, "feedback": "Clear and specific." }),
        })
    }
}

struct DropSignal(Arc<Notify>);

impl Drop for DropSignal {
    fn drop(&mut self) {
        self.0.notify_one();
    }
}

/// Gateway whose requests never finish; signals when a request starts and when it is dropped.
#[derive(Default)]
pub(super) struct HangingAnalysis {
    pub(super) started: Arc<Notify>,
    pub(super) dropped: Arc<Notify>,
}

impl HangingAnalysis {
    async fn hang<T>(&self) -> Result<T, AnalysisError> {
        let _signal = DropSignal(self.dropped.clone());
        self.started.notify_one();
        std::future::pending().await
    }
}

#[async_trait]
impl AnalysisGateway for HangingAnalysis {
    async fn analyze(
        &self,
        _assessment_id: &AssessmentId,
        _responses: &ResponseSet,
        _context: &AnalysisContext,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.hang().await
    }

    async fn grade_open_ended(
        &self,
        _request: &GradingRequest,
    ) -> Result<GradingResult, AnalysisError> {
        self.hang().await
    }
}

#[derive(Default)]
pub(super) struct MemorySubmissions {
    fail: bool,
    requests: Mutex<Vec<(String, SubmissionRequest)>>,
}

impl MemorySubmissions {
    pub(super) fn unavailable() -> Self {
        Self {
            fail: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn requests(&self) -> Vec<(String, SubmissionRequest)> {
        self.requests.lock().expect("submission mutex poisoned").clone()
    }
}

#[async_trait]
impl SubmissionGateway for MemorySubmissions {
    async fn submit(
        &self,
        credential: &Credential,
        request: &SubmissionRequest,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        self.requests
            .lock()
            .expect("submission mutex poisoned")
            .push((credential.bearer().to_string(), request.clone()));
        if self.fail {
            return Err(SubmissionError::Rejected {
                status: 500,
                message: "database offline".to_string(),
            });
        }
        Ok(SubmissionReceipt(json!({ "id": "resp-1" })))
    }
}

#[derive(Default)]
pub(super) struct RecordingInvalidator {
    keys: Mutex<Vec<MatchListKey>>,
}

impl RecordingInvalidator {
    pub(super) fn keys(&self) -> Vec<MatchListKey> {
        self.keys.lock().expect("invalidator mutex poisoned").clone()
    }
}

impl MatchListInvalidator for RecordingInvalidator {
    fn invalidate(&self, key: MatchListKey) {
        self.keys
            .lock()
            .expect("invalidator mutex poisoned")
            .push(key);
    }
}

pub(super) struct Harness<A> {
    pub(super) pipeline: AssessmentPipeline<A, MemorySubmissions, RecordingInvalidator>,
    pub(super) analysis: Arc<A>,
    pub(super) submissions: Arc<MemorySubmissions>,
    pub(super) invalidator: Arc<RecordingInvalidator>,
}

pub(super) fn harness<A: AnalysisGateway + 'static>(analysis: A) -> Harness<A> {
    harness_with(analysis, MemorySubmissions::default())
}

pub(super) fn harness_with<A: AnalysisGateway + 'static>(
    analysis: A,
    submissions: MemorySubmissions,
) -> Harness<A> {
    let analysis = Arc::new(analysis);
    let submissions = Arc::new(submissions);
    let invalidator = Arc::new(RecordingInvalidator::default());
    let coordinator = Arc::new(SubmissionCoordinator::new(
        submissions.clone(),
        invalidator.clone(),
    ));
    Harness {
        pipeline: AssessmentPipeline::new(catalog(), analysis.clone(), coordinator),
        analysis,
        submissions,
        invalidator,
    }
}

pub(super) fn credential() -> Credential {
    Credential::new("candidate-token")
}
