//! Catalog, session state machine, local scoring, and the best-effort network
//! paths that run after an assessment completes.

pub mod analysis;
pub mod catalog;
pub(crate) mod completion;
pub mod coordinator;
pub mod domain;
pub mod pipeline;
pub mod responses;
pub mod router;
pub mod scoring;
pub mod session;
pub mod submission;

#[cfg(test)]
mod tests;

pub use analysis::{
    AnalysisContext, AnalysisError, AnalysisGateway, AnalysisResult, AnalysisView,
    ExternalAnalysis, GradingRequest, GradingResult, HttpAnalysisGateway,
};
pub use catalog::{AssessmentCatalog, CatalogError};
pub use coordinator::{
    CompletionTracker, MatchListInvalidator, MatchListKey, SubmissionCoordinator,
    SubmissionOutcome,
};
pub use domain::{
    AnalysisRoute, AnswerRejection, AnswerValue, AssessmentDefinition, AssessmentId,
    AssessmentSummary, Dimension, Item, ItemBody, ItemId, ItemKind, LocalScoring,
};
pub use pipeline::{ActiveAssessment, AssessmentPipeline, PipelineError};
pub use responses::ResponseSet;
pub use router::assessment_router;
pub use scoring::{LocalSummary, ScoringRubric};
pub use session::{AssessmentSession, SessionError, SessionProgress, SessionState};
pub use submission::{
    Credential, HttpSubmissionGateway, SubmissionError, SubmissionGateway, SubmissionReceipt,
    SubmissionRequest,
};
