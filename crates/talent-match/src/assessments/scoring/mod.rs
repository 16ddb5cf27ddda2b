mod rubric;
mod rules;

pub use rubric::{RubricDimension, ScoringRubric};
pub use rules::{coverage_summary, score, FREE_TEXT_FULL_CREDIT};

use serde::{Deserialize, Serialize};

use super::domain::{AssessmentDefinition, LocalScoring};
use super::responses::ResponseSet;

/// Deterministic, network-free result shown as soon as an assessment completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSummary {
    pub normalized_percent: u8,
    pub narrative_lines: Vec<String>,
}

/// Apply the assessment's local scoring strategy to a response set.
pub fn summarize(definition: &AssessmentDefinition, responses: &ResponseSet) -> LocalSummary {
    match &definition.local_scoring {
        LocalScoring::Rubric(rubric) => score(responses, rubric),
        LocalScoring::Coverage => coverage_summary(definition, responses),
    }
}
