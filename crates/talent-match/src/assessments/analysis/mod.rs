//! Best-effort external analysis of completed response sets.
//!
//! Everything coming back from the analysis service is treated as untrusted and
//! partial: the raw document is kept as-is and each accessor degrades on its own
//! when a field is absent or has the wrong shape.

mod client;

pub use client::HttpAnalysisGateway;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{AssessmentDefinition, AssessmentId};
use super::responses::ResponseSet;

pub const NO_SUMMARY_FALLBACK: &str = "No summary available";
pub const NO_STRENGTHS_FALLBACK: &str = "No strengths identified yet";
pub const NO_RECOMMENDATIONS_FALLBACK: &str = "No recommendations available";

/// Port to the external analysis and grading services.
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    /// One round trip to `POST /analyze/{assessment_id}`; never retried here.
    async fn analyze(
        &self,
        assessment_id: &AssessmentId,
        responses: &ResponseSet,
        context: &AnalysisContext,
    ) -> Result<AnalysisResult, AnalysisError>;

    /// One round trip to `POST /grade-open-ended`.
    async fn grade_open_ended(&self, request: &GradingRequest)
        -> Result<GradingResult, AnalysisError>;
}

/// Context object sent alongside the responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisContext {
    pub assessment_title: String,
    pub cognitive_areas: Vec<String>,
    pub item_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_time_seconds: Option<u64>,
}

impl AnalysisContext {
    pub fn for_assessment(
        definition: &AssessmentDefinition,
        completion_time_seconds: Option<u64>,
    ) -> Self {
        Self {
            assessment_title: definition.title.to_string(),
            cognitive_areas: definition
                .cognitive_dimension_tags
                .iter()
                .map(|dimension| dimension.label().to_string())
                .collect(),
            item_count: definition.items.len(),
            completion_time_seconds,
        }
    }
}

/// Body of the open-ended grading call for the video exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingRequest {
    pub video_url: String,
    pub answers: BTreeMap<String, String>,
}

/// Opaque grading document, rendered as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    #[serde(default)]
    pub grading: Value,
}

/// Raw analysis document as returned under the `analysis` key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(Value);

impl AnalysisResult {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    fn profile_list(&self, key: &str) -> Vec<String> {
        string_list(self.0.get("cognitiveProfile").and_then(|profile| profile.get(key)))
    }

    pub fn primary_strengths(&self) -> Vec<String> {
        self.profile_list("primaryStrengths")
    }

    pub fn processing_preferences(&self) -> Vec<String> {
        self.profile_list("processingPreferences")
    }

    pub fn optimal_work_conditions(&self) -> Vec<String> {
        self.profile_list("optimalWorkConditions")
    }

    /// Named insight groups; non-string entries are skipped.
    pub fn insights(&self) -> BTreeMap<String, Vec<String>> {
        string_groups(self.0.get("insights"))
    }

    pub fn recommendations(&self) -> BTreeMap<String, Vec<String>> {
        string_groups(self.0.get("recommendations"))
    }

    /// Confidence in `[0, 1]`; out-of-range or non-numeric values read as absent.
    pub fn confidence_score(&self) -> Option<f64> {
        self.0
            .get("confidenceScore")
            .and_then(Value::as_f64)
            .filter(|score| (0.0..=1.0).contains(score))
    }

    pub fn summary(&self) -> Option<&str> {
        self.0
            .get("summary")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|summary| !summary.is_empty())
    }

    /// Display-ready projection with a fallback for every missing field.
    pub fn view(&self) -> AnalysisView {
        let primary_strengths = self.primary_strengths();
        let recommendations: Vec<String> = self.recommendations().into_values().flatten().collect();

        AnalysisView {
            summary: self.summary().unwrap_or(NO_SUMMARY_FALLBACK).to_string(),
            primary_strengths: if primary_strengths.is_empty() {
                vec![NO_STRENGTHS_FALLBACK.to_string()]
            } else {
                primary_strengths
            },
            processing_preferences: self.processing_preferences(),
            optimal_work_conditions: self.optimal_work_conditions(),
            recommendations: if recommendations.is_empty() {
                vec![NO_RECOMMENDATIONS_FALLBACK.to_string()]
            } else {
                recommendations
            },
            confidence_percent: self
                .confidence_score()
                .map(|score| (score * 100.0).round() as u8),
        }
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(entry)) if !entry.trim().is_empty() => vec![entry.trim().to_string()],
        _ => Vec::new(),
    }
}

fn string_groups(value: Option<&Value>) -> BTreeMap<String, Vec<String>> {
    match value {
        Some(Value::Object(groups)) => groups
            .iter()
            .map(|(key, entries)| (key.clone(), string_list(Some(entries))))
            .filter(|(_, entries)| !entries.is_empty())
            .collect(),
        _ => BTreeMap::new(),
    }
}

/// What the results screen renders for an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisView {
    pub summary: String,
    pub primary_strengths: Vec<String>,
    pub processing_preferences: Vec<String>,
    pub optimal_work_conditions: Vec<String>,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_percent: Option<u8>,
}

/// Result of the external path, whichever endpoint produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", content = "document", rename_all = "snake_case")]
pub enum ExternalAnalysis {
    Analysis(AnalysisResult),
    Grading(GradingResult),
}

/// Failure of the external path, carrying an HTTP-style status code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("analysis unavailable ({status}): {message}")]
pub struct AnalysisError {
    pub status: u16,
    pub message: String,
}

impl AnalysisError {
    pub const TRANSPORT: u16 = 503;
    pub const MALFORMED_RESPONSE: u16 = 502;
    pub const CANCELLED: u16 = 499;

    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(Self::TRANSPORT, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(Self::MALFORMED_RESPONSE, message)
    }

    pub fn cancelled() -> Self {
        Self::new(Self::CANCELLED, "assessment was closed before analysis finished")
    }
}
