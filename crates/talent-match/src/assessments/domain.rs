use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::scoring::ScoringRubric;

/// Identifier wrapper for catalog assessments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentId(pub String);

impl AssessmentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable identifier of a single item, unique within its assessment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cognitive areas an item or assessment exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Attention,
    WorkingMemory,
    ProcessingSpeed,
    PatternRecognition,
    ProblemSolving,
    VerbalComprehension,
    ExecutiveFunction,
    SensoryProcessing,
}

impl Dimension {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::Attention,
            Self::WorkingMemory,
            Self::ProcessingSpeed,
            Self::PatternRecognition,
            Self::ProblemSolving,
            Self::VerbalComprehension,
            Self::ExecutiveFunction,
            Self::SensoryProcessing,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Attention => "Attention",
            Self::WorkingMemory => "Working Memory",
            Self::ProcessingSpeed => "Processing Speed",
            Self::PatternRecognition => "Pattern Recognition",
            Self::ProblemSolving => "Problem Solving",
            Self::VerbalComprehension => "Verbal Comprehension",
            Self::ExecutiveFunction => "Executive Function",
            Self::SensoryProcessing => "Sensory Processing",
        }
    }
}

/// Discriminant of [`ItemBody`], used to pick the completion predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Choice,
    Slider,
    FreeText,
    Categorization,
}

impl ItemKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Choice => "Multiple Choice",
            Self::Slider => "Slider",
            Self::FreeText => "Free Text",
            Self::Categorization => "Categorization",
        }
    }
}

/// A single addressable prompt within an assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(flatten)]
    pub body: ItemBody,
}

/// Per-kind payload of an item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemBody {
    Choice {
        prompt: &'static str,
        options: Vec<&'static str>,
        dimension_tags: Vec<Dimension>,
    },
    Slider {
        prompt: &'static str,
        min: f64,
        max: f64,
        step: f64,
        default: f64,
    },
    FreeText {
        prompt: &'static str,
        min_length: usize,
    },
    Categorization {
        tokens: BTreeSet<&'static str>,
        buckets: BTreeSet<&'static str>,
    },
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        match self.body {
            ItemBody::Choice { .. } => ItemKind::Choice,
            ItemBody::Slider { .. } => ItemKind::Slider,
            ItemBody::FreeText { .. } => ItemKind::FreeText,
            ItemBody::Categorization { .. } => ItemKind::Categorization,
        }
    }

    pub fn prompt(&self) -> Option<&'static str> {
        match &self.body {
            ItemBody::Choice { prompt, .. }
            | ItemBody::Slider { prompt, .. }
            | ItemBody::FreeText { prompt, .. } => Some(*prompt),
            ItemBody::Categorization { .. } => None,
        }
    }

    pub fn dimension_tags(&self) -> &[Dimension] {
        match &self.body {
            ItemBody::Choice { dimension_tags, .. } => dimension_tags.as_slice(),
            _ => &[],
        }
    }

    /// Checks that a value has the right shape for this item before it is stored.
    pub fn accepts(&self, value: &AnswerValue) -> Result<(), AnswerRejection> {
        match (&self.body, value) {
            (ItemBody::Choice { options, .. }, AnswerValue::Text(choice)) => {
                if options.iter().any(|option| *option == choice.as_str()) {
                    Ok(())
                } else {
                    Err(AnswerRejection::UnknownOption(choice.clone()))
                }
            }
            (ItemBody::FreeText { .. }, AnswerValue::Text(_)) => Ok(()),
            (ItemBody::Slider { min, max, step, .. }, AnswerValue::Number(number)) => {
                if !(number.is_finite() && *number >= *min && *number <= *max) {
                    return Err(AnswerRejection::OutOfRange {
                        value: *number,
                        min: *min,
                        max: *max,
                    });
                }
                if *step > 0.0 {
                    let steps = (number - min) / step;
                    if (steps - steps.round()).abs() > STEP_TOLERANCE {
                        return Err(AnswerRejection::OffStep {
                            value: *number,
                            step: *step,
                        });
                    }
                }
                Ok(())
            }
            (ItemBody::Categorization { tokens, buckets }, AnswerValue::Placement(placement)) => {
                for (token, bucket) in placement {
                    if !tokens.contains(token.as_str()) {
                        return Err(AnswerRejection::UnknownToken(token.clone()));
                    }
                    if !buckets.contains(bucket.as_str()) {
                        return Err(AnswerRejection::UnknownBucket(bucket.clone()));
                    }
                }
                Ok(())
            }
            (_, value) => Err(AnswerRejection::KindMismatch {
                expected: self.kind(),
                found: value.kind_label(),
            }),
        }
    }
}

/// Slack, in steps, for slider values that went through float arithmetic.
const STEP_TOLERANCE: f64 = 1e-6;

/// Reasons an answer value cannot be stored against an item.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnswerRejection {
    #[error("{expected:?} item cannot take a {found} answer")]
    KindMismatch { expected: ItemKind, found: &'static str },
    #[error("'{0}' is not one of the item's options")]
    UnknownOption(String),
    #[error("slider value {value} outside {min}..={max}")]
    OutOfRange { value: f64, min: f64, max: f64 },
    #[error("slider value {value} is not a multiple of the {step} step")]
    OffStep { value: f64, step: f64 },
    #[error("token '{0}' is not part of the exercise")]
    UnknownToken(String),
    #[error("bucket '{0}' is not part of the exercise")]
    UnknownBucket(String),
}

/// A captured answer: text for choice/free-text, a number for sliders, and a
/// token-to-bucket placement for categorization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Number(f64),
    Placement(BTreeMap<String, String>),
}

impl AnswerValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Number(number) => !number.is_finite(),
            Self::Placement(placement) => placement.is_empty(),
        }
    }

    fn kind_label(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "numeric",
            Self::Placement(_) => "placement",
        }
    }
}

/// Local scoring strategy applied when an assessment completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LocalScoring {
    Rubric(ScoringRubric),
    Coverage,
}

/// External path taken after completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum AnalysisRoute {
    Analyze,
    GradeOpenEnded { video_url: &'static str },
    LocalOnly,
}

/// Immutable description of one assessment mini-app.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentDefinition {
    pub id: AssessmentId,
    pub title: &'static str,
    pub estimated_minutes: u16,
    pub cognitive_dimension_tags: BTreeSet<Dimension>,
    pub items: Vec<Item>,
    pub local_scoring: LocalScoring,
    pub analysis_route: AnalysisRoute,
}

impl AssessmentDefinition {
    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn item_at(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn last_index(&self) -> usize {
        self.items.len().saturating_sub(1)
    }

    /// Item counts per cognitive area, in canonical dimension order.
    pub fn cognitive_areas(&self) -> Vec<(Dimension, usize)> {
        Dimension::ordered()
            .into_iter()
            .filter_map(|dimension| {
                let tagged = self
                    .items
                    .iter()
                    .filter(|item| item.dimension_tags().contains(&dimension))
                    .count();
                if tagged > 0 || self.cognitive_dimension_tags.contains(&dimension) {
                    Some((dimension, tagged))
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn summary(&self) -> AssessmentSummary {
        AssessmentSummary {
            id: self.id.clone(),
            title: self.title,
            estimated_minutes: self.estimated_minutes,
            item_count: self.items.len(),
            cognitive_areas: self
                .cognitive_dimension_tags
                .iter()
                .map(|dimension| dimension.label())
                .collect(),
        }
    }
}

/// Listing view of an assessment for selection screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentSummary {
    pub id: AssessmentId,
    pub title: &'static str,
    pub estimated_minutes: u16,
    pub item_count: usize,
    pub cognitive_areas: Vec<&'static str>,
}
