use serde::{Deserialize, Serialize};

use super::super::domain::ItemId;

const BALANCED_LINE: &str =
    "Balanced sensory profile: adapts comfortably to most work environments.";

/// Threshold rubric for slider-based assessments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRubric {
    pub dimensions: Vec<RubricDimension>,
    pub max_narrative_lines: usize,
    pub balanced_line: String,
}

/// One tracked dimension, read from a single slider item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricDimension {
    pub item_id: ItemId,
    pub max_value: f64,
    pub default_value: f64,
    pub high_threshold: f64,
    pub high_line: String,
}

impl ScoringRubric {
    /// Work-environment sensitivities on a 1-7 scale, four narrative lines at most.
    pub fn sensory_profile() -> Self {
        let dimension = |item_id: &str, high_line: &str| RubricDimension {
            item_id: ItemId::new(item_id),
            max_value: 7.0,
            default_value: 4.0,
            high_threshold: 6.0,
            high_line: high_line.to_string(),
        };

        Self {
            dimensions: vec![
                dimension(
                    "noise",
                    "High noise sensitivity: quiet zones or noise-cancelling headphones \
                     support focus.",
                ),
                dimension(
                    "interruptions",
                    "High interruption sensitivity: protected focus blocks and async updates \
                     work best.",
                ),
                dimension(
                    "lighting",
                    "Lighting sensitive: natural or adjustable lighting keeps energy steady.",
                ),
                dimension(
                    "crowding",
                    "Prefers low-density spaces: a dedicated desk beats open-plan seating.",
                ),
                dimension(
                    "schedule_changes",
                    "Values predictability: advance notice of schedule changes reduces strain.",
                ),
            ],
            max_narrative_lines: 4,
            balanced_line: BALANCED_LINE.to_string(),
        }
    }

    /// Highest achievable raw total across all dimensions.
    pub fn max_total(&self) -> f64 {
        self.dimensions
            .iter()
            .map(|dimension| dimension.max_value)
            .sum()
    }
}
