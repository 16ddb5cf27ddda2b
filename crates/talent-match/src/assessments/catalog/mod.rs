mod exercises;
mod quizzes;

use std::collections::HashSet;
use std::sync::Arc;

use super::domain::{AnalysisRoute, AssessmentDefinition, AssessmentId, ItemId, LocalScoring};

/// Read-only registry of every assessment a candidate can take.
#[derive(Debug, Clone)]
pub struct AssessmentCatalog {
    assessments: Vec<Arc<AssessmentDefinition>>,
}

impl AssessmentCatalog {
    /// The catalog shipped with the platform.
    pub fn standard() -> Self {
        Self {
            assessments: vec![
                Arc::new(quizzes::cognitive_style()),
                Arc::new(quizzes::focus_and_attention()),
                Arc::new(exercises::information_sorting()),
                Arc::new(exercises::video_comprehension()),
                Arc::new(exercises::sensory_profile()),
            ],
        }
    }

    /// Build a catalog from custom definitions, rejecting ambiguous ids.
    pub fn from_definitions(definitions: Vec<AssessmentDefinition>) -> Result<Self, CatalogError> {
        let mut assessment_ids = HashSet::new();
        for definition in &definitions {
            if !assessment_ids.insert(definition.id.clone()) {
                return Err(CatalogError::DuplicateAssessment(definition.id.clone()));
            }
            validate_definition(definition)?;
        }

        Ok(Self {
            assessments: definitions.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn list_assessments(&self) -> &[Arc<AssessmentDefinition>] {
        &self.assessments
    }

    pub fn get_assessment(
        &self,
        id: &AssessmentId,
    ) -> Result<Arc<AssessmentDefinition>, CatalogError> {
        self.assessments
            .iter()
            .find(|definition| &definition.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }
}

impl Default for AssessmentCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn validate_definition(definition: &AssessmentDefinition) -> Result<(), CatalogError> {
    if definition.items.is_empty() {
        return Err(CatalogError::EmptyAssessment(definition.id.clone()));
    }

    let mut item_ids = HashSet::new();
    for item in &definition.items {
        if !item_ids.insert(&item.id) {
            return Err(CatalogError::DuplicateItem {
                assessment_id: definition.id.clone(),
                item_id: item.id.clone(),
            });
        }
    }

    if let LocalScoring::Rubric(rubric) = &definition.local_scoring {
        if let Some(dimension) = rubric
            .dimensions
            .iter()
            .find(|dimension| !item_ids.contains(&dimension.item_id))
        {
            return Err(CatalogError::RubricItemMissing {
                assessment_id: definition.id.clone(),
                item_id: dimension.item_id.clone(),
            });
        }
    }

    if let AnalysisRoute::GradeOpenEnded { video_url } = definition.analysis_route {
        if video_url.trim().is_empty() {
            return Err(CatalogError::MissingVideoUrl(definition.id.clone()));
        }
    }

    Ok(())
}

/// Catalog lookup and construction failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("assessment '{0}' not found")]
    NotFound(AssessmentId),
    #[error("assessment '{0}' is defined more than once")]
    DuplicateAssessment(AssessmentId),
    #[error("assessment '{0}' has no items")]
    EmptyAssessment(AssessmentId),
    #[error("assessment '{assessment_id}' reuses item id '{item_id}'")]
    DuplicateItem {
        assessment_id: AssessmentId,
        item_id: ItemId,
    },
    #[error("assessment '{assessment_id}' rubric references unknown item '{item_id}'")]
    RubricItemMissing {
        assessment_id: AssessmentId,
        item_id: ItemId,
    },
    #[error("assessment '{0}' grades open-ended answers but has no video")]
    MissingVideoUrl(AssessmentId),
}
