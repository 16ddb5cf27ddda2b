use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::analysis::ExternalAnalysis;
use super::completion::{item_answered, is_complete, unsatisfied_items, with_slider_defaults};
use super::domain::{AnswerRejection, AnswerValue, AssessmentDefinition, AssessmentId, Item, ItemId};
use super::responses::ResponseSet;
use super::scoring::LocalSummary;

/// Lifecycle of one assessment instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    NotStarted,
    InProgress {
        current_index: usize,
        responses: ResponseSet,
    },
    Completed {
        responses: ResponseSet,
    },
    ResultsShown {
        responses: ResponseSet,
        local_summary: Option<LocalSummary>,
        external_analysis: Option<ExternalAnalysis>,
        analysis_error: Option<String>,
    },
}

impl SessionState {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::InProgress { .. } => "in progress",
            Self::Completed { .. } => "completed",
            Self::ResultsShown { .. } => "showing results",
        }
    }

    pub fn responses(&self) -> Option<&ResponseSet> {
        match self {
            Self::NotStarted => None,
            Self::InProgress { responses, .. }
            | Self::Completed { responses }
            | Self::ResultsShown { responses, .. } => Some(responses),
        }
    }
}

/// Errors raised when a session operation is not allowed in the current state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("cannot {operation} while the assessment is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: &'static str,
    },
    #[error("item '{0}' is not part of this assessment")]
    UnknownItem(ItemId),
    #[error("answer for item '{item_id}' rejected: {reason}")]
    AnswerRejected {
        item_id: ItemId,
        reason: AnswerRejection,
    },
    #[error("item '{0}' needs an answer before moving on")]
    Unanswered(ItemId),
    #[error("assessment incomplete: {count} item(s) outstanding", count = .missing.len())]
    Incomplete { missing: Vec<ItemId> },
}

/// Navigation snapshot for rendering progress and enabling controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub current_index: usize,
    pub total: usize,
    pub answered: usize,
    pub can_advance: bool,
    pub can_complete: bool,
}

/// State machine driving a single assessment from first item to results.
#[derive(Debug)]
pub struct AssessmentSession {
    definition: Arc<AssessmentDefinition>,
    state: SessionState,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl AssessmentSession {
    pub fn new(definition: Arc<AssessmentDefinition>) -> Self {
        Self {
            definition,
            state: SessionState::NotStarted,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn definition(&self) -> &AssessmentDefinition {
        &self.definition
    }

    pub fn assessment_id(&self) -> &AssessmentId {
        &self.definition.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::NotStarted) {
            return Err(self.invalid("start"));
        }

        self.state = SessionState::InProgress {
            current_index: 0,
            responses: ResponseSet::new(),
        };
        self.started_at = Some(Utc::now());
        self.completed_at = None;
        Ok(())
    }

    /// Record an answer without moving; answering the same item again overwrites it.
    pub fn answer(&mut self, item_id: ItemId, value: AnswerValue) -> Result<(), SessionError> {
        self.require_in_progress("answer")?;

        let item = self
            .definition
            .item(&item_id)
            .ok_or_else(|| SessionError::UnknownItem(item_id.clone()))?;
        item.accepts(&value)
            .map_err(|reason| SessionError::AnswerRejected {
                item_id: item_id.clone(),
                reason,
            })?;

        if let SessionState::InProgress { responses, .. } = &mut self.state {
            responses.record(item_id, value);
        }
        Ok(())
    }

    /// Advance one item; stays put on the last item.
    pub fn next(&mut self) -> Result<usize, SessionError> {
        self.require_in_progress("advance")?;

        let definition = &self.definition;
        let SessionState::InProgress {
            current_index,
            responses,
        } = &mut self.state
        else {
            return Ok(0);
        };

        if let Some(item) = definition.item_at(*current_index) {
            if !item_answered(item, responses) {
                return Err(SessionError::Unanswered(item.id.clone()));
            }
        }

        *current_index = (*current_index + 1).min(definition.last_index());
        Ok(*current_index)
    }

    pub fn previous(&mut self) -> Result<usize, SessionError> {
        self.require_in_progress("go back")?;

        let SessionState::InProgress { current_index, .. } = &mut self.state else {
            return Ok(0);
        };
        *current_index = current_index.saturating_sub(1);
        Ok(*current_index)
    }

    pub fn current_item(&self) -> Option<&Item> {
        match &self.state {
            SessionState::InProgress { current_index, .. } => {
                self.definition.item_at(*current_index)
            }
            _ => None,
        }
    }

    pub fn progress(&self) -> SessionProgress {
        let total = self.definition.items.len();
        match &self.state {
            SessionState::InProgress {
                current_index,
                responses,
            } => SessionProgress {
                current_index: *current_index,
                total,
                answered: self
                    .definition
                    .items
                    .iter()
                    .filter(|item| item_answered(item, responses))
                    .count(),
                can_advance: self
                    .definition
                    .item_at(*current_index)
                    .map(|item| item_answered(item, responses))
                    .unwrap_or(false),
                can_complete: is_complete(&self.definition, responses),
            },
            SessionState::NotStarted => SessionProgress {
                current_index: 0,
                total,
                answered: 0,
                can_advance: false,
                can_complete: false,
            },
            SessionState::Completed { .. } | SessionState::ResultsShown { .. } => {
                SessionProgress {
                    current_index: self.definition.last_index(),
                    total,
                    answered: total,
                    can_advance: false,
                    can_complete: false,
                }
            }
        }
    }

    /// Close the assessment once every item's completion predicate holds.
    ///
    /// Untouched sliders are materialized with their defaults in the completed set.
    pub fn complete(&mut self) -> Result<(), SessionError> {
        let SessionState::InProgress { responses, .. } = &self.state else {
            return Err(self.invalid("complete"));
        };

        let missing = unsatisfied_items(&self.definition, responses);
        if !missing.is_empty() {
            return Err(SessionError::Incomplete { missing });
        }

        let responses = with_slider_defaults(&self.definition, responses);
        self.state = SessionState::Completed { responses };
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Display the local summary; moves `Completed` to `ResultsShown`.
    pub fn show_local_summary(&mut self, summary: LocalSummary) -> Result<(), SessionError> {
        self.enter_results("show results")?;
        if let SessionState::ResultsShown { local_summary, .. } = &mut self.state {
            *local_summary = Some(summary);
        }
        Ok(())
    }

    /// Attach an external result, clearing any earlier failure message.
    pub fn attach_external_analysis(
        &mut self,
        analysis: ExternalAnalysis,
    ) -> Result<(), SessionError> {
        self.enter_results("attach analysis")?;
        if let SessionState::ResultsShown {
            external_analysis,
            analysis_error,
            ..
        } = &mut self.state
        {
            *external_analysis = Some(analysis);
            *analysis_error = None;
        }
        Ok(())
    }

    /// Record why the external path failed; the local summary stays visible.
    pub fn record_analysis_error(
        &mut self,
        message: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.enter_results("record analysis error")?;
        if let SessionState::ResultsShown { analysis_error, .. } = &mut self.state {
            *analysis_error = Some(message.into());
        }
        Ok(())
    }

    /// Discard everything and return to `NotStarted`.
    pub fn reset(&mut self) {
        self.state = SessionState::NotStarted;
        self.started_at = None;
        self.completed_at = None;
    }

    pub fn completion_time_seconds(&self) -> Option<u64> {
        let started = self.started_at?;
        let completed = self.completed_at?;
        Some((completed - started).num_seconds().max(0) as u64)
    }

    fn enter_results(&mut self, operation: &'static str) -> Result<(), SessionError> {
        match self.state {
            SessionState::ResultsShown { .. } => Ok(()),
            SessionState::Completed { .. } => {
                let previous = std::mem::replace(&mut self.state, SessionState::NotStarted);
                if let SessionState::Completed { responses } = previous {
                    self.state = SessionState::ResultsShown {
                        responses,
                        local_summary: None,
                        external_analysis: None,
                        analysis_error: None,
                    };
                }
                Ok(())
            }
            _ => Err(self.invalid(operation)),
        }
    }

    fn require_in_progress(&self, operation: &'static str) -> Result<(), SessionError> {
        match self.state {
            SessionState::InProgress { .. } => Ok(()),
            _ => Err(self.invalid(operation)),
        }
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            operation,
            state: self.state.label(),
        }
    }
}
