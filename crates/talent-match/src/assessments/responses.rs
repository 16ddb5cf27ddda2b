use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{AnswerValue, ItemId};

/// Answers captured for one assessment instance, keyed by item id.
///
/// Owned exclusively by the session that created it; nothing here is shared
/// across sessions or persisted until the assessment completes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseSet {
    answers: BTreeMap<ItemId, AnswerValue>,
}

impl ResponseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an answer, replacing any earlier answer for the same item.
    pub fn record(&mut self, item_id: ItemId, value: AnswerValue) -> Option<AnswerValue> {
        self.answers.insert(item_id, value)
    }

    pub fn get(&self, item_id: &ItemId) -> Option<&AnswerValue> {
        self.answers.get(item_id)
    }

    /// True when the item has a stored, non-empty answer.
    pub fn has_answer(&self, item_id: &ItemId) -> bool {
        self.answers
            .get(item_id)
            .map(|value| !value.is_empty())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &AnswerValue)> {
        self.answers.iter()
    }

    pub fn item_ids(&self) -> impl Iterator<Item = &ItemId> {
        self.answers.keys()
    }
}

impl FromIterator<(ItemId, AnswerValue)> for ResponseSet {
    fn from_iter<T: IntoIterator<Item = (ItemId, AnswerValue)>>(iter: T) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}
