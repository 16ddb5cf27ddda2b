//! Per-kind completion rules.
//!
//! The session state machine stays kind-agnostic: it only asks this table whether
//! an item has an answer (gates `next`) and whether the item's completion predicate
//! holds (gates `complete`).

use super::domain::{AnswerValue, AssessmentDefinition, Item, ItemBody, ItemId, ItemKind};
use super::responses::ResponseSet;

pub type CompletionPredicate = fn(&Item, Option<&AnswerValue>) -> bool;

pub fn predicate_for(kind: ItemKind) -> CompletionPredicate {
    match kind {
        ItemKind::Choice => choice_selected,
        ItemKind::Slider => slider_settled,
        ItemKind::FreeText => free_text_long_enough,
        ItemKind::Categorization => any_bucket_filled,
    }
}

fn choice_selected(_item: &Item, answer: Option<&AnswerValue>) -> bool {
    matches!(answer, Some(AnswerValue::Text(choice)) if !choice.trim().is_empty())
}

// Sliders are seeded with their default, so an untouched slider still counts.
fn slider_settled(_item: &Item, answer: Option<&AnswerValue>) -> bool {
    match answer {
        Some(AnswerValue::Number(value)) => value.is_finite(),
        Some(_) => false,
        None => true,
    }
}

fn free_text_long_enough(item: &Item, answer: Option<&AnswerValue>) -> bool {
    let min_length = match item.body {
        ItemBody::FreeText { min_length, .. } => min_length,
        _ => 0,
    };
    match answer {
        Some(AnswerValue::Text(text)) => {
            let trimmed = text.trim();
            !trimmed.is_empty() && trimmed.chars().count() >= min_length
        }
        _ => false,
    }
}

fn any_bucket_filled(_item: &Item, answer: Option<&AnswerValue>) -> bool {
    matches!(answer, Some(AnswerValue::Placement(placement)) if !placement.is_empty())
}

/// Whether the item counts as answered for navigation purposes.
pub fn item_answered(item: &Item, responses: &ResponseSet) -> bool {
    match item.kind() {
        ItemKind::Slider => slider_settled(item, responses.get(&item.id)),
        _ => responses.has_answer(&item.id),
    }
}

pub fn item_satisfied(item: &Item, responses: &ResponseSet) -> bool {
    predicate_for(item.kind())(item, responses.get(&item.id))
}

/// Items whose completion predicate does not hold yet, in catalog order.
pub fn unsatisfied_items(
    definition: &AssessmentDefinition,
    responses: &ResponseSet,
) -> Vec<ItemId> {
    definition
        .items
        .iter()
        .filter(|item| !item_satisfied(item, responses))
        .map(|item| item.id.clone())
        .collect()
}

pub fn is_complete(definition: &AssessmentDefinition, responses: &ResponseSet) -> bool {
    definition
        .items
        .iter()
        .all(|item| item_satisfied(item, responses))
}

/// Copy of `responses` with every untouched slider filled in with its default.
pub fn with_slider_defaults(
    definition: &AssessmentDefinition,
    responses: &ResponseSet,
) -> ResponseSet {
    let mut filled = responses.clone();
    for item in &definition.items {
        if let ItemBody::Slider { default, .. } = item.body {
            if filled.get(&item.id).is_none() {
                filled.record(item.id.clone(), AnswerValue::Number(default));
            }
        }
    }
    filled
}
