use std::collections::{BTreeMap, BTreeSet};

use super::super::completion::item_satisfied;
use super::super::domain::{AnswerValue, AssessmentDefinition, Item, ItemBody};
use super::super::responses::ResponseSet;
use super::rubric::ScoringRubric;
use super::LocalSummary;

const COVERAGE_NARRATIVE_CAP: usize = 4;

/// Free text earns full depth at this multiple of the item's minimum length.
pub const FREE_TEXT_FULL_CREDIT: usize = 3;

/// Threshold scoring for slider rubrics.
///
/// Dimensions are visited in declaration order; each one at or above its high
/// threshold contributes its line until the cap is reached. Values outside the
/// dimension's range are clamped so the percentage stays within 0..=100.
pub fn score(responses: &ResponseSet, rubric: &ScoringRubric) -> LocalSummary {
    let mut total = 0.0_f64;
    let mut narrative_lines = Vec::new();

    for dimension in &rubric.dimensions {
        let value = responses
            .get(&dimension.item_id)
            .and_then(|answer| answer.as_number())
            .filter(|value| value.is_finite())
            .unwrap_or(dimension.default_value)
            .clamp(0.0, dimension.max_value);
        total += value;

        if value >= dimension.high_threshold && narrative_lines.len() < rubric.max_narrative_lines {
            narrative_lines.push(dimension.high_line.clone());
        }
    }

    if narrative_lines.is_empty() {
        narrative_lines.push(rubric.balanced_line.clone());
    }

    LocalSummary {
        normalized_percent: percent(total, rubric.max_total()),
        narrative_lines,
    }
}

/// Fallback summary for assessments without a rubric.
///
/// Each item contributes its depth in `0.0..=1.0`: a selected choice or a settled
/// slider counts fully, a categorization counts the share of tokens placed, and free
/// text counts its trimmed length against [`FREE_TEXT_FULL_CREDIT`] times the item's
/// minimum. The percentage is the mean depth.
pub fn coverage_summary(
    definition: &AssessmentDefinition,
    responses: &ResponseSet,
) -> LocalSummary {
    let total = definition.items.len();
    let satisfied: Vec<&Item> = definition
        .items
        .iter()
        .filter(|item| item_satisfied(item, responses))
        .collect();
    let depth: f64 = definition
        .items
        .iter()
        .map(|item| item_depth(item, responses))
        .sum();

    let mut narrative_lines = vec![format!(
        "Completed {} of {} items in {}.",
        satisfied.len(),
        total,
        definition.title
    )];

    let areas: Vec<&str> = definition
        .cognitive_areas()
        .into_iter()
        .filter(|(dimension, _)| {
            satisfied
                .iter()
                .any(|item| item.dimension_tags().contains(dimension))
        })
        .map(|(dimension, _)| dimension.label())
        .collect();

    if !areas.is_empty() {
        narrative_lines.push(format!("Cognitive areas exercised: {}.", areas.join(", ")));
    } else if !definition.cognitive_dimension_tags.is_empty() {
        let tagged: Vec<&str> = definition
            .cognitive_dimension_tags
            .iter()
            .map(|dimension| dimension.label())
            .collect();
        narrative_lines.push(format!("Focus areas: {}.", tagged.join(", ")));
    }

    narrative_lines.extend(depth_lines(definition, responses));
    narrative_lines
        .push("Detailed insights appear once the analysis service responds.".to_string());
    narrative_lines.truncate(COVERAGE_NARRATIVE_CAP);

    LocalSummary {
        normalized_percent: percent(depth, total as f64),
        narrative_lines,
    }
}

fn item_depth(item: &Item, responses: &ResponseSet) -> f64 {
    if !item_satisfied(item, responses) {
        return 0.0;
    }
    match (&item.body, responses.get(&item.id)) {
        (ItemBody::Categorization { tokens, .. }, Some(AnswerValue::Placement(placement))) => {
            ratio(placed_tokens(tokens, placement), tokens.len())
        }
        (ItemBody::FreeText { min_length, .. }, Some(AnswerValue::Text(text))) => ratio(
            text.trim().chars().count(),
            free_text_target(*min_length),
        ),
        _ => 1.0,
    }
}

fn depth_lines(definition: &AssessmentDefinition, responses: &ResponseSet) -> Vec<String> {
    let mut placed = 0;
    let mut tokens_total = 0;
    let mut written = Vec::new();
    let mut target = 0;

    for item in &definition.items {
        match (&item.body, responses.get(&item.id)) {
            (ItemBody::Categorization { tokens, .. }, answer) => {
                tokens_total += tokens.len();
                if let Some(AnswerValue::Placement(placement)) = answer {
                    placed += placed_tokens(tokens, placement);
                }
            }
            (ItemBody::FreeText { min_length, .. }, answer) => {
                target = target.max(free_text_target(*min_length));
                let length = answer
                    .and_then(AnswerValue::as_text)
                    .map(|text| text.trim().chars().count())
                    .unwrap_or(0);
                written.push(length);
            }
            _ => {}
        }
    }

    let mut lines = Vec::new();
    if tokens_total > 0 {
        lines.push(format!("Placed {placed} of {tokens_total} tasks into buckets."));
    }
    if !written.is_empty() {
        let average = written.iter().sum::<usize>() / written.len();
        lines.push(format!(
            "Written answers average {average} characters; {target} earns full credit."
        ));
    }
    lines
}

fn placed_tokens(tokens: &BTreeSet<&'static str>, placement: &BTreeMap<String, String>) -> usize {
    placement
        .keys()
        .filter(|token| tokens.contains(token.as_str()))
        .count()
}

fn free_text_target(min_length: usize) -> usize {
    min_length.max(1) * FREE_TEXT_FULL_CREDIT
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 1.0;
    }
    (part as f64 / whole as f64).min(1.0)
}

fn percent(value: f64, max: f64) -> u8 {
    if max <= 0.0 {
        return 0;
    }
    (value / max * 100.0).round().clamp(0.0, 100.0) as u8
}
