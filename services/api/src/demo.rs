use crate::infra::{
    resolve_credential, InMemoryMatchListCache, InMemorySubmissionStore, OfflineAnalysisGateway,
};
use clap::Args;
use std::sync::Arc;
use talent_match::assessments::{
    AnalysisGateway, AnswerValue, AssessmentCatalog, AssessmentDefinition, AssessmentId,
    AssessmentPipeline, Credential, ExternalAnalysis, HttpAnalysisGateway, HttpSubmissionGateway,
    Item, ItemBody, SessionState, SubmissionCoordinator, SubmissionGateway, SubmissionOutcome,
};
use talent_match::config::AppConfig;
use talent_match::error::AppError;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Assessment to walk through
    #[arg(long, default_value = "cognitive-style")]
    pub(crate) assessment: String,
    /// Bearer token for the backend (defaults to APP_AUTH_TOKEN)
    #[arg(long)]
    pub(crate) token: Option<String>,
    /// Keep everything in memory instead of calling the analysis service and backend
    #[arg(long)]
    pub(crate) offline: bool,
}

pub(crate) fn run_catalog() -> Result<(), AppError> {
    let catalog = AssessmentCatalog::standard();

    println!("Available assessments");
    for definition in catalog.list_assessments() {
        let summary = definition.summary();
        println!(
            "- {} | {} | {} items | ~{} min",
            summary.id, summary.title, summary.item_count, summary.estimated_minutes
        );
        let breakdown: Vec<String> = definition
            .cognitive_areas()
            .into_iter()
            .map(|(dimension, items)| {
                if items > 0 {
                    format!("{} ({items})", dimension.label())
                } else {
                    dimension.label().to_string()
                }
            })
            .collect();
        if !breakdown.is_empty() {
            println!("  Cognitive areas: {}", breakdown.join(", "));
        }
    }

    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        assessment,
        token,
        offline,
    } = args;

    let config = AppConfig::load()?;
    let catalog = Arc::new(AssessmentCatalog::standard());
    let assessment_id = AssessmentId::new(assessment);
    let credential = resolve_credential(token, &config.backend);
    let cache = Arc::new(InMemoryMatchListCache::default());

    println!("Cognitive assessment demo");
    if offline {
        println!("Mode: offline (analysis disabled, submissions kept in memory)");
        let store = Arc::new(InMemorySubmissionStore::default());
        let coordinator = Arc::new(SubmissionCoordinator::new(store.clone(), cache.clone()));
        let pipeline =
            AssessmentPipeline::new(catalog, Arc::new(OfflineAnalysisGateway), coordinator);
        // Offline runs always have somewhere to store the result.
        let credential = credential.or_else(|| Some(Credential::new("offline-demo")));
        walk_through(&pipeline, &assessment_id, credential).await?;
        println!("  Stored locally: {} submission(s)", store.requests().len());
    } else {
        println!(
            "Mode: live (analysis at {}, backend at {})",
            config.analysis.base_url, config.backend.base_url
        );
        let analysis = Arc::new(HttpAnalysisGateway::new(&config.analysis)?);
        let submissions = Arc::new(HttpSubmissionGateway::new(&config.backend)?);
        let coordinator = Arc::new(SubmissionCoordinator::new(submissions, cache.clone()));
        let pipeline = AssessmentPipeline::new(catalog, analysis, coordinator);
        walk_through(&pipeline, &assessment_id, credential).await?;
    }

    match cache.stale_keys().last() {
        Some(key) => println!(
            "  Match list refetch requested for {} completed assessment(s)",
            key.completed_assessments
        ),
        None => println!("  Match list unchanged"),
    }

    Ok(())
}

async fn walk_through<A, S>(
    pipeline: &AssessmentPipeline<A, S, InMemoryMatchListCache>,
    assessment_id: &AssessmentId,
    credential: Option<Credential>,
) -> Result<(), AppError>
where
    A: AnalysisGateway + 'static,
    S: SubmissionGateway + 'static,
{
    let signed_in = credential.is_some();
    let mut active = pipeline.start(assessment_id, credential)?;
    let definition = active.session().definition().clone();

    println!(
        "\n{} ({} items, ~{} min){}",
        definition.title,
        definition.items.len(),
        definition.estimated_minutes,
        if signed_in { "" } else { " - not signed in" }
    );

    for (index, item) in definition.items.iter().enumerate() {
        let answer = scripted_answer(item, index);
        println!(
            "- [{}/{}] {} -> {}",
            index + 1,
            definition.items.len(),
            item.prompt().unwrap_or("Sort the tasks into buckets"),
            describe(&answer)
        );
        active.answer(item.id.clone(), answer)?;
        active.next()?;
    }

    let summary = pipeline.finish(&mut active)?;
    println!("\nLocal summary: {}%", summary.normalized_percent);
    for line in &summary.narrative_lines {
        println!("  - {line}");
    }

    active.resolve_analysis().await?;
    render_external(&definition, active.session().state());

    if let Some(outcome) = active.submission_outcome().await {
        match &outcome {
            SubmissionOutcome::Failed { reason } => {
                println!("\nSubmission: {} ({reason})", outcome.label())
            }
            other => println!("\nSubmission: {}", other.label()),
        }
    }

    Ok(())
}

/// Deterministic answer for an item so demo runs are reproducible.
pub(crate) fn scripted_answer(item: &Item, index: usize) -> AnswerValue {
    match &item.body {
        ItemBody::Choice { options, .. } => {
            let option = options.get(index % options.len().max(1)).copied();
            AnswerValue::text(option.unwrap_or_default())
        }
        ItemBody::Slider { min, max, step, .. } => {
            let steps = ((max - min) / step).floor().max(0.0);
            AnswerValue::Number(min + (index as f64 * 2.0 % (steps + 1.0)) * step)
        }
        ItemBody::FreeText { min_length, .. } => AnswerValue::text(format!(
            "{:<width$}",
            "The team agreed to fix the flaky deploy before adding new features.",
            width = *min_length
        )),
        ItemBody::Categorization { tokens, buckets } => {
            let buckets: Vec<&str> = buckets.iter().copied().collect();
            AnswerValue::Placement(
                tokens
                    .iter()
                    .enumerate()
                    .filter_map(|(position, token)| {
                        buckets
                            .get(position % buckets.len().max(1))
                            .map(|bucket| (token.to_string(), bucket.to_string()))
                    })
                    .collect(),
            )
        }
    }
}

fn describe(answer: &AnswerValue) -> String {
    match answer {
        AnswerValue::Text(text) => format!("\"{}\"", text.trim()),
        AnswerValue::Number(value) => format!("{value}"),
        AnswerValue::Placement(placement) => format!("{} task(s) placed", placement.len()),
    }
}

fn render_external(definition: &AssessmentDefinition, state: &SessionState) {
    let SessionState::ResultsShown {
        external_analysis,
        analysis_error,
        ..
    } = state
    else {
        return;
    };

    match (external_analysis, analysis_error) {
        (Some(ExternalAnalysis::Analysis(result)), _) => {
            let view = result.view();
            println!("\nAnalysis: {}", view.summary);
            println!("  Strengths: {}", view.primary_strengths.join("; "));
            if !view.optimal_work_conditions.is_empty() {
                println!(
                    "  Works best with: {}",
                    view.optimal_work_conditions.join("; ")
                );
            }
            println!("  Recommendations: {}", view.recommendations.join("; "));
            if let Some(confidence) = view.confidence_percent {
                println!("  Confidence: {confidence}%");
            }
        }
        (Some(ExternalAnalysis::Grading(grading)), _) => {
            match serde_json::to_string_pretty(&grading.grading) {
                Ok(json) => println!("\nGrading:\n{json}"),
                Err(err) => println!("\nGrading unavailable: {err}"),
            }
        }
        (None, Some(error)) => {
            println!("\nAnalysis unavailable: {error}");
            println!("  The local summary above is still valid.");
        }
        (None, None) => println!(
            "\n{} is scored locally; no external analysis requested.",
            definition.title
        ),
    }
}
