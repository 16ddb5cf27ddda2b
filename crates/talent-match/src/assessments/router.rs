use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::catalog::{AssessmentCatalog, CatalogError};
use super::domain::{AssessmentDefinition, AssessmentId, AssessmentSummary};
use super::responses::ResponseSet;
use super::scoring::{summarize, LocalSummary};
use super::session::{AssessmentSession, SessionError};

/// Router exposing the catalog and stateless local scoring.
pub fn assessment_router(catalog: Arc<AssessmentCatalog>) -> Router {
    Router::new()
        .route("/api/v1/assessments", get(list_handler))
        .route("/api/v1/assessments/:assessment_id", get(detail_handler))
        .route(
            "/api/v1/assessments/:assessment_id/score",
            post(score_handler),
        )
        .with_state(catalog)
}

pub(crate) async fn list_handler(State(catalog): State<Arc<AssessmentCatalog>>) -> Response {
    let summaries: Vec<AssessmentSummary> = catalog
        .list_assessments()
        .iter()
        .map(|definition| definition.summary())
        .collect();
    (StatusCode::OK, axum::Json(summaries)).into_response()
}

pub(crate) async fn detail_handler(
    State(catalog): State<Arc<AssessmentCatalog>>,
    Path(assessment_id): Path<String>,
) -> Response {
    match catalog.get_assessment(&AssessmentId::new(assessment_id)) {
        Ok(definition) => (StatusCode::OK, axum::Json(definition.as_ref())).into_response(),
        Err(error) => catalog_error_response(error),
    }
}

pub(crate) async fn score_handler(
    State(catalog): State<Arc<AssessmentCatalog>>,
    Path(assessment_id): Path<String>,
    axum::Json(responses): axum::Json<ResponseSet>,
) -> Response {
    let definition = match catalog.get_assessment(&AssessmentId::new(assessment_id)) {
        Ok(definition) => definition,
        Err(error) => return catalog_error_response(error),
    };
    let id = definition.id.clone();

    match score_submission(definition, &responses) {
        Ok(summary) => {
            let payload = json!({
                "assessment_id": id,
                "local_summary": summary,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(SessionError::Incomplete { missing }) => {
            let payload = json!({
                "error": "assessment incomplete",
                "missing_items": missing,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}

/// Replays the answers through a throwaway session so the same gates apply.
fn score_submission(
    definition: Arc<AssessmentDefinition>,
    responses: &ResponseSet,
) -> Result<LocalSummary, SessionError> {
    let mut session = AssessmentSession::new(definition);
    session.start()?;
    for (item_id, value) in responses.iter() {
        session.answer(item_id.clone(), value.clone())?;
    }
    session.complete()?;

    let completed = session.state().responses().cloned().unwrap_or_default();
    Ok(summarize(session.definition(), &completed))
}

fn catalog_error_response(error: CatalogError) -> Response {
    let status = match error {
        CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
