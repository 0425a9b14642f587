use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use cartograph_core::api_types::{QueryRequest, QueryResponse};
use cartograph_graph::ResultNormalizer;

use super::error_response;
use crate::state::AppState;

fn empty_query_response() -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": "natural_language_query must not be empty" })),
    )
        .into_response()
}

#[instrument(skip(state, request), fields(query_id = tracing::field::Empty))]
pub async fn process_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> impl IntoResponse {
    let text = request.natural_language_query.trim();
    if text.is_empty() {
        return empty_query_response();
    }

    let query_id = Uuid::new_v4();
    tracing::Span::current().record("query_id", tracing::field::display(query_id));
    info!(query = %text, "Received natural language query");

    let plan = state.translator.translate(text).await;

    let records = match state.graph.execute(&plan.query, &plan.parameters).await {
        Ok(records) => records,
        Err(e) => {
            error!(error = %e, cypher = %plan.query, "Query execution failed");
            return error_response("Query execution failed", &e);
        }
    };

    let graph_data = match ResultNormalizer::normalize(&records) {
        Ok(graph) => graph,
        Err(e) => {
            error!(error = %e, rows = records.len(), "Query result could not be normalized");
            return error_response("Query result could not be normalized", &e);
        }
    };

    info!(
        nodes = graph_data.nodes.len(),
        relationships = graph_data.relationships.len(),
        "Query completed"
    );

    let response = QueryResponse {
        query_id,
        graph_data,
        query_details: request.include_query_details.then_some(plan),
        executed_at: Utc::now(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

#[instrument(skip(state, request))]
pub async fn translate_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> impl IntoResponse {
    let text = request.natural_language_query.trim();
    if text.is_empty() {
        return empty_query_response();
    }

    info!(query = %text, "Translating natural language query");
    let plan = state.translator.translate(text).await;

    (StatusCode::OK, Json(plan)).into_response()
}
