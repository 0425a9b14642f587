use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;

use cartograph_core::api_types::HealthResponse;

use crate::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    info!("Health check requested");

    let neo4j_connected = state.graph.is_connected()
        && match state.graph.node_count().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Neo4j connectivity check failed: {e}");
                false
            }
        };

    let status = if neo4j_connected {
        "ok".to_string()
    } else {
        "degraded".to_string()
    };

    let response = HealthResponse {
        status,
        version: VERSION.to_string(),
        neo4j_connected,
        classifier_configured: state.config.classifier_configured(),
        translation_mode: state.translator.mode(),
    };

    (StatusCode::OK, Json(response))
}
