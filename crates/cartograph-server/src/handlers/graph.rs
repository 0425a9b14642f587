use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{error, info, warn};

use cartograph_core::api_types::{
    ConnectionDetails, ConnectionTestResponse, GraphQueryRequest, GraphStatsResponse,
};
use cartograph_core::Properties;
use cartograph_graph::ResultNormalizer;

use super::error_response;
use crate::state::AppState;

pub async fn query_graph(
    State(state): State<AppState>,
    Json(request): Json<GraphQueryRequest>,
) -> impl IntoResponse {
    info!(cypher = %request.cypher, "Executing graph query");

    let records = match state.graph.execute(&request.cypher, &request.params).await {
        Ok(records) => records,
        Err(e) => {
            error!("Graph query failed: {e}");
            return error_response("Query failed", &e);
        }
    };

    match ResultNormalizer::normalize(&records) {
        Ok(graph) => (StatusCode::OK, Json(graph)).into_response(),
        Err(e) => {
            error!("Graph query returned malformed entities: {e}");
            error_response("Query result could not be normalized", &e)
        }
    }
}

pub async fn graph_stats(State(state): State<AppState>) -> impl IntoResponse {
    info!("Fetching graph statistics");

    let node_count = match state.graph.node_count().await {
        Ok(count) => count,
        Err(e) => {
            error!("Failed to get node count: {e}");
            return error_response("Failed to get node count", &e);
        }
    };

    let relationship_count = match state.graph.relationship_count().await {
        Ok(count) => count,
        Err(e) => {
            error!("Failed to get relationship count: {e}");
            return error_response("Failed to get relationship count", &e);
        }
    };

    let response = GraphStatsResponse {
        node_count,
        relationship_count,
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// Round-trips a trivial query; always answers 200 and reports the outcome in the body.
pub async fn test_connection(State(state): State<AppState>) -> impl IntoResponse {
    let details = ConnectionDetails {
        uri: state.config.neo4j_uri.clone(),
        user: state.config.neo4j_user.clone(),
    };

    let response = match state.graph.execute("RETURN 1 AS test", &Properties::new()).await {
        Ok(_) => ConnectionTestResponse {
            status: "success".to_string(),
            message: "Successfully connected to Neo4j".to_string(),
            details,
        },
        Err(e) => {
            warn!(uri = %details.uri, "Neo4j connection test failed: {e}");
            ConnectionTestResponse {
                status: "error".to_string(),
                message: format!("Failed to connect to Neo4j: {e}"),
                details,
            }
        }
    };

    (StatusCode::OK, Json(response))
}
