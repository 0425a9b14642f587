use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        // Health
        .route("/api/health", get(handlers::health::health_check))
        // Queries
        .route("/api/v1/queries", post(handlers::queries::process_query))
        .route("/api/v1/queries/translate", post(handlers::queries::translate_query))
        // Graph
        .route("/api/v1/graph/query", post(handlers::graph::query_graph))
        .route("/api/v1/graph/stats", get(handlers::graph::graph_stats))
        .route("/api/v1/neo4j/test-connection", get(handlers::graph::test_connection))
}
