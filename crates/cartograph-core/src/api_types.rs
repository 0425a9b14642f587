use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TranslationMode;
use crate::graph::{GraphData, Properties};
use crate::plan::QueryPlan;

// --- Health ---

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub neo4j_connected: bool,
    pub classifier_configured: bool,
    pub translation_mode: TranslationMode,
}

// --- Queries ---

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryRequest {
    pub natural_language_query: String,
    #[serde(default)]
    pub include_query_details: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query_id: Uuid,
    pub graph_data: GraphData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_details: Option<QueryPlan>,
    pub executed_at: DateTime<Utc>,
}

// --- Graph ---

#[derive(Debug, Serialize, Deserialize)]
pub struct GraphQueryRequest {
    pub cypher: String,
    #[serde(default)]
    pub params: Properties,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GraphStatsResponse {
    pub node_count: u64,
    pub relationship_count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectionDetails {
    pub uri: String,
    pub user: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectionTestResponse {
    pub status: String,
    pub message: String,
    pub details: ConnectionDetails,
}
