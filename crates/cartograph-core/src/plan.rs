use serde::{Deserialize, Serialize};

/// A static query with a human-readable description.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Template {
    pub query_text: &'static str,
    pub description: &'static str,
}

/// The translator's output: what to run, with what, and why.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryPlan {
    #[serde(rename = "cypher_query")]
    pub query: String,
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub explanation: String,
}

impl QueryPlan {
    pub fn from_template(template: &Template, explanation: String) -> Self {
        Self {
            query: template.query_text.to_string(),
            parameters: serde_json::Map::new(),
            explanation,
        }
    }
}
