use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub type Properties = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    pub id: String,
    /// The first label is the primary display type.
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: Properties,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, labels: &[&str]) -> Self {
        Self {
            id: id.into(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            properties: Properties::new(),
        }
    }

    pub fn with_property(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn primary_label(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphRelationship {
    pub id: String,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub start_node: String,
    pub end_node: String,
    #[serde(default)]
    pub properties: Properties,
}

impl GraphRelationship {
    pub fn new(
        id: impl Into<String>,
        rel_type: impl Into<String>,
        start_node: impl Into<String>,
        end_node: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            rel_type: rel_type.into(),
            start_node: start_node.into(),
            end_node: end_node.into(),
            properties: Properties::new(),
        }
    }
}

/// Nodes and the relationships connecting them, in traversal order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GraphPath {
    pub nodes: Vec<GraphNode>,
    pub relationships: Vec<GraphRelationship>,
}

/// One column value of a query result row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResultValue {
    Node(GraphNode),
    Relationship(GraphRelationship),
    Path(GraphPath),
    Scalar(serde_json::Value),
}

/// An ordered row of `(column, value)` pairs as returned by the graph engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ResultRecord {
    pub columns: Vec<(String, ResultValue)>,
}

impl ResultRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: ResultValue) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: ResultValue) {
        self.columns.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&ResultValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn values(&self) -> impl Iterator<Item = &ResultValue> {
        self.columns.iter().map(|(_, value)| value)
    }
}

/// The canonical, deduplicated graph handed to renderers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub relationships: Vec<GraphRelationship>,
}

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Runs a query and returns its rows in engine order.
    async fn execute(&self, query: &str, params: &Properties) -> Result<Vec<ResultRecord>>;
    async fn node_count(&self) -> Result<u64>;
    async fn relationship_count(&self) -> Result<u64>;
    fn is_connected(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_serializes_type_field() {
        let rel = GraphRelationship::new("10", "HAS_ACCESS_TO", "1", "2");
        let json = serde_json::to_value(&rel).unwrap();
        assert_eq!(json["type"], "HAS_ACCESS_TO");
        assert_eq!(json["start_node"], "1");
        assert_eq!(json["end_node"], "2");
    }

    #[test]
    fn test_result_value_tagging() {
        let value = ResultValue::Scalar(serde_json::json!(3));
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "scalar", "value": 3}));

        let node: ResultValue = serde_json::from_value(serde_json::json!({
            "kind": "node",
            "value": {"id": "1", "labels": ["EC2Instance"]}
        }))
        .unwrap();
        match node {
            ResultValue::Node(n) => {
                assert_eq!(n.primary_label(), Some("EC2Instance"));
                assert!(n.properties.is_empty());
            }
            other => panic!("expected node, got {other:?}"),
        }
    }

    #[test]
    fn test_record_lookup_by_column() {
        let record = ResultRecord::new()
            .with("n", ResultValue::Node(GraphNode::new("1", &["VPC"])))
            .with("count", ResultValue::Scalar(serde_json::json!(4)));
        assert!(matches!(record.get("n"), Some(ResultValue::Node(_))));
        assert_eq!(record.values().count(), 2);
        assert!(record.get("missing").is_none());
    }
}
