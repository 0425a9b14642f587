use std::collections::HashSet;

use cartograph_core::error::{CartographError, Result};
use cartograph_core::graph::{GraphData, GraphNode, GraphPath, GraphRelationship, ResultRecord, ResultValue};

/// Flattens raw query rows into a deduplicated node/relationship graph.
///
/// The first occurrence of an id wins; later entities with the same id are
/// dropped without merging their properties. Relationship endpoints are kept
/// as given even when the endpoint node never appears in the rows. A node
/// needs an id and at least one label.
pub struct ResultNormalizer;

impl ResultNormalizer {
    pub fn normalize(records: &[ResultRecord]) -> Result<GraphData> {
        let mut acc = Accumulator::default();

        for record in records {
            for (column, value) in &record.columns {
                acc.visit(value).map_err(|e| match e {
                    CartographError::MalformedResultEntity(msg) => {
                        CartographError::MalformedResultEntity(format!("column '{column}': {msg}"))
                    }
                    other => other,
                })?;
            }
        }

        tracing::debug!(
            records = records.len(),
            nodes = acc.graph.nodes.len(),
            relationships = acc.graph.relationships.len(),
            "Normalized query result"
        );

        Ok(acc.graph)
    }
}

#[derive(Default)]
struct Accumulator {
    graph: GraphData,
    seen_nodes: HashSet<String>,
    seen_relationships: HashSet<String>,
}

impl Accumulator {
    fn visit(&mut self, value: &ResultValue) -> Result<()> {
        match value {
            ResultValue::Path(path) => self.add_path(path),
            ResultValue::Node(node) => self.add_node(node),
            ResultValue::Relationship(rel) => self.add_relationship(rel),
            ResultValue::Scalar(_) => Ok(()),
        }
    }

    fn add_path(&mut self, path: &GraphPath) -> Result<()> {
        for node in &path.nodes {
            self.add_node(node)?;
        }
        for rel in &path.relationships {
            self.add_relationship(rel)?;
        }
        Ok(())
    }

    fn add_node(&mut self, node: &GraphNode) -> Result<()> {
        if node.id.trim().is_empty() {
            return Err(CartographError::MalformedResultEntity(format!(
                "node with labels {:?} has no id",
                node.labels
            )));
        }
        if node.primary_label().is_none() {
            return Err(CartographError::MalformedResultEntity(format!(
                "node {} has no labels",
                node.id
            )));
        }
        if self.seen_nodes.insert(node.id.clone()) {
            self.graph.nodes.push(node.clone());
        }
        Ok(())
    }

    fn add_relationship(&mut self, rel: &GraphRelationship) -> Result<()> {
        if rel.id.trim().is_empty() {
            return Err(CartographError::MalformedResultEntity(format!(
                "{} relationship has no id",
                rel.rel_type
            )));
        }
        if rel.start_node.trim().is_empty() || rel.end_node.trim().is_empty() {
            return Err(CartographError::MalformedResultEntity(format!(
                "relationship {} ({}) has an unresolvable endpoint",
                rel.id, rel.rel_type
            )));
        }
        if self.seen_relationships.insert(rel.id.clone()) {
            self.graph.relationships.push(rel.clone());
        }
        Ok(())
    }
}
