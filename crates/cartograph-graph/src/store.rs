use async_trait::async_trait;
use neo4rs::{
    query, BoltMap, BoltString, BoltType, Graph, Node, Path, Query, Relation, Row,
    UnboundedRelation,
};
use std::future::Future;

use cartograph_core::config::AppConfig;
use cartograph_core::error::{CartographError, Result};
use cartograph_core::graph::{
    GraphNode, GraphPath, GraphRelationship, GraphStore, Properties, ResultRecord, ResultValue,
};

/// Timeout for all Neo4j operations (seconds).
const NEO4J_TIMEOUT_SECS: u64 = 5;

pub struct Neo4jGraphStore {
    graph: Option<Graph>,
}

impl Neo4jGraphStore {
    pub async fn new(config: &AppConfig) -> Self {
        let graph = match timed(Graph::new(
            &config.neo4j_uri,
            &config.neo4j_user,
            &config.neo4j_password,
        ))
        .await
        {
            Ok(Ok(graph)) => {
                tracing::info!(uri = %config.neo4j_uri, "Connected to Neo4j");
                Some(graph)
            }
            Ok(Err(e)) => {
                tracing::warn!(uri = %config.neo4j_uri, error = %e, "Failed to connect to Neo4j, running in degraded mode");
                None
            }
            Err(e) => {
                tracing::warn!(uri = %config.neo4j_uri, error = %e, "Failed to connect to Neo4j, running in degraded mode");
                None
            }
        };

        Self { graph }
    }

    fn graph(&self) -> Result<&Graph> {
        self.graph
            .as_ref()
            .ok_or_else(|| CartographError::Graph("Neo4j not connected".into()))
    }

    async fn count(&self, cypher: &str, what: &str) -> Result<u64> {
        let mut stream = timed(self.graph()?.execute(query(cypher)))
            .await?
            .map_err(|e| CartographError::Graph(format!("Failed to count {what}: {e}")))?;

        match stream.next().await {
            Ok(Some(row)) => {
                let count: i64 = row
                    .get("cnt")
                    .map_err(|e| CartographError::Graph(format!("Failed to get count: {e}")))?;
                Ok(count.max(0) as u64)
            }
            Ok(None) => Ok(0),
            Err(e) => Err(CartographError::Graph(format!("Error counting {what}: {e}"))),
        }
    }
}

/// Wrap any async operation with a timeout, converting timeout to CartographError::Graph.
async fn timed<T, F: Future<Output = T>>(op: F) -> std::result::Result<T, CartographError> {
    tokio::time::timeout(std::time::Duration::from_secs(NEO4J_TIMEOUT_SECS), op)
        .await
        .map_err(|_| {
            tracing::warn!("Neo4j operation timed out after {}s", NEO4J_TIMEOUT_SECS);
            CartographError::Graph(format!(
                "Neo4j operation timed out after {}s",
                NEO4J_TIMEOUT_SECS
            ))
        })
}

/// JSON parameter to Bolt. Null binds as an empty string; arrays and objects
/// bind as their JSON text.
fn bolt_value(value: &serde_json::Value) -> BoltType {
    match value {
        serde_json::Value::String(s) => s.clone().into(),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.into()
            } else if let Some(f) = n.as_f64() {
                f.into()
            } else {
                n.to_string().into()
            }
        }
        serde_json::Value::Bool(b) => (*b).into(),
        serde_json::Value::Null => "".into(),
        _ => value.to_string().into(),
    }
}

fn bind_params(mut q: Query, params: &Properties) -> Query {
    for (key, value) in params {
        q = q.param(&key[..], bolt_value(value));
    }
    q
}

/// Node, relationship and path segment types share no trait, only the
/// `keys`/`get` shape.
fn collect_properties<F>(keys: Vec<&str>, get: F) -> Properties
where
    F: Fn(&str) -> Option<serde_json::Value>,
{
    keys.into_iter()
        .filter_map(|key| get(key).map(|value| (key.to_string(), value)))
        .collect()
}

fn convert_node(node: &Node) -> GraphNode {
    GraphNode {
        id: node.id().to_string(),
        labels: node.labels().iter().map(|l| l.to_string()).collect(),
        properties: collect_properties(node.keys(), |k| node.get(k).ok()),
    }
}

fn convert_relation(rel: &Relation) -> GraphRelationship {
    GraphRelationship {
        id: rel.id().to_string(),
        rel_type: rel.typ().to_string(),
        start_node: rel.start_node_id().to_string(),
        end_node: rel.end_node_id().to_string(),
        properties: collect_properties(rel.keys(), |k| rel.get(k).ok()),
    }
}

fn segment_properties(rel: &UnboundedRelation) -> Properties {
    collect_properties(rel.keys(), |k| rel.get(k).ok())
}

/// Walks a Bolt path. Path segments carry no endpoint ids; `indices` holds
/// `(relationship, node)` pairs where the relationship index is 1-based and
/// negative when the segment is traversed against the relationship's
/// direction, and the node index points into the (deduplicated) node list.
fn convert_path(path: &Path) -> Result<GraphPath> {
    let nodes: Vec<GraphNode> = path.nodes().iter().map(convert_node).collect();
    let rels = path.rels();
    let indices = path.indices();

    let malformed =
        |msg: String| CartographError::MalformedResultEntity(format!("path: {msg}"));

    let Some(first) = nodes.first() else {
        return Ok(GraphPath::default());
    };
    if indices.len() % 2 != 0 {
        return Err(malformed(format!("odd number of indices ({})", indices.len())));
    }

    let mut walked = vec![first.clone()];
    let mut relationships = Vec::with_capacity(indices.len() / 2);
    let mut previous = first;

    for pair in indices.chunks_exact(2) {
        let (rel_index, node_index) = (pair[0], pair[1]);

        let rel = usize::try_from(rel_index.unsigned_abs())
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| rels.get(i))
            .ok_or_else(|| malformed(format!("relationship index {rel_index} out of range")))?;
        let next = usize::try_from(node_index)
            .ok()
            .and_then(|i| nodes.get(i))
            .ok_or_else(|| malformed(format!("node index {node_index} out of range")))?;

        let (start, end) = if rel_index > 0 {
            (previous, next)
        } else {
            (next, previous)
        };

        relationships.push(GraphRelationship {
            id: rel.id().to_string(),
            rel_type: rel.typ().to_string(),
            start_node: start.id.clone(),
            end_node: end.id.clone(),
            properties: segment_properties(rel),
        });
        walked.push(next.clone());
        previous = next;
    }

    Ok(GraphPath {
        nodes: walked,
        relationships,
    })
}

/// Maps each column by its Bolt kind. Columns come back sorted by name since
/// the row itself keeps no order.
fn convert_row(row: &Row) -> Result<ResultRecord> {
    let columns = row
        .to_strict::<BoltMap>()
        .map_err(|e| CartographError::Graph(format!("Failed to decode result row: {e}")))?;

    let mut entries: Vec<(&BoltString, &BoltType)> = columns.value.iter().collect();
    entries.sort_by(|a, b| a.0.value.cmp(&b.0.value));

    let mut record = ResultRecord::new();
    for (key, value) in entries {
        let column = key.value.as_str();
        let converted = match value {
            BoltType::Path(path) => ResultValue::Path(
                convert_path(&Path::new(path.clone())).map_err(|e| match e {
                    CartographError::MalformedResultEntity(msg) => {
                        CartographError::MalformedResultEntity(format!("column '{column}': {msg}"))
                    }
                    other => other,
                })?,
            ),
            BoltType::Node(node) => ResultValue::Node(convert_node(&Node::new(node.clone()))),
            BoltType::Relation(rel) => {
                ResultValue::Relationship(convert_relation(&Relation::new(rel.clone())))
            }
            _ => ResultValue::Scalar(
                row.get::<serde_json::Value>(column)
                    .unwrap_or(serde_json::Value::Null),
            ),
        };
        record.push(column, converted);
    }

    Ok(record)
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn execute(&self, cypher: &str, params: &Properties) -> Result<Vec<ResultRecord>> {
        let q = bind_params(query(cypher), params);

        let mut stream = timed(self.graph()?.execute(q))
            .await?
            .map_err(|e| CartographError::Graph(format!("Failed to execute cypher: {e}")))?;

        let mut records = Vec::new();
        loop {
            match stream.next().await {
                Ok(Some(row)) => records.push(convert_row(&row)?),
                Ok(None) => break,
                Err(e) => {
                    return Err(CartographError::Graph(format!(
                        "Failed to read result row: {e}"
                    )))
                }
            }
        }

        tracing::debug!(
            cypher = %cypher,
            rows = records.len(),
            "Executed Cypher query"
        );

        Ok(records)
    }

    async fn node_count(&self) -> Result<u64> {
        self.count("MATCH (n) RETURN count(n) AS cnt", "nodes").await
    }

    async fn relationship_count(&self) -> Result<u64> {
        self.count("MATCH ()-[r]->() RETURN count(r) AS cnt", "relationships")
            .await
    }

    fn is_connected(&self) -> bool {
        self.graph.is_some()
    }
}

#[cfg(test)]
mod tests {
    use neo4rs::{BoltList, BoltNode, BoltPath, BoltRelation, BoltUnboundedRelation};

    use super::*;

    fn bolt_node(id: i64, label: &str, name: &str) -> BoltNode {
        BoltNode::new(
            id.into(),
            vec![BoltType::from(label)].into(),
            [(BoltString::from("name"), BoltType::from(name))]
                .into_iter()
                .collect(),
        )
    }

    fn segment(id: i64, typ: &str) -> BoltUnboundedRelation {
        BoltUnboundedRelation::new(id.into(), typ.into(), BoltMap::new())
    }

    fn bolt_path(nodes: Vec<BoltNode>, rels: Vec<BoltUnboundedRelation>, indices: &[i64]) -> BoltPath {
        BoltPath {
            nodes: nodes.into_iter().map(BoltType::from).collect::<Vec<_>>().into(),
            rels: rels.into_iter().map(BoltType::from).collect::<Vec<_>>().into(),
            indices: indices.iter().map(|i| BoltType::from(*i)).collect::<Vec<_>>().into(),
        }
    }

    fn endpoints(rel: &GraphRelationship) -> (&str, &str) {
        (rel.start_node.as_str(), rel.end_node.as_str())
    }

    #[test]
    fn test_forward_path_keeps_direction() {
        // (ec2:1)-[:BELONGS_TO]->(vpc:2)
        let path = bolt_path(
            vec![bolt_node(1, "EC2Instance", "web"), bolt_node(2, "VPC", "main")],
            vec![segment(10, "BELONGS_TO")],
            &[1, 1],
        );

        let converted = convert_path(&Path::new(path)).unwrap();

        assert_eq!(converted.nodes.len(), 2);
        assert_eq!(converted.relationships.len(), 1);
        assert_eq!(endpoints(&converted.relationships[0]), ("1", "2"));
        assert_eq!(converted.relationships[0].rel_type, "BELONGS_TO");
    }

    #[test]
    fn test_reversed_segment_points_back() {
        // MATCH path = (vpc:VPC)<-[:BELONGS_TO]-(resource)
        let path = bolt_path(
            vec![bolt_node(1, "VPC", "main"), bolt_node(2, "EC2Instance", "web")],
            vec![segment(10, "BELONGS_TO")],
            &[-1, 1],
        );

        let converted = convert_path(&Path::new(path)).unwrap();

        assert_eq!(endpoints(&converted.relationships[0]), ("2", "1"));
        assert_eq!(converted.nodes[0].primary_label(), Some("VPC"));
    }

    #[test]
    fn test_path_revisiting_a_node_uses_node_indices() {
        // (1)-[:ASSUMES]->(2)-[:HAS_ACCESS_TO]->(1); Bolt sends node 1 only once.
        let path = bolt_path(
            vec![bolt_node(1, "EC2Instance", "a"), bolt_node(2, "IAMRole", "b")],
            vec![segment(10, "ASSUMES"), segment(11, "HAS_ACCESS_TO")],
            &[1, 1, 2, 0],
        );

        let converted = convert_path(&Path::new(path)).unwrap();

        let walked: Vec<&str> = converted.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(walked, vec!["1", "2", "1"]);
        assert_eq!(endpoints(&converted.relationships[0]), ("1", "2"));
        assert_eq!(endpoints(&converted.relationships[1]), ("2", "1"));
        assert_eq!(converted.relationships[1].id, "11");
    }

    #[test]
    fn test_out_of_range_index_is_malformed() {
        let path = bolt_path(
            vec![bolt_node(1, "VPC", "main")],
            vec![segment(10, "BELONGS_TO")],
            &[1, 5],
        );

        let err = convert_path(&Path::new(path)).unwrap_err();
        assert!(matches!(err, CartographError::MalformedResultEntity(_)));
    }

    #[test]
    fn test_row_columns_map_to_variants() {
        let instance = bolt_node(1, "EC2Instance", "web");
        let role = bolt_node(2, "IAMRole", "reader");
        let assumes = BoltRelation {
            id: 10.into(),
            start_node_id: 1.into(),
            end_node_id: 2.into(),
            typ: "ASSUMES".into(),
            properties: BoltMap::new(),
        };
        let path = bolt_path(
            vec![instance.clone(), role.clone()],
            vec![segment(10, "ASSUMES")],
            &[1, 1],
        );

        let fields: BoltList = vec![
            BoltType::from("i"),
            BoltType::from("r"),
            BoltType::from("path"),
            BoltType::from("total"),
        ]
        .into();
        let data: BoltList = vec![
            BoltType::Node(instance),
            BoltType::Relation(assumes),
            BoltType::Path(path),
            BoltType::from(3_i64),
        ]
        .into();

        let record = convert_row(&Row::new(fields, data)).unwrap();

        let columns: Vec<&str> = record.columns.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(columns, vec!["i", "path", "r", "total"]);

        match record.get("i") {
            Some(ResultValue::Node(node)) => {
                assert_eq!(node.id, "1");
                assert_eq!(node.labels, vec!["EC2Instance".to_string()]);
                assert_eq!(node.properties["name"], "web");
            }
            other => panic!("expected node, got {other:?}"),
        }
        match record.get("r") {
            Some(ResultValue::Relationship(rel)) => {
                assert_eq!(endpoints(rel), ("1", "2"));
                assert_eq!(rel.rel_type, "ASSUMES");
            }
            other => panic!("expected relationship, got {other:?}"),
        }
        match record.get("path") {
            Some(ResultValue::Path(path)) => {
                assert_eq!(path.nodes.len(), 2);
                assert_eq!(endpoints(&path.relationships[0]), ("1", "2"));
            }
            other => panic!("expected path, got {other:?}"),
        }
        assert_eq!(
            record.get("total"),
            Some(&ResultValue::Scalar(serde_json::json!(3)))
        );
    }

    #[test]
    fn test_json_params_bind_as_bolt() {
        assert_eq!(bolt_value(&serde_json::json!("logs")), BoltType::from("logs"));
        assert_eq!(bolt_value(&serde_json::json!(7)), BoltType::from(7_i64));
        assert_eq!(bolt_value(&serde_json::json!(0.5)), BoltType::from(0.5_f64));
        assert_eq!(bolt_value(&serde_json::json!(true)), BoltType::from(true));
        assert_eq!(bolt_value(&serde_json::Value::Null), BoltType::from(""));
        assert_eq!(bolt_value(&serde_json::json!(["a"])), BoltType::from(r#"["a"]"#));

        let mut params = Properties::new();
        params.insert("name".into(), serde_json::json!("logs"));
        params.insert("region".into(), serde_json::Value::Null);
        let q = bind_params(query("MATCH (b:S3Bucket {name: $name}) RETURN b"), &params);
        assert!(q.has_param_key("name"));
        assert!(q.has_param_key("region"));
    }

    #[tokio::test]
    async fn test_unreachable_database_fails_queries() {
        let config = AppConfig {
            neo4j_uri: "bolt://127.0.0.1:1".into(),
            ..AppConfig::default()
        };
        let store = Neo4jGraphStore::new(&config).await;

        let err = store.execute("RETURN 1", &Properties::new()).await.unwrap_err();
        assert!(matches!(err, CartographError::Graph(_)));
        assert!(store.node_count().await.is_err());
    }
}
