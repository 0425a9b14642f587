use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use cartograph_core::error::{CartographError, Result};
use cartograph_core::language::LanguageService;
use cartograph_core::plan::QueryPlan;

use crate::json::parse_embedded_json;

// ---------------------------------------------------------------------------
// Graph schema context used in the generation prompt
// ---------------------------------------------------------------------------

const GRAPH_SCHEMA: &str = r#"
Node labels and notable properties:
  - EC2Instance { id, name, type, state, public_ip, private_ip, vpc_id }
  - S3Bucket { name, region, created, public }
  - SecurityGroup { id, name, description, vpc_id }
  - VPC { id, cidr_block, is_default }
  - Subnet { id, cidr_block, availability_zone }
  - IAMRole { arn, name, path }
  - AWSAccount { id, name }

Relationship types:
  (EC2Instance)-[:HAS_ACCESS_TO]->(S3Bucket)
  (IAMRole)-[:HAS_ACCESS_TO]->(S3Bucket)
  (EC2Instance|SecurityGroup|Subnet)-[:BELONGS_TO]->(VPC)
  (EC2Instance)-[:LOCATED_IN]->(Subnet)
  (EC2Instance)-[:ASSUMES]->(IAMRole)
  (EC2Instance)-[:PROTECTED_BY]->(SecurityGroup)
  (AWSAccount)-[:RESOURCE]->(any)
"#;

const SYSTEM_PROMPT: &str = "You are an expert Neo4j Cypher query writer for a cloud infrastructure graph.";

/// Writes a query plan directly from free text, without the template catalog.
pub struct QueryGenerator {
    service: Arc<dyn LanguageService>,
    timeout: Duration,
}

impl QueryGenerator {
    pub fn new(service: Arc<dyn LanguageService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    fn build_prompt(text: &str) -> String {
        format!(
            "Translate the question below into a single read-only Cypher query against this graph.\n\
             {GRAPH_SCHEMA}\n\
             Return nodes, relationships or paths rather than bare properties so the result can be \
             drawn as a graph, and bound the result with LIMIT 25 unless the question asks for more.\n\
             Use $parameters for literal values taken from the question.\n\n\
             Question: {text}\n\n\
             Return only a JSON object with the following structure:\n\
             {{\"cypher_query\": \"<query>\", \"parameters\": {{}}, \"explanation\": \"<one sentence>\"}}"
        )
    }

    pub async fn generate(&self, text: &str) -> Result<QueryPlan> {
        let prompt = Self::build_prompt(text);

        let reply = tokio::time::timeout(self.timeout, self.service.complete(SYSTEM_PROMPT, &prompt))
            .await
            .map_err(|_| {
                CartographError::ClassificationUnavailable(format!(
                    "language service timed out after {}s",
                    self.timeout.as_secs_f32()
                ))
            })??;

        let mut plan: QueryPlan = parse_embedded_json(&reply)?;
        plan.query = plan.query.trim().to_string();

        if plan.query.is_empty() {
            return Err(CartographError::MalformedClassifierResponse(
                "generated plan has an empty query".into(),
            ));
        }

        debug!(cypher = %plan.query, params = plan.parameters.len(), "Generated query plan");

        Ok(plan)
    }
}
