use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use cartograph_core::error::{CartographError, Result};
use cartograph_core::intent::{
    Classification, Intent, PrimaryIntent, RelationshipType, ResourceType, UNSPECIFIED,
};
use cartograph_core::language::LanguageService;

use crate::heuristic::classify_by_keywords;
use crate::json::parse_embedded_json;

const SYSTEM_PROMPT: &str = "You are a cloud infrastructure query analyzer.";

/// Shape the language service is asked to answer with.
#[derive(Debug, Deserialize)]
struct ClassifierReply {
    #[serde(default)]
    intent: Option<String>,
    #[serde(default)]
    resource_type: Option<String>,
    #[serde(default)]
    relationship_type: Option<String>,
}

/// Treats empty strings and spelled-out nulls as absent.
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty() && v != "null" && v != "none")
}

impl From<ClassifierReply> for Intent {
    fn from(reply: ClassifierReply) -> Self {
        let resource_type = clean(reply.resource_type);
        let relationship_type = clean(reply.relationship_type);
        let primary = clean(reply.intent).unwrap_or_else(|| {
            if resource_type.is_some() || relationship_type.is_some() {
                UNSPECIFIED.to_string()
            } else {
                PrimaryIntent::GeneralResources.as_str().to_string()
            }
        });

        Intent {
            primary,
            resource_type,
            relationship_type,
        }
    }
}

/// Classifies free text through a language service, falling back to the
/// keyword heuristic on any failure.
pub struct IntentClassifier {
    service: Arc<dyn LanguageService>,
    timeout: Duration,
}

impl IntentClassifier {
    pub fn new(service: Arc<dyn LanguageService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    pub fn build_prompt(text: &str) -> String {
        let mut prompt = String::from(
            "Analyze the following cloud infrastructure query and determine its intent.\n\
             Choose the most appropriate intent from the following options:\n",
        );
        for intent in PrimaryIntent::ALL {
            prompt.push_str(&format!("- {}: {}\n", intent.as_str(), intent.hint()));
        }

        prompt.push_str("\nOr identify a specific resource type:\n");
        for resource in ResourceType::ALL {
            prompt.push_str(&format!("- {}: {}\n", resource.as_str(), resource.hint()));
        }

        prompt.push_str("\nOr identify a relationship type:\n");
        for relationship in RelationshipType::ALL {
            prompt.push_str(&format!(
                "- {}: {}\n",
                relationship.as_str(),
                relationship.hint()
            ));
        }

        prompt.push_str(&format!(
            "\nQuery: {text}\n\n\
             Return only a JSON object with the following structure:\n\
             {{\n  \
               \"intent\": \"<selected intent>\",\n  \
               \"resource_type\": \"<resource type if applicable, otherwise null>\",\n  \
               \"relationship_type\": \"<relationship type if applicable, otherwise null>\"\n\
             }}"
        ));

        prompt
    }

    /// Asks the language service; every failure is returned, never recovered.
    pub async fn try_classify(&self, text: &str) -> Result<Intent> {
        let prompt = Self::build_prompt(text);

        let reply = tokio::time::timeout(self.timeout, self.service.complete(SYSTEM_PROMPT, &prompt))
            .await
            .map_err(|_| {
                CartographError::ClassificationUnavailable(format!(
                    "language service timed out after {}s",
                    self.timeout.as_secs_f32()
                ))
            })??;

        let parsed: ClassifierReply = parse_embedded_json(&reply)?;
        let intent = Intent::from(parsed);

        debug!(
            primary = %intent.primary,
            resource_type = ?intent.resource_type,
            relationship_type = ?intent.relationship_type,
            "Language service classified query"
        );

        Ok(intent)
    }

    /// Always yields an intent; the heuristic stands in when the service path fails.
    pub async fn classify(&self, text: &str) -> Classification {
        match self.try_classify(text).await {
            Ok(intent) => Classification::from_service(intent),
            Err(e) => {
                warn!(error = %e, "Intent classification failed, using keyword fallback");
                Classification::from_fallback(classify_by_keywords(text), e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct Canned(std::result::Result<&'static str, &'static str>);

    #[async_trait]
    impl LanguageService for Canned {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
            match self.0 {
                Ok(reply) => Ok(reply.to_string()),
                Err(reason) => Err(CartographError::ClassificationUnavailable(reason.into())),
            }
        }
    }

    struct Stalled;

    #[async_trait]
    impl LanguageService for Stalled {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("{}".into())
        }
    }

    fn classifier(service: impl LanguageService + 'static) -> IntentClassifier {
        IntentClassifier::new(Arc::new(service), Duration::from_secs(5))
    }

    #[test]
    fn test_prompt_enumerates_every_key() {
        let prompt = IntentClassifier::build_prompt("list buckets");
        for intent in PrimaryIntent::ALL {
            assert!(prompt.contains(intent.as_str()));
        }
        for resource in ResourceType::ALL {
            assert!(prompt.contains(&format!("- {}:", resource.as_str())));
        }
        for relationship in RelationshipType::ALL {
            assert!(prompt.contains(relationship.as_str()));
        }
        assert!(prompt.contains("Query: list buckets"));
    }

    #[tokio::test]
    async fn test_service_answer_is_used() {
        let c = classifier(Canned(Ok(
            r#"{"intent": "ec2_to_s3_access", "resource_type": null, "relationship_type": null}"#,
        )));

        let result = c.classify("anything").await;

        assert!(!result.used_fallback());
        assert_eq!(result.intent, Intent::primary(PrimaryIntent::Ec2ToS3Access));
    }

    #[tokio::test]
    async fn test_reply_values_are_normalized() {
        let c = classifier(Canned(Ok(
            r#"{"intent": null, "resource_type": " S3 ", "relationship_type": "null"}"#,
        )));

        let intent = c.try_classify("buckets").await.unwrap();

        assert_eq!(intent.primary, UNSPECIFIED);
        assert_eq!(intent.resource_type.as_deref(), Some("s3"));
        assert_eq!(intent.relationship_type, None);
    }

    #[tokio::test]
    async fn test_missing_intent_without_scope_is_general() {
        let c = classifier(Canned(Ok("{}")));
        let intent = c.try_classify("hello").await.unwrap();
        assert_eq!(intent, Intent::general());
    }

    #[tokio::test]
    async fn test_embedded_json_is_recovered() {
        let c = classifier(Canned(Ok(
            "The intent is:\n{\"intent\": \"vpc_resources\"}\nHope this helps.",
        )));
        let result = c.classify("vpc").await;
        assert!(!result.used_fallback());
        assert_eq!(result.intent.primary, "vpc_resources");
    }

    #[tokio::test]
    async fn test_unavailable_service_falls_back() {
        let c = classifier(Canned(Err("connection refused")));

        let result = c.classify("Show me all EC2 instances in my AWS account").await;

        assert_eq!(result.intent, Intent::resource(ResourceType::Ec2));
        assert!(result
            .fallback_reason
            .as_deref()
            .unwrap()
            .contains("connection refused"));
    }

    #[tokio::test]
    async fn test_malformed_reply_falls_back() {
        let c = classifier(Canned(Ok("I think you want VPCs.")));

        let err = c.try_classify("my vpcs").await.unwrap_err();
        assert!(matches!(err, CartographError::MalformedClassifierResponse(_)));

        let result = c.classify("my vpcs").await;
        assert!(result.used_fallback());
        assert_eq!(result.intent, Intent::primary(PrimaryIntent::VpcResources));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let c = IntentClassifier::new(Arc::new(Stalled), Duration::from_secs(1));

        let result = c.classify("list iam roles").await;

        assert!(result.fallback_reason.unwrap().contains("timed out"));
        assert_eq!(result.intent, Intent::resource(ResourceType::Iam));
    }
}
