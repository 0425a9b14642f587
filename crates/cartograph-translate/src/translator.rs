use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use cartograph_core::config::{AppConfig, TranslationMode};
use cartograph_core::intent::{Intent, PrimaryIntent};
use cartograph_core::language::LanguageService;
use cartograph_core::plan::{QueryPlan, Template};

use crate::catalog::TemplateCatalog;
use crate::classifier::IntentClassifier;
use crate::generator::QueryGenerator;

/// A template picked for an intent, with the label that explains the pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub label: String,
    pub template: &'a Template,
}

/// Turns free text into a query plan. Never fails: every failure of the
/// language service degrades the explanation, not the plan.
pub struct QueryTranslator {
    catalog: TemplateCatalog,
    classifier: IntentClassifier,
    generator: Option<QueryGenerator>,
}

impl QueryTranslator {
    pub fn new(service: Arc<dyn LanguageService>, config: &AppConfig) -> Self {
        let timeout = Duration::from_secs(config.classifier_timeout_secs);
        let generator = match config.translation_mode {
            TranslationMode::Templates => None,
            TranslationMode::Generate => Some(QueryGenerator::new(service.clone(), timeout)),
        };

        Self {
            catalog: TemplateCatalog::new(),
            classifier: IntentClassifier::new(service, timeout),
            generator,
        }
    }

    pub fn mode(&self) -> TranslationMode {
        if self.generator.is_some() {
            TranslationMode::Generate
        } else {
            TranslationMode::Templates
        }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Fixed precedence: enumerated primary intent, then resource type, then
    /// relationship type, then the general overview.
    pub fn resolve(&self, intent: &Intent) -> Resolution<'_> {
        if let Some(primary) = intent.primary_intent() {
            return Resolution {
                label: primary.as_str().to_string(),
                template: self.catalog.by_intent(primary.as_str()),
            };
        }
        if let Some(resource) = &intent.resource_type {
            return Resolution {
                label: format!("resource_type:{resource}"),
                template: self.catalog.by_resource_type(resource),
            };
        }
        if let Some(relationship) = &intent.relationship_type {
            return Resolution {
                label: format!("relationship_type:{relationship}"),
                template: self.catalog.by_relationship_type(relationship),
            };
        }
        Resolution {
            label: PrimaryIntent::GeneralResources.as_str().to_string(),
            template: self.catalog.default_template(),
        }
    }

    #[instrument(skip(self), fields(mode = %self.mode()))]
    pub async fn translate(&self, text: &str) -> QueryPlan {
        let Some(generator) = &self.generator else {
            return self.translate_with_templates(text).await;
        };

        match generator.generate(text).await {
            Ok(plan) => {
                info!(params = plan.parameters.len(), "Using generated query plan");
                plan
            }
            Err(e) => {
                warn!(error = %e, "Query generation failed, using template catalog");
                let mut plan = self.translate_with_templates(text).await;
                plan.explanation
                    .push_str(&format!(" Direct query generation failed ({e}); used template catalog."));
                plan
            }
        }
    }

    pub async fn translate_with_templates(&self, text: &str) -> QueryPlan {
        let classification = self.classifier.classify(text).await;
        let resolution = self.resolve(&classification.intent);

        let mut explanation = format!(
            "Query intent: {}. {}.",
            resolution.label, resolution.template.description
        );
        if let Some(reason) = &classification.fallback_reason {
            explanation.push_str(&format!(
                " Intent classification unavailable ({reason}); used keyword fallback."
            ));
        }

        info!(
            label = %resolution.label,
            fallback = classification.used_fallback(),
            "Resolved query template"
        );

        QueryPlan::from_template(resolution.template, explanation)
    }
}
