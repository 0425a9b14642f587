use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CartographError, Result};

/// How free text is turned into a query plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TranslationMode {
    /// Classify intent, then pick a template from the catalog.
    #[default]
    Templates,
    /// Ask the language service to write the query directly.
    Generate,
}

impl TranslationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationMode::Templates => "templates",
            TranslationMode::Generate => "generate",
        }
    }
}

impl fmt::Display for TranslationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranslationMode {
    type Err = CartographError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "templates" | "template" => Ok(TranslationMode::Templates),
            "generate" | "generation" => Ok(TranslationMode::Generate),
            other => Err(CartographError::Config(format!(
                "unknown translation mode '{other}', expected 'templates' or 'generate'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub anthropic_api_key: String,
    pub anthropic_model: String,
    pub classifier_timeout_secs: u64,
    pub translation_mode: TranslationMode,
    pub server_host: String,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            neo4j_uri: "bolt://localhost:7687".into(),
            neo4j_user: "neo4j".into(),
            neo4j_password: "password".into(),
            anthropic_api_key: String::new(),
            anthropic_model: "claude-haiku-4-5-20251001".into(),
            classifier_timeout_secs: 10,
            translation_mode: TranslationMode::Templates,
            server_host: "0.0.0.0".into(),
            server_port: 8000,
        }
    }
}

impl AppConfig {
    /// Reads the configuration from the environment.
    ///
    /// Unset variables take their defaults. An unparsable `TRANSLATION_MODE`
    /// is an error; unparsable numbers fall back to the default with a warning.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let translation_mode = match lookup("TRANSLATION_MODE") {
            Some(raw) => raw.parse()?,
            None => defaults.translation_mode,
        };

        let config = Self {
            neo4j_uri: lookup("NEO4J_URI").unwrap_or(defaults.neo4j_uri),
            neo4j_user: lookup("NEO4J_USER").unwrap_or(defaults.neo4j_user),
            neo4j_password: lookup("NEO4J_PASSWORD").unwrap_or(defaults.neo4j_password),
            anthropic_api_key: lookup("ANTHROPIC_API_KEY").unwrap_or_default(),
            anthropic_model: lookup("ANTHROPIC_MODEL").unwrap_or(defaults.anthropic_model),
            classifier_timeout_secs: parse_or_default(
                "CLASSIFIER_TIMEOUT_SECS",
                lookup("CLASSIFIER_TIMEOUT_SECS"),
                defaults.classifier_timeout_secs,
            ),
            translation_mode,
            server_host: lookup("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_or_default(
                "SERVER_PORT",
                lookup("SERVER_PORT"),
                defaults.server_port,
            ),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.classifier_timeout_secs == 0 {
            return Err(CartographError::Config(
                "CLASSIFIER_TIMEOUT_SECS must be greater than zero".into(),
            ));
        }
        if self.translation_mode == TranslationMode::Generate && !self.classifier_configured() {
            tracing::warn!(
                "TRANSLATION_MODE=generate without ANTHROPIC_API_KEY; every request will use the template catalog"
            );
        }
        Ok(())
    }

    pub fn classifier_configured(&self) -> bool {
        !self.anthropic_api_key.trim().is_empty()
    }
}

fn parse_or_default<T: FromStr + Copy + fmt::Display>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %value, default = %default, "Invalid value, using default");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.neo4j_uri, "bolt://localhost:7687");
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.classifier_timeout_secs, 10);
        assert_eq!(config.translation_mode, TranslationMode::Templates);
        assert!(!config.classifier_configured());
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("NEO4J_URI", "bolt://neo4j:7687"),
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("SERVER_PORT", "9090"),
            ("TRANSLATION_MODE", "Generate"),
        ]))
        .unwrap();
        assert_eq!(config.neo4j_uri, "bolt://neo4j:7687");
        assert_eq!(config.server_port, 9090);
        assert_eq!(config.translation_mode, TranslationMode::Generate);
        assert!(config.classifier_configured());
    }

    #[test]
    fn test_invalid_port_falls_back_to_default() {
        let config = AppConfig::from_lookup(lookup_from(&[("SERVER_PORT", "not-a-port")])).unwrap();
        assert_eq!(config.server_port, 8000);
    }

    #[test]
    fn test_unknown_translation_mode_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("TRANSLATION_MODE", "magic")])).unwrap_err();
        assert!(matches!(err, CartographError::Config(_)));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err =
            AppConfig::from_lookup(lookup_from(&[("CLASSIFIER_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, CartographError::Config(_)));
    }
}
