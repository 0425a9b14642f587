pub mod anthropic;
pub mod catalog;
pub mod classifier;
pub mod generator;
pub mod heuristic;
pub mod json;
pub mod translator;

pub use anthropic::AnthropicClient;
pub use catalog::TemplateCatalog;
pub use classifier::IntentClassifier;
pub use generator::QueryGenerator;
pub use heuristic::classify_by_keywords;
pub use translator::{QueryTranslator, Resolution};
