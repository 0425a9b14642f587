pub mod api_types;
pub mod config;
pub mod error;
pub mod graph;
pub mod intent;
pub mod language;
pub mod plan;

pub use config::{AppConfig, TranslationMode};
pub use error::{CartographError, Result};
pub use graph::{
    GraphData, GraphNode, GraphPath, GraphRelationship, GraphStore, Properties, ResultRecord,
    ResultValue,
};
pub use intent::{Classification, Intent, PrimaryIntent, RelationshipType, ResourceType};
pub use language::LanguageService;
pub use plan::{QueryPlan, Template};
