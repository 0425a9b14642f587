pub mod normalize;
pub mod store;

pub use normalize::ResultNormalizer;
pub use store::Neo4jGraphStore;
