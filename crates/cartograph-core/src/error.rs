use thiserror::Error;

#[derive(Error, Debug)]
pub enum CartographError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Classification unavailable: {0}")]
    ClassificationUnavailable(String),

    #[error("Malformed classifier response: {0}")]
    MalformedClassifierResponse(String),

    #[error("Malformed result entity: {0}")]
    MalformedResultEntity(String),

    #[error("Graph database error: {0}")]
    Graph(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CartographError>;
