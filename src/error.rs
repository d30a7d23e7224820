use thiserror::Error;

use crate::relation::RelationId;

/// Errors raised by a relation's outbound store.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("relation unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("metrics endpoint {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },
    #[error("relation {relation}: {source}")]
    Transport {
        relation: RelationId,
        #[source]
        source: TransportError,
    },
    #[error("flag {flag}: {source}")]
    Flag {
        flag: String,
        #[source]
        source: std::io::Error,
    },
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
