//! Error types for maptrie

use thiserror::Error;

/// Result type alias for maptrie operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, committing or querying a topology
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed map input: {0}")]
    MalformedMap(String),

    #[error("Malformed furniture input: {0}")]
    MalformedFurniture(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Side index out of range: {0}")]
    InvalidSide(u8),

    #[error("Choice discriminant out of range: {0}")]
    InvalidChoiceType(u8),

    #[error("Object type {0} not configured")]
    UnknownObjectType(u16),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Structural error: {0}")]
    Structural(String),

    #[error("Corrupt leaf payload: {0}")]
    Corruption(String),

    #[error("The topology has not been committed")]
    NotCommitted,

    #[error("Cannot build a tree with no leaves")]
    EmptyTree,

    #[error("Proof index {index} out of range, tree has {leaves} leaves")]
    ProofIndex { index: usize, leaves: usize },
}
