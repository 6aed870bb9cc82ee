//! Error types for the anamnesis navigation engine
//!
//! This module provides structured error handling using thiserror for
//! error definitions and anyhow for error propagation at the edges.

use thiserror::Error;

/// Main error type for navigation operations
#[derive(Error, Debug)]
pub enum AnamnesisError {
    /// Strategy configuration is unusable at construction time
    /// (e.g. a composite generator with zero children)
    #[error("Invalid strategy configuration: {0}")]
    InvalidStrategyConfig(String),

    /// A data-access collaborator (course or user store) failed
    #[error("Store error: {0}")]
    Store(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No strategy document with the requested id
    #[error("Strategy not found: {0}")]
    StrategyNotFound(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for navigation operations
pub type Result<T> = std::result::Result<T, AnamnesisError>;

/// Convert anyhow::Error to AnamnesisError
impl From<anyhow::Error> for AnamnesisError {
    fn from(err: anyhow::Error) -> Self {
        AnamnesisError::Other(err.to_string())
    }
}
