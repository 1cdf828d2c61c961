//! Error types for ensemble-core

use thiserror::Error;

/// Core orchestration error type
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid run configuration (missing manager, unknown agent, ...)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Routing failed beyond local recovery
    #[error("routing error: {0}")]
    Routing(String),

    /// Agent turn execution failed
    #[error("turn error for agent '{agent}': {message}")]
    Turn {
        /// Agent whose turn failed
        agent: String,
        /// Underlying failure description
        message: String,
    },

    /// LLM invocation layer error
    #[error("llm error: {0}")]
    Llm(#[from] ensemble_llm::Error),

    /// Internal error (task join, serialization, ...)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
