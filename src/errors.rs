//! Error types for graph synthesis

use thiserror::Error;

use crate::domain::{ConfigError, ImportError};
use crate::graph::GraphError;

/// Errors that can occur while synthesizing a resource graph
///
/// Every variant is raised synchronously at construction time and
/// surfaced to the caller before any reconciliation is attempted.
/// Network failures, permission denials and drift conflicts belong to
/// the external reconciliation engine, not to this crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// Malformed or missing configuration
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Malformed external identifier on an imported resource
    #[error("Import resolution error: {0}")]
    Import(#[from] ImportError),

    /// Graph assembly failure (duplicate ids, unknown edges, cycles)
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

/// Result type for synthesis operations
pub type SynthesisResult<T> = Result<T, SynthesisError>;
