//! Error types for taproot-topology.

use thiserror::Error;

/// Result type for topology operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a topology.
#[derive(Debug, Error)]
pub enum Error {
    /// A line of the edge list did not parse as two integers.
    #[error("malformed edge at line {line}: {text:?}")]
    MalformedEdge { line: usize, text: String },

    /// An edge references a vertex outside the participant range.
    #[error("vertex {id} out of range for {participants} participants")]
    VertexOutOfRange { id: usize, participants: usize },

    /// IO error while reading the edge list.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
