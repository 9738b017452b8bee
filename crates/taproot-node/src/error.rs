//! Error types for the runner.

use thiserror::Error;

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a run.
#[derive(Debug, Error)]
pub enum Error {
    /// Messaging substrate failure.
    #[error("messaging error: {0}")]
    Comm(#[from] taproot_comm::Error),

    /// Topology construction failure.
    #[error("topology error: {0}")]
    Topology(#[from] taproot_topology::Error),

    /// A participant task panicked or was cancelled.
    #[error("participant task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
