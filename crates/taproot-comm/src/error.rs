//! Error types for taproot-comm.

use thiserror::Error;

use crate::message::{ParticipantId, Tag};

/// Result type for substrate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur on the group communicator.
#[derive(Debug, Error)]
pub enum Error {
    /// The destination id is not a member of this group.
    #[error("no participant {id} in this group")]
    UnknownParticipant { id: ParticipantId },

    /// The destination endpoint has been dropped.
    #[error("participant {id} is gone")]
    ParticipantGone { id: ParticipantId },

    /// Every peer endpoint has been dropped.
    #[error("group communicator closed")]
    GroupClosed,

    /// The group was aborted.
    #[error("group aborted")]
    Aborted,

    /// Payload encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// A zero-payload tag arrived carrying bytes.
    #[error("unexpected payload on zero-payload tag {tag:?}")]
    StrayPayload { tag: Tag },

    /// Building the distributed graph from a contribution failed.
    #[error("topology error: {0}")]
    Topology(#[from] taproot_topology::Error),
}
