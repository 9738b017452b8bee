//! Taproot Comm - the messaging substrate.
//!
//! A group communicator for a fixed set of participants, realized in
//! memory. The contract matches what the spanning-tree protocol needs:
//!
//! - point-to-point typed messages, tagged DISCOVER / REJECT / TERMINATE;
//! - FIFO delivery per ordered (sender, receiver) pair, no loss, no
//!   duplication;
//! - non-blocking buffered sends; the only suspension point is
//!   [`Endpoint::recv_any`];
//! - a group-wide abort that resolves every pending receive;
//! - the distributed-graph-construction collective
//!   ([`Endpoint::dist_graph_create`]): one participant contributes the
//!   edge list, every participant resolves to the same immutable
//!   [`DistGraph`](taproot_topology::DistGraph) and reads its own
//!   neighbors from it.
//!
//! Frames carry a numeric tag and a bincode payload, so a DISCOVER path
//! is allocated to exactly the element count the frame reports.

pub mod error;
pub mod group;
pub mod message;

pub use error::{Error, Result};
pub use group::{Endpoint, Group, GroupController};
pub use message::{Message, ParticipantId, Tag};
