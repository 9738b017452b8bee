//! The per-vertex protocol state machine.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use tracing::{debug, trace};

use taproot_comm::{Message, ParticipantId};

use crate::path::{path_order, PathOrder};
use crate::ROOT;

/// One vertex agent: its view of the tree under construction.
///
/// The state machine does no IO of its own. [`Vertex::receive`] consumes
/// one message and queues any replies; the driver drains
/// [`Vertex::take_outgoing`] after every call and stops the receive loop
/// once [`Vertex::is_done`] turns true.
#[derive(Clone, Debug)]
pub struct Vertex {
    id: ParticipantId,
    neighbors: BTreeSet<ParticipantId>,
    children: BTreeSet<ParticipantId>,
    terminated: BTreeSet<ParticipantId>,
    path: Vec<ParticipantId>,
    parent: Option<ParticipantId>,
    mounted: bool,
    parent_rejected: bool,
    received: u64,
    outgoing: Vec<(ParticipantId, Message)>,
    done: bool,
}

impl Vertex {
    /// Create the agent for `id` with its neighbor set.
    ///
    /// Every neighbor starts out as a candidate child; the parent is
    /// carved out of the set on first discovery.
    pub fn new(id: ParticipantId, neighbors: BTreeSet<ParticipantId>) -> Self {
        Self {
            id,
            children: neighbors.clone(),
            neighbors,
            terminated: BTreeSet::new(),
            path: Vec::new(),
            parent: None,
            mounted: false,
            parent_rejected: false,
            received: 0,
            outgoing: Vec::new(),
            done: false,
        }
    }

    /// Seed the tree at the root: mount with the one-element path and
    /// discover every neighbor.
    pub fn start(&mut self) {
        self.mounted = true;
        self.path = vec![self.id];
        debug!(id = self.id, "root mounted, discovering neighbors");
        let dests: Vec<_> = self.children.iter().copied().collect();
        self.send_discover(&dests);
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn parent(&self) -> Option<ParticipantId> {
        self.parent
    }

    pub fn children(&self) -> &BTreeSet<ParticipantId> {
        &self.children
    }

    pub fn neighbors(&self) -> &BTreeSet<ParticipantId> {
        &self.neighbors
    }

    pub fn path(&self) -> &[ParticipantId] {
        &self.path
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_parent_rejected(&self) -> bool {
        self.parent_rejected
    }

    /// Messages received so far.
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Whether the termination condition has fired.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Queued outgoing messages, in send order.
    pub fn take_outgoing(&mut self) -> Vec<(ParticipantId, Message)> {
        std::mem::take(&mut self.outgoing)
    }

    /// Consume one incoming message, then run the post-dispatch
    /// termination check.
    pub fn receive(&mut self, src: ParticipantId, msg: Message) {
        self.received += 1;
        match msg {
            Message::Discover(path) => self.on_discover(src, path),
            Message::Reject => self.on_reject(src),
            Message::Terminate => self.on_terminate(src),
        }
        self.check_termination();
    }

    fn on_discover(&mut self, src: ParticipantId, incoming: Vec<ParticipantId>) {
        if !self.mounted {
            // First discovery: mount under the sender and flood onwards.
            // The incoming path already ends with our own id.
            trace!(id = self.id, from = src, path = ?incoming, "mounted");
            self.mounted = true;
            self.parent = Some(src);
            self.children.remove(&src);
            self.path = incoming;
            let dests: Vec<_> = self.children.iter().copied().collect();
            self.send_discover(&dests);
        } else if self.parent == Some(src) {
            // The parent occasionally re-sends; keep the better path.
            if path_order(&self.path, &incoming) == PathOrder::RightDf {
                trace!(id = self.id, path = ?incoming, "refreshed path from parent");
                self.path = incoming;
            }
        } else {
            match path_order(&self.path, &incoming) {
                PathOrder::RightDf => self.switch_parent(src, incoming),
                PathOrder::Prefix => self.resolve_cycle(src, &incoming),
                PathOrder::LeftDf => {
                    // The sender's view is stale; hand our path back.
                    self.send_discover(&[src]);
                }
            }
        }
    }

    /// Adopt the better incoming path and make the sender our parent.
    /// The old parent becomes a child again and receives the replacement
    /// path, unless it already repudiated the link.
    fn switch_parent(&mut self, src: ParticipantId, incoming: Vec<ParticipantId>) {
        debug!(id = self.id, old = ?self.parent, new = src, "parent switch");
        self.path = incoming;
        if !self.parent_rejected {
            if let Some(old) = self.parent {
                self.children.insert(old);
                self.send_discover(&[old]);
            }
        }
        self.parent = Some(src);
        self.parent_rejected = false;
        self.children.remove(&src);
    }

    /// A prefix relation means the sender's path runs back through this
    /// vertex: together with the sender's own link, the id right after our
    /// prefix closes a cycle. The link with the larger id is dropped.
    fn resolve_cycle(&mut self, src: ParticipantId, incoming: &[ParticipantId]) {
        let Some(&other) = incoming.get(self.path.len()) else {
            // Same length, same prefix: the paths are identical.
            return;
        };
        let loser = if other < src { src } else { other };
        trace!(id = self.id, sender = src, other, loser, "cycle edge rejected");
        self.children.remove(&loser);
        self.outgoing.push((loser, Message::Reject));
    }

    fn on_reject(&mut self, src: ParticipantId) {
        if self.parent == Some(src) {
            // The upstream side repudiated the link. The parent is kept
            // until a better discovery replaces it.
            self.parent_rejected = true;
        } else {
            self.children.remove(&src);
        }
    }

    fn on_terminate(&mut self, src: ParticipantId) {
        // May arrive from a neighbor that is no longer a child; it is
        // counted regardless.
        self.terminated.insert(src);
    }

    /// Termination compares cardinalities only.
    fn check_termination(&mut self) {
        if self.terminated.len() == self.children.len() {
            if self.id != ROOT {
                if let Some(parent) = self.parent {
                    self.outgoing.push((parent, Message::Terminate));
                }
            }
            debug!(id = self.id, children = ?self.children, received = self.received, "done");
            self.done = true;
        }
    }

    /// Queue DISCOVER to each destination, appending the destination id
    /// to the current path.
    fn send_discover(&mut self, dests: &[ParticipantId]) {
        for &dest in dests {
            let mut path = self.path.clone();
            path.push(dest);
            self.outgoing.push((dest, Message::Discover(path)));
        }
    }

    /// The single-line completion record.
    pub fn done_record(&self) -> String {
        format!(
            "[{}]:\t DONE - Children: {}\t\t{}",
            self.id,
            fmt_set(&self.children),
            self.received
        )
    }

    /// One-line state summary for the per-participant trace channel.
    pub fn trace_line(&self) -> String {
        format!(
            "parent: {:?} path: {:?} children: {:?} terminated: {:?} parent_rejected: {}",
            self.parent, self.path, self.children, self.terminated, self.parent_rejected
        )
    }
}

fn fmt_set(set: &BTreeSet<ParticipantId>) -> String {
    let mut out = String::from("[");
    for (i, id) in set.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{id}");
    }
    out.push(']');
    out
}
