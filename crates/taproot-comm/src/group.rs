//! The in-memory group communicator.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{mpsc, watch};
use tracing::{debug, trace};

use taproot_topology::{DistGraph, EdgeList};

use crate::error::{Error, Result};
use crate::message::{Message, ParticipantId, Tag};

/// One frame on the wire: source, tag, encoded payload.
#[derive(Clone, Debug)]
struct Frame {
    src: ParticipantId,
    tag: Tag,
    payload: Bytes,
}

/// Builder for a fixed-size group of participants.
pub struct Group;

impl Group {
    /// Create a group of `n` participants.
    ///
    /// Returns the controller plus one endpoint per participant, indexed
    /// by id. Each endpoint owns its receive queue while the send sides
    /// are shared, so delivery is FIFO per ordered (sender, receiver)
    /// pair and sends never block.
    pub fn new(n: usize) -> (GroupController, Vec<Endpoint>) {
        let mut senders = Vec::with_capacity(n);
        let mut receivers = Vec::with_capacity(n);
        for _ in 0..n {
            let (tx, rx) = mpsc::unbounded_channel();
            senders.push(tx);
            receivers.push(rx);
        }
        let senders = Arc::new(senders);

        let (abort_tx, abort_rx) = watch::channel(false);
        let (graph_tx, graph_rx) = watch::channel(None);
        let graph_tx = Arc::new(graph_tx);

        let endpoints = receivers
            .into_iter()
            .enumerate()
            .map(|(id, rx)| Endpoint {
                id,
                peers: Arc::clone(&senders),
                rx,
                abort_rx: abort_rx.clone(),
                graph_tx: Arc::clone(&graph_tx),
                graph_rx: graph_rx.clone(),
            })
            .collect();

        debug!(participants = n, "group created");
        (GroupController { abort_tx }, endpoints)
    }
}

/// Handle for group-wide control, held outside the participants.
pub struct GroupController {
    abort_tx: watch::Sender<bool>,
}

impl GroupController {
    /// Abort the whole group.
    ///
    /// Every pending and future [`Endpoint::recv_any`] resolves with
    /// [`Error::Aborted`].
    pub fn abort(&self) {
        debug!("aborting group");
        let _ = self.abort_tx.send(true);
    }
}

/// One participant's handle on the group communicator.
pub struct Endpoint {
    id: ParticipantId,
    peers: Arc<Vec<mpsc::UnboundedSender<Frame>>>,
    rx: mpsc::UnboundedReceiver<Frame>,
    abort_rx: watch::Receiver<bool>,
    graph_tx: Arc<watch::Sender<Option<Arc<DistGraph>>>>,
    graph_rx: watch::Receiver<Option<Arc<DistGraph>>>,
}

impl Endpoint {
    /// This participant's id.
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Number of participants in the group.
    pub fn participants(&self) -> usize {
        self.peers.len()
    }

    /// Send a message to `dest` without blocking.
    ///
    /// The substrate buffers the frame; delivery completes in the
    /// background, in order relative to this endpoint's earlier sends to
    /// the same destination.
    pub fn send(&self, dest: ParticipantId, msg: &Message) -> Result<()> {
        let tx = self
            .peers
            .get(dest)
            .ok_or(Error::UnknownParticipant { id: dest })?;
        let frame = Frame {
            src: self.id,
            tag: msg.tag(),
            payload: msg.encode_payload()?,
        };
        trace!(from = self.id, to = dest, tag = ?frame.tag, "send");
        tx.send(frame).map_err(|_| Error::ParticipantGone { id: dest })
    }

    /// Block until the next message from any source arrives, then decode
    /// it under its tag.
    ///
    /// This is the protocol's only suspension point. Resolves with
    /// [`Error::Aborted`] once the group is aborted.
    pub async fn recv_any(&mut self) -> Result<(ParticipantId, Message)> {
        tokio::select! {
            frame = self.rx.recv() => match frame {
                Some(frame) => {
                    let msg = Message::decode(frame.tag, &frame.payload)?;
                    trace!(at = self.id, from = frame.src, tag = ?frame.tag, "recv");
                    Ok((frame.src, msg))
                }
                None => Err(Error::GroupClosed),
            },
            res = self.abort_rx.wait_for(|aborted| *aborted) => {
                res.map_err(|_| Error::Aborted)?;
                Err(Error::Aborted)
            }
        }
    }

    /// The distributed-graph-construction collective.
    ///
    /// Exactly one participant passes its edge-list contribution; every
    /// caller blocks until the topology lands and resolves to the same
    /// immutable graph, from which it reads its own neighbors.
    pub async fn dist_graph_create(
        &mut self,
        contribution: Option<&EdgeList>,
    ) -> Result<Arc<DistGraph>> {
        if let Some(edges) = contribution {
            let graph = Arc::new(DistGraph::from_edge_list(self.peers.len(), edges)?);
            debug!(
                contributor = self.id,
                participants = self.peers.len(),
                edges = edges.len(),
                "distributed graph constructed"
            );
            self.graph_tx.send_replace(Some(graph));
        }
        let graph = tokio::select! {
            res = self.graph_rx.wait_for(|graph| graph.is_some()) => {
                res.map_err(|_| Error::Aborted)?.clone()
            }
            res = self.abort_rx.wait_for(|aborted| *aborted) => {
                res.map_err(|_| Error::Aborted)?;
                return Err(Error::Aborted);
            }
        };
        graph.ok_or(Error::GroupClosed)
    }
}
