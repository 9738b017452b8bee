//! Drives one protocol run: one agent task per participant.

use std::collections::BTreeSet;
use std::fs::File;
use std::future::Future;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{error, info};

use taproot_agent::{Vertex, ROOT};
use taproot_comm::{Endpoint, Group, GroupController, ParticipantId};
use taproot_topology::EdgeList;

use crate::error::{Error, Result};

/// Runner configuration.
#[derive(Clone, Debug, Default)]
pub struct RunConfig {
    /// Participant count. Inferred as the largest mentioned vertex id
    /// plus one when unset; this stands in for the launcher's `-np`.
    pub participants: Option<usize>,
    /// Directory for per-participant trace files; disabled when unset.
    pub trace_dir: Option<PathBuf>,
}

impl RunConfig {
    /// Read configuration from `TAPROOT_PARTICIPANTS` and
    /// `TAPROOT_TRACE_DIR`.
    pub fn from_env() -> Self {
        let participants = std::env::var("TAPROOT_PARTICIPANTS")
            .ok()
            .and_then(|value| value.parse().ok());
        let trace_dir = std::env::var("TAPROOT_TRACE_DIR").ok().map(PathBuf::from);
        Self { participants, trace_dir }
    }
}

/// Final state of one participant.
#[derive(Clone, Debug)]
pub struct VertexOutcome {
    pub id: ParticipantId,
    pub parent: Option<ParticipantId>,
    pub children: BTreeSet<ParticipantId>,
    pub path: Vec<ParticipantId>,
    pub received: u64,
    /// The completion record as printed to stdout.
    pub record: String,
}

/// Outcome of a whole run, sorted by participant id.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub outcomes: Vec<VertexOutcome>,
}

impl RunReport {
    /// The outcome of participant `id`, if it exists.
    pub fn outcome(&self, id: ParticipantId) -> Option<&VertexOutcome> {
        self.outcomes.iter().find(|outcome| outcome.id == id)
    }

    /// Σ|children| across all participants.
    pub fn total_children(&self) -> usize {
        self.outcomes.iter().map(|outcome| outcome.children.len()).sum()
    }
}

/// Start a run and hand back the group controller alongside the
/// completion future.
///
/// The controller is what a SIGINT handler pokes: aborting resolves every
/// blocked receive and fails the run. The future resolves once all
/// participants have printed their completion record; on a topology the
/// algorithm fails to resolve it never does, so bounded callers wrap it
/// in a timeout.
pub fn launch(
    edges: EdgeList,
    config: RunConfig,
) -> (Arc<GroupController>, impl Future<Output = Result<RunReport>>) {
    let participants = config
        .participants
        .unwrap_or_else(|| edges.suggested_participants());
    info!(participants, edges = edges.len(), "starting run");

    let (controller, endpoints) = Group::new(participants);
    let controller = Arc::new(controller);

    let driver = {
        let controller = Arc::clone(&controller);
        async move {
            let mut tasks = JoinSet::new();
            for endpoint in endpoints {
                let contribution = (endpoint.id() == ROOT).then(|| edges.clone());
                tasks.spawn(participant(endpoint, contribution, config.trace_dir.clone()));
            }

            let mut outcomes = Vec::with_capacity(participants);
            // Endpoints of finished participants are parked here so their
            // queues stay open: a late fire-and-forget send to an already
            // terminated peer must buffer, not fail.
            let mut parked = Vec::with_capacity(participants);
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(Ok((outcome, endpoint))) => {
                        outcomes.push(outcome);
                        parked.push(endpoint);
                    }
                    Ok(Err(err)) => {
                        error!(error = %err, "participant failed, aborting group");
                        controller.abort();
                        return Err(err);
                    }
                    Err(err) => {
                        controller.abort();
                        return Err(Error::Join(err));
                    }
                }
            }
            drop(parked);
            outcomes.sort_by_key(|outcome| outcome.id);
            Ok(RunReport { outcomes })
        }
    };

    (controller, driver)
}

/// Run the protocol over `edges` and wait for every participant.
pub async fn run(edges: EdgeList, config: RunConfig) -> Result<RunReport> {
    let (_controller, driver) = launch(edges, config);
    driver.await
}

async fn participant(
    mut endpoint: Endpoint,
    contribution: Option<EdgeList>,
    trace_dir: Option<PathBuf>,
) -> Result<(VertexOutcome, Endpoint)> {
    let id = endpoint.id();
    let graph = endpoint.dist_graph_create(contribution.as_ref()).await?;
    let mut vertex = Vertex::new(id, graph.out_neighbors(id).clone());
    let mut trace = open_trace(trace_dir.as_deref(), id);

    if id == ROOT {
        vertex.start();
        flush(&endpoint, &mut vertex)?;
    }

    loop {
        let (src, msg) = endpoint.recv_any().await?;
        vertex.receive(src, msg);
        flush(&endpoint, &mut vertex)?;
        if let Some(writer) = trace.as_mut() {
            let _ = writeln!(writer, "{}", vertex.trace_line());
        }
        if vertex.is_done() {
            break;
        }
    }

    let record = vertex.done_record();
    println!("{record}");
    let outcome = VertexOutcome {
        id,
        parent: vertex.parent(),
        children: vertex.children().clone(),
        path: vertex.path().to_vec(),
        received: vertex.received(),
        record,
    };
    Ok((outcome, endpoint))
}

fn flush(endpoint: &Endpoint, vertex: &mut Vertex) -> Result<()> {
    for (dest, msg) in vertex.take_outgoing() {
        endpoint.send(dest, &msg)?;
    }
    Ok(())
}

/// Open the per-participant trace file, best effort. The trace channel is
/// never relied upon for correctness.
fn open_trace(dir: Option<&Path>, id: ParticipantId) -> Option<BufWriter<File>> {
    let dir = dir?;
    if std::fs::create_dir_all(dir).is_err() {
        return None;
    }
    File::create(dir.join(id.to_string())).ok().map(BufWriter::new)
}
