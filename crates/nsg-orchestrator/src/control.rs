//! The control mailbox: a single-owner thread that serializes every
//! mutation and query against the orchestrator.
//!
//! The HTTP listener (and any other producer) holds a cheap, cloneable
//! [`ControlHandle`]; requests are processed strictly in arrival order, so
//! the link deltas a move emits are totally ordered per slice.  A failed
//! move replies with the error and leaves the graphs untouched.  Shutdown
//! drains the loop and hands the orchestrator back to the joiner.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::debug;

use nsg_core::Location;
use nsg_slice::NodeView;

use crate::deploy::LinkUpdate;
use crate::description::ModelFile;
use crate::error::OrchestratorError;
use crate::orchestrator::SliceOrchestrator;

// ── Requests ──────────────────────────────────────────────────────────────────

enum Request {
    Move {
        slice: String,
        label: String,
        lat: f64,
        lon: f64,
        alt: Option<f64>,
        reply: Sender<Result<Vec<LinkUpdate>, OrchestratorError>>,
    },
    SliceNames {
        reply: Sender<Vec<String>>,
    },
    SliceNodes {
        slice: String,
        reply: Sender<Result<Vec<NodeView>, OrchestratorError>>,
    },
    NodeLocation {
        slice: String,
        node: String,
        reply: Sender<Result<Option<Location>, OrchestratorError>>,
    },
    Export {
        reply: Sender<ModelFile>,
    },
    Shutdown,
}

// ── Handle ────────────────────────────────────────────────────────────────────

/// Cloneable sender side of the control mailbox.
#[derive(Clone)]
pub struct ControlHandle {
    tx: Sender<Request>,
}

impl ControlHandle {
    fn call<T>(&self, build: impl FnOnce(Sender<T>) -> Request) -> Result<T, OrchestratorError> {
        let (reply, response) = mpsc::channel();
        self.tx
            .send(build(reply))
            .map_err(|_| OrchestratorError::ControlStopped)?;
        response.recv().map_err(|_| OrchestratorError::ControlStopped)
    }

    /// Move a node; blocks until the owner thread has applied (or rejected)
    /// the request.
    pub fn move_node(
        &self,
        slice: &str,
        label: &str,
        lat: f64,
        lon: f64,
        alt: Option<f64>,
    ) -> Result<Vec<LinkUpdate>, OrchestratorError> {
        self.call(|reply| Request::Move {
            slice: slice.to_string(),
            label: label.to_string(),
            lat,
            lon,
            alt,
            reply,
        })?
    }

    pub fn slice_names(&self) -> Result<Vec<String>, OrchestratorError> {
        self.call(|reply| Request::SliceNames { reply })
    }

    pub fn slice_nodes(&self, slice: &str) -> Result<Vec<NodeView>, OrchestratorError> {
        self.call(|reply| Request::SliceNodes { slice: slice.to_string(), reply })?
    }

    pub fn node_location(
        &self,
        slice: &str,
        node: &str,
    ) -> Result<Option<Location>, OrchestratorError> {
        self.call(|reply| Request::NodeLocation {
            slice: slice.to_string(),
            node: node.to_string(),
            reply,
        })?
    }

    /// A post-mutation snapshot of the declarative model.
    pub fn export_model(&self) -> Result<ModelFile, OrchestratorError> {
        self.call(|reply| Request::Export { reply })
    }

    /// Ask the owner thread to stop.  Idempotent; join the handle returned
    /// by [`spawn_control`] to recover the orchestrator.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Request::Shutdown);
    }
}

// ── Owner thread ──────────────────────────────────────────────────────────────

/// Spawn the owner thread.  Returns the handle plus the join handle that
/// yields the orchestrator back after shutdown.
pub fn spawn_control(
    orchestrator: SliceOrchestrator,
) -> (ControlHandle, JoinHandle<SliceOrchestrator>) {
    let (tx, rx) = mpsc::channel();
    let join = thread::spawn(move || run(orchestrator, rx));
    (ControlHandle { tx }, join)
}

fn run(mut orchestrator: SliceOrchestrator, rx: Receiver<Request>) -> SliceOrchestrator {
    while let Ok(request) = rx.recv() {
        // A dropped reply receiver just means the requester gave up; the
        // mutation itself has already happened in order.
        match request {
            Request::Move { slice, label, lat, lon, alt, reply } => {
                let _ = reply.send(orchestrator.move_node(&slice, &label, lat, lon, alt));
            }
            Request::SliceNames { reply } => {
                let _ = reply.send(orchestrator.slice_names());
            }
            Request::SliceNodes { slice, reply } => {
                let _ = reply.send(orchestrator.node_views(&slice));
            }
            Request::NodeLocation { slice, node, reply } => {
                let _ = reply.send(orchestrator.node_location(&slice, &node));
            }
            Request::Export { reply } => {
                let _ = reply.send(orchestrator.export_model());
            }
            Request::Shutdown => break,
        }
    }
    debug!("control loop stopped");
    orchestrator
}
