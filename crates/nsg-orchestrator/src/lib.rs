//! `nsg-orchestrator` — assembles slices from declarative descriptions and
//! feeds the external deployer.
//!
//! The orchestrator accumulates slice descriptions and topology nodes as
//! pure data, materializes them into [`SliceGraph`]s in one deterministic
//! pass, and emits per-link bidirectional QoS annotations.  Move events
//! fan out into directed link updates.  A single-owner control mailbox
//! ([`control`]) serializes mutations coming from the HTTP listener.
//!
//! | Module           | Contents                                         |
//! |------------------|--------------------------------------------------|
//! | [`description`]  | `SliceDescription`, `TopologyNode`, `ModelFile`  |
//! | [`orchestrator`] | `SliceOrchestrator`                              |
//! | [`deploy`]       | `Deployment`, `DeployedNetwork`, `LinkUpdate`    |
//! | [`control`]      | `ControlHandle` mailbox + owner thread           |
//!
//! [`SliceGraph`]: nsg_slice::SliceGraph

pub mod control;
pub mod deploy;
pub mod description;
pub mod error;
pub mod orchestrator;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use control::{spawn_control, ControlHandle};
pub use deploy::{DeployedNetwork, Deployment, LinkUpdate};
pub use description::{ModelFile, NetworkRef, NodeLocation, RuSpec, SliceDescription, TopologyNode};
pub use error::OrchestratorError;
pub use orchestrator::SliceOrchestrator;
