//! The deployable description emitted to the external deployer.
//!
//! Every link is directed and carries the bidirectional view of the
//! end-to-end QoS between its endpoints: the symmetric path QoS halved per
//! direction, bandwidth preserved.

use std::collections::BTreeMap;

use serde::Serialize;

use nsg_core::QosWire;

/// One slice's network annotation: uplink and downlink both carry the
/// bidirectional view of the slice backhaul.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeployedNetwork {
    pub name: String,
    pub uplink: QosWire,
    pub downlink: QosWire,
}

/// A directed link annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkUpdate {
    pub from: String,
    pub to: String,
    pub properties: QosWire,
}

/// The full deployable output of one materialization pass: one network per
/// slice plus its directed link set, keyed by slice name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Deployment {
    pub networks: Vec<DeployedNetwork>,
    pub links: BTreeMap<String, Vec<LinkUpdate>>,
}
