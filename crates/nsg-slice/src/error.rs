//! Slice-graph error type.

use thiserror::Error;

use nsg_core::LocationError;
use nsg_radio::WirelessError;

/// Errors produced by [`SliceGraph`](crate::SliceGraph) operations.
#[derive(Debug, Error)]
pub enum SliceError {
    #[error("radio units are frozen once a compute node is attached")]
    Frozen,

    #[error("radio unit {0} already exists")]
    DuplicateRu(String),

    #[error("node {0} already exists")]
    DuplicateNode(String),

    #[error("the slice has no radio units yet")]
    NoRadioUnits,

    #[error("node {0} needs a location")]
    MissingLocation(String),

    #[error("RU nodes are created through add_ru, not add_node")]
    RuKindRejected,

    #[error("unknown node {0}")]
    UnknownNode(String),

    #[error("node {0} cannot move")]
    NotMobile(String),

    #[error("no path between {from} and {to}")]
    Disconnected { from: String, to: String },

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Wireless(#[from] WirelessError),
}
