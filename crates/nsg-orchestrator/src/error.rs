//! Orchestrator error type.

use thiserror::Error;

use nsg_core::{LocationError, QoSError};
use nsg_radio::WirelessError;
use nsg_slice::SliceError;

/// Errors produced by [`SliceOrchestrator`](crate::SliceOrchestrator) and
/// the control mailbox.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("there is no slice named {0:?}")]
    UnknownSlice(String),

    #[error("{0:?} is not a mobile network")]
    SliceNotMobile(String),

    #[error("slice {slice:?} has a malformed radio access description: {detail}")]
    BadRadioAccess { slice: String, detail: String },

    #[error("the control loop has stopped")]
    ControlStopped,

    #[error(transparent)]
    Slice(#[from] SliceError),

    #[error(transparent)]
    Wireless(#[from] WirelessError),

    #[error(transparent)]
    Qos(#[from] QoSError),

    #[error(transparent)]
    Location(#[from] LocationError),
}
