//! Radio-subsystem error types.

use thiserror::Error;

use nsg_core::QoSError;

/// Errors produced by the per-channel degradation functions.
#[derive(Debug, Error)]
pub enum DegradationError {
    #[error("distance {0} km is negative")]
    NegativeDistance(f64),

    #[error("degradation parameter `{0}` must be finite")]
    NonFinite(&'static str),

    #[error("degradation radius must be positive, got {0}")]
    NonPositiveRadius(f64),
}

/// Errors produced while building or evaluating a wireless model.
#[derive(Debug, Error)]
pub enum WirelessError {
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("unknown wireless model kind {0:?}")]
    UnknownKind(String),

    #[error("a stepwise model needs at least one bin")]
    EmptyBins,

    #[error("radius {0:?} must carry a km or m suffix")]
    InvalidRadius(String),

    #[error("cell candidate list is empty")]
    NoCells,

    #[error(transparent)]
    Degradation(#[from] DegradationError),

    #[error(transparent)]
    Qos(#[from] QoSError),
}
