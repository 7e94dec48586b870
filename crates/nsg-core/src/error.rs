//! Core error types.
//!
//! Downstream crates define their own error enums and wrap these via `From`
//! impls where a QoS or location failure crosses a crate seam.

use thiserror::Error;

/// Errors raised while parsing or mutating a [`QoS`](crate::QoS) value.
#[derive(Debug, Error)]
pub enum QoSError {
    #[error("{0:?} is not a valid QoS channel")]
    UnknownChannel(String),

    #[error("{channel} value {value:?} carries an invalid unit suffix")]
    InvalidUnit { channel: &'static str, value: String },

    #[error("{channel} value {value:?} is not numeric")]
    NonNumeric { channel: &'static str, value: String },

    #[error("a QoS description must be a JSON object")]
    NotAnObject,
}

/// Errors raised while constructing or resolving a [`Location`](crate::Location).
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("could not geocode {0:?}")]
    GeocodeFailed(String),

    #[error("a location needs coordinates, a country, or an address")]
    Unlocatable,
}
