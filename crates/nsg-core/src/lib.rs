//! `nsg-core` — foundational types for the nsg network-slice workspace.
//!
//! This crate is a dependency of every other `nsg-*` crate.  It intentionally
//! has no `nsg-*` dependencies and a minimal external footprint (`serde` /
//! `serde_json` for the wire format, `thiserror`, `rustc-hash` for the
//! geocoder memo).
//!
//! # What lives here
//!
//! | Module      | Contents                                                |
//! |-------------|---------------------------------------------------------|
//! | [`geo`]     | `Location`, WGS84 geocentric distance                   |
//! | [`qos`]     | `QoS` channel algebra, `QosWire` wire format            |
//! | [`geocode`] | `Geocoder` trait, memoizing `CachedGeocoder`            |
//! | [`error`]   | `QoSError`, `LocationError`                             |

pub mod error;
pub mod geo;
pub mod geocode;
pub mod qos;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{LocationError, QoSError};
pub use geo::Location;
pub use geocode::{CachedGeocoder, Geocoder, NullGeocoder};
pub use qos::{LatencyWire, QoS, QosWire};
