//! `nsg-radio` — wireless degradation models for the nsg slice graph.
//!
//! Every model answers the same two questions through the [`WirelessModel`]
//! trait: how far does the cell reach ([`radius_km`](WirelessModel::radius_km)),
//! and what QoS does a terminal see at a given distance
//! ([`qos_for`](WirelessModel::qos_for)).  Occupancy-aware models additionally
//! override [`select_cell`](WirelessModel::select_cell) to choose the serving
//! radio unit among a candidate set.
//!
//! | Module          | Model                                                 |
//! |-----------------|-------------------------------------------------------|
//! | [`degradation`] | Per-channel linear / log2 / log10 decay functions     |
//! | [`functional`]  | Four-channel best→worst degradation over a radius     |
//! | [`stepwise`]    | Binned QoS on an integer-meter grid (also "flat")     |
//! | [`siso`]        | Friis + Shannon + DQPSK closed forms                  |
//! | [`mimo`]        | SISO extended with antenna occupancy                  |
//! | [`model`]       | `WirelessModel` trait, kinds, parameter parsing       |

pub mod degradation;
pub mod error;
pub mod functional;
pub mod mimo;
pub mod model;
pub mod siso;
pub mod stepwise;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use degradation::{Decay, DegradationFn};
pub use error::{DegradationError, WirelessError};
pub use functional::FunctionalModel;
pub use mimo::Mimo;
pub use model::{
    build_model, CellLoad, CellPick, RadioContext, RadioParams, WirelessKind, WirelessModel,
};
pub use siso::Siso;
pub use stepwise::Stepwise;
