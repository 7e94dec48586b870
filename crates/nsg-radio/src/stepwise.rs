//! Stepwise (binned) QoS, including the single-bin "flat" special case.
//!
//! Bins are `(upper_bound, QoS)` pairs.  Construction materializes an index
//! grid over whole meters from 0 to the largest bound, so a lookup is one
//! rounding, one clamp, and two array reads.

use std::collections::BTreeMap;

use serde_json::Value;

use nsg_core::QoS;

use crate::error::{DegradationError, WirelessError};
use crate::model::{parse_radius_km, RadioContext, WirelessModel};

/// Binned QoS over distance.
#[derive(Debug, Clone)]
pub struct Stepwise {
    /// One QoS per bin, in ascending bound order.
    levels: Vec<QoS>,
    /// Meter → bin index; entry `m` is the first bin whose bound ≥ `m`.
    grid: Vec<u16>,
    radius_km: f64,
}

impl Stepwise {
    /// Build from `{"0.5km": {...}, "1km": {...}}`-style bins.
    pub fn from_bins(bins: &BTreeMap<String, Value>) -> Result<Self, WirelessError> {
        if bins.is_empty() {
            return Err(WirelessError::EmptyBins);
        }
        let mut parsed: Vec<(f64, QoS)> = Vec::with_capacity(bins.len());
        for (bound, qos) in bins {
            parsed.push((parse_radius_km(bound)?, QoS::parse(qos)?));
        }
        parsed.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self::from_levels(parsed)
    }

    /// A single bin covering the whole radius.
    pub fn flat(radius_km: f64, qos: QoS) -> Result<Self, WirelessError> {
        Self::from_levels(vec![(radius_km, qos)])
    }

    fn from_levels(levels: Vec<(f64, QoS)>) -> Result<Self, WirelessError> {
        let radius_km = match levels.last() {
            Some((bound, _)) => *bound,
            None => return Err(WirelessError::EmptyBins),
        };
        let bounds_m: Vec<u32> = levels
            .iter()
            .map(|(bound, _)| (bound * 1000.0).round() as u32)
            .collect();
        let max_m = *bounds_m.last().unwrap_or(&0);

        let mut grid = Vec::with_capacity(max_m as usize + 1);
        let mut bin = 0usize;
        for meter in 0..=max_m {
            while bounds_m[bin] < meter {
                bin += 1;
            }
            grid.push(bin as u16);
        }

        Ok(Self {
            levels: levels.into_iter().map(|(_, qos)| qos).collect(),
            grid,
            radius_km,
        })
    }

    fn level_at(&self, distance_km: f64) -> &QoS {
        let meter = (distance_km * 1000.0).round() as usize;
        let meter = meter.min(self.grid.len() - 1);
        &self.levels[self.grid[meter] as usize]
    }
}

impl WirelessModel for Stepwise {
    fn radius_km(&self) -> f64 {
        self.radius_km
    }

    fn qos_for(&self, distance_km: f64, _ctx: RadioContext<'_>) -> Result<QoS, WirelessError> {
        if distance_km < 0.0 {
            return Err(DegradationError::NegativeDistance(distance_km).into());
        }
        Ok(self.level_at(distance_km).clone())
    }
}
