//! Best-to-worst functional degradation over a radius.

use nsg_core::QoS;

use crate::degradation::{Decay, DegradationFn};
use crate::error::WirelessError;
use crate::model::{RadioContext, WirelessModel};

/// A model whose four channels decay independently from a best QoS at the
/// cell center to a worst QoS at the radius, all with the same [`Decay`]
/// shape.
///
/// Latency, deviation and error rate run low→high (best→worst); bandwidth
/// runs high→low, so its function is built worst→best with the direction
/// flag inverted.
#[derive(Debug, Clone)]
pub struct FunctionalModel {
    radius_km: f64,
    delay: DegradationFn,
    deviation: DegradationFn,
    bandwidth: DegradationFn,
    error_rate: DegradationFn,
}

impl FunctionalModel {
    pub fn new(
        decay: Decay,
        best: &QoS,
        worst: &QoS,
        radius_km: f64,
    ) -> Result<Self, WirelessError> {
        Ok(Self {
            radius_km,
            delay: DegradationFn::new(best.delay(), worst.delay(), radius_km, true, decay)?,
            deviation: DegradationFn::new(
                best.deviation(),
                worst.deviation(),
                radius_km,
                true,
                decay,
            )?,
            bandwidth: DegradationFn::new(
                worst.bandwidth(),
                best.bandwidth(),
                radius_km,
                false,
                decay,
            )?,
            error_rate: DegradationFn::new(
                best.error_rate(),
                worst.error_rate(),
                radius_km,
                true,
                decay,
            )?,
        })
    }
}

impl WirelessModel for FunctionalModel {
    fn radius_km(&self) -> f64 {
        self.radius_km
    }

    fn qos_for(&self, distance_km: f64, _ctx: RadioContext<'_>) -> Result<QoS, WirelessError> {
        if distance_km > self.radius_km {
            return Ok(QoS::minimum());
        }
        let mut qos = QoS::new();
        match self.delay.apply(distance_km)? {
            Some(v) => qos.set_delay(v),
            None => return Ok(QoS::minimum()),
        }
        match self.deviation.apply(distance_km)? {
            Some(v) => qos.set_deviation(v),
            None => return Ok(QoS::minimum()),
        }
        match self.bandwidth.apply(distance_km)? {
            Some(v) => qos.set_bandwidth(v),
            None => return Ok(QoS::minimum()),
        }
        match self.error_rate.apply(distance_km)? {
            Some(v) => qos.set_error_rate(v),
            None => return Ok(QoS::minimum()),
        }
        Ok(qos)
    }
}
