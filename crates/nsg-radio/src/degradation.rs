//! Per-channel degradation functions.
//!
//! A degradation function maps a distance to a scalar channel value between
//! a `minimum` and a `maximum`, reaching the far endpoint exactly at the
//! radius.  The direction flag decides which endpoint is "good": latency,
//! deviation and error rate worsen upward with distance
//! (`lower_is_better = true`), bandwidth decays downward
//! (`lower_is_better = false`).

use crate::error::DegradationError;

/// The decay shape of a [`DegradationFn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decay {
    Linear,
    Log2,
    Log10,
}

impl Decay {
    #[inline]
    fn eval(self, value: f64) -> f64 {
        match self {
            Decay::Linear => value,
            Decay::Log2 => value.log2(),
            Decay::Log10 => value.log10(),
        }
    }
}

/// A closed-form mapping from distance (km) to one QoS channel value.
#[derive(Debug, Clone)]
pub struct DegradationFn {
    minimum: f64,
    maximum: f64,
    radius_km: f64,
    lower_is_better: bool,
    decay: Decay,
}

impl DegradationFn {
    pub fn new(
        minimum: f64,
        maximum: f64,
        radius_km: f64,
        lower_is_better: bool,
        decay: Decay,
    ) -> Result<Self, DegradationError> {
        if !minimum.is_finite() {
            return Err(DegradationError::NonFinite("minimum"));
        }
        if !maximum.is_finite() {
            return Err(DegradationError::NonFinite("maximum"));
        }
        if !radius_km.is_finite() {
            return Err(DegradationError::NonFinite("radius"));
        }
        if radius_km <= 0.0 {
            return Err(DegradationError::NonPositiveRadius(radius_km));
        }
        Ok(Self { minimum, maximum, radius_km, lower_is_better, decay })
    }

    /// Evaluate at `distance_km`.
    ///
    /// Negative distances are a hard error; distances beyond the radius are
    /// out of range and return `None` (callers substitute the worst QoS).
    pub fn apply(&self, distance_km: f64) -> Result<Option<f64>, DegradationError> {
        if distance_km < 0.0 {
            return Err(DegradationError::NegativeDistance(distance_km));
        }
        if distance_km > self.radius_km {
            return Ok(None);
        }
        let spread = (self.maximum - self.minimum).abs();
        let value = match self.decay {
            Decay::Linear => {
                let gradient = spread / self.radius_km;
                if self.lower_is_better {
                    self.minimum + gradient * distance_km
                } else {
                    self.maximum - gradient * distance_km
                }
            }
            log => {
                // Logarithmic decay works on whole meters; below 1 m the
                // function pins to the boundary value instead of log(0).
                let meters = (distance_km * 1000.0).ceil();
                let boundary = if self.lower_is_better { self.minimum } else { self.maximum };
                if meters < 1.0 {
                    boundary
                } else {
                    let gradient = spread / log.eval(self.radius_km * 1000.0);
                    if self.lower_is_better {
                        self.minimum + gradient * log.eval(meters)
                    } else {
                        self.maximum - gradient * log.eval(meters)
                    }
                }
            }
        };
        Ok(Some(value))
    }
}
