//! Single-input single-output closed-form radio model.
//!
//! The chain is: Friis free-space path loss at the carrier frequency →
//! received signal strength → SNR against thermal noise → Shannon capacity
//! on the channel bandwidth, windowed into [min, max] bitrate → DQPSK
//! bit-error rate over a 100-bit block.  Delay is a static queuing constant
//! and deviation is fixed at 1 ms.

use std::f64::consts::PI;

use nsg_core::QoS;

use crate::error::{DegradationError, WirelessError};
use crate::model::{RadioContext, RadioParams, WirelessModel};

const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;
/// Below this separation free-space loss is taken as zero (the far-field
/// model does not hold and log(0) is waiting).
const MIN_PROPAGATION_DISTANCE_M: f64 = 0.5;
/// Thermal noise density in dBm/Hz.
const THERMAL_NOISE_DBM_HZ: f64 = -174.0;
/// Block length for the residual block-error probability.
const BLOCK_BITS: i32 = 100;
/// Radius scan upper bound in meters.
const RADIUS_SCAN_LIMIT_M: u32 = 10_000;

/// SISO radio with a default 28 GHz carrier / 100 MHz channel parameter set.
#[derive(Debug, Clone)]
pub struct Siso {
    transmit_power_dbm: f64,
    carrier_frequency_hz: f64,
    bandwidth_hz: f64,
    ue_noise_figure_db: f64,
    ru_antenna_gain_db: f64,
    ue_antenna_gain_db: f64,
    /// Capacity window in Mbit/s.
    maximum_bitrate: f64,
    minimum_bitrate: f64,
    queuing_delay_ms: f64,
    /// Derived at construction: distance at which capacity first drops
    /// below the minimum bitrate.
    radius_km: f64,
}

impl Siso {
    pub fn new(params: &RadioParams) -> Self {
        let mut siso = Self {
            transmit_power_dbm: params.transmit_power.unwrap_or(30.0),
            carrier_frequency_hz: params.carrier_frequency.unwrap_or(28.0) * 1e9,
            bandwidth_hz: params.bandwidth.unwrap_or(100.0) * 1e6,
            ue_noise_figure_db: params.ue_noise_figure.unwrap_or(7.8),
            ru_antenna_gain_db: params.ru_antennas_gain.unwrap_or(8.0),
            ue_antenna_gain_db: params.ue_antennas_gain.unwrap_or(3.0),
            maximum_bitrate: params.maximum_bitrate.unwrap_or(538.71),
            minimum_bitrate: params.minimum_bitrate.unwrap_or(53.87),
            queuing_delay_ms: params.queuing_delay.unwrap_or(2.0),
            radius_km: 0.0,
        };
        siso.radius_km = siso.compute_radius_km();
        siso
    }

    // ── Link budget ───────────────────────────────────────────────────────

    fn free_space_loss_db(&self, meters: f64) -> f64 {
        if meters < MIN_PROPAGATION_DISTANCE_M {
            return 0.0;
        }
        let wavelength = SPEED_OF_LIGHT_M_S / self.carrier_frequency_hz;
        20.0 * (4.0 * PI * meters / wavelength).log10()
    }

    fn rssi_db(&self, meters: f64) -> f64 {
        let rx_after_loss = self.transmit_power_dbm - self.free_space_loss_db(meters);
        (self.transmit_power_dbm - 30.0)
            + self.ue_antenna_gain_db
            + self.ru_antenna_gain_db
            + (rx_after_loss - 30.0)
    }

    fn snr_db(&self, meters: f64) -> f64 {
        let noise_dbm = THERMAL_NOISE_DBM_HZ + 10.0 * self.bandwidth_hz.log10();
        self.rssi_db(meters) - (noise_dbm + self.ue_noise_figure_db)
    }

    fn snr(&self, meters: f64) -> f64 {
        db_to_watt(self.snr_db(meters))
    }

    // ── Channel figures ───────────────────────────────────────────────────

    /// Shannon capacity in Mbit/s, unwindowed.
    pub fn ideal_bandwidth(&self, meters: f64) -> f64 {
        self.bandwidth_hz * (1.0 + self.snr(meters)).log2() / 1e6
    }

    /// Capacity windowed into [min, max] bitrate, in Mbyte/s on the wire.
    pub fn bandwidth_at(&self, meters: f64) -> f64 {
        let capacity = self.ideal_bandwidth(meters);
        let windowed = if capacity < self.minimum_bitrate {
            self.minimum_bitrate
        } else if capacity > self.maximum_bitrate {
            self.maximum_bitrate
        } else {
            capacity
        };
        windowed * 0.125
    }

    /// Residual block-error probability in percent.
    pub fn error_rate_at(&self, meters: f64) -> f64 {
        // 2 bits per DQPSK symbol.
        let eb_n0 = self.snr(meters) * (self.bandwidth_hz / 1e6) / 2.0;
        let ber = dqpsk_bit_error_rate(eb_n0).min(1.0);
        100.0 * (1.0 - (1.0 - ber).powi(BLOCK_BITS))
    }

    fn compute_radius_km(&self) -> f64 {
        for meters in 0..RADIUS_SCAN_LIMIT_M {
            if self.ideal_bandwidth(f64::from(meters)) < self.minimum_bitrate {
                return f64::from(meters) / 1000.0;
            }
        }
        f64::from(RADIUS_SCAN_LIMIT_M - 1) / 1000.0
    }

    /// The point-to-point QoS at `distance_km`.  Shared with [`Mimo`],
    /// which rescales the bandwidth afterwards.
    ///
    /// [`Mimo`]: crate::mimo::Mimo
    pub(crate) fn qos_at(&self, distance_km: f64) -> Result<QoS, WirelessError> {
        if distance_km < 0.0 {
            return Err(DegradationError::NegativeDistance(distance_km).into());
        }
        let meters = distance_km * 1000.0;
        let mut qos = QoS::new();
        qos.set_delay(self.queuing_delay_ms);
        qos.set_deviation(1.0);
        qos.set_bandwidth(self.bandwidth_at(meters));
        qos.set_error_rate(self.error_rate_at(meters));
        Ok(qos)
    }
}

impl WirelessModel for Siso {
    fn radius_km(&self) -> f64 {
        self.radius_km
    }

    fn qos_for(&self, distance_km: f64, _ctx: RadioContext<'_>) -> Result<QoS, WirelessError> {
        self.qos_at(distance_km)
    }
}

// ── Closed forms ──────────────────────────────────────────────────────────────

#[inline]
pub(crate) fn db_to_watt(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}

/// DQPSK bit-error rate as a function of Eb/N0 (DSSS error model).
pub(crate) fn dqpsk_bit_error_rate(eb_n0: f64) -> f64 {
    let sqrt2 = 2f64.sqrt();
    ((sqrt2 + 1.0) / (8.0 * PI * sqrt2).sqrt())
        * (1.0 / eb_n0.sqrt())
        * (-(2.0 - sqrt2) * eb_n0).exp()
}
