//! The QoS value type and its composition algebra.
//!
//! A `QoS` carries four channels.  Channels are stored raw as set; defaults,
//! rounding, and the error-rate saturation are applied by the accessors, so
//! a merge chain never loses precision to intermediate clamping:
//!
//! | Channel      | Unit  | Default | Accessor canonicalization |
//! |--------------|-------|---------|---------------------------|
//! | `delay`      | ms    | 0       | rounded to 2 decimals     |
//! | `deviation`  | ms    | 0       | rounded to 2 decimals     |
//! | `bandwidth`  | Mbps  | 10⁶     | rounded to 3 decimals     |
//! | `error_rate` | %     | 0       | saturated at 100          |
//!
//! Composition over a path is [`merge`](QoS::merge): latencies and error
//! rates add, bandwidth is the minimum of the two legs.  The operation is
//! commutative and associative on every channel.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::QoSError;

// ── QoS ───────────────────────────────────────────────────────────────────────

/// A per-link (or per-path) quality-of-service value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QoS {
    delay: Option<f64>,
    deviation: Option<f64>,
    bandwidth: Option<f64>,
    error_rate: Option<f64>,
}

impl QoS {
    /// An empty QoS: every accessor reports its channel default.
    pub fn new() -> Self {
        Self::default()
    }

    /// The worst attainable QoS.  Used for out-of-range radio links.
    pub fn minimum() -> Self {
        Self {
            delay: Some(1_000_000.0),
            deviation: Some(1_000_000.0),
            bandwidth: Some(0.0),
            error_rate: Some(100.0),
        }
    }

    /// The best attainable QoS.  Used for the RU ↔ co-located-EDGE link.
    pub fn maximum() -> Self {
        Self {
            delay: Some(0.1),
            deviation: Some(0.1),
            bandwidth: Some(10_000_000.0),
            error_rate: Some(0.1),
        }
    }

    /// Parse a JSON QoS description.
    ///
    /// Recognized top-level keys are `latency` (an object holding `delay`
    /// and/or `deviation`), `bandwidth`, and `error_rate`; anything else is
    /// rejected with [`QoSError::UnknownChannel`].  Channel values may be
    /// numbers or strings with `ms` / `mbps` / `%` suffixes.
    pub fn parse(value: &Value) -> Result<Self, QoSError> {
        let object = value.as_object().ok_or(QoSError::NotAnObject)?;
        let mut qos = Self::new();
        for (key, entry) in object {
            match key.as_str() {
                "latency" => {
                    if let Some(delay) = entry.get("delay") {
                        qos.delay = Some(units::parse_ms("delay", delay)?);
                    }
                    if let Some(deviation) = entry.get("deviation") {
                        qos.deviation = Some(units::parse_ms("deviation", deviation)?);
                    }
                }
                "bandwidth" => qos.bandwidth = Some(units::parse_mbps(entry)?),
                "error_rate" => qos.error_rate = Some(units::parse_percent(entry)?),
                other => return Err(QoSError::UnknownChannel(other.to_string())),
            }
        }
        Ok(qos)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// One-way delay in milliseconds (2-decimal canonical form).
    pub fn delay(&self) -> f64 {
        round_to(self.delay.unwrap_or(0.0), 2)
    }

    /// Delay deviation (jitter) in milliseconds.
    pub fn deviation(&self) -> f64 {
        round_to(self.deviation.unwrap_or(0.0), 2)
    }

    /// Data rate in Mbps.  Unset means "unconstrained" (10⁶).
    pub fn bandwidth(&self) -> f64 {
        round_to(self.bandwidth.unwrap_or(1_000_000.0), 3)
    }

    /// Error rate in percent, saturated at 100.
    pub fn error_rate(&self) -> f64 {
        let raw = self.error_rate.unwrap_or(0.0);
        if raw > 100.0 { 100.0 } else { raw }
    }

    // ── Mutators ──────────────────────────────────────────────────────────

    pub fn set_delay(&mut self, ms: f64) {
        self.delay = Some(ms);
    }

    pub fn set_deviation(&mut self, ms: f64) {
        self.deviation = Some(ms);
    }

    pub fn set_bandwidth(&mut self, mbps: f64) {
        self.bandwidth = Some(mbps);
    }

    /// Values above 100 are stored as given and saturate on read.
    pub fn set_error_rate(&mut self, percent: f64) {
        self.error_rate = Some(percent);
    }

    // ── Algebra ───────────────────────────────────────────────────────────

    /// Compose two QoS values along a path.
    ///
    /// Delay, deviation and error rate add; bandwidth takes the minimum.
    /// Operands are read through the accessors, so each contributes its
    /// saturated error rate, while the sum itself is stored unclamped.
    pub fn merge(&self, other: &QoS) -> QoS {
        QoS {
            delay: Some(self.delay() + other.delay()),
            deviation: Some(self.deviation() + other.deviation()),
            bandwidth: Some(self.bandwidth().min(other.bandwidth())),
            error_rate: Some(self.error_rate() + other.error_rate()),
        }
    }

    // ── Wire format ───────────────────────────────────────────────────────

    /// The full wire form: all four channels through the accessors.
    pub fn formatted(&self) -> QosWire {
        QosWire::build(
            Some(self.delay()),
            Some(self.deviation()),
            Some(self.bandwidth()),
            Some(self.error_rate()),
        )
    }

    /// The per-direction wire form of a symmetric link: delay, deviation and
    /// error rate are halved (and omitted when zero), bandwidth is kept.
    pub fn formatted_bidirectional(&self) -> QosWire {
        let half = |v: f64| if v != 0.0 { Some(v / 2.0) } else { None };
        QosWire::build(
            half(self.delay()),
            half(self.deviation()),
            Some(self.bandwidth()),
            half(self.error_rate()),
        )
    }
}

impl std::fmt::Display for QoS {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let wire = serde_json::to_string(&self.formatted()).map_err(|_| std::fmt::Error)?;
        f.write_str(&wire)
    }
}

// ── Wire structures ───────────────────────────────────────────────────────────

/// Nested latency block of the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation: Option<String>,
}

/// The external QoS representation:
/// `{"latency": {"delay": "3.0ms", "deviation": "1.0ms"},
///   "bandwidth": "10.0mbps", "error_rate": "1.0%"}`.
///
/// Channels that are `None` are omitted from the serialized object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QosWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<LatencyWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_rate: Option<String>,
}

impl QosWire {
    fn build(
        delay: Option<f64>,
        deviation: Option<f64>,
        bandwidth: Option<f64>,
        error_rate: Option<f64>,
    ) -> Self {
        // Deviation rides inside the latency block, so it only appears when
        // a delay is present.
        let latency = delay.map(|d| LatencyWire {
            delay: Some(format!("{}ms", units::display(d))),
            deviation: deviation.map(|v| format!("{}ms", units::display(v))),
        });
        QosWire {
            latency,
            bandwidth: bandwidth.map(|v| format!("{}mbps", units::display(v))),
            error_rate: error_rate.map(|v| format!("{}%", units::display(v))),
        }
    }
}

// ── Unit parsing and number display ───────────────────────────────────────────

fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

mod units {
    use serde_json::Value;

    use crate::error::QoSError;

    pub fn parse_ms(channel: &'static str, value: &Value) -> Result<f64, QoSError> {
        parse_suffixed(channel, value, "ms")
    }

    pub fn parse_mbps(value: &Value) -> Result<f64, QoSError> {
        parse_suffixed("bandwidth", value, "mbps")
    }

    pub fn parse_percent(value: &Value) -> Result<f64, QoSError> {
        parse_suffixed("error_rate", value, "%")
    }

    fn parse_suffixed(channel: &'static str, value: &Value, suffix: &str) -> Result<f64, QoSError> {
        if let Some(number) = value.as_f64() {
            return Ok(number);
        }
        let text = match value.as_str() {
            Some(text) => text.trim(),
            None => {
                return Err(QoSError::NonNumeric { channel, value: value.to_string() });
            }
        };
        // Only the bandwidth suffix folds case; `ms` and `%` must match
        // exactly.
        let folded;
        let source = if suffix == "mbps" {
            folded = text.to_ascii_lowercase();
            folded.as_str()
        } else {
            text
        };
        let bare = source.strip_suffix(suffix).unwrap_or(source);
        match bare.trim().parse::<f64>() {
            Ok(number) => Ok(number),
            Err(_) => {
                let looks_suffixed = bare
                    .chars()
                    .next_back()
                    .is_some_and(|c| c.is_ascii_alphabetic() || c == '%');
                if looks_suffixed {
                    Err(QoSError::InvalidUnit { channel, value: text.to_string() })
                } else {
                    Err(QoSError::NonNumeric { channel, value: text.to_string() })
                }
            }
        }
    }

    /// Format a channel value with at least one decimal place (`2` →
    /// `"2.0"`, matching the wire form consumed by the deployer).  Accessor
    /// rounding already canonicalized the magnitude; whole numbers just need
    /// the trailing `.0`.
    pub fn display(value: f64) -> String {
        if value.fract() == 0.0 {
            format!("{value:.1}")
        } else {
            format!("{value}")
        }
    }
}
