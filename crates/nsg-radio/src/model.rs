//! The `WirelessModel` capability, model kinds, and parameter parsing.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use nsg_core::QoS;

use crate::error::WirelessError;
use crate::functional::FunctionalModel;
use crate::mimo::Mimo;
use crate::siso::Siso;
use crate::stepwise::Stepwise;
use crate::Decay;

// ── Evaluation context ────────────────────────────────────────────────────────

/// One candidate radio unit as seen from a terminal: its geodesic distance
/// and how many terminals it already serves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellLoad {
    pub distance_km: f64,
    pub attached_ues: u32,
}

/// Context for a QoS evaluation.
///
/// The common case is a plain distance lookup; occupancy-aware models
/// (MIMO) need the visible cells, so the variant carries them only then.
#[derive(Debug, Clone, Copy)]
pub enum RadioContext<'a> {
    /// Point-to-point: the distance passed to `qos_for` is all there is.
    Direct,
    /// Cell selection: candidates sorted by (distance, radio-unit id).
    Cells(&'a [CellLoad]),
}

/// The outcome of a cell selection: which candidate serves the terminal,
/// and with what QoS.
#[derive(Debug, Clone, PartialEq)]
pub struct CellPick {
    pub index: usize,
    pub qos: QoS,
}

// ── Capability trait ──────────────────────────────────────────────────────────

/// A wireless degradation model.
///
/// Implementations must be `Send + Sync`: a slice owns its model behind a
/// `Box<dyn WirelessModel>` and the owning thread may differ from the one
/// that built it.
pub trait WirelessModel: Send + Sync {
    /// Cell reach in kilometers.  Beyond this, links degrade to the worst
    /// attainable QoS.
    fn radius_km(&self) -> f64;

    /// The QoS at `distance_km` under `ctx`.  Negative distances are an
    /// error for every model.
    fn qos_for(&self, distance_km: f64, ctx: RadioContext<'_>) -> Result<QoS, WirelessError>;

    /// Pick the serving cell among `cells` (pre-sorted by ascending
    /// distance, ties by radio-unit id).
    ///
    /// The default keeps the nearest cell — correct for every model whose
    /// bandwidth is non-increasing in distance.  Occupancy-aware models
    /// override this.
    fn select_cell(&self, cells: &[CellLoad]) -> Result<CellPick, WirelessError> {
        let nearest = cells.first().ok_or(WirelessError::NoCells)?;
        let qos = self.qos_for(nearest.distance_km, RadioContext::Direct)?;
        Ok(CellPick { index: 0, qos })
    }
}

// ── Model kinds ───────────────────────────────────────────────────────────────

/// The supported wireless model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WirelessKind {
    Flat,
    Stepwise,
    Linear,
    Log2,
    Log10,
    Siso,
    Mimo,
}

impl WirelessKind {
    /// Parse a `network_type` string.
    ///
    /// Accepts snake_case and CamelCase spellings, with or without the
    /// `*_degradation` / `*_network` qualifiers
    /// (`"linear_degradation"`, `"Log2Degradation"`, `"stepwise"`, `"SISO"`).
    pub fn parse(name: &str) -> Result<Self, WirelessError> {
        let folded: String = name
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "flat" | "flatwireless" | "flatwirelessnetwork" => Ok(Self::Flat),
            "stepwise" | "stepwisedegradation" | "multirange" | "multirangenetwork" => {
                Ok(Self::Stepwise)
            }
            "linear" | "lineardegradation" => Ok(Self::Linear),
            "log2" | "log2degradation" => Ok(Self::Log2),
            "log10" | "log10degradation" => Ok(Self::Log10),
            "siso" => Ok(Self::Siso),
            "mimo" => Ok(Self::Mimo),
            _ => Err(WirelessError::UnknownKind(name.to_string())),
        }
    }
}

// ── Radio-access parameters ───────────────────────────────────────────────────

/// The `radio_access_qos` block of a slice description.
///
/// Each model family reads the fields it needs and validates them at build
/// time; fields irrelevant to the chosen family are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RadioParams {
    // Functional models.
    pub best_qos: Option<Value>,
    pub worst_qos: Option<Value>,
    pub radius: Option<RadiusSpec>,

    // Stepwise / flat models.
    pub bins: Option<BTreeMap<String, Value>>,
    pub qos: Option<Value>,

    // SISO / MIMO physics (defaults applied by the model constructors).
    pub transmit_power: Option<f64>,
    pub carrier_frequency: Option<f64>,
    pub bandwidth: Option<f64>,
    pub ue_noise_figure: Option<f64>,
    pub ru_antennas_gain: Option<f64>,
    pub ue_antennas_gain: Option<f64>,
    pub maximum_bitrate: Option<f64>,
    pub minimum_bitrate: Option<f64>,
    pub queuing_delay: Option<f64>,
    pub ru_antennas: Option<u32>,
    pub ue_antennas: Option<u32>,
}

/// A radius given either as a bare number (kilometers) or as a suffixed
/// string (`"5km"`, `"500m"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RadiusSpec {
    Km(f64),
    Text(String),
}

impl RadiusSpec {
    pub fn km(&self) -> Result<f64, WirelessError> {
        match self {
            RadiusSpec::Km(km) => Ok(*km),
            RadiusSpec::Text(text) => parse_radius_km(text),
        }
    }
}

/// Parse `"5km"` / `"500m"` into kilometers.
pub fn parse_radius_km(text: &str) -> Result<f64, WirelessError> {
    let lowered = text.trim().to_ascii_lowercase();
    let bad = || WirelessError::InvalidRadius(text.to_string());
    if let Some(km) = lowered.strip_suffix("km") {
        return km.trim().parse::<f64>().map_err(|_| bad());
    }
    if let Some(m) = lowered.strip_suffix('m') {
        return m.trim().parse::<f64>().map(|v| v / 1000.0).map_err(|_| bad());
    }
    Err(bad())
}

// ── Model construction ────────────────────────────────────────────────────────

/// Build a wireless model of `kind` from a radio-access description.
pub fn build_model(
    kind: WirelessKind,
    params: &RadioParams,
) -> Result<Box<dyn WirelessModel>, WirelessError> {
    match kind {
        WirelessKind::Flat => {
            let radius_km = match &params.radius {
                Some(spec) => spec.km()?,
                None => 0.5,
            };
            let qos = match &params.qos {
                Some(value) => QoS::parse(value)?,
                None => {
                    let mut qos = QoS::new();
                    qos.set_delay(0.0);
                    qos.set_deviation(0.0);
                    qos.set_bandwidth(1_000_000.0);
                    qos.set_error_rate(0.0);
                    qos
                }
            };
            Ok(Box::new(Stepwise::flat(radius_km, qos)?))
        }
        WirelessKind::Stepwise => {
            let bins = params.bins.as_ref().ok_or(WirelessError::EmptyBins)?;
            Ok(Box::new(Stepwise::from_bins(bins)?))
        }
        WirelessKind::Linear => functional(Decay::Linear, params),
        WirelessKind::Log2 => functional(Decay::Log2, params),
        WirelessKind::Log10 => functional(Decay::Log10, params),
        WirelessKind::Siso => Ok(Box::new(Siso::new(params))),
        WirelessKind::Mimo => Ok(Box::new(Mimo::new(params))),
    }
}

fn functional(
    decay: Decay,
    params: &RadioParams,
) -> Result<Box<dyn WirelessModel>, WirelessError> {
    let best = params
        .best_qos
        .as_ref()
        .ok_or(WirelessError::MissingParameter("best_qos"))?;
    let worst = params
        .worst_qos
        .as_ref()
        .ok_or(WirelessError::MissingParameter("worst_qos"))?;
    let radius_km = params
        .radius
        .as_ref()
        .ok_or(WirelessError::MissingParameter("radius"))?
        .km()?;
    let best = QoS::parse(best)?;
    let worst = QoS::parse(worst)?;
    Ok(Box::new(FunctionalModel::new(decay, &best, &worst, radius_km)?))
}
