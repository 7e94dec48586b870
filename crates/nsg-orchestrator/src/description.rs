//! Declarative inputs: slice descriptions, topology nodes, and the model
//! file that bundles them.
//!
//! `ModelFile` doubles as the persistence story: exporting one captures the
//! slice blueprints plus every node's current position, and re-importing it
//! re-materializes the same graphs deterministically.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use nsg_core::{Geocoder, Location, LocationError};
use nsg_slice::NodeKind;

// ── Slice description ─────────────────────────────────────────────────────────

/// One radio unit position inside a slice description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuSpec {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<f64>,
}

/// A declarative slice: haul QoS, the wireless model kind, and the radio
/// units.  Descriptions without a `network_type` are plain (non-mobile)
/// networks and are left untouched by materialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliceDescription {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,
    #[serde(default)]
    pub backhaul_qos: Value,
    #[serde(default)]
    pub midhaul_qos: Value,
    #[serde(default)]
    pub radio_access_qos: Value,
    #[serde(default, rename = "RUs", skip_serializing_if = "Vec::is_empty")]
    pub rus: Vec<RuSpec>,
}

// ── Topology nodes ────────────────────────────────────────────────────────────

/// A network reference: either a bare slice name or a `{name: …}` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NetworkRef {
    Name(String),
    Object { name: String },
}

impl NetworkRef {
    pub fn name(&self) -> &str {
        match self {
            NetworkRef::Name(name) => name,
            NetworkRef::Object { name } => name,
        }
    }
}

/// Geographic placement of a topology node.  Coordinates win when present;
/// otherwise the country or address is geocoded at materialization time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_type: Option<NodeKind>,
}

impl NodeLocation {
    /// The node kind this placement implies (mobile terminal by default).
    pub fn kind(&self) -> NodeKind {
        self.location_type.unwrap_or(NodeKind::Ue)
    }

    /// Resolve into a concrete [`Location`].
    ///
    /// Supplied coordinates are used as-is (geocoding silently skipped);
    /// otherwise the country, then the address, is geocoded.
    pub fn resolve(&self, geocoder: &dyn Geocoder) -> Result<Location, LocationError> {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            let mut location = Location::with_alt(lat, lon, self.alt)?;
            location.country = self.country.clone();
            location.address = self.address.clone();
            return Ok(location);
        }
        let place = self
            .country
            .as_deref()
            .or(self.address.as_deref())
            .ok_or(LocationError::Unlocatable)?;
        let mut location = Location::from_place(place, geocoder)?;
        location.country = self.country.clone();
        location.address = self.address.clone();
        Ok(location)
    }
}

/// A topology (blueprint) node accumulated before materialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyNode {
    pub label: String,
    pub service: String,
    pub device: String,
    #[serde(default)]
    pub networks: Vec<NetworkRef>,
    #[serde(default = "default_replicas")]
    pub replicas: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<NodeLocation>,
}

fn default_replicas() -> u32 {
    1
}

impl TopologyNode {
    /// Whether this node's `networks` mention `slice`.
    pub fn connects_to(&self, slice: &str) -> bool {
        self.networks.iter().any(|n| n.name() == slice)
    }
}

// ── Model file ────────────────────────────────────────────────────────────────

/// The declarative bundle consumed by `from_model` and produced by
/// `export_model`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelFile {
    #[serde(default)]
    pub networks: Vec<SliceDescription>,
    #[serde(default)]
    pub topology: Vec<TopologyNode>,
}
