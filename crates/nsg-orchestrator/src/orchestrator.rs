//! The slice orchestrator: description accumulation, materialization, and
//! move fan-out.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use nsg_core::{Geocoder, Location, NullGeocoder, QoS};
use nsg_radio::{build_model, RadioParams, WirelessKind};
use nsg_slice::{NodeKind, NodeView, SliceGraph};

use crate::deploy::{DeployedNetwork, Deployment, LinkUpdate};
use crate::description::{ModelFile, NodeLocation, RuSpec, SliceDescription, TopologyNode};
use crate::error::OrchestratorError;

/// Owns every slice by name, plus the not-yet-materialized descriptions and
/// topology nodes.
///
/// Descriptions and topology accumulate as pure data; nothing touches a
/// graph until [`materialize`](Self::materialize).
pub struct SliceOrchestrator {
    descriptions: Vec<SliceDescription>,
    topology: Vec<TopologyNode>,
    slices: BTreeMap<String, SliceGraph>,
    /// The description each materialized slice was built from, kept for the
    /// declarative export.
    blueprints: BTreeMap<String, SliceDescription>,
    geocoder: Arc<dyn Geocoder>,
}

impl Default for SliceOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl SliceOrchestrator {
    pub fn new() -> Self {
        Self::with_geocoder(Arc::new(NullGeocoder))
    }

    pub fn with_geocoder(geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            descriptions: Vec::new(),
            topology: Vec::new(),
            slices: BTreeMap::new(),
            blueprints: BTreeMap::new(),
            geocoder,
        }
    }

    // ── Description accumulation ──────────────────────────────────────────

    /// Record a slice description.  Pure data; no graph mutation.
    pub fn define_slice(&mut self, description: SliceDescription) {
        self.descriptions.push(description);
    }

    /// Append a radio unit to a not-yet-materialized slice description.
    pub fn add_ru_to_slice(
        &mut self,
        slice: &str,
        lat: f64,
        lon: f64,
        alt: Option<f64>,
    ) -> Result<(), OrchestratorError> {
        let description = self
            .descriptions
            .iter_mut()
            .find(|d| d.name == slice)
            .ok_or_else(|| OrchestratorError::UnknownSlice(slice.to_string()))?;
        description.rus.push(RuSpec { lat, lon, alt });
        Ok(())
    }

    /// Record a topology (blueprint) node.
    pub fn add_topology_node(&mut self, node: TopologyNode) {
        self.topology.push(node);
    }

    // ── Materialization ───────────────────────────────────────────────────

    /// Materialize every mobile description into a slice graph, attach the
    /// located topology nodes, and emit the deployable output.
    ///
    /// Plain descriptions (no `network_type`) stay untouched; a node's
    /// placement is consumed by its first materialization.
    pub fn materialize(&mut self) -> Result<Deployment, OrchestratorError> {
        let mut plain = Vec::new();
        for description in std::mem::take(&mut self.descriptions) {
            let Some(kind_name) = description.network_type.clone() else {
                plain.push(description);
                continue;
            };
            let kind = WirelessKind::parse(&kind_name)?;
            let params: RadioParams = serde_json::from_value(description.radio_access_qos.clone())
                .map_err(|e| OrchestratorError::BadRadioAccess {
                    slice: description.name.clone(),
                    detail: e.to_string(),
                })?;
            let model = build_model(kind, &params)?;
            let backhaul = QoS::parse(&description.backhaul_qos)?;
            let midhaul = QoS::parse(&description.midhaul_qos)?;
            let mut graph = SliceGraph::new(&description.name, backhaul, midhaul, model);
            for ru in &description.rus {
                graph.add_ru(ru.lat, ru.lon, ru.alt)?;
            }
            info!(slice = %description.name, rus = description.rus.len(), "materialized slice");
            self.slices.insert(description.name.clone(), graph);
            self.blueprints.insert(description.name.clone(), description);
        }
        self.descriptions = plain;

        for node in &mut self.topology {
            let Some(placement) = node.location.take() else { continue };
            for (name, graph) in self.slices.iter_mut() {
                if !node.connects_to(name) {
                    continue;
                }
                let kind = placement.kind();
                let location = match kind {
                    NodeKind::Cloud => None,
                    _ => Some(placement.resolve(self.geocoder.as_ref())?),
                };
                graph.add_node(&node.label, kind, location)?;
            }
        }

        self.emit_deployment()
    }

    fn emit_deployment(&self) -> Result<Deployment, OrchestratorError> {
        let mut deployment = Deployment::default();
        for (name, graph) in &self.slices {
            let backhaul = graph.backhaul().formatted_bidirectional();
            deployment.networks.push(DeployedNetwork {
                name: name.clone(),
                uplink: backhaul.clone(),
                downlink: backhaul,
            });
            let nodes: Vec<String> =
                graph.compute_nodes().map(|(id, _)| id.to_string()).collect();
            let mut links = Vec::new();
            for from in &nodes {
                for to in &nodes {
                    if let Some(qos) = graph.qos_between(from, to)? {
                        links.push(LinkUpdate {
                            from: from.clone(),
                            to: to.clone(),
                            properties: qos.formatted_bidirectional(),
                        });
                    }
                }
            }
            deployment.links.insert(name.clone(), links);
        }
        Ok(deployment)
    }

    // ── Motion ────────────────────────────────────────────────────────────

    /// Move a node and return the directed link updates for the deployer:
    /// every `label → x` link with a non-null QoS, plus `x → label`
    /// whenever its delay changed.
    pub fn move_node(
        &mut self,
        slice: &str,
        label: &str,
        lat: f64,
        lon: f64,
        alt: Option<f64>,
    ) -> Result<Vec<LinkUpdate>, OrchestratorError> {
        let graph = self
            .slices
            .get_mut(slice)
            .ok_or_else(|| OrchestratorError::SliceNotMobile(slice.to_string()))?;
        let others: Vec<String> = graph
            .compute_nodes()
            .map(|(id, _)| id.to_string())
            .filter(|id| id != label)
            .collect();
        let mut reverse_delay = BTreeMap::new();
        for other in &others {
            if let Some(qos) = graph.qos_between(other, label)? {
                reverse_delay.insert(other.clone(), qos.delay());
            }
        }

        graph.move_node(label, lat, lon, alt)?;

        let mut updates = Vec::new();
        for other in &others {
            if let Some(qos) = graph.qos_between(label, other)? {
                updates.push(LinkUpdate {
                    from: label.to_string(),
                    to: other.clone(),
                    properties: qos.formatted_bidirectional(),
                });
            }
            if let Some(qos) = graph.qos_between(other, label)? {
                if reverse_delay.get(other) != Some(&qos.delay()) {
                    updates.push(LinkUpdate {
                        from: other.clone(),
                        to: label.to_string(),
                        properties: qos.formatted_bidirectional(),
                    });
                }
            }
        }
        info!(slice, node = label, updates = updates.len(), "node moved");
        Ok(updates)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Names of the materialized slices.
    pub fn slice_names(&self) -> Vec<String> {
        self.slices.keys().cloned().collect()
    }

    pub fn slice(&self, name: &str) -> Option<&SliceGraph> {
        self.slices.get(name)
    }

    /// The full node list of a slice, radio units included.
    pub fn node_views(&self, slice: &str) -> Result<Vec<NodeView>, OrchestratorError> {
        self.slices
            .get(slice)
            .map(|graph| graph.node_views())
            .ok_or_else(|| OrchestratorError::UnknownSlice(slice.to_string()))
    }

    /// A node's location, `None` when the slice has no such node (or the
    /// node carries no coordinates).
    pub fn node_location(
        &self,
        slice: &str,
        node: &str,
    ) -> Result<Option<Location>, OrchestratorError> {
        let graph = self
            .slices
            .get(slice)
            .ok_or_else(|| OrchestratorError::UnknownSlice(slice.to_string()))?;
        Ok(graph.node_location(node).cloned())
    }

    // ── Declarative export / import ───────────────────────────────────────

    /// Export the declarative model: slice blueprints plus the topology
    /// with every attached node's live position.  Re-importing the result
    /// through [`from_model`](Self::from_model) re-materializes the same
    /// graphs.
    pub fn export_model(&self) -> ModelFile {
        let mut networks: Vec<SliceDescription> = self.blueprints.values().cloned().collect();
        networks.extend(self.descriptions.iter().cloned());

        let topology = self
            .topology
            .iter()
            .map(|node| {
                let mut node = node.clone();
                for graph in self.slices.values() {
                    if let Some(kind) = graph.node_kind(&node.label) {
                        let live = graph.node_location(&node.label);
                        node.location = Some(NodeLocation {
                            lat: live.map(|l| l.lat),
                            lon: live.map(|l| l.lon),
                            alt: live.and_then(|l| l.alt),
                            country: live.and_then(|l| l.country.clone()),
                            address: live.and_then(|l| l.address.clone()),
                            location_type: Some(kind),
                        });
                        break;
                    }
                }
                node
            })
            .collect();

        ModelFile { networks, topology }
    }

    /// Build and materialize an orchestrator from a declarative model.
    pub fn from_model(model: ModelFile) -> Result<(Self, Deployment), OrchestratorError> {
        Self::from_model_with_geocoder(model, Arc::new(NullGeocoder))
    }

    pub fn from_model_with_geocoder(
        model: ModelFile,
        geocoder: Arc<dyn Geocoder>,
    ) -> Result<(Self, Deployment), OrchestratorError> {
        let mut orchestrator = Self::with_geocoder(geocoder);
        for description in model.networks {
            orchestrator.define_slice(description);
        }
        for node in model.topology {
            orchestrator.add_topology_node(node);
        }
        let deployment = orchestrator.materialize()?;
        Ok((orchestrator, deployment))
    }
}
