//! The slice conceptual graph.
//!
//! # Data layout
//!
//! Nodes live in a `BTreeMap` keyed by their stable string id; adjacency is
//! a map of maps with the QoS stored on both directions of each undirected
//! edge.  Sorted maps keep neighbor iteration — and therefore BFS
//! tie-breaking and emission order — deterministic.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over located radio units answers the nearest-RU
//! query for EDGE co-location.  Lat/lon Euclidean ordering is sufficient
//! there: co-location means *identical* coordinates, and candidates for
//! terminal attachment are re-ranked by geodesic distance anyway.
//!
//! # Edge weights
//!
//! | Edge                          | QoS                          |
//! |-------------------------------|------------------------------|
//! | RU ↔ RU (incl. the cloud hub) | slice midhaul                |
//! | RU ↔ CLOUD (via the hub)      | slice backhaul               |
//! | RU ↔ co-located EDGE          | best attainable              |
//! | RU ↔ UE                       | wireless model at distance   |

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use nsg_core::{Location, QoS};
use nsg_radio::{CellLoad, RadioContext, WirelessModel};

use crate::error::SliceError;

/// Reserved id of the pseudo radio unit that anchors every cloud node.
pub const CLOUD_CONNECTION: &str = "cloud_connection";

// ── Node types ────────────────────────────────────────────────────────────────

/// The role of a node in the slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeKind {
    Ru,
    Cloud,
    Edge,
    Ue,
}

impl NodeKind {
    /// Compute nodes are everything the deployer cares about: UE, EDGE, CLOUD.
    #[inline]
    pub fn is_compute(self) -> bool {
        !matches!(self, NodeKind::Ru)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            NodeKind::Ru => "RU",
            NodeKind::Cloud => "CLOUD",
            NodeKind::Edge => "EDGE",
            NodeKind::Ue => "UE",
        })
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    location: Option<Location>,
}

/// A link change produced by a node motion: the recreated parent edge.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkDelta {
    pub from: String,
    pub to: String,
    pub qos: QoS,
    pub bidirectional: bool,
}

/// A read-only snapshot of one node, consumable by the HTTP surface and the
/// map UI.
#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub id: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Entry in the radio-unit spatial index: a `[lat, lon]` point plus the RU id.
#[derive(Clone)]
struct RuEntry {
    point: [f64; 2],
    id: String,
}

impl RTreeObject for RuEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for RuEntry {
    /// Squared Euclidean distance in lat/lon space — only used to find the
    /// candidate for exact co-location.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── Attachment planning ───────────────────────────────────────────────────────

/// A fully validated attachment: applying it cannot fail, which is what
/// makes `add_node` and `move_node` atomic.
struct AttachPlan {
    target: String,
    qos: QoS,
    /// A radio unit to synthesize first (EDGE co-location only).
    synthesize: Option<(String, Location)>,
}

struct Candidate {
    id: String,
    distance_km: f64,
    attached_ues: u32,
}

// ── SliceGraph ────────────────────────────────────────────────────────────────

/// The conceptual graph of one network slice.
///
/// Owns its wireless model and all topology state; one logical owner thread
/// performs every mutation and query, so no interior locking is needed.
pub struct SliceGraph {
    name: String,
    backhaul: QoS,
    midhaul: QoS,
    model: Box<dyn WirelessModel>,
    nodes: BTreeMap<String, Node>,
    adj: BTreeMap<String, BTreeMap<String, QoS>>,
    ru_index: RTree<RuEntry>,
    non_ru_nodes: usize,
}

impl SliceGraph {
    /// Create an empty slice holding only the `cloud_connection` hub.
    pub fn new(
        name: impl Into<String>,
        backhaul: QoS,
        midhaul: QoS,
        model: Box<dyn WirelessModel>,
    ) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            CLOUD_CONNECTION.to_string(),
            Node { kind: NodeKind::Ru, location: None },
        );
        let mut adj = BTreeMap::new();
        adj.insert(CLOUD_CONNECTION.to_string(), BTreeMap::new());
        Self {
            name: name.into(),
            backhaul,
            midhaul,
            model,
            nodes,
            adj,
            ru_index: RTree::new(),
            non_ru_nodes: 0,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backhaul(&self) -> &QoS {
        &self.backhaul
    }

    pub fn midhaul(&self) -> &QoS {
        &self.midhaul
    }

    /// Reach of the slice's wireless model in kilometers.
    pub fn radius_km(&self) -> f64 {
        self.model.radius_km()
    }

    /// The wireless QoS at a plain distance (no occupancy context).
    pub fn qos_from(&self, distance_km: f64) -> Result<QoS, SliceError> {
        Ok(self.model.qos_for(distance_km, RadioContext::Direct)?)
    }

    /// Compute nodes (UE, EDGE, CLOUD) with their locations, sorted by id.
    pub fn compute_nodes(&self) -> impl Iterator<Item = (&str, Option<&Location>)> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.kind.is_compute())
            .map(|(id, node)| (id.as_str(), node.location.as_ref()))
    }

    /// Located radio units, sorted by id.  The `cloud_connection` hub has no
    /// location and is excluded.
    pub fn radio_units(&self) -> impl Iterator<Item = (&str, &Location)> {
        self.nodes.iter().filter_map(|(id, node)| match (&node.kind, &node.location) {
            (NodeKind::Ru, Some(location)) => Some((id.as_str(), location)),
            _ => None,
        })
    }

    pub fn node_location(&self, name: &str) -> Option<&Location> {
        self.nodes.get(name).and_then(|node| node.location.as_ref())
    }

    pub fn node_kind(&self, name: &str) -> Option<NodeKind> {
        self.nodes.get(name).map(|node| node.kind)
    }

    /// The QoS stored on the `a` ↔ `b` edge, if such an edge exists.
    pub fn link_qos(&self, a: &str, b: &str) -> Option<&QoS> {
        self.adj.get(a).and_then(|row| row.get(b))
    }

    /// A snapshot of every node (radio units included), sorted by id.
    pub fn node_views(&self) -> Vec<NodeView> {
        self.nodes
            .iter()
            .map(|(id, node)| NodeView {
                id: id.clone(),
                kind: node.kind,
                location: node.location.clone(),
            })
            .collect()
    }

    // ── Radio-unit admission ──────────────────────────────────────────────

    /// Add a radio unit.  Fails once any compute node is attached, and on
    /// coordinate collisions.  The id is `"{lat}-{lon}"`, with the altitude
    /// appended when one is given.
    pub fn add_ru(&mut self, lat: f64, lon: f64, alt: Option<f64>) -> Result<String, SliceError> {
        if self.non_ru_nodes > 0 {
            return Err(SliceError::Frozen);
        }
        let key = ru_key(lat, lon, alt);
        if self.nodes.contains_key(&key) {
            return Err(SliceError::DuplicateRu(key));
        }
        let location = Location::with_alt(lat, lon, alt)?;
        self.insert_ru_node(&key, location);
        debug!(slice = %self.name, ru = %key, "added radio unit");
        Ok(key)
    }

    // ── Node attachment ───────────────────────────────────────────────────

    /// Attach a compute node.
    ///
    /// CLOUD nodes hang off the cloud hub with the backhaul QoS; EDGE nodes
    /// co-locate with a radio unit (synthesizing one at their coordinates
    /// if none is there); UE nodes attach to the radio unit the wireless
    /// model selects, with the model's QoS on the edge.
    pub fn add_node(
        &mut self,
        name: &str,
        kind: NodeKind,
        location: Option<Location>,
    ) -> Result<(), SliceError> {
        if kind == NodeKind::Ru {
            return Err(SliceError::RuKindRejected);
        }
        if self.ru_index.size() == 0 {
            return Err(SliceError::NoRadioUnits);
        }
        if self.nodes.contains_key(name) {
            return Err(SliceError::DuplicateNode(name.to_string()));
        }
        if matches!(kind, NodeKind::Ue | NodeKind::Edge) && location.is_none() {
            return Err(SliceError::MissingLocation(name.to_string()));
        }

        let AttachPlan { target, qos, synthesize } =
            self.plan_attachment(kind, location.as_ref(), Some(name))?;
        if let Some((key, ru_location)) = synthesize {
            self.insert_ru_node(&key, ru_location);
        }
        // CLOUD placement is logical, not geographic.
        let stored = match kind {
            NodeKind::Cloud => None,
            _ => location,
        };
        self.nodes.insert(name.to_string(), Node { kind, location: stored });
        self.insert_edge(name, &target, qos);
        self.non_ru_nodes += 1;
        debug!(slice = %self.name, node = name, kind = %kind, parent = %target, "attached node");
        Ok(())
    }

    // ── Motion ────────────────────────────────────────────────────────────

    /// Move a UE or EDGE node and re-run its attachment.
    ///
    /// Atomic: every failure path is exhausted before the first mutation,
    /// so a failing move leaves coordinates and edges untouched.  Returns
    /// the recreated parent-edge deltas.
    pub fn move_node(
        &mut self,
        name: &str,
        lat: f64,
        lon: f64,
        alt: Option<f64>,
    ) -> Result<Vec<LinkDelta>, SliceError> {
        let kind = match self.nodes.get(name) {
            None => return Err(SliceError::UnknownNode(name.to_string())),
            Some(node) if matches!(node.kind, NodeKind::Ue | NodeKind::Edge) => node.kind,
            Some(_) => return Err(SliceError::NotMobile(name.to_string())),
        };
        let location = Location::with_alt(lat, lon, alt)?;
        let AttachPlan { target, qos, synthesize } =
            self.plan_attachment(kind, Some(&location), Some(name))?;

        self.remove_edges_of(name);
        if let Some((key, ru_location)) = synthesize {
            self.insert_ru_node(&key, ru_location);
        }
        if let Some(node) = self.nodes.get_mut(name) {
            node.location = Some(location);
        }
        self.insert_edge(name, &target, qos.clone());
        debug!(slice = %self.name, node = name, parent = %target, "moved node");
        Ok(vec![LinkDelta {
            from: name.to_string(),
            to: target,
            qos,
            bidirectional: false,
        }])
    }

    // ── QoS queries ───────────────────────────────────────────────────────

    /// End-to-end QoS over the hop-count-shortest path.
    ///
    /// The first and last edge count twice: an access edge carries both the
    /// uplink and downlink legs of its interface, which the bidirectional
    /// view halves again downstream.  `None` when `from == to`.
    pub fn qos_between(&self, from: &str, to: &str) -> Result<Option<QoS>, SliceError> {
        if !self.nodes.contains_key(from) {
            return Err(SliceError::UnknownNode(from.to_string()));
        }
        if !self.nodes.contains_key(to) {
            return Err(SliceError::UnknownNode(to.to_string()));
        }
        if from == to {
            return Ok(None);
        }
        let path = self.shortest_path(from, to)?;
        let mut hops = Vec::with_capacity(path.len().saturating_sub(1));
        for pair in path.windows(2) {
            match self.adj.get(&pair[0]).and_then(|row| row.get(&pair[1])) {
                Some(qos) => hops.push(qos),
                None => {
                    return Err(SliceError::Disconnected {
                        from: from.to_string(),
                        to: to.to_string(),
                    });
                }
            }
        }
        let Some(first) = hops.first() else {
            return Err(SliceError::Disconnected { from: from.to_string(), to: to.to_string() });
        };
        let mut qos = first.merge(first);
        if hops.len() > 1 {
            for hop in &hops[1..hops.len() - 1] {
                qos = qos.merge(hop);
            }
            let last = hops[hops.len() - 1];
            qos = qos.merge(last).merge(last);
        }
        Ok(Some(qos))
    }

    /// Whether traffic between `a` and `b` crosses an RU-to-RU link, i.e.
    /// their radio-unit neighborhoods differ.
    pub fn has_to_pass_through_midhaul(&self, a: &str, b: &str) -> Result<bool, SliceError> {
        Ok(self.ru_neighbors(a)? != self.ru_neighbors(b)?)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Validate an attachment without touching the graph.  `exclude` is the
    /// node being attached or moved: it is dropped from occupancy counts
    /// and may not collide with a synthesized radio unit id.
    fn plan_attachment(
        &self,
        kind: NodeKind,
        location: Option<&Location>,
        exclude: Option<&str>,
    ) -> Result<AttachPlan, SliceError> {
        match kind {
            NodeKind::Ru => Err(SliceError::RuKindRejected),
            NodeKind::Cloud => Ok(AttachPlan {
                target: CLOUD_CONNECTION.to_string(),
                qos: self.backhaul.clone(),
                synthesize: None,
            }),
            NodeKind::Edge => {
                let location = location.ok_or_else(|| {
                    SliceError::MissingLocation(exclude.unwrap_or("EDGE").to_string())
                })?;
                let entry = self
                    .ru_index
                    .nearest_neighbor(&[location.lat, location.lon])
                    .ok_or(SliceError::NoRadioUnits)?;
                let ru_location = self
                    .nodes
                    .get(&entry.id)
                    .and_then(|node| node.location.as_ref())
                    .ok_or_else(|| SliceError::UnknownNode(entry.id.clone()))?;
                if ru_location.distance_km(location) == 0.0 {
                    return Ok(AttachPlan {
                        target: entry.id.clone(),
                        qos: QoS::maximum(),
                        synthesize: None,
                    });
                }
                // No radio unit at these coordinates: synthesize one.  The
                // only RU creation permitted after the freeze.  The id must
                // not collide with an existing node or the node being
                // attached.
                let key = ru_key(location.lat, location.lon, location.alt);
                if self.nodes.contains_key(&key) || exclude == Some(key.as_str()) {
                    return Err(SliceError::DuplicateRu(key));
                }
                Ok(AttachPlan {
                    target: key.clone(),
                    qos: QoS::maximum(),
                    synthesize: Some((key, location.clone())),
                })
            }
            NodeKind::Ue => {
                let location = location.ok_or_else(|| {
                    SliceError::MissingLocation(exclude.unwrap_or("UE").to_string())
                })?;
                let candidates = self.ue_candidates(location, exclude);
                let Some(nearest) = candidates.first() else {
                    return Err(SliceError::NoRadioUnits);
                };
                if nearest.distance_km > self.model.radius_km() {
                    return Ok(AttachPlan {
                        target: nearest.id.clone(),
                        qos: QoS::minimum(),
                        synthesize: None,
                    });
                }
                let cells: Vec<CellLoad> = candidates
                    .iter()
                    .map(|c| CellLoad {
                        distance_km: c.distance_km,
                        attached_ues: c.attached_ues,
                    })
                    .collect();
                let pick = self.model.select_cell(&cells)?;
                Ok(AttachPlan {
                    target: candidates[pick.index].id.clone(),
                    qos: pick.qos,
                    synthesize: None,
                })
            }
        }
    }

    /// Located radio units ranked by (geodesic distance, id) with their
    /// current terminal counts.  `exclude` drops a moving terminal from the
    /// occupancy it is about to leave.
    fn ue_candidates(&self, location: &Location, exclude: Option<&str>) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = self
            .radio_units()
            .map(|(id, ru_location)| Candidate {
                id: id.to_string(),
                distance_km: ru_location.distance_km(location),
                attached_ues: self.attached_ues(id, exclude),
            })
            .collect();
        candidates
            .sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km).then_with(|| a.id.cmp(&b.id)));
        candidates
    }

    fn attached_ues(&self, ru: &str, exclude: Option<&str>) -> u32 {
        let Some(row) = self.adj.get(ru) else { return 0 };
        row.keys()
            .filter(|neighbor| {
                exclude != Some(neighbor.as_str())
                    && self
                        .nodes
                        .get(neighbor.as_str())
                        .is_some_and(|node| node.kind == NodeKind::Ue)
            })
            .count() as u32
    }

    fn ru_neighbors(&self, id: &str) -> Result<BTreeSet<&str>, SliceError> {
        if !self.nodes.contains_key(id) {
            return Err(SliceError::UnknownNode(id.to_string()));
        }
        Ok(self
            .adj
            .get(id)
            .map(|row| {
                row.keys()
                    .filter(|n| {
                        self.nodes
                            .get(n.as_str())
                            .is_some_and(|node| node.kind == NodeKind::Ru)
                    })
                    .map(|n| n.as_str())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn insert_ru_node(&mut self, key: &str, location: Location) {
        let peers: Vec<String> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.kind == NodeKind::Ru)
            .map(|(id, _)| id.clone())
            .collect();
        self.ru_index.insert(RuEntry {
            point: [location.lat, location.lon],
            id: key.to_string(),
        });
        self.nodes.insert(key.to_string(), Node {
            kind: NodeKind::Ru,
            location: Some(location),
        });
        self.adj.entry(key.to_string()).or_default();
        let midhaul = self.midhaul.clone();
        for peer in peers {
            self.insert_edge(key, &peer, midhaul.clone());
        }
    }

    fn insert_edge(&mut self, a: &str, b: &str, qos: QoS) {
        self.adj.entry(a.to_string()).or_default().insert(b.to_string(), qos.clone());
        self.adj.entry(b.to_string()).or_default().insert(a.to_string(), qos);
    }

    fn remove_edges_of(&mut self, id: &str) {
        let neighbors: Vec<String> = self
            .adj
            .get(id)
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();
        for neighbor in &neighbors {
            if let Some(row) = self.adj.get_mut(neighbor) {
                row.remove(id);
            }
        }
        if let Some(row) = self.adj.get_mut(id) {
            row.clear();
        }
    }

    /// Breadth-first shortest path over uniform edge weights.  Sorted
    /// adjacency makes the returned path deterministic.
    fn shortest_path(&self, from: &str, to: &str) -> Result<Vec<String>, SliceError> {
        let mut parent: FxHashMap<&str, &str> = FxHashMap::default();
        let mut queue: VecDeque<&str> = VecDeque::new();
        parent.insert(from, from);
        queue.push_back(from);
        while let Some(node) = queue.pop_front() {
            if node == to {
                break;
            }
            if let Some(row) = self.adj.get(node) {
                for neighbor in row.keys() {
                    if !parent.contains_key(neighbor.as_str()) {
                        parent.insert(neighbor.as_str(), node);
                        queue.push_back(neighbor.as_str());
                    }
                }
            }
        }
        if !parent.contains_key(to) {
            return Err(SliceError::Disconnected {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        let mut path = vec![to.to_string()];
        let mut cursor = to;
        while cursor != from {
            match parent.get(cursor) {
                Some(&prev) => {
                    path.push(prev.to_string());
                    cursor = prev;
                }
                None => break,
            }
        }
        path.reverse();
        Ok(path)
    }
}

/// Stable radio-unit id from its coordinates.
fn ru_key(lat: f64, lon: f64, alt: Option<f64>) -> String {
    match alt {
        None => format!("{lat}-{lon}"),
        Some(alt) => format!("{lat}-{lon}-{alt}"),
    }
}
