//! `nsg-slice` — the conceptual graph of one network slice.
//!
//! A slice maps the physical placement of radio units, edge compute, cloud
//! anchors and terminals onto an undirected graph whose edges carry QoS
//! values.  The graph enforces the attachment invariants (RU freeze, single
//! parent edge, bandwidth-optimal terminal attachment, EDGE co-location) and
//! answers end-to-end QoS queries over shortest paths.
//!
//! | Module    | Contents                                          |
//! |-----------|---------------------------------------------------|
//! | [`graph`] | `SliceGraph`, `NodeKind`, `LinkDelta`, `NodeView` |
//! | [`error`] | `SliceError`                                      |

pub mod error;
pub mod graph;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::SliceError;
pub use graph::{LinkDelta, NodeKind, NodeView, SliceGraph, CLOUD_CONNECTION};
