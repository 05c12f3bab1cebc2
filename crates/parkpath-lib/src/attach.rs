//! Per-request overlays for points that are not part of the canonical graph.
//!
//! A [`WorkingGraph`] borrows the canonical [`Graph`] and records only the
//! delta: ad-hoc nodes with ids above the canonical range plus the edges that
//! tie them in. The canonical graph is never written, so concurrent requests
//! sharing it cannot observe each other's attachments.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{Edge, EdgeKind, Graph, GraphView, Neighbours, Node, NodeId, NodeRole};
use crate::map::Coordinate;

/// Canonical graph plus a request-scoped set of attached points.
#[derive(Debug, Clone)]
pub struct WorkingGraph<'g> {
    base: &'g Graph,
    extra_nodes: Vec<Node>,
    /// Overlay edges keyed by source node; may include canonical sources.
    extra_edges: HashMap<NodeId, Vec<Edge>>,
    lookup: HashMap<Coordinate, NodeId>,
}

/// Attach `coordinate` to a fresh working copy of `graph`.
pub fn attach(graph: &Graph, coordinate: Coordinate) -> Result<(WorkingGraph<'_>, NodeId)> {
    let mut working = WorkingGraph::new(graph);
    let node = working.attach(coordinate)?;
    Ok((working, node))
}

impl<'g> WorkingGraph<'g> {
    pub fn new(base: &'g Graph) -> Self {
        Self {
            base,
            extra_nodes: Vec::new(),
            extra_edges: HashMap::new(),
            lookup: HashMap::new(),
        }
    }

    /// The canonical graph underneath this overlay.
    pub fn base(&self) -> &'g Graph {
        self.base
    }

    /// Points attached to this working copy, in attachment order.
    pub fn attached(&self) -> &[Node] {
        &self.extra_nodes
    }

    /// Resolve `coordinate` to a node, attaching it when it is not already one.
    ///
    /// Ad-hoc points connect to the nearest canonical node on their level with a
    /// single bidirectional edge weighted by planar distance.
    pub fn attach(&mut self, coordinate: Coordinate) -> Result<NodeId> {
        if let Some(id) = self.node_id(&coordinate) {
            return Ok(id);
        }

        let (nearest, distance) = self
            .base
            .nearest_on_level(&coordinate)
            .ok_or(Error::UnreachablePoint { coordinate })?;

        let offset = self.base.node_count() + self.extra_nodes.len();
        let id = u32::try_from(offset)
            .map(NodeId)
            .map_err(|_| Error::GraphInvariant {
                message: "overlay node id exceeds the id space".to_string(),
            })?;

        self.extra_nodes.push(Node {
            id,
            coordinate,
            role: NodeRole::AdHoc,
        });
        self.lookup.insert(coordinate, id);
        self.extra_edges.entry(id).or_default().push(Edge {
            target: nearest,
            kind: EdgeKind::AdHoc,
            distance,
        });
        self.extra_edges.entry(nearest).or_default().push(Edge {
            target: id,
            kind: EdgeKind::AdHoc,
            distance,
        });

        debug!(%coordinate, %id, %nearest, distance, "attached ad-hoc point");
        Ok(id)
    }

    /// Node at an exact coordinate, canonical or attached.
    pub fn node_id(&self, coordinate: &Coordinate) -> Option<NodeId> {
        self.base
            .node_id(coordinate)
            .or_else(|| self.lookup.get(coordinate).copied())
    }
}

impl GraphView for WorkingGraph<'_> {
    fn node(&self, id: NodeId) -> Option<&Node> {
        let canonical = self.base.node_count();
        if id.index() < canonical {
            self.base.node(id)
        } else {
            self.extra_nodes.get(id.index() - canonical)
        }
    }

    fn neighbours(&self, id: NodeId) -> Neighbours<'_> {
        let extra = self
            .extra_edges
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        self.base.edges(id).iter().chain(extra.iter())
    }
}
