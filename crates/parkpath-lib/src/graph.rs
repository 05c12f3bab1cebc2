use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::iter::Chain;
use std::slice;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::map::{Coordinate, Direction, GridPoint, MapDescription, SlotStatus};

/// Default search radius, in grid cells, when auto-connecting named points to
/// the corridor network.
pub const DEFAULT_ATTACH_RADIUS: f64 = 8.0;

/// Fixed penalty added to a ramp traversal when the author gave no cost.
pub const DEFAULT_RAMP_COST: f64 = 2.0;

/// Dense node identifier. Canonical graphs allocate `0..node_count`; working
/// overlays allocate above that range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node represents. Only affects eligibility, never traversal cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Entrance,
    Exit,
    Slot,
    Ramp,
    Corridor,
    AdHoc,
}

impl NodeRole {
    pub fn label(self) -> &'static str {
        match self {
            NodeRole::Entrance => "entrance",
            NodeRole::Exit => "exit",
            NodeRole::Slot => "slot",
            NodeRole::Ramp => "ramp",
            NodeRole::Corridor => "corridor",
            NodeRole::AdHoc => "point",
        }
    }
}

/// Vertex of the navigation graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub coordinate: Coordinate,
    pub role: NodeRole,
}

/// Classification for the edge used in the navigation graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Consecutive points of an authored corridor polyline.
    Corridor,
    /// Builder-added link from a named point to the nearest corridor node.
    Connector,
    /// Cross-level link between partnered ramp ends.
    Ramp,
    /// Per-request link from an attached point to the nearest node.
    AdHoc,
}

/// Outgoing edge. Directional corridors are stored only on the side they may
/// be walked from.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub target: NodeId,
    pub kind: EdgeKind,
    pub distance: f64,
}

const NO_EDGES: &[Edge] = &[];

/// Iterator over the outgoing edges of a node in any [`GraphView`].
pub type Neighbours<'a> = Chain<slice::Iter<'a, Edge>, slice::Iter<'a, Edge>>;

/// Read access shared by the canonical graph and per-request overlays.
pub trait GraphView {
    fn node(&self, id: NodeId) -> Option<&Node>;

    fn neighbours(&self, id: NodeId) -> Neighbours<'_>;

    fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }
}

/// Slot node together with the status snapshot it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotRecord {
    pub slot_id: String,
    pub node: NodeId,
    pub coordinate: Coordinate,
    pub status: SlotStatus,
}

/// Tuning knobs for [`build_graph_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphBuildOptions {
    /// Maximum distance at which a named point is linked to a corridor node.
    pub attach_radius: f64,
    /// Penalty for ramps without an authored cost.
    pub default_ramp_cost: f64,
}

impl Default for GraphBuildOptions {
    fn default() -> Self {
        Self {
            attach_radius: DEFAULT_ATTACH_RADIUS,
            default_ramp_cost: DEFAULT_RAMP_COST,
        }
    }
}

impl GraphBuildOptions {
    fn validate(&self) -> Result<()> {
        if !self.attach_radius.is_finite() || self.attach_radius < 0.0 {
            return Err(Error::InvalidOption {
                option: "attach_radius".to_string(),
                reason: format!("{} is not a non-negative distance", self.attach_radius),
            });
        }
        if !self.default_ramp_cost.is_finite() || self.default_ramp_cost < 0.0 {
            return Err(Error::InvalidOption {
                option: "default_ramp_cost".to_string(),
                reason: format!("{} is not a non-negative cost", self.default_ramp_cost),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct GraphCore {
    nodes: Vec<Node>,
    adjacency: Vec<Vec<Edge>>,
    lookup: HashMap<Coordinate, NodeId>,
    /// Node ids per level, ordered by `(x, y)`.
    levels: BTreeMap<i32, Vec<NodeId>>,
    slots: Vec<SlotRecord>,
    slot_index: HashMap<String, usize>,
    edge_count: usize,
}

/// Immutable navigation graph for one building. Cloning shares the storage.
#[derive(Debug, Clone)]
pub struct Graph {
    building: String,
    inner: Arc<GraphCore>,
}

impl Graph {
    /// Building this graph was built for.
    pub fn building(&self) -> &str {
        &self.building
    }

    pub fn node_count(&self) -> usize {
        self.inner.nodes.len()
    }

    /// Number of directed edges stored in the adjacency lists.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count
    }

    pub fn nodes(&self) -> &[Node] {
        &self.inner.nodes
    }

    /// Level numbers present in the graph, ascending.
    pub fn levels(&self) -> impl Iterator<Item = i32> + '_ {
        self.inner.levels.keys().copied()
    }

    /// Node ids on `level`, ordered by `(x, y)`.
    pub fn level_nodes(&self, level: i32) -> &[NodeId] {
        self.inner
            .levels
            .get(&level)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Lookup the node at an exact coordinate.
    pub fn node_id(&self, coordinate: &Coordinate) -> Option<NodeId> {
        self.inner.lookup.get(coordinate).copied()
    }

    /// Return the outgoing edges for a given node.
    pub fn edges(&self, id: NodeId) -> &[Edge] {
        self.inner
            .adjacency
            .get(id.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn slots(&self) -> &[SlotRecord] {
        &self.inner.slots
    }

    pub fn slot(&self, slot_id: &str) -> Option<&SlotRecord> {
        self.inner
            .slot_index
            .get(slot_id)
            .map(|&index| &self.inner.slots[index])
    }

    /// Slots whose status in the build snapshot is `available`.
    pub fn available_slots(&self) -> impl Iterator<Item = &SlotRecord> {
        self.inner
            .slots
            .iter()
            .filter(|slot| slot.status == SlotStatus::Available)
    }

    pub fn nodes_with_role(&self, role: NodeRole) -> impl Iterator<Item = &Node> {
        self.inner.nodes.iter().filter(move |node| node.role == role)
    }

    pub fn entrances(&self) -> impl Iterator<Item = &Node> {
        self.nodes_with_role(NodeRole::Entrance)
    }

    pub fn exits(&self) -> impl Iterator<Item = &Node> {
        self.nodes_with_role(NodeRole::Exit)
    }

    /// Nearest node on the coordinate's level by planar distance. Ties go to
    /// the lowest `x`, then the lowest `y`.
    pub fn nearest_on_level(&self, coordinate: &Coordinate) -> Option<(NodeId, f64)> {
        let mut best: Option<(NodeId, f64)> = None;
        for &id in self.level_nodes(coordinate.level) {
            let distance = self.inner.nodes[id.index()]
                .coordinate
                .planar_distance(coordinate);
            if best.map_or(true, |(_, current)| distance < current) {
                best = Some((id, distance));
            }
        }
        best
    }
}

impl GraphView for Graph {
    fn node(&self, id: NodeId) -> Option<&Node> {
        self.inner.nodes.get(id.index())
    }

    fn neighbours(&self, id: NodeId) -> Neighbours<'_> {
        self.edges(id).iter().chain(NO_EDGES.iter())
    }
}

/// Build the navigation graph with default options.
pub fn build_graph(map: &MapDescription) -> Result<Graph> {
    build_graph_with(map, &GraphBuildOptions::default())
}

/// Build the navigation graph for a validated map description.
///
/// Named points are added first (in authored order per level), then corridor
/// polylines, then connectors from off-corridor named points, then ramp edges
/// between partnered levels. Any contradiction fails the whole build.
pub fn build_graph_with(map: &MapDescription, options: &GraphBuildOptions) -> Result<Graph> {
    options.validate()?;
    if map.levels.is_empty() {
        return Err(Error::malformed("map", "no levels defined"));
    }

    let mut seen_levels = HashSet::new();
    for level in &map.levels {
        if !seen_levels.insert(level.level) {
            return Err(Error::malformed(
                format!("level {}", level.level),
                "level defined more than once",
            ));
        }
    }

    let mut ordered: Vec<_> = map.levels.iter().collect();
    ordered.sort_by_key(|level| level.level);

    let mut assembler = Assembler::default();
    let mut ramps = RampTable::default();

    for level in &ordered {
        let scope = format!("level {}", level.level);
        for (i, entrance) in level.entrances().enumerate() {
            assembler.add_named(
                &format!("{scope} entrance {i}"),
                entrance.point.on_level(level.level),
                NodeRole::Entrance,
            )?;
        }
        for (i, exit) in level.exits().enumerate() {
            assembler.add_named(
                &format!("{scope} exit {i}"),
                exit.point.on_level(level.level),
                NodeRole::Exit,
            )?;
        }
        for (i, slot) in level.slots().enumerate() {
            let element = format!("{scope} slot {i}");
            let coordinate = slot.point.on_level(level.level);
            let node = assembler.add_named(&element, coordinate, NodeRole::Slot)?;
            assembler.add_slot(&element, &slot.slot_id, node, coordinate, slot.status)?;
        }
        for (i, ramp) in level.ramps().enumerate() {
            let element = format!("{scope} ramp {i}");
            if let Some(cost) = ramp.cost {
                if !cost.is_finite() || cost < 0.0 {
                    return Err(Error::malformed(
                        &element,
                        format!("ramp cost {cost} is not a non-negative number"),
                    ));
                }
            }
            let coordinate = ramp.point.on_level(level.level);
            let node = assembler.add_named(&element, coordinate, NodeRole::Ramp)?;
            let key = ramp_key(ramp.link.as_deref(), ramp.point);
            ramps.insert(&element, level.level, key, node, ramp.cost)?;
        }

        for (i, corridor) in level.corridors().enumerate() {
            assembler.add_corridor(
                &format!("{scope} corridor {i}"),
                level.level,
                &corridor.points,
                corridor.direction,
            )?;
        }
    }

    assembler.connect_named_points(options.attach_radius)?;
    ramps.link(&mut assembler, options.default_ramp_cost)?;

    let graph = assembler.finish(map.building.clone())?;
    debug!(
        building = %graph.building(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        slots = graph.slots().len(),
        "built navigation graph"
    );
    Ok(graph)
}

/// Partner key for a ramp end: the explicit link id, else its `(x, y)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum RampKey {
    Link(String),
    Position(GridPoint),
}

impl fmt::Display for RampKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RampKey::Link(link) => write!(f, "link '{link}'"),
            RampKey::Position(point) => write!(f, "position ({}, {})", point.x, point.y),
        }
    }
}

fn ramp_key(link: Option<&str>, point: GridPoint) -> RampKey {
    match link {
        Some(link) => RampKey::Link(link.to_string()),
        None => RampKey::Position(point),
    }
}

#[derive(Debug, Clone, Copy)]
struct RampEnd {
    node: NodeId,
    cost: Option<f64>,
}

#[derive(Debug, Default)]
struct RampTable {
    levels: BTreeMap<i32, BTreeMap<RampKey, RampEnd>>,
}

impl RampTable {
    fn insert(
        &mut self,
        element: &str,
        level: i32,
        key: RampKey,
        node: NodeId,
        cost: Option<f64>,
    ) -> Result<()> {
        match self.levels.entry(level).or_default().entry(key) {
            Entry::Occupied(existing) => Err(Error::malformed(
                element,
                format!("ramp {} already used on this level", existing.key()),
            )),
            Entry::Vacant(slot) => {
                slot.insert(RampEnd { node, cost });
                Ok(())
            }
        }
    }

    fn link(&self, assembler: &mut Assembler, default_cost: f64) -> Result<()> {
        for (&level, ends) in &self.levels {
            let upper = level.checked_add(1).and_then(|l| self.levels.get(&l));
            let lower = level.checked_sub(1).and_then(|l| self.levels.get(&l));
            for (key, end) in ends {
                let partner = upper.and_then(|ends| ends.get(key));
                let has_lower = lower.is_some_and(|ends| ends.contains_key(key));
                if partner.is_none() && !has_lower {
                    warn!(
                        level,
                        %key,
                        "ramp has no partner on an adjacent level; no cross-level edge"
                    );
                }
                let Some(partner) = partner else {
                    continue;
                };

                let from = assembler.coordinate(end.node)?;
                let to = assembler.coordinate(partner.node)?;
                let cost = match (end.cost, partner.cost) {
                    (Some(a), Some(b)) if (a - b).abs() > f64::EPSILON => {
                        return Err(Error::malformed(
                            format!("level {level} ramp {key}"),
                            format!("partner ends declare different costs ({a} and {b})"),
                        ));
                    }
                    (Some(cost), _) | (None, Some(cost)) => cost,
                    (None, None) => from.planar_distance(&to) + default_cost,
                };

                assembler.add_edge(end.node, partner.node, EdgeKind::Ramp, cost)?;
                assembler.add_edge(partner.node, end.node, EdgeKind::Ramp, cost)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Assembler {
    core: GraphCore,
    /// Nodes lying on at least one corridor polyline.
    on_corridor: HashSet<NodeId>,
}

impl Assembler {
    fn coordinate(&self, id: NodeId) -> Result<Coordinate> {
        self.core
            .nodes
            .get(id.index())
            .map(|node| node.coordinate)
            .ok_or_else(|| Error::GraphInvariant {
                message: format!("node {id} referenced before it was created"),
            })
    }

    fn intern(&mut self, coordinate: Coordinate, role: NodeRole) -> Result<NodeId> {
        if let Some(&id) = self.core.lookup.get(&coordinate) {
            return Ok(id);
        }
        let raw = u32::try_from(self.core.nodes.len()).map_err(|_| Error::GraphInvariant {
            message: "node count exceeds the id space".to_string(),
        })?;
        let id = NodeId(raw);
        self.core.nodes.push(Node {
            id,
            coordinate,
            role,
        });
        self.core.adjacency.push(Vec::new());
        self.core.lookup.insert(coordinate, id);
        Ok(id)
    }

    fn add_named(
        &mut self,
        element: &str,
        coordinate: Coordinate,
        role: NodeRole,
    ) -> Result<NodeId> {
        if let Some(&existing) = self.core.lookup.get(&coordinate) {
            let other = self.core.nodes[existing.index()].role;
            return Err(Error::malformed(
                element,
                format!("{coordinate} is already occupied by a {}", other.label()),
            ));
        }
        self.intern(coordinate, role)
    }

    fn add_slot(
        &mut self,
        element: &str,
        slot_id: &str,
        node: NodeId,
        coordinate: Coordinate,
        status: SlotStatus,
    ) -> Result<()> {
        if self.core.slot_index.contains_key(slot_id) {
            return Err(Error::malformed(
                element,
                format!("duplicate slot_id '{slot_id}'"),
            ));
        }
        self.core
            .slot_index
            .insert(slot_id.to_string(), self.core.slots.len());
        self.core.slots.push(SlotRecord {
            slot_id: slot_id.to_string(),
            node,
            coordinate,
            status,
        });
        Ok(())
    }

    fn add_corridor(
        &mut self,
        element: &str,
        level: i32,
        points: &[GridPoint],
        direction: Direction,
    ) -> Result<()> {
        if points.len() < 2 {
            return Err(Error::malformed(element, "corridor needs at least two points"));
        }

        let mut previous: Option<NodeId> = None;
        for (index, point) in points.iter().enumerate() {
            let coordinate = point.on_level(level);
            let id = self.intern(coordinate, NodeRole::Corridor)?;
            self.on_corridor.insert(id);

            if let Some(prev) = previous {
                if prev == id {
                    return Err(Error::malformed(
                        format!("{element} point {index}"),
                        "repeats the previous point",
                    ));
                }
                let distance = self.coordinate(prev)?.planar_distance(&coordinate);
                match direction {
                    Direction::Forward => self.add_edge(prev, id, EdgeKind::Corridor, distance)?,
                    Direction::Backward => self.add_edge(id, prev, EdgeKind::Corridor, distance)?,
                    Direction::Both => {
                        self.add_edge(prev, id, EdgeKind::Corridor, distance)?;
                        self.add_edge(id, prev, EdgeKind::Corridor, distance)?;
                    }
                }
            }
            previous = Some(id);
        }
        Ok(())
    }

    /// Link every named node that is not on a corridor to its nearest corridor
    /// node within `radius`.
    fn connect_named_points(&mut self, radius: f64) -> Result<()> {
        let mut corridor_by_level: BTreeMap<i32, Vec<(GridPoint, NodeId)>> = BTreeMap::new();
        for &id in &self.on_corridor {
            let coordinate = self.coordinate(id)?;
            corridor_by_level
                .entry(coordinate.level)
                .or_default()
                .push((coordinate.point(), id));
        }
        for candidates in corridor_by_level.values_mut() {
            candidates.sort_unstable();
        }

        let pending: Vec<(NodeId, Coordinate)> = self
            .core
            .nodes
            .iter()
            .filter(|node| !self.on_corridor.contains(&node.id))
            .map(|node| (node.id, node.coordinate))
            .collect();

        for (id, coordinate) in pending {
            let nearest = corridor_by_level
                .get(&coordinate.level)
                .and_then(|candidates| nearest_within(candidates, &coordinate, radius));
            match nearest {
                Some((target, distance)) => {
                    self.add_edge(id, target, EdgeKind::Connector, distance)?;
                    self.add_edge(target, id, EdgeKind::Connector, distance)?;
                }
                None => {
                    let role = self.core.nodes[id.index()].role;
                    warn!(
                        %coordinate,
                        role = role.label(),
                        radius,
                        "named point has no corridor within range; left unconnected"
                    );
                }
            }
        }
        Ok(())
    }

    fn add_edge(&mut self, from: NodeId, to: NodeId, kind: EdgeKind, distance: f64) -> Result<()> {
        let count = self.core.nodes.len();
        if from.index() >= count || to.index() >= count {
            return Err(Error::GraphInvariant {
                message: format!("edge {from} -> {to} references a node outside 0..{count}"),
            });
        }
        if !distance.is_finite() || distance < 0.0 {
            return Err(Error::GraphInvariant {
                message: format!("edge {from} -> {to} has invalid weight {distance}"),
            });
        }

        let edges = &mut self.core.adjacency[from.index()];
        if let Some(existing) = edges
            .iter_mut()
            .find(|existing| existing.target == to && existing.kind == kind)
        {
            if distance < existing.distance {
                existing.distance = distance;
            }
            return Ok(());
        }
        edges.push(Edge {
            target: to,
            kind,
            distance,
        });
        self.core.edge_count += 1;
        Ok(())
    }

    fn finish(mut self, building: String) -> Result<Graph> {
        if self.core.nodes.is_empty() {
            return Err(Error::malformed("map", "no navigable points on any level"));
        }

        let mut levels: BTreeMap<i32, Vec<NodeId>> = BTreeMap::new();
        for node in &self.core.nodes {
            levels.entry(node.coordinate.level).or_default().push(node.id);
        }
        for ids in levels.values_mut() {
            ids.sort_by_key(|id| self.core.nodes[id.index()].coordinate.point());
        }
        self.core.levels = levels;

        Ok(Graph {
            building,
            inner: Arc::new(self.core),
        })
    }
}

/// Nearest candidate within `radius`; candidates are sorted by `(x, y)` so the
/// first strict minimum is also the tie-break winner.
fn nearest_within(
    candidates: &[(GridPoint, NodeId)],
    coordinate: &Coordinate,
    radius: f64,
) -> Option<(NodeId, f64)> {
    let mut best: Option<(NodeId, f64)> = None;
    for &(point, id) in candidates {
        let distance = point.on_level(coordinate.level).planar_distance(coordinate);
        if distance > radius {
            continue;
        }
        if best.map_or(true, |(_, current)| distance < current) {
            best = Some((id, distance));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_key_prefers_link() {
        let point = GridPoint::new(2, 2);
        assert_eq!(ramp_key(Some("R1"), point), RampKey::Link("R1".to_string()));
        assert_eq!(ramp_key(None, point), RampKey::Position(point));
    }

    #[test]
    fn nearest_within_breaks_ties_by_lowest_x_then_y() {
        let mut candidates = vec![
            (GridPoint::new(2, 1), NodeId(0)),
            (GridPoint::new(0, 1), NodeId(1)),
            (GridPoint::new(1, 0), NodeId(2)),
            (GridPoint::new(1, 2), NodeId(3)),
        ];
        candidates.sort_unstable();
        let (id, distance) = nearest_within(&candidates, &Coordinate::new(1, 1, 1), 5.0)
            .expect("candidate in range");
        assert_eq!(id, NodeId(1));
        assert!((distance - 1.0).abs() < 1e-12);
    }

    #[test]
    fn nearest_within_respects_radius() {
        let candidates = vec![(GridPoint::new(10, 0), NodeId(0))];
        assert!(nearest_within(&candidates, &Coordinate::new(1, 0, 0), 9.5).is_none());
    }

    #[test]
    fn add_edge_rejects_dangling_endpoints() {
        let mut assembler = Assembler::default();
        let a = assembler
            .intern(Coordinate::new(1, 0, 0), NodeRole::Corridor)
            .expect("intern");
        let err = assembler
            .add_edge(a, NodeId(7), EdgeKind::Corridor, 1.0)
            .expect_err("dangling target");
        assert!(matches!(err, Error::GraphInvariant { .. }));
    }

    #[test]
    fn add_edge_keeps_cheapest_parallel_edge() {
        let mut assembler = Assembler::default();
        let a = assembler
            .intern(Coordinate::new(1, 0, 0), NodeRole::Corridor)
            .expect("intern");
        let b = assembler
            .intern(Coordinate::new(1, 3, 0), NodeRole::Corridor)
            .expect("intern");
        assembler.add_edge(a, b, EdgeKind::Ramp, 4.0).expect("edge");
        assembler.add_edge(a, b, EdgeKind::Ramp, 2.5).expect("edge");
        assert_eq!(assembler.core.adjacency[0].len(), 1);
        assert_eq!(assembler.core.adjacency[0][0].distance, 2.5);
        assert_eq!(assembler.core.edge_count, 1);
    }
}
