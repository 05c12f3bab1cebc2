use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::graph::{EdgeKind, GraphView, NodeId, NodeRole};
use crate::map::Coordinate;

/// One node along a computed path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathStep {
    pub node: NodeId,
    pub coordinate: Coordinate,
    pub role: NodeRole,
    /// Edge used to arrive at this node; `None` for the first step.
    pub via: Option<EdgeKind>,
    /// Weight of the edge used to arrive at this node.
    pub leg_distance: f64,
}

/// Ordered, non-empty walk from start to goal with its total weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    pub steps: Vec<PathStep>,
    pub distance: f64,
}

impl PathResult {
    pub fn start(&self) -> Option<&PathStep> {
        self.steps.first()
    }

    pub fn goal(&self) -> Option<&PathStep> {
        self.steps.last()
    }

    /// Number of edges traversed.
    pub fn hop_count(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    pub fn nodes(&self) -> Vec<NodeId> {
        self.steps.iter().map(|step| step.node).collect()
    }

    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.steps.iter().map(|step| step.coordinate).collect()
    }

    /// How many times an edge of `kind` was used.
    pub fn count_via(&self, kind: EdgeKind) -> usize {
        self.steps
            .iter()
            .filter(|step| step.via == Some(kind))
            .count()
    }
}

/// Run Dijkstra's algorithm from `start`, stopping as soon as `goal` is
/// settled. Returns `None` when `goal` is unreachable or either node is
/// missing from the graph.
pub fn shortest_path<G>(graph: &G, start: NodeId, goal: NodeId) -> Option<PathResult>
where
    G: GraphView + ?Sized,
{
    if !graph.contains(start) || !graph.contains(goal) {
        return None;
    }
    if start == goal {
        return single_step(graph, start);
    }

    let mut search = Search::new(start);
    let reached = search.run(graph, |node| node == goal)?;
    search.reconstruct(graph, reached)
}

/// Expand from `start` until the first node in `targets` is settled.
///
/// This is the closest target by path distance, not by straight-line
/// distance. Equal-cost targets resolve to the lowest node id.
pub fn nearest_target<G>(graph: &G, start: NodeId, targets: &HashSet<NodeId>) -> Option<PathResult>
where
    G: GraphView + ?Sized,
{
    if targets.is_empty() || !graph.contains(start) {
        return None;
    }
    if targets.contains(&start) {
        return single_step(graph, start);
    }

    let mut search = Search::new(start);
    let reached = search.run(graph, |node| targets.contains(&node))?;
    search.reconstruct(graph, reached)
}

fn single_step<G>(graph: &G, node: NodeId) -> Option<PathResult>
where
    G: GraphView + ?Sized,
{
    let found = graph.node(node)?;
    Some(PathResult {
        steps: vec![PathStep {
            node,
            coordinate: found.coordinate,
            role: found.role,
            via: None,
            leg_distance: 0.0,
        }],
        distance: 0.0,
    })
}

#[derive(Debug, Clone, Copy)]
struct Parent {
    node: NodeId,
    kind: EdgeKind,
    distance: f64,
}

/// Mutable state for a single Dijkstra expansion. Lives on the caller's stack,
/// so concurrent searches over one graph share nothing writable.
struct Search {
    start: NodeId,
    distances: HashMap<NodeId, f64>,
    parents: HashMap<NodeId, Parent>,
    settled: HashSet<NodeId>,
    queue: BinaryHeap<QueueEntry>,
}

impl Search {
    fn new(start: NodeId) -> Self {
        let mut distances = HashMap::new();
        let mut queue = BinaryHeap::new();
        distances.insert(start, 0.0);
        queue.push(QueueEntry::new(start, 0.0));
        Self {
            start,
            distances,
            parents: HashMap::new(),
            settled: HashSet::new(),
            queue,
        }
    }

    /// Pop until a node satisfying `is_goal` is settled or the frontier empties.
    fn run<G, F>(&mut self, graph: &G, is_goal: F) -> Option<NodeId>
    where
        G: GraphView + ?Sized,
        F: Fn(NodeId) -> bool,
    {
        while let Some(entry) = self.queue.pop() {
            if !self.settled.insert(entry.node) {
                continue;
            }
            let current_distance = entry.cost.0;

            if is_goal(entry.node) {
                debug!(
                    start = %self.start,
                    goal = %entry.node,
                    distance = current_distance,
                    settled = self.settled.len(),
                    "search reached goal"
                );
                return Some(entry.node);
            }

            for edge in graph.neighbours(entry.node) {
                let next = edge.target;
                if self.settled.contains(&next) {
                    continue;
                }

                let next_cost = current_distance + edge.distance;
                if next_cost < *self.distances.get(&next).unwrap_or(&f64::INFINITY) {
                    self.distances.insert(next, next_cost);
                    self.parents.insert(
                        next,
                        Parent {
                            node: entry.node,
                            kind: edge.kind,
                            distance: edge.distance,
                        },
                    );
                    self.queue.push(QueueEntry::new(next, next_cost));
                }
            }
        }

        debug!(
            start = %self.start,
            settled = self.settled.len(),
            "frontier exhausted without reaching a goal"
        );
        None
    }

    fn reconstruct<G>(&self, graph: &G, goal: NodeId) -> Option<PathResult>
    where
        G: GraphView + ?Sized,
    {
        let mut steps = Vec::new();
        let mut current = goal;
        loop {
            let node = graph.node(current)?;
            let parent = self.parents.get(&current);
            steps.push(PathStep {
                node: current,
                coordinate: node.coordinate,
                role: node.role,
                via: parent.map(|p| p.kind),
                leg_distance: parent.map_or(0.0, |p| p.distance),
            });
            match parent {
                Some(parent) => current = parent.node,
                None if current == self.start => break,
                None => return None,
            }
        }
        steps.reverse();

        // Total is the sum of leg weights in walk order.
        let distance: f64 = steps.iter().map(|step| step.leg_distance).sum();
        Some(PathResult { steps, distance })
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: NodeId,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: NodeId, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost, then by id.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_pops_lowest_cost_first() {
        let mut heap = BinaryHeap::new();
        heap.push(QueueEntry::new(NodeId(1), 5.0));
        heap.push(QueueEntry::new(NodeId(2), 1.5));
        heap.push(QueueEntry::new(NodeId(3), 3.0));

        let order: Vec<_> = std::iter::from_fn(|| heap.pop()).map(|e| e.node).collect();
        assert_eq!(order, vec![NodeId(2), NodeId(3), NodeId(1)]);
    }

    #[test]
    fn equal_costs_pop_lowest_node_id_first() {
        let mut heap = BinaryHeap::new();
        heap.push(QueueEntry::new(NodeId(9), 2.0));
        heap.push(QueueEntry::new(NodeId(4), 2.0));
        heap.push(QueueEntry::new(NodeId(6), 2.0));

        assert_eq!(heap.pop().map(|e| e.node), Some(NodeId(4)));
        assert_eq!(heap.pop().map(|e| e.node), Some(NodeId(6)));
        assert_eq!(heap.pop().map(|e| e.node), Some(NodeId(9)));
    }
}
