//! Request-level entry points used by the mobile app and estimators.
//!
//! Each call builds its own [`WorkingGraph`] over the shared canonical graph,
//! attaches the request's endpoints, and converts search exhaustion into a
//! typed [`Error`] variant.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::attach::WorkingGraph;
use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};
use crate::map::Coordinate;
use crate::path::{nearest_target, shortest_path, PathResult};
use crate::slots::nearest_available_slot;

/// Maximum number of slot id suggestions offered for a typo.
const MAX_SLOT_SUGGESTIONS: usize = 3;

/// Minimum Jaro-Winkler similarity for a slot id to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Walking route between two arbitrary points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathRequest {
    pub start: Coordinate,
    pub goal: Coordinate,
}

impl PathRequest {
    pub fn new(start: Coordinate, goal: Coordinate) -> Self {
        Self { start, goal }
    }
}

/// Planned route returned by the library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub start: Coordinate,
    pub goal: Coordinate,
    pub path: PathResult,
    /// Endpoints that were not graph nodes and were attached for this request.
    pub attached: Vec<Coordinate>,
}

impl RoutePlan {
    pub fn distance(&self) -> f64 {
        self.path.distance
    }

    /// Number of edges in the route.
    pub fn hop_count(&self) -> usize {
        self.path.hop_count()
    }
}

/// Which slots may be chosen by [`find_nearest_slot`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SlotCandidates {
    /// Slots marked `available` in the graph's map snapshot.
    #[default]
    Available,
    /// Slots the caller's latest status feed reports as available.
    Explicit(Vec<String>),
}

/// Nearest-slot query from an entrance or anchor point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRequest {
    pub from: Coordinate,
    pub candidates: SlotCandidates,
}

impl SlotRequest {
    /// Query against the snapshot's available slots.
    pub fn available(from: Coordinate) -> Self {
        Self {
            from,
            candidates: SlotCandidates::Available,
        }
    }

    /// Query against an explicit list of slot ids.
    pub fn explicit<I, S>(from: Coordinate, slot_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            from,
            candidates: SlotCandidates::Explicit(slot_ids.into_iter().map(Into::into).collect()),
        }
    }
}

/// Chosen slot together with the path that leads to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotAssignment {
    pub slot_id: String,
    pub slot: Coordinate,
    pub path: PathResult,
}

/// Closest exit together with the path that leads to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExitAssignment {
    pub exit: Coordinate,
    pub path: PathResult,
}

/// Compute the shortest walking route between two coordinates.
pub fn plan_path(graph: &Graph, request: &PathRequest) -> Result<RoutePlan> {
    let mut working = WorkingGraph::new(graph);
    let start = working.attach(request.start)?;
    let goal = working.attach(request.goal)?;

    let path = shortest_path(&working, start, goal).ok_or(Error::PathNotFound {
        start: request.start,
        goal: request.goal,
    })?;

    info!(
        building = graph.building(),
        start = %request.start,
        goal = %request.goal,
        distance = path.distance,
        hops = path.hop_count(),
        "planned path"
    );

    Ok(RoutePlan {
        start: request.start,
        goal: request.goal,
        path,
        attached: attached_coordinates(&working),
    })
}

/// Find the reachable candidate slot with the shortest walk from `request.from`.
pub fn find_nearest_slot(graph: &Graph, request: &SlotRequest) -> Result<SlotAssignment> {
    let candidates = resolve_candidates(graph, &request.candidates)?;
    if candidates.is_empty() {
        debug!(from = %request.from, "candidate slot set is empty");
        return Err(Error::NoReachableSlot { from: request.from });
    }

    let mut working = WorkingGraph::new(graph);
    let from = working.attach(request.from)?;

    let (slot_node, path) = nearest_available_slot(&working, from, &candidates)
        .ok_or(Error::NoReachableSlot { from: request.from })?;

    let record = graph
        .slots()
        .iter()
        .find(|slot| slot.node == slot_node)
        .ok_or_else(|| Error::GraphInvariant {
            message: format!("search settled on {slot_node}, which is not a slot"),
        })?;

    info!(
        building = graph.building(),
        from = %request.from,
        slot_id = %record.slot_id,
        distance = path.distance,
        "selected nearest slot"
    );

    Ok(SlotAssignment {
        slot_id: record.slot_id.clone(),
        slot: record.coordinate,
        path,
    })
}

/// Find the closest exit by walking distance, e.g. for the trip back from a
/// slot.
pub fn find_nearest_exit(graph: &Graph, from: Coordinate) -> Result<ExitAssignment> {
    let exits: HashSet<NodeId> = graph.exits().map(|node| node.id).collect();
    if exits.is_empty() {
        return Err(Error::NoReachableExit { from });
    }

    let mut working = WorkingGraph::new(graph);
    let start = working.attach(from)?;
    let path = nearest_target(&working, start, &exits).ok_or(Error::NoReachableExit { from })?;
    let exit = path
        .goal()
        .map(|step| step.coordinate)
        .ok_or(Error::EmptyPath)?;

    info!(
        building = graph.building(),
        from = %from,
        exit = %exit,
        distance = path.distance,
        "selected nearest exit"
    );

    Ok(ExitAssignment { exit, path })
}

fn resolve_candidates(graph: &Graph, candidates: &SlotCandidates) -> Result<Vec<NodeId>> {
    match candidates {
        SlotCandidates::Available => Ok(graph.available_slots().map(|slot| slot.node).collect()),
        SlotCandidates::Explicit(ids) => ids
            .iter()
            .map(|slot_id| {
                graph
                    .slot(slot_id)
                    .map(|slot| slot.node)
                    .ok_or_else(|| Error::UnknownSlot {
                        slot_id: slot_id.clone(),
                        suggestions: suggest_slot_ids(graph, slot_id),
                    })
            })
            .collect(),
    }
}

/// Slot ids similar to `slot_id`, best match first.
pub fn suggest_slot_ids(graph: &Graph, slot_id: &str) -> Vec<String> {
    let needle = slot_id.to_lowercase();
    let mut scored: Vec<(f64, &str)> = graph
        .slots()
        .iter()
        .map(|slot| {
            let score = strsim::jaro_winkler(&needle, &slot.slot_id.to_lowercase());
            (score, slot.slot_id.as_str())
        })
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(MAX_SLOT_SUGGESTIONS)
        .map(|(_, id)| id.to_string())
        .collect()
}

fn attached_coordinates(working: &WorkingGraph<'_>) -> Vec<Coordinate> {
    working
        .attached()
        .iter()
        .map(|node| node.coordinate)
        .collect()
}
