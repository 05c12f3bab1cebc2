//! Process-wide holder of the current navigation graph per building.
//!
//! Rebuilding publishes a new `Arc<Graph>` that replaces the old one in a
//! single write. Queries take a snapshot at their start and keep using it even
//! if a newer graph is published while they run.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::error::{Error, Result};
use crate::graph::{build_graph_with, Graph, GraphBuildOptions};
use crate::map::MapDescription;

/// Current graph snapshot for every known building.
#[derive(Debug, Default)]
pub struct GraphRegistry {
    graphs: RwLock<HashMap<String, Arc<Graph>>>,
}

impl GraphRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the graph for `graph.building()`, returning the previous one.
    pub fn publish(&self, graph: impl Into<Arc<Graph>>) -> Option<Arc<Graph>> {
        let graph: Arc<Graph> = graph.into();
        let building = graph.building().to_string();
        let nodes = graph.node_count();
        let edges = graph.edge_count();
        let previous = self
            .graphs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(building.clone(), graph);
        info!(
            %building,
            nodes,
            edges,
            replaced = previous.is_some(),
            "published navigation graph"
        );
        previous
    }

    /// Build a graph from `map` and publish it. A failed build leaves the
    /// current snapshot in place.
    pub fn rebuild(&self, map: &MapDescription, options: &GraphBuildOptions) -> Result<Arc<Graph>> {
        let graph = Arc::new(build_graph_with(map, options)?);
        self.publish(Arc::clone(&graph));
        Ok(graph)
    }

    /// The graph currently published for `building`.
    pub fn snapshot(&self, building: &str) -> Result<Arc<Graph>> {
        self.graphs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(building)
            .cloned()
            .ok_or_else(|| Error::UnknownBuilding {
                building: building.to_string(),
            })
    }

    /// Remove the graph for `building`.
    pub fn remove(&self, building: &str) -> Option<Arc<Graph>> {
        self.graphs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(building)
    }

    /// Known building identifiers, sorted.
    pub fn buildings(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .graphs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}
