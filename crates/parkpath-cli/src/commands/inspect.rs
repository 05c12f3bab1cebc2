//! Inspect command: structural overview of a built graph.

use std::fmt::Write;

use anyhow::Result;
use serde::Serialize;

use parkpath_lib::{Coordinate, Graph};

use crate::commands::CommandContext;
use crate::output::{to_json, OutputFormat};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelReport {
    pub level: i32,
    pub nodes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphReport {
    pub building: String,
    pub nodes: usize,
    pub edges: usize,
    pub levels: Vec<LevelReport>,
    pub slots: usize,
    pub available_slots: usize,
    pub entrances: Vec<Coordinate>,
    pub exits: Vec<Coordinate>,
}

impl GraphReport {
    pub fn from_graph(graph: &Graph) -> Self {
        Self {
            building: graph.building().to_string(),
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            levels: graph
                .levels()
                .map(|level| LevelReport {
                    level,
                    nodes: graph.level_nodes(level).len(),
                })
                .collect(),
            slots: graph.slots().len(),
            available_slots: graph.available_slots().count(),
            entrances: graph.entrances().map(|node| node.coordinate).collect(),
            exits: graph.exits().map(|node| node.coordinate).collect(),
        }
    }

    fn render(&self, rich: bool) -> String {
        let list = |points: &[Coordinate]| {
            if points.is_empty() {
                "none".to_string()
            } else {
                points
                    .iter()
                    .map(Coordinate::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        };
        let bullet = if rich { "* " } else { "  " };

        let mut buffer = String::new();
        if rich {
            let _ = writeln!(
                buffer,
                "**{}**: {} nodes, {} edges",
                self.building, self.nodes, self.edges
            );
        } else {
            let _ = writeln!(
                buffer,
                "Building {}: {} nodes, {} edges",
                self.building, self.nodes, self.edges
            );
        }
        for level in &self.levels {
            let _ = writeln!(buffer, "{bullet}level {}: {} nodes", level.level, level.nodes);
        }
        let _ = writeln!(
            buffer,
            "Slots: {} of {} available",
            self.available_slots, self.slots
        );
        let _ = writeln!(buffer, "Entrances: {}", list(&self.entrances));
        let _ = writeln!(buffer, "Exits: {}", list(&self.exits));
        buffer
    }
}

pub fn handle_inspect_command(graph: &Graph, context: &CommandContext) -> Result<String> {
    let report = GraphReport::from_graph(graph);
    match context.format {
        OutputFormat::Json => to_json(&report),
        OutputFormat::Text => Ok(report.render(false)),
        OutputFormat::Rich => Ok(report.render(true)),
    }
}
