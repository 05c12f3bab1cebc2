// Handlers for the CLI subcommands.
//
// Each handler takes an already-built graph and returns the rendered output;
// main.rs owns argument parsing, map loading and printing.

pub mod exit;
pub mod inspect;
pub mod route;
pub mod slot;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use parkpath_lib::{build_graph_with, load_map, FormatOptions, Graph, GraphBuildOptions};

use crate::output::OutputFormat;

/// Environment variable consulted when `--map` is not given.
pub const MAP_ENV: &str = "PARKPATH_MAP";

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext {
    pub format: OutputFormat,
    pub format_options: FormatOptions,
}

/// Pick the map file from the flag, falling back to [`MAP_ENV`].
pub fn resolve_map_path(flag: Option<&Path>) -> Result<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| std::env::var_os(MAP_ENV).map(PathBuf::from))
        .with_context(|| format!("no facility map given; pass --map or set {MAP_ENV}"))
}

/// Load and build the navigation graph for `path`.
pub fn load_graph(path: &Path, options: &GraphBuildOptions) -> Result<Graph> {
    let map = load_map(path)
        .with_context(|| format!("failed to load facility map from {}", path.display()))?;
    let graph = build_graph_with(&map, options)
        .with_context(|| format!("failed to build navigation graph for {}", map.building))?;
    debug!(
        building = graph.building(),
        nodes = graph.node_count(),
        "graph ready"
    );
    Ok(graph)
}

/// Build options with CLI overrides applied.
pub fn build_options(attach_radius: Option<f64>) -> GraphBuildOptions {
    let mut options = GraphBuildOptions::default();
    if let Some(radius) = attach_radius {
        options.attach_radius = radius;
    }
    options
}

/// Format options with an optional walking speed override.
pub fn format_options(walking_speed: Option<f64>) -> Result<FormatOptions> {
    match walking_speed {
        Some(speed) => FormatOptions::with_walking_speed(speed).context("invalid --walking-speed"),
        None => Ok(FormatOptions::default()),
    }
}
