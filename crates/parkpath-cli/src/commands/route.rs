//! Route command handler for walking paths between two points.

use anyhow::{Context, Result};

use parkpath_lib::{plan_path, Coordinate, Graph, PathRequest, PathSummary};

use crate::commands::CommandContext;
use crate::output::render_route;

/// Arguments for the route command.
#[derive(Debug, Clone, Copy)]
pub struct RouteCommandArgs {
    pub from: Coordinate,
    pub to: Coordinate,
}

impl RouteCommandArgs {
    pub fn to_request(&self) -> PathRequest {
        PathRequest::new(self.from, self.to)
    }
}

pub fn handle_route_command(
    graph: &Graph,
    context: &CommandContext,
    args: &RouteCommandArgs,
) -> Result<String> {
    let plan = plan_path(graph, &args.to_request())
        .with_context(|| format!("failed to plan a route from {} to {}", args.from, args.to))?;
    let summary = PathSummary::from_plan(&plan, &context.format_options)?;
    render_route(&summary, context.format)
}
