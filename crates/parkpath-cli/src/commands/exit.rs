//! Nearest-exit command handler.

use anyhow::{Context, Result};

use parkpath_lib::{find_nearest_exit, Coordinate, ExitSummary, Graph};

use crate::commands::CommandContext;
use crate::output::render_exit;

pub fn handle_exit_command(
    graph: &Graph,
    context: &CommandContext,
    from: Coordinate,
) -> Result<String> {
    let assignment = find_nearest_exit(graph, from)
        .with_context(|| format!("failed to find an exit from {from}"))?;
    let summary = ExitSummary::from_assignment(&assignment, &context.format_options)?;
    render_exit(&summary, context.format)
}
