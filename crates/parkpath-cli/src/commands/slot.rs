//! Nearest-slot command handler.

use anyhow::{Context, Result};

use parkpath_lib::{find_nearest_slot, Coordinate, Graph, SlotRequest, SlotSummary};

use crate::commands::CommandContext;
use crate::output::render_slot;

/// Arguments for the nearest-slot command.
#[derive(Debug, Clone)]
pub struct SlotCommandArgs {
    pub from: Coordinate,
    /// Restrict the choice to these slot ids; empty means every slot the map
    /// marks available.
    pub slots: Vec<String>,
}

impl SlotCommandArgs {
    pub fn to_request(&self) -> SlotRequest {
        if self.slots.is_empty() {
            SlotRequest::available(self.from)
        } else {
            SlotRequest::explicit(self.from, self.slots.iter().cloned())
        }
    }
}

pub fn handle_slot_command(
    graph: &Graph,
    context: &CommandContext,
    args: &SlotCommandArgs,
) -> Result<String> {
    let assignment = find_nearest_slot(graph, &args.to_request())
        .with_context(|| format!("failed to find a slot from {}", args.from))?;
    let summary = SlotSummary::from_assignment(&assignment, &context.format_options)?;
    render_slot(&summary, context.format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkpath_lib::SlotCandidates;

    #[test]
    fn empty_slot_list_means_available_slots() {
        let args = SlotCommandArgs {
            from: Coordinate::new(1, 0, 0),
            slots: Vec::new(),
        };
        assert_eq!(args.to_request().candidates, SlotCandidates::Available);
    }

    #[test]
    fn explicit_slot_list_is_passed_through() {
        let args = SlotCommandArgs {
            from: Coordinate::new(1, 0, 0),
            slots: vec!["A-01".to_string(), "B-02".to_string()],
        };
        assert_eq!(
            args.to_request().candidates,
            SlotCandidates::Explicit(vec!["A-01".to_string(), "B-02".to_string()])
        );
    }
}
