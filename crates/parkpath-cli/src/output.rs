//! Output formatting for command results.
//!
//! Every renderer returns a `String` so the command handlers stay free of
//! I/O; `main` prints the result to stdout.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use parkpath_lib::{ExitSummary, PathSummary, RenderMode, SlotSummary};

/// Selected output style for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text, one line per step.
    #[default]
    Text,
    /// Markdown-flavoured text for chat and notes.
    Rich,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    fn render_mode(self) -> RenderMode {
        match self {
            OutputFormat::Rich => RenderMode::RichText,
            _ => RenderMode::PlainText,
        }
    }
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    text.push('\n');
    Ok(text)
}

pub fn render_route(summary: &PathSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(summary),
        _ => Ok(summary.render("Route", format.render_mode())),
    }
}

pub fn render_slot(summary: &SlotSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(summary),
        OutputFormat::Text => Ok(format!(
            "Nearest slot {} at {}\n{}",
            summary.slot_id,
            summary.slot,
            summary.path.render("Walk", RenderMode::PlainText)
        )),
        OutputFormat::Rich => Ok(format!(
            "Nearest slot **{}** at `{}`\n\n{}",
            summary.slot_id,
            summary.slot,
            summary.path.render("Walk", RenderMode::RichText)
        )),
    }
}

pub fn render_exit(summary: &ExitSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(summary),
        OutputFormat::Text => Ok(format!(
            "Nearest exit at {}\n{}",
            summary.exit,
            summary.path.render("Walk", RenderMode::PlainText)
        )),
        OutputFormat::Rich => Ok(format!(
            "Nearest exit at `{}`\n\n{}",
            summary.exit,
            summary.path.render("Walk", RenderMode::RichText)
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkpath_lib::{format_path, Coordinate, NodeId, NodeRole, PathResult, PathStep};

    fn two_step_summary() -> PathSummary {
        let path = PathResult {
            steps: vec![
                PathStep {
                    node: NodeId(0),
                    coordinate: Coordinate::new(1, 0, 0),
                    role: NodeRole::Entrance,
                    via: None,
                    leg_distance: 0.0,
                },
                PathStep {
                    node: NodeId(1),
                    coordinate: Coordinate::new(1, 0, 7),
                    role: NodeRole::Corridor,
                    via: Some(parkpath_lib::EdgeKind::Corridor),
                    leg_distance: 7.0,
                },
            ],
            distance: 7.0,
        };
        format_path(&path).expect("summary builds")
    }

    #[test]
    fn text_route_has_header_and_steps() {
        let text = render_route(&two_step_summary(), OutputFormat::Text).expect("renders");
        assert!(text.starts_with("Route: (1, 0, 0) -> (1, 0, 7) (7.0 m, about 5s)"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn json_route_round_trips_through_serde() {
        let text = render_route(&two_step_summary(), OutputFormat::Json).expect("renders");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["total_distance"], 7.0);
        assert_eq!(value["steps"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn rich_slot_mentions_the_slot_id() {
        let summary = SlotSummary {
            slot_id: "A-02".to_string(),
            slot: Coordinate::new(1, 0, 7),
            path: two_step_summary(),
        };
        let text = render_slot(&summary, OutputFormat::Rich).expect("renders");
        assert!(text.contains("**A-02**"));
        assert!(text.contains("**Walk**"));
    }
}
