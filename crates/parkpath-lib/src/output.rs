use std::fmt::Write;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::graph::{EdgeKind, NodeRole};
use crate::map::Coordinate;
use crate::path::PathResult;
use crate::routing::{ExitAssignment, RoutePlan, SlotAssignment};

/// Average pedestrian speed in grid units (metres) per second.
pub const AVERAGE_WALKING_SPEED: f64 = 1.4;

/// Options for turning a path into a [`PathSummary`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormatOptions {
    walking_speed: f64,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            walking_speed: AVERAGE_WALKING_SPEED,
        }
    }
}

impl FormatOptions {
    /// Use a custom walking speed; it must be positive and finite.
    pub fn with_walking_speed(walking_speed: f64) -> Result<Self> {
        if !walking_speed.is_finite() || walking_speed <= 0.0 {
            return Err(Error::InvalidOption {
                option: "walking_speed".to_string(),
                reason: format!("{walking_speed} is not a positive speed"),
            });
        }
        Ok(Self { walking_speed })
    }

    pub fn walking_speed(&self) -> f64 {
        self.walking_speed
    }
}

/// Presentation style for turning a [`PathSummary`] into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    PlainText,
    RichText,
}

/// Step taken during traversal of a path.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteStep {
    pub index: usize,
    pub coordinate: Coordinate,
    pub role: NodeRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<EdgeKind>,
    pub distance: f64,
}

impl RouteStep {
    fn method(&self) -> &'static str {
        match self.via {
            None => "start",
            Some(EdgeKind::Corridor) => "walk",
            Some(EdgeKind::Connector) => "step",
            Some(EdgeKind::Ramp) => "ramp",
            Some(EdgeKind::AdHoc) => "approach",
        }
    }
}

/// Externally consumable form of a computed path.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PathSummary {
    pub coordinates: Vec<Coordinate>,
    pub total_distance: f64,
    /// Seconds at the configured walking speed.
    pub estimated_walk_time: f64,
    pub steps: Vec<RouteStep>,
}

/// Format a path with the default walking speed.
pub fn format_path(path: &PathResult) -> Result<PathSummary> {
    PathSummary::from_path(path, &FormatOptions::default())
}

impl PathSummary {
    /// Convert a [`PathResult`] into a summary. Distance is copied unchanged;
    /// walk time is derived from it.
    pub fn from_path(path: &PathResult, options: &FormatOptions) -> Result<Self> {
        if path.steps.is_empty() {
            return Err(Error::EmptyPath);
        }

        let steps = path
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| RouteStep {
                index,
                coordinate: step.coordinate,
                role: step.role,
                via: step.via,
                distance: step.leg_distance,
            })
            .collect::<Vec<_>>();

        Ok(Self {
            coordinates: path.coordinates(),
            total_distance: path.distance,
            estimated_walk_time: path.distance / options.walking_speed,
            steps,
        })
    }

    /// Summary of a planned route.
    pub fn from_plan(plan: &RoutePlan, options: &FormatOptions) -> Result<Self> {
        Self::from_path(&plan.path, options)
    }

    pub fn start(&self) -> Option<Coordinate> {
        self.coordinates.first().copied()
    }

    pub fn goal(&self) -> Option<Coordinate> {
        self.coordinates.last().copied()
    }

    /// Render the summary using the requested textual mode.
    pub fn render(&self, title: &str, mode: RenderMode) -> String {
        match mode {
            RenderMode::PlainText => self.render_plain(title),
            RenderMode::RichText => self.render_rich(title),
        }
    }

    fn endpoints(&self) -> (String, String) {
        let show =
            |c: Option<Coordinate>| c.map_or_else(|| "<none>".to_string(), |c| c.to_string());
        (show(self.start()), show(self.goal()))
    }

    fn render_plain(&self, title: &str) -> String {
        let (start, goal) = self.endpoints();
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "{title}: {start} -> {goal} ({:.1} m, about {})",
            self.total_distance,
            format_duration(self.estimated_walk_time)
        );
        for step in &self.steps {
            let _ = writeln!(
                buffer,
                "{:>3}: {:<9} {} {:<8} +{:.1}",
                step.index,
                step.method(),
                step.coordinate,
                step.role.label(),
                step.distance
            );
        }
        buffer
    }

    fn render_rich(&self, title: &str) -> String {
        let (start, goal) = self.endpoints();
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "**{title}** _{start} to {goal}_ ({:.1} m, about {})",
            self.total_distance,
            format_duration(self.estimated_walk_time)
        );
        for step in &self.steps {
            let _ = writeln!(
                buffer,
                "* {:>2}. `{}` {} via {} (+{:.1} m)",
                step.index,
                step.coordinate,
                step.role.label(),
                step.method(),
                step.distance
            );
        }
        buffer
    }
}

/// Summary of a nearest-slot decision.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlotSummary {
    pub slot_id: String,
    pub slot: Coordinate,
    pub path: PathSummary,
}

impl SlotSummary {
    pub fn from_assignment(assignment: &SlotAssignment, options: &FormatOptions) -> Result<Self> {
        Ok(Self {
            slot_id: assignment.slot_id.clone(),
            slot: assignment.slot,
            path: PathSummary::from_path(&assignment.path, options)?,
        })
    }
}

/// Summary of a nearest-exit decision.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExitSummary {
    pub exit: Coordinate,
    pub path: PathSummary,
}

impl ExitSummary {
    pub fn from_assignment(assignment: &ExitAssignment, options: &FormatOptions) -> Result<Self> {
        Ok(Self {
            exit: assignment.exit,
            path: PathSummary::from_path(&assignment.path, options)?,
        })
    }
}

/// Render seconds as `42s` or `3m 05s`.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    if total < 60 {
        format!("{total}s")
    } else {
        format!("{}m {:02}s", total / 60, total % 60)
    }
}
