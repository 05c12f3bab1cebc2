use thiserror::Error;

use crate::map::Coordinate;

/// Convenient result alias for the parking navigation library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The map description is empty, incomplete, or contradicts itself.
    #[error("malformed map at {element}: {reason}")]
    MalformedMap { element: String, reason: String },

    /// An ad-hoc point could not be connected into the graph.
    #[error("point {coordinate} cannot be attached: level has no navigable nodes")]
    UnreachablePoint { coordinate: Coordinate },

    /// Raised when no path exists between two points.
    #[error("no path found between {start} and {goal}")]
    PathNotFound { start: Coordinate, goal: Coordinate },

    /// Raised when none of the candidate slots can be reached.
    #[error("no available slot reachable from {from}")]
    NoReachableSlot { from: Coordinate },

    /// Raised when no exit can be reached from the given point.
    #[error("no exit reachable from {from}")]
    NoReachableExit { from: Coordinate },

    /// Raised when a caller names a slot the map does not contain.
    #[error("unknown slot id: {slot_id}{}", format_suggestions(.suggestions))]
    UnknownSlot {
        slot_id: String,
        suggestions: Vec<String>,
    },

    /// Raised when the registry holds no graph for a building.
    #[error("no navigation graph published for building {building}")]
    UnknownBuilding { building: String },

    /// Internal consistency failure while assembling a graph.
    #[error("graph invariant violated: {message}")]
    GraphInvariant { message: String },

    /// Raised when a tuning option holds a value the engine cannot use.
    #[error("invalid option {option}: {reason}")]
    InvalidOption { option: String, reason: String },

    /// Raised when a computed path lacks any steps.
    #[error("path result was empty")]
    EmptyPath,

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn malformed(element: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedMap {
            element: element.into(),
            reason: reason.into(),
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
