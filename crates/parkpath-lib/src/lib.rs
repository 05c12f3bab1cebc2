//! Parking facility navigation library entry points.
//!
//! This crate turns a facility map description into a multi-level navigation
//! graph, attaches ad-hoc points such as live entrance positions, and runs
//! shortest-path searches for walking routes and nearest-slot selection.
//! Higher-level consumers (CLI, app backends) should only depend on the
//! functions exported here instead of reimplementing behavior.
//!

pub mod attach;
pub mod error;
pub mod graph;
pub mod map;
pub mod output;
pub mod path;
pub mod registry;
pub mod routing;
pub mod slots;

pub use attach::{attach, WorkingGraph};
pub use error::{Error, Result};
pub use graph::{
    build_graph, build_graph_with, Edge, EdgeKind, Graph, GraphBuildOptions, GraphView, Node,
    NodeId, NodeRole, SlotRecord,
};
pub use map::{
    load_map, Coordinate, CorridorSegment, Direction, Entrance, Exit, GridPoint, Level,
    MapDescription, MapElement, Ramp, Slot, SlotStatus, WallSegment,
};
pub use output::{
    format_path, ExitSummary, FormatOptions, PathSummary, RenderMode, RouteStep, SlotSummary,
    AVERAGE_WALKING_SPEED,
};
pub use path::{nearest_target, shortest_path, PathResult, PathStep};
pub use registry::GraphRegistry;
pub use routing::{
    find_nearest_exit, find_nearest_slot, plan_path, ExitAssignment, PathRequest, RoutePlan,
    SlotAssignment, SlotCandidates, SlotRequest,
};
pub use slots::nearest_available_slot;
