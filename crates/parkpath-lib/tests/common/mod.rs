//! Common test utilities and fixture maps.
//!
//! Fixtures are written as JSON values so they exercise the same parsing path
//! as maps uploaded by the authoring tool.

use parkpath_lib::{build_graph, Coordinate, Graph, MapDescription};
use serde_json::{json, Value};

/// Shorthand for a coordinate.
pub fn c(level: i32, x: u32, y: u32) -> Coordinate {
    Coordinate::new(level, x, y)
}

/// Parse a fixture map; panics if the fixture is invalid.
pub fn map_from(value: Value) -> MapDescription {
    MapDescription::from_json_str(&value.to_string()).expect("fixture map is valid")
}

/// Parse and build a fixture graph.
pub fn graph_from(value: Value) -> Graph {
    build_graph(&map_from(value)).expect("fixture graph builds")
}

/// Four corridor points one unit apart on level 1.
pub fn line_map() -> Value {
    json!({
        "building": "line",
        "levels": [{
            "level": 1,
            "corridors": [{"points": [[0, 0], [1, 0], [2, 0], [3, 0]], "direction": "both"}]
        }]
    })
}

/// Two-level garage joined by a ramp at (2, 2) with cost 1.5.
///
/// Level 1: entrance (0,0), exit (9,0), corridor (0,0)-(2,0)-(2,2)-(9,2)-(9,0),
/// slots A-01 (5,3, occupied) and A-02 (9,3, available).
/// Level 2: corridor (2,2)-(6,2), slot B-01 (6,3, available).
#[allow(dead_code)]
pub fn garage_map() -> Value {
    json!({
        "building": "garage",
        "levels": [
            {
                "level": 1,
                "entrances": [{"x": 0, "y": 0, "type": "pedestrian"}],
                "exits": [{"x": 9, "y": 0}],
                "slots": [
                    {"x": 5, "y": 3, "slot_id": "A-01", "status": "occupied"},
                    {"x": 9, "y": 3, "slot_id": "A-02", "status": "available"}
                ],
                "ramps": [{"x": 2, "y": 2, "cost": 1.5}],
                "corridors": [{"points": [[0, 0], [2, 0], [2, 2], [9, 2], [9, 0]]}],
                "walls": [{"points": [[0, 1], [1, 1]]}]
            },
            {
                "level": 2,
                "slots": [{"x": 6, "y": 3, "slot_id": "B-01", "status": "available"}],
                "ramps": [{"x": 2, "y": 2, "cost": 1.5}],
                "corridors": [{"points": [[2, 2], [6, 2]], "direction": "both"}]
            }
        ]
    })
}

/// Single corridor with two slots on it: S2 four units from the entrance and
/// S1 ten units away.
#[allow(dead_code)]
pub fn slot_row_map() -> Value {
    json!({
        "building": "row",
        "levels": [{
            "level": 1,
            "entrances": [{"x": 0, "y": 0}],
            "slots": [
                {"x": 10, "y": 0, "slot_id": "S1", "status": "available"},
                {"x": 4, "y": 0, "slot_id": "S2", "status": "available"}
            ],
            "corridors": [{"points": [[0, 0], [4, 0], [10, 0]]}]
        }]
    })
}

/// Loop with a one-way shortcut from (0,0) to (5,0); the way back is the
/// long side (0,0)-(0,3)-(5,3)-(5,0).
#[allow(dead_code)]
pub fn one_way_map() -> Value {
    json!({
        "building": "one-way",
        "levels": [{
            "level": 1,
            "corridors": [
                {"points": [[0, 0], [5, 0]], "direction": "forward"},
                {"points": [[0, 0], [0, 3], [5, 3], [5, 0]], "direction": "both"}
            ]
        }]
    })
}

/// 3x3 lattice of bidirectional corridors, spacing 2, with a diagonal.
#[allow(dead_code)]
pub fn lattice_map() -> Value {
    json!({
        "building": "lattice",
        "levels": [{
            "level": 1,
            "corridors": [
                {"points": [[0, 0], [2, 0], [4, 0]]},
                {"points": [[0, 2], [2, 2], [4, 2]]},
                {"points": [[0, 4], [2, 4], [4, 4]]},
                {"points": [[0, 0], [0, 2], [0, 4]]},
                {"points": [[2, 0], [2, 2], [2, 4]]},
                {"points": [[4, 0], [4, 2], [4, 4]]},
                {"points": [[0, 0], [4, 4]]}
            ]
        }]
    })
}
