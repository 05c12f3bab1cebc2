//! Facility map descriptions.
//!
//! A map arrives from the authoring collaborator as JSON with loosely typed
//! per-element fields. Parsing converts it into [`MapDescription`], where each
//! element is a [`MapElement`] variant with an explicit field set. Every
//! required field is checked here so that absence is reported as
//! [`Error::MalformedMap`] naming the element instead of being defaulted.
//! Elements are decoded one at a time from a parsed [`Value`] so that type
//! errors and unknown fields are charged to the element as well.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

/// Grid location of a point inside a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub level: i32,
    pub x: u32,
    pub y: u32,
}

impl Coordinate {
    pub fn new(level: i32, x: u32, y: u32) -> Self {
        Self { level, x, y }
    }

    /// Euclidean distance between the `(x, y)` components, ignoring level.
    pub fn planar_distance(&self, other: &Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// The `(x, y)` projection of this coordinate.
    pub fn point(&self) -> GridPoint {
        GridPoint {
            x: self.x,
            y: self.y,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.level, self.x, self.y)
    }
}

impl FromStr for Coordinate {
    type Err = String;

    /// Parse `level,x,y` (whitespace around parts is ignored).
    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        let [level, x, y] = parts.as_slice() else {
            return Err(format!("expected LEVEL,X,Y but got '{value}'"));
        };
        let level = level
            .parse::<i32>()
            .map_err(|_| format!("invalid level '{level}'"))?;
        let x = x
            .parse::<u32>()
            .map_err(|_| format!("invalid x '{x}' (must be a non-negative integer)"))?;
        let y = y
            .parse::<u32>()
            .map_err(|_| format!("invalid y '{y}' (must be a non-negative integer)"))?;
        Ok(Coordinate::new(level, x, y))
    }
}

/// `(x, y)` cell index on a single level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GridPoint {
    pub x: u32,
    pub y: u32,
}

impl GridPoint {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn on_level(self, level: i32) -> Coordinate {
        Coordinate::new(level, self.x, self.y)
    }
}

/// Occupancy state of a parking slot, owned by the status collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    Occupied,
    Allocated,
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SlotStatus::Available => "available",
            SlotStatus::Occupied => "occupied",
            SlotStatus::Allocated => "allocated",
        };
        f.write_str(value)
    }
}

/// Traversal constraint carried by a corridor segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Walkable only from earlier points to later points of the polyline.
    Forward,
    /// Walkable only from later points to earlier points of the polyline.
    Backward,
    #[default]
    Both,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entrance {
    pub point: GridPoint,
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exit {
    pub point: GridPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub point: GridPoint,
    pub slot_id: String,
    pub status: SlotStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ramp {
    pub point: GridPoint,
    /// Explicit partner key shared with the ramp end on the adjacent level.
    pub link: Option<String>,
    /// Traversal cost of the ramp edge, when the author supplied one.
    pub cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorridorSegment {
    pub points: Vec<GridPoint>,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WallSegment {
    pub start: GridPoint,
    pub end: GridPoint,
}

/// One authored element of a level.
#[derive(Debug, Clone, PartialEq)]
pub enum MapElement {
    Entrance(Entrance),
    Exit(Exit),
    Slot(Slot),
    Ramp(Ramp),
    Corridor(CorridorSegment),
    Wall(WallSegment),
}

/// All elements authored for one level of the facility.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub level: i32,
    pub elements: Vec<MapElement>,
}

impl Level {
    pub fn new(level: i32) -> Self {
        Self {
            level,
            elements: Vec::new(),
        }
    }

    pub fn with(mut self, element: MapElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn entrances(&self) -> impl Iterator<Item = &Entrance> {
        self.elements.iter().filter_map(|element| match element {
            MapElement::Entrance(entrance) => Some(entrance),
            _ => None,
        })
    }

    pub fn exits(&self) -> impl Iterator<Item = &Exit> {
        self.elements.iter().filter_map(|element| match element {
            MapElement::Exit(exit) => Some(exit),
            _ => None,
        })
    }

    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.elements.iter().filter_map(|element| match element {
            MapElement::Slot(slot) => Some(slot),
            _ => None,
        })
    }

    pub fn ramps(&self) -> impl Iterator<Item = &Ramp> {
        self.elements.iter().filter_map(|element| match element {
            MapElement::Ramp(ramp) => Some(ramp),
            _ => None,
        })
    }

    pub fn corridors(&self) -> impl Iterator<Item = &CorridorSegment> {
        self.elements.iter().filter_map(|element| match element {
            MapElement::Corridor(corridor) => Some(corridor),
            _ => None,
        })
    }

    pub fn walls(&self) -> impl Iterator<Item = &WallSegment> {
        self.elements.iter().filter_map(|element| match element {
            MapElement::Wall(wall) => Some(wall),
            _ => None,
        })
    }
}

/// Validated map snapshot for one building.
#[derive(Debug, Clone, PartialEq)]
pub struct MapDescription {
    pub building: String,
    pub levels: Vec<Level>,
}

impl MapDescription {
    pub fn new(building: impl Into<String>) -> Self {
        Self {
            building: building.into(),
            levels: Vec::new(),
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.levels.push(level);
        self
    }

    /// Parse and validate a JSON map snapshot.
    ///
    /// Only JSON syntax errors surface as [`Error::Json`]. A value of the
    /// wrong type, an unknown field or an unknown enum name is reported as
    /// [`Error::MalformedMap`] against the element that carries it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(json)?;
        let raw: RawMap = decode("map", document)?;
        raw.validate()
    }

    /// Total number of authored elements across every level.
    pub fn element_count(&self) -> usize {
        self.levels.iter().map(|level| level.elements.len()).sum()
    }
}

/// Read a JSON map snapshot from disk.
pub fn load_map(path: &Path) -> Result<MapDescription> {
    let contents = fs::read_to_string(path)?;
    let map = MapDescription::from_json_str(&contents)?;
    debug!(
        path = %path.display(),
        building = %map.building,
        levels = map.levels.len(),
        elements = map.element_count(),
        "loaded map description"
    );
    Ok(map)
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMap {
    building: Option<String>,
    levels: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLevel {
    level: Option<i32>,
    #[serde(default)]
    entrances: Vec<Value>,
    #[serde(default)]
    exits: Vec<Value>,
    #[serde(default)]
    slots: Vec<Value>,
    #[serde(default)]
    ramps: Vec<Value>,
    #[serde(default)]
    corridors: Vec<Value>,
    #[serde(default)]
    walls: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntrance {
    x: Option<i64>,
    y: Option<i64>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawExit {
    x: Option<i64>,
    y: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSlot {
    x: Option<i64>,
    y: Option<i64>,
    slot_id: Option<String>,
    status: Option<SlotStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRamp {
    x: Option<i64>,
    y: Option<i64>,
    link: Option<String>,
    cost: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCorridor {
    points: Option<Vec<Value>>,
    direction: Option<Direction>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWall {
    points: Option<Vec<Value>>,
}

impl RawMap {
    fn validate(self) -> Result<MapDescription> {
        let building = self
            .building
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| Error::malformed("map", "missing building identifier"))?;
        let raw_levels = self
            .levels
            .ok_or_else(|| Error::malformed("map", "missing levels"))?;

        let mut levels = Vec::with_capacity(raw_levels.len());
        for (index, value) in raw_levels.into_iter().enumerate() {
            let raw: RawLevel = decode(&format!("levels[{index}]"), value)?;
            levels.push(raw.validate(index)?);
        }

        Ok(MapDescription { building, levels })
    }
}

impl RawLevel {
    fn validate(self, index: usize) -> Result<Level> {
        let level = self
            .level
            .ok_or_else(|| Error::malformed(format!("levels[{index}]"), "missing level"))?;
        let scope = format!("level {level}");
        let mut elements = Vec::new();

        for (i, value) in self.entrances.into_iter().enumerate() {
            let element = format!("{scope} entrance {i}");
            let raw: RawEntrance = decode(&element, value)?;
            let point = grid_point(&element, raw.x, raw.y)?;
            elements.push(MapElement::Entrance(Entrance {
                point,
                kind: raw.kind,
            }));
        }

        for (i, value) in self.exits.into_iter().enumerate() {
            let element = format!("{scope} exit {i}");
            let raw: RawExit = decode(&element, value)?;
            let point = grid_point(&element, raw.x, raw.y)?;
            elements.push(MapElement::Exit(Exit { point }));
        }

        for (i, value) in self.slots.into_iter().enumerate() {
            let element = format!("{scope} slot {i}");
            let raw: RawSlot = decode(&element, value)?;
            let point = grid_point(&element, raw.x, raw.y)?;
            let slot_id = raw
                .slot_id
                .filter(|id| !id.trim().is_empty())
                .ok_or_else(|| Error::malformed(&element, "missing slot_id"))?;
            let status = raw
                .status
                .ok_or_else(|| Error::malformed(&element, "missing status"))?;
            elements.push(MapElement::Slot(Slot {
                point,
                slot_id,
                status,
            }));
        }

        for (i, value) in self.ramps.into_iter().enumerate() {
            let element = format!("{scope} ramp {i}");
            let raw: RawRamp = decode(&element, value)?;
            let point = grid_point(&element, raw.x, raw.y)?;
            elements.push(MapElement::Ramp(Ramp {
                point,
                link: raw.link,
                cost: raw.cost,
            }));
        }

        for (i, value) in self.corridors.into_iter().enumerate() {
            let element = format!("{scope} corridor {i}");
            let raw: RawCorridor = decode(&element, value)?;
            let raw_points = raw
                .points
                .ok_or_else(|| Error::malformed(&element, "missing points"))?;
            let points = raw_points
                .into_iter()
                .enumerate()
                .map(|(p, pair)| point_value(&format!("{element} point {p}"), pair))
                .collect::<Result<Vec<_>>>()?;
            elements.push(MapElement::Corridor(CorridorSegment {
                points,
                direction: raw.direction.unwrap_or_default(),
            }));
        }

        for (i, value) in self.walls.into_iter().enumerate() {
            let element = format!("{scope} wall {i}");
            let raw: RawWall = decode(&element, value)?;
            let raw_points = raw
                .points
                .ok_or_else(|| Error::malformed(&element, "missing points"))?;
            let Ok([start, end]) = <[Value; 2]>::try_from(raw_points) else {
                return Err(Error::malformed(&element, "expected exactly two points"));
            };
            elements.push(MapElement::Wall(WallSegment {
                start: point_value(&format!("{element} point 0"), start)?,
                end: point_value(&format!("{element} point 1"), end)?,
            }));
        }

        Ok(Level { level, elements })
    }
}

/// Deserialize one element, charging any type or field error to `element`.
fn decode<T: DeserializeOwned>(element: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|err| Error::malformed(element, err.to_string()))
}

fn point_value(element: &str, value: Value) -> Result<GridPoint> {
    let pair: Vec<i64> = decode(element, value)?;
    pair_point(element, &pair)
}

fn grid_point(element: &str, x: Option<i64>, y: Option<i64>) -> Result<GridPoint> {
    let x = x.ok_or_else(|| Error::malformed(element, "missing x"))?;
    let y = y.ok_or_else(|| Error::malformed(element, "missing y"))?;
    Ok(GridPoint {
        x: grid_index(element, "x", x)?,
        y: grid_index(element, "y", y)?,
    })
}

fn pair_point(element: &str, pair: &[i64]) -> Result<GridPoint> {
    match pair {
        [x, y] => grid_point(element, Some(*x), Some(*y)),
        [_] => Err(Error::malformed(element, "missing y")),
        [] => Err(Error::malformed(element, "missing x and y")),
        _ => Err(Error::malformed(
            element,
            format!("expected [x, y] but got {} values", pair.len()),
        )),
    }
}

fn grid_index(element: &str, axis: &str, value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        Error::malformed(
            element,
            format!("{axis} = {value} is not a valid non-negative grid index"),
        )
    })
}
