//! JSON payloads exchanged with the park simulation server.
//!
//! Every payload is a plain serde struct with required fields. A payload that
//! is missing `id` or a coordinate is rejected at deserialization instead of
//! leaking `undefined` into the entity store.

use crate::math::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned entity identifier.
///
/// The server sends ids either as JSON strings (`"r_42"`) or as integers;
/// both are normalized to text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawEntityId", into = "String")]
pub struct EntityId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntityId {
    Text(String),
    Number(i64),
}

impl From<RawEntityId> for EntityId {
    fn from(raw: RawEntityId) -> Self {
        match raw {
            RawEntityId::Text(s) => Self(s),
            RawEntityId::Number(n) => Self(n.to_string()),
        }
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl EntityId {
    /// Creates an id from anything string-like.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrowed text form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<u32> for EntityId {
    fn from(n: u32) -> Self {
        Self(n.to_string())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Heading reported by the server for agents and traffic lights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards -Z on screen
    Up,
    /// Towards +Z on screen
    Down,
    /// Towards -X
    Left,
    /// Towards +X
    Right,
    /// Missing or unrecognized heading
    #[default]
    #[serde(other)]
    Unknown,
}

impl Direction {
    /// Rotation about Y (radians) for a model facing this direction.
    ///
    /// `Right → +90°`, `Left → −90°`, `Down → 180°`, anything else `0°`.
    #[inline]
    #[must_use]
    pub fn yaw(self) -> f32 {
        match self {
            Self::Right => std::f32::consts::FRAC_PI_2,
            Self::Left => -std::f32::consts::FRAC_PI_2,
            Self::Down => std::f32::consts::PI,
            Self::Up | Self::Unknown => 0.0,
        }
    }
}

/// One agent in a roster payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentPosition {
    /// Agent id, stable while the agent lives
    pub id: EntityId,
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
    /// Z coordinate
    pub z: f32,
    /// Heading, `Unknown` when absent
    #[serde(default)]
    pub direction: Direction,
}

impl AgentPosition {
    /// Position as a vector.
    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// `getAgents` response: the full current roster.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentRoster {
    /// Every live agent
    pub positions: Vec<AgentPosition>,
}

/// One static map feature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapItem {
    /// Feature id
    pub id: EntityId,
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
    /// Z coordinate
    pub z: f32,
    /// Facing, only meaningful for traffic lights
    #[serde(default)]
    pub direction: Option<Direction>,
}

impl MapItem {
    /// Position as a vector.
    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Categorized static map. Missing categories deserialize as empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapLayout {
    /// Plain ground tiles
    #[serde(default)]
    pub tiles: Vec<MapItem>,
    /// Blocked cells (grass, decorated)
    #[serde(default)]
    pub obstacles: Vec<MapItem>,
    /// Drivable road cells
    #[serde(default)]
    pub roads: Vec<MapItem>,
    /// Traffic lights with facing
    #[serde(default, alias = "trafficLights")]
    pub traffic_lights: Vec<MapItem>,
    /// Agent destinations
    #[serde(default)]
    pub destinations: Vec<MapItem>,
}

impl MapLayout {
    /// Total number of features across categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
            + self.obstacles.len()
            + self.roads.len()
            + self.traffic_lights.len()
            + self.destinations.len()
    }

    /// True when no category has any feature.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `getMap` response wrapper.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapResponse {
    /// The layout
    pub map: MapLayout,
}

/// `init` response: model created, grid size.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InitResponse {
    /// Human-readable status
    #[serde(default)]
    pub message: String,
    /// Grid width in cells
    #[serde(default)]
    pub width: u32,
    /// Grid height in cells
    #[serde(default)]
    pub height: u32,
}

/// `update` response: the model advanced one step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepResponse {
    /// Human-readable status
    #[serde(default)]
    pub message: String,
    /// Server step counter
    #[serde(default, rename = "currentStep")]
    pub current_step: u64,
    /// False once the simulation has ended
    #[serde(default = "default_running")]
    pub running: bool,
}

fn default_running() -> bool {
    true
}

impl Default for StepResponse {
    fn default() -> Self {
        Self {
            message: String::new(),
            current_step: 0,
            running: true,
        }
    }
}
