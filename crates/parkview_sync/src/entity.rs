//! # Scene Entities
//!
//! One [`Entity`] per agent or static map feature, holding both the current
//! transform and the one from the previous sync so the sampler can blend.

use parkview_shared::{asset_ids, EntityId, MapItem, Vec3, ENTITY_SCALE};

/// Which collection an entity lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// Moving agent (bike)
    Agent,
    /// Plain ground tile
    Tile,
    /// Drivable road cell
    Road,
    /// Blocked grass cell, may carry a decoration
    Obstacle,
    /// Traffic light with a facing
    TrafficLight,
    /// Agent destination marker
    Destination,
}

impl EntityKind {
    /// Number of kinds.
    pub const COUNT: usize = 6;

    /// Every kind, in draw order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Agent,
        Self::Tile,
        Self::Road,
        Self::Obstacle,
        Self::TrafficLight,
        Self::Destination,
    ];

    /// Kinds created once from the map.
    pub const STATIC: [Self; 5] = [
        Self::Tile,
        Self::Road,
        Self::Obstacle,
        Self::TrafficLight,
        Self::Destination,
    ];

    /// Catalog id of the model drawn for this kind.
    #[must_use]
    pub const fn asset_id(self) -> &'static str {
        match self {
            Self::Agent => asset_ids::BIKE,
            Self::Tile | Self::Obstacle => asset_ids::GRASS,
            Self::Road => asset_ids::ROAD,
            Self::TrafficLight => asset_ids::TRAFFIC_LIGHT,
            Self::Destination => asset_ids::DESTINATION,
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

/// Cosmetic prop placed on an obstacle tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Decoration {
    /// Round tree
    Tree1,
    /// Pine tree
    Tree2,
    /// Small rock
    Rock1,
    /// Large rock
    Rock2,
    /// Trash can
    TrashCan,
}

impl Decoration {
    /// Catalog id of the prop model.
    #[must_use]
    pub const fn asset_id(self) -> &'static str {
        match self {
            Self::Tree1 => asset_ids::TREE1,
            Self::Tree2 => asset_ids::TREE2,
            Self::Rock1 => asset_ids::ROCK1,
            Self::Rock2 => asset_ids::ROCK2,
            Self::TrashCan => asset_ids::TRASH_CAN,
        }
    }
}

/// A live scene object.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    /// Server id, unique within its kind
    pub id: EntityId,
    /// Collection
    pub kind: EntityKind,
    /// Position after the latest sync
    pub position: Vec3,
    /// Position before the latest sync
    pub previous_position: Vec3,
    /// Euler rotation (radians) after the latest sync
    pub rotation: Vec3,
    /// Euler rotation before the latest sync, pre-adjusted for the shorter arc
    pub previous_rotation: Vec3,
    /// Model scale
    pub scale: Vec3,
    /// Obstacle prop, drawn once and kept
    pub decoration: Option<Decoration>,
}

impl Entity {
    /// Entity at rest: previous equals current.
    #[must_use]
    pub fn at_rest(id: EntityId, kind: EntityKind, position: Vec3, rotation: Vec3) -> Self {
        Self {
            id,
            kind,
            position,
            previous_position: position,
            rotation,
            previous_rotation: rotation,
            scale: Vec3::splat(ENTITY_SCALE),
            decoration: None,
        }
    }

    /// Static feature built from a map item. Only traffic lights take a
    /// rotation from their direction.
    #[must_use]
    pub fn from_map_item(kind: EntityKind, item: &MapItem) -> Self {
        let yaw = match (kind, item.direction) {
            (EntityKind::TrafficLight, Some(direction)) => direction.yaw(),
            _ => 0.0,
        };
        Self::at_rest(item.id.clone(), kind, item.position(), Vec3::new(0.0, yaw, 0.0))
    }

    /// True when the latest sync moved the entity.
    #[inline]
    #[must_use]
    pub fn moved(&self) -> bool {
        self.previous_position != self.position
    }
}
