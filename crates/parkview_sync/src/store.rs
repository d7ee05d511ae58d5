//! # Entity State Store
//!
//! Owns every live entity, one collection per [`EntityKind`].
//!
//! ## Lifecycle
//!
//! ```text
//! bootstrap:  initialize_map(layout, rng)   once, static features + decorations
//!             upsert_agents(roster)         first roster, previous == current
//! every sync: upsert_agents(roster)         current → previous, then overwrite
//! every frame: all(kind) / visible_decorations()
//! ```
//!
//! The store is a plain value owned by the frame thread. Nothing in here
//! locks or blocks.

use std::collections::{HashMap, HashSet};
use std::f32::consts::{PI, TAU};

use parkview_shared::{AgentRoster, EntityId, MapItem, MapLayout, Vec3};
use rand::Rng;
use tracing::{debug, warn};

use crate::decoration::draw_decoration;
use crate::entity::{Decoration, Entity, EntityKind};
use crate::error::StoreError;

/// What one roster merge changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Agents seen for the first time
    pub added: usize,
    /// Agents carried over from the previous roster
    pub updated: usize,
    /// Agents that disappeared
    pub removed: usize,
}

/// All scene entities, grouped by kind.
#[derive(Debug, Default)]
pub struct EntityStore {
    collections: [Vec<Entity>; EntityKind::COUNT],
    /// Destination cells, keyed by exact position bits.
    destination_cells: HashSet<[u32; 3]>,
    map_initialized: bool,
}

impl EntityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // AGENTS
    // =========================================================================

    /// Replaces the agent roster.
    ///
    /// Known ids keep their entity: the current transform becomes the previous
    /// one before the new values are written. The previous yaw is then moved
    /// by a full turn when that makes the blend take the shorter arc. New ids
    /// start at rest. Ids missing from `roster` are dropped, and the collection
    /// ends up in roster order.
    pub fn upsert_agents(&mut self, roster: &AgentRoster) -> MergeStats {
        let slot = EntityKind::Agent.index();
        let mut known: HashMap<EntityId, Entity> = std::mem::take(&mut self.collections[slot])
            .into_iter()
            .map(|entity| (entity.id.clone(), entity))
            .collect();

        let mut stats = MergeStats::default();
        let mut seen = HashSet::with_capacity(roster.positions.len());
        let mut next = Vec::with_capacity(roster.positions.len());

        for agent in &roster.positions {
            if !seen.insert(&agent.id) {
                warn!(id = %agent.id, "duplicate agent id in roster, keeping the first");
                continue;
            }

            let position = agent.position();
            let rotation = Vec3::new(0.0, agent.direction.yaw(), 0.0);

            let entity = match known.remove(&agent.id) {
                Some(mut entity) => {
                    entity.previous_position = entity.position;
                    entity.previous_rotation = entity.rotation;
                    entity.position = position;
                    entity.rotation = rotation;
                    entity.previous_rotation.y =
                        shortest_arc_start(entity.previous_rotation.y, rotation.y);
                    stats.updated += 1;
                    entity
                }
                None => {
                    stats.added += 1;
                    Entity::at_rest(agent.id.clone(), EntityKind::Agent, position, rotation)
                }
            };
            next.push(entity);
        }

        stats.removed = known.len();
        self.collections[slot] = next;

        debug!(
            added = stats.added,
            updated = stats.updated,
            removed = stats.removed,
            "merged agent roster"
        );
        stats
    }

    // =========================================================================
    // MAP
    // =========================================================================

    /// Creates every static feature from `layout`. Each obstacle gets one
    /// decoration draw from `rng`, in layout order.
    ///
    /// # Errors
    ///
    /// [`StoreError::MapAlreadyInitialized`] on a second call; the store is
    /// left untouched.
    pub fn initialize_map<R: Rng + ?Sized>(
        &mut self,
        layout: &MapLayout,
        rng: &mut R,
    ) -> Result<(), StoreError> {
        if self.map_initialized {
            return Err(StoreError::MapAlreadyInitialized);
        }

        let categories: [(EntityKind, &[MapItem]); 5] = [
            (EntityKind::Tile, layout.tiles.as_slice()),
            (EntityKind::Road, layout.roads.as_slice()),
            (EntityKind::Obstacle, layout.obstacles.as_slice()),
            (EntityKind::TrafficLight, layout.traffic_lights.as_slice()),
            (EntityKind::Destination, layout.destinations.as_slice()),
        ];

        for (kind, items) in categories {
            let collection = &mut self.collections[kind.index()];
            collection.reserve(items.len());
            for item in items {
                let mut entity = Entity::from_map_item(kind, item);
                if kind == EntityKind::Obstacle {
                    entity.decoration = draw_decoration(rng);
                }
                collection.push(entity);
            }
        }

        self.destination_cells = self.collections[EntityKind::Destination.index()]
            .iter()
            .map(|d| cell_key(d.position))
            .collect();
        self.map_initialized = true;

        debug!(
            tiles = layout.tiles.len(),
            roads = layout.roads.len(),
            obstacles = layout.obstacles.len(),
            traffic_lights = layout.traffic_lights.len(),
            destinations = layout.destinations.len(),
            decorated = self.all(EntityKind::Obstacle).iter().filter(|o| o.decoration.is_some()).count(),
            "map initialized"
        );
        Ok(())
    }

    /// True once [`EntityStore::initialize_map`] has succeeded.
    #[inline]
    #[must_use]
    pub fn is_map_initialized(&self) -> bool {
        self.map_initialized
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Every entity of `kind`, in creation (or roster) order.
    #[inline]
    #[must_use]
    pub fn all(&self, kind: EntityKind) -> &[Entity] {
        &self.collections[kind.index()]
    }

    /// Looks up one entity.
    #[must_use]
    pub fn get(&self, kind: EntityKind, id: &EntityId) -> Option<&Entity> {
        self.all(kind).iter().find(|e| &e.id == id)
    }

    /// Obstacles whose prop should be drawn: decorated, and not sharing a
    /// cell with a destination marker.
    pub fn visible_decorations(&self) -> impl Iterator<Item = (&Entity, Decoration)> + '_ {
        self.all(EntityKind::Obstacle).iter().filter_map(|obstacle| {
            let decoration = obstacle.decoration?;
            (!self.destination_cells.contains(&cell_key(obstacle.position)))
                .then_some((obstacle, decoration))
        })
    }

    /// Total entities across kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.collections.iter().map(Vec::len).sum()
    }

    /// True when the store holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collections.iter().all(Vec::is_empty)
    }
}

/// Start angle for blending from `previous` to `current` along the shorter
/// arc: `previous` shifted by a full turn when the raw gap exceeds half a turn.
#[must_use]
pub fn shortest_arc_start(previous: f32, current: f32) -> f32 {
    let delta = current - previous;
    if delta > PI {
        previous + TAU
    } else if delta < -PI {
        previous - TAU
    } else {
        previous
    }
}

/// Exact-position key; `-0.0` and `0.0` share a cell.
fn cell_key(p: Vec3) -> [u32; 3] {
    [(p.x + 0.0).to_bits(), (p.y + 0.0).to_bits(), (p.z + 0.0).to_bits()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkview_shared::{AgentPosition, Direction};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::f32::consts::FRAC_PI_2;

    fn agent(id: &str, x: f32, direction: Direction) -> AgentPosition {
        AgentPosition {
            id: EntityId::from(id),
            x,
            y: 0.0,
            z: 0.0,
            direction,
        }
    }

    fn roster(agents: Vec<AgentPosition>) -> AgentRoster {
        AgentRoster { positions: agents }
    }

    fn item(id: &str, x: f32, z: f32) -> MapItem {
        MapItem {
            id: EntityId::from(id),
            x,
            y: 0.0,
            z,
            direction: None,
        }
    }

    #[test]
    fn test_new_agents_start_at_rest() {
        let mut store = EntityStore::new();
        let stats = store.upsert_agents(&roster(vec![agent("7", 1.0, Direction::Down)]));

        assert_eq!(stats, MergeStats { added: 1, updated: 0, removed: 0 });
        let e = &store.all(EntityKind::Agent)[0];
        assert_eq!(e.previous_position, e.position);
        assert_eq!(e.previous_rotation, e.rotation);
        assert_eq!(e.rotation.y, PI);
    }

    #[test]
    fn test_existing_agent_shifts_current_to_previous() {
        let mut store = EntityStore::new();
        store.upsert_agents(&roster(vec![agent("7", 0.0, Direction::Up)]));
        let stats = store.upsert_agents(&roster(vec![agent("7", 5.0, Direction::Right)]));

        assert_eq!(stats.updated, 1);
        let e = store.get(EntityKind::Agent, &EntityId::from("7")).unwrap();
        assert_eq!(e.previous_position, Vec3::ZERO);
        assert_eq!(e.position, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(e.previous_rotation.y, 0.0);
        assert_eq!(e.rotation.y, FRAC_PI_2);
        assert!(e.moved());
    }

    #[test]
    fn test_missing_agents_removed_and_roster_order_kept() {
        let mut store = EntityStore::new();
        store.upsert_agents(&roster(vec![
            agent("a", 0.0, Direction::Up),
            agent("b", 0.0, Direction::Up),
            agent("c", 0.0, Direction::Up),
        ]));
        let stats = store.upsert_agents(&roster(vec![
            agent("c", 1.0, Direction::Up),
            agent("d", 1.0, Direction::Up),
            agent("a", 1.0, Direction::Up),
        ]));

        assert_eq!(stats, MergeStats { added: 1, updated: 2, removed: 1 });
        let ids: Vec<_> = store.all(EntityKind::Agent).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["c", "d", "a"]);
    }

    #[test]
    fn test_duplicate_roster_ids_keep_first() {
        let mut store = EntityStore::new();
        store.upsert_agents(&roster(vec![
            agent("a", 1.0, Direction::Up),
            agent("a", 2.0, Direction::Up),
        ]));
        assert_eq!(store.all(EntityKind::Agent).len(), 1);
        assert_eq!(store.all(EntityKind::Agent)[0].position.x, 1.0);
    }

    #[test]
    fn test_shortest_arc_start() {
        let deg = f32::to_radians;
        let adjusted = shortest_arc_start(deg(170.0), deg(-170.0));
        assert!((adjusted - deg(-190.0)).abs() < 1e-5);
        assert!((deg(-170.0) - adjusted).abs() <= PI);

        let back = shortest_arc_start(deg(-170.0), deg(170.0));
        assert!((back - deg(190.0)).abs() < 1e-5);

        assert_eq!(shortest_arc_start(0.0, FRAC_PI_2), 0.0);
        assert_eq!(shortest_arc_start(0.0, PI), 0.0);
    }

    #[test]
    fn test_down_to_left_takes_short_way() {
        let mut store = EntityStore::new();
        store.upsert_agents(&roster(vec![agent("1", 0.0, Direction::Left)]));
        store.upsert_agents(&roster(vec![agent("1", 0.0, Direction::Down)]));

        // -90° → 180° is 270° the long way; previous becomes 270°
        let e = &store.all(EntityKind::Agent)[0];
        assert!((e.previous_rotation.y - 1.5 * PI).abs() < 1e-6);
        assert!((e.rotation.y - e.previous_rotation.y).abs() <= PI);
    }

    #[test]
    fn test_initialize_map_once() {
        let layout = MapLayout {
            roads: vec![item("r1", 0.0, 0.0)],
            obstacles: vec![item("o1", 1.0, 0.0), item("o2", 2.0, 0.0)],
            traffic_lights: vec![MapItem {
                direction: Some(Direction::Left),
                ..item("t1", 3.0, 0.0)
            }],
            destinations: vec![item("d1", 4.0, 0.0)],
            ..MapLayout::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut store = EntityStore::new();

        store.initialize_map(&layout, &mut rng).unwrap();
        assert!(store.is_map_initialized());
        assert_eq!(store.len(), 5);
        assert_eq!(store.all(EntityKind::TrafficLight)[0].rotation.y, -FRAC_PI_2);

        let before: Vec<_> = store.all(EntityKind::Obstacle).iter().map(|o| o.decoration).collect();
        assert_eq!(
            store.initialize_map(&layout, &mut rng),
            Err(StoreError::MapAlreadyInitialized)
        );
        let after: Vec<_> = store.all(EntityKind::Obstacle).iter().map(|o| o.decoration).collect();
        assert_eq!(before, after);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_decorations_stable_across_agent_merges() {
        let layout = MapLayout {
            obstacles: (0..50).map(|i| item(&format!("o{i}"), i as f32, 0.0)).collect(),
            ..MapLayout::default()
        };
        let mut store = EntityStore::new();
        store.initialize_map(&layout, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        let first: Vec<_> = store.all(EntityKind::Obstacle).iter().map(|o| o.decoration).collect();

        for step in 0..5 {
            store.upsert_agents(&roster(vec![agent("a", step as f32, Direction::Right)]));
        }
        let later: Vec<_> = store.all(EntityKind::Obstacle).iter().map(|o| o.decoration).collect();
        assert_eq!(first, later);

        // Same seed, same draws.
        let mut again = EntityStore::new();
        again.initialize_map(&layout, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        let replay: Vec<_> = again.all(EntityKind::Obstacle).iter().map(|o| o.decoration).collect();
        assert_eq!(first, replay);
    }

    #[test]
    fn test_decoration_hidden_under_destination() {
        let layout = MapLayout {
            obstacles: (0..40).map(|i| item(&format!("o{i}"), i as f32, 0.0)).collect(),
            destinations: vec![item("d", 0.0, 0.0)],
            ..MapLayout::default()
        };
        let mut store = EntityStore::new();
        store.initialize_map(&layout, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();

        let visible: Vec<_> = store.visible_decorations().map(|(o, _)| o.id.as_str()).collect();
        assert!(!visible.contains(&"o0"));

        let decorated = store
            .all(EntityKind::Obstacle)
            .iter()
            .filter(|o| o.decoration.is_some() && o.id.as_str() != "o0")
            .count();
        assert_eq!(visible.len(), decorated);
    }

    #[test]
    fn test_negative_zero_matches_destination() {
        assert_eq!(cell_key(Vec3::new(-0.0, 0.0, 1.0)), cell_key(Vec3::new(0.0, 0.0, 1.0)));
    }
}
