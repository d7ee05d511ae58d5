//! # Scene Assembly
//!
//! Samples the store and lays out the draw list.
//!
//! Order: bikes with their two wheels, then tiles, roads, grass under
//! obstacles, traffic lights, destinations, and finally obstacle
//! decorations (sharing their obstacle's matrix).

use parkview_shared::{asset_ids, Mat4};
use parkview_sync::{AnimationSampler, EntityKind, EntityStore};

use crate::camera::CameraView;
use crate::render::{DrawItem, FrameSnapshot, LightUniforms, CLEAR_COLOR};

/// Every asset id the scene can reference.
pub const SCENE_ASSETS: [&str; 11] = [
    asset_ids::BIKE,
    asset_ids::WHEEL,
    asset_ids::GRASS,
    asset_ids::ROAD,
    asset_ids::TRAFFIC_LIGHT,
    asset_ids::DESTINATION,
    asset_ids::TREE1,
    asset_ids::TREE2,
    asset_ids::ROCK1,
    asset_ids::ROCK2,
    asset_ids::TRASH_CAN,
];

/// Builds one frame at blend fraction `t`.
#[must_use]
pub fn build_frame(
    frame: u64,
    store: &EntityStore,
    sampler: &AnimationSampler,
    t: f32,
    camera: &CameraView,
    light: LightUniforms,
) -> FrameSnapshot {
    let vp = camera.view_projection;
    let draw = |asset_id: &'static str, world: Mat4| DrawItem {
        asset_id,
        world,
        world_view_projection: vp * world,
    };

    let mut draws = Vec::with_capacity(store.len() * 2);

    for agent in store.all(EntityKind::Agent) {
        let sampled = sampler.sample(agent, t);
        draws.push(draw(EntityKind::Agent.asset_id(), sampled.model_matrix()));
        draws.extend(
            sampled
                .wheel_matrices()
                .into_iter()
                .map(|m| draw(asset_ids::WHEEL, m)),
        );
    }

    for kind in EntityKind::STATIC {
        for entity in store.all(kind) {
            let sampled = sampler.sample(entity, t);
            draws.push(draw(kind.asset_id(), sampled.model_matrix()));
        }
    }

    for (obstacle, decoration) in store.visible_decorations() {
        let sampled = sampler.sample(obstacle, t);
        draws.push(draw(decoration.asset_id(), sampled.model_matrix()));
    }

    FrameSnapshot {
        frame,
        blend: t,
        clear_color: CLEAR_COLOR,
        camera_position: camera.position,
        view_projection: vp,
        light,
        draws,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraSettings;
    use parkview_shared::{AgentPosition, AgentRoster, Direction, EntityId, MapItem, MapLayout, Vec3};
    use parkview_sync::GridSize;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn item(id: &str, x: f32, z: f32) -> MapItem {
        MapItem {
            id: EntityId::from(id),
            x,
            y: 0.0,
            z,
            direction: None,
        }
    }

    fn scene() -> EntityStore {
        let mut store = EntityStore::new();
        let layout = MapLayout {
            roads: vec![item("r", 0.0, 0.0)],
            obstacles: (0..20).map(|i| item(&format!("o{i}"), i as f32, 3.0)).collect(),
            traffic_lights: vec![item("l", 1.0, 0.0)],
            destinations: vec![item("d", 2.0, 2.0)],
            ..MapLayout::default()
        };
        store.initialize_map(&layout, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        store.upsert_agents(&AgentRoster {
            positions: vec![AgentPosition {
                id: EntityId::from(1),
                x: 4.0,
                y: 0.0,
                z: 4.0,
                direction: Direction::Up,
            }],
        });
        store
    }

    fn camera() -> CameraView {
        CameraSettings::default().view(GridSize { width: 10, height: 10 }, 1.0)
    }

    #[test]
    fn test_draw_counts() {
        let store = scene();
        let decorations = store.visible_decorations().count();
        let frame = build_frame(3, &store, &AnimationSampler::default(), 0.5, &camera(), LightUniforms::default());

        assert_eq!(frame.count(asset_ids::BIKE), 1);
        assert_eq!(frame.count(asset_ids::WHEEL), 2);
        assert_eq!(frame.count(asset_ids::ROAD), 1);
        assert_eq!(frame.count(asset_ids::GRASS), 20);
        assert_eq!(frame.count(asset_ids::TRAFFIC_LIGHT), 1);
        assert_eq!(frame.count(asset_ids::DESTINATION), 1);
        assert_eq!(frame.draws.len(), 3 + 1 + 20 + 1 + 1 + decorations);
        assert_eq!(frame.frame, 3);
    }

    #[test]
    fn test_bike_draw_is_first_and_lifted() {
        let store = scene();
        let frame = build_frame(0, &store, &AnimationSampler::default(), 1.0, &camera(), LightUniforms::default());

        let bike = frame.draws[0];
        assert_eq!(bike.asset_id, asset_ids::BIKE);
        let origin = bike.world.transform_point(Vec3::ZERO);
        assert!((origin - Vec3::new(4.0, 0.25, 4.0)).length() < 1e-6);
        assert_eq!(bike.world_view_projection, frame.view_projection * bike.world);
    }

    #[test]
    fn test_decoration_shares_obstacle_matrix() {
        let store = scene();
        let frame = build_frame(0, &store, &AnimationSampler::default(), 0.0, &camera(), LightUniforms::default());

        // tree1 onwards are props
        let decorated: Vec<_> = frame
            .draws
            .iter()
            .filter(|d| SCENE_ASSETS[6..].contains(&d.asset_id))
            .collect();
        for deco in decorated {
            assert!(frame
                .draws
                .iter()
                .any(|d| d.asset_id == asset_ids::GRASS && d.world == deco.world));
        }
    }
}
