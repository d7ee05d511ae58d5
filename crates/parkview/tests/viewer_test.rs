//! # Viewer Tests
//!
//! The full pipeline: in-memory model documents, scripted server, a
//! recording sink in place of the GPU.
//!
//! Run with: cargo test -p parkview --test viewer_test

use std::collections::HashMap;

use parkview::assets::{AssetCatalog, AssetError};
use parkview::shared::{asset_ids, AgentPosition, AgentRoster, Direction, EntityId, MapItem, MapLayout, Vec3};
use parkview::sync::{Endpoint, EntityKind, ScriptedTransport, SyncState};
use parkview::{
    ExitReason, FrameSnapshot, ParkviewConfig, RenderSink, SinkControl, Viewer, ViewerError, SCENE_ASSETS,
};

const MATERIAL: &str = "newmtl Paint\nNs 250\nKa 0.1 0.1 0.1\nKd 0.5 0.5 0.5\nKs 1 1 1\n";
const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 0 1\nvn 0 1 0\nusemtl Paint\nf 1//1 2//1 3//1\n";

/// Keeps every frame; optionally asks to close after `close_after` frames.
#[derive(Default)]
struct RecordingSink {
    frames: Vec<FrameSnapshot>,
    close_after: Option<usize>,
}

impl RenderSink for RecordingSink {
    fn aspect_ratio(&self) -> f32 {
        1.0
    }

    fn present(&mut self, frame: &FrameSnapshot) -> SinkControl {
        self.frames.push(frame.clone());
        match self.close_after {
            Some(n) if self.frames.len() >= n => SinkControl::Exit,
            _ => SinkControl::Continue,
        }
    }
}

fn catalog_without(skip: &[&str]) -> AssetCatalog {
    AssetCatalog::from_documents(
        SCENE_ASSETS
            .iter()
            .filter(|id| !skip.contains(id))
            .map(|&id| (id, TRIANGLE, MATERIAL)),
    )
    .unwrap()
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

fn bike(x: f32) -> AgentRoster {
    AgentRoster {
        positions: vec![AgentPosition {
            id: EntityId::from(7),
            x,
            y: 0.0,
            z: 0.0,
            direction: Direction::Right,
        }],
    }
}

fn server() -> ScriptedTransport {
    let map = MapLayout {
        roads: vec![item("r0", 0.0, 0.0), item("r1", 1.0, 0.0)],
        obstacles: (0..30).map(|i| item(&format!("o{i}"), i as f32, 4.0)).collect(),
        destinations: vec![item("d0", 3.0, 4.0)],
        ..MapLayout::default()
    };
    let transport = ScriptedTransport::new(8, 8, map, bike(0.0));
    transport.push_roster(bike(5.0));
    transport
}

fn config(extra: &str) -> ParkviewConfig {
    ParkviewConfig::from_toml_str(&format!(
        "[animation]\ntarget_fps = 1000\n{extra}\n[decorations]\nseed = 11\n"
    ))
    .unwrap()
}

fn viewer(extra: &str, sink: RecordingSink) -> Viewer<ScriptedTransport, RecordingSink> {
    let mut viewer = Viewer::new(&config(extra), catalog_without(&[]), server(), sink).unwrap();
    viewer.bootstrap().unwrap();
    viewer
}

#[test]
fn frame_limit_stops_the_loop() {
    let mut viewer = viewer("max_frames = 45", RecordingSink::default());
    assert_eq!(viewer.run(), ExitReason::FrameLimit);

    let frames = &viewer.sink().frames;
    assert_eq!(frames.len(), 45);
    assert!(frames.iter().all(|f| f.count(asset_ids::BIKE) == 1));
    assert!(frames.iter().all(|f| f.count(asset_ids::WHEEL) == 2));
    assert!(frames.iter().all(|f| f.count(asset_ids::ROAD) == 2));

    // blend advances one thirtieth per frame until the first merge
    assert_eq!(frames[0].blend, 0.0);
    assert_eq!(frames[15].blend, 0.5);
    assert_eq!(viewer.engine().stats().requests, 1);
    assert_eq!(viewer.frame_stats().frames_recorded, 45);
    viewer.shutdown();
}

#[test]
fn bike_glides_between_steps() {
    let mut viewer = viewer("frames_per_sync = 4\nmax_frames = 400", RecordingSink::default());

    // run until the roster at x = 5 has been merged
    while viewer.engine().stats().merges == 0 {
        viewer.tick();
        assert!(viewer.sink().frames.len() < 400, "step never merged");
    }
    let bike = viewer.store().get(EntityKind::Agent, &EntityId::from(7)).unwrap();
    assert_eq!(bike.previous_position, Vec3::ZERO);
    assert_eq!(bike.position, Vec3::new(5.0, 0.0, 0.0));

    // the merge frame starts the blend at the old position
    let x_of = |frame: &FrameSnapshot| frame.draws[0].world.transform_point(Vec3::ZERO).x;
    assert_eq!(x_of(viewer.sink().frames.last().unwrap()), 0.0);

    // the following frames walk the bike towards x = 5
    let xs: Vec<f32> = (0..5)
        .map(|_| {
            viewer.tick();
            x_of(viewer.sink().frames.last().unwrap())
        })
        .collect();
    assert!(xs.windows(2).all(|w| w[0] <= w[1]), "{xs:?}");
    assert!(xs[0] > 0.0);
    assert!((xs[4] - 5.0).abs() < 1e-5);
    viewer.shutdown();
}

#[test]
fn exits_once_the_simulation_finishes() {
    let mut viewer = viewer(
        "frames_per_sync = 2\nexit_when_finished = true\nmax_frames = 10000",
        RecordingSink::default(),
    );
    viewer.engine().transport().finish_after(1);

    assert_eq!(viewer.run(), ExitReason::SimulationFinished);
    assert_eq!(viewer.engine().state(), SyncState::Stopped);
    assert_eq!(viewer.engine().transport().call_count(Endpoint::Step), 1);
    viewer.shutdown();
}

#[test]
fn sink_can_close_the_viewer() {
    let sink = RecordingSink {
        close_after: Some(3),
        ..RecordingSink::default()
    };
    let mut viewer = viewer("", sink);
    assert_eq!(viewer.run(), ExitReason::SinkClosed);
    assert_eq!(viewer.sink().frames.len(), 3);
    viewer.shutdown();
}

#[test]
fn camera_changes_apply_next_frame() {
    let mut viewer = viewer("", RecordingSink::default());
    let panel = viewer.camera();

    viewer.tick();
    panel.set_rotation_x(90.0);
    panel.set_distance(0.5);
    viewer.tick();

    let frames = &viewer.sink().frames;
    assert_ne!(frames[0].camera_position, frames[1].camera_position);
    // straight above the centre of the 8x8 grid
    let eye = frames[1].camera_position;
    assert!((eye - Vec3::new(4.0, 25.0, 4.0)).length() < 1e-3, "{eye:?}");
    viewer.shutdown();
}

#[test]
fn same_seed_same_decorations() {
    let decorations = |viewer: &Viewer<ScriptedTransport, RecordingSink>| -> HashMap<String, &'static str> {
        viewer
            .store()
            .visible_decorations()
            .map(|(e, d)| (e.id.to_string(), d.asset_id()))
            .collect()
    };

    let a = viewer("", RecordingSink::default());
    let b = viewer("", RecordingSink::default());
    assert_eq!(a.seed(), 11);
    assert_eq!(decorations(&a), decorations(&b));
    a.shutdown();
    b.shutdown();
}

#[test]
fn missing_model_is_reported_up_front() {
    let result = Viewer::new(
        &config(""),
        catalog_without(&[asset_ids::WHEEL]),
        server(),
        RecordingSink::default(),
    );
    match result {
        Err(ViewerError::Asset(AssetError::NotFound(id))) => assert_eq!(id, "wheel"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("viewer built without a wheel model"),
    }
}

#[test]
fn unreachable_server_fails_bootstrap() {
    let transport = server();
    for _ in 0..2 {
        transport.fail_next(Endpoint::Init);
    }
    let config = ParkviewConfig::from_toml_str(
        "[server]\nbootstrap_attempts = 2\nbootstrap_backoff_ms = 1\n",
    )
    .unwrap();

    let mut viewer = Viewer::new(&config, catalog_without(&[]), transport, RecordingSink::default()).unwrap();
    assert!(matches!(viewer.bootstrap(), Err(ViewerError::Sync(_))));
    assert!(viewer.store().is_empty());
    viewer.shutdown();
}
