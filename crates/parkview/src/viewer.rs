//! # Viewer
//!
//! Owns the catalog, the entity store, the sync engine and the camera, and
//! runs the frame loop against a [`RenderSink`].

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use parkview_assets::{AssetCatalog, AssetError};
use parkview_shared::InitResponse;
use parkview_sync::{EntityStore, SimulationTransport, SyncEngine, SyncState};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::camera::CameraControl;
use crate::config::ParkviewConfig;
use crate::error::ViewerResult;
use crate::frame_loop::{FrameLoop, FrameLoopConfig, FrameStats, FrameStatsAccumulator};
use crate::render::{LightUniforms, RenderSink, SinkControl};
use crate::scene::{build_frame, SCENE_ASSETS};

/// Grace period for in-flight requests on shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

/// Why [`Viewer::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    /// The sink asked to close
    SinkClosed,
    /// `animation.max_frames` reached
    FrameLimit,
    /// The simulation ended and `exit_when_finished` is set
    SimulationFinished,
}

/// The running viewer.
pub struct Viewer<T: SimulationTransport, S: RenderSink> {
    catalog: AssetCatalog,
    store: EntityStore,
    engine: SyncEngine<T>,
    camera: CameraControl,
    light: LightUniforms,
    frames: FrameLoop,
    sink: S,
    seed: u64,
    exit_when_finished: bool,
    max_frames: Option<u64>,
}

impl<T: SimulationTransport, S: RenderSink> Viewer<T, S> {
    /// Assembles a viewer.
    ///
    /// # Errors
    ///
    /// [`AssetError::NotFound`] if the catalog lacks a model the scene draws,
    /// or a sync error if the engine runtime cannot start.
    pub fn new(config: &ParkviewConfig, catalog: AssetCatalog, transport: T, sink: S) -> ViewerResult<Self> {
        if let Some(missing) = SCENE_ASSETS.iter().copied().find(|id| !catalog.contains(id)) {
            return Err(AssetError::NotFound(missing.to_owned()).into());
        }

        let engine = SyncEngine::new(transport, config.sync_config())?;
        let seed = config.decorations.seed.unwrap_or_else(time_seed);

        Ok(Self {
            catalog,
            store: EntityStore::new(),
            engine,
            camera: CameraControl::new(config.camera),
            light: LightUniforms::default(),
            frames: FrameLoop::new(FrameLoopConfig {
                target_fps: config.animation.target_fps,
                ..FrameLoopConfig::default()
            }),
            sink,
            seed,
            exit_when_finished: config.animation.exit_when_finished,
            max_frames: config.animation.max_frames,
        })
    }

    /// Fetches the initial model state. Decorations are drawn with the
    /// viewer's seed, which is logged so a run can be replayed.
    ///
    /// # Errors
    ///
    /// The bootstrap error once every attempt has failed.
    pub fn bootstrap(&mut self) -> ViewerResult<InitResponse> {
        info!(seed = self.seed, "decoration seed");
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        Ok(self.engine.bootstrap(&mut self.store, &mut rng)?)
    }

    /// Runs one frame.
    pub fn tick(&mut self) -> (FrameStats, SinkControl) {
        let frame = self.frames.begin_frame();

        let sync_start = Instant::now();
        let merges = self.engine.drain_events(&mut self.store);
        let sync_us = elapsed_us(sync_start);

        let sample_start = Instant::now();
        let grid = self.engine.grid().unwrap_or_default();
        let camera = self.camera.snapshot().view(grid, self.sink.aspect_ratio());
        let snapshot = build_frame(
            frame,
            &self.store,
            &self.engine.sampler(),
            self.engine.blend_fraction(),
            &camera,
            self.light,
        );
        let sample_us = elapsed_us(sample_start);

        let present_start = Instant::now();
        let control = self.sink.present(&snapshot);
        let present_us = elapsed_us(present_start);

        self.engine.end_frame();

        let stats = FrameStats {
            frame,
            total_us: self.frames.elapsed().as_micros() as u64,
            sync_us,
            sample_us,
            present_us,
            merges: merges as u32,
            draws: snapshot.draws.len() as u32,
        };
        self.frames.end_frame(stats);
        (stats, control)
    }

    /// Runs frames until the sink closes, the frame limit is reached, or
    /// the simulation ends with `exit_when_finished` set.
    pub fn run(&mut self) -> ExitReason {
        info!(
            assets = self.catalog.len(),
            vertices = self.catalog.total_vertices(),
            "viewer running"
        );

        loop {
            let (_, control) = self.tick();

            if control == SinkControl::Exit {
                return ExitReason::SinkClosed;
            }
            if self.max_frames.is_some_and(|max| self.frames.frame_count() >= max) {
                return ExitReason::FrameLimit;
            }
            if self.exit_when_finished && self.engine.state() == SyncState::Stopped {
                info!(step = ?self.engine.stats().last_step, "simulation finished");
                return ExitReason::SimulationFinished;
            }

            self.frames.pace();
        }
    }

    /// Handle for an external control panel.
    #[must_use]
    pub fn camera(&self) -> CameraControl {
        self.camera.clone()
    }

    /// Entity store.
    #[must_use]
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Sync engine.
    #[must_use]
    pub fn engine(&self) -> &SyncEngine<T> {
        &self.engine
    }

    /// Asset catalog.
    #[must_use]
    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    /// Render sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Decoration seed in use.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Frame timing so far.
    #[must_use]
    pub fn frame_stats(&self) -> &FrameStatsAccumulator {
        self.frames.stats()
    }

    /// Stops the sync runtime.
    pub fn shutdown(self) {
        let stats = self.engine.stats();
        if stats.failures > 0 {
            warn!(failures = stats.failures, requests = stats.requests, "sync requests failed during run");
        }
        self.engine.shutdown(SHUTDOWN_GRACE);
    }
}

fn elapsed_us(start: Instant) -> u64 {
    start.elapsed().as_micros() as u64
}

/// Seed from the wall clock.
fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}
