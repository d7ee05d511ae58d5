//! # Sync Engine
//!
//! Drives the simulation server from the frame loop.
//!
//! ## Per frame
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │ 1. drain_events(store)   merge finished requests (never waits)  │
//! │ 2. blend_fraction()      t for the sampler                      │
//! │ 3. render                                                       │
//! │ 4. end_frame()           every N frames: spawn step → agents    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! At most one request is in flight. A boundary that finds one running is
//! skipped. Failures are logged and the next boundary tries again. Once the
//! server reports the run has ended the engine stops requesting for good.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use parkview_shared::{
    AgentRoster, InitResponse, MapLayout, DEFAULT_REQUEST_TIMEOUT_MS, FRAMES_PER_SYNC,
};
use rand::Rng;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult, TransportError, TransportResult};
use crate::events::{self, EventSender, SyncEvent};
use crate::sampler::AnimationSampler;
use crate::store::EntityStore;
use crate::transport::{Endpoint, SimulationTransport};

/// Engine tuning.
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Frames between step requests.
    pub frames_per_sync: u32,
    /// Bound on every request.
    pub request_timeout: Duration,
    /// Bootstrap tries before giving up.
    pub bootstrap_attempts: u32,
    /// Wait after a failed bootstrap try, multiplied by the attempt number.
    pub bootstrap_backoff: Duration,
    /// Completion channel capacity.
    pub event_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            frames_per_sync: FRAMES_PER_SYNC,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            bootstrap_attempts: 5,
            bootstrap_backoff: Duration::from_millis(500),
            event_capacity: 16,
        }
    }
}

/// Request lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    /// Waiting for the next boundary.
    Idle,
    /// A step request is running.
    InFlight,
    /// The simulation ended; no more requests.
    Stopped,
}

/// Counters for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Step requests spawned
    pub requests: u64,
    /// Rosters merged
    pub merges: u64,
    /// Failed requests
    pub failures: u64,
    /// Boundaries skipped because a request was running
    pub skipped: u64,
    /// Latest server step merged
    pub last_step: Option<u64>,
}

/// Grid reported by `init`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridSize {
    /// Cells along X
    pub width: u32,
    /// Cells along Z
    pub height: u32,
}

/// Owns the request runtime and the cadence state.
pub struct SyncEngine<T: SimulationTransport> {
    runtime: Runtime,
    transport: Arc<T>,
    config: SyncConfig,
    sampler: AnimationSampler,
    sender: EventSender,
    receiver: Receiver<SyncEvent>,
    state: SyncState,
    frames_since_merge: u32,
    frames_until_request: u32,
    grid: Option<GridSize>,
    stats: SyncStats,
}

impl<T: SimulationTransport> SyncEngine<T> {
    /// Creates an engine with its own single-worker runtime.
    ///
    /// # Errors
    ///
    /// [`SyncError::Runtime`] if the runtime cannot start.
    pub fn new(transport: T, config: SyncConfig) -> SyncResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("parkview-sync")
            .enable_all()
            .build()
            .map_err(SyncError::Runtime)?;

        let (sender, receiver) = events::channel(config.event_capacity);
        let sampler = AnimationSampler::new(config.frames_per_sync);
        let frames_until_request = sampler.frames_per_sync();

        Ok(Self {
            runtime,
            transport: Arc::new(transport),
            config,
            sampler,
            sender,
            receiver,
            state: SyncState::Idle,
            frames_since_merge: 0,
            frames_until_request,
            grid: None,
            stats: SyncStats::default(),
        })
    }

    // =========================================================================
    // BOOTSTRAP
    // =========================================================================

    /// `init` → `getMap` → `getAgents`, retried with linear backoff.
    ///
    /// Blocks the caller; run it before the frame loop. The map is only
    /// initialized once, so a retry after a partial success is safe.
    ///
    /// # Errors
    ///
    /// [`SyncError::BootstrapFailed`] with the last transport error once every
    /// attempt has failed.
    pub fn bootstrap<R: Rng + ?Sized>(
        &mut self,
        store: &mut EntityStore,
        rng: &mut R,
    ) -> SyncResult<InitResponse> {
        let attempts = self.config.bootstrap_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.runtime.block_on(self.fetch_initial_state()) {
                Ok((init, layout, roster)) => {
                    if !store.is_map_initialized() {
                        store.initialize_map(&layout, rng)?;
                    }
                    store.upsert_agents(&roster);

                    self.grid = Some(GridSize {
                        width: init.width,
                        height: init.height,
                    });
                    self.frames_since_merge = 0;
                    self.frames_until_request = self.sampler.frames_per_sync();

                    info!(
                        message = %init.message,
                        width = init.width,
                        height = init.height,
                        features = layout.len(),
                        agents = roster.positions.len(),
                        "simulation bootstrapped"
                    );
                    return Ok(init);
                }
                Err(error) if attempt < attempts => {
                    let wait = self.config.bootstrap_backoff * attempt;
                    warn!(attempt, attempts, %error, ?wait, "bootstrap failed, retrying");
                    self.runtime.block_on(tokio::time::sleep(wait));
                    attempt += 1;
                }
                Err(last) => {
                    return Err(SyncError::BootstrapFailed { attempts, last });
                }
            }
        }
    }

    async fn fetch_initial_state(&self) -> TransportResult<(InitResponse, MapLayout, AgentRoster)> {
        let timeout = self.config.request_timeout;
        let init = bounded(Endpoint::Init, timeout, self.transport.init()).await?;
        let layout = bounded(Endpoint::Map, timeout, self.transport.map()).await?;
        let roster = bounded(Endpoint::Agents, timeout, self.transport.agents()).await?;
        Ok((init, layout, roster))
    }

    // =========================================================================
    // FRAME HOOKS
    // =========================================================================

    /// Merges every finished request into `store`. Never blocks.
    ///
    /// Returns the number of rosters merged.
    pub fn drain_events(&mut self, store: &mut EntityStore) -> usize {
        let mut merged = 0;
        while let Ok(event) = self.receiver.try_recv() {
            merged += usize::from(self.apply(event, store));
        }
        merged
    }

    /// Like [`SyncEngine::drain_events`], but waits up to `timeout` for the
    /// first event. For headless drivers and tests.
    pub fn wait_events(&mut self, store: &mut EntityStore, timeout: Duration) -> usize {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => usize::from(self.apply(event, store)) + self.drain_events(store),
            Err(_) => 0,
        }
    }

    fn apply(&mut self, event: SyncEvent, store: &mut EntityStore) -> bool {
        match event {
            SyncEvent::Stepped { step, roster } => {
                let merge = store.upsert_agents(&roster);
                self.frames_since_merge = 0;
                self.stats.merges += 1;
                self.stats.last_step = Some(step.current_step);

                debug!(
                    step = step.current_step,
                    added = merge.added,
                    removed = merge.removed,
                    "step merged"
                );

                if step.running {
                    self.state = SyncState::Idle;
                } else {
                    info!(step = step.current_step, "simulation finished, sync stopped");
                    self.state = SyncState::Stopped;
                }
                true
            }
            SyncEvent::Failed { endpoint, error } => {
                warn!(%endpoint, %error, "sync request failed, retrying at next boundary");
                self.stats.failures += 1;
                if self.state == SyncState::InFlight {
                    self.state = SyncState::Idle;
                }
                false
            }
        }
    }

    /// Blend fraction for this frame's sampling.
    #[inline]
    #[must_use]
    pub fn blend_fraction(&self) -> f32 {
        self.sampler.fraction(self.frames_since_merge)
    }

    /// Advances the frame counters; on a sync boundary spawns a request
    /// unless one is already running or the engine has stopped.
    ///
    /// Returns `true` when a request was spawned.
    pub fn end_frame(&mut self) -> bool {
        self.frames_since_merge = self.frames_since_merge.saturating_add(1);
        self.frames_until_request = self.frames_until_request.saturating_sub(1);
        if self.frames_until_request > 0 {
            return false;
        }
        self.frames_until_request = self.sampler.frames_per_sync();

        match self.state {
            SyncState::Idle => {
                self.spawn_step();
                true
            }
            SyncState::InFlight => {
                self.stats.skipped += 1;
                debug!("sync boundary skipped, request still in flight");
                false
            }
            SyncState::Stopped => false,
        }
    }

    fn spawn_step(&mut self) {
        let transport = Arc::clone(&self.transport);
        let sender = self.sender.clone();
        let timeout = self.config.request_timeout;

        self.state = SyncState::InFlight;
        self.stats.requests += 1;

        self.runtime.spawn(async move {
            let event = match step_and_fetch(transport.as_ref(), timeout).await {
                Ok((step, roster)) => SyncEvent::Stepped { step, roster },
                Err((endpoint, error)) => SyncEvent::Failed { endpoint, error },
            };
            sender.send(event);
        });
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Grid size once bootstrapped.
    #[must_use]
    pub fn grid(&self) -> Option<GridSize> {
        self.grid
    }

    /// Counters.
    #[must_use]
    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// The sampler matching this engine's cadence.
    #[must_use]
    pub fn sampler(&self) -> AnimationSampler {
        self.sampler
    }

    /// Frames since the last merged roster.
    #[must_use]
    pub fn frames_since_merge(&self) -> u32 {
        self.frames_since_merge
    }

    /// Shared handle to the transport.
    #[must_use]
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Stops the runtime, giving running requests `grace` to finish.
    pub fn shutdown(self, grace: Duration) {
        self.runtime.shutdown_timeout(grace);
    }
}

async fn step_and_fetch<T: SimulationTransport>(
    transport: &T,
    timeout: Duration,
) -> Result<(parkview_shared::StepResponse, AgentRoster), (Endpoint, TransportError)> {
    let step = bounded(Endpoint::Step, timeout, transport.step())
        .await
        .map_err(|e| (Endpoint::Step, e))?;
    let roster = bounded(Endpoint::Agents, timeout, transport.agents())
        .await
        .map_err(|e| (Endpoint::Agents, e))?;
    Ok((step, roster))
}

/// Applies the request timeout to one transport call.
async fn bounded<F, V>(endpoint: Endpoint, after: Duration, call: F) -> TransportResult<V>
where
    F: Future<Output = TransportResult<V>>,
{
    tokio::time::timeout(after, call)
        .await
        .unwrap_or(Err(TransportError::Timeout {
            endpoint: endpoint.path(),
            after,
        }))
}
