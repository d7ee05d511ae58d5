//! # PARKVIEW Sync
//!
//! Keeps a local copy of the simulation and blends it between server steps.
//!
//! ## Data flow
//!
//! ```text
//! simulation server ──HTTP──> SyncEngine ──SyncEvent──> EntityStore ──> AnimationSampler
//!                      (tokio task)      (crossbeam)   (frame thread)    (per frame)
//! ```
//!
//! - [`EntityStore`] holds agents plus the static map. Agents are upserted
//!   by id every step; map features are created once with a decoration drawn
//!   for each obstacle.
//! - [`SyncEngine`] polls `update` and `getAgents` every N frames, one
//!   request in flight at a time, and merges results without blocking.
//! - [`AnimationSampler`] blends previous and current transforms with
//!   `t = frames_since_sync / N`.
//!
//! ## Example
//!
//! ```rust,ignore
//! let transport = HttpTransport::new(DEFAULT_SERVER_URL, timeout)?;
//! let mut engine = SyncEngine::new(transport, SyncConfig::default())?;
//! let mut store = EntityStore::new();
//! engine.bootstrap(&mut store, &mut rng)?;
//!
//! loop {
//!     engine.drain_events(&mut store);
//!     let t = engine.blend_fraction();
//!     for agent in store.all(EntityKind::Agent) {
//!         draw(engine.sampler().sample(agent, t));
//!     }
//!     engine.end_frame();
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod decoration;
pub mod engine;
pub mod entity;
pub mod error;
pub mod events;
pub mod sampler;
pub mod store;
pub mod transport;

pub use decoration::{decoration_for_roll, draw_decoration};
pub use engine::{GridSize, SyncConfig, SyncEngine, SyncState, SyncStats};
pub use entity::{Decoration, Entity, EntityKind};
pub use error::{StoreError, SyncError, SyncResult, TransportError, TransportResult};
pub use events::SyncEvent;
pub use sampler::{AnimationSampler, SampledTransform};
pub use store::{shortest_arc_start, EntityStore, MergeStats};
pub use transport::{Endpoint, HttpTransport, ScriptedTransport, SimulationTransport};
