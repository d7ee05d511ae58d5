//! # PARKVIEW Shared
//!
//! Common types used by the asset pipeline, the sync engine and the viewer.
//!
//! ## RULE
//!
//! This crate must never depend on a GPU, windowing or HTTP crate.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;
pub mod protocol;

pub use constants::{
    asset_ids,
    AGENT_RENDER_OFFSET, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_SERVER_URL, ENTITY_SCALE,
    FRAMES_PER_SYNC, TARGET_FPS, WHEEL_OFFSET,
};
pub use math::{Mat4, Vec3};
pub use protocol::{
    AgentPosition, AgentRoster, Direction, EntityId, InitResponse, MapItem, MapLayout,
    MapResponse, StepResponse,
};
