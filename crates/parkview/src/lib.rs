//! # PARKVIEW
//!
//! Live viewer for the park traffic simulation.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐
//! │ parkview_assets  │   │ parkview_sync    │   │ CameraControl    │
//! │ OBJ/MTL → bundles│   │ server → store   │   │ (external UI)    │
//! └────────┬─────────┘   └────────┬─────────┘   └────────┬─────────┘
//!          │                      │ sample(t)            │ snapshot
//!          ▼                      ▼                      ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ Viewer: FrameLoop → build_frame → RenderSink::present            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML configuration
//! - `camera`: orbit camera and its shared control surface
//! - `frame_loop`: frame numbering, timing, pacing
//! - `scene`: draw list assembly
//! - `render`: GPU-free frame hand-off
//! - `viewer`: the whole thing wired together

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod camera;
pub mod config;
pub mod error;
pub mod frame_loop;
pub mod render;
pub mod scene;
pub mod viewer;

pub use camera::{CameraControl, CameraSettings, CameraView};
pub use config::{AnimationConfig, AssetsConfig, DecorationConfig, ParkviewConfig, ServerConfig};
pub use error::{ConfigError, ConfigResult, ViewerError, ViewerResult};
pub use frame_loop::{FrameLoop, FrameLoopConfig, FrameStats, FrameStatsAccumulator};
pub use render::{DrawItem, FrameSnapshot, LightUniforms, LogSink, RenderSink, SinkControl};
pub use scene::{build_frame, SCENE_ASSETS};
pub use viewer::{ExitReason, Viewer};

// Re-export the pipeline crates
pub use parkview_assets as assets;
pub use parkview_shared as shared;
pub use parkview_sync as sync;
