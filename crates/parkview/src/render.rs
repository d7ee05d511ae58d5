//! # Render Hand-off
//!
//! Everything a GPU backend needs for one frame, with no GPU types.
//!
//! A backend uploads each catalog bundle once (see
//! `VertexAttributeBundle::buffers`), keyed by asset id, then for every
//! [`FrameSnapshot`] binds the global uniforms and issues one draw per
//! [`DrawItem`].

use parkview_shared::{Mat4, Vec3};
use tracing::{debug, info};

/// Background colour.
pub const CLEAR_COLOR: [f32; 4] = [0.2, 0.2, 0.2, 1.0];

/// Scene-wide lighting (`u_lightWorldPosition`, `u_ambientLight`, ...).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightUniforms {
    /// Point light position
    pub position: Vec3,
    /// Ambient RGBA
    pub ambient: [f32; 4],
    /// Diffuse RGBA
    pub diffuse: [f32; 4],
    /// Specular RGBA
    pub specular: [f32; 4],
}

impl Default for LightUniforms {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 50.0, 0.0),
            ambient: [0.1, 0.1, 0.1, 1.0],
            diffuse: [1.0, 1.0, 1.0, 1.0],
            specular: [0.75, 0.75, 0.75, 1.0],
        }
    }
}

/// One draw call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawItem {
    /// Catalog id of the mesh to bind
    pub asset_id: &'static str,
    /// Model matrix (`u_world`)
    pub world: Mat4,
    /// `view_projection · world` (`u_worldViewProjection`)
    pub world_view_projection: Mat4,
}

/// A complete frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSnapshot {
    /// Frame number
    pub frame: u64,
    /// Blend fraction the entities were sampled at
    pub blend: f32,
    /// Clear colour
    pub clear_color: [f32; 4],
    /// Eye position (`u_viewWorldPosition`)
    pub camera_position: Vec3,
    /// `projection · view`
    pub view_projection: Mat4,
    /// Global light
    pub light: LightUniforms,
    /// Draw calls in submission order
    pub draws: Vec<DrawItem>,
}

impl FrameSnapshot {
    /// Number of draws using `asset_id`.
    #[must_use]
    pub fn count(&self, asset_id: &str) -> usize {
        self.draws.iter().filter(|d| d.asset_id == asset_id).count()
    }
}

/// What the sink wants after a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkControl {
    /// Keep rendering
    Continue,
    /// Close the viewer (window closed, ...)
    Exit,
}

/// Consumer of finished frames.
pub trait RenderSink {
    /// Viewport width / height.
    fn aspect_ratio(&self) -> f32 {
        16.0 / 9.0
    }

    /// Draws one frame.
    fn present(&mut self, frame: &FrameSnapshot) -> SinkControl;
}

/// Headless sink: logs a frame summary every `interval` frames.
#[derive(Clone, Debug)]
pub struct LogSink {
    interval: u64,
    aspect: f32,
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(60)
    }
}

impl LogSink {
    /// Logs every `interval` frames (at least 1).
    #[must_use]
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            aspect: 16.0 / 9.0,
        }
    }
}

impl RenderSink for LogSink {
    fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    fn present(&mut self, frame: &FrameSnapshot) -> SinkControl {
        if frame.frame % self.interval == 0 {
            info!(
                frame = frame.frame,
                draws = frame.draws.len(),
                blend = frame.blend,
                camera = ?frame.camera_position.to_array(),
                "frame"
            );
        } else {
            debug!(frame = frame.frame, draws = frame.draws.len(), "frame");
        }
        SinkControl::Continue
    }
}
