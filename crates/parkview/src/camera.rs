//! # Camera
//!
//! Orbit camera around the centre of the grid.
//!
//! ```text
//! camera = pivot(w/2, 0, h/2) · rotY(y - 180°) · rotX(-x) · scale(r) · translate(0, 0, 50)
//! view   = camera⁻¹
//! ```
//!
//! The settings are written by an external control panel and read once per
//! frame through [`CameraControl`]. The viewer never writes them.

use std::sync::Arc;

use parking_lot::RwLock;
use parkview_shared::{Mat4, Vec3};
use parkview_sync::GridSize;
use serde::{Deserialize, Serialize};

/// Vertical field of view, degrees.
pub const FIELD_OF_VIEW_DEG: f32 = 60.0;

/// Near clip plane.
pub const Z_NEAR: f32 = 1.0;

/// Far clip plane.
pub const Z_FAR: f32 = 200.0;

/// Camera distance from the pivot before scaling.
pub const ORBIT_DISTANCE: f32 = 50.0;

/// Allowed tilt range, degrees.
pub const ROTATION_X_RANGE: (f32, f32) = (0.0, 90.0);

/// Allowed heading range, degrees.
pub const ROTATION_Y_RANGE: (f32, f32) = (-180.0, 180.0);

/// Allowed distance scale range.
pub const DISTANCE_RANGE: (f32, f32) = (0.0, 1.0);

/// Smallest scale fed into the camera matrix. A zero scale has no inverse.
const MIN_EFFECTIVE_DISTANCE: f32 = 0.05;

/// Control panel values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraSettings {
    /// Tilt above the ground plane, degrees in `[0, 90]`
    pub rotation_x: f32,
    /// Heading around the pivot, degrees in `[-180, 180]`
    pub rotation_y: f32,
    /// Distance scale in `[0, 1]`
    pub distance: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            rotation_x: 35.0,
            rotation_y: 45.0,
            distance: 1.0,
        }
    }
}

impl CameraSettings {
    /// Copy with every value clamped into its slider range. NaN falls back
    /// to the default.
    #[must_use]
    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        let clamp = |v: f32, (lo, hi): (f32, f32), fallback: f32| {
            if v.is_nan() {
                fallback
            } else {
                v.clamp(lo, hi)
            }
        };
        Self {
            rotation_x: clamp(self.rotation_x, ROTATION_X_RANGE, defaults.rotation_x),
            rotation_y: clamp(self.rotation_y, ROTATION_Y_RANGE, defaults.rotation_y),
            distance: clamp(self.distance, DISTANCE_RANGE, defaults.distance),
        }
    }

    /// Camera-to-world matrix for a grid.
    #[must_use]
    pub fn camera_matrix(&self, grid: GridSize) -> Mat4 {
        let s = self.clamped();
        let pivot = Vec3::new(grid.width as f32 / 2.0, 0.0, grid.height as f32 / 2.0);
        Mat4::translation(pivot)
            .rotate_y((s.rotation_y - 180.0).to_radians())
            .rotate_x((-s.rotation_x).to_radians())
            .scale(Vec3::splat(s.distance.max(MIN_EFFECTIVE_DISTANCE)))
            .translate(Vec3::new(0.0, 0.0, ORBIT_DISTANCE))
    }

    /// View, projection and eye position for one frame.
    #[must_use]
    pub fn view(&self, grid: GridSize, aspect: f32) -> CameraView {
        let camera = self.camera_matrix(grid);
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        let projection = Mat4::perspective(FIELD_OF_VIEW_DEG.to_radians(), aspect, Z_NEAR, Z_FAR);
        // camera_matrix keeps the scale away from zero, so this is always invertible
        let view = camera.inverse().unwrap_or(Mat4::IDENTITY);

        CameraView {
            view_projection: projection * view,
            position: camera.get_translation(),
        }
    }
}

/// Per-frame camera output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraView {
    /// `projection · view`
    pub view_projection: Mat4,
    /// Eye position in world space (`u_viewWorldPosition`)
    pub position: Vec3,
}

/// Shared handle to the camera settings.
///
/// Cloning shares the same settings. The UI side writes with
/// [`CameraControl::update`]; the frame thread takes a [`CameraControl::snapshot`].
#[derive(Clone, Debug, Default)]
pub struct CameraControl {
    settings: Arc<RwLock<CameraSettings>>,
}

impl CameraControl {
    /// Creates a control surface with initial settings.
    #[must_use]
    pub fn new(settings: CameraSettings) -> Self {
        Self {
            settings: Arc::new(RwLock::new(settings.clamped())),
        }
    }

    /// Current settings.
    #[must_use]
    pub fn snapshot(&self) -> CameraSettings {
        *self.settings.read()
    }

    /// Applies a change and re-clamps.
    pub fn update(&self, change: impl FnOnce(&mut CameraSettings)) {
        let mut settings = self.settings.write();
        change(&mut settings);
        *settings = settings.clamped();
    }

    /// Sets the tilt, degrees.
    pub fn set_rotation_x(&self, degrees: f32) {
        self.update(|s| s.rotation_x = degrees);
    }

    /// Sets the heading, degrees.
    pub fn set_rotation_y(&self, degrees: f32) {
        self.update(|s| s.rotation_y = degrees);
    }

    /// Sets the distance scale.
    pub fn set_distance(&self, distance: f32) {
        self.update(|s| s.distance = distance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: GridSize = GridSize {
        width: 24,
        height: 20,
    };

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_default_settings() {
        let s = CameraSettings::default();
        assert_eq!((s.rotation_x, s.rotation_y, s.distance), (35.0, 45.0, 1.0));
    }

    #[test]
    fn test_level_camera_sits_behind_pivot() {
        let s = CameraSettings {
            rotation_x: 0.0,
            rotation_y: 180.0,
            distance: 1.0,
        };
        let view = s.view(GRID, 1.0);
        assert!(close(view.position, Vec3::new(12.0, 0.0, 60.0)));
    }

    #[test]
    fn test_top_down_camera_is_above_pivot() {
        let s = CameraSettings {
            rotation_x: 90.0,
            rotation_y: 0.0,
            distance: 0.5,
        };
        let view = s.view(GRID, 1.0);
        assert!(close(view.position, Vec3::new(12.0, 25.0, 10.0)));
    }

    #[test]
    fn test_pivot_projects_to_screen_centre() {
        let view = CameraSettings::default().view(GRID, 16.0 / 9.0);
        let clip = view.view_projection.m;
        let pivot = Vec3::new(12.0, 0.0, 10.0);
        // clip = VP · (pivot, 1)
        let x = clip[0] * pivot.x + clip[4] * pivot.y + clip[8] * pivot.z + clip[12];
        let y = clip[1] * pivot.x + clip[5] * pivot.y + clip[9] * pivot.z + clip[13];
        let w = clip[3] * pivot.x + clip[7] * pivot.y + clip[11] * pivot.z + clip[15];
        assert!(w > 0.0);
        assert!((x / w).abs() < 1e-4);
        assert!((y / w).abs() < 1e-4);
    }

    #[test]
    fn test_zero_distance_stays_invertible() {
        let s = CameraSettings {
            distance: 0.0,
            ..CameraSettings::default()
        };
        assert!(s.camera_matrix(GRID).inverse().is_some());
    }

    #[test]
    fn test_control_clamps_writes() {
        let control = CameraControl::new(CameraSettings::default());
        let ui = control.clone();

        ui.set_rotation_x(120.0);
        ui.set_rotation_y(-400.0);
        ui.set_distance(f32::NAN);

        let s = control.snapshot();
        assert_eq!(s.rotation_x, 90.0);
        assert_eq!(s.rotation_y, -180.0);
        assert_eq!(s.distance, 1.0);
    }
}
