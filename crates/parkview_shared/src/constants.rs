//! # Viewer Constants
//!
//! Values recovered from the park simulation's reference cadence and model
//! proportions. Runtime-tunable copies live in the viewer's config.

use crate::math::Vec3;

// =============================================================================
// SERVER
// =============================================================================

/// Default simulation server base URL
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8585/";

/// Default request timeout in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2_000;

// =============================================================================
// CADENCE
// =============================================================================

/// Rendered frames between two server steps
pub const FRAMES_PER_SYNC: u32 = 30;

/// Target frame rate of the viewer loop
pub const TARGET_FPS: u32 = 60;

// =============================================================================
// MODEL PROPORTIONS
// =============================================================================

/// Uniform scale applied to every park model
pub const ENTITY_SCALE: f32 = 0.25;

/// Lift applied to bikes so the wheels sit on the tile surface
pub const AGENT_RENDER_OFFSET: Vec3 = Vec3::new(0.0, 0.25, 0.0);

/// Local offset of the front wheel; the rear wheel mirrors it
pub const WHEEL_OFFSET: Vec3 = Vec3::new(0.0, 0.0, 0.3);

// =============================================================================
// ASSET IDS
// =============================================================================

/// Identifiers of the park models in the asset catalog.
pub mod asset_ids {
    /// Basketball court (scalable decoration)
    pub const BASKETBALL_COURT: &str = "basketball_court";
    /// Bike frame
    pub const BIKE: &str = "bike";
    /// Destination marker
    pub const DESTINATION: &str = "destination";
    /// Football field (scalable decoration)
    pub const FOOTBALL_FIELD: &str = "football_field";
    /// Fountain (scalable decoration)
    pub const FOUNTAIN: &str = "fountain";
    /// Grass tile drawn under obstacles
    pub const GRASS: &str = "grass";
    /// First rock variant
    pub const ROCK1: &str = "rock1";
    /// Second rock variant
    pub const ROCK2: &str = "rock2";
    /// Road tile
    pub const ROAD: &str = "road";
    /// Traffic light
    pub const TRAFFIC_LIGHT: &str = "traffic_light";
    /// Trash can
    pub const TRASH_CAN: &str = "trash_can";
    /// First tree variant
    pub const TREE1: &str = "tree1";
    /// Second tree variant
    pub const TREE2: &str = "tree2";
    /// Bike wheel, drawn twice per bike
    pub const WHEEL: &str = "wheel";
}
