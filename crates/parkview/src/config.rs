//! # Viewer Configuration
//!
//! TOML file with one table per concern. Every field is optional.
//!
//! ```toml
//! [server]
//! base_url = "http://localhost:8585/"
//! request_timeout_ms = 2000
//!
//! [animation]
//! frames_per_sync = 30
//! target_fps = 60
//!
//! [assets]
//! root = "assets"
//! face_mode = "fan"
//!
//! [decorations]
//! seed = 42
//!
//! [camera]
//! rotation_x = 35.0
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use parkview_assets::{AssetManifest, AssetResult, FaceMode, MeshParser};
use parkview_shared::{DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_SERVER_URL, FRAMES_PER_SYNC, TARGET_FPS};
use parkview_sync::SyncConfig;
use serde::{Deserialize, Serialize};

use crate::camera::CameraSettings;
use crate::error::{ConfigError, ConfigResult};

/// Whole viewer configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParkviewConfig {
    /// Simulation server
    pub server: ServerConfig,
    /// Frame cadence
    pub animation: AnimationConfig,
    /// Model files
    pub assets: AssetsConfig,
    /// Obstacle props
    pub decorations: DecorationConfig,
    /// Initial camera
    pub camera: CameraSettings,
}

/// `[server]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Base URL; endpoints are appended to it
    pub base_url: String,
    /// Bound on each request
    pub request_timeout_ms: u64,
    /// Bootstrap tries before giving up
    pub bootstrap_attempts: u32,
    /// Linear backoff step between bootstrap tries
    pub bootstrap_backoff_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER_URL.to_owned(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            bootstrap_attempts: 5,
            bootstrap_backoff_ms: 500,
        }
    }
}

impl ServerConfig {
    /// Request timeout as a duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// `[animation]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    /// Frames between server steps
    pub frames_per_sync: u32,
    /// Frame rate the loop paces itself to
    pub target_fps: u32,
    /// Quit once the server reports the run has ended
    pub exit_when_finished: bool,
    /// Hard frame limit, unlimited when absent
    pub max_frames: Option<u64>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frames_per_sync: FRAMES_PER_SYNC,
            target_fps: TARGET_FPS,
            exit_when_finished: false,
            max_frames: None,
        }
    }
}

/// `[assets]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Directory holding the park models
    pub root: PathBuf,
    /// Polygon handling in the mesh parser
    pub face_mode: FaceMode,
    /// Custom manifest file; the built-in park manifest when absent
    pub manifest: Option<PathBuf>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            face_mode: FaceMode::default(),
            manifest: None,
        }
    }
}

impl AssetsConfig {
    /// The manifest to load.
    ///
    /// # Errors
    ///
    /// Propagates manifest file errors.
    pub fn manifest(&self) -> AssetResult<AssetManifest> {
        match &self.manifest {
            Some(path) => AssetManifest::load(path),
            None => Ok(AssetManifest::park(&self.root)),
        }
    }

    /// Mesh parser for the configured face mode.
    #[must_use]
    pub fn parser(&self) -> MeshParser {
        MeshParser::new().with_face_mode(self.face_mode)
    }
}

/// `[decorations]`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecorationConfig {
    /// Seed for the decoration draw; a time-based seed is logged when absent
    pub seed: Option<u64>,
}

impl ParkviewConfig {
    /// Reads and validates a config file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if unreadable, otherwise as [`Self::from_toml_str`].
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;

        // relative asset paths are relative to the config file
        if let Some(dir) = path.parent() {
            if config.assets.root.is_relative() {
                config.assets.root = dir.join(&config.assets.root);
            }
            if let Some(manifest) = config.assets.manifest.as_mut() {
                if manifest.is_relative() {
                    *manifest = dir.join(&*manifest);
                }
            }
        }
        Ok(config)
    }

    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for bad TOML or unknown tables,
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |field, reason: &str| {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_owned(),
            })
        };

        if self.server.base_url.trim().is_empty() {
            return invalid("server.base_url", "must not be empty");
        }
        if self.server.request_timeout_ms == 0 {
            return invalid("server.request_timeout_ms", "must be positive");
        }
        if self.server.bootstrap_attempts == 0 {
            return invalid("server.bootstrap_attempts", "must be at least 1");
        }
        if self.animation.frames_per_sync == 0 {
            return invalid("animation.frames_per_sync", "must be at least 1");
        }
        if self.animation.target_fps == 0 {
            return invalid("animation.target_fps", "must be at least 1");
        }
        Ok(())
    }

    /// Engine settings derived from `[server]` and `[animation]`.
    #[must_use]
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            frames_per_sync: self.animation.frames_per_sync,
            request_timeout: self.server.request_timeout(),
            bootstrap_attempts: self.server.bootstrap_attempts,
            bootstrap_backoff: Duration::from_millis(self.server.bootstrap_backoff_ms),
            ..SyncConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = ParkviewConfig::from_toml_str("").unwrap();
        assert_eq!(config, ParkviewConfig::default());
        assert_eq!(config.server.base_url, "http://localhost:8585/");
        assert_eq!(config.animation.frames_per_sync, 30);
        assert_eq!(config.camera, CameraSettings::default());
        assert_eq!(config.decorations.seed, None);
    }

    #[test]
    fn test_partial_tables() {
        let config = ParkviewConfig::from_toml_str(
            r#"
            [server]
            base_url = "http://sim:9000"

            [assets]
            face_mode = "fan"

            [decorations]
            seed = 42

            [camera]
            rotation_x = 60.0
            "#,
        )
        .unwrap();

        assert_eq!(config.server.base_url, "http://sim:9000");
        assert_eq!(config.server.request_timeout_ms, 2_000);
        assert_eq!(config.assets.face_mode, FaceMode::Fan);
        assert_eq!(config.assets.parser().face_mode(), FaceMode::Fan);
        assert_eq!(config.decorations.seed, Some(42));
        assert_eq!(config.camera.rotation_x, 60.0);
        assert_eq!(config.camera.rotation_y, 45.0);
    }

    #[test]
    fn test_sync_config_mapping() {
        let config = ParkviewConfig::from_toml_str(
            "[server]\nrequest_timeout_ms = 750\nbootstrap_attempts = 2\n[animation]\nframes_per_sync = 10\n",
        )
        .unwrap();
        let sync = config.sync_config();
        assert_eq!(sync.frames_per_sync, 10);
        assert_eq!(sync.request_timeout, Duration::from_millis(750));
        assert_eq!(sync.bootstrap_attempts, 2);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = ParkviewConfig::from_toml_str("[animation]\nframes_per_sync = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "animation.frames_per_sync",
                ..
            }
        ));

        let err = ParkviewConfig::from_toml_str("[server]\nbase_url = \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "server.base_url", .. }));
    }

    #[test]
    fn test_rejects_unknown_table() {
        let err = ParkviewConfig::from_toml_str("[renderer]\nvsync = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_rejects_misspelled_keys_in_tables() {
        for text in [
            "[server]\nbase_ulr = \"http://localhost:1/\"\n",
            "[animation]\nframes_per_synk = 10\n",
            "[assets]\nfacemode = \"fan\"\n",
            "[decorations]\nsed = 3\n",
            "[camera]\nrotation_z = 10.0\n",
        ] {
            let err = ParkviewConfig::from_toml_str(text).unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)), "{text:?} was accepted");
        }
    }

    #[test]
    fn test_default_manifest_is_park() {
        let assets = AssetsConfig::default();
        let manifest = assets.manifest().unwrap();
        assert_eq!(manifest.len(), 14);
    }
}
