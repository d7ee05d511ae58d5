//! # Viewer Error Types

use std::path::PathBuf;

use parkview_assets::AssetError;
use parkview_sync::{SyncError, TransportError};
use thiserror::Error;

/// The configuration file could not be used.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config `{path}`: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`crate::ParkviewConfig`].
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        /// Dotted field name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Anything that stops the viewer.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// Bad configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Assets failed to load or are incomplete
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// Could not build the HTTP transport
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Sync engine startup or bootstrap failed
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for viewer operations.
pub type ViewerResult<T> = Result<T, ViewerError>;
