//! # Sync Error Types

use std::time::Duration;
use thiserror::Error;

/// A request to the simulation server failed.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection, protocol or body read failure.
    #[error("request to `{endpoint}` failed: {source}")]
    Http {
        /// Endpoint path (`getAgents`, ...).
        endpoint: &'static str,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("`{endpoint}` returned HTTP {status}")]
    Status {
        /// Endpoint path.
        endpoint: &'static str,
        /// Status code.
        status: u16,
    },

    /// The body was not the expected JSON shape.
    #[error("`{endpoint}` returned an unexpected payload: {source}")]
    Decode {
        /// Endpoint path.
        endpoint: &'static str,
        /// Deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// No answer within the configured timeout.
    #[error("`{endpoint}` timed out after {after:?}")]
    Timeout {
        /// Endpoint path.
        endpoint: &'static str,
        /// Configured bound.
        after: Duration,
    },

    /// The server could not be reached for another reason.
    #[error("simulation server unavailable: {0}")]
    Unavailable(String),
}

/// Entity store misuse.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Static map features are created once per store.
    #[error("map already initialized")]
    MapAlreadyInitialized,
}

/// Errors surfaced by the sync engine to its owner.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A transport call failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The store rejected an operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Bootstrap gave up after the configured number of attempts.
    #[error("bootstrap failed after {attempts} attempts: {last}")]
    BootstrapFailed {
        /// Attempts made.
        attempts: u32,
        /// Error from the final attempt.
        #[source]
        last: TransportError,
    },

    /// The async runtime could not be created.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Result type for transport calls.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for engine operations.
pub type SyncResult<T> = Result<T, SyncError>;
