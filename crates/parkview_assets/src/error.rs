//! # Asset Error Types
//!
//! All errors that can occur while parsing documents or building the catalog.

use std::path::PathBuf;
use thiserror::Error;

/// A mesh or material document violated the expected line shape.
///
/// Every variant names the document and the 1-based line so a broken asset
/// can be fixed without bisecting the file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A line did not have the expected tokens.
    #[error("{document}:{line}: expected {expected}, found `{found}`")]
    Malformed {
        /// Document name or path.
        document: String,
        /// 1-based line number.
        line: usize,
        /// What the parser was looking for.
        expected: &'static str,
        /// The offending line, trimmed.
        found: String,
    },

    /// A material block is missing one of its required keys.
    #[error("{document}:{line}: material `{material}` has no `{key}` line")]
    MissingMaterialKey {
        /// Document name or path.
        document: String,
        /// Line of the `newmtl` record.
        line: usize,
        /// Material name.
        material: String,
        /// The missing key (`Ns`, `Ka`, `Kd`, `Ks`).
        key: &'static str,
    },

    /// An `f` record appeared before any `usemtl`.
    #[error("{document}:{line}: face has no active material (missing `usemtl`)")]
    FaceBeforeMaterial {
        /// Document name or path.
        document: String,
        /// 1-based line number.
        line: usize,
    },

    /// `usemtl` named a material the library does not define.
    #[error("{document}:{line}: unknown material `{name}`")]
    UnknownMaterial {
        /// Document name or path.
        document: String,
        /// 1-based line number.
        line: usize,
        /// The requested name.
        name: String,
    },

    /// A face referenced an element that does not exist (yet).
    #[error("{document}:{line}: {attribute} index {index} out of range ({available} defined)")]
    IndexOutOfRange {
        /// Document name or path.
        document: String,
        /// 1-based line number.
        line: usize,
        /// `position`, `texcoord` or `normal`.
        attribute: &'static str,
        /// Index as written in the document.
        index: i64,
        /// Elements defined so far.
        available: usize,
    },
}

/// Errors raised while building or querying the asset catalog.
#[derive(Error, Debug)]
pub enum AssetError {
    /// A document failed to parse.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A document could not be read from disk.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest file is not valid TOML or has the wrong shape.
    #[error("invalid asset manifest: {0}")]
    InvalidManifest(String),

    /// Two manifest entries share an id.
    #[error("duplicate asset id: {0}")]
    DuplicateAsset(String),

    /// Lookup of an id the catalog does not hold.
    #[error("unknown asset: {0}")]
    NotFound(String),
}

/// Result type for document parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for catalog operations.
pub type AssetResult<T> = Result<T, AssetError>;
