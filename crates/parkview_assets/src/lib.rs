//! # PARKVIEW Assets
//!
//! Turns the park's OBJ/MTL document pairs into flat vertex streams.
//!
//! ## Pipeline
//!
//! 1. [`MaterialLibrary::parse_named`] reads an MTL document into named
//!    reflectance records.
//! 2. [`MeshParser::parse`] folds an OBJ document against that library,
//!    baking the active material into every emitted vertex.
//! 3. [`AssetCatalog`] runs both for every [`AssetManifest`] entry once at
//!    startup and is read-only afterwards.
//!
//! Malformed documents fail with a [`ParseError`] carrying the document name
//! and line, so broken assets never reach a GPU buffer as `NaN`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use parkview_assets::{AssetCatalog, AssetManifest, MeshParser};
//!
//! let catalog = AssetCatalog::load(&AssetManifest::park("assets"), &MeshParser::new())?;
//! let bike = catalog.require("bike")?;
//! upload(bike.attribute_bytes(AttributeKind::Position));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod bundle;
pub mod catalog;
pub mod error;
pub mod manifest;
pub mod material;
pub mod mesh;
mod scan;

pub use bundle::{AttributeKind, VertexAttributeBundle};
pub use catalog::AssetCatalog;
pub use error::{AssetError, AssetResult, ParseError, ParseResult};
pub use manifest::{AssetEntry, AssetManifest};
pub use material::{Material, MaterialLibrary};
pub use mesh::{parse_mesh, FaceMode, MeshParser};
