//! # Asset Manifest
//!
//! Names every `(mesh, material)` document pair the catalog loads.
//!
//! ```toml
//! root = "assets"
//!
//! [[asset]]
//! id = "tree1"
//! mesh = "Decorators/Tile/Tree/tree1.obj"
//! material = "Decorators/Tile/Tree/tree.mtl"
//! ```
//!
//! Paths are relative to `root`. Several entries may share a material library.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use parkview_shared::asset_ids;
use serde::{Deserialize, Serialize};

use crate::error::{AssetError, AssetResult};

/// One named document pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    /// Catalog id the renderer looks up
    pub id: String,
    /// Mesh document, relative to the manifest root
    pub mesh: PathBuf,
    /// Material library, relative to the manifest root
    pub material: PathBuf,
}

impl AssetEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(id: impl Into<String>, mesh: impl Into<PathBuf>, material: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            mesh: mesh.into(),
            material: material.into(),
        }
    }
}

/// The list of assets to load and where they live.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Directory the entry paths are relative to
    #[serde(default)]
    pub root: PathBuf,
    /// Entries, in load order
    #[serde(default, rename = "asset")]
    pub assets: Vec<AssetEntry>,
}

/// `(id, mesh, material)` for the park scene, relative to the asset root.
const PARK_ASSETS: [(&str, &str, &str); 14] = [
    (
        asset_ids::BASKETBALL_COURT,
        "Decorators/Scalable/Basketball_Court/basketball_court.obj",
        "Decorators/Scalable/Basketball_Court/basketball_court.mtl",
    ),
    (
        asset_ids::BIKE,
        "Bike/Bike_Frame/bike_frame.obj",
        "Bike/Bike_Frame/bike_frame.mtl",
    ),
    (
        asset_ids::DESTINATION,
        "Destination/destination.obj",
        "Destination/destination.mtl",
    ),
    (
        asset_ids::FOOTBALL_FIELD,
        "Decorators/Scalable/Football_Field/football_field.obj",
        "Decorators/Scalable/Football_Field/football_field.mtl",
    ),
    (
        asset_ids::FOUNTAIN,
        "Decorators/Scalable/Fountain/fountain.obj",
        "Decorators/Scalable/Fountain/fountain.mtl",
    ),
    (asset_ids::GRASS, "Tiles/Grass/grass.obj", "Tiles/Grass/grass.mtl"),
    (
        asset_ids::ROCK1,
        "Decorators/Tile/Rock/rock1.obj",
        "Decorators/Tile/Rock/rock.mtl",
    ),
    (
        asset_ids::ROCK2,
        "Decorators/Tile/Rock/rock2.obj",
        "Decorators/Tile/Rock/rock.mtl",
    ),
    (asset_ids::ROAD, "Tiles/Road/road.obj", "Tiles/Road/road.mtl"),
    (
        asset_ids::TRAFFIC_LIGHT,
        "Traffic_Light/traffic_light.obj",
        "Traffic_Light/traffic_light.mtl",
    ),
    (
        asset_ids::TRASH_CAN,
        "Decorators/Tile/Trash_Can/trash_can.obj",
        "Decorators/Tile/Trash_Can/trash_can.mtl",
    ),
    (
        asset_ids::TREE1,
        "Decorators/Tile/Tree/tree1.obj",
        "Decorators/Tile/Tree/tree.mtl",
    ),
    (
        asset_ids::TREE2,
        "Decorators/Tile/Tree/tree2.obj",
        "Decorators/Tile/Tree/tree.mtl",
    ),
    (
        asset_ids::WHEEL,
        "Bike/Bike_Wheel/bike_wheel.obj",
        "Bike/Bike_Wheel/bike_wheel.mtl",
    ),
];

impl AssetManifest {
    /// The fixed park manifest, rooted at `root`.
    #[must_use]
    pub fn park<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            assets: PARK_ASSETS
                .iter()
                .map(|&(id, mesh, material)| AssetEntry::new(id, mesh, material))
                .collect(),
        }
    }

    /// Parses a TOML manifest and checks ids are unique.
    ///
    /// # Errors
    ///
    /// [`AssetError::InvalidManifest`] on bad TOML, [`AssetError::DuplicateAsset`]
    /// when two entries share an id.
    pub fn from_toml_str(text: &str) -> AssetResult<Self> {
        let manifest: Self =
            toml::from_str(text).map_err(|e| AssetError::InvalidManifest(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Reads and parses a TOML manifest file. A relative `root` is resolved
    /// against the manifest's own directory.
    ///
    /// # Errors
    ///
    /// [`AssetError::Io`] when the file cannot be read, otherwise as
    /// [`AssetManifest::from_toml_str`].
    pub fn load<P: AsRef<Path>>(path: P) -> AssetResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut manifest = Self::from_toml_str(&text)?;
        if manifest.root.is_relative() {
            if let Some(dir) = path.parent() {
                manifest.root = dir.join(&manifest.root);
            }
        }
        Ok(manifest)
    }

    /// Rejects duplicate ids.
    ///
    /// # Errors
    ///
    /// [`AssetError::DuplicateAsset`] naming the first repeated id.
    pub fn validate(&self) -> AssetResult<()> {
        let mut seen = HashSet::with_capacity(self.assets.len());
        for entry in &self.assets {
            if !seen.insert(entry.id.as_str()) {
                return Err(AssetError::DuplicateAsset(entry.id.clone()));
            }
        }
        Ok(())
    }

    /// Absolute-or-root-relative path of a document.
    #[must_use]
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// True when there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
