//! # Asset Catalog
//!
//! Load-once registry from asset id to parsed [`VertexAttributeBundle`].
//! Built at startup, then shared read-only (`&AssetCatalog` or `Arc`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::bundle::VertexAttributeBundle;
use crate::error::{AssetError, AssetResult};
use crate::manifest::AssetManifest;
use crate::material::MaterialLibrary;
use crate::mesh::MeshParser;

/// Immutable id → bundle map.
#[derive(Debug, Default)]
pub struct AssetCatalog {
    assets: HashMap<String, VertexAttributeBundle>,
}

impl AssetCatalog {
    /// Builds a catalog from in-memory `(id, mesh_text, material_text)` triples
    /// with the default parser.
    ///
    /// # Errors
    ///
    /// The first parse failure, or [`AssetError::DuplicateAsset`].
    pub fn from_documents<I, S>(documents: I) -> AssetResult<Self>
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: AsRef<str>,
    {
        Self::from_documents_with(&MeshParser::new(), documents)
    }

    /// As [`AssetCatalog::from_documents`] with an explicit parser.
    ///
    /// # Errors
    ///
    /// See [`AssetCatalog::from_documents`].
    pub fn from_documents_with<I, S>(parser: &MeshParser, documents: I) -> AssetResult<Self>
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: AsRef<str>,
    {
        let mut catalog = Self::default();
        for (id, mesh, material) in documents {
            let id = id.as_ref();
            let library = MaterialLibrary::parse_named(&format!("{id}.mtl"), material.as_ref())?;
            let bundle = parser.parse(&format!("{id}.obj"), mesh.as_ref(), &library)?;
            catalog.insert(id, bundle)?;
        }
        Ok(catalog)
    }

    /// Reads and parses every manifest entry from disk. Material libraries
    /// shared by several meshes are parsed once.
    ///
    /// # Errors
    ///
    /// [`AssetError::Io`] for unreadable files, [`AssetError::Parse`] for
    /// broken documents, [`AssetError::DuplicateAsset`] for repeated ids.
    pub fn load(manifest: &AssetManifest, parser: &MeshParser) -> AssetResult<Self> {
        manifest.validate()?;

        let mut libraries: HashMap<PathBuf, Arc<MaterialLibrary>> = HashMap::new();
        let mut catalog = Self::default();

        for entry in &manifest.assets {
            let material_path = manifest.resolve(&entry.material);
            let library = match libraries.get(&material_path) {
                Some(lib) => Arc::clone(lib),
                None => {
                    let text = read_document(&material_path)?;
                    let lib = Arc::new(MaterialLibrary::parse_named(
                        &material_path.display().to_string(),
                        &text,
                    )?);
                    debug!(path = %material_path.display(), materials = lib.len(), "parsed material library");
                    libraries.insert(material_path, Arc::clone(&lib));
                    lib
                }
            };

            let mesh_path = manifest.resolve(&entry.mesh);
            let text = read_document(&mesh_path)?;
            let bundle = parser.parse(&mesh_path.display().to_string(), &text, &library)?;
            debug!(id = %entry.id, vertices = bundle.vertex_count(), "parsed mesh");

            catalog.insert(&entry.id, bundle)?;
        }

        info!(
            assets = catalog.len(),
            libraries = libraries.len(),
            vertices = catalog.total_vertices(),
            "asset catalog loaded"
        );
        Ok(catalog)
    }

    fn insert(&mut self, id: &str, bundle: VertexAttributeBundle) -> AssetResult<()> {
        if self.assets.contains_key(id) {
            return Err(AssetError::DuplicateAsset(id.to_owned()));
        }
        self.assets.insert(id.to_owned(), bundle);
        Ok(())
    }

    /// Looks up a bundle. Absent ids are a normal outcome.
    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&VertexAttributeBundle> {
        self.assets.get(id)
    }

    /// Looks up a bundle that must exist.
    ///
    /// # Errors
    ///
    /// [`AssetError::NotFound`] for an unknown id.
    pub fn require(&self, id: &str) -> AssetResult<&VertexAttributeBundle> {
        self.get(id).ok_or_else(|| AssetError::NotFound(id.to_owned()))
    }

    /// True when `id` is loaded.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.assets.contains_key(id)
    }

    /// Number of assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// True when nothing is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Loaded ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.assets.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Sum of vertex counts across all bundles.
    #[must_use]
    pub fn total_vertices(&self) -> usize {
        self.assets.values().map(VertexAttributeBundle::vertex_count).sum()
    }
}

fn read_document(path: &Path) -> AssetResult<String> {
    std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}
