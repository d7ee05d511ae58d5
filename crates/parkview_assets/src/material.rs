//! Material Library Parser
//!
//! Parses the MTL subset exported for the park models into reflectance records.
//!
//! ## Format
//!
//! ```text
//! # Blender MTL File              <- block 0: preamble, discarded
//! # Material Count: 2
//!
//! newmtl Frame                    <- one block per material
//! Ns 250.000000                   <- shininess numerator (÷ 100)
//! Ka 1.000000 1.000000 1.000000   <- ambient
//! Kd 0.800000 0.050000 0.050000   <- diffuse
//! Ks 0.500000 0.500000 0.500000   <- specular
//! Ke 0.000000 0.000000 0.000000   <- ignored
//! illum 2                         <- ignored
//!
//! newmtl Tire
//! ...
//! ```
//!
//! Blocks are separated by one or more blank lines.

use std::collections::HashMap;

use parkview_shared::Vec3;
use tracing::debug;

use crate::error::{ParseError, ParseResult};
use crate::scan::{self, Line};

/// Document name used when the caller does not supply one.
const ANONYMOUS_LIBRARY: &str = "<material library>";

/// Reflectance record for one named material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Specular exponent normalized to roughly [0, 1] (`Ns / 100`).
    pub shininess: f32,
    /// Ambient color.
    pub ambient: Vec3,
    /// Diffuse color.
    pub diffuse: Vec3,
    /// Specular color.
    pub specular: Vec3,
}

/// Name → material mapping parsed from one library document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialLibrary {
    materials: HashMap<String, Material>,
}

impl MaterialLibrary {
    /// Parses an anonymous library document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] for a block missing a required key or holding a
    /// non-numeric value.
    pub fn parse(text: &str) -> ParseResult<Self> {
        Self::parse_named(ANONYMOUS_LIBRARY, text)
    }

    /// Parses a library document, naming it `document` in errors.
    ///
    /// # Errors
    ///
    /// See [`MaterialLibrary::parse`].
    pub fn parse_named(document: &str, text: &str) -> ParseResult<Self> {
        let mut materials = HashMap::new();

        for (index, block) in split_blocks(text).iter().enumerate() {
            let Some(first) = block.first() else {
                continue;
            };
            // The leading block is a file preamble unless it already defines a material.
            if index == 0 && first.tag() != Some("newmtl") {
                continue;
            }

            let (name, material) = parse_block(document, block)?;
            if materials.insert(name.clone(), material).is_some() {
                debug!(document, material = %name, "material redefined, keeping the later block");
            }
        }

        Ok(Self { materials })
    }

    /// Looks up a material by name.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// Number of materials.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// True when the library defines no material.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

/// Groups non-blank, non-comment lines into blocks separated by blank lines.
///
/// A document starting with a blank line yields an empty block 0, so the
/// preamble rule never swallows the first material.
fn split_blocks(text: &str) -> Vec<Vec<Line<'_>>> {
    let mut blocks: Vec<Vec<Line<'_>>> = vec![Vec::new()];

    for line in scan::lines(text) {
        if line.is_blank() {
            let open_block_used = blocks.last().is_some_and(|b| !b.is_empty());
            if open_block_used || blocks.len() == 1 {
                blocks.push(Vec::new());
            }
            continue;
        }
        if line.is_comment() {
            continue;
        }
        if let Some(block) = blocks.last_mut() {
            block.push(line);
        }
    }

    blocks
}

fn parse_block(document: &str, block: &[Line<'_>]) -> ParseResult<(String, Material)> {
    let header = &block[0];
    let name = match (header.tag(), header.args().first()) {
        (Some("newmtl"), Some(name)) => (*name).to_owned(),
        _ => return Err(header.malformed(document, "`newmtl <name>`")),
    };

    let mut shininess = None;
    let mut ambient = None;
    let mut diffuse = None;
    let mut specular = None;

    for line in &block[1..] {
        match line.tag() {
            Some("Ns") => {
                let [ns] = line.floats::<1>(document, "`Ns <exponent>`")?;
                shininess = Some(ns / 100.0);
            }
            Some("Ka") => ambient = Some(color(document, line, "`Ka r g b`")?),
            Some("Kd") => diffuse = Some(color(document, line, "`Kd r g b`")?),
            Some("Ks") => specular = Some(color(document, line, "`Ks r g b`")?),
            Some("newmtl") => {
                return Err(line.malformed(document, "a blank line before the next `newmtl`"))
            }
            _ => {}
        }
    }

    let missing = |key: &'static str| ParseError::MissingMaterialKey {
        document: document.to_owned(),
        line: header.number,
        material: name.clone(),
        key,
    };

    let material = Material {
        shininess: shininess.ok_or_else(|| missing("Ns"))?,
        ambient: ambient.ok_or_else(|| missing("Ka"))?,
        diffuse: diffuse.ok_or_else(|| missing("Kd"))?,
        specular: specular.ok_or_else(|| missing("Ks"))?,
    };

    Ok((name, material))
}

fn color(document: &str, line: &Line<'_>, expected: &'static str) -> ParseResult<Vec3> {
    line.floats::<3>(document, expected).map(Vec3::from_array)
}
