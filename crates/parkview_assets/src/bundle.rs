//! # Vertex Attribute Bundle
//!
//! Flat, GPU-ready attribute streams for one mesh.
//!
//! ## Layout
//!
//! | Attribute | Shader name       | Components |
//! |-----------|-------------------|------------|
//! | position  | `a_position`      | 3          |
//! | normal    | `a_normal`        | 3          |
//! | texcoord  | `a_texCoord`      | 2          |
//! | ambient   | `a_ambientColor`  | 4 (rgba)   |
//! | diffuse   | `a_diffuseColor`  | 4 (rgba)   |
//! | specular  | `a_specularColor` | 4 (rgba)   |
//! | shininess | `a_shininess`     | 1          |
//!
//! Material streams get exactly one entry per emitted vertex. Position,
//! normal and texcoord are only pushed when the face reference supplies the
//! index, so a mesh without normals has an empty normal stream. Consumers
//! bind each stream positionally.

use parkview_shared::Vec3;

use crate::material::Material;

/// The seven vertex attribute streams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// Object-space position
    Position,
    /// Object-space normal
    Normal,
    /// Texture coordinate (u, v)
    Texcoord,
    /// Ambient color, alpha 1
    Ambient,
    /// Diffuse color, alpha 1
    Diffuse,
    /// Specular color, alpha 1
    Specular,
    /// Normalized specular exponent
    Shininess,
}

impl AttributeKind {
    /// Every stream, in upload order.
    pub const ALL: [Self; 7] = [
        Self::Position,
        Self::Normal,
        Self::Texcoord,
        Self::Ambient,
        Self::Diffuse,
        Self::Specular,
        Self::Shininess,
    ];

    /// Floats per vertex.
    #[inline]
    #[must_use]
    pub const fn components(self) -> usize {
        match self {
            Self::Position | Self::Normal => 3,
            Self::Texcoord => 2,
            Self::Ambient | Self::Diffuse | Self::Specular => 4,
            Self::Shininess => 1,
        }
    }

    /// Attribute name the park shaders bind.
    #[must_use]
    pub const fn shader_name(self) -> &'static str {
        match self {
            Self::Position => "a_position",
            Self::Normal => "a_normal",
            Self::Texcoord => "a_texCoord",
            Self::Ambient => "a_ambientColor",
            Self::Diffuse => "a_diffuseColor",
            Self::Specular => "a_specularColor",
            Self::Shininess => "a_shininess",
        }
    }
}

/// Parsed mesh, flattened to per-vertex streams.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexAttributeBundle {
    /// xyz per vertex
    pub positions: Vec<f32>,
    /// xyz per vertex, when the mesh has normals
    pub normals: Vec<f32>,
    /// uv per vertex, when the mesh has texture coordinates
    pub texcoords: Vec<f32>,
    /// rgba per vertex
    pub ambient: Vec<f32>,
    /// rgba per vertex
    pub diffuse: Vec<f32>,
    /// rgba per vertex
    pub specular: Vec<f32>,
    /// one per vertex
    pub shininess: Vec<f32>,
}

impl VertexAttributeBundle {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of emitted vertices (one shininess entry each).
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.shininess.len()
    }

    /// True when no face was emitted.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shininess.is_empty()
    }

    /// Borrow one stream.
    #[must_use]
    pub fn attribute(&self, kind: AttributeKind) -> &[f32] {
        match kind {
            AttributeKind::Position => &self.positions,
            AttributeKind::Normal => &self.normals,
            AttributeKind::Texcoord => &self.texcoords,
            AttributeKind::Ambient => &self.ambient,
            AttributeKind::Diffuse => &self.diffuse,
            AttributeKind::Specular => &self.specular,
            AttributeKind::Shininess => &self.shininess,
        }
    }

    /// Raw bytes of one stream for buffer upload.
    #[inline]
    #[must_use]
    pub fn attribute_bytes(&self, kind: AttributeKind) -> &[u8] {
        bytemuck::cast_slice(self.attribute(kind))
    }

    /// Iterates `(kind, bytes)` for every non-empty stream.
    pub fn buffers(&self) -> impl Iterator<Item = (AttributeKind, &[u8])> {
        AttributeKind::ALL
            .into_iter()
            .map(|kind| (kind, self.attribute_bytes(kind)))
            .filter(|(_, bytes)| !bytes.is_empty())
    }

    /// Total bytes across all streams.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        AttributeKind::ALL
            .into_iter()
            .map(|kind| self.attribute_bytes(kind).len())
            .sum()
    }

    // =========================================================================
    // BUILDING
    // =========================================================================

    pub(crate) fn push_position(&mut self, p: Vec3) {
        self.positions.extend_from_slice(&p.to_array());
    }

    pub(crate) fn push_normal(&mut self, n: Vec3) {
        self.normals.extend_from_slice(&n.to_array());
    }

    pub(crate) fn push_texcoord(&mut self, uv: [f32; 2]) {
        self.texcoords.extend_from_slice(&uv);
    }

    /// Bakes one vertex worth of material into the color streams.
    pub(crate) fn push_material(&mut self, material: &Material) {
        push_rgba(&mut self.ambient, material.ambient);
        push_rgba(&mut self.diffuse, material.diffuse);
        push_rgba(&mut self.specular, material.specular);
        self.shininess.push(material.shininess);
    }
}

#[inline]
fn push_rgba(stream: &mut Vec<f32>, color: Vec3) {
    stream.extend_from_slice(&[color.x, color.y, color.z, 1.0]);
}
