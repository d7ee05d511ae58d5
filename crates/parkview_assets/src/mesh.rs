//! # Mesh Parser
//!
//! Folds an OBJ-subset document into a [`VertexAttributeBundle`], baking the
//! active material into every emitted vertex (flat shading).
//!
//! ## Records
//!
//! | Tag      | Meaning                                         |
//! |----------|-------------------------------------------------|
//! | `v`      | position `x y z`                                |
//! | `vn`     | normal `x y z`                                  |
//! | `vt`     | texcoord `u v [w]`, `w` dropped                 |
//! | `usemtl` | switch the active material                      |
//! | `f`      | face `v/vt/vn ...`, 1-based or negative indices |
//!
//! Everything else (`#`, `o`, `g`, `s`, `mtllib`, ...) is skipped.

use parkview_shared::Vec3;
use serde::{Deserialize, Serialize};

use crate::bundle::VertexAttributeBundle;
use crate::error::{ParseError, ParseResult};
use crate::material::{Material, MaterialLibrary};
use crate::scan::{self, Line};

/// Document name used when the caller does not supply one.
const ANONYMOUS_MESH: &str = "<mesh>";

/// How faces with more than three references are turned into triangles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceMode {
    /// Keep only the first three references. The park models were authored
    /// against this behavior.
    #[default]
    FirstTriangle,
    /// Fan-triangulate around the first reference: `(0,1,2) (0,2,3) ...`
    Fan,
}

/// Configurable mesh parser.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeshParser {
    face_mode: FaceMode,
}

impl MeshParser {
    /// Parser with the default [`FaceMode::FirstTriangle`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the polygon handling.
    #[must_use]
    pub fn with_face_mode(mut self, face_mode: FaceMode) -> Self {
        self.face_mode = face_mode;
        self
    }

    /// Current polygon handling.
    #[must_use]
    pub fn face_mode(&self) -> FaceMode {
        self.face_mode
    }

    /// Parses `text`, naming it `document` in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] for malformed records, a face before any
    /// `usemtl`, an unknown material, or an out-of-range index.
    pub fn parse(
        &self,
        document: &str,
        text: &str,
        materials: &MaterialLibrary,
    ) -> ParseResult<VertexAttributeBundle> {
        let ctx = FoldContext {
            document,
            materials,
            face_mode: self.face_mode,
        };

        scan::lines(text)
            .try_fold(MeshAccumulator::default(), |acc, line| acc.step(&ctx, &line))
            .map(MeshAccumulator::finish)
    }
}

/// Parses an anonymous mesh with the default face mode.
///
/// # Errors
///
/// See [`MeshParser::parse`].
pub fn parse_mesh(text: &str, materials: &MaterialLibrary) -> ParseResult<VertexAttributeBundle> {
    MeshParser::new().parse(ANONYMOUS_MESH, text, materials)
}

// =============================================================================
// FOLD
// =============================================================================

struct FoldContext<'a> {
    document: &'a str,
    materials: &'a MaterialLibrary,
    face_mode: FaceMode,
}

/// State threaded through the line fold.
#[derive(Default)]
struct MeshAccumulator<'m> {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    texcoords: Vec<[f32; 2]>,
    material: Option<&'m Material>,
    out: VertexAttributeBundle,
}

impl<'m> MeshAccumulator<'m> {
    fn step(mut self, ctx: &FoldContext<'m>, line: &Line<'_>) -> ParseResult<Self> {
        match line.tag() {
            Some("v") => {
                let xyz = line.floats::<3>(ctx.document, "`v x y z`")?;
                self.positions.push(Vec3::from_array(xyz));
            }
            Some("vn") => {
                let xyz = line.floats::<3>(ctx.document, "`vn x y z`")?;
                self.normals.push(Vec3::from_array(xyz));
            }
            Some("vt") => {
                let uv = line.floats::<2>(ctx.document, "`vt u v [w]`")?;
                self.texcoords.push(uv);
            }
            Some("usemtl") => {
                let Some(name) = line.args().first() else {
                    return Err(line.malformed(ctx.document, "`usemtl <name>`"));
                };
                let material =
                    ctx.materials
                        .get(name)
                        .ok_or_else(|| ParseError::UnknownMaterial {
                            document: ctx.document.to_owned(),
                            line: line.number,
                            name: (*name).to_owned(),
                        })?;
                self.material = Some(material);
            }
            Some("f") => self.face(ctx, line)?,
            _ => {}
        }
        Ok(self)
    }

    fn face(&mut self, ctx: &FoldContext<'m>, line: &Line<'_>) -> ParseResult<()> {
        let material = self.material.ok_or_else(|| ParseError::FaceBeforeMaterial {
            document: ctx.document.to_owned(),
            line: line.number,
        })?;

        let args = line.args();
        if args.len() < 3 {
            return Err(line.malformed(ctx.document, "a face with at least three references"));
        }

        let refs = args
            .iter()
            .map(|token| self.resolve(ctx.document, line, token))
            .collect::<ParseResult<Vec<_>>>()?;

        match ctx.face_mode {
            FaceMode::FirstTriangle => {
                for r in &refs[..3] {
                    self.emit(r, material);
                }
            }
            FaceMode::Fan => {
                for i in 1..refs.len() - 1 {
                    for r in [&refs[0], &refs[i], &refs[i + 1]] {
                        self.emit(r, material);
                    }
                }
            }
        }
        Ok(())
    }

    fn emit(&mut self, r: &ResolvedRef, material: &Material) {
        if let Some(p) = r.position {
            self.out.push_position(self.positions[p]);
        }
        if let Some(t) = r.texcoord {
            self.out.push_texcoord(self.texcoords[t]);
        }
        if let Some(n) = r.normal {
            self.out.push_normal(self.normals[n]);
        }
        self.out.push_material(material);
    }

    /// Parses `v`, `v/vt`, `v//vn` or `v/vt/vn` into 0-based indices.
    fn resolve(&self, document: &str, line: &Line<'_>, token: &str) -> ParseResult<ResolvedRef> {
        const EXPECTED: &str = "face references `v/vt/vn`";

        let mut parts = token.split('/');
        let mut slot = |attribute: &'static str, available: usize| -> ParseResult<Option<usize>> {
            match parts.next() {
                None | Some("") => Ok(None),
                Some(text) => {
                    let index: i64 = text
                        .parse()
                        .map_err(|_| line.malformed(document, EXPECTED))?;
                    to_offset(index, available)
                        .map(Some)
                        .ok_or_else(|| ParseError::IndexOutOfRange {
                            document: document.to_owned(),
                            line: line.number,
                            attribute,
                            index,
                            available,
                        })
                }
            }
        };

        let position = slot("position", self.positions.len())?;
        let texcoord = slot("texcoord", self.texcoords.len())?;
        let normal = slot("normal", self.normals.len())?;
        if parts.next().is_some() {
            return Err(line.malformed(document, EXPECTED));
        }

        Ok(ResolvedRef {
            position,
            texcoord,
            normal,
        })
    }

    fn finish(self) -> VertexAttributeBundle {
        self.out
    }
}

/// One face reference with 0-based indices into the fold's pools.
struct ResolvedRef {
    position: Option<usize>,
    texcoord: Option<usize>,
    normal: Option<usize>,
}

/// 1-based index, or negative index counted back from the end.
fn to_offset(index: i64, available: usize) -> Option<usize> {
    let available = i64::try_from(available).ok()?;
    let offset = match index {
        0 => return None,
        i if i > 0 => i - 1,
        i => available + i,
    };
    (0..available)
        .contains(&offset)
        .then(|| usize::try_from(offset).ok())
        .flatten()
}
