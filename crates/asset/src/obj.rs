//! Wavefront OBJ loader producing a flat, interleaved vertex buffer.
//!
//! Supports `v`, `vt`, `vn` and `f` records; every other directive is
//! skipped. Face reference groups take the shapes `N`, `N/M`, `N//K` and
//! `N/M/K`, with 1-based indices into tables declared earlier in the file.
//! Each reference group becomes one 8-float vertex (position, texcoord,
//! normal) with absent attributes zero-filled.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
    str::SplitWhitespace,
};

use crate::error::{AttributeKind, MeshError, MeshResult};
use crate::mesh::{AttributeTables, InterleavedVertex, LoadedMesh, MeshStats, VertexBuffer};

/// Source name used in errors for readers and string inputs.
pub const MEMORY_SOURCE: &str = "<memory>";

/// How faces without reachable normal data are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NormalPolicy {
    /// Any face seen while no `vn` record exists fails the load.
    #[default]
    Required,
    /// Faces may omit normals; absent normals are zero-filled.
    Optional,
}

/// How reference groups of a face are emitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FaceMode {
    /// One vertex per reference group, in source order. Faces with more
    /// than three groups are not triangulated.
    #[default]
    AsAuthored,
    /// Fan triangulation: `(g0, gi, gi+1)` for every `i` in `1..n-1`.
    TriangleFan,
}

/// Per-load configuration. The default requires normals, emits faces as
/// authored and accepts `.obj` paths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    /// Whether faces may omit normal data.
    pub normals: NormalPolicy,
    /// How face reference groups are emitted.
    pub faces: FaceMode,
    /// Recognised file extension, without the dot. Case-insensitive.
    pub extension: &'static str,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            normals: NormalPolicy::default(),
            faces: FaceMode::default(),
            extension: "obj",
        }
    }
}

impl LoadOptions {
    /// Set the normal policy.
    pub fn with_normals(mut self, normals: NormalPolicy) -> Self {
        self.normals = normals;
        self
    }

    /// Set the face emission mode.
    pub fn with_faces(mut self, faces: FaceMode) -> Self {
        self.faces = faces;
        self
    }

    /// Set the recognised extension, e.g. `"obj"`.
    pub fn with_extension(mut self, extension: &'static str) -> Self {
        self.extension = extension;
        self
    }
}

/// Load an OBJ mesh from a file path using default options.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> MeshResult<LoadedMesh> {
    load_obj_from_path_with(path, &LoadOptions::default())
}

/// Load an OBJ mesh from a file path.
///
/// The extension is checked before the file is opened. The file handle is
/// scoped to this call and closed on every exit path.
pub fn load_obj_from_path_with(
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> MeshResult<LoadedMesh> {
    let path = path.as_ref();
    ensure_supported_extension(path, options)?;

    let file = File::open(path)?;
    scan(BufReader::new(file), path.display().to_string(), options)
}

/// Load an OBJ mesh from a [`BufRead`] implementation. No extension check.
pub fn load_obj_from_reader<R: BufRead>(
    reader: R,
    options: &LoadOptions,
) -> MeshResult<LoadedMesh> {
    scan(reader, MEMORY_SOURCE.to_owned(), options)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(
    contents: &str,
    options: &LoadOptions,
) -> MeshResult<LoadedMesh> {
    load_obj_from_reader(io::Cursor::new(contents), options)
}

/// Reject paths whose extension is not the recognised mesh extension.
/// The comparison ignores ASCII case, so `Cube.OBJ` is accepted.
pub fn ensure_supported_extension(path: &Path, options: &LoadOptions) -> MeshResult<()> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default();

    if extension.eq_ignore_ascii_case(options.extension) {
        Ok(())
    } else {
        Err(MeshError::UnsupportedFormat {
            extension,
            expected: options.extension,
        })
    }
}

/// A classified source line.
#[derive(Debug)]
enum Record<'a> {
    Position(SplitWhitespace<'a>),
    TexCoord(SplitWhitespace<'a>),
    Normal(SplitWhitespace<'a>),
    Face(SplitWhitespace<'a>),
    Ignored(Option<&'a str>),
}

fn classify(line: &str) -> Record<'_> {
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some("v") => Record::Position(tokens),
        Some("vt") => Record::TexCoord(tokens),
        Some("vn") => Record::Normal(tokens),
        Some("f") => Record::Face(tokens),
        other => Record::Ignored(other),
    }
}

/// One reference group of a face, with raw 1-based indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct VertexRef {
    position: i64,
    tex_coord: Option<i64>,
    normal: Option<i64>,
}

/// Split `N`, `N/M`, `N//K` or `N/M/K`. An empty field is only allowed
/// as the texcoord slot between two slashes.
fn parse_vertex_ref(token: &str) -> Option<VertexRef> {
    let fields: Vec<&str> = token.split('/').collect();
    let index = |field: &str| field.parse::<i64>().ok();

    match fields.as_slice() {
        [p] => Some(VertexRef {
            position: index(*p)?,
            tex_coord: None,
            normal: None,
        }),
        [p, t] => Some(VertexRef {
            position: index(*p)?,
            tex_coord: Some(index(*t)?),
            normal: None,
        }),
        [p, "", n] => Some(VertexRef {
            position: index(*p)?,
            tex_coord: None,
            normal: Some(index(*n)?),
        }),
        [p, t, n] => Some(VertexRef {
            position: index(*p)?,
            tex_coord: Some(index(*t)?),
            normal: Some(index(*n)?),
        }),
        _ => None,
    }
}

/// Parse at least `N` floats; extra trailing components (e.g. `w`) are
/// validated but dropped.
fn parse_components<const N: usize>(tokens: SplitWhitespace<'_>) -> Option<[f32; N]> {
    let mut out = [0.0f32; N];
    let mut count = 0;
    for token in tokens {
        let value = token.parse::<f32>().ok()?;
        if count < N {
            out[count] = value;
        }
        count += 1;
    }
    (count >= N).then_some(out)
}

/// State of one load call. Nothing here outlives [`scan`].
struct Scanner<'o> {
    source_name: String,
    options: &'o LoadOptions,
    tables: AttributeTables,
    buffer: VertexBuffer,
    faces: usize,
}

fn scan<R: BufRead>(
    reader: R,
    source_name: String,
    options: &LoadOptions,
) -> MeshResult<LoadedMesh> {
    log::debug!("Loading mesh from {} ({:?})", source_name, options);

    let mut scanner = Scanner {
        source_name,
        options,
        tables: AttributeTables::default(),
        buffer: VertexBuffer::new(),
        faces: 0,
    };

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        scanner.line(line_no + 1, &line)?;
    }

    Ok(scanner.finish())
}

impl Scanner<'_> {
    fn line(&mut self, line_no: usize, line: &str) -> MeshResult<()> {
        match classify(line) {
            Record::Position(tokens) => {
                let p = self.attribute::<3>(tokens, line_no, line)?;
                self.tables.positions.push(p);
            }
            Record::TexCoord(tokens) => {
                let t = self.attribute::<2>(tokens, line_no, line)?;
                self.tables.tex_coords.push(t);
            }
            Record::Normal(tokens) => {
                let n = self.attribute::<3>(tokens, line_no, line)?;
                self.tables.normals.push(n);
            }
            Record::Face(tokens) => self.face(tokens, line_no, line)?,
            Record::Ignored(tag) => {
                if let Some(tag) = tag {
                    log::trace!("{}:{}: skipping '{}'", self.source_name, line_no, tag);
                }
            }
        }
        Ok(())
    }

    fn attribute<const N: usize>(
        &self,
        tokens: SplitWhitespace<'_>,
        line_no: usize,
        line: &str,
    ) -> MeshResult<[f32; N]> {
        parse_components::<N>(tokens).ok_or_else(|| MeshError::MalformedAttribute {
            source_name: self.source_name.clone(),
            line: line_no,
            content: line.trim().to_owned(),
        })
    }

    fn face(&mut self, tokens: SplitWhitespace<'_>, line_no: usize, line: &str) -> MeshResult<()> {
        if self.options.normals == NormalPolicy::Required && self.tables.normals.is_empty() {
            return Err(self.missing_normals(line_no));
        }

        let mut corners: Vec<InterleavedVertex> = Vec::new();
        for token in tokens {
            let vref = parse_vertex_ref(token).ok_or_else(|| self.malformed_face(line_no, token))?;
            corners.push(self.resolve(vref, line_no)?);
        }

        if corners.len() < 3 {
            return Err(self.malformed_face(line_no, line.trim()));
        }

        match self.options.faces {
            FaceMode::AsAuthored => {
                for corner in corners {
                    self.buffer.push(corner);
                }
            }
            FaceMode::TriangleFan => {
                for i in 1..corners.len() - 1 {
                    self.buffer.push(corners[0]);
                    self.buffer.push(corners[i]);
                    self.buffer.push(corners[i + 1]);
                }
            }
        }
        self.faces += 1;
        Ok(())
    }

    fn resolve(&self, vref: VertexRef, line_no: usize) -> MeshResult<InterleavedVertex> {
        let tables = &self.tables;
        let position =
            self.lookup(&tables.positions, AttributeKind::Position, vref.position, line_no)?;

        let tex_coord = match vref.tex_coord {
            Some(index) => {
                self.lookup(&tables.tex_coords, AttributeKind::TexCoord, index, line_no)?
            }
            None => [0.0, 0.0],
        };

        // A normal reference into an empty table means the mesh has no normals at all.
        let normal = match vref.normal {
            Some(_) if tables.normals.is_empty() => return Err(self.missing_normals(line_no)),
            Some(index) => self.lookup(&tables.normals, AttributeKind::Normal, index, line_no)?,
            None => [0.0, 0.0, 0.0],
        };

        Ok(InterleavedVertex::new(position, tex_coord, normal))
    }

    /// Translate a 1-based index into the table; non-positive or past-the-end
    /// indices are errors, never clamped.
    fn lookup<const N: usize>(
        &self,
        table: &[[f32; N]],
        kind: AttributeKind,
        index: i64,
        line_no: usize,
    ) -> MeshResult<[f32; N]> {
        usize::try_from(index)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| table.get(i))
            .copied()
            .ok_or_else(|| MeshError::IndexOutOfRange {
                source_name: self.source_name.clone(),
                line: line_no,
                kind,
                index,
                len: table.len(),
            })
    }

    fn malformed_face(&self, line_no: usize, token: &str) -> MeshError {
        MeshError::MalformedFaceReference {
            source_name: self.source_name.clone(),
            line: line_no,
            token: token.to_owned(),
        }
    }

    fn missing_normals(&self, line_no: usize) -> MeshError {
        MeshError::MissingNormalData {
            source_name: self.source_name.clone(),
            line: line_no,
        }
    }

    fn finish(self) -> LoadedMesh {
        let stats = MeshStats {
            positions: self.tables.positions.len(),
            tex_coords: self.tables.tex_coords.len(),
            normals: self.tables.normals.len(),
            faces: self.faces,
            vertices: self.buffer.vertex_count(),
        };
        log::info!(
            "Loaded {}: {} faces, {} vertices ({} positions, {} texcoords, {} normals)",
            self.source_name,
            stats.faces,
            stats.vertices,
            stats.positions,
            stats.tex_coords,
            stats.normals
        );
        LoadedMesh {
            buffer: self.buffer,
            stats,
        }
    }
}
