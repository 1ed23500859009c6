//! Asset loading: Wavefront OBJ meshes into interleaved vertex buffers.

pub mod error;
pub mod mesh;
pub mod obj;

pub use error::{AttributeKind, MeshError, MeshResult};
pub use mesh::{InterleavedVertex, LoadedMesh, MeshStats, VertexBuffer, VertexLayout};
pub use obj::{FaceMode, LoadOptions, NormalPolicy, load_obj_from_path, load_obj_from_path_with};
