//! CPU-side mesh data produced by the loader: attribute tables and the
//! interleaved vertex buffer handed to the upload collaborator.

use bytemuck::{Pod, Zeroable};

/// One interleaved vertex: position, texture coordinate, normal.
/// Absent attributes are zero-filled; the layout is always 8 floats.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct InterleavedVertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
    pub normal: [f32; 3],
}

impl InterleavedVertex {
    pub fn new(position: [f32; 3], tex_coord: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            tex_coord,
            normal,
        }
    }
}

/// Offset/width of a single attribute inside a vertex, in floats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeSlot {
    pub offset: usize,
    pub components: usize,
}

/// Stride and attribute offsets the upload sink binds the buffer with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexLayout {
    pub stride: usize,
    pub position: AttributeSlot,
    pub tex_coord: AttributeSlot,
    pub normal: AttributeSlot,
}

impl VertexLayout {
    pub const INTERLEAVED: VertexLayout = VertexLayout {
        stride: 8,
        position: AttributeSlot {
            offset: 0,
            components: 3,
        },
        tex_coord: AttributeSlot {
            offset: 3,
            components: 2,
        },
        normal: AttributeSlot {
            offset: 5,
            components: 3,
        },
    };

    /// Stride in bytes for 32-bit floats.
    pub const fn stride_bytes(&self) -> usize {
        self.stride * std::mem::size_of::<f32>()
    }
}

/// Position/texcoord/normal tables accumulated during one load.
/// Owned by a single load call and dropped when it returns.
#[derive(Clone, Debug, Default)]
pub struct AttributeTables {
    pub positions: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
}

/// Flat interleaved vertex buffer in face-traversal order. Not indexed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexBuffer {
    vertices: Vec<InterleavedVertex>,
}

impl VertexBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, vertex: InterleavedVertex) {
        self.vertices.push(vertex);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex(&self, index: usize) -> Option<&InterleavedVertex> {
        self.vertices.get(index)
    }

    pub fn vertices(&self) -> &[InterleavedVertex] {
        &self.vertices
    }

    /// The buffer as a flat float sequence, 8 floats per vertex.
    pub fn as_slice(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw bytes ready for a GPU buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Hand the flat float sequence over to the caller.
    pub fn into_inner(self) -> Vec<f32> {
        let stride = VertexLayout::INTERLEAVED.stride;
        let mut floats = Vec::with_capacity(self.vertices.len() * stride);
        for vertex in &self.vertices {
            floats.extend_from_slice(&vertex.position);
            floats.extend_from_slice(&vertex.tex_coord);
            floats.extend_from_slice(&vertex.normal);
        }
        floats
    }
}

/// Record counts gathered while scanning a source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshStats {
    pub positions: usize,
    pub tex_coords: usize,
    pub normals: usize,
    pub faces: usize,
    pub vertices: usize,
}

/// Result of a successful load: the buffer plus what went into it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadedMesh {
    pub buffer: VertexBuffer,
    pub stats: MeshStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AttributeKind;

    #[test]
    fn vertex_is_eight_floats() {
        assert_eq!(
            std::mem::size_of::<InterleavedVertex>(),
            VertexLayout::INTERLEAVED.stride_bytes()
        );
        assert_eq!(VertexLayout::INTERLEAVED.stride_bytes(), 32);
    }

    #[test]
    fn flat_view_matches_layout_offsets() {
        let mut buf = VertexBuffer::new();
        buf.push(InterleavedVertex::new(
            [1.0, 2.0, 3.0],
            [4.0, 5.0],
            [6.0, 7.0, 8.0],
        ));
        let layout = VertexLayout::INTERLEAVED;
        let floats = buf.as_slice();
        assert_eq!(floats.len(), layout.stride);
        assert_eq!(floats[layout.position.offset], 1.0);
        assert_eq!(floats[layout.tex_coord.offset], 4.0);
        assert_eq!(floats[layout.normal.offset], 6.0);
        assert_eq!(buf.as_bytes().len(), 32);
    }

    #[test]
    fn layout_widths_match_attribute_kinds() {
        let layout = VertexLayout::INTERLEAVED;
        assert_eq!(layout.position.components, AttributeKind::Position.width());
        assert_eq!(layout.tex_coord.components, AttributeKind::TexCoord.width());
        assert_eq!(layout.normal.components, AttributeKind::Normal.width());
        assert_eq!(
            layout.stride,
            AttributeKind::Position.width()
                + AttributeKind::TexCoord.width()
                + AttributeKind::Normal.width()
        );
    }

    #[test]
    fn into_inner_yields_flat_floats() {
        let mut buf = VertexBuffer::new();
        buf.push(InterleavedVertex::new([1.0, 2.0, 3.0], [4.0, 5.0], [6.0, 7.0, 8.0]));
        buf.push(InterleavedVertex::new([9.0, 0.0, 0.0], [0.0, 0.0], [0.0, 0.0, 1.0]));
        let count = buf.vertex_count();
        let expected = buf.as_slice().to_vec();

        let floats = buf.into_inner();
        assert_eq!(floats.len(), 8 * count);
        assert_eq!(floats, expected);
        assert_eq!(floats[8..11], [9.0, 0.0, 0.0]);
    }

    #[test]
    fn empty_buffer() {
        let buf = VertexBuffer::new();
        assert!(buf.is_empty());
        assert!(buf.as_slice().is_empty());
        assert!(buf.vertex(0).is_none());
    }
}
