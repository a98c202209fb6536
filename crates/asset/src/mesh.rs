//! CPU-side mesh representation produced by the OBJ parser.

/// One face corner: 0-based indices into the position/texcoord/normal
/// streams. Texcoord/normal default to 0 when the source omits them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VertexRef {
    pub position: u32,
    pub texcoord: u32,
    pub normal: u32,
}

/// Raw attribute streams plus the face corner list, exactly as declared in
/// the source file. Faces are not triangulated: an n-corner face contributes
/// n entries to `triangles`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub triangles: Vec<VertexRef>,
}

impl MeshData {
    /// Number of indices a triangle-list draw of this mesh consumes.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.triangles.len()
    }

    /// An empty mesh draws nothing; it is a valid state, not an error.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mesh_has_zero_vertex_count() {
        let mesh = MeshData::default();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
    }

    #[test]
    fn vertex_count_follows_triangles() {
        let mesh = MeshData {
            positions: vec![[0.0; 3]; 3],
            triangles: vec![VertexRef::default(); 3],
            ..Default::default()
        };
        assert_eq!(mesh.vertex_count(), 3);
    }
}
