//! GPU mesh upload: one vertex buffer per populated attribute slot plus a
//! u32 index buffer built from the position-index stream only.

use asset::MeshData;
use wgpu::{
    Buffer, BufferUsages, Device, IndexFormat, RenderPass, VertexBufferLayout, VertexStepMode,
    util::DeviceExt,
};

use crate::error::RenderError;

/// Attribute slot assignment: position = 0, texcoord = 1, normal = 2.
/// Slots for empty source streams stay unbound to save storage; the
/// pipeline and shader entry point are picked per layout instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshLayout {
    pub has_texcoords: bool,
    pub has_normals: bool,
}

const POSITION_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: 12,
    step_mode: VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
};
const TEXCOORD_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: 8,
    step_mode: VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![1 => Float32x2],
};
const NORMAL_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: 12,
    step_mode: VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![2 => Float32x3],
};

impl MeshLayout {
    pub fn of(mesh: &MeshData) -> Self {
        Self {
            has_texcoords: !mesh.texcoords.is_empty(),
            has_normals: !mesh.normals.is_empty(),
        }
    }

    /// Vertex buffer layouts in slot order, present attributes only.
    pub fn buffer_layouts(&self) -> Vec<VertexBufferLayout<'static>> {
        let mut layouts = vec![POSITION_LAYOUT];
        if self.has_texcoords {
            layouts.push(TEXCOORD_LAYOUT);
        }
        if self.has_normals {
            layouts.push(NORMAL_LAYOUT);
        }
        layouts
    }

    /// Shader entry point matching the bound attribute set.
    pub fn vertex_entry_point(&self) -> &'static str {
        match (self.has_texcoords, self.has_normals) {
            (false, false) => "vs_pos",
            (true, false) => "vs_pos_uv",
            (false, true) => "vs_pos_normal",
            (true, true) => "vs_pos_uv_normal",
        }
    }
}

/// Flatten the position-index stream for the index buffer, enforcing the
/// mesh invariant that every position index is in bounds. Texcoord/normal
/// indices participate in parsing only and are not validated here.
pub fn position_indices(mesh: &MeshData) -> Result<Vec<u32>, RenderError> {
    let len = mesh.positions.len();
    mesh.triangles
        .iter()
        .map(|r| {
            if (r.position as usize) < len {
                Ok(r.position)
            } else {
                Err(RenderError::IndexOutOfBounds {
                    index: r.position,
                    len,
                })
            }
        })
        .collect()
}

/// GPU-resident mesh. Buffers are released when the handle drops.
pub struct GpuMesh {
    positions: Option<Buffer>,
    texcoords: Option<Buffer>,
    normals: Option<Buffer>,
    indices: Option<Buffer>,
    vertex_count: u32,
    layout: MeshLayout,
}

impl GpuMesh {
    /// Upload a parsed mesh. Fails without allocating a partial handle if
    /// the index stream is out of bounds.
    pub fn build(device: &Device, mesh: &MeshData) -> Result<Self, RenderError> {
        let layout = MeshLayout::of(mesh);
        if mesh.is_empty() {
            return Ok(Self {
                positions: None,
                texcoords: None,
                normals: None,
                indices: None,
                vertex_count: 0,
                layout,
            });
        }

        let index_data = position_indices(mesh)?;

        let positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh positions"),
            contents: bytemuck::cast_slice(&mesh.positions),
            usage: BufferUsages::VERTEX,
        });
        let texcoords = layout.has_texcoords.then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh texcoords"),
                contents: bytemuck::cast_slice(&mesh.texcoords),
                usage: BufferUsages::VERTEX,
            })
        });
        let normals = layout.has_normals.then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh normals"),
                contents: bytemuck::cast_slice(&mesh.normals),
                usage: BufferUsages::VERTEX,
            })
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh IB"),
            contents: bytemuck::cast_slice(&index_data),
            usage: BufferUsages::INDEX,
        });

        log::info!(
            "mesh uploaded: {} indices, texcoords={}, normals={}",
            index_data.len(),
            layout.has_texcoords,
            layout.has_normals
        );

        Ok(Self {
            positions: Some(positions),
            texcoords,
            normals,
            vertex_count: index_data.len() as u32,
            indices: Some(indices),
            layout,
        })
    }

    #[inline]
    pub fn layout(&self) -> MeshLayout {
        self.layout
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Bind and draw. Drawing an empty mesh is a no-op, not a fault.
    pub fn draw(&self, rpass: &mut RenderPass<'_>) {
        let (Some(positions), Some(indices)) = (&self.positions, &self.indices) else {
            return;
        };

        let mut slot = 0;
        rpass.set_vertex_buffer(slot, positions.slice(..));
        slot += 1;
        if let Some(texcoords) = &self.texcoords {
            rpass.set_vertex_buffer(slot, texcoords.slice(..));
            slot += 1;
        }
        if let Some(normals) = &self.normals {
            rpass.set_vertex_buffer(slot, normals.slice(..));
        }
        rpass.set_index_buffer(indices.slice(..), IndexFormat::Uint32);
        rpass.draw_indexed(0..self.vertex_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asset::obj::load_obj_from_str;

    #[test]
    fn index_stream_uses_position_indices_only() {
        let model =
            load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 2/1/1 3/1/1\n")
                .unwrap();
        assert_eq!(position_indices(&model.mesh).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn out_of_bounds_position_index_fails_the_build() {
        let model = load_obj_from_str("v 0 0 0\nf 1 2 3\n").unwrap();
        let err = position_indices(&model.mesh).unwrap_err();
        assert!(matches!(
            err,
            RenderError::IndexOutOfBounds { index: 1, len: 1 }
        ));
    }

    #[test]
    fn empty_mesh_packs_to_nothing() {
        let model = load_obj_from_str("").unwrap();
        assert!(position_indices(&model.mesh).unwrap().is_empty());
    }

    #[test]
    fn layout_tracks_populated_streams() {
        let model = load_obj_from_str("v 0 0 0\nvn 0 0 1\nf 1//1 1//1 1//1\n").unwrap();
        let layout = MeshLayout::of(&model.mesh);
        assert!(!layout.has_texcoords);
        assert!(layout.has_normals);
        assert_eq!(layout.vertex_entry_point(), "vs_pos_normal");
        assert_eq!(layout.buffer_layouts().len(), 2);
    }
}
