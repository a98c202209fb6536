//! Cubemap skybox: a fixed 36-vertex cube drawn behind everything else.
//!
//! Faces load in the order `+X, -X, +Y, -Y, +Z, -Z`. A face that fails to
//! decode (or whose size disagrees with the first good face) is reported
//! and left unpopulated; a partially textured skybox is an accepted
//! degraded state, not a fatal error.

use std::path::PathBuf;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::{
    BindGroup, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType, BlendState, Buffer,
    BufferBindingType, BufferUsages, ColorTargetState, ColorWrites, DepthStencilState, Device,
    Extent3d, FragmentState, Origin3d, PipelineLayoutDescriptor, Queue, RenderPass,
    RenderPipeline, RenderPipelineDescriptor, SamplerDescriptor, ShaderModuleDescriptor,
    ShaderSource, ShaderStages, TexelCopyBufferLayout, TexelCopyTextureInfo, TextureDescriptor,
    TextureDimension, TextureFormat, TextureSampleType, TextureUsages, TextureViewDescriptor,
    TextureViewDimension, VertexBufferLayout, VertexState, VertexStepMode, util::DeviceExt,
};

use asset::texture::TextureData;

use crate::DEPTH_FORMAT;

pub const FACE_COUNT: usize = 6;

/// Rotation-only view + projection for the sky pass.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct SkyUniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
}

/// 12 triangles, CCW from inside the cube.
#[rustfmt::skip]
const SKYBOX_VERTICES: [[f32; 3]; 36] = [
    [-1.0,  1.0, -1.0], [-1.0, -1.0, -1.0], [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [-1.0,  1.0, -1.0],
    [-1.0, -1.0,  1.0], [-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0],
    [-1.0,  1.0, -1.0], [-1.0,  1.0,  1.0], [-1.0, -1.0,  1.0],
    [ 1.0, -1.0, -1.0], [ 1.0, -1.0,  1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [ 1.0,  1.0, -1.0], [ 1.0, -1.0, -1.0],
    [-1.0, -1.0,  1.0], [-1.0,  1.0,  1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [ 1.0, -1.0,  1.0], [-1.0, -1.0,  1.0],
    [-1.0,  1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0], [-1.0,  1.0, -1.0],
    [-1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0],
];

const VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: 12,
    step_mode: VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
};

pub struct Skybox {
    vertex_buf: Buffer,
    uniform_buf: Buffer,
    bind_group: BindGroup,
    pipeline: RenderPipeline,
}

impl Skybox {
    /// Build the cube buffer and cubemap from 6 face image paths.
    pub fn new(
        device: &Device,
        queue: &Queue,
        surface_format: TextureFormat,
        faces: &[PathBuf; FACE_COUNT],
    ) -> Self {
        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Skybox VB"),
            contents: bytemuck::cast_slice(&SKYBOX_VERTICES),
            usage: BufferUsages::VERTEX,
        });

        let texture_view = load_cubemap(device, queue, faces);

        let sampler = device.create_sampler(&SamplerDescriptor {
            label: Some("Skybox sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let uniform_init = SkyUniforms {
            view: Mat4::IDENTITY.to_cols_array_2d(),
            proj: Mat4::IDENTITY.to_cols_array_2d(),
        };
        let uniform_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Skybox UBO"),
            contents: bytemuck::bytes_of(&uniform_init),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });

        let bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Skybox BGL"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::VERTEX,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: TextureSampleType::Float { filterable: true },
                        view_dimension: TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 2,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Skybox BG"),
            layout: &bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Skybox WGSL"),
            source: ShaderSource::Wgsl(include_str!("shaders/skybox.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Skybox PipelineLayout"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Skybox Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[VERTEX_LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            // The viewer sits inside the cube; no culling.
            primitive: wgpu::PrimitiveState {
                cull_mode: None,
                ..Default::default()
            },
            // Depth writes stay off and the vertex shader seals depth to the
            // far plane, so the mesh is never occluded by the sky.
            depth_stencil: Some(DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            vertex_buf,
            uniform_buf,
            bind_group,
            pipeline,
        }
    }

    /// Upload this frame's matrices. `view` must be rotation-only.
    pub fn update(&self, queue: &Queue, view: Mat4, proj: Mat4) {
        let uniforms = SkyUniforms {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
        };
        queue.write_buffer(&self.uniform_buf, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Draw the 36-vertex cube. Must run before the mesh draw each frame.
    pub fn render(&self, rpass: &mut RenderPass<'_>) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buf.slice(..));
        rpass.draw(0..SKYBOX_VERTICES.len() as u32, 0..1);
    }
}

/// Decode the 6 faces and upload into one cubemap texture. Failed faces are
/// logged and stay unpopulated; the texture size comes from the first face
/// that decodes.
fn load_cubemap(
    device: &Device,
    queue: &Queue,
    faces: &[PathBuf; FACE_COUNT],
) -> wgpu::TextureView {
    let mut decoded: [Option<TextureData>; FACE_COUNT] = Default::default();
    for (i, path) in faces.iter().enumerate() {
        match TextureData::load(path) {
            Ok(data) => decoded[i] = Some(data),
            Err(err) => log::error!("skybox face {i} unavailable: {err}"),
        }
    }

    let (width, height) = decoded
        .iter()
        .flatten()
        .next()
        .map(|d| (d.width, d.height))
        .unwrap_or((1, 1));

    let texture = device.create_texture(&TextureDescriptor {
        label: Some("Skybox cubemap"),
        size: Extent3d {
            width,
            height,
            depth_or_array_layers: FACE_COUNT as u32,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: TextureFormat::Rgba8UnormSrgb,
        usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
        view_formats: &[],
    });

    for (i, data) in decoded.iter().enumerate() {
        let Some(data) = data else { continue };
        if (data.width, data.height) != (width, height) {
            log::error!(
                "skybox face {i} is {}x{}, expected {width}x{height}; left unpopulated",
                data.width,
                data.height
            );
            continue;
        }
        queue.write_texture(
            TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: Origin3d {
                    x: 0,
                    y: 0,
                    z: i as u32,
                },
                aspect: wgpu::TextureAspect::All,
            },
            &data.pixels,
            TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    texture.create_view(&TextureViewDescriptor {
        label: Some("Skybox cubemap view"),
        dimension: Some(TextureViewDimension::Cube),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_is_a_full_triangle_list() {
        assert_eq!(SKYBOX_VERTICES.len(), 36);
        assert_eq!(SKYBOX_VERTICES.len() % 3, 0);
        // Every vertex sits on the unit cube surface.
        assert!(
            SKYBOX_VERTICES
                .iter()
                .all(|v| v.iter().any(|c| c.abs() == 1.0))
        );
    }
}
