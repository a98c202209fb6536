//! wgpu renderer: surface/device setup, depth buffer, mesh + skybox passes.
//!
//! Draw order each frame: skybox first (depth sealed to the far plane),
//! then the mesh with the full view matrix and an identity model matrix.

use std::num::NonZeroU64;
use std::path::PathBuf;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::{
    BindGroup, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType, BlendState, Buffer,
    BufferBindingType, BufferUsages, ColorTargetState, ColorWrites, CommandEncoderDescriptor,
    DepthBiasState, DepthStencilState, Device, DeviceDescriptor, Extent3d, Features,
    FragmentState, Instance, InstanceDescriptor, Limits, LoadOp, Operations,
    PipelineLayoutDescriptor, PowerPreference, PresentMode, Queue, RenderPassColorAttachment,
    RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor, ShaderModuleDescriptor,
    ShaderSource, ShaderStages, StoreOp, Surface, SurfaceConfiguration, SurfaceError,
    TextureDescriptor, TextureDimension, TextureFormat, TextureUsages, TextureView,
    TextureViewDescriptor, VertexState, util::DeviceExt,
};
use winit::{dpi::PhysicalSize, window::Window};

use asset::ObjModel;
use corelib::camera::Camera;

pub mod error;
pub mod mesh;
pub mod skybox;

pub use error::RenderError;
pub use mesh::GpuMesh;
pub use skybox::Skybox;

pub(crate) const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Per-frame uniforms (16-byte aligned).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct FrameUniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    view_pos: [f32; 4],
}

/// Scalar material constants; `specular.w` carries the shininess exponent.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct MaterialUniforms {
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
}

const SHININESS: f32 = 32.0;

/// What the renderer draws: one parsed model and an optional skybox.
pub struct SceneConfig {
    pub model: ObjModel,
    pub skybox_faces: Option<[PathBuf; skybox::FACE_COUNT]>,
}

pub struct GpuState {
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    device: Device,
    queue: Queue,

    mesh_pipeline: RenderPipeline,
    frame_buf: Buffer,
    frame_bg: BindGroup,
    gpu_mesh: GpuMesh,
    skybox: Option<Skybox>,

    depth_view: TextureView,
    width: u32,
    height: u32,
}

impl GpuState {
    /// Create GPU state bound to an `Arc<Window>` and upload the scene.
    pub async fn new(
        window: Arc<Window>,
        backends: wgpu::Backends,
        scene: SceneConfig,
    ) -> Result<Self, RenderError> {
        let PhysicalSize { width, height } = window.inner_size();
        let width = width.max(1);
        let height = height.max(1);

        let instance = Instance::new(&InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance
            .create_surface(window.clone())
            .expect("create_surface failed");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("No suitable GPU adapter");
        log::info!("adapter: {:?}", adapter.get_info().backend);

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Obzor3D Device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await
            .expect("request_device failed");

        // Surface format (prefer sRGB)
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(caps.formats[0]);

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = create_depth_view(&device, &surface_config);

        // ==== Scene upload ====
        let gpu_mesh = GpuMesh::build(&device, &scene.model.mesh)?;
        let material = scene
            .model
            .materials
            .resolve(scene.model.active_material.as_deref());
        log::info!("active material: {}", material.name);

        let skybox = scene
            .skybox_faces
            .as_ref()
            .map(|faces| Skybox::new(&device, &queue, surface_format, faces));

        // ==== Uniforms ====
        let frame_init = FrameUniforms {
            view: Mat4::IDENTITY.to_cols_array_2d(),
            proj: Mat4::IDENTITY.to_cols_array_2d(),
            model: Mat4::IDENTITY.to_cols_array_2d(),
            view_pos: [0.0; 4],
        };
        let frame_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame UBO"),
            contents: bytemuck::bytes_of(&frame_init),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let material_init = MaterialUniforms {
            ambient: extend(material.ambient, 0.0),
            diffuse: extend(material.diffuse, 0.0),
            specular: extend(material.specular, SHININESS),
        };
        let material_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material UBO"),
            contents: bytemuck::bytes_of(&material_init),
            usage: BufferUsages::UNIFORM,
        });

        let frame_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Frame BGL"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(
                            NonZeroU64::new(std::mem::size_of::<FrameUniforms>() as u64).unwrap(),
                        ),
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(
                            NonZeroU64::new(std::mem::size_of::<MaterialUniforms>() as u64)
                                .unwrap(),
                        ),
                    },
                    count: None,
                },
            ],
        });
        let frame_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame BG"),
            layout: &frame_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: material_buf.as_entire_binding(),
                },
            ],
        });

        // ==== Mesh pipeline, one variant per attribute layout ====
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Mesh WGSL"),
            source: ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Mesh PipelineLayout"),
            bind_group_layouts: &[&frame_bgl],
            push_constant_ranges: &[],
        });
        let layout = gpu_mesh.layout();
        let mesh_pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some(layout.vertex_entry_point()),
                buffers: &layout.buffer_layouts(),
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
            primitive: wgpu::PrimitiveState {
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            mesh_pipeline,
            frame_buf,
            frame_bg,
            gpu_mesh,
            skybox,
            depth_view,
            width,
            height,
        })
    }

    /// Resize: reconfigure surface & recreate depth view.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.surface_config.width = self.width;
        self.surface_config.height = self.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config);
    }

    /// Render one frame: uniforms from the camera, sky behind, mesh in front.
    pub fn render(&mut self, camera: &Camera) -> Result<(), SurfaceError> {
        let view = camera.view_matrix();
        let proj = camera.projection_matrix();
        let frame = FrameUniforms {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            model: Mat4::IDENTITY.to_cols_array_2d(),
            view_pos: extend(camera.position().to_array(), 1.0),
        };
        self.queue
            .write_buffer(&self.frame_buf, 0, bytemuck::bytes_of(&frame));
        if let Some(sky) = &self.skybox {
            sky.update(&self.queue, camera.rotation_view_matrix(), proj);
        }

        let surface_tex = self.surface.get_current_texture()?;
        let target = surface_tex.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("MainPass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &target,
                    depth_slice: None,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color {
                            r: 0.0,
                            g: 0.0,
                            b: 0.5,
                            a: 1.0,
                        }),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(sky) = &self.skybox {
                sky.render(&mut rpass);
            }

            rpass.set_pipeline(&self.mesh_pipeline);
            rpass.set_bind_group(0, &self.frame_bg, &[]);
            self.gpu_mesh.draw(&mut rpass);
        }

        self.queue.submit(Some(encoder.finish()));
        surface_tex.present();
        Ok(())
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn recreate_surface(&mut self) {
        self.resize(self.width, self.height);
    }
}

fn extend(v: [f32; 3], w: f32) -> [f32; 4] {
    [v[0], v[1], v[2], w]
}

/// Create a depth texture view matching the surface config.
fn create_depth_view(device: &Device, sc: &SurfaceConfiguration) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("DepthTex"),
        size: Extent3d {
            width: sc.width.max(1),
            height: sc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}
