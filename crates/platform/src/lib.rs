//! Platform layer: window, event loop, and input routing to the camera.
//!
//! Single-threaded frame stepping: the loop polls input, mutates the
//! camera, and redraws continuously. Geometry is parsed before the GPU
//! exists and handed off whole; all GPU handles live on this thread and
//! drop with it on every exit path.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use corelib::camera::{Camera, CameraMovement};
use corelib::vec3;
use renderer::{GpuState, SceneConfig, skybox::FACE_COUNT};

/// Bundled fallback scene so a bare `obzor3d` invocation shows something.
const DEFAULT_MODEL: &str = include_str!("../assets/cube.obj");

/// Skybox face file stems in `+X, -X, +Y, -Y, +Z, -Z` order.
const FACE_STEMS: [&str; FACE_COUNT] = ["right", "left", "top", "bottom", "front", "back"];

/// Cap on a single frame's delta so a stall doesn't teleport the camera.
const MAX_FRAME_DT: f32 = 0.1;

pub struct ViewerConfig {
    pub backends: wgpu::Backends,
    pub width: u32,
    pub height: u32,
    pub model_path: Option<PathBuf>,
    pub skybox_dir: Option<PathBuf>,
}

/// Load assets, then run the event loop until the window closes.
pub fn run(config: ViewerConfig) -> Result<()> {
    let model = match &config.model_path {
        Some(path) => asset::obj::load_obj_from_path(path)
            .with_context(|| format!("loading model {}", path.display()))?,
        None => {
            log::info!("no --model given, using the bundled cube");
            asset::obj::load_obj_from_str(DEFAULT_MODEL).context("parsing bundled cube")?
        }
    };
    log::info!(
        "model: {} positions, {} indices",
        model.mesh.positions.len(),
        model.mesh.vertex_count()
    );

    let skybox_faces = config.skybox_dir.as_deref().map(face_paths);

    let event_loop: EventLoop<()> = EventLoop::new().context("creating event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(config, SceneConfig { model, skybox_faces });
    event_loop.run_app(&mut app).context("event loop error")?;
    Ok(())
}

/// Resolve the six face images inside a skybox directory. A missing file is
/// passed through so the skybox reports it and degrades per face.
fn face_paths(dir: &Path) -> [PathBuf; FACE_COUNT] {
    FACE_STEMS.map(|stem| {
        let jpg = dir.join(format!("{stem}.jpg"));
        if jpg.exists() {
            jpg
        } else {
            dir.join(format!("{stem}.png"))
        }
    })
}

struct ViewerApp {
    config: ViewerConfig,
    // Consumed on first resume; the GPU owns the scene afterwards.
    scene: Option<SceneConfig>,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,

    camera: Camera,
    pressed: HashSet<KeyCode>,
    mouse_captured: bool,
    last_frame: Instant,
}

impl ViewerApp {
    fn new(config: ViewerConfig, scene: SceneConfig) -> Self {
        let mut camera = Camera::new(vec3(0.0, 0.0, 3.0), -90.0, 0.0);
        camera.aspect_ratio = config.width as f32 / config.height.max(1) as f32;
        Self {
            config,
            scene: Some(scene),
            window: None,
            gpu: None,
            camera,
            pressed: HashSet::new(),
            mouse_captured: false,
            last_frame: Instant::now(),
        }
    }

    /// Translate the held-key set into camera movement for this frame.
    fn apply_movement(&mut self, dt: f32) {
        const BINDINGS: [(KeyCode, CameraMovement); 6] = [
            (KeyCode::KeyW, CameraMovement::Forward),
            (KeyCode::KeyS, CameraMovement::Back),
            (KeyCode::KeyA, CameraMovement::Left),
            (KeyCode::KeyD, CameraMovement::Right),
            (KeyCode::KeyQ, CameraMovement::Up),
            (KeyCode::KeyE, CameraMovement::Down),
        ];
        for (key, direction) in BINDINGS {
            if self.pressed.contains(&key) {
                self.camera.process_keyboard(direction, dt);
            }
        }
    }

    fn set_mouse_captured(&mut self, captured: bool) {
        self.mouse_captured = captured;
        if let Some(window) = &self.window {
            window.set_cursor_visible(!captured);
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let Some(scene) = self.scene.take() else {
            return;
        };

        let attrs = Window::default_attributes()
            .with_title("Obzor3D")
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));
        log::info!(
            "window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );

        match pollster::block_on(GpuState::new(window.clone(), self.config.backends, scene)) {
            Ok(gpu) => {
                let size = window.inner_size();
                self.camera.aspect_ratio = size.width.max(1) as f32 / size.height.max(1) as f32;
                self.gpu = Some(gpu);
                self.window = Some(window);
            }
            Err(err) => {
                log::error!("GPU init failed: {err}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested, exiting event loop");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
                self.camera.aspect_ratio =
                    new_size.width.max(1) as f32 / new_size.height.max(1) as f32;
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        ..
                    },
                ..
            } => {
                if key == KeyCode::Escape {
                    event_loop.exit();
                    return;
                }
                match state {
                    ElementState::Pressed => self.pressed.insert(key),
                    ElementState::Released => self.pressed.remove(&key),
                };
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state,
                ..
            } => {
                self.set_mouse_captured(state == ElementState::Pressed);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 40.0,
                };
                self.camera.process_mouse_scroll(dy);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.last_frame).as_secs_f32().min(MAX_FRAME_DT);
                self.last_frame = now;
                self.apply_movement(dt);

                let Some(gpu) = &mut self.gpu else {
                    return;
                };
                match gpu.render(&self.camera) {
                    Ok(()) => {}
                    Err(err) if GpuState::is_surface_lost(&err) => {
                        log::warn!("surface lost, reconfiguring");
                        gpu.recreate_surface();
                    }
                    Err(err) => log::error!("render error: {err}"),
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if self.mouse_captured {
                // Screen y grows downward; the camera wants "positive looks up".
                self.camera
                    .process_mouse_movement(dx as f32, -(dy as f32));
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_cube_parses_to_triangles() {
        let model = asset::obj::load_obj_from_str(DEFAULT_MODEL).expect("bundled cube");
        assert_eq!(model.mesh.positions.len(), 8);
        assert_eq!(model.mesh.normals.len(), 6);
        assert_eq!(model.mesh.vertex_count(), 36);
        assert_eq!(model.mesh.vertex_count() % 3, 0);
    }

    #[test]
    fn face_paths_follow_fixed_face_order() {
        let paths = face_paths(Path::new("/sky"));
        assert!(paths[0].ends_with("right.png") || paths[0].ends_with("right.jpg"));
        assert!(paths[5].ends_with("back.png") || paths[5].ends_with("back.jpg"));
    }
}
