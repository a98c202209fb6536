//! First-person camera: discrete move/look events in, view & projection out.
//!
//! FPS-style, not free-look: `up` stays pinned to the world vertical and
//! `right` stays horizontal regardless of pitch, so strafing never leaves
//! the walking plane.

use crate::{Mat3, Mat4, Vec3};

/// Pitch is clamped short of the poles to keep `look_at` well-defined.
pub const PITCH_LIMIT_DEG: f32 = 89.0;
/// Scroll zoom maps 1:1 to the vertical field of view, in degrees.
pub const ZOOM_MIN_DEG: f32 = 40.0;
pub const ZOOM_MAX_DEG: f32 = 90.0;

const DEFAULT_SPEED: f32 = 2.5;
const DEFAULT_SENSITIVITY: f32 = 0.1;
const DEFAULT_ZOOM: f32 = 45.0;

/// Discrete movement directions fed from the key-held set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
}

/// Derived basis vectors. Recomputed atomically from (yaw, pitch); the
/// fields are never mutated independently of the angles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation {
    front: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Orientation {
    fn from_angles(yaw_deg: f32, pitch_deg: f32, world_up: Vec3) -> Self {
        let yaw = yaw_deg.to_radians();
        let pitch = pitch_deg.to_radians();

        // Yaw-only planar heading first, then the pitch applied to the
        // vertical component and renormalized. This keeps `right` a pure
        // function of yaw.
        let planar = Vec3::new(yaw.cos(), 0.0, yaw.sin()).normalize();
        let front = Vec3::new(planar.x, pitch.sin(), planar.z).normalize();
        let right = front.cross(world_up).normalize();

        Self {
            front,
            right,
            up: world_up,
        }
    }

    #[inline]
    pub fn front(&self) -> Vec3 {
        self.front
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.right
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.up
    }
}

/// Viewer camera state. Angles are in degrees; `yaw` lives in [0, 360) and
/// `pitch` in [-89, 89] after every mutating call.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    position: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    orientation: Orientation,

    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    zoom: f32,
    fov: f32,

    pub aspect_ratio: f32,
    pub near_plane: f32,
    pub far_plane: f32,
}

impl Camera {
    pub fn new(position: Vec3, yaw_deg: f32, pitch_deg: f32) -> Self {
        let world_up = Vec3::Y;
        let yaw = wrap_yaw(yaw_deg);
        let pitch = pitch_deg.clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
        Self {
            position,
            world_up,
            yaw,
            pitch,
            orientation: Orientation::from_angles(yaw, pitch, world_up),
            movement_speed: DEFAULT_SPEED,
            mouse_sensitivity: DEFAULT_SENSITIVITY,
            zoom: DEFAULT_ZOOM,
            fov: DEFAULT_ZOOM,
            aspect_ratio: 16.0 / 9.0,
            near_plane: 0.1,
            far_plane: 100.0,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    #[inline]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Move along the camera basis. Forward/Back follow `front`, Left/Right
    /// follow `right`, Up/Down follow the world vertical.
    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        let o = self.orientation;
        match direction {
            CameraMovement::Forward => self.position += o.front * velocity,
            CameraMovement::Back => self.position -= o.front * velocity,
            CameraMovement::Left => self.position -= o.right * velocity,
            CameraMovement::Right => self.position += o.right * velocity,
            CameraMovement::Up => self.position += self.world_up * velocity,
            CameraMovement::Down => self.position -= self.world_up * velocity,
        }
    }

    /// Apply a cursor delta. Sign convention: positive `dy` looks up. The
    /// windowing layer converts from screen coordinates (y grows downward)
    /// before calling.
    pub fn process_mouse_movement(&mut self, dx: f32, dy: f32) {
        self.yaw = wrap_yaw(self.yaw + dx * self.mouse_sensitivity);
        self.pitch = (self.pitch + dy * self.mouse_sensitivity)
            .clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
        self.orientation = Orientation::from_angles(self.yaw, self.pitch, self.world_up);
    }

    /// Scroll-wheel zoom; saturates at the fov limits.
    pub fn process_mouse_scroll(&mut self, dy: f32) {
        self.zoom = (self.zoom - dy).clamp(ZOOM_MIN_DEG, ZOOM_MAX_DEG);
        self.fov = self.zoom;
    }

    #[inline]
    pub fn view_matrix(&self) -> Mat4 {
        let o = self.orientation;
        Mat4::look_at_rh(self.position, self.position + o.front, o.up)
    }

    /// View with the translation stripped; the skybox cube stays centered
    /// on the viewer.
    #[inline]
    pub fn rotation_view_matrix(&self) -> Mat4 {
        Mat4::from_mat3(Mat3::from_mat4(self.view_matrix()))
    }

    #[inline]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov.to_radians(),
            self.aspect_ratio.max(1e-6),
            self.near_plane,
            self.far_plane,
        )
    }
}

/// Wrap into [0, 360) by repeated add/subtract rather than a modulo, so a
/// value landing exactly on 360 maps to 0 without a truncation glitch.
fn wrap_yaw(mut yaw: f32) -> f32 {
    while yaw >= 360.0 {
        yaw -= 360.0;
    }
    while yaw < 0.0 {
        yaw += 360.0;
    }
    yaw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3;

    const EPS: f32 = 1e-5;

    fn test_camera() -> Camera {
        Camera::new(vec3(0.0, 0.0, 3.0), -90.0, 0.0)
    }

    #[test]
    fn zero_mouse_delta_changes_nothing() {
        let mut cam = test_camera();
        let (yaw, pitch, o) = (cam.yaw(), cam.pitch(), cam.orientation());
        cam.process_mouse_movement(0.0, 0.0);
        assert_eq!(cam.yaw(), yaw);
        assert_eq!(cam.pitch(), pitch);
        assert_eq!(cam.orientation(), o);
    }

    #[test]
    fn pitch_clamps_at_limit() {
        let mut cam = test_camera();
        cam.process_mouse_movement(0.0, 850.0); // sensitivity 0.1 -> +85
        assert!((cam.pitch() - 85.0).abs() < EPS);
        cam.process_mouse_movement(0.0, 100.0); // effective +10
        assert_eq!(cam.pitch(), PITCH_LIMIT_DEG);
        cam.process_mouse_movement(0.0, -10000.0);
        assert_eq!(cam.pitch(), -PITCH_LIMIT_DEG);
    }

    #[test]
    fn yaw_wraps_around() {
        let mut cam = Camera::new(Vec3::ZERO, 359.0, 0.0);
        cam.process_mouse_movement(20.0, 0.0); // effective +2
        assert!((cam.yaw() - 1.0).abs() < EPS);
        cam.process_mouse_movement(-30.0, 0.0); // effective -3
        assert!((cam.yaw() - 358.0).abs() < EPS);
    }

    #[test]
    fn negative_initial_yaw_is_wrapped() {
        let cam = test_camera();
        assert!((cam.yaw() - 270.0).abs() < EPS);
    }

    #[test]
    fn zoom_saturates_both_ends() {
        let mut cam = test_camera();
        for _ in 0..100 {
            cam.process_mouse_scroll(1.0);
        }
        assert_eq!(cam.zoom(), ZOOM_MIN_DEG);
        assert_eq!(cam.fov(), ZOOM_MIN_DEG);
        for _ in 0..100 {
            cam.process_mouse_scroll(-1.0);
        }
        assert_eq!(cam.zoom(), ZOOM_MAX_DEG);
        assert_eq!(cam.fov(), ZOOM_MAX_DEG);
    }

    #[test]
    fn right_is_horizontal_and_orthogonal_under_pitch() {
        let mut cam = test_camera();
        cam.process_mouse_movement(123.0, 450.0);
        let o = cam.orientation();
        assert!((o.front().length() - 1.0).abs() < EPS);
        assert!((o.right().length() - 1.0).abs() < EPS);
        assert!(o.right().y.abs() < EPS);
        assert!(o.right().dot(o.front()).abs() < EPS);
        assert!(o.right().dot(o.up()).abs() < EPS);
    }

    #[test]
    fn right_is_independent_of_pitch() {
        let mut cam = test_camera();
        let before = cam.orientation().right();
        cam.process_mouse_movement(0.0, 600.0);
        let after = cam.orientation().right();
        assert!((before - after).length() < EPS);
    }

    #[test]
    fn keyboard_moves_along_basis() {
        let mut cam = test_camera();
        let start = cam.position();
        cam.process_keyboard(CameraMovement::Forward, 1.0);
        let moved = cam.position() - start;
        assert!((moved.normalize() - cam.orientation().front()).length() < EPS);

        let start = cam.position();
        cam.process_keyboard(CameraMovement::Up, 0.5);
        assert!((cam.position() - start - Vec3::Y * cam.movement_speed * 0.5).length() < EPS);
    }

    #[test]
    fn view_matrix_tracks_position() {
        let mut cam = test_camera();
        let before = cam.view_matrix();
        cam.process_keyboard(CameraMovement::Right, 1.0);
        assert_ne!(before, cam.view_matrix());
    }

    #[test]
    fn rotation_view_has_no_translation() {
        let mut cam = test_camera();
        cam.process_keyboard(CameraMovement::Forward, 2.0);
        cam.process_mouse_movement(45.0, 80.0);
        let m = cam.rotation_view_matrix().to_cols_array();
        assert_eq!(&m[12..15], &[0.0, 0.0, 0.0]);
    }
}
