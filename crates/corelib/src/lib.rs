//! Core types: math re-exports and the viewer camera.

pub use glam::{Mat3, Mat4, Vec2, Vec3, vec2, vec3};

pub mod camera;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;

    #[test]
    fn camera_matrices_are_finite() {
        let cam = Camera::new(vec3(0.0, 0.0, 3.0), -90.0, 0.0);
        let pv = cam.projection_matrix() * cam.view_matrix();
        let a = pv.to_cols_array();
        assert!(a.iter().all(|f| f.is_finite()));
    }
}
