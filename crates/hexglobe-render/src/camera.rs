//! Perspective camera orbiting the globe.

use bytemuck::{Pod, Zeroable};
use glam::{DMat4, DVec3};

/// Uniform block holding the camera matrix and position.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
}

/// A perspective camera that always looks at a target point.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov_deg: f64,
    /// Width / height.
    pub aspect_ratio: f64,
    pub near: f64,
    pub far: f64,
    pub position: DVec3,
    pub target: DVec3,
    pub up: DVec3,
}

impl PerspectiveCamera {
    pub fn new(fov_deg: f64, aspect_ratio: f64, near: f64, far: f64) -> Self {
        Self {
            fov_deg,
            aspect_ratio,
            near,
            far,
            position: DVec3::ZERO,
            target: DVec3::ZERO,
            up: DVec3::Y,
        }
    }

    /// Update the aspect ratio. A zero height is ignored.
    pub fn set_aspect_ratio(&mut self, width: f64, height: f64) {
        if height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    pub fn look_at(&mut self, target: DVec3) {
        self.target = target;
    }

    /// Unit vector from the camera towards its target.
    pub fn forward(&self) -> DVec3 {
        (self.target - self.position).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> DMat4 {
        DMat4::perspective_rh(self.fov_deg.to_radians(), self.aspect_ratio, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> DMat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn to_uniform(&self) -> CameraUniform {
        let p = self.position.as_vec3();
        CameraUniform {
            view_proj: self.view_projection_matrix().as_mat4().to_cols_array_2d(),
            camera_pos: [p.x, p.y, p.z, 1.0],
        }
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(50.0, 1.0, 1.0, 2050.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_ignores_zero_height() {
        let mut camera = PerspectiveCamera::default();
        camera.set_aspect_ratio(800.0, 400.0);
        assert_eq!(camera.aspect_ratio, 2.0);
        camera.set_aspect_ratio(800.0, 0.0);
        assert_eq!(camera.aspect_ratio, 2.0);
    }

    #[test]
    fn test_target_projects_to_screen_centre() {
        let mut camera = PerspectiveCamera::new(50.0, 1.5, 1.0, 3000.0);
        camera.position = DVec3::new(-1700.0, 0.0, 0.0);
        camera.look_at(DVec3::ZERO);
        let clip = camera.view_projection_matrix() * DVec3::ZERO.extend(1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-9 && ndc.y.abs() < 1e-9, "{ndc:?}");
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_forward_points_at_target() {
        let mut camera = PerspectiveCamera::default();
        camera.position = DVec3::new(0.0, 0.0, 10.0);
        assert!((camera.forward() - DVec3::NEG_Z).length() < 1e-12);
    }

    #[test]
    fn test_uniform_carries_position() {
        let mut camera = PerspectiveCamera::default();
        camera.position = DVec3::new(1.0, 2.0, 3.0);
        let u = camera.to_uniform();
        assert_eq!(u.camera_pos, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(bytemuck::bytes_of(&u).len(), 80);
    }
}
