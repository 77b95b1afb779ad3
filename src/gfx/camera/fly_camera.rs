//! First-person camera moved with the keyboard and turned with the mouse

use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

const PITCH_LIMIT: Rad<f32> = Rad(1.54);

#[derive(Debug, Clone, Copy)]
pub struct FlyCamera {
    pub position: Point3<f32>,
    /// Rotation about +Y; -90° looks down -Z
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera for FlyCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let view = Matrix4::look_to_rh(self.position, self.forward(), Vector3::unit_y());
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

impl FlyCamera {
    pub fn new(
        position: Point3<f32>,
        yaw: impl Into<Rad<f32>>,
        pitch: impl Into<Rad<f32>>,
        aspect: f32,
    ) -> Self {
        let yaw = yaw.into();
        let pitch = pitch.into();
        Self {
            position,
            yaw,
            pitch,
            aspect,
            fovy: Deg(40.0).into(),
            znear: 0.1,
            zfar: 5000.0,
            uniform: CameraUniform::default(),
        }
    }

    pub fn forward(&self) -> Vector3<f32> {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw).normalize()
    }

    pub fn right(&self) -> Vector3<f32> {
        self.forward().cross(Vector3::unit_y()).normalize()
    }

    /// Moves along the view direction, the horizontal right vector and world up
    pub fn translate(&mut self, forward: f32, right: f32, up: f32) {
        self.position += self.forward() * forward + self.right() * right + Vector3::unit_y() * up;
    }

    pub fn rotate(&mut self, yaw: Rad<f32>, pitch: Rad<f32>) {
        self.yaw += yaw;
        self.pitch = Rad((self.pitch + pitch).0.clamp(-PITCH_LIMIT.0, PITCH_LIMIT.0));
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = self.position.to_homogeneous().into();
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, InnerSpace, Point3, Rad, Vector3, Vector4};

    fn camera() -> FlyCamera {
        FlyCamera::new(Point3::new(0.0, -2.0, 15.0), Deg(-90.0), Deg(0.0), 1.5)
    }

    #[test]
    fn test_default_orientation_looks_down_negative_z() {
        let cam = camera();
        let forward = cam.forward();
        assert!((forward - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-5);
        assert!((cam.right() - Vector3::new(1.0, 0.0, 0.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_translate_along_view_axes() {
        let mut cam = camera();
        cam.translate(2.0, 1.0, 0.5);
        assert!((cam.position - Point3::new(1.0, -1.5, 13.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut cam = camera();
        cam.rotate(Rad(0.0), Rad(10.0));
        assert_eq!(cam.pitch, PITCH_LIMIT);
        cam.rotate(Rad(0.0), Rad(-20.0));
        assert_eq!(cam.pitch, -PITCH_LIMIT);
    }

    #[test]
    fn test_origin_projects_in_front_of_camera() {
        let mut cam = camera();
        cam.update_view_proj();
        let clip = cam.build_view_projection_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let depth = clip.z / clip.w;
        assert!(clip.w > 0.0);
        assert!((0.0..=1.0).contains(&depth));
        assert_eq!(cam.uniform.view_position, [0.0, -2.0, 15.0, 1.0]);
    }
}
