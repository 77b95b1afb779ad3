use cgmath::Rad;
use winit::{
    event::{DeviceEvent, ElementState, KeyEvent, MouseButton},
    keyboard::{KeyCode, PhysicalKey},
};

use super::fly_camera::FlyCamera;

/// Keyboard movement and right-drag mouse look for a [`FlyCamera`]
pub struct CameraController {
    /// World units per second
    pub speed: f32,
    /// Radians per pixel of mouse motion
    pub sensitivity: f32,
    forward: f32,
    backward: f32,
    left: f32,
    right: f32,
    up: f32,
    down: f32,
    is_looking: bool,
    pending_rotation: (f32, f32),
}

impl CameraController {
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            speed,
            sensitivity,
            forward: 0.0,
            backward: 0.0,
            left: 0.0,
            right: 0.0,
            up: 0.0,
            down: 0.0,
            is_looking: false,
            pending_rotation: (0.0, 0.0),
        }
    }

    /// Returns true when the key is a movement key
    pub fn process_keyboard(&mut self, event: &KeyEvent) -> bool {
        let PhysicalKey::Code(code) = event.physical_key else {
            return false;
        };
        let amount = if event.state == ElementState::Pressed { 1.0 } else { 0.0 };
        match code {
            KeyCode::KeyW => self.forward = amount,
            KeyCode::KeyS => self.backward = amount,
            KeyCode::KeyA => self.left = amount,
            KeyCode::KeyD => self.right = amount,
            KeyCode::Space => self.up = amount,
            KeyCode::ShiftLeft | KeyCode::ShiftRight => self.down = amount,
            _ => return false,
        }
        true
    }

    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Right {
            self.is_looking = state == ElementState::Pressed;
        }
    }

    pub fn process_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.is_looking {
                self.pending_rotation.0 += delta.0 as f32;
                self.pending_rotation.1 += delta.1 as f32;
            }
        }
    }

    pub fn is_looking(&self) -> bool {
        self.is_looking
    }

    /// Applies held keys and accumulated mouse motion for a frame of `dt` seconds
    pub fn update_camera(&mut self, camera: &mut FlyCamera, dt: f32) {
        let step = self.speed * dt;
        camera.translate(
            (self.forward - self.backward) * step,
            (self.right - self.left) * step,
            (self.up - self.down) * step,
        );

        let (dx, dy) = std::mem::take(&mut self.pending_rotation);
        if dx != 0.0 || dy != 0.0 {
            camera.rotate(Rad(dx * self.sensitivity), Rad(-dy * self.sensitivity));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Point3};

    #[test]
    fn test_mouse_motion_ignored_unless_looking() {
        let mut controller = CameraController::new(5.0, 0.01);
        let mut camera = FlyCamera::new(Point3::new(0.0, 0.0, 0.0), Deg(-90.0), Deg(0.0), 1.0);
        let yaw = camera.yaw;

        controller.process_device_event(&DeviceEvent::MouseMotion { delta: (10.0, 0.0) });
        controller.update_camera(&mut camera, 0.0);
        assert_eq!(camera.yaw, yaw);

        controller.process_mouse_button(MouseButton::Right, ElementState::Pressed);
        controller.process_device_event(&DeviceEvent::MouseMotion { delta: (10.0, 0.0) });
        controller.update_camera(&mut camera, 0.0);
        assert!((camera.yaw.0 - (yaw.0 + 0.1)).abs() < 1e-6);
    }
}
