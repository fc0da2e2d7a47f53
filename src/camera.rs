use glam::Vec2;

use crate::input::{PointerButton, PointerEvent};
use crate::scene::SceneState;

/// Converts pointer drags into orbit angles and dolly moves.
///
/// Two independent drag machines run concurrently: the right button orbits,
/// the left button dollies.  Holding both at once is allowed since each drag
/// only touches its own state.  Orbit angles are accumulated here and applied
/// at draw time as a model rotation; they never touch the view matrix.
#[derive(Debug, Clone, Default)]
pub struct CameraController {
    orbiting: bool,
    dollying: bool,
    last_pos: Vec2,
    current_pos: Vec2,
    yaw: f32,
    pitch: f32,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one pointer event through the drag state machines, mutating the
    /// scene camera when a dolly drag is in progress.
    pub fn handle_event(&mut self, event: PointerEvent, scene: &mut SceneState) {
        match event {
            PointerEvent::ButtonDown { button, position } => {
                self.last_pos = position;
                self.current_pos = position;
                match button {
                    PointerButton::Right => self.orbiting = true,
                    PointerButton::Left => self.dollying = true,
                }
            }
            PointerEvent::ButtonUp { button } => match button {
                PointerButton::Right => self.orbiting = false,
                PointerButton::Left => self.dollying = false,
            },
            PointerEvent::Moved { position } => {
                self.current_pos = position;
                let delta = self.current_pos - self.last_pos;
                if self.orbiting {
                    self.apply_orbit_delta(delta.x, delta.y);
                }
                if self.dollying {
                    scene.dolly(delta.y);
                }
                self.last_pos = self.current_pos;
            }
        }
    }

    /// Accumulates an orbit drag delta.
    ///
    /// The signs are inverted so that dragging right rotates the view left,
    /// matching how the object appears to follow the pointer.
    pub fn apply_orbit_delta(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx;
        self.pitch -= dy;
    }

    /// Accumulated orbit angle about the vertical axis, in degrees.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Accumulated orbit angle about the horizontal axis, in degrees.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn drag(
        controller: &mut CameraController,
        scene: &mut SceneState,
        button: PointerButton,
        path: &[(f32, f32)],
    ) {
        let first = Vec2::new(path[0].0, path[0].1);
        controller.handle_event(
            PointerEvent::ButtonDown {
                button,
                position: first,
            },
            scene,
        );
        for &(x, y) in &path[1..] {
            controller.handle_event(
                PointerEvent::Moved {
                    position: Vec2::new(x, y),
                },
                scene,
            );
        }
        controller.handle_event(PointerEvent::ButtonUp { button }, scene);
    }

    #[test]
    fn right_drag_inverts_deltas() {
        let mut controller = CameraController::new();
        let mut scene = SceneState::new(512, 512);
        drag(
            &mut controller,
            &mut scene,
            PointerButton::Right,
            &[(100.0, 100.0), (80.0, 130.0)],
        );
        // dx = -20 and dy = 30, inverted into the accumulated angles.
        assert!((controller.yaw() - 20.0).abs() < 1e-6);
        assert!((controller.pitch() + 30.0).abs() < 1e-6);
    }

    #[test]
    fn orbit_accumulates_negative_sum_of_deltas() {
        let mut controller = CameraController::new();
        let mut scene = SceneState::new(512, 512);
        let path = [(0.0, 0.0), (5.0, -3.0), (12.0, 4.0), (7.0, 10.0)];
        drag(&mut controller, &mut scene, PointerButton::Right, &path);
        let total_dx = path.last().unwrap().0 - path[0].0;
        let total_dy = path.last().unwrap().1 - path[0].1;
        assert!((controller.yaw() + total_dx).abs() < 1e-6);
        assert!((controller.pitch() + total_dy).abs() < 1e-6);
    }

    #[test]
    fn left_drag_dollies_camera_z() {
        let mut controller = CameraController::new();
        let mut scene = SceneState::new(512, 512);
        let start_z = scene.camera_position().z;
        drag(
            &mut controller,
            &mut scene,
            PointerButton::Left,
            &[(200.0, 100.0), (200.0, 110.0), (200.0, 115.0)],
        );
        assert!((scene.camera_position().z - (start_z + 15.0)).abs() < 1e-6);
        let expected = glam::Mat4::look_at_rh(
            scene.camera_position(),
            glam::Vec3::new(0.0, 30.0, 0.0),
            glam::Vec3::Y,
        );
        assert_eq!(scene.view_matrix(), expected);
    }

    #[test]
    fn moves_without_a_button_change_nothing() {
        let mut controller = CameraController::new();
        let mut scene = SceneState::new(512, 512);
        let camera_before = scene.camera_position();
        controller.handle_event(
            PointerEvent::Moved {
                position: Vec2::new(300.0, 300.0),
            },
            &mut scene,
        );
        assert_eq!(controller.yaw(), 0.0);
        assert_eq!(controller.pitch(), 0.0);
        assert_eq!(scene.camera_position(), camera_before);
    }

    #[test]
    fn simultaneous_drags_compose() {
        let mut controller = CameraController::new();
        let mut scene = SceneState::new(512, 512);
        let start_z = scene.camera_position().z;
        let origin = Vec2::new(50.0, 50.0);
        controller.handle_event(
            PointerEvent::ButtonDown {
                button: PointerButton::Right,
                position: origin,
            },
            &mut scene,
        );
        controller.handle_event(
            PointerEvent::ButtonDown {
                button: PointerButton::Left,
                position: origin,
            },
            &mut scene,
        );
        controller.handle_event(
            PointerEvent::Moved {
                position: Vec2::new(60.0, 58.0),
            },
            &mut scene,
        );
        assert!((controller.yaw() + 10.0).abs() < 1e-6);
        assert!((controller.pitch() + 8.0).abs() < 1e-6);
        assert!((scene.camera_position().z - (start_z + 8.0)).abs() < 1e-6);
    }
}
