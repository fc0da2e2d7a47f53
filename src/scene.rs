use glam::{Mat4, Vec3};

/// Vertical field of view of the perspective projection, in degrees.
const FOV_Y_DEGREES: f32 = 45.0;
/// Near and far clip planes of the perspective projection.
const NEAR_PLANE: f32 = 1.0;
const FAR_PLANE: f32 = 1000.0;
/// Fixed look-at target and up vector of the view transform.
const LOOK_AT_TARGET: Vec3 = Vec3::new(0.0, 30.0, 0.0);
const UP_VECTOR: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Light, camera and cached transform state read by the renderer each frame.
///
/// The projection and view matrices are caches: they are only ever recomputed
/// from the viewport size and the camera position respectively, never edited
/// in place.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    light_position: Vec3,
    camera_position: Vec3,
    projection: Mat4,
    view: Mat4,
    viewport: (u32, u32),
}

impl SceneState {
    /// Creates the scene with the default light and camera placement and
    /// both matrices computed for the given viewport.
    pub fn new(width: u32, height: u32) -> Self {
        let camera_position = Vec3::new(5.0, 15.0, -85.0);
        let mut scene = Self {
            light_position: Vec3::new(50.0, 90.0, 50.0),
            camera_position,
            projection: Mat4::IDENTITY,
            view: Mat4::look_at_rh(camera_position, LOOK_AT_TARGET, UP_VECTOR),
            viewport: (0, 0),
        };
        scene.set_viewport(width, height);
        scene
    }

    /// Recomputes the projection matrix for a new viewport size.
    ///
    /// A zero-area viewport (minimized window) leaves the previous projection
    /// untouched so the matrix never picks up a division by zero.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = (width, height);
        let aspect = width as f32 / height as f32;
        self.projection =
            Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), aspect, NEAR_PLANE, FAR_PLANE);
    }

    /// Moves the camera along the world Z axis and recomputes the view matrix.
    ///
    /// The view transform is rebuilt from scratch with the fixed target and up
    /// vector rather than composed incrementally, so repeated dollies cannot
    /// accumulate drift.
    pub fn dolly(&mut self, delta: f32) {
        self.camera_position.z += delta;
        self.view = Mat4::look_at_rh(self.camera_position, LOOK_AT_TARGET, UP_VECTOR);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn light_position(&self) -> Vec3 {
        self.light_position
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera_position
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new(512, 512)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aspect_of(projection: Mat4) -> f32 {
        // For a perspective matrix, m11 / m00 = aspect.
        projection.col(1).y / projection.col(0).x
    }

    #[test]
    fn square_viewport_has_unit_aspect() {
        let scene = SceneState::new(512, 512);
        assert!((aspect_of(scene.projection_matrix()) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn projection_aspect_matches_viewport() {
        let mut scene = SceneState::new(512, 512);
        scene.set_viewport(1280, 720);
        let expected = 1280.0 / 720.0;
        assert!((aspect_of(scene.projection_matrix()) - expected).abs() < 1e-5);
    }

    #[test]
    fn zero_height_viewport_is_ignored() {
        let mut scene = SceneState::new(512, 512);
        let before = scene.projection_matrix();
        scene.set_viewport(640, 0);
        scene.set_viewport(0, 480);
        let after = scene.projection_matrix();
        assert_eq!(before, after);
        assert!(after.to_cols_array().iter().all(|value| value.is_finite()));
        assert_eq!(scene.viewport(), (512, 512));
    }

    #[test]
    fn dolly_moves_only_z() {
        let mut scene = SceneState::new(512, 512);
        let before = scene.camera_position();
        scene.dolly(15.0);
        let after = scene.camera_position();
        assert_eq!(after.x, before.x);
        assert_eq!(after.y, before.y);
        assert!((after.z - (before.z + 15.0)).abs() < 1e-6);
    }

    #[test]
    fn dolly_recomputes_view_from_scratch() {
        let mut scene = SceneState::new(512, 512);
        for delta in [3.0, -7.5, 42.0, 0.25] {
            scene.dolly(delta);
        }
        let expected = Mat4::look_at_rh(
            scene.camera_position(),
            Vec3::new(0.0, 30.0, 0.0),
            Vec3::Y,
        );
        assert_eq!(scene.view_matrix(), expected);
    }
}
