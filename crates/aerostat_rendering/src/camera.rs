//! Perspective camera: projection, view extents, pointer unprojection and
//! fitting a text box into view.

use glam::{Mat4, Quat, Vec2, Vec3};

/// Screen size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Viewport {
    /// Creates a viewport.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height, 1.0 for a degenerate viewport.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// A right-handed perspective camera looking down its local -Z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Width over height.
    pub aspect: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
    /// World position.
    pub position: Vec3,
    /// World orientation.
    pub rotation: Quat,
}

impl PerspectiveCamera {
    /// Creates a camera at the origin, looking down -Z.
    #[must_use]
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_degrees,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }

    /// Moves the camera.
    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Orients the camera towards `target` with +Y up.
    pub fn look_at(&mut self, target: Vec3) {
        if (target - self.position).length_squared() <= f32::EPSILON {
            return;
        }
        let view = Mat4::look_at_rh(self.position, target, Vec3::Y);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        self.rotation = rotation;
    }

    /// Updates the aspect ratio after a resize.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.aspect = viewport.aspect();
    }

    /// World-to-camera matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    /// Camera-to-clip matrix (OpenGL depth range).
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// Combined view-projection matrix.
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Projects a world point into normalized device coordinates.
    #[must_use]
    pub fn project(&self, world: Vec3) -> Vec3 {
        self.view_projection().project_point3(world)
    }

    /// Vertical screen position of a world point: 0 at the top edge, 1 at
    /// the bottom edge.
    #[must_use]
    pub fn screen_y_fraction(&self, world: Vec3) -> f32 {
        (1.0 - self.project(world).y) * 0.5
    }

    /// Half width and half height of the visible area on the plane `z`.
    #[must_use]
    pub fn view_extents_at_z(&self, z: f32) -> Vec2 {
        let distance = (self.position.z - z).abs();
        let half_height = (self.fov_degrees.to_radians() * 0.5).tan() * distance;
        Vec2::new(half_height * self.aspect, half_height)
    }

    /// Casts a ray through a screen pixel and intersects it with the plane
    /// `z = z_plane`. Returns `None` when the ray is parallel to the plane.
    #[must_use]
    pub fn screen_to_world(&self, screen: Vec2, viewport: Viewport, z_plane: f32) -> Option<Vec3> {
        if viewport.width <= 0.0 || viewport.height <= 0.0 {
            return None;
        }
        let ndc = Vec2::new(
            (screen.x / viewport.width) * 2.0 - 1.0,
            -(screen.y / viewport.height) * 2.0 + 1.0,
        );
        let inverse = self.view_projection().inverse();
        let far = inverse.project_point3(ndc.extend(1.0));
        let direction = (far - self.position).normalize_or_zero();
        if direction.z.abs() <= f32::EPSILON {
            return None;
        }
        let t = (z_plane - self.position.z) / direction.z;
        Some(self.position + direction * t)
    }

    /// Pulls the camera back along its position vector until a box of
    /// `width x height` scene units fits with some margin. Never moves the
    /// camera closer.
    pub fn fit_box(&mut self, width: f32, height: f32) {
        let distance = self.position.length();
        if distance <= f32::EPSILON {
            return;
        }
        let fov = self.fov_degrees.to_radians();
        let fov_h = 2.0 * ((fov * 0.5).tan() * self.aspect).atan();
        let dx = (0.7 * width / (0.5 * fov_h).tan()).abs();
        let dy = (0.6 * height / (0.5 * fov).tan()).abs();
        let factor = dx.max(dy) / distance;
        if factor > 1.0 {
            self.position *= factor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(75.0, 1.6, 0.1, 1000.0).with_position(Vec3::new(0.0, 0.0, 30.0))
    }

    #[test]
    fn test_center_projects_to_middle() {
        let cam = camera();
        let ndc = cam.project(Vec3::ZERO);
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!((cam.screen_y_fraction(Vec3::ZERO) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_screen_fraction_top_edge() {
        let cam = camera();
        let extents = cam.view_extents_at_z(0.0);
        let top = Vec3::new(0.0, extents.y, 0.0);
        assert!(cam.screen_y_fraction(top).abs() < 1e-4);
        let quarter = Vec3::new(0.0, extents.y * 0.5, 0.0);
        assert!((cam.screen_y_fraction(quarter) - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_screen_to_world_round_trip() {
        let cam = camera();
        let viewport = Viewport::new(1600.0, 1000.0);
        let hit = cam
            .screen_to_world(Vec2::new(800.0, 500.0), viewport, 0.0)
            .unwrap();
        assert!(hit.length() < 1e-3);

        let corner = cam
            .screen_to_world(Vec2::new(1600.0, 0.0), viewport, 0.0)
            .unwrap();
        let extents = cam.view_extents_at_z(0.0);
        assert!((corner.x - extents.x).abs() < 1e-2);
        assert!((corner.y - extents.y).abs() < 1e-2);
    }

    #[test]
    fn test_fit_box_only_pulls_back() {
        let mut cam = PerspectiveCamera::new(45.0, 1.0, 0.1, 1000.0).with_position(Vec3::new(0.0, 0.0, 18.0));
        cam.fit_box(1.0, 1.0);
        assert_eq!(cam.position.z, 18.0);

        cam.fit_box(100.0, 20.0);
        assert!(cam.position.z > 18.0);
    }

    #[test]
    fn test_look_at_keeps_forward_axis() {
        let mut cam = camera();
        cam.look_at(Vec3::ZERO);
        let forward = cam.rotation * Vec3::NEG_Z;
        assert!((forward - Vec3::NEG_Z).length() < 1e-5);
    }
}
