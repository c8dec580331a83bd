use droplet_gpu::CameraUniforms;
use glam::{Mat4, Quat, Vec2, Vec3};

/// Closest the camera may get to its focus point.
pub const MIN_DISTANCE: f32 = 0.05;

/// Orbit camera around a focus point.
///
/// Aspect ratio is private and only changes through [`Camera::set_viewport_size`],
/// which the viewer calls from its resize handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    focus: Vec3,
    up: Vec3,
    aspect: f32,
    fov_y: f32,
    near: f32,
    far: f32,
    rotate_speed: f32,
    pan_speed: f32,
    zoom_speed: f32,
}

impl Camera {
    /// Creates a camera at `position` looking at `focus` with +Y as the initial up.
    ///
    /// A focus equal to the position is moved one unit down -Z.
    pub fn new(position: Vec3, focus: Vec3, width: u32, height: u32) -> Self {
        let focus = if (focus - position).length_squared() < 1e-12 {
            position + Vec3::NEG_Z
        } else {
            focus
        };
        let front = (focus - position).normalize();
        let mut up = Vec3::Y;
        // Looking straight along Y: pick any up perpendicular to the view direction.
        if front.cross(up).length_squared() < 1e-8 {
            up = Vec3::Z;
        }
        let right = front.cross(up).normalize_or_zero();
        let up = right.cross(front).normalize_or_zero();

        Self {
            position,
            focus,
            up,
            aspect: aspect_of(width, height),
            fov_y: 45f32.to_radians(),
            near: 0.1,
            far: 100.0,
            rotate_speed: 0.005,
            pan_speed: 0.001,
            zoom_speed: 0.1,
        }
    }

    pub fn with_fov_degrees(mut self, fov: f32) -> Self {
        self.fov_y = fov.to_radians();
        self
    }

    pub fn with_clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn with_rotate_speed(mut self, speed: f32) -> Self {
        self.rotate_speed = speed;
        self
    }

    pub fn with_pan_speed(mut self, speed: f32) -> Self {
        self.pan_speed = speed;
        self
    }

    pub fn with_zoom_speed(mut self, speed: f32) -> Self {
        self.zoom_speed = speed;
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn focus(&self) -> Vec3 {
        self.focus
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.focus).length()
    }

    /// Unit vector from the camera toward the focus.
    pub fn front(&self) -> Vec3 {
        (self.focus - self.position).normalize_or_zero()
    }

    /// Unit screen-space right vector.
    pub fn right(&self) -> Vec3 {
        self.front().cross(self.up).normalize_or_zero()
    }

    /// Rotate the camera around the focus by a pointer delta in pixels.
    ///
    /// Horizontal motion turns about the current up axis, vertical motion about
    /// the camera's right axis. The up vector turns with the camera, so the
    /// basis stays orthonormal and no pitch clamp is needed.
    pub fn orbit(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }

        let mut offset = self.position - self.focus;
        let mut up = self.up;

        if delta.x != 0.0 {
            let yaw = Quat::from_axis_angle(up, -delta.x * self.rotate_speed);
            offset = yaw * offset;
            up = yaw * up;
        }

        if delta.y != 0.0 {
            let right = (-offset).cross(up).normalize_or_zero();
            if right != Vec3::ZERO {
                let pitch = Quat::from_axis_angle(right, -delta.y * self.rotate_speed);
                offset = pitch * offset;
                up = pitch * up;
            }
        }

        self.position = self.focus + offset;
        self.up = up.normalize();
    }

    /// Translate position and focus together along the screen plane.
    pub fn pan(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        let scale = self.pan_speed * self.distance();
        let shift = (-delta.x * self.right() + delta.y * self.up) * scale;
        self.position += shift;
        self.focus += shift;
    }

    /// Move toward (positive) or away from (negative) the focus.
    ///
    /// The step is proportional to the current distance and never brings the
    /// camera closer than [`MIN_DISTANCE`].
    pub fn zoom(&mut self, amount: f32) {
        if amount == 0.0 {
            return;
        }
        let distance = self.distance();
        let new_distance = (distance - amount * self.zoom_speed * distance).max(MIN_DISTANCE);
        self.position = self.focus - self.front() * new_distance;
    }

    /// Called by the resize handler only. Zero-sized dimensions are ignored.
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = aspect_of(width, height);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.focus, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn uniforms(&self) -> CameraUniforms {
        CameraUniforms::from_matrices(self.view_matrix(), self.projection_matrix(), self.position)
    }
}

fn aspect_of(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn camera() -> Camera {
        Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 800, 600)
    }

    fn yaw_angle(before: Vec3, after: Vec3) -> f32 {
        let a = Vec2::new(before.x, before.z);
        let b = Vec2::new(after.x, after.z);
        a.angle_to(b).abs()
    }

    #[test]
    fn zero_delta_orbit_is_noop() {
        let mut cam = camera();
        let before = cam.clone();
        cam.orbit(Vec2::ZERO);
        assert_eq!(cam, before);
    }

    #[test]
    fn orbit_preserves_distance_and_orthonormal_basis() {
        let mut cam = camera();
        cam.orbit(Vec2::new(37.0, -22.0));
        cam.orbit(Vec2::new(-5.0, 80.0));
        assert!((cam.distance() - 5.0).abs() < EPS);
        assert!((cam.up().length() - 1.0).abs() < EPS);
        assert!(cam.front().dot(cam.up()).abs() < EPS);
    }

    #[test]
    fn horizontal_orbit_turns_about_up_monotonically() {
        let base = camera();
        let mut small = base.clone();
        let mut large = base.clone();
        small.orbit(Vec2::new(10.0, 0.0));
        large.orbit(Vec2::new(40.0, 0.0));

        // pure yaw keeps the height and the up vector
        assert!(small.position().y.abs() < EPS);
        assert!((small.up() - Vec3::Y).length() < EPS);

        let a = yaw_angle(base.position(), small.position());
        let b = yaw_angle(base.position(), large.position());
        assert!(a > 0.0);
        assert!(b > a);
    }

    #[test]
    fn positive_dx_swings_camera_left() {
        let mut cam = camera();
        cam.orbit(Vec2::new(20.0, 0.0));
        // camera starts on +Z looking at -Z, so its left is -X
        assert!(cam.position().x < 0.0);
    }

    #[test]
    fn vertical_orbit_turns_about_right_axis_monotonically() {
        let base = camera();
        let mut small = base.clone();
        let mut large = base.clone();
        small.orbit(Vec2::new(0.0, 10.0));
        large.orbit(Vec2::new(0.0, 40.0));

        // pure pitch stays in the plane spanned by front and up
        assert!(small.position().x.abs() < EPS);
        assert!(small.position().y > 0.0);
        assert!(large.position().y > small.position().y);
        assert!((small.right() - base.right()).length() < EPS);
    }

    #[test]
    fn pan_keeps_view_direction_and_offset() {
        let mut cam = camera();
        let front = cam.front();
        let offset = cam.position() - cam.focus();
        cam.pan(Vec2::new(15.0, -8.0));
        assert!((cam.front() - front).length() < EPS);
        assert!((cam.position() - cam.focus() - offset).length() < EPS);
        assert!(cam.focus().x < 0.0);
        assert!(cam.focus().y < 0.0);
    }

    #[test]
    fn zoom_moves_along_view_and_never_crosses_focus() {
        let mut cam = camera();
        cam.zoom(1.0);
        assert!(cam.distance() < 5.0);
        assert!(cam.position().z > 0.0);

        for _ in 0..200 {
            cam.zoom(50.0);
        }
        assert!((cam.distance() - MIN_DISTANCE).abs() < EPS);
        assert!(cam.position().z > 0.0);

        cam.zoom(-1.0);
        assert!(cam.distance() > MIN_DISTANCE);
    }

    #[test]
    fn coincident_focus_still_gives_finite_view() {
        let cam = Camera::new(Vec3::ZERO, Vec3::ZERO, 800, 600);
        assert!((cam.up().length() - 1.0).abs() < EPS);
        assert!(cam.front().abs_diff_eq(Vec3::NEG_Z, EPS));
        assert!(cam.view_matrix().is_finite());
        assert!(cam.uniforms().view_matrix.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn only_resize_changes_aspect() {
        let mut cam = camera();
        assert!((cam.aspect() - 800.0 / 600.0).abs() < EPS);
        cam.orbit(Vec2::new(3.0, 4.0));
        cam.pan(Vec2::new(3.0, 4.0));
        cam.zoom(1.0);
        assert!((cam.aspect() - 800.0 / 600.0).abs() < EPS);

        cam.set_viewport_size(1024, 768);
        assert!((cam.aspect() - 1024.0 / 768.0).abs() < EPS);
        cam.set_viewport_size(0, 768);
        assert!((cam.aspect() - 1024.0 / 768.0).abs() < EPS);
    }

    #[test]
    fn view_matrix_maps_focus_in_front_of_camera() {
        let cam = camera();
        let focus_view = cam.view_matrix().transform_point3(cam.focus());
        assert!((focus_view - Vec3::new(0.0, 0.0, -5.0)).length() < EPS);
    }
}
