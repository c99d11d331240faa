use glam::{Mat4, Vec2, Vec3};

use super::pick::Ray;

/// Vertical field of view.
const FOV_Y_DEGREES: f32 = 75.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 1000.0;

/// Zoom limits for the camera distance.
pub const MIN_DISTANCE: f32 = 3.0;
pub const MAX_DISTANCE: f32 = 20.0;
const INITIAL_DISTANCE: f32 = 8.0;
/// World units of distance per unit of wheel delta.
const ZOOM_SENSITIVITY: f32 = 0.005;
/// Camera height as a fraction of its distance.
const ELEVATION_RATIO: f32 = 0.125;
/// Point the camera always looks at.
const LOOK_TARGET: Vec3 = Vec3::new(0.0, 0.0, -1.0);

/// Perspective camera on a fixed rail. Its pose is a pure function of the
/// zoom distance.
#[derive(Debug, Clone)]
pub struct ViewCamera {
    distance: f32,
    viewport: Vec2,
}

impl ViewCamera {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            distance: INITIAL_DISTANCE,
            viewport: Vec2::new(width.max(1.0), height.max(1.0)),
        }
    }

    #[cfg(test)]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    #[cfg(test)]
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.x / self.viewport.y
    }

    pub fn eye(&self) -> Vec3 {
        Vec3::new(0.0, self.distance * ELEVATION_RATIO, self.distance)
    }

    /// Unit vector the camera looks along.
    pub fn forward(&self) -> Vec3 {
        (LOOK_TARGET - self.eye()).normalize()
    }

    /// Apply a wheel delta (browser convention: positive zooms out).
    pub fn zoom(&mut self, delta_y: f32) {
        self.distance =
            (self.distance + delta_y * ZOOM_SENSITIVITY).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Track a new viewport size. Zoom is left alone.
    pub fn resize(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.viewport = Vec2::new(width, height);
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), LOOK_TARGET, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), self.aspect(), NEAR, FAR)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Screen pixels (origin top-left) to normalized device coordinates.
    pub fn to_ndc(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            screen.x / self.viewport.x * 2.0 - 1.0,
            -(screen.y / self.viewport.y * 2.0 - 1.0),
        )
    }

    /// Ray from the eye through a point given in NDC.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_proj().inverse();
        let far = inv.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        let origin = self.eye();
        Ray::new(origin, far - origin)
    }

    /// Ray from the eye through a screen pixel.
    pub fn ray(&self, screen: Vec2) -> Ray {
        self.ray_from_ndc(self.to_ndc(screen))
    }

    /// Project a world point to screen pixels. None if behind the camera.
    #[cfg(test)]
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        use glam::Vec4Swizzles;

        let clip = self.view_proj() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.xy() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn starts_at_initial_pose() {
        let cam = ViewCamera::new(1600.0, 900.0);
        assert_eq!(cam.distance(), 8.0);
        assert_eq!(cam.eye(), Vec3::new(0.0, 1.0, 8.0));
    }

    #[test]
    fn zoom_clamps_at_minimum() {
        let mut cam = ViewCamera::new(800.0, 600.0);
        cam.zoom(-1000.0);
        assert_eq!(cam.distance(), MIN_DISTANCE);
        cam.zoom(-1000.0);
        assert_eq!(cam.distance(), MIN_DISTANCE);
    }

    #[test]
    fn zoom_clamps_at_maximum() {
        let mut cam = ViewCamera::new(800.0, 600.0);
        for _ in 0..10 {
            cam.zoom(1000.0);
        }
        assert_eq!(cam.distance(), MAX_DISTANCE);
        assert!(approx(cam.eye().y, MAX_DISTANCE * 0.125));
    }

    #[test]
    fn resize_keeps_distance() {
        let mut cam = ViewCamera::new(800.0, 600.0);
        cam.zoom(400.0);
        let d = cam.distance();
        cam.resize(1920.0, 1080.0);
        assert_eq!(cam.distance(), d);
        assert!(approx(cam.aspect(), 1920.0 / 1080.0));

        cam.resize(0.0, 0.0);
        assert!(approx(cam.aspect(), 1920.0 / 1080.0));
    }

    #[test]
    fn center_ray_hits_look_target() {
        let cam = ViewCamera::new(1280.0, 720.0);
        let ray = cam.ray(Vec2::new(640.0, 360.0));
        assert!((ray.direction - cam.forward()).length() < 1e-3);
    }

    #[test]
    fn project_inverts_ray() {
        let cam = ViewCamera::new(1280.0, 720.0);
        let px = Vec2::new(300.0, 500.0);
        let ray = cam.ray(px);
        let back = cam.project(ray.at(7.5)).expect("in front of camera");
        assert!((back - px).length() < 0.05, "got {back:?}");
    }

    #[test]
    fn points_behind_camera_do_not_project() {
        let cam = ViewCamera::new(800.0, 600.0);
        assert!(cam.project(Vec3::new(0.0, 1.0, 20.0)).is_none());
    }
}
