use glam::{Mat4, Vec2, Vec3};

use crate::types::CameraSettings;

const POLE_EPSILON: f32 = 0.0001;
const ZOOM_SPEED: f32 = 0.05;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 500.0;
const DAMPING_REFERENCE_FPS: f32 = 60.0;

/// Perspective camera orbiting the origin on a sphere, with damped rotation.
///
/// `theta` is the azimuth around +y and `phi` the polar angle from +y; the
/// starting pose (theta 0, phi pi/2) puts the eye on +z looking at the origin.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    settings: CameraSettings,
    center: Vec3,
    radius: f32,
    theta: f32,
    phi: f32,
    rotate_delta: Vec2,
}

impl OrbitCamera {
    pub fn new(settings: CameraSettings) -> Self {
        Self {
            settings,
            center: Vec3::ZERO,
            radius: settings.distance.max(MIN_DISTANCE),
            theta: 0.0,
            phi: std::f32::consts::FRAC_PI_2,
            rotate_delta: Vec2::ZERO,
        }
    }

    pub fn orbit_enabled(&self) -> bool {
        self.settings.orbit
    }

    /// Accumulates a drag of `delta` physical pixels into pending rotation.
    pub fn drag(&mut self, delta: Vec2, screen_height: f32) {
        if !self.settings.orbit {
            return;
        }
        let rotate_per_pixel = std::f32::consts::TAU / screen_height.max(1.0);
        self.rotate_delta -= delta * rotate_per_pixel;
    }

    /// Dollies toward (positive `lines`) or away from the target.
    pub fn zoom(&mut self, lines: f32) {
        if !self.settings.orbit || lines == 0.0 || !lines.is_finite() {
            return;
        }
        let scale = (1.0 - ZOOM_SPEED).powf(lines.abs());
        if lines > 0.0 {
            self.radius *= scale;
        } else {
            self.radius /= scale;
        }
        self.radius = self.radius.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Applies a damped share of the pending rotation. The retained share
    /// decays by `1 - damping` per 60 Hz frame regardless of the real rate.
    pub fn update(&mut self, dt: f32) {
        let damping = self.settings.damping;
        if damping > 0.0 && damping < 1.0 {
            let retention = (1.0 - damping).powf(dt.max(0.0) * DAMPING_REFERENCE_FPS);
            let applied = self.rotate_delta * (1.0 - retention);
            self.theta += applied.x;
            self.phi += applied.y;
            self.rotate_delta *= retention;
        } else {
            self.theta += self.rotate_delta.x;
            self.phi += self.rotate_delta.y;
            self.rotate_delta = Vec2::ZERO;
        }
        self.phi = self
            .phi
            .clamp(POLE_EPSILON, std::f32::consts::PI - POLE_EPSILON);
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        self.center
            + Vec3::new(
                self.radius * sin_phi * sin_theta,
                self.radius * cos_phi,
                self.radius * sin_phi * cos_theta,
            )
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.center, Vec3::Y)
    }

    /// wgpu clip space (depth 0..1).
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.settings.fov_degrees.to_radians(),
            aspect.max(f32::EPSILON),
            self.settings.near,
            self.settings.far,
        )
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(CameraSettings::default())
    }

    #[test]
    fn starts_on_positive_z() {
        let eye = camera().eye();
        assert!((eye - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn origin_projects_to_screen_centre() {
        let clip = camera().view_proj(16.0 / 9.0) * Vec4::new(0.0, 0.0, -8.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn damping_applies_rotation_gradually() {
        let mut camera = camera();
        camera.drag(Vec2::new(-100.0, 0.0), 720.0);
        camera.update(1.0 / 60.0);
        let first = camera.theta;
        assert!(first > 0.0);
        let total = std::f32::consts::TAU * 100.0 / 720.0;
        assert!((first - total * 0.05).abs() < 1e-4);
        for _ in 0..600 {
            camera.update(1.0 / 60.0);
        }
        assert!((camera.theta - total).abs() < 1e-3);
    }

    #[test]
    fn polar_angle_never_reaches_the_poles() {
        let mut camera = OrbitCamera::new(CameraSettings {
            damping: 0.0,
            ..CameraSettings::default()
        });
        camera.drag(Vec2::new(0.0, 100_000.0), 720.0);
        camera.update(0.016);
        assert!(camera.phi >= POLE_EPSILON);
        assert!(camera.eye().is_finite());
    }

    #[test]
    fn zoom_is_clamped_and_respects_disabled_orbit() {
        let mut camera = camera();
        camera.zoom(1.0);
        assert!(camera.eye().z < 2.0);
        for _ in 0..500 {
            camera.zoom(-5.0);
        }
        assert!((camera.eye().length() - MAX_DISTANCE).abs() < 1e-2);

        let mut fixed = OrbitCamera::new(CameraSettings {
            orbit: false,
            ..CameraSettings::default()
        });
        fixed.zoom(3.0);
        fixed.drag(Vec2::new(50.0, 50.0), 720.0);
        fixed.update(0.016);
        assert!((fixed.eye() - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-5);
    }
}
