use foundation::math::Vec3;

use crate::picking::Ray;

/// Drawing surface size in CSS pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Pixel position (origin top-left) to normalized device coordinates.
    pub fn to_ndc(&self, x_px: f64, y_px: f64) -> Option<(f64, f64)> {
        if !self.is_valid() {
            return None;
        }
        Some((x_px / self.width * 2.0 - 1.0, -(y_px / self.height) * 2.0 + 1.0))
    }
}

/// Perspective camera looking at the globe.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_rad: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 200.0),
            target: Vec3::ZERO,
            up: Vec3::new(0.0, 1.0, 0.0),
            fov_y_rad: 75.0_f64.to_radians(),
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// Ray from the eye through an NDC position.
    ///
    /// Returns `None` when the view basis is degenerate (eye on target, or
    /// up parallel to the view direction).
    pub fn ray_through_ndc(&self, ndc_x: f64, ndc_y: f64, aspect: f64) -> Option<Ray> {
        let forward = (self.target - self.eye).normalized()?;
        let right = forward.cross(self.up).normalized()?;
        let up = right.cross(forward);
        let half_h = (self.fov_y_rad * 0.5).tan();
        let dir = forward + right.scale(ndc_x * half_h * aspect) + up.scale(ndc_y * half_h);
        Some(Ray::new(self.eye, dir.normalized()?))
    }

    pub fn ray_through_pixel(&self, viewport: Viewport, x_px: f64, y_px: f64) -> Option<Ray> {
        let (nx, ny) = viewport.to_ndc(x_px, y_px)?;
        self.ray_through_ndc(nx, ny, viewport.aspect())
    }

    /// The same camera expressed in the frame of a globe turned by `yaw_rad`
    /// about +Y.
    pub fn in_globe_frame(&self, yaw_rad: f64) -> Camera {
        Camera {
            eye: self.eye.rotate_y(-yaw_rad),
            target: self.target.rotate_y(-yaw_rad),
            up: self.up.rotate_y(-yaw_rad),
            ..*self
        }
    }
}
