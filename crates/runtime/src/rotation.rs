/// Radians the globe turns per rendered frame.
pub const DEFAULT_GLOBE_SPEED: f64 = 0.0005;
/// Extra radians per frame for the cloud layer, so clouds drift over land.
pub const DEFAULT_CLOUD_DRIFT: f64 = 0.0002;

/// Idle auto-rotation of the globe and its cloud shell.
///
/// Rotation advances by a fixed step per frame, not per second; the globe
/// turns faster on faster displays.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AutoRotation {
    pub globe_speed: f64,
    pub cloud_drift: f64,
    globe_yaw_rad: f64,
    cloud_yaw_rad: f64,
}

impl Default for AutoRotation {
    fn default() -> Self {
        Self::new(DEFAULT_GLOBE_SPEED, DEFAULT_CLOUD_DRIFT)
    }
}

impl AutoRotation {
    pub fn new(globe_speed: f64, cloud_drift: f64) -> Self {
        Self {
            globe_speed,
            cloud_drift,
            globe_yaw_rad: 0.0,
            cloud_yaw_rad: 0.0,
        }
    }

    /// Advances one frame unless rotation is suspended.
    ///
    /// Returns `true` if the globe moved.
    pub fn advance(&mut self, suspended: bool) -> bool {
        if suspended {
            return false;
        }
        self.globe_yaw_rad = wrap_angle(self.globe_yaw_rad + self.globe_speed);
        self.cloud_yaw_rad = wrap_angle(self.cloud_yaw_rad + self.globe_speed + self.cloud_drift);
        true
    }

    pub fn globe_yaw_rad(&self) -> f64 {
        self.globe_yaw_rad
    }

    pub fn cloud_yaw_rad(&self) -> f64 {
        self.cloud_yaw_rad
    }

    pub fn set_globe_yaw_rad(&mut self, yaw: f64) {
        self.globe_yaw_rad = wrap_angle(yaw);
    }
}

fn wrap_angle(a: f64) -> f64 {
    a.rem_euclid(std::f64::consts::TAU)
}

#[cfg(test)]
mod tests {
    use super::AutoRotation;

    #[test]
    fn advances_only_when_not_suspended() {
        let mut rot = AutoRotation::new(0.5, 0.25);
        assert!(rot.advance(false));
        assert_eq!(rot.globe_yaw_rad(), 0.5);
        assert_eq!(rot.cloud_yaw_rad(), 0.75);

        assert!(!rot.advance(true));
        assert_eq!(rot.globe_yaw_rad(), 0.5);
    }

    #[test]
    fn yaw_wraps_into_one_turn() {
        let mut rot = AutoRotation::new(1.0, 0.0);
        rot.set_globe_yaw_rad(std::f64::consts::TAU - 0.5);
        rot.advance(false);
        assert!((rot.globe_yaw_rad() - 0.5).abs() < 1e-12);
    }
}
