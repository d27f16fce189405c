/// Touch contact as reported by the platform.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TouchPoint {
    pub x_px: f64,
    pub y_px: f64,
    pub time_ms: f64,
}

impl TouchPoint {
    pub fn new(x_px: f64, y_px: f64, time_ms: f64) -> Self {
        Self { x_px, y_px, time_ms }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TouchVerdict {
    /// Short, still touch: pick at the end position.
    Tap { x_px: f64, y_px: f64 },
    /// Long press or drag; belongs to the camera controls.
    Ignored,
}

/// Decides whether a touch is a tap.
///
/// Both limits are strict: a touch lasting exactly `max_duration_ms`, or
/// moving exactly `max_move_px` on either axis, is not a tap.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TapClassifier {
    pub max_duration_ms: f64,
    pub max_move_px: f64,
}

impl Default for TapClassifier {
    fn default() -> Self {
        Self {
            max_duration_ms: 300.0,
            max_move_px: 10.0,
        }
    }
}

impl TapClassifier {
    pub fn classify(&self, start: TouchPoint, end: TouchPoint) -> TouchVerdict {
        let duration = end.time_ms - start.time_ms;
        let dx = (end.x_px - start.x_px).abs();
        let dy = (end.y_px - start.y_px).abs();
        if duration < self.max_duration_ms && dx < self.max_move_px && dy < self.max_move_px {
            TouchVerdict::Tap {
                x_px: end.x_px,
                y_px: end.y_px,
            }
        } else {
            TouchVerdict::Ignored
        }
    }
}
