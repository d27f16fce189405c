/// Per-frame metadata handed to the render callback.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Seconds since the previous frame.
    pub dt_s: f64,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self { index, dt_s }
    }

    pub fn first() -> Self {
        Self::new(0, 0.0)
    }

    pub fn next(self, dt_s: f64) -> Self {
        Self::new(self.index + 1, dt_s)
    }
}
