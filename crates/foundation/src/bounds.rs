use crate::math::Vec3;

/// Axis-aligned bounding box in scene coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb3 {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Aabb3 { min, max }
    }

    /// Bounds of a point cloud, `None` when empty.
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Self> {
        let mut out: Option<Self> = None;
        for p in points {
            out = Some(match out {
                None => Self::new(p.as_array(), p.as_array()),
                Some(b) => b.include(p),
            });
        }
        out
    }

    pub fn include(self, p: Vec3) -> Self {
        Self::new(
            [self.min[0].min(p.x), self.min[1].min(p.y), self.min[2].min(p.z)],
            [self.max[0].max(p.x), self.max[1].max(p.y), self.max[2].max(p.z)],
        )
    }

    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            [
                self.min[0].min(other.min[0]),
                self.min[1].min(other.min[1]),
                self.min[2].min(other.min[2]),
            ],
            [
                self.max[0].max(other.max[0]),
                self.max[1].max(other.max[1]),
                self.max[2].max(other.max[2]),
            ],
        )
    }

    /// Grows the box by `margin` on every side.
    pub fn inflate(&self, margin: f64) -> Self {
        Self::new(
            [self.min[0] - margin, self.min[1] - margin, self.min[2] - margin],
            [self.max[0] + margin, self.max[1] + margin, self.max[2] + margin],
        )
    }

    pub fn centroid_axis(&self, axis: usize) -> f64 {
        (self.min[axis] + self.max[axis]) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::Aabb3;
    use crate::math::Vec3;

    #[test]
    fn from_points_covers_all() {
        let b = Aabb3::from_points([
            Vec3::new(1.0, -2.0, 0.0),
            Vec3::new(-1.0, 3.0, 0.5),
            Vec3::new(0.0, 0.0, -4.0),
        ])
        .expect("bounds");
        assert_eq!(b.min, [-1.0, -2.0, -4.0]);
        assert_eq!(b.max, [1.0, 3.0, 0.5]);
        assert!(Aabb3::from_points(Vec::<Vec3>::new()).is_none());
    }

    #[test]
    fn inflate_grows_every_axis() {
        let b = Aabb3::new([0.0; 3], [1.0; 3]).inflate(0.5);
        assert_eq!(b.min, [-0.5; 3]);
        assert_eq!(b.max, [1.5; 3]);
    }
}
