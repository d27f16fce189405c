use foundation::math::Vec3;
use foundation::math::precision::stable_total_cmp_f64;

use crate::camera::{Camera, Viewport};
use crate::identifier::Identifier;
use crate::index::{CountryEntry, CountryIndex};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir.scale(t)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub country_id: Identifier,
    pub country_name: String,
    pub slot: usize,
    pub distance: f64,
    pub point: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    pub max_distance: f64,
    /// Also accept rays passing within this distance of a border segment.
    pub line_threshold: Option<f64>,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            max_distance: 1.0e30,
            line_threshold: None,
        }
    }
}

/// Pick result plus how many countries survived the BVH query.
#[derive(Debug, Clone, PartialEq)]
pub struct PickOutcome {
    pub hit: Option<PickHit>,
    pub candidates: usize,
}

/// Deterministic ray picking against country fill triangles.
///
/// Ordering contract:
/// - The closest hit along the (normalized) ray wins.
/// - Equal distances resolve to the lower slot.
///
/// Triangles are tested double-sided. Countries without bounds (nothing
/// emitted at build time) are never candidates.
pub fn pick_ray(index: &CountryIndex, ray: Ray, opts: PickOptions) -> PickOutcome {
    let Some(dir) = ray.dir.normalized() else {
        return PickOutcome { hit: None, candidates: 0 };
    };
    let ray = Ray::new(ray.origin, dir);

    let margin = opts.line_threshold.unwrap_or(0.0).max(0.0);
    let candidates = index
        .bvh()
        .query_ray(ray.origin.as_array(), dir.as_array(), 0.0, opts.max_distance, margin);

    let mut best: Option<(f64, usize)> = None;
    for &slot in &candidates {
        let Some(entry) = index.entry(slot) else {
            continue;
        };
        let Some(t) = nearest_on_entry(entry, &ray, opts) else {
            continue;
        };

        best = match best {
            None => Some((t, slot)),
            Some((bt, bs)) => {
                let ord = stable_total_cmp_f64(t, bt).then_with(|| slot.cmp(&bs));
                if ord.is_lt() { Some((t, slot)) } else { Some((bt, bs)) }
            }
        };
    }

    let hit = best.and_then(|(t, slot)| {
        let entry = index.entry(slot)?;
        Some(PickHit {
            country_id: entry.tag.country_id.clone(),
            country_name: entry.tag.country_name.clone(),
            slot,
            distance: t,
            point: ray.at(t),
        })
    });

    PickOutcome {
        hit,
        candidates: candidates.len(),
    }
}

/// Screen picking: pixel → NDC → camera ray → `pick_ray`.
///
/// `camera` must already be expressed in the globe's frame.
pub fn pick_screen(
    index: &CountryIndex,
    x_px: f64,
    y_px: f64,
    camera: &Camera,
    viewport: Viewport,
    opts: PickOptions,
) -> PickOutcome {
    match camera.ray_through_pixel(viewport, x_px, y_px) {
        Some(ray) => pick_ray(index, ray, opts),
        None => PickOutcome { hit: None, candidates: 0 },
    }
}

fn nearest_on_entry(entry: &CountryEntry, ray: &Ray, opts: PickOptions) -> Option<f64> {
    let in_range = |t: f64| t > 0.0 && t <= opts.max_distance;

    let mut best: Option<f64> = None;
    let mut consider = |t: f64| {
        if in_range(t) && best.is_none_or(|b| t < b) {
            best = Some(t);
        }
    };

    for [a, b, c] in &entry.region.triangles {
        if let Some(t) = ray_triangle(ray, *a, *b, *c) {
            consider(t);
        }
    }
    if let Some(threshold) = opts.line_threshold {
        for [a, b] in &entry.boundary.segments {
            if let Some(t) = ray_segment(ray, *a, *b, threshold) {
                consider(t);
            }
        }
    }
    best
}

const EPS: f64 = 1e-12;

/// Möller–Trumbore, both faces.
fn ray_triangle(ray: &Ray, a: Vec3, b: Vec3, c: Vec3) -> Option<f64> {
    let e1 = b - a;
    let e2 = c - a;
    let p = ray.dir.cross(e2);
    let det = e1.dot(p);
    if det.abs() < EPS {
        return None;
    }
    let inv = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = ray.dir.dot(q) * inv;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv;
    (t > EPS).then_some(t)
}

/// Ray parameter of the closest approach to segment `ab`, if that approach
/// is within `threshold`. `ray.dir` must be unit length.
fn ray_segment(ray: &Ray, a: Vec3, b: Vec3, threshold: f64) -> Option<f64> {
    let d = b - a;
    let w = ray.origin - a;
    let dd = d.dot(d);
    let rd = ray.dir.dot(d);
    let rw = ray.dir.dot(w);
    let dw = d.dot(w);

    let denom = dd - rd * rd;
    let s = if dd <= EPS {
        0.0
    } else if denom.abs() <= EPS {
        // Parallel: project the ray origin onto the segment.
        (dw / dd).clamp(0.0, 1.0)
    } else {
        ((dw - rd * rw) / denom).clamp(0.0, 1.0)
    };
    let on_segment = a + d.scale(s);
    let t = (on_segment - ray.origin).dot(ray.dir);
    if t <= 0.0 {
        return None;
    }
    let gap = (ray.at(t) - on_segment).length();
    (gap <= threshold).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshOptions;
    use formats::{GeoFeature, GeoGeometry};
    use foundation::math::LonLat;

    // Longitude -90 faces a camera on +Z when the globe is not rotated.
    fn square(lon: f64, lat: f64, size: f64) -> GeoGeometry {
        GeoGeometry::Polygon(vec![vec![
            LonLat::new(lon, lat),
            LonLat::new(lon + size, lat),
            LonLat::new(lon + size, lat + size),
            LonLat::new(lon, lat + size),
        ]])
    }

    fn index_of(features: Vec<GeoFeature>) -> CountryIndex {
        CountryIndex::build(&features, &MeshOptions::default())
    }

    #[test]
    fn screen_center_hits_facing_country() {
        let index = index_of(vec![
            GeoFeature::new("Front", square(-96.0, -4.0, 10.0)).with_iso_code("FRT"),
            GeoFeature::new("Back", square(85.0, -5.0, 10.0)).with_iso_code("BCK"),
        ]);
        let vp = Viewport::new(800.0, 600.0);
        let out = pick_screen(&index, 400.0, 300.0, &Camera::default(), vp, PickOptions::default());
        let hit = out.hit.expect("hit");
        assert_eq!(hit.country_name, "Front");
        assert_eq!(hit.country_id, Identifier::Code("FRT".into()));
        assert!(hit.distance > 99.0 && hit.distance < 101.0, "distance {}", hit.distance);
        assert!(out.candidates >= 1);
    }

    #[test]
    fn nearest_hit_wins_across_layers() {
        // A shell of radius 80 is hit about 120 units from the eye.
        let inner = CountryIndex::build(
            &[GeoFeature::new("Inner", square(-96.0, -4.0, 10.0)).with_iso_code("INN")],
            &MeshOptions { radius: 80.0, ..MeshOptions::default() },
        );
        let ray = Ray::new(Vec3::new(0.0, 0.0, 200.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = pick_ray(&inner, ray, PickOptions::default()).hit.expect("hit");
        assert!((hit.distance - 120.0).abs() < 1.0);

        let index = index_of(vec![
            GeoFeature::new("A", square(-96.0, -4.0, 10.0)).with_iso_code("AAA"),
            GeoFeature::new("B", square(-106.0, -14.0, 30.0)).with_iso_code("BBB"),
        ]);
        let hit = pick_ray(&index, ray, PickOptions::default()).hit.expect("hit");
        // Both cover the ray; the smaller square's triangles sit closer to
        // the sphere surface, so they are hit first.
        assert_eq!(hit.country_name, "A");
    }

    #[test]
    fn equal_distance_prefers_lower_slot() {
        let g = square(-96.0, -4.0, 10.0);
        let index = index_of(vec![
            GeoFeature::new("First", g.clone()).with_iso_code("ONE"),
            GeoFeature::new("Second", g).with_iso_code("TWO"),
        ]);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 200.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = pick_ray(&index, ray, PickOptions::default()).hit.expect("hit");
        assert_eq!(hit.slot, 0);
    }

    #[test]
    fn miss_returns_none() {
        let index = index_of(vec![GeoFeature::new("Back", square(85.0, -5.0, 10.0)).with_iso_code("BCK")]);
        // Ray that passes beside the globe entirely.
        let ray = Ray::new(Vec3::new(150.0, 0.0, 200.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(pick_ray(&index, ray, PickOptions::default()).hit, None);
        let empty = index_of(Vec::new());
        assert_eq!(
            pick_screen(&empty, 1.0, 1.0, &Camera::default(), Viewport::new(10.0, 10.0), PickOptions::default()).hit,
            None
        );
    }

    #[test]
    fn border_threshold_picks_lines() {
        // Degenerate fill: all points on one meridian, so only borders exist.
        let line = GeoGeometry::Polygon(vec![vec![
            LonLat::new(-90.0, -5.0),
            LonLat::new(-90.0, 0.0),
            LonLat::new(-90.0, 5.0),
        ]]);
        let index = index_of(vec![GeoFeature::new("Line", line).with_iso_code("LIN")]);
        let ray = Ray::new(Vec3::new(0.5, 0.0, 200.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(pick_ray(&index, ray, PickOptions::default()).hit, None);

        let opts = PickOptions { line_threshold: Some(1.0), ..PickOptions::default() };
        let hit = pick_ray(&index, ray, opts).hit.expect("hit");
        assert_eq!(hit.country_name, "Line");
    }

    #[test]
    fn triangle_test_is_double_sided() {
        let (a, b, c) = (Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let front = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let back = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(ray_triangle(&front, a, b, c), Some(5.0));
        assert_eq!(ray_triangle(&back, a, b, c), Some(5.0));
        let behind = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(ray_triangle(&behind, a, b, c), None);
    }
}
