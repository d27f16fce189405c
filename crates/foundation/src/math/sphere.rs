use super::Vec3;

/// Radius of the rendered globe in scene units.
pub const GLOBE_RADIUS: f64 = 100.0;

/// Geographic coordinate in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LonLat {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl LonLat {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }
}

/// Projects a geographic coordinate onto a sphere of `radius`.
///
/// Longitude is negated before conversion so that, with Y up, eastern
/// longitudes appear to the right for a camera looking down -Z at the globe.
/// Inputs are expected to be in range; no validation happens here.
pub fn project(lon_deg: f64, lat_deg: f64, radius: f64) -> Vec3 {
    let lat = lat_deg.to_radians();
    let lon = (-lon_deg).to_radians();
    let cos_lat = lat.cos();

    Vec3::new(
        radius * cos_lat * lon.cos(),
        radius * lat.sin(),
        radius * cos_lat * lon.sin(),
    )
}

pub fn project_lon_lat(coord: LonLat, radius: f64) -> Vec3 {
    project(coord.lon_deg, coord.lat_deg, radius)
}

/// Inverse of [`project`]; the radius is implied by the point's length.
///
/// Returns `None` for the origin.
pub fn unproject(point: Vec3) -> Option<LonLat> {
    let r = point.length();
    if r <= 0.0 || !r.is_finite() {
        return None;
    }
    let lat = (point.y / r).clamp(-1.0, 1.0).asin();
    let lon = -point.z.atan2(point.x);
    Some(LonLat::new(lon.to_degrees(), lat.to_degrees()))
}
