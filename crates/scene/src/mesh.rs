use earcutr::earcut;
use foundation::bounds::Aabb3;
use foundation::math::{GLOBE_RADIUS, Vec3, project_lon_lat};
use formats::{GeoGeometry, Ring};

/// How filled regions are triangulated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Triangulation {
    /// Triangles fanned from each ring's first vertex. Exact for convex and
    /// star-shaped rings; concave rings overdraw.
    #[default]
    Fan,
    /// Ear clipping per polygon in a local tangent plane; holes respected.
    EarCut,
}

impl Triangulation {
    pub fn as_str(self) -> &'static str {
        match self {
            Triangulation::Fan => "fan",
            Triangulation::EarCut => "earcut",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeshOptions {
    pub radius: f64,
    pub triangulation: Triangulation,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            radius: GLOBE_RADIUS,
            triangulation: Triangulation::Fan,
        }
    }
}

/// Border line segments; rings are not closed back to their first point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryMesh {
    pub segments: Vec<[Vec3; 2]>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionMesh {
    pub triangles: Vec<[Vec3; 3]>,
}

/// Non-fatal problem found while meshing one feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshIssue {
    /// Ring with fewer than three points; contributes nothing.
    DegenerateRing {
        polygon: usize,
        ring: usize,
        points: usize,
    },
    /// Ear clipping failed for a polygon; its fill is empty.
    TriangulationFailed { polygon: usize },
}

impl std::fmt::Display for MeshIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshIssue::DegenerateRing {
                polygon,
                ring,
                points,
            } => write!(
                f,
                "degenerate ring {ring} of polygon {polygon}: {points} point(s)"
            ),
            MeshIssue::TriangulationFailed { polygon } => {
                write!(f, "triangulation failed for polygon {polygon}")
            }
        }
    }
}

/// Meshes of one feature; multi-polygons accumulate into one pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryMesh {
    pub boundary: BoundaryMesh,
    pub region: RegionMesh,
    /// `None` when nothing was emitted.
    pub bounds: Option<Aabb3>,
    pub issues: Vec<MeshIssue>,
}

pub fn build_country_mesh(geometry: &GeoGeometry, opts: &MeshOptions) -> CountryMesh {
    let mut mesh = CountryMesh::default();

    for (poly_i, rings) in geometry.polygons().into_iter().enumerate() {
        let mut projected: Vec<Vec<Vec3>> = Vec::with_capacity(rings.len());
        for (ring_i, ring) in rings.iter().enumerate() {
            if ring.len() < 3 {
                mesh.issues.push(MeshIssue::DegenerateRing {
                    polygon: poly_i,
                    ring: ring_i,
                    points: ring.len(),
                });
                projected.push(Vec::new());
                continue;
            }
            let points = project_ring(ring, opts.radius);
            push_border(&mut mesh.boundary, &points);
            projected.push(points);
        }

        match opts.triangulation {
            Triangulation::Fan => {
                for points in projected.iter().filter(|p| !p.is_empty()) {
                    push_fan(&mut mesh.region, points);
                }
            }
            Triangulation::EarCut => {
                if !push_earcut(&mut mesh.region, &projected) {
                    mesh.issues.push(MeshIssue::TriangulationFailed { polygon: poly_i });
                }
            }
        }
    }

    let seg_points = mesh.boundary.segments.iter().flatten().copied();
    let tri_points = mesh.region.triangles.iter().flatten().copied();
    mesh.bounds = Aabb3::from_points(seg_points.chain(tri_points));
    mesh
}

fn project_ring(ring: &Ring, radius: f64) -> Vec<Vec3> {
    ring.iter().map(|p| project_lon_lat(*p, radius)).collect()
}

fn push_border(out: &mut BoundaryMesh, points: &[Vec3]) {
    out.segments
        .extend(points.windows(2).map(|w| [w[0], w[1]]));
}

fn push_fan(out: &mut RegionMesh, points: &[Vec3]) {
    let apex = points[0];
    out.triangles
        .extend(points[1..].windows(2).map(|w| [apex, w[0], w[1]]));
}

/// Triangulates one polygon (outer ring then holes) in the tangent plane at
/// the outer ring's centroid. Empty entries stand for skipped rings.
fn push_earcut(out: &mut RegionMesh, rings: &[Vec<Vec3>]) -> bool {
    let Some(outer) = rings.first().filter(|r| !r.is_empty()) else {
        // Degenerate outer ring is already reported.
        return true;
    };

    let origin = centroid(outer);
    let Some(n) = origin.normalized() else {
        return false;
    };
    let up = if n.y.abs() < 0.99 {
        Vec3::new(0.0, 1.0, 0.0)
    } else {
        Vec3::new(0.0, 0.0, 1.0)
    };
    let Some(east) = up.cross(n).normalized() else {
        return false;
    };
    let north = n.cross(east);

    let mut vertices: Vec<Vec3> = Vec::new();
    let mut coords_2d: Vec<f64> = Vec::new();
    let mut hole_indices: Vec<usize> = Vec::new();

    for (ring_i, ring) in rings.iter().enumerate() {
        let mut pts = ring.clone();
        drop_closing_duplicate(&mut pts);
        if pts.len() < 3 {
            continue;
        }
        if ring_i > 0 {
            hole_indices.push(vertices.len());
        }
        for p in pts {
            let v = p - origin;
            coords_2d.push(v.dot(east));
            coords_2d.push(v.dot(north));
            vertices.push(p);
        }
    }

    if vertices.len() < 3 {
        return true;
    }

    let Ok(indices) = earcut(&coords_2d, &hole_indices, 2) else {
        return false;
    };
    for tri in indices.chunks_exact(3) {
        if let (Some(a), Some(b), Some(c)) = (
            vertices.get(tri[0]),
            vertices.get(tri[1]),
            vertices.get(tri[2]),
        ) {
            out.triangles.push([*a, *b, *c]);
        }
    }
    true
}

fn drop_closing_duplicate(points: &mut Vec<Vec3>) {
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        if points.len() >= 2 && (*first - *last).length() < 1e-9 {
            points.pop();
        }
    }
}

fn centroid(points: &[Vec3]) -> Vec3 {
    let sum = points.iter().fold(Vec3::ZERO, |acc, p| acc + *p);
    sum.scale(1.0 / points.len() as f64)
}
