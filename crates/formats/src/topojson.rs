use std::collections::BTreeMap;

use foundation::math::LonLat;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::GeoDataError;
use crate::geo_feature::{GeoDataset, GeoGeometry, Ring};
use crate::geojson::FeatureIdentity;

/// Object read when the caller does not name one (world-atlas layout).
pub const DEFAULT_TOPOLOGY_OBJECT: &str = "countries";

#[derive(Debug, Deserialize)]
struct Topology {
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    transform: Option<Transform>,
    #[serde(default)]
    objects: BTreeMap<String, TopoGeometry>,
    #[serde(default)]
    arcs: Vec<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct TopoGeometry {
    #[serde(rename = "type", default)]
    ty: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    arcs: Option<Value>,
    #[serde(default)]
    geometries: Vec<TopoGeometry>,
}

impl GeoDataset {
    pub fn from_topojson_str(payload: &str, object: &str) -> Result<Self, GeoDataError> {
        let value: Value = serde_json::from_str(payload).map_err(GeoDataError::Json)?;
        let mut dataset = features_from_topology_value(value, object)?;
        dataset.fingerprint = crate::fingerprint_bytes(payload.as_bytes());
        Ok(dataset)
    }
}

/// Converts one named object of a TopoJSON topology into features.
///
/// Arcs are delta-decoded and dequantized when the topology carries a
/// transform. A negative arc index `i` refers to arc `!i` walked backwards;
/// the shared joint point between consecutive arcs is kept once.
pub fn features_from_topology_value(value: Value, object: &str) -> Result<GeoDataset, GeoDataError> {
    let topology: Topology = serde_json::from_value(value).map_err(GeoDataError::Json)?;
    if topology.ty != "Topology" {
        return Err(GeoDataError::NotATopology);
    }
    let root = topology
        .objects
        .get(object)
        .ok_or_else(|| GeoDataError::MissingObject {
            name: object.to_string(),
        })?;

    let arcs = decode_arcs(&topology.arcs, topology.transform);

    let members: Vec<&TopoGeometry> = if root.ty.as_deref() == Some("GeometryCollection") {
        root.geometries.iter().collect()
    } else {
        vec![root]
    };

    let mut dataset = GeoDataset::default();
    for (index, geom) in members.into_iter().enumerate() {
        let geometry = match member_geometry(&arcs, geom, index) {
            Ok(Some(geometry)) => geometry,
            Ok(None) => {
                debug!(index, "skipping topology geometry without areal type");
                dataset.skipped += 1;
                continue;
            }
            Err(err) => {
                debug!(index, %err, "skipping malformed topology geometry");
                dataset.skipped += 1;
                continue;
            }
        };
        let identity = FeatureIdentity::read(geom.id.as_ref(), geom.properties.as_ref());
        dataset.features.push(identity.into_feature(geometry));
    }

    Ok(dataset)
}

/// Areal geometry of one collection member, `None` for other types.
fn member_geometry(
    arcs: &[Vec<LonLat>],
    geom: &TopoGeometry,
    index: usize,
) -> Result<Option<GeoGeometry>, GeoDataError> {
    match geom.ty.as_deref() {
        Some("Polygon") => {
            let rings = arc_list_2(geom.arcs.as_ref(), index)?;
            Ok(Some(GeoGeometry::Polygon(stitch_polygon(arcs, &rings)?)))
        }
        Some("MultiPolygon") => {
            let polys = arc_list_3(geom.arcs.as_ref(), index)?;
            let polygons = polys
                .iter()
                .map(|rings| stitch_polygon(arcs, rings))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(GeoGeometry::MultiPolygon(polygons)))
        }
        _ => Ok(None),
    }
}

fn decode_arcs(raw: &[Vec<Vec<f64>>], transform: Option<Transform>) -> Vec<Vec<LonLat>> {
    raw.iter()
        .map(|arc| {
            let (mut x, mut y) = (0.0, 0.0);
            arc.iter()
                .filter(|p| p.len() >= 2)
                .map(|p| match transform {
                    Some(t) => {
                        x += p[0];
                        y += p[1];
                        LonLat::new(x * t.scale[0] + t.translate[0], y * t.scale[1] + t.translate[1])
                    }
                    None => LonLat::new(p[0], p[1]),
                })
                .collect()
        })
        .collect()
}

fn stitch_polygon(arcs: &[Vec<LonLat>], rings: &[Vec<i64>]) -> Result<Vec<Ring>, GeoDataError> {
    rings.iter().map(|ring| stitch_ring(arcs, ring)).collect()
}

fn stitch_ring(arcs: &[Vec<LonLat>], indices: &[i64]) -> Result<Ring, GeoDataError> {
    let mut points: Ring = Vec::new();
    for &i in indices {
        let (slot, reversed) = if i < 0 { (!i, true) } else { (i, false) };
        let arc = usize::try_from(slot)
            .ok()
            .and_then(|s| arcs.get(s))
            .ok_or(GeoDataError::InvalidArc { index: i })?;
        if !points.is_empty() {
            points.pop();
        }
        if reversed {
            points.extend(arc.iter().rev().copied());
        } else {
            points.extend(arc.iter().copied());
        }
    }
    Ok(points)
}

fn arc_list_2(value: Option<&Value>, index: usize) -> Result<Vec<Vec<i64>>, GeoDataError> {
    let value = value.ok_or_else(|| invalid(index, "geometry missing arcs"))?;
    serde_json::from_value(value.clone()).map_err(|e| invalid(index, &format!("bad Polygon arcs: {e}")))
}

fn arc_list_3(value: Option<&Value>, index: usize) -> Result<Vec<Vec<Vec<i64>>>, GeoDataError> {
    let value = value.ok_or_else(|| invalid(index, "geometry missing arcs"))?;
    serde_json::from_value(value.clone()).map_err(|e| invalid(index, &format!("bad MultiPolygon arcs: {e}")))
}

fn invalid(index: usize, reason: &str) -> GeoDataError {
    GeoDataError::InvalidFeature {
        index,
        reason: reason.to_string(),
    }
}
