use foundation::math::LonLat;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::GeoDataError;
use crate::geo_feature::{GeoDataset, GeoFeature, GeoGeometry, Ring, normalize_alpha3};

const CODE_KEYS: [&str; 4] = ["ISO_A3", "iso_a3", "ADM0_A3", "alpha3Code"];
const NAME_KEYS: [&str; 4] = ["name", "NAME", "ADMIN", "name_long"];

impl GeoDataset {
    pub fn from_geojson_str(payload: &str) -> Result<Self, GeoDataError> {
        let value: Value = serde_json::from_str(payload).map_err(GeoDataError::Json)?;
        let mut dataset = features_from_geojson_value(value)?;
        dataset.fingerprint = crate::fingerprint_bytes(payload.as_bytes());
        Ok(dataset)
    }
}

/// Reads a GeoJSON FeatureCollection.
///
/// Features whose geometry is missing, malformed, or not a (Multi)Polygon
/// are skipped and counted, not rejected.
pub fn features_from_geojson_value(value: Value) -> Result<GeoDataset, GeoDataError> {
    let obj = value.as_object().ok_or(GeoDataError::NotAFeatureCollection)?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or(GeoDataError::NotAFeatureCollection)?;
    if ty != "FeatureCollection" {
        return Err(GeoDataError::NotAFeatureCollection);
    }
    let features_val = obj
        .get("features")
        .and_then(|v| v.as_array())
        .ok_or(GeoDataError::NotAFeatureCollection)?;

    let mut dataset = GeoDataset::default();
    for (index, feat_val) in features_val.iter().enumerate() {
        let Some(feat_obj) = feat_val.as_object() else {
            debug!(index, "skipping feature that is not an object");
            dataset.skipped += 1;
            continue;
        };

        let geometry = match feat_obj.get("geometry") {
            Some(Value::Null) | None => Ok(None),
            Some(g) => parse_geometry(g).map_err(|reason| GeoDataError::InvalidFeature { index, reason }),
        };
        let geometry = match geometry {
            Ok(Some(geometry)) => geometry,
            Ok(None) => {
                debug!(index, "skipping feature without areal geometry");
                dataset.skipped += 1;
                continue;
            }
            Err(err) => {
                debug!(%err, "skipping malformed feature");
                dataset.skipped += 1;
                continue;
            }
        };

        let identity = FeatureIdentity::read(feat_obj.get("id"), feat_obj.get("properties").and_then(|v| v.as_object()));
        dataset.features.push(identity.into_feature(geometry));
    }

    Ok(dataset)
}

/// Identifier fields shared by GeoJSON features and TopoJSON geometries.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct FeatureIdentity {
    pub numeric_id: Option<i64>,
    pub iso_code: Option<String>,
    pub name: String,
}

impl FeatureIdentity {
    pub(crate) fn read(id: Option<&Value>, properties: Option<&Map<String, Value>>) -> Self {
        let mut out = FeatureIdentity::default();

        match id {
            Some(Value::Number(n)) => out.numeric_id = n.as_i64(),
            Some(Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(n) => out.numeric_id = Some(n),
                Err(_) => out.iso_code = normalize_alpha3(s),
            },
            _ => {}
        }

        if let Some(props) = properties {
            if let Some(code) = CODE_KEYS
                .iter()
                .filter_map(|k| props.get(*k).and_then(|v| v.as_str()))
                .find_map(normalize_alpha3)
            {
                out.iso_code = Some(code);
            }
            if let Some(name) = NAME_KEYS
                .iter()
                .filter_map(|k| props.get(*k).and_then(|v| v.as_str()))
                .find(|s| !s.trim().is_empty())
            {
                out.name = name.trim().to_string();
            }
        }

        out
    }

    pub(crate) fn into_feature(self, geometry: GeoGeometry) -> GeoFeature {
        GeoFeature {
            numeric_id: self.numeric_id,
            iso_code: self.iso_code,
            name: self.name,
            geometry,
        }
    }
}

fn parse_geometry(value: &Value) -> Result<Option<GeoGeometry>, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    match ty {
        "Polygon" | "MultiPolygon" => {}
        _ => return Ok(None),
    }

    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;
    match ty {
        "Polygon" => Ok(Some(GeoGeometry::Polygon(parse_polygon(coords)?))),
        _ => Ok(Some(GeoGeometry::MultiPolygon(parse_multi_polygon(coords)?))),
    }
}

fn parse_point(coords: &Value) -> Result<LonLat, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    Ok(LonLat::new(lon, lat))
}

fn parse_ring(coords: &Value) -> Result<Ring, String> {
    let arr = coords
        .as_array()
        .ok_or("ring must be an array".to_string())?;
    arr.iter().map(parse_point).collect()
}

fn parse_polygon(coords: &Value) -> Result<Vec<Ring>, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    rings.iter().map(parse_ring).collect()
}

fn parse_multi_polygon(coords: &Value) -> Result<Vec<Vec<Ring>>, String> {
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    polys.iter().map(parse_polygon).collect()
}
