pub mod aliases;
pub mod error;
pub mod geo_feature;
pub mod geojson;
pub mod topojson;

pub use aliases::*;
pub use error::*;
pub use geo_feature::*;
pub use geojson::*;
pub use topojson::*;

use std::path::Path;

/// Loads a dataset from GeoJSON or TopoJSON, picked by the root `type`.
///
/// For TopoJSON, `object` names the geometry collection to read (defaults to
/// `countries`).
pub fn load_dataset_str(payload: &str, object: Option<&str>) -> Result<GeoDataset, GeoDataError> {
    let value: serde_json::Value = serde_json::from_str(payload).map_err(GeoDataError::Json)?;
    let fingerprint = fingerprint_bytes(payload.as_bytes());
    let ty = value.get("type").and_then(|v| v.as_str()).unwrap_or("");
    let mut dataset = match ty {
        "Topology" => topojson::features_from_topology_value(value, object.unwrap_or(DEFAULT_TOPOLOGY_OBJECT))?,
        _ => geojson::features_from_geojson_value(value)?,
    };
    dataset.fingerprint = fingerprint;
    Ok(dataset)
}

pub fn load_dataset_path(path: impl AsRef<Path>, object: Option<&str>) -> Result<GeoDataset, GeoDataError> {
    let payload = std::fs::read_to_string(path.as_ref()).map_err(GeoDataError::Io)?;
    load_dataset_str(&payload, object)
}

/// Hex BLAKE3 digest used to identify a dataset or payload.
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}
