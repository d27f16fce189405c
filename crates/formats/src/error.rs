#[derive(Debug)]
pub enum GeoDataError {
    Io(std::io::Error),
    Json(serde_json::Error),
    NotAFeatureCollection,
    NotATopology,
    MissingObject { name: String },
    InvalidFeature { index: usize, reason: String },
    InvalidArc { index: i64 },
    InvalidAlias { alias: String, reason: String },
}

impl std::fmt::Display for GeoDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoDataError::Io(err) => write!(f, "I/O error: {err}"),
            GeoDataError::Json(err) => write!(f, "JSON parse error: {err}"),
            GeoDataError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            GeoDataError::NotATopology => write!(f, "expected TopoJSON Topology"),
            GeoDataError::MissingObject { name } => {
                write!(f, "topology has no object named {name:?}")
            }
            GeoDataError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
            GeoDataError::InvalidArc { index } => write!(f, "arc index {index} out of range"),
            GeoDataError::InvalidAlias { alias, reason } => {
                write!(f, "invalid alias {alias:?}: {reason}")
            }
        }
    }
}

impl std::error::Error for GeoDataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeoDataError::Io(err) => Some(err),
            GeoDataError::Json(err) => Some(err),
            _ => None,
        }
    }
}
