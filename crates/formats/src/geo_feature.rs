use foundation::math::LonLat;

/// Ordered boundary vertices; treated as closed whether or not the first
/// point repeats at the end.
pub type Ring = Vec<LonLat>;

#[derive(Debug, Clone, PartialEq)]
pub enum GeoGeometry {
    /// Outer ring followed by any holes.
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl GeoGeometry {
    /// Every polygon as a slice of rings, in input order.
    pub fn polygons(&self) -> Vec<&[Ring]> {
        match self {
            GeoGeometry::Polygon(rings) => vec![rings.as_slice()],
            GeoGeometry::MultiPolygon(polys) => polys.iter().map(|p| p.as_slice()).collect(),
        }
    }

    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        let polys: &[Vec<Ring>] = match self {
            GeoGeometry::Polygon(rings) => std::slice::from_ref(rings),
            GeoGeometry::MultiPolygon(polys) => polys.as_slice(),
        };
        polys.iter().flatten()
    }

    pub fn ring_count(&self) -> usize {
        self.rings().count()
    }

    pub fn vertex_count(&self) -> usize {
        self.rings().map(Vec::len).sum()
    }
}

/// One country shape as read from a geography dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFeature {
    pub numeric_id: Option<i64>,
    /// Upper-case ISO 3166-1 alpha-3 code, when the source carried a valid one.
    pub iso_code: Option<String>,
    /// Display name; empty when the source had none.
    pub name: String,
    pub geometry: GeoGeometry,
}

impl GeoFeature {
    pub fn new(name: impl Into<String>, geometry: GeoGeometry) -> Self {
        Self {
            numeric_id: None,
            iso_code: None,
            name: name.into(),
            geometry,
        }
    }

    pub fn with_numeric_id(mut self, id: i64) -> Self {
        self.numeric_id = Some(id);
        self
    }

    pub fn with_iso_code(mut self, code: &str) -> Self {
        self.iso_code = normalize_alpha3(code);
        self
    }
}

/// Features loaded from one payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoDataset {
    pub features: Vec<GeoFeature>,
    /// Features dropped because their geometry was not areal.
    pub skipped: usize,
    /// BLAKE3 hex digest of the source payload; empty when built in memory.
    pub fingerprint: String,
}

impl GeoDataset {
    pub fn from_features(features: Vec<GeoFeature>) -> Self {
        Self {
            features,
            skipped: 0,
            fingerprint: String::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Returns the upper-cased code if `raw` is exactly three ASCII letters.
///
/// Placeholder values such as Natural Earth's `-99` yield `None`.
pub fn normalize_alpha3(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.len() == 3 && s.bytes().all(|b| b.is_ascii_alphabetic()) {
        Some(s.to_ascii_uppercase())
    } else {
        None
    }
}
