use base64::Engine as _;

use crate::store::CatalogError;

/// Which picture slot an image fills; picks the fallback asset.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Flag,
    Currency,
    Animal,
}

impl ImageKind {
    /// Placeholder shown when a stored image is missing or fails to load.
    pub fn fallback_uri(self) -> &'static str {
        match self {
            ImageKind::Flag => FALLBACK_FLAG,
            ImageKind::Currency => FALLBACK_CURRENCY,
            ImageKind::Animal => FALLBACK_ANIMAL,
        }
    }

    /// Parses the path form used by the upload route.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "flag" => Some(ImageKind::Flag),
            "currency" => Some(ImageKind::Currency),
            "animal" | "famousAnimal" => Some(ImageKind::Animal),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImageKind::Flag => "flag",
            ImageKind::Currency => "currency",
            ImageKind::Animal => "animal",
        }
    }
}

// Flat 100x100 SVG swatches.
const FALLBACK_FLAG: &str = "data:image/svg+xml;base64,PHN2ZyB4bWxucz0iaHR0cDovL3d3dy53My5vcmcvMjAwMC9zdmciIHdpZHRoPSIxMDAiIGhlaWdodD0iMTAwIj48cmVjdCB3aWR0aD0iMTAwIiBoZWlnaHQ9IjEwMCIgZmlsbD0iIzllOWU5ZSIvPjwvc3ZnPg==";
const FALLBACK_CURRENCY: &str = "data:image/svg+xml;base64,PHN2ZyB4bWxucz0iaHR0cDovL3d3dy53My5vcmcvMjAwMC9zdmciIHdpZHRoPSIxMDAiIGhlaWdodD0iMTAwIj48cmVjdCB3aWR0aD0iMTAwIiBoZWlnaHQ9IjEwMCIgZmlsbD0iI2M5YTIyNyIvPjwvc3ZnPg==";
const FALLBACK_ANIMAL: &str = "data:image/svg+xml;base64,PHN2ZyB4bWxucz0iaHR0cDovL3d3dy53My5vcmcvMjAwMC9zdmciIHdpZHRoPSIxMDAiIGhlaWdodD0iMTAwIj48cmVjdCB3aWR0aD0iMTAwIiBoZWlnaHQ9IjEwMCIgZmlsbD0iIzZkOGIzYyIvPjwvc3ZnPg==";

/// A stored image reference, classified by its textual form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// `data:image/...`; used as-is.
    DataUri(String),
    /// `http...`; used as-is.
    Remote(String),
    /// Base64 without a data URI prefix; assumed JPEG.
    BareBase64(String),
    /// `images/...` served by the metadata server under `/static/`.
    Relative(String),
    Unknown,
}

impl ImageRef {
    /// Checks are ordered: data URI, http, bare base64, relative path.
    pub fn classify(raw: &str) -> Self {
        if raw.is_empty() {
            return ImageRef::Unknown;
        }
        if raw.starts_with("data:image") {
            return ImageRef::DataUri(raw.to_string());
        }
        if raw.starts_with("http") {
            return ImageRef::Remote(raw.to_string());
        }
        if raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'=')
        {
            return ImageRef::BareBase64(raw.to_string());
        }
        if raw.starts_with("images/") {
            return ImageRef::Relative(raw.to_string());
        }
        ImageRef::Unknown
    }

    /// Browser-usable source, or `None` for `Unknown`.
    pub fn to_src(&self, api_base: &str) -> Option<String> {
        match self {
            ImageRef::DataUri(s) | ImageRef::Remote(s) => Some(s.clone()),
            ImageRef::BareBase64(b64) => Some(format!("data:image/jpeg;base64,{b64}")),
            ImageRef::Relative(path) => Some(format!("{}/static/{path}", api_base.trim_end_matches('/'))),
            ImageRef::Unknown => None,
        }
    }

    /// Decodes inline payloads. Remote and relative images must be fetched.
    pub fn inline_bytes(&self) -> Option<Result<Vec<u8>, CatalogError>> {
        let b64 = match self {
            ImageRef::DataUri(s) => s.split_once(";base64,").map(|(_, data)| data)?,
            ImageRef::BareBase64(s) => s.as_str(),
            _ => return None,
        };
        Some(decode_base64(b64))
    }
}

/// Source for an optional stored reference, falling back per kind.
pub fn image_src(raw: Option<&str>, kind: ImageKind, api_base: &str) -> String {
    raw.map(ImageRef::classify)
        .and_then(|r| r.to_src(api_base))
        .unwrap_or_else(|| kind.fallback_uri().to_string())
}

/// Encodes uploaded bytes the way records store them: bare base64.
pub fn encode_upload(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn decode_base64(b64: &str) -> Result<Vec<u8>, CatalogError> {
    base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|e| CatalogError::Corrupt(e.to_string()))
}

/// Content id for an image payload.
pub fn image_fingerprint(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Outcome of loading an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLoad {
    Loaded(Vec<u8>),
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayImage {
    Loaded { bytes: Vec<u8>, fingerprint: String },
    Fallback { src: &'static str },
}

impl DisplayImage {
    pub fn from_load(load: ImageLoad, kind: ImageKind) -> Self {
        match load {
            ImageLoad::Loaded(bytes) if !bytes.is_empty() => {
                let fingerprint = image_fingerprint(&bytes);
                DisplayImage::Loaded { bytes, fingerprint }
            }
            _ => DisplayImage::Fallback {
                src: kind.fallback_uri(),
            },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, DisplayImage::Fallback { .. })
    }
}
