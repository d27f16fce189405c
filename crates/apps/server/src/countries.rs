use axum::body::Bytes;
use axum::extract::{Path as AxumPath, State};
use axum::http::StatusCode;
use axum::Json;
use catalog::{
    encode_upload, image_fingerprint, BasicInfo, CatalogError, CatalogStore, CountryPatch, CountryRecord, ImageKind,
    ImageSet,
};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

fn not_found(code: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Country not found", "code": code })),
    )
}

fn store_error(err: CatalogError) -> (StatusCode, Json<Value>) {
    match err {
        CatalogError::NotFound => api_error(StatusCode::NOT_FOUND, "Country not found"),
        CatalogError::Invalid(msg) => api_error(StatusCode::BAD_REQUEST, msg),
        other => {
            warn!("catalog error: {other}");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

/// Path codes are matched case-insensitively against stored alpha-3 codes.
fn normalize_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

fn find(state: &AppState, code: &str) -> Result<CountryRecord, (StatusCode, Json<Value>)> {
    state
        .catalog
        .read()
        .get(code)
        .map_err(store_error)?
        .ok_or_else(|| not_found(code))
}

pub async fn list_countries(State(state): State<AppState>) -> ApiResult<Vec<BasicInfo>> {
    let records = state.catalog.read().list().map_err(store_error)?;
    Ok(Json(records.iter().map(CountryRecord::basic).collect()))
}

pub async fn get_country(
    State(state): State<AppState>,
    AxumPath(code): AxumPath<String>,
) -> ApiResult<CountryRecord> {
    let code = normalize_code(&code);
    Ok(Json(find(&state, &code)?))
}

pub async fn get_country_basic(
    State(state): State<AppState>,
    AxumPath(code): AxumPath<String>,
) -> ApiResult<BasicInfo> {
    let code = normalize_code(&code);
    Ok(Json(find(&state, &code)?.basic()))
}

pub async fn get_country_images(
    State(state): State<AppState>,
    AxumPath(code): AxumPath<String>,
) -> ApiResult<ImageSet> {
    let code = normalize_code(&code);
    Ok(Json(find(&state, &code)?.images()))
}

/// Creates or merges a country record. Creating requires `name`.
pub async fn put_country(
    State(state): State<AppState>,
    AxumPath(code): AxumPath<String>,
    Json(patch): Json<CountryPatch>,
) -> ApiResult<CountryRecord> {
    let code = normalize_code(&code);
    let saved = state
        .catalog
        .write()
        .upsert_patch(&code, patch)
        .map_err(store_error)?;
    info!(code = %saved.alpha3_code, "country record saved");
    Ok(Json(saved))
}

/// Stores an uploaded picture on an existing record as bare base64.
pub async fn put_country_image(
    State(state): State<AppState>,
    AxumPath((code, kind)): AxumPath<(String, String)>,
    body: Bytes,
) -> ApiResult<Value> {
    let code = normalize_code(&code);
    let Some(kind) = ImageKind::parse(&kind) else {
        return Err(api_error(StatusCode::BAD_REQUEST, format!("unknown image kind {kind:?}")));
    };
    if body.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "image body is empty"));
    }

    {
        let mut store = state.catalog.write();
        let mut record = store.get(&code).map_err(store_error)?.ok_or_else(|| not_found(&code))?;
        record.set_image(kind, encode_upload(&body));
        store.upsert(record).map_err(store_error)?;
    }

    let fingerprint = image_fingerprint(&body);
    info!(%code, kind = kind.as_str(), bytes = body.len(), %fingerprint, "country image stored");
    Ok(Json(json!({
        "code": code,
        "kind": kind.as_str(),
        "bytes": body.len(),
        "fingerprint": fingerprint,
    })))
}

pub async fn delete_country(
    State(state): State<AppState>,
    AxumPath(code): AxumPath<String>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    let code = normalize_code(&code);
    let removed = state.catalog.write().delete(&code).map_err(store_error)?;
    if !removed {
        return Err(not_found(&code));
    }
    info!(%code, "country record deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{Illustration, InMemoryCatalogStore};
    use pretty_assertions::assert_eq;

    fn state() -> AppState {
        let mut store = InMemoryCatalogStore::new();
        let mut chn = CountryRecord::new("CHN", "China");
        chn.capital = Some("Beijing".into());
        chn.flag = Some(Illustration {
            image: Some("images/chn.png".into()),
            ..Illustration::default()
        });
        store.upsert(chn).expect("seed");
        AppState::new(store)
    }

    #[tokio::test]
    async fn get_returns_record_or_404() {
        let s = state();
        let Json(record) = get_country(State(s.clone()), AxumPath("chn".to_string()))
            .await
            .expect("found");
        assert_eq!(record.name, "China");

        let (status, Json(body)) = get_country(State(s), AxumPath("XXX".to_string()))
            .await
            .expect_err("missing");
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Country not found", "code": "XXX" }));
    }

    #[tokio::test]
    async fn projections_split_text_and_images() {
        let s = state();
        let Json(basic) = get_country_basic(State(s.clone()), AxumPath("CHN".to_string()))
            .await
            .expect("basic");
        assert_eq!(basic.capital.as_deref(), Some("Beijing"));

        let Json(images) = get_country_images(State(s), AxumPath("CHN".to_string()))
            .await
            .expect("images");
        let flag = images.flag.and_then(|f| f.image);
        assert_eq!(flag.as_deref(), Some("images/chn.png"));
        assert_eq!(images.currency, None);
    }

    #[tokio::test]
    async fn put_creates_then_merges() {
        let s = state();
        let rejected = put_country(
            State(s.clone()),
            AxumPath("FRA".to_string()),
            Json(CountryPatch::default()),
        )
        .await
        .expect_err("name required");
        assert_eq!(rejected.0, StatusCode::BAD_REQUEST);

        let patch: CountryPatch = serde_json::from_value(json!({ "name": "France" })).expect("patch");
        put_country(State(s.clone()), AxumPath("fra".to_string()), Json(patch))
            .await
            .expect("create");

        let patch: CountryPatch = serde_json::from_value(json!({ "capital": "Paris" })).expect("patch");
        let Json(merged) = put_country(State(s.clone()), AxumPath("FRA".to_string()), Json(patch))
            .await
            .expect("merge");
        assert_eq!(merged.name, "France");
        assert_eq!(merged.capital.as_deref(), Some("Paris"));

        let Json(all) = list_countries(State(s)).await.expect("list");
        let codes: Vec<&str> = all.iter().map(|b| b.alpha3_code.as_str()).collect();
        assert_eq!(codes, vec!["CHN", "FRA"]);
    }

    #[tokio::test]
    async fn upload_stores_base64_on_existing_record() {
        let s = state();
        let Json(receipt) = put_country_image(
            State(s.clone()),
            AxumPath(("chn".to_string(), "currency".to_string())),
            Bytes::from_static(b"ABC"),
        )
        .await
        .expect("upload");
        assert_eq!(
            receipt,
            json!({ "code": "CHN", "kind": "currency", "bytes": 3, "fingerprint": image_fingerprint(b"ABC") })
        );

        let Json(images) = get_country_images(State(s.clone()), AxumPath("CHN".to_string()))
            .await
            .expect("images");
        assert_eq!(images.currency.and_then(|c| c.image).as_deref(), Some("QUJD"));

        let (status, _) = put_country_image(
            State(s.clone()),
            AxumPath(("XXX".to_string(), "flag".to_string())),
            Bytes::from_static(b"ABC"),
        )
        .await
        .expect_err("missing record");
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = put_country_image(
            State(s),
            AxumPath(("CHN".to_string(), "anthem".to_string())),
            Bytes::from_static(b"ABC"),
        )
        .await
        .expect_err("unknown kind");
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_removes_once() {
        let s = state();
        let status = delete_country(State(s.clone()), AxumPath("chn".to_string()))
            .await
            .expect("delete");
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = delete_country(State(s.clone()), AxumPath("CHN".to_string()))
            .await
            .expect_err("already gone");
        assert_eq!(status, StatusCode::NOT_FOUND);
        let Json(all) = list_countries(State(s)).await.expect("list");
        assert!(all.is_empty());
    }
}
