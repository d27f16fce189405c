use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::Router;
use catalog::{CatalogError, InMemoryCatalogStore};
use parking_lot::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod countries;

#[derive(Clone)]
pub struct AppState {
    catalog: Arc<RwLock<InMemoryCatalogStore>>,
}

impl AppState {
    pub fn new(store: InMemoryCatalogStore) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(store)),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let addr: SocketAddr = env::var("COUNTRIES_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()
        .expect("invalid COUNTRIES_ADDR");
    let static_root = env::var("COUNTRIES_STATIC_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("public"));

    let store = match env::var("COUNTRIES_SEED") {
        Ok(path) => match load_seed(&path).await {
            Ok(store) => {
                info!("loaded {} country records from {path}", store.len());
                store
            }
            Err(err) => {
                warn!("ignoring seed file {path}: {err}");
                InMemoryCatalogStore::new()
            }
        },
        Err(_) => InMemoryCatalogStore::new(),
    };

    let app = router(AppState::new(store), static_root);

    info!("countries server listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await.unwrap(), app)
        .await
        .unwrap();
}

fn router(state: AppState, static_root: PathBuf) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::PUT, Method::DELETE, Method::OPTIONS]);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/countries", get(countries::list_countries))
        .route(
            "/countries/:code",
            get(countries::get_country)
                .put(countries::put_country)
                .delete(countries::delete_country),
        )
        .route("/countries/:code/basic", get(countries::get_country_basic))
        .route("/countries/:code/images", get(countries::get_country_images))
        .route("/countries/:code/images/:kind", put(countries::put_country_image))
        .nest_service("/static", ServeDir::new(static_root))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn load_seed(path: &str) -> Result<InMemoryCatalogStore, CatalogError> {
    let payload = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CatalogError::Io(e.to_string()))?;
    InMemoryCatalogStore::from_json_records(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn healthz_is_ok() {
        assert_eq!(healthz().await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_seed_is_an_io_error() {
        let err = load_seed("/nonexistent/countries.json")
            .await
            .expect_err("missing file");
        assert!(matches!(err, CatalogError::Io(_)));
    }

    #[test]
    fn router_builds() {
        let _ = router(AppState::new(InMemoryCatalogStore::new()), PathBuf::from("public"));
    }
}
