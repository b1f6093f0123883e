//! HTTP API: standards listing, inspection history, and grading on create.
//!
//! | Method   | Path            | Handler                      |
//! |----------|-----------------|------------------------------|
//! | `GET`    | `/standard`     | catalog entries              |
//! | `GET`    | `/history`      | paginated, filterable list   |
//! | `POST`   | `/history`      | grade and store a new record |
//! | `DELETE` | `/history`      | delete by `inspectionID` list |
//! | `GET`    | `/history/{id}` | one stored record            |

mod error;
mod routes;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use ricegrade_core::Catalog;
use ricegrade_store::InspectionStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::ApiError;

/// Largest accepted request body (raw grain uploads can be large).
pub const BODY_LIMIT: usize = 5 * 1024 * 1024;

/// Shared state: the read-only catalog and the inspection store.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub store: Arc<Mutex<InspectionStore>>,
}

impl AppState {
    pub fn new(catalog: Catalog, store: InspectionStore) -> Self {
        Self {
            catalog: Arc::new(catalog),
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Run `f` against the store on the blocking pool. DuckDB calls are
    /// synchronous and must not hold a runtime worker thread.
    async fn with_store<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&InspectionStore) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let guard = store
                .lock()
                .map_err(|e| ApiError::Internal(format!("store mutex poisoned: {e}")))?;
            f(&guard)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("store task failed: {e}")))?
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/standard", get(routes::list_standards))
        .route(
            "/history",
            get(routes::list_history)
                .post(routes::create_history)
                .delete(routes::delete_history),
        )
        .route("/history/{id}", get(routes::get_history))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, standards = state.catalog.len(), "ricegrade server listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
}
