use axum::{routing::get, Router};

use crate::controllers::page_controller::{health, unauthorized};
use crate::state::AppState;

/// Configura las rutas públicas
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/unauthorized", get(unauthorized))
}
