//! Rutas de la aplicación
//!
//! Cada área define su router y aquí se montan todos juntos, con el
//! middleware de protección de `/admin` aplicado a la aplicación entera.

pub mod admin_routes;
pub mod chat_routes;
pub mod page_routes;

use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::controllers::page_controller;
use crate::middleware::{admin_gate::admin_gate_middleware, cors::cors_middleware};
use crate::state::AppState;

/// Crear el router principal con todo el middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(page_routes::page_routes())
        .merge(chat_routes::chat_routes())
        .merge(admin_routes::admin_routes())
        .fallback(page_controller::not_found)
        .layer(middleware::from_fn_with_state(state.gate.clone(), admin_gate_middleware))
        .layer(cors_middleware(&state.config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
