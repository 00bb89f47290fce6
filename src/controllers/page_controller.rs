//! Páginas del sitio expuestas como JSON
//!
//! Login, página de acceso denegado, panel de administración y health check.

use axum::{
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::middleware::admin_gate::RequireAdmin;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(rename = "redirectedFrom")]
    pub redirected_from: Option<String>,
}

/// Página de login (pública; el login lo gestiona el proveedor de auth)
pub async fn admin_login(Query(query): Query<LoginQuery>) -> Json<Value> {
    Json(json!({
        "page": "admin-login",
        "message": "Inicia sesión para acceder al panel de administración",
        "redirectedFrom": query.redirected_from.unwrap_or_else(|| "/admin".to_string()),
    }))
}

/// Página de acceso denegado
pub async fn unauthorized() -> impl IntoResponse {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "page": "unauthorized",
            "message": "No tienes permisos para acceder a esta sección",
        })),
    )
}

/// Resumen del panel de administración
pub async fn admin_dashboard(RequireAdmin(admin): RequireAdmin, State(state): State<AppState>) -> Json<Value> {
    let stats = state.cache.stats().await;

    Json(json!({
        "page": "admin-dashboard",
        "user": {
            "id": admin.user_id,
            "email": admin.email,
        },
        "cache": {
            "usable": stats.usable,
            "ping": stats.ping,
            "total_keys": stats.total_keys,
        },
    }))
}

/// Respuesta para rutas inexistentes
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "page": "not-found",
            "path": uri.path(),
        })),
    )
}

/// Health check del servicio
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "environment": state.config.environment,
        "cache": {
            "usable": state.cache.is_usable(),
            "ping": state.cache.ping().await,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
