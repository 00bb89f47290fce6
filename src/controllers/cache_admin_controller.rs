//! Navegador de cache y panel de estadísticas de Redis
//!
//! Sólo accesible para administradores. Todas las operaciones pasan por el
//! cliente degradable, así que con el cache caído el panel muestra un cache
//! vacío en lugar de un error.

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde_json::{json, Value};
use tracing::info;
use validator::Validate;

use crate::dto::cache_dto::{ClearPatternRequest, DeletedResponse, EntryResponse, KeysQuery, KeysResponse};
use crate::middleware::admin_gate::RequireAdmin;
use crate::models::cache::CacheEntryView;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult};

/// Lista las claves que coinciden con un patrón (por defecto `*`)
pub async fn list_keys(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<KeysQuery>,
) -> Json<Value> {
    let pattern = query.pattern_or_all().to_string();
    let mut keys = state.cache.keys(&pattern).await;
    keys.sort();

    Json(json!({
        "success": true,
        "data": KeysResponse { total: keys.len(), pattern, keys },
    }))
}

/// Muestra el valor de una clave
pub async fn get_entry(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<Value>> {
    let value = state
        .cache
        .get::<Value>(&key)
        .await
        .ok_or_else(|| not_found_error("cache key", &key))?;

    Ok(Json(json!({
        "success": true,
        "data": EntryResponse { entry: CacheEntryView { key, value: Some(value) } },
    })))
}

/// Elimina una clave
pub async fn delete_entry(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<Value> {
    info!("🗑️ {} elimina la clave {}", admin.user_id, key);
    let deleted = state.cache.invalidate(&key).await;

    Json(json!({
        "success": true,
        "data": DeletedResponse { deleted },
        "message": if deleted > 0 { "Clave eliminada" } else { "La clave no existía" },
    }))
}

/// Elimina todas las claves que coinciden con un patrón
pub async fn clear_pattern(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(payload): Json<ClearPatternRequest>,
) -> AppResult<Json<Value>> {
    payload.validate()?;

    info!("🧹 {} limpia el patrón {}", admin.user_id, payload.pattern);
    let deleted = state.cache.clear_pattern(&payload.pattern).await;

    Ok(Json(json!({
        "success": true,
        "data": DeletedResponse { deleted },
    })))
}

/// Estadísticas del servicio Redis
pub async fn get_stats(RequireAdmin(_admin): RequireAdmin, State(state): State<AppState>) -> Json<Value> {
    let stats = state.cache.stats().await;

    Json(json!({
        "success": true,
        "data": stats,
    }))
}
