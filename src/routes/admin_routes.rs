use axum::{
    routing::{get, post},
    Router,
};

use crate::controllers::{cache_admin_controller, page_controller};
use crate::state::AppState;

/// Configura las rutas del panel de administración (protegidas por el middleware)
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(page_controller::admin_dashboard))
        .route("/admin/login", get(page_controller::admin_login))
        .route("/admin/api/cache", get(cache_admin_controller::list_keys))
        .route("/admin/api/cache/stats", get(cache_admin_controller::get_stats))
        .route("/admin/api/cache/clear", post(cache_admin_controller::clear_pattern))
        .route(
            "/admin/api/cache/entry/:key",
            get(cache_admin_controller::get_entry).delete(cache_admin_controller::delete_entry),
        )
}
