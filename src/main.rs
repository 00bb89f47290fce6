use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use agency_site::cache::CacheConfig;
use agency_site::config::{DatabaseConfig, EnvironmentConfig};
use agency_site::routes::create_router;
use agency_site::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🌐 Agency Site - Backend");
    info!("================================================");

    let config = EnvironmentConfig::from_env()?;

    // Configuración de cache: se evalúa una sola vez al arrancar
    let cache_config = CacheConfig::from_env();
    if cache_config.is_usable() {
        info!("✅ Cache Redis configurado");
    }

    // Base de datos (sólo para la tabla de roles)
    let pool = match &config.database_url {
        Some(url) => {
            let db_config = DatabaseConfig::new(url.clone());
            info!("🔗 Base de datos: {}", db_config.masked_url());
            match db_config.create_lazy_pool() {
                Ok(pool) => Some(pool),
                Err(e) => {
                    error!("❌ Error configurando la base de datos: {}", e);
                    return Err(anyhow::anyhow!("Error de base de datos: {}", e));
                }
            }
        }
        None => {
            warn!("⚠️ DATABASE_URL no configurada: el panel de administración no será accesible");
            None
        }
    };

    let addr: SocketAddr = config.server_addr().parse()?;
    let app_state = AppState::from_config(config, cache_config, pool);
    let app = create_router(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /api/health - Estado del servicio");
    info!("   POST /api/chat - Asistente de chat");
    info!("   GET  /unauthorized - Acceso denegado");
    info!("🔒 Endpoints de administración:");
    info!("   GET  /admin - Panel de administración");
    info!("   GET  /admin/login - Login");
    info!("   GET  /admin/api/cache - Navegador de cache");
    info!("   GET  /admin/api/cache/stats - Estadísticas de Redis");
    info!("   POST /admin/api/cache/clear - Limpiar por patrón");
    info!("   GET/DELETE /admin/api/cache/entry/:key - Ver/eliminar clave");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Servidor terminó con error: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
