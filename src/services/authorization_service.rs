//! Servicio de autorización
//!
//! Un único predicado `is_admin` decide el acceso a las rutas privilegiadas,
//! tanto en el middleware como en los guards de cada página.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::session::{Session, UserRole};
use crate::utils::errors::{AppError, AppResult};

/// Consulta del rol de un usuario
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_role(&self, user_id: Uuid) -> AppResult<Option<String>>;
}

/// Roles almacenados en PostgreSQL (`user_roles`)
#[derive(Clone)]
pub struct PgRoleRepository {
    pool: PgPool,
}

impl PgRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PgRoleRepository {
    async fn find_role(&self, user_id: Uuid) -> AppResult<Option<String>> {
        let role: Option<(String,)> = sqlx::query_as("SELECT role FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(role.map(|(role,)| role))
    }
}

/// Repositorio usado cuando no hay base de datos configurada
pub struct NoRoleRepository;

#[async_trait]
impl RoleRepository for NoRoleRepository {
    async fn find_role(&self, _user_id: Uuid) -> AppResult<Option<String>> {
        Err(AppError::ServiceUnavailable("DATABASE_URL no configurada".to_string()))
    }
}

#[derive(Clone)]
pub struct AuthorizationService {
    roles: Arc<dyn RoleRepository>,
}

impl AuthorizationService {
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self {
        Self { roles }
    }

    /// Rol de la aplicación para la sesión, si existe y es reconocido
    pub async fn role_for(&self, session: &Session) -> AppResult<Option<UserRole>> {
        let role = self.roles.find_role(session.user_id).await?;
        Ok(role.as_deref().and_then(UserRole::parse))
    }

    /// Sólo `admin` da acceso; cualquier fallo de la consulta cuenta como no-admin
    pub async fn is_admin(&self, session: &Session) -> bool {
        match self.role_for(session).await {
            Ok(Some(UserRole::Admin)) => true,
            Ok(role) => {
                debug!("🚫 Usuario {} sin rol admin ({:?})", session.user_id, role);
                false
            }
            Err(e) => {
                warn!("⚠️ Error consultando rol de {}: {}", session.user_id, e);
                false
            }
        }
    }
}
