use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roles del sistema (tabla `user_roles`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Editor,
    Viewer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Editor => "editor",
            UserRole::Viewer => "viewer",
        }
    }

    /// Sólo reconoce los valores exactos; cualquier otro valor no es un rol
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(UserRole::Admin),
            "editor" => Some(UserRole::Editor),
            "viewer" => Some(UserRole::Viewer),
            _ => None,
        }
    }
}

/// Sesión validada del proveedor de autenticación
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Claims del access token emitido por el proveedor de auth
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // user_id
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>, // rol del proveedor ("authenticated"), no el de la app
    pub exp: i64,
    #[serde(default)]
    pub aud: Option<String>,
}

/// Sesión de un administrador ya verificada por el middleware
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(UserRole::parse("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("Admin"), None);
        assert_eq!(UserRole::parse("editor").map(|r| r.as_str()), Some("editor"));
    }
}
