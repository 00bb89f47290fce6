//! Middleware de protección de rutas de administración
//!
//! Toda ruta bajo el prefijo protegido (`/admin`) exige una sesión cuyo
//! usuario tenga rol `admin`. Sin sesión se redirige al login conservando el
//! destino original; con sesión pero sin rol admin se redirige a
//! `/unauthorized`. El resto de rutas pasan sin ninguna comprobación.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, info, warn};

use crate::models::session::{AdminSession, Session};
use crate::services::authorization_service::AuthorizationService;
use crate::services::session_service::{extract_access_token, SessionVerifier};
use crate::utils::errors::AppError;

pub const ADMIN_PREFIX: &str = "/admin";
pub const LOGIN_PATH: &str = "/admin/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";
pub const REDIRECTED_FROM_PARAM: &str = "redirectedFrom";

/// Resultado de evaluar una request
#[derive(Debug, Clone)]
pub enum GateDecision {
    /// Ruta fuera del prefijo o pública: no se comprueba nada
    Bypass,
    Allow(Session),
    RedirectToLogin(String),
    RedirectUnauthorized,
}

/// Estado del middleware
#[derive(Clone)]
pub struct AdminGate {
    prefix: String,
    public_paths: Vec<String>,
    login_path: String,
    unauthorized_path: String,
    sessions: Arc<dyn SessionVerifier>,
    authorization: AuthorizationService,
}

impl AdminGate {
    pub fn new(sessions: Arc<dyn SessionVerifier>, authorization: AuthorizationService) -> Self {
        Self {
            prefix: ADMIN_PREFIX.to_string(),
            public_paths: vec![LOGIN_PATH.to_string()],
            login_path: LOGIN_PATH.to_string(),
            unauthorized_path: UNAUTHORIZED_PATH.to_string(),
            sessions,
            authorization,
        }
    }

    pub fn authorization(&self) -> &AuthorizationService {
        &self.authorization
    }

    /// ¿La ruta está bajo el prefijo protegido? (`/admin` o `/admin/...`)
    pub fn is_protected(&self, path: &str) -> bool {
        let under_prefix = path == self.prefix
            || path
                .strip_prefix(self.prefix.as_str())
                .map_or(false, |rest| rest.starts_with('/'));

        under_prefix && !self.is_public(path)
    }

    fn is_public(&self, path: &str) -> bool {
        let path = path.trim_end_matches('/');
        self.public_paths.iter().any(|public| public == path)
    }

    /// URL del login con el destino original
    pub fn login_redirect(&self, original_path: &str) -> String {
        format!(
            "{}?{}={}",
            self.login_path,
            REDIRECTED_FROM_PARAM,
            encode_path(original_path)
        )
    }

    /// Sesión de la request, si el token es válido
    pub async fn session_from_headers(&self, headers: &HeaderMap) -> Option<Session> {
        let token = extract_access_token(headers)?;
        match self.sessions.verify(&token).await {
            Ok(session) => session,
            Err(e) => {
                warn!("⚠️ Error verificando sesión: {}", e);
                None
            }
        }
    }

    /// Evaluar una request contra la política de acceso
    pub async fn decide(&self, path: &str, headers: &HeaderMap) -> GateDecision {
        if !self.is_protected(path) {
            return GateDecision::Bypass;
        }

        let Some(session) = self.session_from_headers(headers).await else {
            debug!("🔒 Sin sesión para {}, redirigiendo al login", path);
            return GateDecision::RedirectToLogin(self.login_redirect(path));
        };

        if self.authorization.is_admin(&session).await {
            GateDecision::Allow(session)
        } else {
            info!("🚫 Usuario {} sin permisos para {}", session.user_id, path);
            GateDecision::RedirectUnauthorized
        }
    }
}

/// Codificar cada segmento de la ruta manteniendo las `/`
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Middleware de protección de `/admin`
pub async fn admin_gate_middleware(
    State(gate): State<AdminGate>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    let decision = gate.decide(&path, request.headers()).await;

    match decision {
        GateDecision::Bypass => next.run(request).await,
        GateDecision::Allow(session) => {
            request.extensions_mut().insert(AdminSession(session));
            next.run(request).await
        }
        GateDecision::RedirectToLogin(location) => Redirect::temporary(&location).into_response(),
        GateDecision::RedirectUnauthorized => Redirect::temporary(&gate.unauthorized_path).into_response(),
    }
}

/// Guard para handlers de administración.
///
/// Reutiliza la sesión verificada por el middleware y, si la ruta no pasó por
/// él, hace la misma comprobación con `is_admin`.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    AdminGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(AdminSession(session)) = parts.extensions.get::<AdminSession>() {
            return Ok(RequireAdmin(session.clone()));
        }

        let gate = AdminGate::from_ref(state);
        let session = gate
            .session_from_headers(&parts.headers)
            .await
            .ok_or_else(|| AppError::Unauthorized("Sesión requerida".to_string()))?;

        if gate.authorization().is_admin(&session).await {
            Ok(RequireAdmin(session))
        } else {
            Err(AppError::Forbidden("Se requieren permisos de administrador".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::authorization_service::NoRoleRepository;
    use crate::services::session_service::JwtSessionVerifier;

    fn gate() -> AdminGate {
        AdminGate::new(
            Arc::new(JwtSessionVerifier::new(None)),
            AuthorizationService::new(Arc::new(NoRoleRepository)),
        )
    }

    #[test]
    fn test_is_protected() {
        let gate = gate();
        assert!(gate.is_protected("/admin"));
        assert!(gate.is_protected("/admin/"));
        assert!(gate.is_protected("/admin/cache"));
        assert!(!gate.is_protected("/administrator"));
        assert!(!gate.is_protected("/api/chat"));
        assert!(!gate.is_protected("/"));
        assert!(!gate.is_protected("/admin/login"));
        assert!(!gate.is_protected("/admin/login/"));
    }

    #[test]
    fn test_login_redirect_keeps_slashes() {
        let gate = gate();
        assert_eq!(gate.login_redirect("/admin/x"), "/admin/login?redirectedFrom=/admin/x");
        assert_eq!(
            gate.login_redirect("/admin/media/mi foto"),
            "/admin/login?redirectedFrom=/admin/media/mi%20foto"
        );
    }

    #[tokio::test]
    async fn test_decide_without_session() {
        let gate = gate();
        let headers = HeaderMap::new();

        assert!(matches!(gate.decide("/servicios", &headers).await, GateDecision::Bypass));
        match gate.decide("/admin/x", &headers).await {
            GateDecision::RedirectToLogin(location) => {
                assert_eq!(location, "/admin/login?redirectedFrom=/admin/x")
            }
            other => panic!("decisión inesperada: {:?}", other),
        }
    }
}
