//! Verificación de sesiones
//!
//! El proveedor de autenticación emite access tokens HS256 firmados con el
//! secreto del proyecto. Aquí sólo se valida el token y se extrae el usuario;
//! el login y la renovación de sesiones son responsabilidad del proveedor.

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use chrono::{TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::session::{Session, SessionClaims};
use crate::utils::errors::AppResult;

/// Cookie en la que el proveedor guarda el access token
pub const SESSION_COOKIE: &str = "sb-access-token";
pub const TOKEN_AUDIENCE: &str = "authenticated";

/// Resolver un token de sesión a una sesión válida
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// `Ok(None)` si el token no es válido o ha expirado
    async fn verify(&self, token: &str) -> AppResult<Option<Session>>;
}

/// Verificador local de JWT del proveedor de auth
#[derive(Clone)]
pub struct JwtSessionVerifier {
    decoding_key: Option<DecodingKey>,
    validation: Validation,
}

impl JwtSessionVerifier {
    pub fn new(secret: Option<&str>) -> Self {
        if secret.is_none() {
            warn!("⚠️ SUPABASE_JWT_SECRET no configurado: ninguna sesión será válida");
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[TOKEN_AUDIENCE]);

        Self {
            decoding_key: secret.map(|s| DecodingKey::from_secret(s.as_bytes())),
            validation,
        }
    }

    fn decode_session(&self, token: &str) -> Option<Session> {
        let key = self.decoding_key.as_ref()?;

        let claims = match decode::<SessionClaims>(token, key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!("🔒 Token de sesión rechazado: {}", e);
                return None;
            }
        };

        let user_id = match Uuid::parse_str(&claims.sub) {
            Ok(id) => id,
            Err(_) => {
                debug!("🔒 Token con sub inválido: {}", claims.sub);
                return None;
            }
        };

        let expires_at = Utc.timestamp_opt(claims.exp, 0).single()?;

        Some(Session {
            user_id,
            email: claims.email,
            expires_at,
        })
    }
}

#[async_trait]
impl SessionVerifier for JwtSessionVerifier {
    async fn verify(&self, token: &str) -> AppResult<Option<Session>> {
        Ok(self.decode_session(token))
    }
}

/// Extraer el access token de la cookie de sesión o del header Authorization
pub fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|auth| auth.to_str().ok())
            .and_then(|auth| auth.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-jwt-secret";

    fn token_for(sub: &str, exp_offset: i64, secret: &str) -> String {
        let claims = SessionClaims {
            sub: sub.to_string(),
            email: Some("admin@agency.test".to_string()),
            role: Some("authenticated".to_string()),
            exp: Utc::now().timestamp() + exp_offset,
            aud: Some(TOKEN_AUDIENCE.to_string()),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[tokio::test]
    async fn test_valid_token() {
        let user_id = Uuid::new_v4();
        let verifier = JwtSessionVerifier::new(Some(SECRET));
        let session = verifier
            .verify(&token_for(&user_id.to_string(), 3600, SECRET))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.user_id, user_id);
        assert_eq!(session.email.as_deref(), Some("admin@agency.test"));
    }

    #[tokio::test]
    async fn test_rejected_tokens() {
        let verifier = JwtSessionVerifier::new(Some(SECRET));
        let user_id = Uuid::new_v4().to_string();

        assert!(verifier.verify(&token_for(&user_id, -3600, SECRET)).await.unwrap().is_none());
        assert!(verifier.verify(&token_for(&user_id, 3600, "other")).await.unwrap().is_none());
        assert!(verifier.verify(&token_for("not-a-uuid", 3600, SECRET)).await.unwrap().is_none());
        assert!(verifier.verify("garbage").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_without_secret_nothing_is_valid() {
        let verifier = JwtSessionVerifier::new(None);
        let token = token_for(&Uuid::new_v4().to_string(), 3600, SECRET);
        assert!(verifier.verify(&token).await.unwrap().is_none());
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; sb-access-token=abc.def.ghi; other=1"),
        );
        assert_eq!(extract_access_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_token_from_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(extract_access_token(&headers).as_deref(), Some("xyz"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(extract_access_token(&headers), None);
    }
}
