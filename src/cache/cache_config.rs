//! Configuración de cache
//!
//! Este módulo lee las credenciales del servicio Redis gestionado (API REST
//! sobre HTTPS) y decide, una sola vez al arrancar, si el cache es utilizable.
//! Una configuración ausente o incorrecta nunca es fatal: el cliente degrada a
//! modo no-op.

use std::time::Duration;

use tracing::warn;

use crate::config::environment::non_empty_var;

pub const CACHE_URL_VAR: &str = "UPSTASH_REDIS_REST_URL";
pub const CACHE_TOKEN_VAR: &str = "UPSTASH_REDIS_REST_TOKEN";
pub const CACHE_TIMEOUT_VAR: &str = "UPSTASH_REDIS_REST_TIMEOUT_SECS";

const REQUIRED_SCHEME: &str = "https://";

/// Configuración del cache
#[derive(Clone)]
pub struct CacheConfig {
    url: Option<String>,
    token: Option<String>,
    usable: bool,
    pub default_ttl: u64,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheConfig")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("usable", &self.usable)
            .field("default_ttl", &self.default_ttl)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl CacheConfig {
    /// Leer la configuración desde el entorno (una vez, al arrancar)
    pub fn from_env() -> Self {
        let mut config = Self::from_values(non_empty_var(CACHE_URL_VAR), non_empty_var(CACHE_TOKEN_VAR));

        if let Some(raw) = non_empty_var(CACHE_TIMEOUT_VAR) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => warn!("⚠️ {} inválido ('{}'), usando {:?}", CACHE_TIMEOUT_VAR, raw, config.request_timeout),
            }
        }

        config
    }

    /// Construir la configuración a partir de valores ya leídos.
    ///
    /// Emite un único warning si el cache no es utilizable.
    pub fn from_values(url: Option<String>, token: Option<String>) -> Self {
        let url = url.filter(|u| !u.trim().is_empty());
        let token = token.filter(|t| !t.trim().is_empty());
        let usable = matches!((&url, &token), (Some(u), Some(_)) if u.starts_with(REQUIRED_SCHEME));

        let config = Self {
            url,
            token,
            usable,
            default_ttl: 3600, // 1 hora
            request_timeout: Duration::from_secs(5),
        };

        if let Some(reason) = config.diagnostic() {
            warn!("⚠️ Cache deshabilitado, se usará modo degradado: {}", reason);
        }

        config
    }

    /// Configuración explícitamente deshabilitada (sin warning)
    pub fn disabled() -> Self {
        Self {
            url: None,
            token: None,
            usable: false,
            default_ttl: 3600,
            request_timeout: Duration::from_secs(5),
        }
    }

    pub fn is_usable(&self) -> bool {
        self.usable
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Motivo por el que el cache no es utilizable, sin filtrar secretos
    pub fn diagnostic(&self) -> Option<String> {
        if self.usable {
            return None;
        }
        let reason = match (&self.url, &self.token) {
            (None, None) => format!("faltan {} y {}", CACHE_URL_VAR, CACHE_TOKEN_VAR),
            (None, Some(_)) => format!("falta {}", CACHE_URL_VAR),
            (Some(url), token) if !url.starts_with(REQUIRED_SCHEME) => {
                let mut reason = format!(
                    "{} debe empezar por '{}' (recibido '{}...')",
                    CACHE_URL_VAR,
                    REQUIRED_SCHEME,
                    url_hint(url)
                );
                if token.is_none() {
                    reason.push_str(&format!(" y falta {}", CACHE_TOKEN_VAR));
                }
                reason
            }
            (Some(_), _) => format!("falta {}", CACHE_TOKEN_VAR),
        };
        Some(reason)
    }
}

/// Primeros caracteres de la URL, cortando antes de cualquier credencial
fn url_hint(url: &str) -> String {
    let scheme_end = url.find("://").map(|pos| pos + 3).unwrap_or(0);
    let visible = if scheme_end > 0 { &url[..scheme_end] } else { url };
    visible.chars().take(10).collect()
}
