//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.
//! La configuración de caché vive aparte en `cache::cache_config` porque
//! tiene su propia semántica de degradación.

use std::env;

use thiserror::Error;

/// Errores al leer la configuración del entorno
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

/// Configuración del entorno
#[derive(Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    pub database_url: Option<String>,
    /// Secreto HS256 con el que el proveedor de auth firma los access tokens
    pub supabase_jwt_secret: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
}

impl std::fmt::Debug for EnvironmentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentConfig")
            .field("environment", &self.environment)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("cors_origins", &self.cors_origins)
            .field("database_url", &self.database_url.as_ref().map(|_| "***"))
            .field("supabase_jwt_secret", &self.supabase_jwt_secret.as_ref().map(|_| "***"))
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .finish()
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            cors_origins: Vec::new(),
            database_url: None,
            supabase_jwt_secret: None,
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
        }
    }
}

impl EnvironmentConfig {
    /// Leer la configuración desde las variables de entorno
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match non_empty_var("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { name: "PORT", value })?,
            None => defaults.port,
        };

        Ok(Self {
            environment: non_empty_var("ENVIRONMENT").unwrap_or(defaults.environment),
            port,
            host: non_empty_var("HOST").unwrap_or(defaults.host),
            cors_origins: non_empty_var("CORS_ORIGINS")
                .map(|origins| parse_origins(&origins))
                .unwrap_or_default(),
            database_url: non_empty_var("DATABASE_URL"),
            supabase_jwt_secret: non_empty_var("SUPABASE_JWT_SECRET"),
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            openai_base_url: non_empty_var("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            openai_model: non_empty_var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
        })
    }

    /// Obtener la dirección del servidor
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Variable de entorno presente y no vacía
pub(crate) fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        let origins = parse_origins("https://agency.example, ,https://www.agency.example");
        assert_eq!(
            origins,
            vec!["https://agency.example", "https://www.agency.example"]
        );
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = EnvironmentConfig {
            supabase_jwt_secret: Some("super-secret".to_string()),
            openai_api_key: Some("sk-test".to_string()),
            ..EnvironmentConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("sk-test"));
    }

    #[test]
    fn test_server_addr() {
        let config = EnvironmentConfig::default();
        assert_eq!(config.environment, "development");
        assert_eq!(config.server_addr(), "0.0.0.0:3000");
    }
}
