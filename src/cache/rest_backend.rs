//! Cliente REST del servicio Redis gestionado
//!
//! Cada comando es un `POST` al endpoint base con el comando como array JSON
//! (`["SET", "clave", "valor", "EX", "60"]`) y autenticación Bearer. El
//! servicio responde `{"result": ...}` o `{"error": "..."}`.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::backend::{CacheBackend, CacheError, CacheResult};
use super::cache_config::CacheConfig;

#[derive(Debug, Deserialize)]
struct RestResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Backend HTTPS para Redis
#[derive(Clone)]
pub struct RestCacheBackend {
    http: Client,
    base_url: String,
    token: String,
}

impl RestCacheBackend {
    /// Crear el backend a partir de una configuración utilizable
    pub fn from_config(config: &CacheConfig) -> CacheResult<Self> {
        let (Some(url), Some(token)) = (config.url(), config.token()) else {
            return Err(CacheError::Init("faltan URL o token del cache".to_string()));
        };

        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CacheError::Init(e.to_string()))?;

        Ok(Self::new(http, url, token))
    }

    pub fn new(http: Client, base_url: &str, token: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Ejecutar un comando y devolver el campo `result`
    async fn command(&self, args: Vec<String>) -> CacheResult<Value> {
        debug!("📤 Cache REST: {}", args.first().map(String::as_str).unwrap_or("?"));

        let response = self
            .http
            .post(&self.base_url)
            .bearer_auth(&self.token)
            .json(&args)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<RestResponse>(&body) {
            Ok(RestResponse { error: Some(error), .. }) => Err(CacheError::Command(error)),
            Ok(parsed) if status.is_success() => Ok(parsed.result.unwrap_or(Value::Null)),
            _ if !status.is_success() => Err(CacheError::Status {
                status: status.as_u16(),
                body,
            }),
            Err(e) => Err(CacheError::UnexpectedResponse(e.to_string())),
            Ok(_) => Err(CacheError::UnexpectedResponse(body)),
        }
    }
}

fn cmd<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

fn as_optional_string(value: Value) -> CacheResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        other => Ok(Some(other.to_string())),
    }
}

fn as_count(value: Value) -> CacheResult<u64> {
    value
        .as_u64()
        .ok_or_else(|| CacheError::UnexpectedResponse(format!("se esperaba un entero: {}", value)))
}

#[async_trait]
impl CacheBackend for RestCacheBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        as_optional_string(self.command(cmd(["GET", key])).await?)
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> CacheResult<String> {
        let mut args = cmd(["SET", key, value]);
        if let Some(ttl) = ttl_seconds {
            args.push("EX".to_string());
            args.push(ttl.to_string());
        }
        match self.command(args).await? {
            Value::String(ack) => Ok(ack),
            other => Err(CacheError::UnexpectedResponse(other.to_string())),
        }
    }

    async fn del(&self, keys: &[String]) -> CacheResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut args = vec!["DEL".to_string()];
        args.extend(keys.iter().cloned());
        as_count(self.command(args).await?)
    }

    async fn hset(&self, hash: &str, fields: &HashMap<String, String>) -> CacheResult<u64> {
        if fields.is_empty() {
            return Ok(0);
        }
        let mut args = cmd(["HSET", hash]);
        for (field, value) in fields {
            args.push(field.clone());
            args.push(value.clone());
        }
        as_count(self.command(args).await?)
    }

    async fn hget(&self, hash: &str, field: &str) -> CacheResult<Option<String>> {
        as_optional_string(self.command(cmd(["HGET", hash, field])).await?)
    }

    async fn ping(&self) -> CacheResult<String> {
        match self.command(cmd(["PING"])).await? {
            Value::String(pong) => Ok(pong),
            other => Err(CacheError::UnexpectedResponse(other.to_string())),
        }
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        match self.command(cmd(["KEYS", pattern])).await? {
            Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()),
            Value::Null => Ok(Vec::new()),
            other => Err(CacheError::UnexpectedResponse(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_credentials() {
        let config = CacheConfig::disabled();
        assert!(RestCacheBackend::from_config(&config).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let backend = RestCacheBackend::new(Client::new(), "https://x.upstash.io/", "tok");
        assert_eq!(backend.base_url, "https://x.upstash.io");
    }

    #[test]
    fn test_result_conversions() {
        assert_eq!(as_optional_string(Value::Null).unwrap(), None);
        assert_eq!(
            as_optional_string(Value::String("v".into())).unwrap(),
            Some("v".to_string())
        );
        assert_eq!(as_count(serde_json::json!(3)).unwrap(), 3);
        assert!(as_count(serde_json::json!("3")).is_err());
    }
}
