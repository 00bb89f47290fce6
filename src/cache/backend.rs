//! Frontera con el servicio de cache externo
//!
//! `CacheBackend` describe los comandos que se envían al servicio Redis.
//! Las implementaciones devuelven errores; es `RedisClient` quien decide
//! convertirlos en valores por defecto.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

/// Errores del servicio de cache
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Cache service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Cache service error: {0}")]
    Command(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache client initialization failed: {0}")]
    Init(String),
}

impl From<reqwest::Error> for CacheError {
    fn from(e: reqwest::Error) -> Self {
        CacheError::Transport(e.to_string())
    }
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Comandos Redis usados por la aplicación
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// SET con EX opcional; devuelve el ack del servidor ("OK")
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> CacheResult<String>;

    async fn del(&self, keys: &[String]) -> CacheResult<u64>;

    async fn hset(&self, hash: &str, fields: &HashMap<String, String>) -> CacheResult<u64>;

    async fn hget(&self, hash: &str, field: &str) -> CacheResult<Option<String>>;

    async fn ping(&self) -> CacheResult<String>;

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>>;
}
