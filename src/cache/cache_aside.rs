//! Cache-aside sobre `RedisClient`
//!
//! El productor sólo se ejecuta en un miss. Como las operaciones del cliente
//! nunca fallan (degradan a su valor por defecto), ningún error del cache
//! llega hasta aquí: una caída del servicio se comporta como un miss y el
//! productor se llama exactamente una vez.

use std::future::Future;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use super::redis_client::RedisClient;

/// Clave con namespace: `namespace:parte1:parte2`
pub fn cache_key(namespace: &str, parts: &[&str]) -> String {
    let mut key = namespace.to_string();
    for part in parts {
        key.push(':');
        key.push_str(part);
    }
    key
}

/// Clave con namespace y hash MD5 de una entrada arbitraria (`ai-chat:<hash>`)
pub fn hashed_key(namespace: &str, input: &str) -> String {
    format!("{}:{:x}", namespace, md5::compute(input.as_bytes()))
}

impl RedisClient {
    /// Leer `key` del cache o calcularla con `producer` y guardarla con TTL.
    /// Un `null` guardado no cuenta como hit.
    ///
    /// Los errores del productor se propagan tal cual; el resultado de
    /// guardar en cache se ignora.
    pub async fn get_with_cache<T, E, F, Fut>(
        &self,
        key: &str,
        ttl_seconds: u64,
        producer: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get::<T>(key).await {
            debug!("📥 Cache-aside HIT: {}", key);
            return Ok(cached);
        }

        debug!("🔄 Cache-aside MISS, calculando valor para {}", key);
        let value = producer().await?;

        self.set(key, &value, Some(ttl_seconds)).await;
        Ok(value)
    }

    /// Invalidar una clave. Se borra directamente, así que deja de ser
    /// legible en cuanto el servicio confirma el DEL.
    pub async fn invalidate(&self, key: &str) -> u64 {
        info!("🗑️ Invalidando cache para clave {}", key);
        self.delete(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("page", &["services", "seo"]), "page:services:seo");
        assert_eq!(cache_key("page", &[]), "page");
    }

    #[test]
    fn test_hashed_key_is_stable() {
        let a = hashed_key("ai-chat", "¿Qué servicios ofrecen?");
        let b = hashed_key("ai-chat", "¿Qué servicios ofrecen?");
        assert_eq!(a, b);
        assert!(a.starts_with("ai-chat:"));
        assert_eq!(a.len(), "ai-chat:".len() + 32);
        assert_ne!(a, hashed_key("ai-chat", "otra pregunta"));
    }
}
