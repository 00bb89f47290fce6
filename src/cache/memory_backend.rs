//! Backend en memoria
//!
//! Implementación en proceso de `CacheBackend`, con expiración por TTL y
//! patrones glob en `KEYS`. Sirve como sustituto del servicio real en tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use regex::Regex;
use tokio::sync::RwLock;

use super::backend::{CacheBackend, CacheError, CacheResult};

#[derive(Debug, Clone)]
enum StoredValue {
    Text(String),
    Hash(HashMap<String, String>),
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: StoredValue,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map_or(false, |at| now >= at)
    }
}

/// Cache en memoria compartible entre tareas
#[derive(Clone, Default)]
pub struct MemoryCacheBackend {
    entries: Arc<RwLock<HashMap<String, MemoryEntry>>>,
}

impl MemoryCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Número de claves vivas
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Convertir un patrón glob de Redis (`*`, `?`) en regex anclada
pub(crate) fn glob_to_regex(pattern: &str) -> CacheResult<Regex> {
    let mut source = String::with_capacity(pattern.len() + 2);
    source.push('^');
    for c in pattern.chars() {
        match c {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            other => source.push_str(&regex::escape(&other.to_string())),
        }
    }
    source.push('$');
    Regex::new(&source).map_err(|e| CacheError::Command(format!("patrón inválido: {}", e)))
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired(Instant::now()) => match &entry.value {
                StoredValue::Text(text) => Ok(Some(text.clone())),
                StoredValue::Hash(_) => Err(CacheError::Command(
                    "WRONGTYPE Operation against a key holding the wrong kind of value".to_string(),
                )),
            },
            _ => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> CacheResult<String> {
        let now = Instant::now();
        // Un TTL que no cabe en un Instant se trata como sin expiración
        let expires_at = ttl_seconds.and_then(|ttl| now.checked_add(Duration::from_secs(ttl)));

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.is_expired(now));
        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: StoredValue::Text(value.to_string()),
                expires_at,
            },
        );
        Ok("OK".to_string())
    }

    async fn del(&self, keys: &[String]) -> CacheResult<u64> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let mut removed = 0;
        for key in keys {
            if let Some(entry) = entries.remove(key) {
                if !entry.is_expired(now) {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    async fn hset(&self, hash: &str, fields: &HashMap<String, String>) -> CacheResult<u64> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        if entries.get(hash).map_or(false, |entry| entry.is_expired(now)) {
            entries.remove(hash);
        }

        let entry = entries.entry(hash.to_string()).or_insert_with(|| MemoryEntry {
            value: StoredValue::Hash(HashMap::new()),
            expires_at: None,
        });

        let StoredValue::Hash(map) = &mut entry.value else {
            return Err(CacheError::Command(
                "WRONGTYPE Operation against a key holding the wrong kind of value".to_string(),
            ));
        };

        let mut added = 0;
        for (field, value) in fields {
            if map.insert(field.clone(), value.clone()).is_none() {
                added += 1;
            }
        }
        Ok(added)
    }

    async fn hget(&self, hash: &str, field: &str) -> CacheResult<Option<String>> {
        let entries = self.entries.read().await;
        match entries.get(hash) {
            Some(entry) if !entry.is_expired(Instant::now()) => match &entry.value {
                StoredValue::Hash(map) => Ok(map.get(field).cloned()),
                StoredValue::Text(_) => Err(CacheError::Command(
                    "WRONGTYPE Operation against a key holding the wrong kind of value".to_string(),
                )),
            },
            _ => Ok(None),
        }
    }

    async fn ping(&self) -> CacheResult<String> {
        Ok("PONG".to_string())
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let regex = glob_to_regex(pattern)?;
        let now = Instant::now();
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired(now) && regex.is_match(key))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}
