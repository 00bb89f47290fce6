use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use super::backend::{CacheBackend, CacheError, CacheResult};
use super::cache_config::CacheConfig;
use super::rest_backend::RestCacheBackend;
use crate::models::cache::CacheStats;

/// Ack devuelto por las escrituras cuando no se llega al servicio
pub const WRITE_ACK: &str = "OK";
pub const PING_OK: &str = "PONG";
pub const PING_ERROR: &str = "ERROR";

type BackendFactory = Box<dyn Fn(&CacheConfig) -> CacheResult<Arc<dyn CacheBackend>> + Send + Sync>;

struct Inner {
    config: CacheConfig,
    backend: OnceCell<Arc<dyn CacheBackend>>,
    factory: Option<BackendFactory>,
}

/// Cliente Redis que degrada en vez de fallar.
///
/// Si la configuración no es utilizable, todas las operaciones devuelven su
/// valor por defecto sin tocar la red. Si lo es, el backend se construye una
/// sola vez (en la primera operación) y se reutiliza; cualquier error del
/// servicio se registra y se convierte en el mismo valor por defecto.
#[derive(Clone)]
pub struct RedisClient {
    inner: Arc<Inner>,
}

impl RedisClient {
    /// Cliente contra el servicio REST configurado
    pub fn new(config: CacheConfig) -> Self {
        Self::with_factory(config, |config| {
            let backend = RestCacheBackend::from_config(config)?;
            Ok(Arc::new(backend) as Arc<dyn CacheBackend>)
        })
    }

    /// Cliente con un backend ya construido (tests, backends alternativos)
    pub fn with_backend(config: CacheConfig, backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                backend: OnceCell::new_with(Some(backend)),
                factory: None,
            }),
        }
    }

    pub(crate) fn with_factory<F>(config: CacheConfig, factory: F) -> Self
    where
        F: Fn(&CacheConfig) -> CacheResult<Arc<dyn CacheBackend>> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                config,
                backend: OnceCell::new(),
                factory: Some(Box::new(factory)),
            }),
        }
    }

    pub fn is_usable(&self) -> bool {
        self.inner.config.is_usable()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    async fn backend(&self) -> CacheResult<Arc<dyn CacheBackend>> {
        let inner = &self.inner;
        inner
            .backend
            .get_or_try_init(|| async {
                let factory = inner
                    .factory
                    .as_ref()
                    .ok_or_else(|| CacheError::Init("no hay backend configurado".to_string()))?;
                info!("🔗 Inicializando cliente de cache");
                factory(&inner.config)
            })
            .await
            .cloned()
    }

    /// Ejecutar una operación con la política de degradación
    async fn run<T, F, Fut>(&self, op: &'static str, key: &str, default: T, f: F) -> T
    where
        F: FnOnce(Arc<dyn CacheBackend>) -> Fut,
        Fut: Future<Output = CacheResult<T>>,
    {
        if !self.is_usable() {
            debug!("🪫 Cache no disponible, {} '{}' usa valor por defecto", op, key);
            return default;
        }

        let backend = match self.backend().await {
            Ok(backend) => backend,
            Err(e) => {
                error!("❌ No se pudo crear el cliente de cache ({} '{}'): {}", op, key, e);
                return default;
            }
        };

        match f(backend).await {
            Ok(value) => value,
            Err(e) => {
                warn!("⚠️ Error de cache en {} '{}', usando valor por defecto: {}", op, key, e);
                default
            }
        }
    }

    /// Leer y deserializar un valor. Un `null` almacenado cuenta como miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self
            .run("GET", key, None, |backend| async move { backend.get(key).await })
            .await;

        let value = raw.filter(|raw| !is_null(raw)).and_then(|raw| decode(key, &raw));
        if value.is_some() {
            debug!("📥 Cache HIT para clave: {}", key);
        } else {
            debug!("❌ Cache MISS para clave: {}", key);
        }
        value
    }

    /// Guardar un valor serializado como JSON, con TTL opcional en segundos
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<u64>) -> String {
        if !self.is_usable() {
            debug!("🪫 Cache no disponible, SET '{}' ignorado", key);
            return WRITE_ACK.to_string();
        }

        let serialized = match serde_json::to_string(value) {
            Ok(serialized) => serialized,
            Err(e) => {
                error!("❌ No se pudo serializar el valor para clave {}: {}", key, e);
                return WRITE_ACK.to_string();
            }
        };

        let ack = self
            .run("SET", key, None, |backend| async move {
                backend.set(key, &serialized, ttl).await.map(Some)
            })
            .await;

        match ack {
            Some(ack) => {
                debug!("💾 Cache SET para clave: {} (TTL: {:?})", key, ttl);
                ack
            }
            None => WRITE_ACK.to_string(),
        }
    }

    /// Eliminar una clave; devuelve cuántas se eliminaron
    pub async fn delete(&self, key: &str) -> u64 {
        let keys = [key.to_string()];
        let count = self
            .run("DEL", key, 0, |backend| async move { backend.del(&keys).await })
            .await;
        debug!("🗑️ Cache DELETE para clave: {} (eliminados: {})", key, count);
        count
    }

    /// Escribir varios campos de un hash (valores serializados como JSON)
    pub async fn hset<V: Serialize>(&self, hash: &str, fields: &HashMap<String, V>) -> u64 {
        if !self.is_usable() {
            debug!("🪫 Cache no disponible, HSET '{}' ignorado", hash);
            return 0;
        }

        let mut encoded = HashMap::with_capacity(fields.len());
        for (field, value) in fields {
            match serde_json::to_string(value) {
                Ok(json) => {
                    encoded.insert(field.clone(), json);
                }
                Err(e) => {
                    error!("❌ No se pudo serializar el campo {} de {}: {}", field, hash, e);
                    return 0;
                }
            }
        }

        self.run("HSET", hash, 0, |backend| async move { backend.hset(hash, &encoded).await })
            .await
    }

    /// Leer un campo de un hash
    pub async fn hget<T: DeserializeOwned>(&self, hash: &str, field: &str) -> Option<T> {
        let raw = self
            .run("HGET", hash, None, |backend| async move { backend.hget(hash, field).await })
            .await
            .filter(|raw| !is_null(raw))?;
        decode(&format!("{}.{}", hash, field), &raw)
    }

    /// `"PONG"` si el servicio responde (o si el cache está deshabilitado),
    /// `"ERROR"` si el servicio está configurado pero falla
    pub async fn ping(&self) -> String {
        if !self.is_usable() {
            debug!("🪫 Cache no disponible, PING responde {}", PING_OK);
            return PING_OK.to_string();
        }
        self.run("PING", "-", PING_ERROR.to_string(), |backend| async move { backend.ping().await })
            .await
    }

    /// Listar claves que coinciden con un patrón glob
    pub async fn keys(&self, pattern: &str) -> Vec<String> {
        self.run("KEYS", pattern, Vec::new(), |backend| async move {
            backend.keys(pattern).await
        })
        .await
    }

    /// Eliminar todas las claves que coinciden con un patrón
    pub async fn clear_pattern(&self, pattern: &str) -> u64 {
        let keys = self.keys(pattern).await;
        if keys.is_empty() {
            return 0;
        }

        info!("🧹 Limpiando {} claves con patrón '{}'", keys.len(), pattern);
        self.run("DEL", pattern, 0, |backend| async move { backend.del(&keys).await })
            .await
    }

    /// Estadísticas para el panel de Redis
    pub async fn stats(&self) -> CacheStats {
        if !self.is_usable() {
            return CacheStats::degraded();
        }

        let started = Instant::now();
        let ping = self.ping().await;
        let latency_ms = (ping == PING_OK).then(|| started.elapsed().as_millis() as u64);

        let keys = self.keys("*").await;
        CacheStats {
            usable: true,
            ping,
            latency_ms,
            total_keys: keys.len(),
            namespaces: CacheStats::count_namespaces(&keys),
            collected_at: chrono::Utc::now(),
        }
    }
}

fn is_null(raw: &str) -> bool {
    raw.trim() == "null"
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("⚠️ Valor de cache ilegible para clave {}: {}", key, e);
            None
        }
    }
}
