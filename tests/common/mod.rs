#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use agency_site::cache::{CacheBackend, CacheConfig, CacheError, CacheResult, MemoryCacheBackend, RedisClient};
use agency_site::config::EnvironmentConfig;
use agency_site::models::SessionClaims;
use agency_site::services::session_service::TOKEN_AUDIENCE;
use agency_site::services::{ChatClient, JwtSessionVerifier, RoleRepository};
use agency_site::state::AppState;
use agency_site::utils::{AppError, AppResult};
use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret";

pub fn usable_cache_config() -> CacheConfig {
    CacheConfig::from_values(
        Some("https://test-cache.upstash.io".to_string()),
        Some("test-token".to_string()),
    )
}

pub fn token_for(user_id: Uuid) -> String {
    let claims = SessionClaims {
        sub: user_id.to_string(),
        email: Some(format!("{}@agency.test", user_id)),
        role: Some("authenticated".to_string()),
        exp: chrono::Utc::now().timestamp() + 3600,
        aud: Some(TOKEN_AUDIENCE.to_string()),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes()))
        .expect("token de test")
}

/// Roles fijos por usuario
#[derive(Default)]
pub struct StaticRoles {
    roles: HashMap<Uuid, String>,
    pub lookups: AtomicUsize,
}

impl StaticRoles {
    pub fn with(mut self, user_id: Uuid, role: &str) -> Self {
        self.roles.insert(user_id, role.to_string());
        self
    }
}

#[async_trait]
impl RoleRepository for StaticRoles {
    async fn find_role(&self, user_id: Uuid) -> AppResult<Option<String>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.roles.get(&user_id).cloned())
    }
}

/// Repositorio de roles que siempre falla
pub struct FailingRoles;

#[async_trait]
impl RoleRepository for FailingRoles {
    async fn find_role(&self, _user_id: Uuid) -> AppResult<Option<String>> {
        Err(AppError::ServiceUnavailable("db caída".to_string()))
    }
}

/// Cliente de chat que cuenta las llamadas
#[derive(Default)]
pub struct CountingChat {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl CountingChat {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatClient for CountingChat {
    async fn complete(&self, message: &str) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::ExternalApi("modelo no disponible".to_string()));
        }
        Ok(format!("respuesta a: {}", message))
    }
}

/// Backend que simula una caída completa del servicio de cache
pub struct OutageBackend {
    pub calls: AtomicUsize,
}

impl OutageBackend {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn fail<T>(&self) -> CacheResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Transport("connection reset by peer".to_string()))
    }
}

#[async_trait]
impl CacheBackend for OutageBackend {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        self.fail()
    }
    async fn set(&self, _key: &str, _value: &str, _ttl: Option<u64>) -> CacheResult<String> {
        self.fail()
    }
    async fn del(&self, _keys: &[String]) -> CacheResult<u64> {
        self.fail()
    }
    async fn hset(&self, _hash: &str, _fields: &HashMap<String, String>) -> CacheResult<u64> {
        self.fail()
    }
    async fn hget(&self, _hash: &str, _field: &str) -> CacheResult<Option<String>> {
        self.fail()
    }
    async fn ping(&self) -> CacheResult<String> {
        self.fail()
    }
    async fn keys(&self, _pattern: &str) -> CacheResult<Vec<String>> {
        self.fail()
    }
}

pub fn memory_cache() -> (RedisClient, MemoryCacheBackend) {
    let backend = MemoryCacheBackend::new();
    let client = RedisClient::with_backend(usable_cache_config(), Arc::new(backend.clone()));
    (client, backend)
}

pub fn test_state(cache: RedisClient, roles: Arc<dyn RoleRepository>, chat: Arc<dyn ChatClient>) -> AppState {
    AppState::new(
        EnvironmentConfig::default(),
        cache,
        Arc::new(JwtSessionVerifier::new(Some(JWT_SECRET))),
        roles,
        chat,
    )
}
