//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. Todas las dependencias externas (cache,
//! sesiones, roles, chat) se construyen fuera y se inyectan aquí.

use std::sync::Arc;

use axum::extract::FromRef;
use reqwest::Client;
use sqlx::PgPool;

use crate::cache::{CacheConfig, RedisClient};
use crate::config::environment::EnvironmentConfig;
use crate::middleware::admin_gate::AdminGate;
use crate::services::{
    AuthorizationService, ChatClient, ChatService, JwtSessionVerifier, NoRoleRepository,
    OpenAiChatClient, PgRoleRepository, RoleRepository, SessionVerifier,
};

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub cache: RedisClient,
    pub gate: AdminGate,
    pub chat: ChatService,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        cache: RedisClient,
        sessions: Arc<dyn SessionVerifier>,
        roles: Arc<dyn RoleRepository>,
        chat_client: Arc<dyn ChatClient>,
    ) -> Self {
        let gate = AdminGate::new(sessions, AuthorizationService::new(roles));
        let chat = ChatService::new(cache.clone(), chat_client);

        Self {
            config,
            cache,
            gate,
            chat,
        }
    }

    /// Construir el estado de producción a partir de la configuración
    pub fn from_config(config: EnvironmentConfig, cache_config: CacheConfig, pool: Option<PgPool>) -> Self {
        let cache = RedisClient::new(cache_config);
        let sessions = Arc::new(JwtSessionVerifier::new(config.supabase_jwt_secret.as_deref()));
        let roles: Arc<dyn RoleRepository> = match pool {
            Some(pool) => Arc::new(PgRoleRepository::new(pool)),
            None => Arc::new(NoRoleRepository),
        };
        let chat_client = Arc::new(OpenAiChatClient::new(
            Client::new(),
            &config.openai_base_url,
            config.openai_api_key.clone(),
            &config.openai_model,
        ));

        Self::new(config, cache, sessions, roles, chat_client)
    }
}

impl FromRef<AppState> for AdminGate {
    fn from_ref(state: &AppState) -> Self {
        state.gate.clone()
    }
}

impl FromRef<AppState> for RedisClient {
    fn from_ref(state: &AppState) -> Self {
        state.cache.clone()
    }
}
