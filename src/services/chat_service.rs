//! Servicio de chat con IA
//!
//! El modelo de lenguaje es un servicio externo: se le envía el mensaje del
//! visitante y se recibe texto. Las respuestas se cachean por pregunta
//! normalizada durante 24 horas.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::cache::{hashed_key, RedisClient};
use crate::utils::errors::{AppError, AppResult};

pub const CHAT_CACHE_NAMESPACE: &str = "ai-chat";
pub const CHAT_CACHE_TTL: u64 = 60 * 60 * 24;

const SYSTEM_PROMPT: &str = "Eres el asistente de una agencia de marketing digital. \
Responde de forma breve y amable sobre los servicios, proyectos y contacto de la agencia.";

/// Cliente de chat-completion
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, message: &str) -> AppResult<String>;
}

/// Cliente compatible con la API de OpenAI (`/chat/completions`)
#[derive(Clone)]
pub struct OpenAiChatClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

impl OpenAiChatClient {
    pub fn new(http: Client, base_url: &str, api_key: Option<String>, model: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    async fn complete(&self, message: &str) -> AppResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::ServiceUnavailable("OPENAI_API_KEY no configurada".to_string()))?;

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": SYSTEM_PROMPT },
                    { "role": "user", "content": message },
                ],
            }))
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("❌ Chat API respondió {}: {}", status, body);
            return Err(AppError::ExternalApi(format!("chat API status {}", status)));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalApi(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::ExternalApi("respuesta de chat vacía".to_string()))
    }
}

/// Respuesta cacheada del asistente
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ChatService {
    cache: RedisClient,
    client: Arc<dyn ChatClient>,
}

impl ChatService {
    pub fn new(cache: RedisClient, client: Arc<dyn ChatClient>) -> Self {
        Self { cache, client }
    }

    /// Clave de cache para un mensaje (insensible a mayúsculas y espacios)
    pub fn cache_key_for(message: &str) -> String {
        let normalized = message.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        hashed_key(CHAT_CACHE_NAMESPACE, &normalized)
    }

    pub async fn reply(&self, message: &str) -> AppResult<ChatReply> {
        let key = Self::cache_key_for(message);
        let client = self.client.clone();

        self.cache
            .get_with_cache(&key, CHAT_CACHE_TTL, || async move {
                info!("🤖 Consultando modelo de chat");
                let reply = client.complete(message).await?;
                Ok(ChatReply {
                    reply,
                    generated_at: Utc::now(),
                })
            })
            .await
    }
}
