//! Servicios de negocio
//!
//! Sesiones, autorización por rol y chat con IA.

pub mod authorization_service;
pub mod chat_service;
pub mod session_service;

pub use authorization_service::{AuthorizationService, NoRoleRepository, PgRoleRepository, RoleRepository};
pub use chat_service::{ChatClient, ChatReply, ChatService, OpenAiChatClient};
pub use session_service::{extract_access_token, JwtSessionVerifier, SessionVerifier};
