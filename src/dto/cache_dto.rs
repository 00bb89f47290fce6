use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::cache::CacheEntryView;

/// Query del navegador de cache
#[derive(Debug, Deserialize)]
pub struct KeysQuery {
    pub pattern: Option<String>,
}

impl KeysQuery {
    pub fn pattern_or_all(&self) -> &str {
        self.pattern.as_deref().filter(|p| !p.trim().is_empty()).unwrap_or("*")
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ClearPatternRequest {
    #[validate(length(min = 1, max = 256))]
    pub pattern: String,
}

#[derive(Debug, Serialize)]
pub struct KeysResponse {
    pub pattern: String,
    pub total: usize,
    pub keys: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    #[serde(flatten)]
    pub entry: CacheEntryView,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}
