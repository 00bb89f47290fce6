use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Estadísticas del cache para el panel de administración
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub usable: bool,
    pub ping: String,
    pub latency_ms: Option<u64>,
    pub total_keys: usize,
    /// Claves por namespace (prefijo antes del primer `:`)
    pub namespaces: BTreeMap<String, usize>,
    pub collected_at: DateTime<Utc>,
}

impl CacheStats {
    /// Estadísticas vacías para el modo degradado
    pub fn degraded() -> Self {
        Self {
            usable: false,
            ping: "PONG".to_string(),
            latency_ms: None,
            total_keys: 0,
            namespaces: BTreeMap::new(),
            collected_at: Utc::now(),
        }
    }

    pub fn count_namespaces<'a>(keys: impl IntoIterator<Item = &'a String>) -> BTreeMap<String, usize> {
        let mut namespaces = BTreeMap::new();
        for key in keys {
            let namespace = key.split_once(':').map(|(ns, _)| ns).unwrap_or("(sin namespace)");
            *namespaces.entry(namespace.to_string()).or_insert(0) += 1;
        }
        namespaces
    }
}

/// Entrada individual mostrada en el navegador de cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntryView {
    pub key: String,
    pub value: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_namespaces() {
        let keys = vec![
            "ai-chat:1".to_string(),
            "ai-chat:2".to_string(),
            "page:home".to_string(),
            "orphan".to_string(),
        ];
        let namespaces = CacheStats::count_namespaces(&keys);
        assert_eq!(namespaces["ai-chat"], 2);
        assert_eq!(namespaces["page"], 1);
        assert_eq!(namespaces["(sin namespace)"], 1);
    }
}
