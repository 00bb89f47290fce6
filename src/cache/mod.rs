//! Cache
//!
//! Este módulo contiene el cliente Redis degradable, sus backends y el
//! helper cache-aside.

pub mod backend;
pub mod cache_aside;
pub mod cache_config;
pub mod memory_backend;
pub mod redis_client;
pub mod rest_backend;

pub use backend::{CacheBackend, CacheError, CacheResult};
pub use cache_aside::{cache_key, hashed_key};
pub use cache_config::CacheConfig;
pub use memory_backend::MemoryCacheBackend;
pub use redis_client::RedisClient;
pub use rest_backend::RestCacheBackend;
