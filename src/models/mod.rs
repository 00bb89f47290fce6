//! Modelos de datos
//!
//! Sesiones, roles y vistas del cache.

pub mod cache;
pub mod session;

pub use cache::*;
pub use session::*;
