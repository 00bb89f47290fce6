//! Middleware del sistema
//!
//! Este módulo contiene el middleware de protección de rutas de
//! administración y la configuración de CORS.

pub mod admin_gate;
pub mod cors;

pub use admin_gate::*;
pub use cors::*;
