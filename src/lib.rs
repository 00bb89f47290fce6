//! Backend del sitio de la agencia
//!
//! Cache Redis degradable con helper cache-aside, protección de rutas de
//! administración por rol y endpoints JSON del panel y del asistente de chat.

pub mod cache;
pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
