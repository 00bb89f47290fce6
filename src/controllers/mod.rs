//! Controladores HTTP

pub mod cache_admin_controller;
pub mod chat_controller;
pub mod page_controller;
