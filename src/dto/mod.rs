//! DTOs de las requests y responses HTTP

pub mod cache_dto;
pub mod chat_dto;

pub use cache_dto::*;
pub use chat_dto::*;
