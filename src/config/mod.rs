// src/config/mod.rs
pub mod service;

pub use service::AppConfig;
