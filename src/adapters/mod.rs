// Adapters layer: concrete implementations for external systems (reporting API, credentials, document lookup)

pub mod analytics;
pub mod auth;
pub mod resolver;
