pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;

use crate::config::AppConfig;
use crate::infra::store::SharedStore;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub paseto_access_key: [u8; 32],
    pub token_issuer: String,
}

impl AppState {
    pub fn new(store: SharedStore, config: &AppConfig) -> Self {
        Self {
            store,
            paseto_access_key: config.paseto_access_key,
            token_issuer: config.token_issuer.clone(),
        }
    }
}
