use anyhow::{anyhow, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub http_addr: String,
    pub store_backend: String,
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,
    pub db_max_pool_size: u32,
    pub db_connect_timeout_seconds: u64,
    pub paseto_access_key: [u8; 32],
    pub token_issuer: String,
    pub max_body_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let http_addr = env_or("HTTP_ADDR", "0.0.0.0:8000");
        let _parsed_http_addr = SocketAddr::from_str(&http_addr)
            .map_err(|err| anyhow!("invalid HTTP_ADDR: {}", err))?;

        let store_backend = env_or("STORE_BACKEND", "mongo");
        let mongodb_uri = std::env::var("MONGODB_URI").ok();
        if store_backend == "mongo" && mongodb_uri.is_none() {
            return Err(anyhow!("missing required env var: MONGODB_URI"));
        }

        Ok(Self {
            http_addr,
            store_backend,
            mongodb_uri,
            mongodb_database: env_or("MONGODB_DATABASE", "videotube"),
            db_max_pool_size: env_or_parse("DB_MAX_POOL_SIZE", "25")?,
            db_connect_timeout_seconds: env_or_parse("DB_CONNECT_TIMEOUT_SECONDS", "5")?,
            paseto_access_key: env_key_32("PASETO_ACCESS_KEY")?,
            token_issuer: env_or("TOKEN_ISSUER", "tubetalk"),
            max_body_bytes: env_or_parse("MAX_BODY_BYTES", "65536")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_err(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| anyhow!("missing required env var: {}", key))
}

fn env_or_parse<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let value = std::env::var(key).unwrap_or_else(|_| default.to_string());
    value
        .parse::<T>()
        .map_err(|err| anyhow!("invalid {}: {}", key, err))
}

fn env_key_32(key: &str) -> Result<[u8; 32]> {
    let value = env_or_err(key)?;
    decode_key_32(key, &value)
}

fn decode_key_32(key: &str, value: &str) -> Result<[u8; 32]> {
    let decoded = STANDARD
        .decode(value.as_bytes())
        .map_err(|err| anyhow!("invalid {}: {}", key, err))?;
    if decoded.len() != 32 {
        return Err(anyhow!("invalid {}: expected 32 bytes", key));
    }
    let mut key_bytes = [0u8; 32];
    key_bytes.copy_from_slice(&decoded);
    Ok(key_bytes)
}
