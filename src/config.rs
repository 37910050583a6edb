use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub db_max_connections: u32,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let host: IpAddr = env_or("INVENTORY_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid INVENTORY_HOST: {e}"))?;

        let port: u16 = env_or("INVENTORY_PORT", "8787")
            .parse()
            .map_err(|e| format!("Invalid INVENTORY_PORT: {e}"))?;

        let max_body_size: usize = env_or("INVENTORY_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid INVENTORY_MAX_BODY_SIZE: {e}"))?;

        let db_max_connections: u32 = env_or("INVENTORY_DB_MAX_CONNECTIONS", "10")
            .parse()
            .map_err(|e| format!("Invalid INVENTORY_DB_MAX_CONNECTIONS: {e}"))?;
        if db_max_connections == 0 {
            return Err("INVENTORY_DB_MAX_CONNECTIONS must be at least 1".to_string());
        }

        let log_level = env_or("INVENTORY_LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            host,
            port,
            max_body_size,
            db_max_connections,
            log_level,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
