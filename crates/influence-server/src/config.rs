use config::{Config, ConfigError, Environment, File};
use influence_core::ScoringParams;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scoring: ScoringParams,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub database: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Entities per score mutation and log insert
    #[serde(default = "default_write_batch_size")]
    pub write_batch_size: usize,
}

fn default_write_batch_size() -> usize {
    crate::engine::DEFAULT_WRITE_BATCH_SIZE
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "http://localhost:8123")?
            .set_default("database.database", "influence")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // INFLUENCE__SERVER__PORT, INFLUENCE__SCORING__HALF_LIFE_DAYS, ...
            .add_source(
                Environment::with_prefix("INFLUENCE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
