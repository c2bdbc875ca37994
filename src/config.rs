use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub mail: MailConfig,
    pub matching: MatchingConfig,
    pub app: AppConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
}

/// Outbound mail API. When no endpoint is configured the service falls back
/// to log-only delivery (development mode).
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub api_endpoint: Option<String>,
    pub from_address: String,
    pub api_key: Option<String>,
    pub send_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    /// Radius applied when a match call does not supply its own.
    pub default_max_distance_km: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub environment: Environment,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let host = env::var("SERVER_HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string())
            .parse::<IpAddr>()
            .context("Failed to parse SERVER_HOST")?;

        let port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .context("Failed to parse SERVER_PORT")?;

        let db_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let db_max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(val) => Some(
                val.parse()
                    .context("Failed to parse DATABASE_MAX_CONNECTIONS")?,
            ),
            Err(_) => Some(10),
        };
        let db_min_connections = match env::var("DATABASE_MIN_CONNECTIONS") {
            Ok(val) => Some(
                val.parse()
                    .context("Failed to parse DATABASE_MIN_CONNECTIONS")?,
            ),
            Err(_) => Some(1),
        };

        let mail_endpoint = env::var("MAIL_API_ENDPOINT").ok();
        let mail_from = env::var("MAIL_FROM_ADDRESS")
            .unwrap_or_else(|_| "DonorLink <no-reply@donorlink.example>".to_string());
        let mail_api_key = env::var("MAIL_API_KEY").ok();
        let mail_timeout = match env::var("MAIL_SEND_TIMEOUT_SECS") {
            Ok(val) => val
                .parse()
                .context("Failed to parse MAIL_SEND_TIMEOUT_SECS")?,
            Err(_) => 10,
        };

        let default_max_distance_km = match env::var("MATCHING_DEFAULT_MAX_DISTANCE_KM") {
            Ok(val) => val
                .parse()
                .context("Failed to parse MATCHING_DEFAULT_MAX_DISTANCE_KM")?,
            Err(_) => 20.0,
        };

        let environment_str =
            env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let environment = environment_str
            .parse()
            .unwrap_or(Environment::Development);

        let app_name = env::var("APP_NAME").unwrap_or_else(|_| "DonorLink Backend".to_string());

        Ok(Config {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: db_url,
                max_connections: db_max_connections,
                min_connections: db_min_connections,
            },
            mail: MailConfig {
                api_endpoint: mail_endpoint,
                from_address: mail_from,
                api_key: mail_api_key,
                send_timeout_secs: mail_timeout,
            },
            matching: MatchingConfig {
                default_max_distance_km,
            },
            app: AppConfig {
                name: app_name,
                environment,
            },
        })
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }

    #[allow(unused)]
    pub fn is_production(&self) -> bool {
        self.app.environment == Environment::Production
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Environment::Production),
            "staging" => Ok(Environment::Staging),
            "development" => Ok(Environment::Development),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

use once_cell::sync::OnceCell;

static CONFIG: OnceCell<Config> = OnceCell::new();

pub fn init() -> Result<&'static Config> {
    CONFIG.get_or_try_init(Config::from_env)
}

pub fn get() -> &'static Config {
    CONFIG.get().expect("Config is not initialized")
}
