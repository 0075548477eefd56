use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::marketplace::MarketplacePolicy;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub policy: MarketplacePolicy,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            policy: policy_from_env()?,
        })
    }
}

fn policy_from_env() -> Result<MarketplacePolicy, ConfigError> {
    let defaults = MarketplacePolicy::default();

    let plan_completion_threshold = match env::var("APP_PLAN_COMPLETION_THRESHOLD") {
        Ok(raw) => raw
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|value| *value <= 100)
            .ok_or(ConfigError::InvalidCompletionThreshold { value: raw })?,
        Err(_) => defaults.plan_completion_threshold,
    };

    let max_verification_documents = match env::var("APP_MAX_VERIFICATION_DOCUMENTS") {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|value| *value >= 1)
            .ok_or(ConfigError::InvalidDocumentLimit { value: raw })?,
        Err(_) => defaults.max_verification_documents,
    };

    let min_testimony_chars = match env::var("APP_MIN_TESTIMONY_CHARS") {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidTestimonyLength { value: raw })?,
        Err(_) => defaults.min_testimony_chars,
    };

    Ok(MarketplacePolicy {
        plan_completion_threshold,
        max_verification_documents,
        min_testimony_chars,
    })
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCompletionThreshold { value: String },
    InvalidDocumentLimit { value: String },
    InvalidTestimonyLength { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must be an IP address or 'localhost'")
            }
            ConfigError::InvalidCompletionThreshold { value } => write!(
                f,
                "APP_PLAN_COMPLETION_THRESHOLD must be between 0 and 100 (found '{value}')"
            ),
            ConfigError::InvalidDocumentLimit { value } => write!(
                f,
                "APP_MAX_VERIFICATION_DOCUMENTS must be a positive integer (found '{value}')"
            ),
            ConfigError::InvalidTestimonyLength { value } => write!(
                f,
                "APP_MIN_TESTIMONY_CHARS must be a non-negative integer (found '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
