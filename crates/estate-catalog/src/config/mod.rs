use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DEVELOPMENT_NONCE_SECRET: &str = "estate-catalog-development-nonce-secret";

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
    pub catalog: CatalogConfig,
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

        let catalog = CatalogConfig::from_env(environment)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            catalog,
        })
    }
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Catalog behavior: paging, permalinks, write authorization and CSRF tokens.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub public_base_url: String,
    pub admin_token: Option<String>,
    pub nonce_secret: String,
    pub nonce_lifetime_secs: i64,
    pub filter_page_size: u32,
    pub rest_per_page: u32,
    pub excerpt_words: usize,
}

/// Upper bound accepted for `per_page` on the REST list endpoint.
pub const MAX_REST_PER_PAGE: u32 = 100;

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            public_base_url: "http://localhost:3000".to_string(),
            admin_token: None,
            nonce_secret: DEVELOPMENT_NONCE_SECRET.to_string(),
            nonce_lifetime_secs: 86_400,
            filter_page_size: 5,
            rest_per_page: 10,
            excerpt_words: 55,
        }
    }
}

impl CatalogConfig {
    fn from_env(environment: AppEnvironment) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let public_base_url = env::var("APP_PUBLIC_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.public_base_url);

        let admin_token = env::var("APP_ADMIN_TOKEN")
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        let nonce_secret = match env::var("APP_NONCE_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if environment == AppEnvironment::Production => {
                return Err(ConfigError::MissingNonceSecret)
            }
            _ => defaults.nonce_secret,
        };

        let nonce_lifetime_secs = parse_var("APP_NONCE_LIFETIME_SECS", defaults.nonce_lifetime_secs)?;
        if nonce_lifetime_secs < 2 {
            return Err(ConfigError::InvalidNumber {
                variable: "APP_NONCE_LIFETIME_SECS",
            });
        }

        let filter_page_size = parse_var("APP_FILTER_PAGE_SIZE", defaults.filter_page_size)?;
        if filter_page_size == 0 {
            return Err(ConfigError::InvalidNumber {
                variable: "APP_FILTER_PAGE_SIZE",
            });
        }

        let rest_per_page = parse_var("APP_REST_PER_PAGE", defaults.rest_per_page)?;
        if rest_per_page == 0 || rest_per_page > MAX_REST_PER_PAGE {
            return Err(ConfigError::InvalidNumber {
                variable: "APP_REST_PER_PAGE",
            });
        }

        let excerpt_words = parse_var("APP_EXCERPT_WORDS", defaults.excerpt_words)?;

        Ok(Self {
            public_base_url,
            admin_token,
            nonce_secret,
            nonce_lifetime_secs,
            filter_page_size,
            rest_per_page,
            excerpt_words,
        })
    }
}

fn parse_var<T: std::str::FromStr>(variable: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { variable }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str },
    MissingNonceSecret,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable } => {
                write!(f, "{variable} must be a positive number in its allowed range")
            }
            ConfigError::MissingNonceSecret => {
                write!(f, "APP_NONCE_SECRET is required in production")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::MissingNonceSecret => None,
        }
    }
}
