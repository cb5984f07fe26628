use std::env;

use pi_transfer::PiConfig;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_RATE_LIMIT_RPM: u32 = 60;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Provider, OAuth and ledger settings shared with the CLI
    pub pi: PiConfig,
    /// Server port
    pub port: u16,
    /// Rate limit requests per minute
    pub rate_limit_rpm: u32,
    /// CORS allowed origins
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let pi = PiConfig::from_env()?;

        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let rate_limit_rpm = env::var("RATE_LIMIT_RPM")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT_RPM);
        if rate_limit_rpm == 0 {
            return Err(ConfigError::InvalidValue(
                "RATE_LIMIT_RPM must be greater than zero".to_string(),
            ));
        }

        let allowed_origins = parse_origins(env::var("ALLOWED_ORIGINS").ok().as_deref());

        if !pi.has_client_credentials() {
            tracing::warn!(
                "PI_CLIENT_ID / PI_CLIENT_SECRET not set, expired tokens cannot be replaced"
            );
        }

        Ok(Self {
            pi,
            port,
            rate_limit_rpm,
            allowed_origins,
        })
    }
}

fn parse_origins(raw: Option<&str>) -> Vec<String> {
    let origins: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if origins.is_empty() {
        vec!["http://localhost:8000".to_string()]
    } else {
        origins
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Pi(#[from] pi_transfer::ConfigError),

    #[error("invalid value: {0}")]
    InvalidValue(String),
}
