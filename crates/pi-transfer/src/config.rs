//! Client configuration from environment variables and the env file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::constants::*;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL in {var}: {value}")]
    InvalidUrl { var: &'static str, value: String },

    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Everything a [`PaymentClient`](crate::PaymentClient) needs to reach the provider.
#[derive(Clone)]
pub struct PiConfig {
    /// Platform API base URL (env: PI_API_BASE_URL).
    pub api_base_url: String,
    /// OAuth2 authorization page shown to the user (env: PI_AUTHORIZE_URL).
    pub authorize_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub oauth_scope: String,
    /// Pre-existing bearer token. Absent means the first call authenticates.
    pub access_token: Option<String>,
    pub http_timeout: Duration,
    /// Env file that refreshed tokens are appended to (env: PI_ENV_FILE).
    pub env_file: PathBuf,
    /// Transaction ledger location (env: PI_LEDGER_PATH).
    pub ledger_path: PathBuf,
}

impl std::fmt::Debug for PiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PiConfig")
            .field("api_base_url", &self.api_base_url)
            .field("authorize_url", &self.authorize_url)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("redirect_uri", &self.redirect_uri)
            .field("oauth_scope", &self.oauth_scope)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("http_timeout", &self.http_timeout)
            .field("env_file", &self.env_file)
            .field("ledger_path", &self.ledger_path)
            .finish()
    }
}

impl Default for PiConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            client_id: None,
            client_secret: None,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            oauth_scope: DEFAULT_OAUTH_SCOPE.to_string(),
            access_token: None,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            env_file: PathBuf::from(DEFAULT_ENV_FILE),
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
        }
    }
}

impl PiConfig {
    /// Load configuration from the process environment.
    ///
    /// Callers normally run `dotenvy::dotenv()` first. The access token is
    /// read back from the env file when one is present there, because
    /// refreshed tokens are appended and the last entry is the live one.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let api_base_url = var("PI_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        validate_url("PI_API_BASE_URL", &api_base_url)?;

        let authorize_url =
            var("PI_AUTHORIZE_URL").unwrap_or_else(|| DEFAULT_AUTHORIZE_URL.to_string());
        validate_url("PI_AUTHORIZE_URL", &authorize_url)?;

        let redirect_uri =
            var("PI_REDIRECT_URI").unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());
        validate_url("PI_REDIRECT_URI", &redirect_uri)?;

        let oauth_scope = var("PI_OAUTH_SCOPE").unwrap_or_else(|| DEFAULT_OAUTH_SCOPE.to_string());

        let http_timeout_secs = match var("PI_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    var: "PI_HTTP_TIMEOUT_SECS",
                    value: raw,
                })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let env_file = PathBuf::from(var("PI_ENV_FILE").unwrap_or_else(|| DEFAULT_ENV_FILE.into()));
        let ledger_path =
            PathBuf::from(var("PI_LEDGER_PATH").unwrap_or_else(|| DEFAULT_LEDGER_PATH.into()));

        let access_token =
            latest_env_value(&env_file, ACCESS_TOKEN_KEY).or_else(|| var(ACCESS_TOKEN_KEY));

        Ok(Self {
            api_base_url,
            authorize_url,
            client_id: var("PI_CLIENT_ID"),
            client_secret: var("PI_CLIENT_SECRET"),
            redirect_uri,
            oauth_scope,
            access_token,
            http_timeout: Duration::from_secs(http_timeout_secs),
            env_file,
            ledger_path,
        })
    }

    /// Both halves of the OAuth client credential, if configured.
    pub fn has_client_credentials(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

fn validate_url(var: &'static str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value).map_err(|_| ConfigError::InvalidUrl {
        var,
        value: value.to_string(),
    })?;
    Ok(())
}

/// Last non-empty value of `key` in an env file, or `None` if the file is
/// missing, unreadable, or never sets the key.
pub fn latest_env_value(path: &Path, key: &str) -> Option<String> {
    let iter = dotenvy::from_path_iter(path).ok()?;
    let mut latest = None;
    for item in iter {
        match item {
            Ok((k, v)) if k == key && !v.trim().is_empty() => latest = Some(v),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping malformed env file line");
            }
        }
    }
    latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = PiConfig::from_lookup(lookup(&[("PI_ENV_FILE", "/nonexistent/.env")])).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(config.client_id.is_none());
        assert!(config.access_token.is_none());
        assert!(!config.has_client_credentials());
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = PiConfig::from_lookup(lookup(&[
            ("PI_ENV_FILE", "/nonexistent/.env"),
            ("PI_CLIENT_ID", ""),
            ("PI_CLIENT_SECRET", "  "),
        ]))
        .unwrap();
        assert!(!config.has_client_credentials());
    }

    #[test]
    fn test_rejects_bad_url_and_timeout() {
        let err = PiConfig::from_lookup(lookup(&[("PI_API_BASE_URL", "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { var: "PI_API_BASE_URL", .. }));

        let err = PiConfig::from_lookup(lookup(&[("PI_HTTP_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = PiConfig::from_lookup(lookup(&[
            ("PI_ENV_FILE", "/nonexistent/.env"),
            ("PI_API_BASE_URL", "http://127.0.0.1:9000/v2/"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000/v2");
    }

    #[test]
    fn test_last_appended_token_wins() {
        let dir = tempfile::tempdir().unwrap();
        let env_path = dir.path().join(".env");
        std::fs::write(
            &env_path,
            "PI_CLIENT_ID=abc\nPI_ACCESS_TOKEN=old\n\nPI_ACCESS_TOKEN=new\n",
        )
        .unwrap();

        let env_str = env_path.to_str().unwrap().to_string();
        let config = PiConfig::from_lookup(lookup(&[
            ("PI_ENV_FILE", env_str.as_str()),
            ("PI_ACCESS_TOKEN", "old"),
        ]))
        .unwrap();
        assert_eq!(config.access_token.as_deref(), Some("new"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = PiConfig {
            client_secret: Some("s3cret".to_string()),
            access_token: Some("tok".to_string()),
            ..PiConfig::default()
        };
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("s3cret"));
        assert!(!dbg.contains("\"tok\""));
        assert!(dbg.contains("[REDACTED]"));
    }
}
