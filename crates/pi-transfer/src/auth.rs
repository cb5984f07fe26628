//! OAuth2 authorization-code pieces used by the reauthentication protocol.
//!
//! The protocol itself runs inside [`PaymentClient`](crate::PaymentClient),
//! which owns the mutable token. This module holds the credential, the state
//! names, and the two stateless steps: building the authorization URL and
//! exchanging a code at the token endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::PiConfig;
use crate::error::PaymentError;

/// OAuth client credential plus the current bearer token.
#[derive(Clone)]
pub struct Credential {
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: String,
    pub(crate) access_token: Option<String>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("redirect_uri", &self.redirect_uri)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Credential {
    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
        redirect_uri: impl Into<String>,
        access_token: Option<String>,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri: redirect_uri.into(),
            access_token,
        }
    }

    pub fn from_config(config: &PiConfig) -> Self {
        Self::new(
            config.client_id.clone(),
            config.client_secret.clone(),
            config.redirect_uri.clone(),
            config.access_token.clone(),
        )
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// `(client_id, client_secret)` when both are configured.
    pub fn client_pair(&self) -> Option<(&str, &str)> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) => Some((id, secret)),
            _ => None,
        }
    }
}

/// Where the reauthentication protocol currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    HasCredential,
    AwaitingUserAuthorization,
    ExchangingCode,
    Authenticated,
    Failed,
}

/// Form body of the authorization-code exchange.
#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub grant_type: &'static str,
    pub code: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub redirect_uri: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Build the page the user visits to grant access.
pub fn authorization_url(
    authorize_url: &str,
    client_id: &str,
    redirect_uri: &str,
    scope: &str,
) -> Result<Url, PaymentError> {
    Url::parse_with_params(
        authorize_url,
        &[
            ("client_id", client_id),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri),
            ("scope", scope),
        ],
    )
    .map_err(|e| PaymentError::Configuration(format!("invalid authorization URL: {e}")))
}

/// Exchange an authorization code for a new access token.
///
/// Any non-200 answer, transport failure, or a body without a usable
/// single-line `access_token` is an [`PaymentError::Authentication`].
pub async fn exchange_code(
    http: &reqwest::Client,
    token_url: &str,
    timeout: Duration,
    request: &TokenRequest<'_>,
) -> Result<String, PaymentError> {
    let resp = http
        .post(token_url)
        .header(reqwest::header::ACCEPT, "application/json")
        .timeout(timeout)
        .form(request)
        .send()
        .await
        .map_err(|e| PaymentError::Authentication(format!("token request failed: {e}")))?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| PaymentError::Authentication(format!("token response unreadable: {e}")))?;

    if status != reqwest::StatusCode::OK {
        return Err(PaymentError::Authentication(format!(
            "token endpoint returned HTTP {}: {body}",
            status.as_u16()
        )));
    }

    let parsed: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| PaymentError::Authentication(format!("token response parse failed: {e}")))?;

    let token = parsed
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            PaymentError::Authentication("token response has no access_token".to_string())
        })?;

    // the token ends up on its own line in the env file
    if token.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(PaymentError::Authentication(
            "access_token contains whitespace or control characters".to_string(),
        ));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_encodes_params() {
        let url = authorization_url(
            "https://minepi.com/oauth",
            "my client",
            "http://localhost:8000/callback",
            "payments",
        )
        .unwrap();

        assert_eq!(url.host_str(), Some("minepi.com"));
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("client_id".to_string(), "my client".to_string()),
                ("response_type".to_string(), "code".to_string()),
                (
                    "redirect_uri".to_string(),
                    "http://localhost:8000/callback".to_string()
                ),
                ("scope".to_string(), "payments".to_string()),
            ]
        );
        assert!(url.as_str().contains("redirect_uri=http%3A%2F%2Flocalhost"));
    }

    #[test]
    fn test_client_pair_needs_both_halves() {
        let cred = Credential::new(Some("id".into()), None, "http://localhost", None);
        assert!(cred.client_pair().is_none());

        let cred = Credential::new(Some("id".into()), Some("secret".into()), "http://x", None);
        assert_eq!(cred.client_pair(), Some(("id", "secret")));
    }

    #[test]
    fn test_credential_debug_redacts() {
        let cred = Credential::new(
            Some("id".into()),
            Some("secret".into()),
            "http://x",
            Some("token".into()),
        );
        let dbg = format!("{cred:?}");
        assert!(!dbg.contains("\"secret\""));
        assert!(!dbg.contains("\"token\""));
    }
}
