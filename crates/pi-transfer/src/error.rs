use thiserror::Error;

/// Errors returned by [`PaymentClient`](crate::PaymentClient) operations.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// OAuth client credentials are missing or unusable. Never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The token exchange failed or no authorization code was supplied.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// The provider answered with a status other than 200 (or a second 401).
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Transport-level failure: timeout, connection refused, TLS.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The operation was invoked without the state it needs. No request was sent.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// A 200 response whose body could not be used.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A 401 that could not be recovered because reauthentication failed.
    #[error("HTTP 401: {body} (reauthentication failed: {source})")]
    ReauthenticationFailed {
        body: String,
        #[source]
        source: Box<PaymentError>,
    },
}

/// Coarse category of a [`PaymentError`], used to pick user-facing wording
/// and HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AuthenticationRequired,
    Unreachable,
    Rejected,
    InvalidRequest,
    Misconfigured,
}

impl PaymentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PaymentError::Configuration(_) => ErrorKind::Misconfigured,
            PaymentError::Authentication(_) | PaymentError::ReauthenticationFailed { .. } => {
                ErrorKind::AuthenticationRequired
            }
            PaymentError::HttpStatus { status: 401, .. } => ErrorKind::AuthenticationRequired,
            PaymentError::HttpStatus { .. } | PaymentError::InvalidResponse(_) => {
                ErrorKind::Rejected
            }
            PaymentError::Network(_) => ErrorKind::Unreachable,
            PaymentError::Precondition(_) => ErrorKind::InvalidRequest,
        }
    }

    /// Status code returned by the provider, if the failure was an HTTP response.
    pub fn status(&self) -> Option<u16> {
        match self {
            PaymentError::HttpStatus { status, .. } => Some(*status),
            PaymentError::ReauthenticationFailed { .. } => Some(401),
            _ => None,
        }
    }

    /// Short message suitable for showing to the person running the transfer.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::AuthenticationRequired => {
                "Authentication required: the Pi Network access token is missing or expired"
            }
            ErrorKind::Unreachable => "Could not reach the Pi Network service",
            ErrorKind::Rejected => "The Pi Network service rejected the request",
            ErrorKind::InvalidRequest => "The request is missing required information",
            ErrorKind::Misconfigured => {
                "Pi Network OAuth credentials are not configured (PI_CLIENT_ID / PI_CLIENT_SECRET)"
            }
        }
    }
}

impl From<crate::config::ConfigError> for PaymentError {
    fn from(e: crate::config::ConfigError) -> Self {
        PaymentError::Configuration(e.to_string())
    }
}
