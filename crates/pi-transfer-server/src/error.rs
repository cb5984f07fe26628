use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use pi_transfer::{ErrorKind, PaymentError};
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    /// Request body failed validation
    InvalidRequest(String),
    /// The payment client gave up
    Payment(PaymentError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "invalid request: {}", msg),
            ApiError::Payment(e) => write!(f, "payment error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Payment(e) => Some(e),
            ApiError::InvalidRequest(_) => None,
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(e: PaymentError) -> Self {
        ApiError::Payment(e)
    }
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::Payment(e) => match e.kind() {
                ErrorKind::AuthenticationRequired => "authentication_required",
                ErrorKind::Unreachable => "upstream_unreachable",
                ErrorKind::Rejected => "upstream_rejected",
                ErrorKind::InvalidRequest => "invalid_request",
                ErrorKind::Misconfigured => "misconfigured",
            },
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Payment(e) => match e.kind() {
                ErrorKind::AuthenticationRequired => StatusCode::UNAUTHORIZED,
                ErrorKind::Unreachable => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::Rejected => StatusCode::BAD_GATEWAY,
                ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
                ErrorKind::Misconfigured => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::InvalidRequest(msg) => msg.clone(),
            ApiError::Payment(e) => {
                tracing::error!(error = %e, status = ?e.status(), "Payment request failed");
                match e.kind() {
                    ErrorKind::InvalidRequest => e.to_string(),
                    _ => e.user_message().to_string(),
                }
            }
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.code(),
            "message": message,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::InvalidRequest("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                PaymentError::Authentication("no code".to_string()).into(),
                StatusCode::UNAUTHORIZED,
            ),
            (
                PaymentError::HttpStatus {
                    status: 500,
                    body: "boom".to_string(),
                }
                .into(),
                StatusCode::BAD_GATEWAY,
            ),
            (
                PaymentError::Precondition("no destination".to_string()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                PaymentError::Configuration("missing".to_string()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err}");
        }
    }

    #[test]
    fn test_unrecoverable_401_is_authentication_required() {
        let err: ApiError = PaymentError::HttpStatus {
            status: 401,
            body: "expired".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.code(), "authentication_required");
    }
}
