use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};

use crate::auth::{authorization_url, exchange_code, AuthState, Credential, TokenRequest};
use crate::config::PiConfig;
use crate::constants::TOKEN_PATH;
use crate::error::PaymentError;
use crate::interaction::UserInteraction;
use crate::ledger::{JsonFileLedger, LogEntry, TransactionLog};
use crate::payment::{default_memo, PreparedTransaction, TransactionRequest, TransactionResult};
use crate::token_store::{EnvFileTokenStore, TokenStore};

/// Wallet seed material supplied by the user. Held for the session, never logged.
#[derive(Clone)]
pub struct SeedPhrase(String);

impl SeedPhrase {
    /// `None` for blank input.
    pub fn new(phrase: impl Into<String>) -> Option<Self> {
        let phrase = phrase.into();
        if phrase.trim().is_empty() {
            None
        } else {
            Some(Self(phrase))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SeedPhrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SeedPhrase([REDACTED])")
    }
}

/// Tracks the single reauthentication one operation is allowed.
struct Attempt {
    op: &'static str,
    reauthenticated: bool,
}

impl Attempt {
    fn new(op: &'static str) -> Self {
        Self {
            op,
            reauthenticated: false,
        }
    }
}

/// Pi Network payment client for one user session.
///
/// Owns the bearer token and refreshes it through the OAuth2 authorization-code
/// flow when the provider answers 401. Every operation takes `&mut self`, so a
/// client cannot be shared between concurrent callers; build one per session.
pub struct PaymentClient<I: UserInteraction> {
    http: reqwest::Client,
    timeout: Duration,
    api_base_url: String,
    authorize_url: String,
    oauth_scope: String,
    credential: Credential,
    destination: Option<String>,
    seed: Option<SeedPhrase>,
    interaction: I,
    token_store: Arc<dyn TokenStore>,
    ledger: Arc<dyn TransactionLog>,
    auth_state: AuthState,
    pending_payment: Option<String>,
}

impl<I: UserInteraction> PaymentClient<I> {
    /// Create a client with its own HTTP transport, appending refreshed tokens
    /// to the configured env file and logging to the configured ledger.
    pub fn new(
        config: &PiConfig,
        destination: Option<String>,
        seed: Option<SeedPhrase>,
        interaction: I,
    ) -> Result<Self, PaymentError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| PaymentError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_http_client(
            config,
            http,
            destination,
            seed,
            interaction,
        ))
    }

    /// Create a client that reuses an existing `reqwest::Client` connection pool.
    pub fn with_http_client(
        config: &PiConfig,
        http: reqwest::Client,
        destination: Option<String>,
        seed: Option<SeedPhrase>,
        interaction: I,
    ) -> Self {
        Self {
            http,
            timeout: config.http_timeout,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            authorize_url: config.authorize_url.clone(),
            oauth_scope: config.oauth_scope.clone(),
            credential: Credential::from_config(config),
            destination: destination
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            seed,
            interaction,
            token_store: Arc::new(EnvFileTokenStore::new(&config.env_file)),
            ledger: Arc::new(JsonFileLedger::new(&config.ledger_path)),
            auth_state: AuthState::HasCredential,
            pending_payment: None,
        }
    }

    pub fn with_token_store(mut self, token_store: Arc<dyn TokenStore>) -> Self {
        self.token_store = token_store;
        self
    }

    pub fn with_ledger(mut self, ledger: Arc<dyn TransactionLog>) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    pub fn has_seed(&self) -> bool {
        self.seed.is_some()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.credential.access_token()
    }

    pub fn auth_state(&self) -> AuthState {
        self.auth_state
    }

    /// Payment id prepared by this client and not yet completed.
    pub fn pending_payment(&self) -> Option<&str> {
        self.pending_payment.as_deref()
    }

    pub(crate) fn interaction(&self) -> &I {
        &self.interaction
    }

    /// Authenticated user profile (`GET /me`). Doubles as a token probe.
    pub async fn me(&mut self) -> Result<serde_json::Value, PaymentError> {
        let url = self.endpoint("/me");
        let mut attempt = Attempt::new("me");
        self.send_authorized(&mut attempt, |http| http.get(&url))
            .await
    }

    /// Available wallet balance, exactly as the provider reports it.
    ///
    /// `Ok(0.0)` means the wallet is empty; every failure is an `Err`.
    pub async fn get_balance(&mut self) -> Result<f64, PaymentError> {
        let mut attempt = Attempt::new("get_balance");

        let me_url = self.endpoint("/me");
        let user = self
            .send_authorized(&mut attempt, |http| http.get(&me_url))
            .await?;
        tracing::debug!(user = %user, "Token accepted");

        let balance_url = self.endpoint("/wallet/balance");
        let body = self
            .send_authorized(&mut attempt, |http| http.get(&balance_url))
            .await?;

        let balance = body
            .get("available_balance")
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| {
                PaymentError::InvalidResponse(format!(
                    "balance response has no numeric available_balance: {body}"
                ))
            })?;
        if balance < 0.0 {
            return Err(PaymentError::InvalidResponse(format!(
                "negative available_balance: {balance}"
            )));
        }

        tracing::info!(balance, "Current balance");
        Ok(balance)
    }

    /// Create a payment of `amount` to the destination address with a timestamped memo.
    pub async fn prepare_transaction(
        &mut self,
        amount: f64,
    ) -> Result<PreparedTransaction, PaymentError> {
        self.prepare_transaction_with_memo(amount, None).await
    }

    /// Create a payment with a caller-supplied memo. Blank memos fall back to
    /// the timestamped default.
    pub async fn prepare_transaction_with_memo(
        &mut self,
        amount: f64,
        memo: Option<&str>,
    ) -> Result<PreparedTransaction, PaymentError> {
        let recipient = self.destination.clone().ok_or_else(|| {
            PaymentError::Precondition("no destination wallet address provided".to_string())
        })?;
        if let Some(pending) = &self.pending_payment {
            return Err(PaymentError::Precondition(format!(
                "payment {pending} is prepared but not completed"
            )));
        }

        let memo = memo
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_memo(Utc::now()));
        let request = TransactionRequest::new(amount, recipient, memo)?;

        tracing::info!(
            amount = request.amount,
            recipient = %request.recipient,
            memo = %request.memo,
            "Preparing transaction"
        );

        let url = self.endpoint("/payments");
        let mut attempt = Attempt::new("prepare_transaction");
        let body = self
            .send_authorized(&mut attempt, |http| http.post(&url).json(&request))
            .await?;

        let prepared = PreparedTransaction::from_response(body)?;
        tracing::info!(payment_id = %prepared.payment_id, "Transaction prepared");
        self.pending_payment = Some(prepared.payment_id.clone());
        Ok(prepared)
    }

    /// Complete a prepared payment. The outcome, success or failure, is
    /// recorded in the ledger exactly once.
    pub async fn complete_transaction(
        &mut self,
        payment_id: &str,
    ) -> Result<TransactionResult, PaymentError> {
        let payment_id = payment_id.trim();
        if payment_id.is_empty() {
            return Err(PaymentError::Precondition(
                "payment id is required to complete a transaction".to_string(),
            ));
        }

        tracing::info!(payment_id, "Sending transaction");
        let url = self.endpoint(&format!(
            "/payments/{}/complete",
            urlencoding::encode(payment_id)
        ));
        let mut attempt = Attempt::new("complete_transaction");
        let outcome = self
            .send_authorized(&mut attempt, |http| http.post(&url))
            .await;

        // terminal either way for the outstanding payment
        if self.pending_payment.as_deref() == Some(payment_id) {
            self.pending_payment = None;
        }

        match outcome {
            Ok(raw) => {
                let result = TransactionResult {
                    success: true,
                    raw,
                    timestamp: Utc::now(),
                };
                self.record(true, result.raw.clone());
                tracing::info!(payment_id, "Transaction completed");
                Ok(result)
            }
            Err(e) => {
                self.record(
                    false,
                    serde_json::json!({
                        "payment_id": payment_id,
                        "status": e.status(),
                        "error": e.to_string(),
                    }),
                );
                tracing::error!(payment_id, error = %e, "Failed to send transaction");
                Err(e)
            }
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    fn record(&self, success: bool, data: serde_json::Value) {
        let entry = LogEntry {
            timestamp: Utc::now(),
            success,
            data,
            destination_wallet: self.destination.clone(),
        };
        if let Err(e) = self.ledger.record(&entry) {
            tracing::error!(error = %e, "Failed to log transaction");
        }
    }

    /// Send an authenticated request, recovering from one expired token.
    ///
    /// `build` produces the unauthenticated request; headers, bearer token and
    /// timeout are added here. A missing token, or a 401, runs the
    /// reauthentication protocol at most once per `attempt`; the request is
    /// then retried once. A 401 after reauthentication is final.
    async fn send_authorized<F>(
        &mut self,
        attempt: &mut Attempt,
        build: F,
    ) -> Result<serde_json::Value, PaymentError>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        if self.credential.access_token.is_none() && !attempt.reauthenticated {
            tracing::info!(op = attempt.op, "No access token configured, authenticating");
            attempt.reauthenticated = true;
            self.reauthenticate().await?;
        }

        let (status, body) = self.execute(attempt.op, &build).await?;
        if status != reqwest::StatusCode::UNAUTHORIZED || attempt.reauthenticated {
            return into_json(attempt.op, status, body);
        }

        tracing::warn!(
            op = attempt.op,
            "Access token expired or invalid, attempting to re-authenticate"
        );
        attempt.reauthenticated = true;
        if let Err(e) = self.reauthenticate().await {
            return Err(PaymentError::ReauthenticationFailed {
                body,
                source: Box::new(e),
            });
        }

        let (status, body) = self.execute(attempt.op, &build).await?;
        into_json(attempt.op, status, body)
    }

    async fn execute<F>(
        &self,
        op: &'static str,
        build: &F,
    ) -> Result<(reqwest::StatusCode, String), PaymentError>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let token = self.credential.access_token().ok_or_else(|| {
            PaymentError::Authentication("no access token available".to_string())
        })?;

        let resp = build(&self.http)
            .bearer_auth(token)
            .headers(json_headers())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(op, error = %e, "Request failed");
                PaymentError::Network(e)
            })?;

        let status = resp.status();
        tracing::info!(op, status = status.as_u16(), "Response received");
        let body = resp.text().await.map_err(PaymentError::Network)?;
        Ok((status, body))
    }

    /// Run the reauthentication protocol once.
    ///
    /// `HasCredential → AwaitingUserAuthorization → ExchangingCode → Authenticated`,
    /// or `Failed` from any step.
    async fn reauthenticate(&mut self) -> Result<(), PaymentError> {
        tracing::info!("Starting OAuth2 authentication flow");
        self.transition(AuthState::HasCredential);
        match self.run_authorization_code_flow().await {
            Ok(()) => {
                self.transition(AuthState::Authenticated);
                tracing::info!("Successfully obtained access token");
                Ok(())
            }
            Err(e) => {
                self.transition(AuthState::Failed);
                tracing::error!(error = %e, "Authentication failed");
                Err(e)
            }
        }
    }

    async fn run_authorization_code_flow(&mut self) -> Result<(), PaymentError> {
        let (client_id, client_secret) = match self.credential.client_pair() {
            Some((id, secret)) => (id.to_string(), secret.to_string()),
            None => {
                return Err(PaymentError::Configuration(
                    "missing OAuth2 credentials, set PI_CLIENT_ID and PI_CLIENT_SECRET".to_string(),
                ))
            }
        };
        let redirect_uri = self.credential.redirect_uri().to_string();

        let url = authorization_url(
            &self.authorize_url,
            &client_id,
            &redirect_uri,
            &self.oauth_scope,
        )?;

        self.transition(AuthState::AwaitingUserAuthorization);
        let code = self
            .interaction
            .authorization_code(url.as_str())
            .await
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                PaymentError::Authentication("no authorization code supplied".to_string())
            })?;

        self.transition(AuthState::ExchangingCode);
        tracing::info!("Exchanging authorization code for access token");
        let token_url = self.endpoint(TOKEN_PATH);
        let token = exchange_code(
            &self.http,
            &token_url,
            self.timeout,
            &TokenRequest {
                grant_type: "authorization_code",
                code: &code,
                client_id: &client_id,
                client_secret: &client_secret,
                redirect_uri: &redirect_uri,
            },
        )
        .await?;

        if let Err(e) = self.token_store.persist(&token) {
            tracing::warn!(error = %e, "Failed to persist access token, keeping it for this session only");
        }
        self.credential.access_token = Some(token);
        Ok(())
    }

    fn transition(&mut self, next: AuthState) {
        tracing::debug!(from = ?self.auth_state, to = ?next, "Auth state transition");
        self.auth_state = next;
    }
}

/// JSON content negotiation headers. Set with `headers()` so they replace,
/// rather than duplicate, the `Content-Type` that `json()` adds.
fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

/// Classify a response: 200 must carry JSON, anything else is an [`PaymentError::HttpStatus`].
fn into_json(
    op: &'static str,
    status: reqwest::StatusCode,
    body: String,
) -> Result<serde_json::Value, PaymentError> {
    if status != reqwest::StatusCode::OK {
        tracing::error!(op, status = status.as_u16(), body = %body, "Error response");
        return Err(PaymentError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|e| {
        PaymentError::InvalidResponse(format!("{op}: response is not valid JSON: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_phrase_blank_is_none_and_debug_redacts() {
        assert!(SeedPhrase::new("   ").is_none());
        let seed = SeedPhrase::new("word1 word2").unwrap();
        assert_eq!(seed.expose(), "word1 word2");
        assert_eq!(format!("{seed:?}"), "SeedPhrase([REDACTED])");
    }

    #[test]
    fn test_into_json_classifies_status() {
        let ok = into_json("t", reqwest::StatusCode::OK, r#"{"a":1}"#.to_string()).unwrap();
        assert_eq!(ok["a"], 1);

        let err = into_json("t", reqwest::StatusCode::OK, "<html>".to_string()).unwrap_err();
        assert!(matches!(err, PaymentError::InvalidResponse(_)));

        let err = into_json(
            "t",
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "boom".to_string(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PaymentError::HttpStatus { status: 500, ref body } if body == "boom"
        ));

        // 201 is not the 200 the provider promises
        let err = into_json("t", reqwest::StatusCode::CREATED, "{}".to_string()).unwrap_err();
        assert!(matches!(err, PaymentError::HttpStatus { status: 201, .. }));
    }
}
