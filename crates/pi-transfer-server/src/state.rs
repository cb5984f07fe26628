use std::sync::Arc;

use pi_transfer::{
    EnvFileTokenStore, JsonFileLedger, NonInteractive, PaymentClient, PaymentError, PiConfig,
    SeedPhrase, TokenStore, TransactionLog,
};

use crate::config::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PiConfig>,
    pub http_client: reqwest::Client,
    pub token_store: Arc<dyn TokenStore>,
    pub ledger: Arc<dyn TransactionLog>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.pi.http_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| PaymentError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_parts(
            config.pi.clone(),
            http_client,
            Arc::new(EnvFileTokenStore::new(&config.pi.env_file)),
            Arc::new(JsonFileLedger::new(&config.pi.ledger_path)),
        ))
    }

    pub fn with_parts(
        config: PiConfig,
        http_client: reqwest::Client,
        token_store: Arc<dyn TokenStore>,
        ledger: Arc<dyn TransactionLog>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            http_client,
            token_store,
            ledger,
        }
    }

    /// A fresh client for one request. Nobody is around to type an
    /// authorization code, so reauthentication fails fast.
    pub fn payment_client(
        &self,
        destination: Option<String>,
        seed: SeedPhrase,
    ) -> PaymentClient<NonInteractive> {
        PaymentClient::with_http_client(
            &self.config,
            self.http_client.clone(),
            destination,
            Some(seed),
            NonInteractive,
        )
        .with_token_store(self.token_store.clone())
        .with_ledger(self.ledger.clone())
    }
}
