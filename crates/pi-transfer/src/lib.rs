//! Pi Network payment client.
//!
//! Moves funds from a custodial Pi wallet to a destination address through the
//! Pi platform API. Calls are authorized with an OAuth2 bearer token; when the
//! provider answers 401 the client runs the authorization-code flow once,
//! asking the user for a code, and retries the failed request once.
//!
//! # Quick example
//!
//! ```no_run
//! use pi_transfer::{ConsoleInteraction, PaymentClient, PiConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), pi_transfer::PaymentError> {
//! let config = PiConfig::from_env()?;
//! let mut client = PaymentClient::new(
//!     &config,
//!     Some("GDESTINATIONADDRESS".to_string()),
//!     None,
//!     ConsoleInteraction::new(true),
//! )?;
//!
//! let balance = client.get_balance().await?;
//! let prepared = client.prepare_transaction(balance).await?;
//! let result = client.complete_transaction(&prepared.payment_id).await?;
//! println!("completed at {}", result.timestamp);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod interaction;
pub mod ledger;
pub mod payment;
pub mod token_store;
pub mod transfer;

pub use auth::{AuthState, Credential};
pub use client::{PaymentClient, SeedPhrase};
pub use config::{ConfigError, PiConfig};
pub use error::{ErrorKind, PaymentError};
pub use interaction::{ConsoleInteraction, NonInteractive, UserInteraction};
pub use ledger::{JsonFileLedger, LedgerError, LogEntry, MemoryLedger, TransactionLog};
pub use payment::{PreparedTransaction, TransactionRequest, TransactionResult};
pub use token_store::{EnvFileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};
pub use transfer::{CompletedTransfer, TransferOutcome};
