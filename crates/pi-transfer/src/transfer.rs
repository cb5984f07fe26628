//! End-to-end transfer flows built from the three client operations.

use crate::client::PaymentClient;
use crate::error::PaymentError;
use crate::interaction::UserInteraction;
use crate::payment::{PreparedTransaction, TransactionResult};

/// A payment that was prepared and then completed.
#[derive(Debug, Clone)]
pub struct CompletedTransfer {
    pub prepared: PreparedTransaction,
    pub result: TransactionResult,
}

/// How an interactive full-balance transfer ended, short of an error.
#[derive(Debug, Clone)]
pub enum TransferOutcome {
    Completed(CompletedTransfer),
    /// The provider reported a zero balance.
    NoFunds,
    /// The user did not confirm the transfer.
    Declined,
}

impl<I: UserInteraction> PaymentClient<I> {
    /// Move the whole available balance to the destination after asking the user.
    pub async fn transfer_full_balance(&mut self) -> Result<TransferOutcome, PaymentError> {
        let destination = self
            .destination()
            .ok_or_else(|| {
                PaymentError::Precondition("no destination wallet address provided".to_string())
            })?
            .to_string();

        let balance = self.get_balance().await?;
        tracing::info!(balance, "Available balance");
        if balance <= 0.0 {
            tracing::warn!("No coins available for transfer");
            return Ok(TransferOutcome::NoFunds);
        }

        let question =
            format!("Found {balance} Pi available. Proceed with transfer to {destination}?");
        if !self.interaction().confirm(&question).await {
            tracing::info!("Transaction cancelled by user");
            return Ok(TransferOutcome::Declined);
        }

        self.transfer_amount(balance, None)
            .await
            .map(TransferOutcome::Completed)
    }

    /// Prepare and complete a payment of `amount` without asking for confirmation.
    pub async fn transfer_amount(
        &mut self,
        amount: f64,
        memo: Option<&str>,
    ) -> Result<CompletedTransfer, PaymentError> {
        let prepared = self
            .prepare_transaction_with_memo(amount, memo)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to prepare transaction"))?;

        let result = self.complete_transaction(&prepared.payment_id).await?;
        tracing::info!(payment_id = %prepared.payment_id, "Transfer completed successfully");
        Ok(CompletedTransfer { prepared, result })
    }
}
