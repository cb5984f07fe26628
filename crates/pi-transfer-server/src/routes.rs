use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{validate_amount, validate_destination, validate_seed_phrase};

#[derive(Debug, Deserialize)]
pub struct BalanceRequest {
    #[serde(default)]
    pub seed_phrase: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    #[serde(default)]
    pub seed_phrase: Option<String>,
    #[serde(default)]
    pub destination_wallet: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub memo: Option<String>,
}

/// GET /health - Health check endpoint
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "pi-transfer-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// POST /balance - Available balance of the wallet behind the configured token
pub async fn balance(
    state: web::Data<AppState>,
    body: web::Json<BalanceRequest>,
) -> Result<HttpResponse, ApiError> {
    let seed = validate_seed_phrase(body.seed_phrase.as_deref())?;

    let mut client = state.payment_client(None, seed);
    let balance = client.get_balance().await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "balance": balance })))
}

/// POST /transfer - Prepare and complete a payment in one call
pub async fn transfer(
    state: web::Data<AppState>,
    body: web::Json<TransferRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let seed = validate_seed_phrase(body.seed_phrase.as_deref())?;
    let destination = validate_destination(body.destination_wallet.as_deref())?;
    let amount = validate_amount(body.amount)?;
    let memo = body.memo.filter(|m| !m.trim().is_empty());

    tracing::info!(amount, destination = %destination, "Transfer requested");

    let mut client = state.payment_client(Some(destination), seed);
    let transfer = client.transfer_amount(amount, memo.as_deref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "payment_id": transfer.prepared.payment_id,
        "result": transfer.result.raw,
        "timestamp": transfer.result.timestamp,
    })))
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::InvalidRequest(format!("invalid JSON body: {err}")).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(16 * 1024)
            .error_handler(json_error_handler),
    )
    .route("/health", web::get().to(health))
    .route("/balance", web::post().to(balance))
    .route("/transfer", web::post().to(transfer));
}
