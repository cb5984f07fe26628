use pi_transfer::SeedPhrase;

use crate::error::ApiError;

pub const MIN_TRANSFER_AMOUNT: f64 = 0.1;
pub const MIN_WALLET_LEN: usize = 32;
pub const MAX_WALLET_LEN: usize = 100;

pub fn validate_seed_phrase(seed: Option<&str>) -> Result<SeedPhrase, ApiError> {
    seed.and_then(SeedPhrase::new)
        .ok_or_else(|| ApiError::InvalidRequest("seed phrase is required".to_string()))
}

/// Wallet address length check; the provider does the real validation.
pub fn validate_destination(destination: Option<&str>) -> Result<String, ApiError> {
    let destination = destination.map(str::trim).unwrap_or_default();
    if destination.is_empty() {
        return Err(ApiError::InvalidRequest(
            "destination wallet is required".to_string(),
        ));
    }
    let len = destination.chars().count();
    if !(MIN_WALLET_LEN..=MAX_WALLET_LEN).contains(&len) {
        return Err(ApiError::InvalidRequest(format!(
            "destination wallet must be between {MIN_WALLET_LEN} and {MAX_WALLET_LEN} characters"
        )));
    }
    Ok(destination.to_string())
}

pub fn validate_amount(amount: Option<f64>) -> Result<f64, ApiError> {
    let amount =
        amount.ok_or_else(|| ApiError::InvalidRequest("amount is required".to_string()))?;
    if !amount.is_finite() || amount < MIN_TRANSFER_AMOUNT {
        return Err(ApiError::InvalidRequest(format!(
            "amount must be at least {MIN_TRANSFER_AMOUNT} Pi"
        )));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_seed_phrase() {
        assert!(validate_seed_phrase(Some("word ".repeat(12).trim())).is_ok());
        assert!(validate_seed_phrase(Some("   ")).is_err());
        assert!(validate_seed_phrase(None).is_err());
    }

    #[test]
    fn test_validate_destination() {
        assert!(validate_destination(Some(&"G".repeat(32))).is_ok());
        assert!(validate_destination(Some(&"G".repeat(100))).is_ok());
        assert!(validate_destination(Some(&"G".repeat(31))).is_err());
        assert!(validate_destination(Some(&"G".repeat(101))).is_err());
        assert!(validate_destination(Some("")).is_err());
        assert!(validate_destination(None).is_err());
        assert_eq!(
            validate_destination(Some(&format!(" {} ", "G".repeat(40)))).unwrap(),
            "G".repeat(40)
        );
    }

    #[test]
    fn test_validate_amount() {
        assert_eq!(validate_amount(Some(0.1)).unwrap(), 0.1);
        assert_eq!(validate_amount(Some(25.0)).unwrap(), 25.0);
        assert!(validate_amount(Some(0.09)).is_err());
        assert!(validate_amount(Some(-1.0)).is_err());
        assert!(validate_amount(Some(f64::NAN)).is_err());
        assert!(validate_amount(None).is_err());
    }
}
