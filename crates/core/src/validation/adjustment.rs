//! Adjustment consistency check.
//!
//! An adjustment moves money between a merchant's two wallets. The source and
//! destination must differ and the amount must be at least one unit.

use serde::{Deserialize, Serialize};

use super::{RecordValidator, ValidationError};
use crate::types::DocName;
use crate::wallet::WalletKind;

/// Smallest amount a transfer may move.
pub const MIN_TRANSFER_AMOUNT: f64 = 1.0;

/// Validate a transfer between two identified accounts.
///
/// The transfer check runs before the amount check. A `NaN` amount is
/// rejected as an invalid amount.
pub fn validate_adjustment(from_id: &str, to_id: &str, amount: f64) -> Result<(), ValidationError> {
    if from_id == to_id {
        return Err(ValidationError::InvalidTransfer {
            id: from_id.to_string(),
        });
    }
    if amount.is_nan() || amount < MIN_TRANSFER_AMOUNT {
        return Err(ValidationError::InvalidAmount { amount });
    }
    Ok(())
}

/// A wallet-to-wallet adjustment submitted for one merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRequest {
    pub merchant_id: DocName,
    pub from: WalletKind,
    pub to: WalletKind,
    pub amount: f64,
}

impl RecordValidator for AdjustmentRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_adjustment(self.from.as_str(), self.to.as_str(), self.amount)
    }
}
