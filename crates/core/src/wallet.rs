//! Merchant wallets and balance movements.
//!
//! Every merchant holds a Main wallet (spendable) and a Lean wallet (held
//! funds). Adjustments move money between the two; admin recharges credit the
//! Main wallet through a virtual-account log entry.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;
use crate::validation::{AdjustmentRequest, RecordValidator, ValidationError};

/// Which of a merchant's wallets a movement touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletKind {
    Main,
    Lean,
}

impl WalletKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WalletKind::Main => "Main",
            WalletKind::Lean => "Lean",
        }
    }

    /// The wallet on the other side of a transfer into `self`.
    pub fn counterpart(self) -> WalletKind {
        match self {
            WalletKind::Main => WalletKind::Lean,
            WalletKind::Lean => WalletKind::Main,
        }
    }
}

/// Balances of both wallets for one merchant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletBalances {
    pub main: f64,
    pub lean: f64,
}

impl WalletBalances {
    pub fn get(&self, kind: WalletKind) -> f64 {
        match kind {
            WalletKind::Main => self.main,
            WalletKind::Lean => self.lean,
        }
    }

    fn get_mut(&mut self, kind: WalletKind) -> &mut f64 {
        match kind {
            WalletKind::Main => &mut self.main,
            WalletKind::Lean => &mut self.lean,
        }
    }
}

/// Final state of an applied adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjustmentStatus {
    Success,
    Failed,
}

/// Result of applying an adjustment to a merchant's balances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentOutcome {
    pub status: AdjustmentStatus,
    pub balances: WalletBalances,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Apply a validated adjustment.
///
/// The request is validated first; an invalid request never touches the
/// balances. Money flows into `request.to` from its counterpart wallet. If the
/// source wallet cannot cover the amount the adjustment is recorded as
/// [`AdjustmentStatus::Failed`] and the balances are returned unchanged.
pub fn apply_adjustment(
    balances: WalletBalances,
    request: &AdjustmentRequest,
) -> Result<AdjustmentOutcome, ValidationError> {
    request.validate()?;

    let source = request.to.counterpart();
    if balances.get(source) < request.amount {
        return Ok(AdjustmentOutcome {
            status: AdjustmentStatus::Failed,
            balances,
            message: Some(format!(
                "{} wallet doesn't have this much money",
                source.as_str()
            )),
        });
    }

    let mut updated = balances;
    *updated.get_mut(source) -= request.amount;
    *updated.get_mut(request.to) += request.amount;

    Ok(AdjustmentOutcome {
        status: AdjustmentStatus::Success,
        balances: updated,
        message: None,
    })
}

/// Reject non-positive admin recharge amounts.
pub fn validate_credit_amount(amount: f64) -> Result<(), CoreError> {
    if amount.is_nan() || amount <= 0.0 {
        return Err(CoreError::Validation("Amount must be positive".into()));
    }
    Ok(())
}

/// Reference number stamped on admin recharge log entries.
pub fn recharge_utr(now: Timestamp) -> String {
    format!("ADM-RECH-{}", now.timestamp())
}
