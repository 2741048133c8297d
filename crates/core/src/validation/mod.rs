//! Record validators.
//!
//! Every validator here runs before a record is committed. A failure rejects
//! the whole record; nothing is partially applied. Validators are pure and
//! hold no state between calls, so concurrent saves need no coordination.

pub mod adjustment;
mod number;
pub mod pricing;

pub use adjustment::{validate_adjustment, AdjustmentRequest, MIN_TRANSFER_AMOUNT};
pub use pricing::{validate_pricing_rows, PricingRow, PricingTable};

/// A candidate record that can check its own consistency before persisting.
pub trait RecordValidator {
    fn validate(&self) -> Result<(), ValidationError>;

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// User-input errors raised by the record validators.
///
/// The `Display` text is shown to the submitting user as-is.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Row {index}: Start Value must be less than End Value")]
    InvalidRange { index: u32, start: f64, end: f64 },

    #[error(
        "Row {index} conflicts with Row {conflicting_index} for product \"{product}\". Overlapping ranges."
    )]
    OverlappingRange {
        index: u32,
        conflicting_index: u32,
        product: String,
    },

    #[error("From and To cannot be the same.")]
    InvalidTransfer { id: String },

    #[error("Amount cannot be less than 1.")]
    InvalidAmount { amount: f64 },
}
