//! Product pricing range-overlap validation.
//!
//! A merchant's pricing table assigns fees to amount slabs per product. Each
//! slab is the half-open interval `[start_value, end_value)`; slabs of the same
//! product must not intersect. Slabs of different products never conflict.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::number::parse_finite;
use super::{RecordValidator, ValidationError};

/// One row of a merchant's pricing table as submitted by the form.
///
/// Bounds are kept as raw JSON because the form may send numbers or numeric
/// strings. Rows whose product is blank or whose bounds are not finite numbers
/// are not validated at all; this mirrors the portal form and lets malformed
/// rows through (see the `skipped_*` tests).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRow {
    /// 1-based row number shown to the user.
    #[serde(alias = "idx")]
    pub index: u32,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub fee_type: Option<String>,
    #[serde(default)]
    pub fee: Option<f64>,
    #[serde(default)]
    pub tax_fee_type: Option<String>,
    #[serde(default)]
    pub tax_fee: Option<f64>,
    #[serde(default)]
    pub start_value: Value,
    #[serde(default)]
    pub end_value: Value,
}

impl PricingRow {
    /// Build a row with numeric bounds and no fee details.
    pub fn new(index: u32, product: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            index,
            product: Some(product.into()),
            fee_type: None,
            fee: None,
            tax_fee_type: None,
            tax_fee: None,
            start_value: Value::from(start),
            end_value: Value::from(end),
        }
    }

    /// The product key and parsed bounds, or `None` if the row is skipped.
    fn bounds(&self) -> Option<(&str, f64, f64)> {
        let product = self.product.as_deref().filter(|p| !p.is_empty())?;
        let start = parse_finite(&self.start_value)?;
        let end = parse_finite(&self.end_value)?;
        Some((product, start, end))
    }
}

#[derive(Debug, Clone, Copy)]
struct AcceptedRange {
    start: f64,
    end: f64,
    index: u32,
}

impl AcceptedRange {
    /// Half-open intersection test: touching endpoints do not overlap.
    fn overlaps(&self, start: f64, end: f64) -> bool {
        !(end <= self.start || start >= self.end)
    }
}

/// Validate a pricing table in row order.
///
/// Fails on the first inverted or empty range, or on the first overlap with a
/// previously accepted range of the same product. When a row overlaps several
/// earlier rows the earliest accepted one is reported.
pub fn validate_pricing_rows(rows: &[PricingRow]) -> Result<(), ValidationError> {
    let mut accepted: HashMap<&str, Vec<AcceptedRange>> = HashMap::new();

    for row in rows {
        let Some((product, start, end)) = row.bounds() else {
            continue;
        };

        if start >= end {
            return Err(ValidationError::InvalidRange {
                index: row.index,
                start,
                end,
            });
        }

        let ranges = accepted.entry(product).or_default();
        if let Some(prior) = ranges.iter().find(|r| r.overlaps(start, end)) {
            return Err(ValidationError::OverlappingRange {
                index: row.index,
                conflicting_index: prior.index,
                product: product.to_string(),
            });
        }

        ranges.push(AcceptedRange {
            start,
            end,
            index: row.index,
        });
    }

    Ok(())
}

/// Borrowed view over a parent record's pricing rows.
#[derive(Debug, Clone, Copy)]
pub struct PricingTable<'a>(pub &'a [PricingRow]);

impl RecordValidator for PricingTable<'_> {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_pricing_rows(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn row(index: u32, product: &str, start: f64, end: f64) -> PricingRow {
        PricingRow::new(index, product, start, end)
    }

    #[test]
    fn adjacent_ranges_are_valid() {
        let rows = [row(1, "A", 0.0, 10.0), row(2, "A", 10.0, 20.0)];
        assert!(validate_pricing_rows(&rows).is_ok());
    }

    #[test]
    fn overlapping_ranges_cite_both_rows() {
        let rows = [row(1, "A", 0.0, 10.0), row(2, "A", 5.0, 15.0)];
        let err = validate_pricing_rows(&rows).unwrap_err();
        assert_eq!(
            err,
            ValidationError::OverlappingRange {
                index: 2,
                conflicting_index: 1,
                product: "A".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            r#"Row 2 conflicts with Row 1 for product "A". Overlapping ranges."#
        );
    }

    #[test]
    fn inverted_range_is_invalid() {
        let rows = [row(1, "A", 5.0, 3.0)];
        let err = validate_pricing_rows(&rows).unwrap_err();
        assert_matches!(err, ValidationError::InvalidRange { index: 1, .. });
        assert_eq!(
            err.to_string(),
            "Row 1: Start Value must be less than End Value"
        );
    }

    #[test]
    fn zero_width_range_is_invalid() {
        let rows = [row(4, "A", 7.0, 7.0)];
        assert_matches!(
            validate_pricing_rows(&rows),
            Err(ValidationError::InvalidRange { index: 4, .. })
        );
    }

    #[test]
    fn different_products_never_conflict() {
        let rows = [row(1, "A", 0.0, 10.0), row(2, "B", 0.0, 10.0)];
        assert!(validate_pricing_rows(&rows).is_ok());
    }

    #[test]
    fn contained_range_overlaps() {
        let rows = [row(1, "UPI", 0.0, 1000.0), row(2, "UPI", 100.0, 200.0)];
        assert_matches!(
            validate_pricing_rows(&rows),
            Err(ValidationError::OverlappingRange {
                index: 2,
                conflicting_index: 1,
                ..
            })
        );
    }

    #[test]
    fn first_accepted_conflict_is_reported() {
        // Row 3 overlaps both row 1 and row 2; row 1 comes first.
        let rows = [
            row(1, "A", 0.0, 10.0),
            row(2, "A", 10.0, 20.0),
            row(3, "A", 5.0, 15.0),
        ];
        assert_matches!(
            validate_pricing_rows(&rows),
            Err(ValidationError::OverlappingRange {
                index: 3,
                conflicting_index: 1,
                ..
            })
        );
    }

    #[test]
    fn invalid_range_stops_before_later_overlaps() {
        let rows = [
            row(1, "A", 0.0, 10.0),
            row(2, "A", 9.0, 1.0),
            row(3, "A", 5.0, 15.0),
        ];
        assert_matches!(
            validate_pricing_rows(&rows),
            Err(ValidationError::InvalidRange { index: 2, .. })
        );
    }

    #[test]
    fn row_order_changes_only_the_reported_pair() {
        let forward = [row(1, "A", 0.0, 10.0), row(2, "A", 5.0, 15.0)];
        let reversed = [row(2, "A", 5.0, 15.0), row(1, "A", 0.0, 10.0)];
        assert_matches!(
            validate_pricing_rows(&forward),
            Err(ValidationError::OverlappingRange {
                index: 2,
                conflicting_index: 1,
                ..
            })
        );
        assert_matches!(
            validate_pricing_rows(&reversed),
            Err(ValidationError::OverlappingRange {
                index: 1,
                conflicting_index: 2,
                ..
            })
        );
    }

    #[test]
    fn validation_is_idempotent() {
        let rows = [row(1, "A", 0.0, 10.0), row(2, "A", 5.0, 15.0)];
        assert_eq!(validate_pricing_rows(&rows), validate_pricing_rows(&rows));

        let ok = [row(1, "A", 0.0, 10.0)];
        assert_eq!(validate_pricing_rows(&ok), validate_pricing_rows(&ok));
    }

    #[test]
    fn empty_table_is_valid() {
        assert!(validate_pricing_rows(&[]).is_ok());
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let rows: Vec<PricingRow> = serde_json::from_value(json!([
            { "idx": 1, "product": "IMPS", "start_value": "0", "end_value": "500" },
            { "idx": 2, "product": "IMPS", "start_value": "250", "end_value": "1000" }
        ]))
        .unwrap();
        assert_matches!(
            validate_pricing_rows(&rows),
            Err(ValidationError::OverlappingRange {
                index: 2,
                conflicting_index: 1,
                ..
            })
        );
    }

    // The next tests pin down the form's lenient behaviour: malformed rows are
    // skipped instead of rejected. This is a known gap kept on purpose until
    // product owners decide otherwise.

    #[test]
    fn skipped_row_without_product() {
        let mut blank = row(2, "", 5.0, 3.0);
        blank.product = None;
        let rows = [row(1, "A", 0.0, 10.0), blank, row(3, "", 5.0, 3.0)];
        assert!(validate_pricing_rows(&rows).is_ok());
    }

    #[test]
    fn skipped_row_with_unparsable_bounds() {
        let mut bad = row(2, "A", 0.0, 0.0);
        bad.start_value = json!("abc");
        bad.end_value = json!(1);
        let mut missing = row(3, "A", 0.0, 0.0);
        missing.end_value = Value::Null;
        let rows = [row(1, "A", 0.0, 10.0), bad, missing];
        assert!(validate_pricing_rows(&rows).is_ok());
    }

    #[test]
    fn skipped_rows_do_not_block_later_overlaps() {
        let mut bad = row(2, "A", 0.0, 0.0);
        bad.start_value = json!("n/a");
        let rows = [row(1, "A", 0.0, 10.0), bad, row(3, "A", 9.0, 12.0)];
        assert_matches!(
            validate_pricing_rows(&rows),
            Err(ValidationError::OverlappingRange {
                index: 3,
                conflicting_index: 1,
                ..
            })
        );
    }

    #[test]
    fn pricing_table_implements_record_validator() {
        let rows = [row(1, "A", 0.0, 10.0), row(2, "A", 10.0, 20.0)];
        assert!(PricingTable(&rows).is_valid());

        let bad = [row(1, "A", 3.0, 1.0)];
        assert!(!PricingTable(&bad).is_valid());
    }
}
