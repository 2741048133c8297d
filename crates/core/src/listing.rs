//! Filters shared by the order, ledger and VAN-log tables.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::records::{LedgerEntry, Order, Transaction, VanLog};
use crate::types::Timestamp;

/// Status value the portal dropdown sends for "no status filter".
pub const ALL_STATUS: &str = "All Status";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Raw filter values as sent by a portal table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingFilter {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "type")]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub to_date: Option<String>,
}

/// A [`ListingFilter`] with its dates parsed and sentinels removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedFilter {
    pub status: Option<String>,
    pub transaction_type: Option<String>,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

impl ListingFilter {
    /// Parse dates and drop empty or "All Status" values.
    pub fn resolve(&self) -> Result<ResolvedFilter, CoreError> {
        Ok(ResolvedFilter {
            status: non_empty(self.status.as_deref()).filter(|s| s != ALL_STATUS),
            transaction_type: non_empty(self.transaction_type.as_deref()),
            from: parse_bound(self.from_date.as_deref(), "from_date")?,
            to: parse_bound(self.to_date.as_deref(), "to_date")?,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_bound(value: Option<&str>, field: &str) -> Result<Option<NaiveDateTime>, CoreError> {
    match non_empty(value) {
        None => Ok(None),
        Some(raw) => parse_filter_date(&raw).map(Some).ok_or_else(|| {
            CoreError::Validation(format!("{field} is not a valid date: {raw}"))
        }),
    }
}

/// Parse a filter date.
///
/// Accepts `datetime-local` input (`2025-01-31T10:15`), the same with a space
/// instead of `T`, optional seconds, or a bare date (midnight).
pub fn parse_filter_date(raw: &str) -> Option<NaiveDateTime> {
    let cleaned = raw.trim().replace('T', " ");
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&cleaned, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(&cleaned, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// A table row the listing filters understand.
pub trait Listable {
    fn status(&self) -> Option<&str> {
        None
    }

    fn transaction_type(&self) -> Option<&str> {
        None
    }

    fn created_at(&self) -> Timestamp;
}

impl ResolvedFilter {
    /// Whether a row passes every active filter. Date bounds are inclusive.
    pub fn matches<T: Listable>(&self, row: &T) -> bool {
        if let Some(status) = &self.status {
            if row.status() != Some(status.as_str()) {
                return false;
            }
        }
        if let Some(kind) = &self.transaction_type {
            if row.transaction_type() != Some(kind.as_str()) {
                return false;
            }
        }
        let created = row.created_at().naive_utc();
        if self.from.is_some_and(|from| created < from) {
            return false;
        }
        if self.to.is_some_and(|to| created > to) {
            return false;
        }
        true
    }
}

/// Keep matching rows, newest first.
pub fn apply_filter<T: Listable + Clone>(rows: &[T], filter: &ResolvedFilter) -> Vec<T> {
    let mut kept: Vec<T> = rows.iter().filter(|r| filter.matches(*r)).cloned().collect();
    kept.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
    kept
}

impl Listable for Order {
    fn status(&self) -> Option<&str> {
        Some(&self.status)
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

impl Listable for LedgerEntry {
    fn transaction_type(&self) -> Option<&str> {
        Some(&self.transaction_type)
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

impl Listable for Transaction {
    fn status(&self) -> Option<&str> {
        Some(&self.status)
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

impl Listable for VanLog {
    fn status(&self) -> Option<&str> {
        Some(&self.status)
    }

    fn transaction_type(&self) -> Option<&str> {
        Some(&self.transaction_type)
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
