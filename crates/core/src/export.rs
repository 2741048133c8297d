//! CSV exports of the order, ledger and VAN-log tables.
//!
//! Admin exports span every merchant and carry an extra Merchant column.

use crate::records::{LedgerEntry, Order, VanLog};
use crate::types::Timestamp;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const ORDER_HEADERS: &[&str] = &[
    "Order ID",
    "Date",
    "Customer",
    "Order Amount",
    "Tax",
    "Transaction Amount",
    "Fee",
    "Status",
    "UTR",
    "Client Ref ID",
];

const LEDGER_HEADERS: &[&str] = &[
    "Ledger ID",
    "Order ID",
    "Client Ref ID",
    "Type",
    "TXN Amount",
    "Opening Balance",
    "Closing Balance",
    "Date",
];

const VAN_LOG_HEADERS: &[&str] = &[
    "Transaction ID",
    "Account Number",
    "Amount",
    "Type",
    "UTR",
    "Status",
    "Date",
];

/// Download name for an export, e.g. `Orders_20250131_101500.csv`.
pub fn export_filename(prefix: &str, now: Timestamp) -> String {
    format!("{prefix}_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

pub fn export_orders_csv(orders: &[Order]) -> String {
    let mut csv = header_line(ORDER_HEADERS);
    for order in orders {
        push_row(&mut csv, &order_fields(order));
    }
    csv
}

/// Orders of every merchant, with the merchant after the order id.
pub fn export_all_orders_csv(orders: &[Order]) -> String {
    let mut csv = header_line(&with_merchant_column(ORDER_HEADERS));
    for order in orders {
        let mut fields = order_fields(order);
        fields.insert(1, order.merchant.clone());
        push_row(&mut csv, &fields);
    }
    csv
}

fn order_fields(order: &Order) -> Vec<String> {
    vec![
        order.id.clone(),
        order.created_at.format(DATE_FORMAT).to_string(),
        order.customer_name.clone().unwrap_or_default(),
        order.order_amount.to_string(),
        order.tax.unwrap_or(0.0).to_string(),
        order
            .transaction_amount
            .unwrap_or(order.order_amount)
            .to_string(),
        order.fee.to_string(),
        order.status.clone(),
        order.utr.clone().unwrap_or_default(),
        order.client_ref_id.clone().unwrap_or_default(),
    ]
}

pub fn export_ledger_csv(entries: &[LedgerEntry]) -> String {
    let mut csv = header_line(LEDGER_HEADERS);
    for entry in entries {
        push_row(&mut csv, &ledger_fields(entry));
    }
    csv
}

/// Ledger entries of every merchant, with the owner after the ledger id.
pub fn export_all_ledger_csv(entries: &[LedgerEntry]) -> String {
    let mut csv = header_line(&with_merchant_column(LEDGER_HEADERS));
    for entry in entries {
        let mut fields = ledger_fields(entry);
        fields.insert(1, entry.owner.clone());
        push_row(&mut csv, &fields);
    }
    csv
}

fn ledger_fields(entry: &LedgerEntry) -> Vec<String> {
    vec![
        entry.id.clone(),
        entry.order_id.clone().unwrap_or_default(),
        entry.client_ref_id.clone().unwrap_or_default(),
        entry.transaction_type.clone(),
        entry.transaction_amount.to_string(),
        entry.opening_balance.to_string(),
        entry.closing_balance.to_string(),
        entry.created_at.format(DATE_FORMAT).to_string(),
    ]
}

fn with_merchant_column<'a>(headers: &[&'a str]) -> Vec<&'a str> {
    let mut headers = headers.to_vec();
    headers.insert(1, "Merchant");
    headers
}

pub fn export_van_logs_csv(logs: &[VanLog]) -> String {
    let mut csv = header_line(VAN_LOG_HEADERS);
    for log in logs {
        push_row(
            &mut csv,
            &[
                log.id.clone(),
                log.account_number.clone(),
                log.amount.to_string(),
                log.transaction_type.clone(),
                log.utr.clone().unwrap_or_default(),
                log.status.clone(),
                log.created_at.format(DATE_FORMAT).to_string(),
            ],
        );
    }
    csv
}

fn header_line(headers: &[&str]) -> String {
    let mut line = headers.join(",");
    line.push('\n');
    line
}

fn push_row(out: &mut String, fields: &[String]) {
    let escaped: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
    out.push_str(&escaped.join(","));
    out.push('\n');
}

/// Quote a field if it contains a comma, quote or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 1, 31, 10, 15, 0).unwrap()
    }

    #[test]
    fn order_export_defaults_missing_amounts() {
        let order = Order {
            id: "ORD-1".into(),
            merchant: "acme@example.com".into(),
            customer_name: Some("Iyer, R.".into()),
            order_amount: 250.5,
            tax: None,
            transaction_amount: None,
            fee: 2.5,
            status: "Processed".into(),
            utr: Some("UTR1".into()),
            client_ref_id: None,
            created_at: at(),
        };
        let csv = export_orders_csv(&[order]);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Order ID,Date,Customer,Order Amount,Tax,Transaction Amount,Fee,Status,UTR,Client Ref ID")
        );
        assert_eq!(
            lines.next(),
            Some("ORD-1,2025-01-31 10:15:00,\"Iyer, R.\",250.5,0,250.5,2.5,Processed,UTR1,")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn ledger_export_columns() {
        let entry = LedgerEntry {
            id: "LED-1".into(),
            owner: "acme@example.com".into(),
            order_id: Some("ORD-1".into()),
            transaction_type: "Debit".into(),
            transaction_amount: 100.0,
            opening_balance: 500.0,
            closing_balance: 400.0,
            client_ref_id: Some("REF-9".into()),
            created_at: at(),
        };
        let csv = export_ledger_csv(&[entry]);
        assert_eq!(
            csv,
            "Ledger ID,Order ID,Client Ref ID,Type,TXN Amount,Opening Balance,Closing Balance,Date\n\
             LED-1,ORD-1,REF-9,Debit,100,500,400,2025-01-31 10:15:00\n"
        );
    }

    #[test]
    fn admin_ledger_export_has_merchant_column() {
        let entry = LedgerEntry {
            id: "LED-1".into(),
            owner: "acme@example.com".into(),
            order_id: None,
            transaction_type: "Credit".into(),
            transaction_amount: 50.0,
            opening_balance: 0.0,
            closing_balance: 50.0,
            client_ref_id: None,
            created_at: at(),
        };
        let csv = export_all_ledger_csv(&[entry]);
        assert_eq!(
            csv,
            "Ledger ID,Merchant,Order ID,Client Ref ID,Type,TXN Amount,Opening Balance,Closing Balance,Date\n\
             LED-1,acme@example.com,,,Credit,50,0,50,2025-01-31 10:15:00\n"
        );
    }

    #[test]
    fn admin_order_export_has_merchant_column() {
        let order = Order {
            id: "ORD-7".into(),
            merchant: "globex@example.com".into(),
            customer_name: None,
            order_amount: 10.0,
            tax: Some(1.0),
            transaction_amount: Some(12.0),
            fee: 1.0,
            status: "Pending".into(),
            utr: None,
            client_ref_id: Some("C-1".into()),
            created_at: at(),
        };
        let csv = export_all_orders_csv(&[order]);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Order ID,Merchant,Date,Customer,Order Amount,Tax,Transaction Amount,Fee,Status,UTR,Client Ref ID")
        );
        assert_eq!(
            lines.next(),
            Some("ORD-7,globex@example.com,2025-01-31 10:15:00,,10,1,12,1,Pending,,C-1")
        );
    }

    #[test]
    fn van_log_export_columns() {
        let log = VanLog {
            id: "VAN-1".into(),
            merchant: "acme@example.com".into(),
            account_number: "ISW0001".into(),
            amount: 1000.0,
            transaction_type: "Credit".into(),
            utr: None,
            status: "Success".into(),
            remitter_name: None,
            remitter_account_number: None,
            remitter_ifsc_code: None,
            opening_balance: None,
            closing_balance: None,
            created_at: at(),
        };
        let csv = export_van_logs_csv(&[log]);
        assert!(csv.starts_with("Transaction ID,Account Number,Amount,Type,UTR,Status,Date\n"));
        assert!(csv.ends_with("VAN-1,ISW0001,1000,Credit,,Success,2025-01-31 10:15:00\n"));
    }

    #[test]
    fn empty_export_is_header_only() {
        assert_eq!(export_van_logs_csv(&[]).lines().count(), 1);
    }

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(escape_field("plain"), "plain");
    }

    #[test]
    fn filename_is_timestamped() {
        assert_eq!(export_filename("Orders", at()), "Orders_20250131_101500.csv");
    }
}
