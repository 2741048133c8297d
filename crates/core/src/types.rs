/// Portal documents are identified by name (order ids, merchant emails).
pub type DocName = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
