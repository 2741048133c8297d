//! Shared query parameter types for API handlers.

use portal_core::listing::ListingFilter;
use portal_core::pagination::PageRequest;
use serde::Deserialize;

/// Table listing parameters (`?page=&page_size=&status=&type=&from_date=&to_date=`).
///
/// Admin tables may also narrow to one merchant with `?merchant=`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub merchant: Option<String>,
}

impl ListParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }

    pub fn filter(&self) -> ListingFilter {
        ListingFilter {
            status: self.status.clone(),
            transaction_type: self.transaction_type.clone(),
            from_date: self.from_date.clone(),
            to_date: self.to_date.clone(),
        }
    }
}
