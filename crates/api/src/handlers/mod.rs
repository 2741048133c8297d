//! Request handlers, one submodule per portal area.
//!
//! Handlers read from and mutate the [`PortalStore`](crate::store::PortalStore)
//! and map errors via [`AppError`](crate::error::AppError).

pub mod admin;
pub mod callbacks;
pub mod merchant;
pub mod session;

use axum::http::header;
use axum::response::{IntoResponse, Response};

/// Serve `body` as a downloadable CSV file.
pub(crate) fn csv_attachment(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}
