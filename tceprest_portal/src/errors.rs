//! Error types for the portal client.

/// Errors that can occur while fetching a report page.
///
/// The `Display` output is what ends up in a per-entity failure reason, so
/// the status variant renders as the bare `HTTP <code>` form.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// The portal answered with a non-success status.
    #[error("HTTP {status}")]
    HttpStatus { status: u16 },
    /// Connection, timeout, or body-read failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The configured base URL cannot be combined into a request URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// Errors raised while looking for the report table in a fetched page.
#[derive(thiserror::Error, Debug)]
pub enum LayoutError {
    #[error("table not found")]
    TableNotFound,
    #[error("invalid selector {selector}: {reason}")]
    Selector { selector: String, reason: String },
}
