mod client;
mod errors;
pub mod normalize;
mod table;
pub mod types;
pub use self::client::{ReportClient, DEFAULT_BASE_URL};
pub use self::errors::{FetchError, LayoutError};
pub use self::table::TableLocator;
pub use self::types::{ParseReportCodeError, RawReportRow, ReportCode};
