//! Library layer for tceprest: the extraction pipeline over the TCE-CE
//! accountability portal, its SQLite-backed collaborators, and input
//! validation.
//!
//! Wraps the `tceprest_portal` crate with rate limiting, row normalization
//! and filtering, progress reporting, and bulk persistence.

pub mod cancel;
pub mod db;
pub mod error;
pub mod extract;
pub mod persist;
pub mod pipeline;
pub mod progress;
pub mod rate_limiter;
pub mod store;
pub mod types;
pub mod validation;

pub use tceprest_portal;
pub use tceprest_portal::{FetchError, LayoutError, ReportClient, ReportCode};

pub use cancel::CancelToken;
pub use db::{Db, DbError};
pub use error::{RunError, TceprestError};
pub use extract::{Extraction, Extractor};
pub use persist::{persist, PersistFailure, PersistReport};
pub use pipeline::{Pipeline, RunSummary};
pub use progress::{
    BufferedProgress, ProgressEvent, ProgressMessage, ProgressSink, StreamedProgress,
};
pub use rate_limiter::RateLimiter;
pub use store::{Registry, ResultStore, StoreError, StoredRow};
pub use types::{Entity, EntityRef, ExtractionOutcome, ReportRow, RunFilter};
