//! Error types for the library layer.

use std::fmt;

use tceprest_portal::LayoutError;

use crate::extract::Extraction;
use crate::persist::PersistFailure;
use crate::store::StoreError;

/// Errors produced while setting up a run: bad input or a locator that
/// cannot be built.
#[derive(Debug)]
pub enum TceprestError {
    /// User-provided input failed validation.
    InvalidInput(String),
    /// The table selectors failed to compile.
    Layout(LayoutError),
}

impl fmt::Display for TceprestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::Layout(e) => write!(f, "Layout error: {}", e),
        }
    }
}

impl std::error::Error for TceprestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Layout(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LayoutError> for TceprestError {
    fn from(e: LayoutError) -> Self {
        Self::Layout(e)
    }
}

/// Run-level failures. Per-entity fetch and layout problems never end up
/// here; they are recorded as outcomes and the run moves on.
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    /// The active roster could not be listed. Nothing was fetched.
    #[error("failed to list active entities: {0}")]
    Registry(#[source] StoreError),
    /// Extraction finished but the rows could not all be stored. The
    /// extracted rows and outcomes are returned untouched so the caller can
    /// retry persistence.
    #[error("{failure}")]
    Persistence {
        extraction: Box<Extraction>,
        #[source]
        failure: PersistFailure,
    },
}
