//! Error types.
//!
//! Classification never fails on its own: a query without evidence is an empty
//! result. Errors only come from the linguistic collaborator and from the
//! timeout wrapper around a whole classification call.

use std::time::Duration;
use thiserror::Error;

/// Failure reported by an [`Analyzer`](crate::Analyzer) implementation.
#[derive(Debug, Clone, Error)]
pub enum AnalyzerError {
    /// The backend is not loaded or not reachable.
    #[error("linguistic analyzer unavailable: {0}")]
    Unavailable(String),

    /// The backend was reached but could not process the text.
    #[error("linguistic analyzer failed: {0}")]
    Backend(String),
}

/// Failure of a timeout-bounded classification.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The deadline passed before classification finished; the query is
    /// unclassified.
    #[error("classification did not finish within {after:?}")]
    Timeout { after: Duration },

    /// The worker running the classification went away without answering.
    #[error("classification worker terminated without a result")]
    WorkerLost,

    #[error("could not start classification worker: {0}")]
    Spawn(#[from] std::io::Error),
}
