//! Scan metrics.
//!
//! Collected only by `Scanner::scan_with_metrics`; the plain scan path does
//! not time anything. Used by the CLI debug report to show which cases fired,
//! how many raw hits each pattern set produced, and how many survived cleanup.

use crate::Case;
use serde::Serialize;
use std::time::Duration;

/// Timing and hit counts for one case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseMetrics {
    pub case: Case,
    /// Number of patterns evaluated for the case.
    pub patterns: usize,
    /// Regex hits before any cleanup or deduplication.
    pub raw_hits: usize,
    /// Matches reported for the case.
    pub kept: usize,
    pub duration: Duration,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct ScanMetrics {
    /// Total elapsed time for the scan (patterns + cleanup + dedup).
    pub total: Duration,
    /// One entry per enabled case, in scan order.
    pub cases: Vec<CaseMetrics>,
    /// Time spent collapsing date-range fragments.
    pub dedup: Duration,
    /// Calls made to the linguistic collaborator by the cleaners.
    pub analyzer_calls: usize,
    /// Calls that failed; their matches were skipped.
    pub analyzer_failures: usize,
}

impl ScanMetrics {
    pub(crate) fn case_mut(&mut self, case: Case) -> Option<&mut CaseMetrics> {
        self.cases.iter_mut().find(|m| m.case == case)
    }
}
