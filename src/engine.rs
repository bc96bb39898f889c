//! Scanning engine.
//!
//! ```text
//! text ── Scanner::scan ──┬─ every case, every pattern, left to right
//!        (scanner.rs)     │    ├─ FIND_BY_AUTHOR ── clean_author ──┐ (cleaners.rs)
//!                         │    ├─ ABOUT_TOPIC ───── clean_topic ───┤
//!                         │    ├─ FILTER_BY_DATE_RANGE ─ buffer    │
//!                         │    └─ everything else ─────────────────┤
//!                         │                                        v
//!                         └─ dedup_date_fragments (dedup.rs) ──> ScanResult
//!
//! text ── metadata_bias (bias.rs) ──> probability in (0, 1)
//! ```
//!
//! The scanner and the bias scorer are independent: the probability is an
//! auxiliary signal and never decides which matches are reported.
//!
//! ## Responsibilities by module
//!
//! - `scanner.rs`: runs the compiled grammar, applies per-case cleanup and
//!   assembles the [`ScanResult`].
//! - `dedup.rs`: collapses overlapping date-range fragments.
//! - `cleaners.rs`: turns author/topic spans into normalised payloads with the
//!   linguistic collaborator.
//! - `bias.rs`: sigmoid scorer over date/relative-time signals and lemma
//!   weights.
//! - `metrics.rs`: optional per-case timing and hit counts.

#[path = "engine/bias.rs"]
mod bias;
#[path = "engine/cleaners.rs"]
mod cleaners;
#[path = "engine/dedup.rs"]
mod dedup;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/scanner.rs"]
mod scanner;

pub use bias::sigmoid;
pub(crate) use bias::metadata_bias;
pub use metrics::{CaseMetrics, ScanMetrics};
pub(crate) use scanner::Scanner;
pub use scanner::{CaseCounts, ScanResult};
