use serde::Serialize;
use std::fmt;

#[macro_use]
mod macros;
mod analysis;
mod api;
mod engine;
mod error;
mod report;
mod rules;

pub use analysis::{AnalyzedToken, Analyzer, EntityKind, LexiconAnalyzer, PartOfSpeech};
pub use api::{Analysis, Classifier, Options, ScanDetails, classify, classify_with, prob_metadata};
pub use engine::{CaseCounts, CaseMetrics, ScanMetrics, ScanResult, sigmoid};
pub use error::{AnalyzerError, ClassifyError};
pub use report::{Channel, EventSink, NullSink, TracingSink};

// --- Cases ------------------------------------------------------------------

/// A query-intent category recognised by the grammar.
///
/// Variants are declared in scan order: counts and matches of a
/// [`ScanResult`] follow this order (except date ranges, which are
/// deduplicated and appended after every other case has been scanned).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Case {
    DateToken,
    WordNumber,
    SortUploadDate,
    LimitResults,
    FindByAuthor,
    FilterByDateRange,
    SearchByKeyword,
    AboutTopic,
    FilterByRelTime,
}

impl Case {
    pub const ALL: [Case; 9] = [
        Case::DateToken,
        Case::WordNumber,
        Case::SortUploadDate,
        Case::LimitResults,
        Case::FindByAuthor,
        Case::FilterByDateRange,
        Case::SearchByKeyword,
        Case::AboutTopic,
        Case::FilterByRelTime,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Case::DateToken => "DATE_TOKEN",
            Case::WordNumber => "WORD_NUMBER",
            Case::SortUploadDate => "SORT_UPLOAD_DATE",
            Case::LimitResults => "LIMIT_RESULTS",
            Case::FindByAuthor => "FIND_BY_AUTHOR",
            Case::FilterByDateRange => "FILTER_BY_DATE_RANGE",
            Case::SearchByKeyword => "SEARCH_BY_KEYWORD",
            Case::AboutTopic => "ABOUT_TOPIC",
            Case::FilterByRelTime => "FILTER_BY_REL_TIME",
        }
    }

    /// Kind of index that would have to answer a query showing this case.
    pub fn required_evidence(self) -> Option<EvidenceClass> {
        match self {
            Case::SortUploadDate
            | Case::FindByAuthor
            | Case::FilterByDateRange
            | Case::FilterByRelTime => Some(EvidenceClass::Metadata),
            Case::SearchByKeyword | Case::AboutTopic => Some(EvidenceClass::Content),
            Case::DateToken | Case::WordNumber | Case::LimitResults => None,
        }
    }

    pub(crate) fn flag(self) -> CaseSet {
        match self {
            Case::DateToken => CaseSet::DATE_TOKEN,
            Case::WordNumber => CaseSet::WORD_NUMBER,
            Case::SortUploadDate => CaseSet::SORT_UPLOAD_DATE,
            Case::LimitResults => CaseSet::LIMIT_RESULTS,
            Case::FindByAuthor => CaseSet::FIND_BY_AUTHOR,
            Case::FilterByDateRange => CaseSet::FILTER_BY_DATE_RANGE,
            Case::SearchByKeyword => CaseSet::SEARCH_BY_KEYWORD,
            Case::AboutTopic => CaseSet::ABOUT_TOPIC,
            Case::FilterByRelTime => CaseSet::FILTER_BY_REL_TIME,
        }
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags::bitflags! {
    /// A set of cases, used to enable a subset of the grammar and to
    /// summarise what a scan detected.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CaseSet: u16 {
        const DATE_TOKEN           = 1 << 0;
        const WORD_NUMBER          = 1 << 1;
        const SORT_UPLOAD_DATE     = 1 << 2;
        const LIMIT_RESULTS        = 1 << 3;
        const FIND_BY_AUTHOR       = 1 << 4;
        const FILTER_BY_DATE_RANGE = 1 << 5;
        const SEARCH_BY_KEYWORD    = 1 << 6;
        const ABOUT_TOPIC          = 1 << 7;
        const FILTER_BY_REL_TIME   = 1 << 8;
    }
}

impl CaseSet {
    pub fn has(self, case: Case) -> bool {
        self.contains(case.flag())
    }
}

impl From<Case> for CaseSet {
    fn from(case: Case) -> Self {
        case.flag()
    }
}

impl FromIterator<Case> for CaseSet {
    fn from_iter<I: IntoIterator<Item = Case>>(iter: I) -> Self {
        iter.into_iter().fold(CaseSet::empty(), |set, case| set | case.flag())
    }
}

/// Which index a case implies should answer the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceClass {
    Metadata,
    Content,
}

impl EvidenceClass {
    pub fn name(self) -> &'static str {
        match self {
            EvidenceClass::Metadata => "METADATA",
            EvidenceClass::Content => "CONTENT",
        }
    }
}

impl fmt::Display for EvidenceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// --- Matches ----------------------------------------------------------------

/// Sub-grammar of FILTER_BY_DATE_RANGE that produced a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DateLabel {
    /// "dal X al Y"
    #[serde(rename = "DAL_AL")]
    FromTo,
    /// "tra X e Y"
    #[serde(rename = "TRA_E")]
    Between,
    /// a single date anchored by a preposition ("prima del 2020")
    #[serde(rename = "SINGOLA")]
    SingleAnchor,
}

impl DateLabel {
    pub fn name(self) -> &'static str {
        match self {
            DateLabel::FromTo => "DAL_AL",
            DateLabel::Between => "TRA_E",
            DateLabel::SingleAnchor => "SINGOLA",
        }
    }
}

impl fmt::Display for DateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One retained piece of evidence: the case, the date sub-shape (date ranges
/// only) and the cleaned fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseMatch {
    pub case: Case,
    pub label: Option<DateLabel>,
    pub fragment: String,
}

impl CaseMatch {
    pub(crate) fn new(case: Case, fragment: impl Into<String>) -> Self {
        CaseMatch { case, label: None, fragment: fragment.into() }
    }

    pub(crate) fn dated(label: DateLabel, fragment: impl Into<String>) -> Self {
        CaseMatch { case: Case::FilterByDateRange, label: Some(label), fragment: fragment.into() }
    }
}

impl fmt::Display for CaseMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label {
            Some(label) => write!(f, "{} [{}]: \"{}\"", self.case, label, self.fragment),
            None => write!(f, "{}: \"{}\"", self.case, self.fragment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_flags_are_distinct() {
        let all: CaseSet = Case::ALL.iter().copied().collect();
        assert_eq!(all, CaseSet::all());
        assert_eq!(all.bits().count_ones() as usize, Case::ALL.len());
    }

    #[test]
    fn evidence_annotations() {
        assert_eq!(Case::FindByAuthor.required_evidence(), Some(EvidenceClass::Metadata));
        assert_eq!(Case::AboutTopic.required_evidence(), Some(EvidenceClass::Content));
        assert_eq!(Case::WordNumber.required_evidence(), None);
    }

    #[test]
    fn match_display_includes_label() {
        let m = CaseMatch::dated(DateLabel::Between, "tra marzo e aprile");
        assert_eq!(m.to_string(), "FILTER_BY_DATE_RANGE [TRA_E]: \"tra marzo e aprile\"");
        let m = CaseMatch::new(Case::SearchByKeyword, "bilancio");
        assert_eq!(m.to_string(), "SEARCH_BY_KEYWORD: \"bilancio\"");
    }
}
