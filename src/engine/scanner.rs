//! Case scanner.
//!
//! Runs every enabled case's patterns over the raw text and turns regex hits
//! into [`CaseMatch`]es:
//!
//! ```text
//! case                  raw hit ──> retained as
//! ─────────────────────────────────────────────────────────────────────────
//! FIND_BY_AUTHOR        span ─ clean_author ─> names | dropped if none
//! FILTER_BY_DATE_RANGE  (label, span) ─> buffer ─> dedup after all cases
//! WORD_NUMBER           span, dropped if blank
//! ABOUT_TOPIC           span ─ clean_topic ──> content words | dropped if none
//! SEARCH_BY_KEYWORD     quoted/bare term group (no introducer, no quotes)
//! everything else       trimmed span
//! ```
//!
//! Hits of one pattern never overlap. After each retained hit the search
//! resumes at its retained end, which for topic runs can be earlier than the
//! regex match end (the run is cut at the first function word).
//!
//! The date buffer lives on the stack of a single [`Scanner::scan`] call, so
//! concurrent scans share nothing but the read-only grammar.

use super::cleaners::{clean_author, clean_topic};
use super::dedup::{DateFragment, dedup_date_fragments};
use super::metrics::{CaseMetrics, ScanMetrics};
use crate::report::{Channel, EventSink};
use crate::rules::cases::Extract;
use crate::rules::{CasePattern, Registry};
use crate::{Analyzer, Case, CaseMatch, CaseSet};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::time::Instant;

// --- Results ----------------------------------------------------------------

/// Occurrences per case, in first-detected order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseCounts(Vec<(Case, usize)>);

impl CaseCounts {
    pub fn get(&self, case: Case) -> usize {
        self.0.iter().find(|(c, _)| *c == case).map_or(0, |(_, n)| *n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Case, usize)> + '_ {
        self.0.iter().copied()
    }

    /// Number of distinct cases detected.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn increment(&mut self, case: Case) {
        match self.0.iter_mut().find(|(c, _)| *c == case) {
            Some((_, n)) => *n += 1,
            None => self.0.push((case, 1)),
        }
    }
}

impl Serialize for CaseCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (case, n) in &self.0 {
            map.serialize_entry(case, n)?;
        }
        map.end()
    }
}

/// Everything a scan detected. Immutable once produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ScanResult {
    counts: CaseCounts,
    matches: Vec<CaseMatch>,
}

impl ScanResult {
    pub fn counts(&self) -> &CaseCounts {
        &self.counts
    }

    pub fn matches(&self) -> &[CaseMatch] {
        &self.matches
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn detected(&self) -> CaseSet {
        self.counts.iter().map(|(case, _)| case).collect()
    }

    /// Fragments reported for `case`, in report order.
    pub fn fragments(&self, case: Case) -> Vec<&str> {
        self.matches.iter().filter(|m| m.case == case).map(|m| m.fragment.as_str()).collect()
    }

    /// `"Casi rilevati: A, B x2"`, or `"Casi rilevati: nessuno"`.
    pub fn summary_line(&self) -> String {
        if self.counts.is_empty() {
            return "Casi rilevati: nessuno".to_string();
        }
        let cases: Vec<String> = self
            .counts
            .iter()
            .map(|(case, n)| if n > 1 { format!("{case} x{n}") } else { case.to_string() })
            .collect();
        format!("Casi rilevati: {}", cases.join(", "))
    }

    /// The summary line followed by one `" ↳  CASE [LABEL]: "fragment""`
    /// line per match.
    pub fn report_lines(&self) -> Vec<String> {
        std::iter::once(self.summary_line()).chain(self.matches.iter().map(|m| format!(" ↳  {m}"))).collect()
    }

    pub(crate) fn push(&mut self, m: CaseMatch) {
        self.counts.increment(m.case);
        self.matches.push(m);
    }
}

// --- Scanner ----------------------------------------------------------------

/// A regex hit after shape-specific extraction, before case cleanup.
#[derive(Debug)]
struct RawHit {
    start: usize,
    /// Retained end; search resumes here.
    end: usize,
    fragment: String,
}

pub(crate) struct Scanner<'a> {
    registry: &'a Registry,
    analyzer: &'a dyn Analyzer,
    sink: &'a dyn EventSink,
    enabled: CaseSet,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(
        registry: &'a Registry,
        analyzer: &'a dyn Analyzer,
        sink: &'a dyn EventSink,
        enabled: CaseSet,
    ) -> Self {
        Scanner { registry, analyzer, sink, enabled }
    }

    pub(crate) fn scan(&self, text: &str) -> ScanResult {
        self.run(text, None)
    }

    pub(crate) fn scan_with_metrics(&self, text: &str) -> (ScanResult, ScanMetrics) {
        let started = Instant::now();
        let mut metrics = ScanMetrics::default();
        let result = self.run(text, Some(&mut metrics));
        metrics.total = started.elapsed();
        (result, metrics)
    }

    fn run(&self, text: &str, mut metrics: Option<&mut ScanMetrics>) -> ScanResult {
        let mut result = ScanResult::default();
        if text.trim().is_empty() {
            return result;
        }

        let mut dates: Vec<DateFragment> = Vec::new();

        for grammar in &self.registry.cases {
            if !self.enabled.has(grammar.case) {
                continue;
            }
            let started = Instant::now();
            let mut raw_hits = 0;
            let mut kept = 0;

            for pattern in &grammar.patterns {
                for hit in hits(self.registry, pattern, text) {
                    raw_hits += 1;
                    tracing::debug!(
                        case = %grammar.case,
                        pattern = pattern.name,
                        start = hit.start,
                        end = hit.end,
                        fragment = %hit.fragment,
                        "raw hit"
                    );
                    if let Some(m) = self.retain(grammar.case, pattern, hit, &mut dates, metrics.as_deref_mut()) {
                        result.push(m);
                        kept += 1;
                    }
                }
            }

            if let Some(metrics) = metrics.as_deref_mut() {
                metrics.cases.push(CaseMetrics {
                    case: grammar.case,
                    patterns: grammar.patterns.len(),
                    raw_hits,
                    kept,
                    duration: started.elapsed(),
                });
            }
        }

        let started = Instant::now();
        let dated = dedup_date_fragments(dates);
        let dated_count = dated.len();
        for (label, fragment) in dated {
            result.push(CaseMatch::dated(label, fragment));
        }
        if let Some(metrics) = metrics {
            metrics.dedup = started.elapsed();
            if let Some(m) = metrics.case_mut(Case::FilterByDateRange) {
                m.kept = dated_count;
            }
        }

        result
    }

    /// Case-specific cleanup of one hit. `None` means the hit is not
    /// evidence (or, for date ranges, that it went to the buffer).
    fn retain(
        &self,
        case: Case,
        pattern: &CasePattern,
        hit: RawHit,
        dates: &mut Vec<DateFragment>,
        metrics: Option<&mut ScanMetrics>,
    ) -> Option<CaseMatch> {
        match case {
            Case::FindByAuthor => {
                self.sink.emit(Channel::Trace, &format!("before AUTHOR: {}", hit.fragment));
                let cleaned = clean_author(self.analyzer, self.sink, &hit.fragment);
                self.linguistic(case, cleaned, metrics)
            }
            Case::AboutTopic => {
                self.sink.emit(Channel::Trace, &format!("before TOPIC: {}", hit.fragment));
                let cleaned = clean_topic(self.analyzer, &hit.fragment);
                self.linguistic(case, cleaned, metrics)
            }
            Case::FilterByDateRange => {
                match pattern.extract {
                    Extract::Date(label) => dates.push((label, hit.fragment)),
                    other => tracing::warn!(pattern = pattern.name, ?other, "date-range pattern without a label"),
                }
                None
            }
            Case::WordNumber if hit.fragment.is_empty() => None,
            _ => Some(CaseMatch::new(case, hit.fragment)),
        }
    }

    fn linguistic(
        &self,
        case: Case,
        cleaned: Result<Option<String>, crate::AnalyzerError>,
        metrics: Option<&mut ScanMetrics>,
    ) -> Option<CaseMatch> {
        if let Some(metrics) = metrics {
            metrics.analyzer_calls += 1;
            metrics.analyzer_failures += usize::from(cleaned.is_err());
        }
        match cleaned {
            Ok(Some(fragment)) => Some(CaseMatch::new(case, fragment)),
            Ok(None) => {
                tracing::debug!(%case, "no qualifying tokens, match dropped");
                None
            }
            Err(err) => {
                tracing::warn!(%case, error = %err, "linguistic analysis failed, match skipped");
                None
            }
        }
    }
}

/// All non-overlapping hits of `pattern`, left to right.
fn hits(registry: &Registry, pattern: &CasePattern, text: &str) -> Vec<RawHit> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos <= text.len() {
        let Some(caps) = pattern.regex.captures_at(text, pos) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        match extract(registry, pattern.extract, &caps, text) {
            Some(hit) => {
                pos = if hit.end > whole.start() { hit.end } else { next_char(text, whole.start()) };
                out.push(hit);
            }
            // rejected by a guard: retry from the next position
            None => pos = next_char(text, whole.start()),
        }
    }
    out
}

fn extract(registry: &Registry, kind: Extract, caps: &regex::Captures<'_>, text: &str) -> Option<RawHit> {
    let whole = caps.get(0)?;
    let span = |end: usize| RawHit { start: whole.start(), end, fragment: text[whole.start()..end].trim().to_string() };

    match kind {
        Extract::Whole | Extract::Date(_) => Some(span(whole.end())),
        Extract::Term => {
            let term = ["dq", "sq", "tq", "ts", "bare"].iter().find_map(|name| caps.name(name))?;
            let fragment = term.as_str().trim();
            if fragment.is_empty() {
                return None;
            }
            Some(RawHit { start: whole.start(), end: whole.end(), fragment: fragment.to_string() })
        }
        Extract::LabelledName => {
            let name = caps.name("name")?;
            match caps.name("sep") {
                Some(sep) if registry.name_opener_stop.is_match(name.as_str().trim_start()) => {
                    // drop the separator; the name must then start where it did
                    let bare = registry.anchored_name.find(&text[sep.start()..])?;
                    Some(span(sep.start() + bare.end()))
                }
                _ => Some(span(whole.end())),
            }
        }
        Extract::TopicRun => {
            let tail = caps.name("tail")?;
            let word = regex!(r"[^\s.,;!?]+");
            let end = word
                .find_iter(tail.as_str())
                .take_while(|w| !registry.topic_break.is_match(w.as_str()))
                .last()
                .map(|w| tail.start() + w.end())?;
            Some(span(end))
        }
    }
}

fn next_char(text: &str, at: usize) -> usize {
    at + text[at..].chars().next().map_or(1, char::len_utf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::registry;
    use crate::{AnalyzedToken, AnalyzerError, DateLabel, LexiconAnalyzer, NullSink};

    fn scan(text: &str) -> ScanResult {
        Scanner::new(registry(), &LexiconAnalyzer, &NullSink, CaseSet::all()).scan(text)
    }

    struct Down;

    impl Analyzer for Down {
        fn analyze(&self, _text: &str) -> Result<Vec<AnalyzedToken>, AnalyzerError> {
            Err(AnalyzerError::Unavailable("offline".into()))
        }
    }

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(scan(""), ScanResult::default());
        assert_eq!(scan("   \n\t"), ScanResult::default());
        assert_eq!(scan("").summary_line(), "Casi rilevati: nessuno");
    }

    #[test]
    fn limit_and_sort_on_last_files() {
        let res = scan("dammi gli ultimi 5 file");
        assert!(res.counts().get(Case::LimitResults) >= 1);
        assert!(res.fragments(Case::LimitResults).iter().any(|f| f.contains("ultimi 5")));
        assert_eq!(res.fragments(Case::SortUploadDate), vec!["ultimi 5 file"]);
    }

    #[test]
    fn author_from_agent_complement() {
        let res = scan("file scritti da Mario Rossi");
        assert_eq!(res.counts().get(Case::FindByAuthor), 1);
        assert_eq!(res.fragments(Case::FindByAuthor), vec!["Mario Rossi"]);
    }

    #[test]
    fn author_label_rejects_function_word() {
        let res = scan("autore: il documento");
        assert_eq!(res.counts().get(Case::FindByAuthor), 0);
        let res = scan("autore: Manzoni");
        assert_eq!(res.fragments(Case::FindByAuthor), vec!["Manzoni"]);
    }

    #[test]
    fn author_label_hyphen_starts_the_name() {
        let res = scan("autore - il Manzoni");
        assert_eq!(res.fragments(Case::FindByAuthor), vec!["Manzoni"]);
        let res = scan("autore – il Manzoni");
        assert_eq!(res.counts().get(Case::FindByAuthor), 0);
        let res = scan("autore = un tale");
        assert_eq!(res.counts().get(Case::FindByAuthor), 0);
    }

    #[test]
    fn sort_phrase_before_trailing_newline() {
        let res = scan("file più recenti\n");
        assert_eq!(res.fragments(Case::SortUploadDate), vec!["più recenti"]);
    }

    #[test]
    fn date_range_from_to() {
        let res = scan("documenti dal 1 gennaio 2020 al 15 marzo 2020");
        let dated: Vec<&CaseMatch> = res.matches().iter().filter(|m| m.case == Case::FilterByDateRange).collect();
        assert_eq!(dated.len(), 1);
        assert_eq!(dated[0].label, Some(DateLabel::FromTo));
        assert_eq!(dated[0].fragment, "dal 1 gennaio 2020 al 15 marzo 2020");
    }

    #[test]
    fn date_ranges_come_last() {
        let res = scan("documenti dal 1 gennaio 2020 al 15 marzo 2020 che parlano di bilancio");
        let last = res.counts().iter().last().map(|(case, _)| case);
        assert_eq!(last, Some(Case::FilterByDateRange));
        assert_eq!(res.matches().last().map(|m| m.case), Some(Case::FilterByDateRange));
    }

    #[test]
    fn keyword_strips_quotes() {
        assert_eq!(scan("cerca la parola \"bilancio\"").fragments(Case::SearchByKeyword), vec!["bilancio"]);
        assert_eq!(scan("keyword: “piano ferie”").fragments(Case::SearchByKeyword), vec!["piano ferie"]);
        assert_eq!(scan("termine 'Iva'").fragments(Case::SearchByKeyword), vec!["Iva"]);
        assert_eq!(scan("stringa fattura").fragments(Case::SearchByKeyword), vec!["fattura"]);
    }

    #[test]
    fn topic_run_is_cut_and_cleaned() {
        let res = scan("documenti che parlano di intelligenza artificiale per la scuola");
        assert_eq!(res.fragments(Case::AboutTopic), vec!["intelligenza artificiale"]);
    }

    #[test]
    fn topic_without_content_is_dropped() {
        let res = scan("parla di noi");
        assert_eq!(res.counts().get(Case::AboutTopic), 0);
    }

    #[test]
    fn relative_time_shapes() {
        let res = scan("file caricati negli ultimi 3 giorni");
        assert_eq!(res.fragments(Case::FilterByRelTime), vec!["negli ultimi 3 giorni"]);
        let res = scan("modificati 2 settimane fa");
        assert_eq!(res.fragments(Case::FilterByRelTime), vec!["2 settimane fa"]);
        let res = scan("caricati ieri");
        assert_eq!(res.fragments(Case::FilterByRelTime), vec!["ieri"]);
    }

    #[test]
    fn word_numbers_are_trimmed() {
        let res = scan("i primi venti documenti");
        assert_eq!(res.fragments(Case::WordNumber), vec!["venti"]);
        // the tens word swallows the following blank, so the result noun is not reached
        assert_eq!(res.fragments(Case::LimitResults), vec!["primi venti"]);
    }

    #[test]
    fn counts_follow_detection_order() {
        let res = scan("i primi tre file sulla storia romana");
        let order: Vec<Case> = res.counts().iter().map(|(c, _)| c).collect();
        assert_eq!(order, vec![Case::WordNumber, Case::LimitResults, Case::AboutTopic]);
        assert_eq!(res.summary_line(), "Casi rilevati: WORD_NUMBER, LIMIT_RESULTS, ABOUT_TOPIC");
        assert_eq!(res.fragments(Case::AboutTopic), vec!["storia romana"]);
    }

    #[test]
    fn repeated_case_is_counted() {
        let res = scan("oggi o ieri");
        assert_eq!(res.counts().get(Case::FilterByRelTime), 2);
        assert_eq!(res.summary_line(), "Casi rilevati: FILTER_BY_REL_TIME x2");
        assert_eq!(res.report_lines()[1], " ↳  FILTER_BY_REL_TIME: \"oggi\"");
    }

    #[test]
    fn unavailable_analyzer_skips_only_linguistic_cases() {
        let res = Scanner::new(registry(), &Down, &NullSink, CaseSet::all())
            .scan("file scritti da Mario Rossi che parlano di storia negli ultimi 3 giorni");
        assert_eq!(res.counts().get(Case::FindByAuthor), 0);
        assert_eq!(res.counts().get(Case::AboutTopic), 0);
        assert_eq!(res.counts().get(Case::FilterByRelTime), 1);
    }

    #[test]
    fn disabled_cases_are_not_scanned() {
        let res = Scanner::new(registry(), &LexiconAnalyzer, &NullSink, CaseSet::LIMIT_RESULTS)
            .scan("dammi gli ultimi 5 file");
        assert_eq!(res.detected(), CaseSet::LIMIT_RESULTS);
    }

    #[test]
    fn metrics_cover_enabled_cases() {
        let scanner = Scanner::new(registry(), &LexiconAnalyzer, &NullSink, CaseSet::all());
        let (res, metrics) = scanner.scan_with_metrics("documenti dal 1 gennaio 2020 al 15 marzo 2020");
        assert_eq!(metrics.cases.len(), Case::ALL.len());
        let dates = metrics.cases.iter().find(|m| m.case == Case::FilterByDateRange).unwrap();
        assert_eq!(dates.raw_hits, 2);
        assert_eq!(dates.kept, res.counts().get(Case::FilterByDateRange));
    }

    #[test]
    fn scanning_is_idempotent() {
        let text = "ultimi 10 documenti scritti da Grazia Deledda tra marzo e aprile 2021";
        assert_eq!(scan(text), scan(text));
    }
}
