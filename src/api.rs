use crate::engine::{self, ScanMetrics, ScanResult, Scanner};
use crate::report::{Channel, EventSink, TracingSink};
use crate::{Analyzer, Case, CaseSet, ClassifyError, EvidenceClass, LexiconAnalyzer};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, mpsc};
use std::time::{Duration, Instant};

static DEFAULT_CLASSIFIER: Lazy<Classifier> = Lazy::new(Classifier::default);

/// Options that affect classification.
#[derive(Debug, Clone)]
pub struct Options {
    /// Longer queries are cut to this many characters before scanning.
    pub max_input_chars: usize,
    /// Cases the scanner evaluates. Disabled cases are never reported.
    pub cases: CaseSet,
    /// Probability at or above which [`Analysis::suggested_source`] falls
    /// back to METADATA when the matched cases do not decide.
    pub threshold: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self { max_input_chars: 2048, cases: CaseSet::all(), threshold: 0.5 }
    }
}

/// Result of classifying one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// Detected cases and their fragments.
    pub scan: ScanResult,
    /// Probability in (0, 1) that the query targets file metadata.
    pub prob_metadata: f64,
    /// Whether the input was cut by the length guard.
    pub truncated: bool,
}

impl Analysis {
    /// Which index should answer the query.
    ///
    /// Any detected case requiring METADATA wins. Otherwise, if the detected
    /// cases carry annotations they all require CONTENT. With no annotated
    /// case the bias probability decides against `threshold`.
    ///
    /// The classifier never applies this on its own.
    pub fn suggested_source(&self, threshold: f64) -> EvidenceClass {
        let required: Vec<EvidenceClass> =
            self.scan.counts().iter().filter_map(|(case, _)| case.required_evidence()).collect();

        if required.contains(&EvidenceClass::Metadata) {
            EvidenceClass::Metadata
        } else if !required.is_empty() {
            EvidenceClass::Content
        } else if self.prob_metadata >= threshold {
            EvidenceClass::Metadata
        } else {
            EvidenceClass::Content
        }
    }

    /// Detected cases whose required evidence differs from `source`.
    pub fn conflicting_cases(&self, source: EvidenceClass) -> Vec<Case> {
        self.scan
            .counts()
            .iter()
            .map(|(case, _)| case)
            .filter(|case| case.required_evidence().is_some_and(|needed| needed != source))
            .collect()
    }
}

/// Additional details returned by [`Classifier::classify_verbose`].
#[derive(Debug, Clone, Serialize)]
pub struct ScanDetails {
    /// Total elapsed time (guard + scan + bias).
    pub total: Duration,
    pub scan: ScanMetrics,
    /// Time spent in the metadata-bias scorer.
    pub bias: Duration,
    /// Characters actually scanned, after the length guard.
    pub scanned_chars: usize,
    /// Cases that were enabled for this run, in scan order.
    pub enabled: Vec<Case>,
    /// Patterns evaluated across the enabled cases.
    pub patterns: usize,
}

/// A configured classifier: linguistic collaborator, reporting hook and
/// options. Cheap to clone and safe to share between threads.
#[derive(Clone)]
pub struct Classifier {
    analyzer: Arc<dyn Analyzer>,
    sink: Arc<dyn EventSink>,
    options: Options,
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new(LexiconAnalyzer)
    }
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier").field("options", &self.options).finish_non_exhaustive()
    }
}

impl Classifier {
    /// A classifier over `analyzer` with default options, reporting through
    /// `tracing`.
    pub fn new(analyzer: impl Analyzer + 'static) -> Self {
        Classifier { analyzer: Arc::new(analyzer), sink: Arc::new(TracingSink), options: Options::default() }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Classify `text` and report the detected cases to the sink.
    ///
    /// # Example
    /// ```
    /// use segugio::{Case, Classifier};
    ///
    /// let out = Classifier::default().classify("file scritti da Mario Rossi");
    /// assert_eq!(out.scan.fragments(Case::FindByAuthor), vec!["Mario Rossi"]);
    /// ```
    pub fn classify(&self, text: &str) -> Analysis {
        let (analysis, _) = self.run(text, self.sink.as_ref(), false);
        analysis
    }

    /// Like [`classify`](Self::classify), with per-case timing and hit
    /// counts. The plain path does not collect these.
    pub fn classify_verbose(&self, text: &str) -> (Analysis, ScanDetails) {
        let started = Instant::now();
        let (analysis, timings) = self.run(text, self.sink.as_ref(), true);
        let (scan, bias, scanned_chars) = timings.unwrap_or_default();
        let enabled: Vec<Case> = Case::ALL.into_iter().filter(|case| self.options.cases.has(*case)).collect();
        let registry = crate::rules::registry();
        let patterns = enabled.iter().filter_map(|case| registry.grammar(*case)).map(|g| g.patterns.len()).sum();
        let details = ScanDetails { total: started.elapsed(), scan, bias, scanned_chars, enabled, patterns };
        (analysis, details)
    }

    /// Classify on a worker thread and give up after `timeout`.
    ///
    /// On timeout the query is unclassified: nothing is reported to the sink,
    /// even if the worker finishes later.
    ///
    /// A timed-out worker is detached, not cancelled. It keeps its thread until
    /// the analyzer returns, so an analyzer that can stall indefinitely must
    /// bound its own calls.
    pub fn classify_with_timeout(&self, text: &str, timeout: Duration) -> Result<Analysis, ClassifyError> {
        let (tx, rx) = mpsc::channel();
        let worker = self.clone();
        let text = text.to_string();

        std::thread::Builder::new().name("segugio-classify".into()).spawn(move || {
            let buffer = Buffered::default();
            let (analysis, _) = worker.run(&text, &buffer, false);
            // the receiver is gone once the caller timed out
            let _ = tx.send((analysis, buffer.into_lines()));
        })?;

        match rx.recv_timeout(timeout) {
            Ok((analysis, lines)) => {
                for (channel, line) in &lines {
                    self.sink.emit(*channel, line);
                }
                Ok(analysis)
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!(?timeout, "classification timed out, query left unclassified");
                Err(ClassifyError::Timeout { after: timeout })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(ClassifyError::WorkerLost),
        }
    }

    fn run(
        &self,
        text: &str,
        sink: &dyn EventSink,
        verbose: bool,
    ) -> (Analysis, Option<(ScanMetrics, Duration, usize)>) {
        let (text, truncated) = guard_length(text, self.options.max_input_chars);
        if truncated {
            tracing::warn!(max_input_chars = self.options.max_input_chars, "query truncated by the length guard");
        }

        let scanner = Scanner::new(crate::rules::registry(), self.analyzer.as_ref(), sink, self.options.cases);
        let (scan, metrics) = if verbose {
            let (scan, metrics) = scanner.scan_with_metrics(text);
            (scan, Some(metrics))
        } else {
            (scanner.scan(text), None)
        };

        let started = Instant::now();
        let prob_metadata = engine::metadata_bias(text, self.analyzer.as_ref());
        let bias = started.elapsed();

        for line in scan.report_lines() {
            sink.emit(Channel::Summary, &line);
        }
        tracing::debug!(cases = scan.counts().len(), matches = scan.matches().len(), prob_metadata, "classified");

        let timings = metrics.map(|m| (m, bias, text.chars().count()));
        (Analysis { scan, prob_metadata, truncated }, timings)
    }
}

/// Collects lines so a timed-out worker never reports a partial result.
#[derive(Default)]
struct Buffered(Mutex<Vec<(Channel, String)>>);

impl Buffered {
    fn into_lines(self) -> Vec<(Channel, String)> {
        self.0.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EventSink for Buffered {
    fn emit(&self, channel: Channel, line: &str) {
        if let Ok(mut lines) = self.0.lock() {
            lines.push((channel, line.to_string()));
        }
    }
}

/// Cut `text` to at most `max` characters, on a char boundary.
fn guard_length(text: &str, max: usize) -> (&str, bool) {
    match text.char_indices().nth(max) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

/// Classify `text` with the built-in analyzer and default options.
pub fn classify(text: &str) -> Analysis {
    DEFAULT_CLASSIFIER.classify(text)
}

/// Classify `text` with the built-in analyzer and the provided `options`.
pub fn classify_with(text: &str, options: &Options) -> Analysis {
    DEFAULT_CLASSIFIER.clone().with_options(options.clone()).classify(text)
}

/// Metadata-bias probability of `text` alone, without scanning for cases.
pub fn prob_metadata(text: &str) -> f64 {
    let (text, _) = guard_length(text, Options::default().max_input_chars);
    engine::metadata_bias(text, &LexiconAnalyzer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnalyzedToken, AnalyzerError, CaseMatch, DateLabel, NullSink};

    struct Slow(Duration);

    impl Analyzer for Slow {
        fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>, AnalyzerError> {
            std::thread::sleep(self.0);
            LexiconAnalyzer.analyze(text)
        }
    }

    fn quiet() -> Classifier {
        Classifier::default().with_sink(NullSink)
    }

    fn analysis(cases: &[Case], prob_metadata: f64) -> Analysis {
        let mut scan = ScanResult::default();
        for case in cases {
            scan.push(CaseMatch::new(*case, "x"));
        }
        Analysis { scan, prob_metadata, truncated: false }
    }

    #[test]
    fn empty_query() {
        let out = quiet().classify("");
        assert!(out.scan.is_empty());
        assert!(out.scan.counts().is_empty());
        assert!(!out.truncated);
        assert!((out.prob_metadata - 0.2315).abs() < 1e-3);
    }

    #[test]
    fn spec_scenarios() {
        let c = quiet();

        let out = c.classify("dammi gli ultimi 5 file");
        assert!(out.scan.counts().get(Case::LimitResults) >= 1);

        let out = c.classify("file scritti da Mario Rossi");
        assert_eq!(out.scan.fragments(Case::FindByAuthor), vec!["Mario Rossi"]);

        let out = c.classify("documenti dal 1 gennaio 2020 al 15 marzo 2020");
        let dated: Vec<&CaseMatch> =
            out.scan.matches().iter().filter(|m| m.case == Case::FilterByDateRange).collect();
        assert_eq!(dated.len(), 1);
        assert_eq!(dated[0].label, Some(DateLabel::FromTo));

        let out = c.classify("cerca la parola \"bilancio\"");
        assert_eq!(out.scan.fragments(Case::SearchByKeyword), vec!["bilancio"]);
    }

    #[test]
    fn free_functions_use_defaults() {
        let text = "file caricati negli ultimi 3 giorni";
        assert_eq!(classify(text), quiet().classify(text));
        assert_eq!(prob_metadata(text), classify(text).prob_metadata);

        let only_limit = Options { cases: CaseSet::LIMIT_RESULTS, ..Options::default() };
        let out = classify_with("dammi gli ultimi 5 file", &only_limit);
        assert_eq!(out.scan.detected(), CaseSet::LIMIT_RESULTS);
    }

    #[test]
    fn length_guard_truncates_on_char_boundary() {
        let c = quiet().with_options(Options { max_input_chars: 3, ..Options::default() });
        let out = c.classify("èèèèè");
        assert!(out.truncated);
        assert!(!c.classify("èèè").truncated);

        assert_eq!(guard_length("èèèèè", 3), ("èèè", true));
        assert_eq!(guard_length("abc", 3), ("abc", false));
        assert_eq!(guard_length("", 0), ("", false));
    }

    #[test]
    fn long_query_is_cut_before_scanning() {
        let c = quiet().with_options(Options { max_input_chars: 10, ..Options::default() });
        let out = c.classify("documenti scritti da Mario Rossi");
        assert!(out.truncated);
        assert_eq!(out.scan.counts().get(Case::FindByAuthor), 0);
    }

    #[test]
    fn summary_lines_reach_the_sink() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&lines);
        let c = Classifier::default().with_sink(move |channel: Channel, line: &str| {
            if channel == Channel::Summary {
                seen.lock().unwrap().push(line.to_string());
            }
        });
        c.classify("cerca la parola \"bilancio\"");
        let lines = lines.lock().unwrap();
        assert!(lines[0].starts_with("Casi rilevati: "));
        assert!(lines.iter().any(|l| l == " ↳  SEARCH_BY_KEYWORD: \"bilancio\""));
    }

    #[test]
    fn author_tokens_are_traced() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&lines);
        let c = Classifier::default().with_sink(move |channel: Channel, line: &str| {
            if channel == Channel::Trace {
                seen.lock().unwrap().push(line.to_string());
            }
        });
        c.classify("file scritti da Mario Rossi");
        let lines = lines.lock().unwrap();
        assert!(lines.iter().any(|l| l.starts_with("before AUTHOR: ")));
        assert!(lines.iter().any(|l| l == "TOKEN: 'Mario' | POS: PROPN | TAG: SP | ENT: "));
    }

    #[test]
    fn verbose_reports_metrics() {
        let c = quiet().with_options(Options {
            cases: CaseSet::FIND_BY_AUTHOR | CaseSet::FILTER_BY_REL_TIME,
            ..Options::default()
        });
        let (out, details) = c.classify_verbose("file scritti da Mario Rossi ieri");
        assert_eq!(details.enabled, vec![Case::FindByAuthor, Case::FilterByRelTime]);
        assert_eq!(details.scan.cases.len(), 2);
        assert_eq!(details.patterns, 3 + 10);
        assert_eq!(details.scanned_chars, "file scritti da Mario Rossi ieri".chars().count());
        assert!(details.scan.analyzer_calls >= 1);
        assert!(details.total >= details.bias);
        assert_eq!(out, c.classify("file scritti da Mario Rossi ieri"));
    }

    #[test]
    fn timeout_leaves_query_unclassified() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&lines);
        let c = Classifier::new(Slow(Duration::from_millis(300)))
            .with_sink(move |_: Channel, line: &str| seen.lock().unwrap().push(line.to_string()));

        let err = c.classify_with_timeout("file scritti da Mario Rossi", Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, ClassifyError::Timeout { after } if after == Duration::from_millis(10)));
        assert!(lines.lock().unwrap().is_empty());
    }

    #[test]
    fn detached_worker_stays_silent() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&lines);
        let c = Classifier::new(Slow(Duration::from_millis(50)))
            .with_sink(move |_: Channel, line: &str| seen.lock().unwrap().push(line.to_string()));

        assert!(c.classify_with_timeout("file scritti da Mario Rossi", Duration::from_millis(1)).is_err());
        std::thread::sleep(Duration::from_millis(300));
        assert!(lines.lock().unwrap().is_empty());

        let out = c.classify_with_timeout("caricati ieri", Duration::from_secs(10)).unwrap();
        assert_eq!(out.scan.fragments(Case::FilterByRelTime), vec!["ieri"]);
        assert!(!lines.lock().unwrap().is_empty());
    }

    #[test]
    fn timeout_not_reached() {
        let c = quiet();
        let out = c.classify_with_timeout("caricati ieri", Duration::from_secs(10)).unwrap();
        assert_eq!(out, c.classify("caricati ieri"));
    }

    #[test]
    fn metadata_case_decides_source() {
        let out = analysis(&[Case::AboutTopic, Case::FindByAuthor], 0.1);
        assert_eq!(out.suggested_source(0.5), EvidenceClass::Metadata);
        assert_eq!(out.conflicting_cases(EvidenceClass::Metadata), vec![Case::AboutTopic]);
    }

    #[test]
    fn content_cases_decide_source() {
        let out = analysis(&[Case::SearchByKeyword, Case::WordNumber], 0.9);
        assert_eq!(out.suggested_source(0.5), EvidenceClass::Content);
        assert!(out.conflicting_cases(EvidenceClass::Content).is_empty());
    }

    #[test]
    fn probability_decides_without_annotated_cases() {
        assert_eq!(analysis(&[Case::LimitResults], 0.7).suggested_source(0.5), EvidenceClass::Metadata);
        assert_eq!(analysis(&[], 0.5).suggested_source(0.5), EvidenceClass::Metadata);
        assert_eq!(analysis(&[], 0.3).suggested_source(0.5), EvidenceClass::Content);
    }

    #[test]
    fn classifiers_are_shareable() {
        let c = quiet();
        let text = "ultimi 10 documenti scritti da Grazia Deledda tra marzo e aprile 2021";
        let expected = c.classify(text);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let c = c.clone();
                std::thread::spawn(move || c.classify(text))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
