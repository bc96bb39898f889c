//! Case grammar registry.
//!
//! The grammar is compiled exactly once per process (see [`registry`]) and is
//! read-only afterwards, so concurrent scans share it without locking.
//!
//! - `lexical.rs`: reusable fragments (word classes, numerals, dates, names).
//! - `cases.rs`: the case → ordered patterns table.

pub(crate) mod cases;
pub(crate) mod lexical;


use crate::Case;
use cases::Extract;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Compiled-program budget per pattern. The numeral grammar is large once
/// expanded with Unicode case folding; the default limit is too tight for it.
const PATTERN_SIZE_LIMIT: usize = 64 * (1 << 20);

/// A compiled grammar rule belonging to exactly one case.
#[derive(Debug)]
pub(crate) struct CasePattern {
    pub name: &'static str,
    pub regex: Regex,
    pub extract: Extract,
}

/// All patterns of one case, in declaration order.
#[derive(Debug)]
pub(crate) struct CaseGrammar {
    pub case: Case,
    pub patterns: Vec<CasePattern>,
}

/// The frozen grammar: cases in scan order, plus the guard regexes that stand
/// in for lookaheads the linear-time engine does not support.
#[derive(Debug)]
pub(crate) struct Registry {
    pub cases: Vec<CaseGrammar>,
    /// Rejects "autore: il ..." style matches.
    pub name_opener_stop: Regex,
    /// Name tokens at the start of a slice.
    pub anchored_name: Regex,
    /// Ends a topic run at the first article or preposition.
    pub topic_break: Regex,
}

static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry =
        Registry::build().unwrap_or_else(|err| panic!("built-in case grammar does not compile: {err}"));
    tracing::debug!(cases = registry.cases.len(), patterns = registry.pattern_count(), "case grammar compiled");
    registry
});

/// Process-wide compiled grammar.
pub(crate) fn registry() -> &'static Registry {
    &REGISTRY
}

impl Registry {
    pub(crate) fn build() -> Result<Self, regex::Error> {
        let mut cases = Vec::with_capacity(Case::ALL.len());
        for (case, specs) in cases::table() {
            let patterns = specs
                .into_iter()
                .map(|spec| {
                    Ok(CasePattern { name: spec.name, regex: compile(&spec.source)?, extract: spec.extract })
                })
                .collect::<Result<Vec<_>, regex::Error>>()?;
            cases.push(CaseGrammar { case, patterns });
        }

        Ok(Registry {
            cases,
            name_opener_stop: compile(&cases::name_opener_stopwords())?,
            anchored_name: compile(&cases::anchored_name())?,
            topic_break: compile(&cases::topic_breakers())?,
        })
    }

    pub(crate) fn grammar(&self, case: Case) -> Option<&CaseGrammar> {
        self.cases.iter().find(|g| g.case == case)
    }

    pub(crate) fn pattern_count(&self) -> usize {
        self.cases.iter().map(|g| g.patterns.len()).sum()
    }
}

/// Compile a grammar source the way every case pattern is compiled:
/// case-insensitive, with free-form whitespace.
pub(crate) fn compile(source: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .ignore_whitespace(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .dfa_size_limit(PATTERN_SIZE_LIMIT)
        .build()
}
