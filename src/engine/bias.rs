//! Metadata-bias scorer.
//!
//! A statistical side signal: how likely is it that a query should be answered
//! from file metadata rather than from document content?
//!
//! ```text
//! score = BIAS
//!       + 1.2  if an absolute date appears
//!       + 0.9  if a relative-time expression appears
//!       + 0.6  per DATE entity found by the linguistic collaborator
//!       + Σ TOKEN_WEIGHTS[lemma]   over every token
//! p     = sigmoid(score)
//! ```
//!
//! The scorer never influences which cases are reported.

use crate::{Analyzer, EntityKind};
use once_cell::sync::Lazy;
use std::collections::HashMap;

const BIAS: f64 = -1.2;
const ABSOLUTE_DATE_WEIGHT: f64 = 1.2;
const RELATIVE_TIME_WEIGHT: f64 = 0.9;
const DATE_ENTITY_WEIGHT: f64 = 0.6;

/// Lemma → weight. Positive weights push towards metadata.
static TOKEN_WEIGHTS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        // strong metadata nouns
        ("file", 2.0),
        ("metadata", 1.5),
        ("autore", 1.2),
        ("data", 1.5),
        ("titolo", 0.9),
        ("formato", 1.2),
        ("nome", 0.7),
        ("dimensione", 0.8),
        ("estensione", 0.8),
        ("path", 1.9),
        // actions on files
        ("caricare", 1.6),
        ("caricato", 1.6),
        ("caricati", 1.6),
        ("inserire", 1.2),
        ("inserito", 1.2),
        ("uploadare", 3.0),
        ("uploadato", 3.0),
        ("creare", 1.0),
        ("creato", 1.0),
        ("modificare", 1.0),
        ("modificato", 1.0),
        ("pubblicare", 1.4),
        ("pubblicato", 1.4),
        ("pubblicati", 1.4),
        ("pubblicata", 1.4),
        ("aggiornare", 2.0),
        ("aggiornati", 2.0),
        ("aggiornato", 2.0),
        // relative time
        ("poco", 0.5),
        ("fa", 0.4),
        ("recentemente", 0.7),
        ("oggi", 0.5),
        ("ieri", 0.5),
        ("ultima", 0.8),
        ("ultimi", 0.8),
        ("ultime", 0.8),
        ("ultimo", 0.8),
        // authorship
        ("scrivere", 1.5),
        ("scritto", 1.5),
        ("scritti", 1.5),
        ("firmare", 1.4),
        ("firmato", 1.4),
        ("firmati", 1.4),
        ("redigere", 1.3),
        ("redatto", 1.3),
        ("tema", 0.6),
        ("argomento", 0.6),
    ])
});

/// Numerically stable logistic function; saturates to 0/1 for huge inputs.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Weight of a lemma, 0 when unknown.
pub(crate) fn token_weight(lemma: &str) -> f64 {
    TOKEN_WEIGHTS.get(lemma).copied().unwrap_or(0.0)
}

/// Raw (pre-sigmoid) score of `text`. When the collaborator fails, only the
/// regex signals and the bias contribute.
pub(crate) fn raw_score(text: &str, analyzer: &dyn Analyzer) -> f64 {
    let absolute_date = regex!(
        r"(?i)(\b\d{1,2}\s*(?:gen|feb|mar|apr|mag|giu|lug|ago|set|ott|nov|dic)\w*\b|\b\d{1,2}[/-]\d{1,2}(?:[/-]\d{2,4})?)"
    );
    let relative_time =
        regex!(r"(?i)\b(poco\s+fa|recentemente|appena|ieri|oggi|ultim[ioa]\s+(?:settimana|mese|giorni?|ore))\b");

    let mut score = BIAS;
    if absolute_date.is_match(text) {
        score += ABSOLUTE_DATE_WEIGHT;
    }
    if relative_time.is_match(text) {
        score += RELATIVE_TIME_WEIGHT;
    }

    match analyzer.analyze(&text.to_lowercase()) {
        Ok(tokens) => {
            // one entity per run of consecutive DATE tokens
            let mut previous_was_date = false;
            for token in &tokens {
                let is_date = token.entity == Some(EntityKind::Date);
                if is_date && !previous_was_date {
                    score += DATE_ENTITY_WEIGHT;
                }
                previous_was_date = is_date;
                score += token_weight(&token.lemma);
            }
        }
        Err(err) => tracing::warn!(error = %err, "linguistic analysis failed, scoring from patterns only"),
    }

    score
}

/// Probability that `text` targets metadata, in (0, 1).
pub(crate) fn metadata_bias(text: &str, analyzer: &dyn Analyzer) -> f64 {
    sigmoid(raw_score(text, analyzer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnalyzedToken, AnalyzerError, LexiconAnalyzer};

    struct Down;

    impl Analyzer for Down {
        fn analyze(&self, _text: &str) -> Result<Vec<AnalyzedToken>, AnalyzerError> {
            Err(AnalyzerError::Backend("boom".into()))
        }
    }

    #[test]
    fn empty_text_is_the_bias() {
        let p = metadata_bias("", &LexiconAnalyzer);
        assert!((p - sigmoid(BIAS)).abs() < 1e-12);
        assert!((p - 0.2315).abs() < 1e-3);
    }

    #[test]
    fn sigmoid_saturates() {
        assert_eq!(sigmoid(1e6), 1.0);
        assert_eq!(sigmoid(-1e6), 0.0);
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(f64::MAX).is_finite());
        assert!(sigmoid(f64::MIN).is_finite());
    }

    #[test]
    fn evidence_is_monotonic() {
        let a = LexiconAnalyzer;
        let base = metadata_bias("documenti", &a);
        let dated = metadata_bias("documenti 12 maggio", &a);
        let relative = metadata_bias("documenti 12 maggio ieri", &a);
        let weighted = metadata_bias("file documenti 12 maggio ieri", &a);
        assert!(base <= dated);
        assert!(dated <= relative);
        assert!(relative <= weighted);
    }

    #[test]
    fn signals_add_up() {
        // 12/05/2023 (absolute) + ieri (relative, weight 0.5) + file (2.0);
        // "2023 ieri" is a single run of DATE tokens
        let score = raw_score("file del 12/05/2023 ieri", &LexiconAnalyzer);
        let expected = BIAS + 1.2 + 0.9 + 0.6 + 0.5 + 2.0;
        assert!((score - expected).abs() < 1e-9, "score {score} != {expected}");
    }

    #[test]
    fn separate_date_runs_count_twice() {
        let score = raw_score("2020 e 2021", &LexiconAnalyzer);
        assert!((score - (BIAS + 0.6 + 0.6)).abs() < 1e-9);
    }

    #[test]
    fn analyzer_failure_keeps_pattern_signals() {
        let score = raw_score("caricati ieri", &Down);
        assert!((score - (BIAS + 0.9)).abs() < 1e-12);
    }

    #[test]
    fn unknown_lemmas_weigh_nothing() {
        assert_eq!(token_weight("zebra"), 0.0);
        assert_eq!(token_weight("uploadare"), 3.0);
    }
}
