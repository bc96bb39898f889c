//! Author and topic cleanup.
//!
//! Both cleaners run the linguistic collaborator over the raw matched span and
//! keep a subset of its tokens, joined by single spaces in original order.
//! Neither treats "nothing survived" as a fragment: the caller drops the match.

use crate::report::{Channel, EventSink};
use crate::{AnalyzedToken, Analyzer, AnalyzerError, EntityKind, PartOfSpeech};

/// Proper nouns and person entities that are not stopwords.
pub(crate) fn clean_author(
    analyzer: &dyn Analyzer,
    sink: &dyn EventSink,
    span: &str,
) -> Result<Option<String>, AnalyzerError> {
    let tokens = analyzer.analyze(span)?;
    for token in &tokens {
        sink.emit(Channel::Trace, &token.describe());
    }
    Ok(join_kept(&tokens, |t| {
        (t.pos == PartOfSpeech::ProperNoun || t.entity == Some(EntityKind::Person)) && !t.is_stop
    }))
}

/// Nouns, proper nouns and adjectives that are not stopwords.
pub(crate) fn clean_topic(analyzer: &dyn Analyzer, span: &str) -> Result<Option<String>, AnalyzerError> {
    let tokens = analyzer.analyze(span)?;
    Ok(join_kept(&tokens, |t| {
        matches!(t.pos, PartOfSpeech::Noun | PartOfSpeech::ProperNoun | PartOfSpeech::Adjective) && !t.is_stop
    }))
}

fn join_kept(tokens: &[AnalyzedToken], keep: impl Fn(&AnalyzedToken) -> bool) -> Option<String> {
    let kept: Vec<&str> = tokens.iter().filter(|t| keep(t)).map(|t| t.surface.as_str()).collect();
    if kept.is_empty() { None } else { Some(kept.join(" ")) }
}
