//! Linguistic analysis collaborator.
//!
//! The classifier never trains or updates a language model; it only asks an
//! [`Analyzer`] to turn a span of text into tagged tokens. Hosts with a real
//! Italian pipeline implement the trait over it. [`LexiconAnalyzer`] is a small
//! deterministic tagger (closed-class lexicon + suffix rules) that is good
//! enough for names, topics and date words in short search queries.

use crate::AnalyzerError;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// Coarse part of speech, rendered with Universal Dependencies tag names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Noun,
    ProperNoun,
    Adjective,
    Verb,
    Auxiliary,
    Adposition,
    Determiner,
    Pronoun,
    Conjunction,
    Adverb,
    Numeral,
    Punctuation,
    Other,
}

impl PartOfSpeech {
    pub fn as_str(self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "NOUN",
            PartOfSpeech::ProperNoun => "PROPN",
            PartOfSpeech::Adjective => "ADJ",
            PartOfSpeech::Verb => "VERB",
            PartOfSpeech::Auxiliary => "AUX",
            PartOfSpeech::Adposition => "ADP",
            PartOfSpeech::Determiner => "DET",
            PartOfSpeech::Pronoun => "PRON",
            PartOfSpeech::Conjunction => "CCONJ",
            PartOfSpeech::Adverb => "ADV",
            PartOfSpeech::Numeral => "NUM",
            PartOfSpeech::Punctuation => "PUNCT",
            PartOfSpeech::Other => "X",
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named-entity category attached to a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Person,
    Date,
    Location,
    Organization,
    Misc,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Person => "PER",
            EntityKind::Date => "DATE",
            EntityKind::Location => "LOC",
            EntityKind::Organization => "ORG",
            EntityKind::Misc => "MISC",
        }
    }
}

/// One token as seen by the linguistic collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedToken {
    pub surface: String,
    /// Lower-cased citation form.
    pub lemma: String,
    pub pos: PartOfSpeech,
    pub fine_tag: String,
    pub entity: Option<EntityKind>,
    pub is_stop: bool,
}

impl AnalyzedToken {
    /// One-line description used by the trace channel.
    pub fn describe(&self) -> String {
        format!(
            "TOKEN: '{}' | POS: {} | TAG: {} | ENT: {}",
            self.surface,
            self.pos,
            self.fine_tag,
            self.entity.map(EntityKind::as_str).unwrap_or("")
        )
    }
}

/// Tokenise and tag a piece of text.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>, AnalyzerError>;
}

impl<A: Analyzer + ?Sized> Analyzer for &A {
    fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>, AnalyzerError> {
        (**self).analyze(text)
    }
}

impl<A: Analyzer + ?Sized> Analyzer for std::sync::Arc<A> {
    fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>, AnalyzerError> {
        (**self).analyze(text)
    }
}

// --- Lexicon ----------------------------------------------------------------

/// Closed-class words: always stopwords.
static FUNCTION_WORDS: Lazy<HashMap<&'static str, (PartOfSpeech, &'static str)>> = Lazy::new(|| {
    use PartOfSpeech::*;
    let mut map = HashMap::new();
    for w in ["il", "lo", "la", "l'", "l’", "i", "gli", "le", "un", "uno", "una", "un'", "un’"] {
        map.insert(w, (Determiner, "RD"));
    }
    for w in [
        "a", "ad", "da", "di", "d'", "d’", "in", "con", "su", "per", "tra", "fra", "al", "allo", "alla", "all'",
        "all’", "ai", "agli", "alle", "dal", "dallo", "dalla", "dall'", "dall’", "dai", "dagli", "dalle", "del",
        "dello", "della", "dell'", "dell’", "dei", "degli", "delle", "nel", "nello", "nella", "nell'", "nell’", "nei",
        "negli", "nelle", "sul", "sullo", "sulla", "sull'", "sull’", "sui", "sugli", "sulle", "col", "coi",
    ] {
        map.insert(w, (Adposition, "E"));
    }
    for w in [
        "io", "tu", "egli", "lui", "lei", "noi", "voi", "essi", "esse", "loro", "mi", "ti", "ci", "vi", "li", "ne",
        "si", "me", "te", "che", "chi", "cui", "quale", "quali", "questo", "questa", "questi", "queste", "quello",
        "quella", "quelli", "quelle", "mio", "mia", "miei", "mie", "tuo", "tua", "suo", "sua", "suoi", "sue",
    ] {
        map.insert(w, (Pronoun, "PE"));
    }
    for w in ["e", "ed", "o", "od", "ma", "né", "oppure", "però", "anche", "se", "perché", "quando", "come"] {
        map.insert(w, (Conjunction, "CC"));
    }
    for w in [
        "è", "e'", "sono", "sei", "siamo", "siete", "era", "erano", "sia", "siano", "stato", "stata", "stati",
        "state", "ho", "hai", "ha", "abbiamo", "avete", "hanno", "avere", "essere",
    ] {
        map.insert(w, (Auxiliary, "VA"));
    }
    for w in [
        "non", "più", "meno", "molto", "poco", "tutto", "tutti", "tutte", "solo", "già", "ancora", "sempre", "mai",
        "qui", "qua", "lì", "là", "dove", "prima", "dopo", "sopra", "sotto", "circa", "fa", "ecco", "poi",
    ] {
        map.insert(w, (Adverb, "B"));
    }
    map
});

/// Open-class words the suffix rules would get wrong, with their lemma.
static CONTENT_WORDS: Lazy<HashMap<&'static str, (PartOfSpeech, &'static str)>> = Lazy::new(|| {
    use PartOfSpeech::*;
    HashMap::from([
        // nouns that look like participles or verbs
        ("data", (Noun, "data")),
        ("date", (Noun, "data")),
        ("file", (Noun, "file")),
        ("formato", (Noun, "formato")),
        ("risultato", (Noun, "risultato")),
        ("risultati", (Noun, "risultato")),
        ("contratto", (Noun, "contratto")),
        ("contratti", (Noun, "contratto")),
        ("mercato", (Noun, "mercato")),
        ("senato", (Noun, "senato")),
        ("stato", (Noun, "stato")),
        ("piano", (Noun, "piano")),
        ("partito", (Noun, "partito")),
        ("documento", (Noun, "documento")),
        ("documenti", (Noun, "documento")),
        ("autore", (Noun, "autore")),
        ("autrice", (Noun, "autore")),
        ("titolo", (Noun, "titolo")),
        ("nome", (Noun, "nome")),
        ("tema", (Noun, "tema")),
        ("argomento", (Noun, "argomento")),
        ("parola", (Noun, "parola")),
        ("parole", (Noun, "parola")),
        ("anno", (Noun, "anno")),
        ("anni", (Noun, "anno")),
        ("mese", (Noun, "mese")),
        ("mesi", (Noun, "mese")),
        ("settimana", (Noun, "settimana")),
        ("giorno", (Noun, "giorno")),
        ("giorni", (Noun, "giorno")),
        ("ore", (Noun, "ora")),
        ("dimensione", (Noun, "dimensione")),
        ("estensione", (Noun, "estensione")),
        ("path", (Noun, "path")),
        ("metadata", (Noun, "metadata")),
        // verbs used by the grammar and the weight table
        ("dammi", (Verb, "dare")),
        ("mostrami", (Verb, "mostrare")),
        ("cerca", (Verb, "cercare")),
        ("trova", (Verb, "trovare")),
        ("voglio", (Verb, "volere")),
        ("parla", (Verb, "parlare")),
        ("parlano", (Verb, "parlare")),
        ("tratta", (Verb, "trattare")),
        ("trattano", (Verb, "trattare")),
        ("riguarda", (Verb, "riguardare")),
        ("riguardano", (Verb, "riguardare")),
        ("scritto", (Verb, "scrivere")),
        ("scritti", (Verb, "scrivere")),
        ("scritta", (Verb, "scrivere")),
        ("scritte", (Verb, "scrivere")),
        ("redatto", (Verb, "redigere")),
        ("redatti", (Verb, "redigere")),
        ("fatto", (Verb, "fare")),
        ("fatti", (Verb, "fare")),
        ("prodotto", (Verb, "produrre")),
        ("prodotti", (Verb, "produrre")),
        // adjectives without a productive suffix
        ("ultimo", (Adjective, "ultimo")),
        ("ultima", (Adjective, "ultimo")),
        ("ultimi", (Adjective, "ultimo")),
        ("ultime", (Adjective, "ultimo")),
        ("scorso", (Adjective, "scorso")),
        ("scorsa", (Adjective, "scorso")),
        ("recente", (Adjective, "recente")),
        ("recenti", (Adjective, "recente")),
        ("vecchio", (Adjective, "vecchio")),
        ("vecchi", (Adjective, "vecchio")),
        ("nuovo", (Adjective, "nuovo")),
        ("nuovi", (Adjective, "nuovo")),
        ("grande", (Adjective, "grande")),
        ("piccolo", (Adjective, "piccolo")),
    ])
});

/// Words naming a point or stretch of time.
const DATE_WORDS: &[&str] = &[
    "gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno", "luglio", "agosto", "settembre", "ottobre",
    "novembre", "dicembre", "ieri", "oggi", "domani", "lunedì", "martedì", "mercoledì", "giovedì", "venerdì",
    "sabato", "domenica",
];

/// (suffix, replacement that yields the infinitive)
const PARTICIPLE_SUFFIXES: &[(&str, &str)] = &[
    ("ato", "are"),
    ("ata", "are"),
    ("ati", "are"),
    ("ate", "are"),
    ("ito", "ire"),
    ("ita", "ire"),
    ("iti", "ire"),
    ("ite", "ire"),
    ("uto", "ere"),
    ("uta", "ere"),
    ("uti", "ere"),
    ("ute", "ere"),
];

const INFINITIVE_SUFFIXES: &[&str] = &["are", "ere", "ire"];

const ADJECTIVE_SUFFIXES: &[&str] = &[
    "ale", "ali", "ico", "ica", "ici", "iche", "ivo", "iva", "ivi", "ive", "oso", "osa", "osi", "ose", "ile", "ili",
    "ario", "aria", "ari", "ente", "enti", "ante", "anti", "ese", "esi",
];

/// Shortest stem a suffix rule may leave behind; protects short words
/// ("fate", "dire") from being mangled.
const MIN_STEM: usize = 3;

/// Deterministic dictionary-and-suffix tagger for Italian.
///
/// Tagging order: numbers, closed-class words, date words, the content
/// lexicon, capitalised unknown words (proper nouns), then suffix rules
/// (participles and infinitives are verbs, derivational adjective endings are
/// adjectives), falling back to common noun.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconAnalyzer;

impl LexiconAnalyzer {
    fn tag(&self, surface: &str) -> AnalyzedToken {
        let lower = surface.to_lowercase();
        let token = |pos: PartOfSpeech, tag: &str, lemma: &str, entity: Option<EntityKind>, is_stop: bool| {
            AnalyzedToken {
                surface: surface.to_string(),
                lemma: lemma.to_string(),
                pos,
                fine_tag: tag.to_string(),
                entity,
                is_stop,
            }
        };

        if surface.chars().all(|c| c.is_ascii_digit()) {
            let entity = (surface.len() == 4).then_some(EntityKind::Date);
            return token(PartOfSpeech::Numeral, "N", &lower, entity, false);
        }
        if !surface.chars().any(char::is_alphanumeric) {
            return token(PartOfSpeech::Punctuation, "FS", &lower, None, false);
        }
        if let Some(&(pos, tag)) = FUNCTION_WORDS.get(lower.as_str()) {
            return token(pos, tag, &lower, None, true);
        }
        if DATE_WORDS.contains(&lower.as_str()) {
            return token(PartOfSpeech::Noun, "S", &lower, Some(EntityKind::Date), false);
        }
        if let Some(&(pos, lemma)) = CONTENT_WORDS.get(lower.as_str()) {
            return token(pos, fine_tag(pos), lemma, None, false);
        }
        if surface.chars().next().is_some_and(char::is_uppercase) {
            return token(PartOfSpeech::ProperNoun, "SP", &lower, None, false);
        }

        let stem_ok = |suffix: &str| lower.len() >= suffix.len() + MIN_STEM;
        for &(suffix, infinitive) in PARTICIPLE_SUFFIXES {
            if lower.ends_with(suffix) && stem_ok(suffix) {
                let lemma = format!("{}{}", &lower[..lower.len() - suffix.len()], infinitive);
                return token(PartOfSpeech::Verb, "V", &lemma, None, false);
            }
        }
        if INFINITIVE_SUFFIXES.iter().any(|s| lower.ends_with(s) && stem_ok(s)) {
            return token(PartOfSpeech::Verb, "V", &lower, None, false);
        }
        if ADJECTIVE_SUFFIXES.iter().any(|s| lower.ends_with(s) && stem_ok(s)) {
            return token(PartOfSpeech::Adjective, "A", &lower, None, false);
        }
        token(PartOfSpeech::Noun, "S", &lower, None, false)
    }
}

fn fine_tag(pos: PartOfSpeech) -> &'static str {
    match pos {
        PartOfSpeech::Noun => "S",
        PartOfSpeech::ProperNoun => "SP",
        PartOfSpeech::Adjective => "A",
        PartOfSpeech::Verb => "V",
        _ => "X",
    }
}

impl Analyzer for LexiconAnalyzer {
    fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>, AnalyzerError> {
        // words keep a trailing elision apostrophe ("l'", "dell'"); anything
        // else that is not blank is a one-char punctuation token
        let re = regex!(r"[\p{L}\p{N}]+['’]?|[^\s\p{L}\p{N}]");
        Ok(re.find_iter(text).map(|m| self.tag(m.as_str())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(text: &str) -> Vec<(String, PartOfSpeech, bool)> {
        LexiconAnalyzer.analyze(text).unwrap().into_iter().map(|t| (t.surface, t.pos, t.is_stop)).collect()
    }

    #[test]
    fn proper_nouns_and_stopwords() {
        let out = tags("file scritti da Mario Rossi");
        assert_eq!(
            out,
            vec![
                ("file".to_string(), PartOfSpeech::Noun, false),
                ("scritti".to_string(), PartOfSpeech::Verb, false),
                ("da".to_string(), PartOfSpeech::Adposition, true),
                ("Mario".to_string(), PartOfSpeech::ProperNoun, false),
                ("Rossi".to_string(), PartOfSpeech::ProperNoun, false),
            ]
        );
    }

    #[test]
    fn elision_splits_article() {
        let out = LexiconAnalyzer.analyze("dell'ultimo anno").unwrap();
        let surfaces: Vec<&str> = out.iter().map(|t| t.surface.as_str()).collect();
        assert_eq!(surfaces, vec!["dell'", "ultimo", "anno"]);
        assert!(out[0].is_stop);
    }

    #[test]
    fn suffix_rules() {
        let out = LexiconAnalyzer.analyze("caricati intelligenza artificiale").unwrap();
        assert_eq!(out[0].pos, PartOfSpeech::Verb);
        assert_eq!(out[0].lemma, "caricare");
        assert_eq!(out[1].pos, PartOfSpeech::Noun);
        assert_eq!(out[2].pos, PartOfSpeech::Adjective);
    }

    #[test]
    fn date_entities() {
        let out = LexiconAnalyzer.analyze("1 gennaio 2020, ieri").unwrap();
        let ents: Vec<Option<EntityKind>> = out.iter().map(|t| t.entity).collect();
        assert_eq!(ents, vec![None, Some(EntityKind::Date), Some(EntityKind::Date), None, Some(EntityKind::Date)]);
    }

    #[test]
    fn proper_noun_lemma_is_lowercased() {
        let out = LexiconAnalyzer.analyze("Rossi").unwrap();
        assert_eq!(out[0].pos, PartOfSpeech::ProperNoun);
        assert_eq!(out[0].surface, "Rossi");
        assert_eq!(out[0].lemma, "rossi");
    }

    #[test]
    fn describe_line() {
        let out = LexiconAnalyzer.analyze("Rossi").unwrap();
        assert_eq!(out[0].describe(), "TOKEN: 'Rossi' | POS: PROPN | TAG: SP | ENT: ");
    }
}
