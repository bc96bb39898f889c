//! The case grammar: for every [`Case`], its ordered pattern sources.
//!
//! Pattern order inside a case is significant: the scanner runs them in the
//! order listed here and reports retained matches in that order.

use super::lexical::{
    ART_DET, ART_INDET, DATE_TOKEN, NAME_TOKENS, NUMBER_VARIANT, PREP_ART, PREP_SEM, PRON, TOPIC_BREAK_PREP,
    WORD_NUMBER,
};
use crate::{Case, DateLabel};

/// How a raw regex hit is turned into a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Extract {
    /// The whole match, trimmed.
    Whole,
    /// The first quote-aware term group that participated (`dq`, `sq`, `tq`,
    /// `ts`, `bare`).
    Term,
    /// A FILTER_BY_DATE_RANGE sub-shape.
    Date(DateLabel),
    /// "autore: Nome" style: the optional `sep` group must not be followed by
    /// a function word.
    LabelledName,
    /// Introducer followed by a `tail` group that is cut at the first
    /// function word.
    TopicRun,
}

/// A pattern before compilation.
#[derive(Debug, Clone)]
pub(crate) struct PatternSpec {
    pub name: &'static str,
    pub source: String,
    pub extract: Extract,
}

fn spec(name: &'static str, source: impl Into<String>, extract: Extract) -> PatternSpec {
    PatternSpec { name, source: source.into(), extract }
}

/// Full case table, in scan order.
pub(crate) fn table() -> Vec<(Case, Vec<PatternSpec>)> {
    Case::ALL.iter().map(|&case| (case, patterns(case))).collect()
}

pub(crate) fn patterns(case: Case) -> Vec<PatternSpec> {
    match case {
        Case::DateToken => vec![spec("date token", DATE_TOKEN.as_str(), Extract::Whole)],
        Case::WordNumber => vec![spec("number in words", format!(r"\b{}\b", &*WORD_NUMBER), Extract::Whole)],
        Case::SortUploadDate => sort_upload_date(),
        Case::LimitResults => limit_results(),
        Case::FindByAuthor => find_by_author(),
        Case::FilterByDateRange => filter_by_date_range(),
        Case::SearchByKeyword => search_by_keyword(),
        Case::AboutTopic => about_topic(),
        Case::FilterByRelTime => filter_by_rel_time(),
    }
}

fn sort_upload_date() -> Vec<PatternSpec> {
    vec![
        spec("sort: english verb", r"\bsort(?:ing)?\b", Extract::Whole),
        spec(
            "sort: ascending/descending",
            r"
            \b(?:ordin(?:e|a|are|ati|ament[oi]|azion[ei]))
            (?:\s+\w+){0,3}?
            \s+(?:crescente|decrescente|ascendente|discendente|cronologico\s+inverso|cronologico|inverso)
            \b",
            Extract::Whole,
        ),
        spec("sort: last n files", r"\bultim[ioaie]*\s+\d*\s*file\b", Extract::Whole),
        spec(
            "sort: natural phrasing",
            r"
            \b
            (?:
                data\s+(?:di\s+)?(?:caricamento|upload|creazione|pubblicazione)
              | dal\s+più\s+(?:recente|vecchio)\s+al\s+più\s+(?:vecchio|recente)
              | dai\s+più\s+(?:recenti|vecchi)\s+ai\s+più\s+(?:vecchi|recenti)
              | più\s+(?:recent[ei]|vecch[io])(?:\s+(?:in\s+cima|prima))?
              | recent[ei]
              | vecch[io]
              | (?:newest|oldest)\s+first
              | most\s+recent
            )\b.*\n?\z",
            Extract::Whole,
        ),
        spec("sort: position", r"\b(?:sopra|in\s+basso)\b", Extract::Whole),
    ]
}

fn limit_results() -> Vec<PatternSpec> {
    vec![spec(
        "limit: quantifier + number",
        format!(
            r"
            \b
            (?:
                (?:primi|prime|top|ultimi|ultime
                  |solo|(?:al\s+)?massim[oaie](?:\s+di)?
                  |non\s+più\s+di|fino\s+a|esattamente|voglio|mostrami|visualizza)
                \s+
                {number}
            )
            (?:\s+(?:file|documenti|risultat[aeio]*|elementi|record|articoli|atti))?
            \b",
            number = &*NUMBER_VARIANT
        ),
        Extract::Whole,
    )]
}

fn find_by_author() -> Vec<PatternSpec> {
    let subject = r"(?:file|document[io]i?|atti|articoli|pdf)";
    vec![
        spec(
            "author: explicit label",
            format!(
                r"
                \b(?:autore|autrice|author|responsabile(?:\s+progetto)?)\b
                (?P<sep>\s*[:=\-–]\s*)?
                (?P<name>{NAME_TOKENS})"
            ),
            Extract::LabelledName,
        ),
        spec(
            "author: agent complement",
            format!(
                r"
                \b{subject}?
                (?:\s+che)?\s+
                (?:scrit[toi]|redatt[oi]|firmat[oi]|realizzat[oi]|prodott[oi]|fatt[oi])
                (?:\s+da)?\s*
                {NAME_TOKENS}"
            ),
            Extract::Whole,
        ),
        spec(
            "author: possessive",
            format!(
                r"
                \b{subject}
                (?:\s+(?:archiviat[oi]|intitolat[oi]|registrat[oi]|propriet[aà]|curat[oi]))?
                \s+(?:di|del(?:la)?|d[ei]gli?)\s+
                {NAME_TOKENS}"
            ),
            Extract::Whole,
        ),
    ]
}

fn filter_by_date_range() -> Vec<PatternSpec> {
    let date = DATE_TOKEN.as_str();
    vec![
        spec(
            "date range: dal X al Y",
            format!(
                r"
                \b(?:da|dal|dalla)\b\s*
                (?:{ART_DET}\s*)?{date}\s+
                \b(?:a|al|alla)\b\s*
                (?:{ART_DET}\s*)?{date}\b"
            ),
            Extract::Date(DateLabel::FromTo),
        ),
        spec(
            "date range: tra X e Y",
            format!(
                r"
                \btra\b\s*
                (?:{ART_DET}\s*)?{date}\s+
                \be\b\s*
                (?:{ART_DET}\s*)?{date}\b"
            ),
            Extract::Date(DateLabel::Between),
        ),
        spec(
            "date range: single anchor",
            format!(
                r"
                \b
                (?:prima|dopo|entro(?:\s+fine)?|il|fino(?:\s+a(?:l|lla)?)?|da|dal|dalla|del|di|della)
                \b\s*
                (?:mese\s+di\s+)?
                (?:data\s+)?
                (?:{ART_DET}\s*)?
                {date}\b"
            ),
            Extract::Date(DateLabel::SingleAnchor),
        ),
    ]
}

fn search_by_keyword() -> Vec<PatternSpec> {
    vec![spec(
        "keyword: synonym + term",
        r#"
        \b(?:keywords?|termin[ei]|parol[ae]|string(?:a|he))\b
        [\s:–-]*
        (?P<term>
            "(?P<dq>.*?)"
          | '(?P<sq>[^']+)'
          | “(?P<tq>[^”]+)”
          | ‘(?P<ts>[^’]+)’
          | (?P<bare>[^\s"“”‘’]+)
        )"#,
        Extract::Term,
    )]
}

fn about_topic() -> Vec<PatternSpec> {
    let either_prep = format!("(?:{PREP_SEM}|{PREP_ART})");
    vec![spec(
        "topic: introducer + run",
        format!(
            r"
            \b(?:
                parl(?:a|ano|are|ano\s+del)
              | (?:che\s+)?tratt(?:a|ano)
              | riguard(?:a|ano)
              | relativ[aeio]\s+{either_prep}
              | sul\s+tema\s+{either_prep}
              | a\s+proposito\s+di
              | a\s+riguard[oa]\s+{either_prep}
              | inerent[ea]\s+{either_prep}
              | concernent[ea]\s+{either_prep}
              | (?:su|sul|sull'|sulla|sulle|sui|sugli)
            )\b
            (?:\s+{either_prep})?
            (?P<tail>(?:\s+[^\s.,;!?]+)+)"
        ),
        Extract::TopicRun,
    )]
}

fn filter_by_rel_time() -> Vec<PatternSpec> {
    let unit = r"(?:giorni?|settiman[ae]|mesi|anni|ore|minuti|secondi)";
    let deictic_unit = r"(?:anno|settiman[ae]|mes[ei]|giorn[oi]|or[ae]|minut[oi]|second[oi]|momento|istante)";
    vec![
        spec(
            "rel time: last n units",
            format!(
                r"
                \b
                (?:(?:nel(?:la|lo|le|li|l')?|negli?[aeio]?|lo|la|quest[oa])\s+)?
                ultim[ioaie]*\s+(?:\d+|[a-z]+)\s+
                {unit}
                \b"
            ),
            Extract::Whole,
        ),
        spec("rel time: n units ago", format!(r"\b(?:\d+|[a-z]+)\s+{unit}\s+fa\b"), Extract::Whole),
        spec("rel time: compact unit", r"\b\d+\s*(?:h|ore|m|min|s|sec)\b", Extract::Whole),
        spec("rel time: ieri/oggi", r"\b(?:ieri(?:\s+l['’]altro)?|l['’]altro\s*ieri|oggi)\b", Extract::Whole),
        spec(
            "rel time: nella scorsa unit",
            r"\b(?:nella|nello|nelle|negli?)\s+scors[oa]\s+(?:giorni?|settimana|mesi?|anni|ore|minuti|secondi)\b",
            Extract::Whole,
        ),
        spec("rel time: unit scorsa", r"\b(?:mese|anno|settimana)\s+scors[oa]\b", Extract::Whole),
        spec("rel time: pochi/qualche units", format!(r"\b(?:pochi|qualche)\s+{unit}\b"), Extract::Whole),
        spec("rel time: quest'unit", format!(r"\bquest[aeio'’]\s*{deictic_unit}\b"), Extract::Whole),
        spec("rel time: ultima unit", format!(r"\bultim[aeio'’]\s*{deictic_unit}\b"), Extract::Whole),
        spec(
            "rel time: dell'ultimo unit",
            r"\bdell['’]ultimo\s+(?:anno|settimana|mese|giorno|ora|minuto|secondo)s?\b",
            Extract::Whole,
        ),
    ]
}

/// Words that may not open an author name right after an explicit
/// "autore:" label.
pub(crate) fn name_opener_stopwords() -> String {
    format!(r"^(?:{ART_DET}|{ART_INDET}|{PREP_SEM}|{PREP_ART}|{PRON})\b")
}

/// The name grammar anchored at the start of the haystack. Used when a
/// separator is rejected: a hyphen is itself a name token, so the name may
/// begin on it.
pub(crate) fn anchored_name() -> String {
    format!(r"^{NAME_TOKENS}")
}

/// Words that end a topic run.
pub(crate) fn topic_breakers() -> String {
    format!(r"^(?:{ART_DET}|{ART_INDET}|{PREP_ART}|{TOPIC_BREAK_PREP})\b")
}

