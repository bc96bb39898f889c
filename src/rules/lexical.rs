//! Reusable grammar fragments.
//!
//! Everything here is a plain pattern *source* (no compiled state). The case
//! table in `cases.rs` splices these fragments together, and the whole grammar
//! is compiled once with case-insensitive, whitespace-insensitive (`x`) flags.
//!
//! ```text
//! UNITS ─┬─────────────── TENS ──┬── HUNDREDS ──┬── THOUSANDS ──┐
//! TEENS ─┴───────────────────────┴──────────────┴─ SUB_THOUSAND ┴─ WORD_NUMBER
//!                                                                     │
//!                                       \d{1,6} ──────────────── NUMBER_VARIANT
//! MONTHS ── DATE_TOKEN
//! ```
//!
//! Separators between numeral parts follow Italian spelling habits: written
//! together ("duecento"), with spaces ("due cento") or hyphenated ("due-cento").

use once_cell::sync::Lazy;

// --- Closed word classes ----------------------------------------------------

/// Definite articles, including the elided `l'`.
pub(crate) const ART_DET: &str = r"(?:il|la|lo|l['’]|i|gli|le)";

/// Articulated prepositions (`del`, `nella`, `sugli`, ...).
pub(crate) const PREP_ART: &str = r"(?:del|della|dello|dei|degli|delle|al|alla|allo|ai|agli|alle|dal|dalla|dallo|dai|dagli|dalle|nel|nella|nello|nei|negli|nelle|sul|sulla|sullo|sui|sugli|sulle)";

/// Simple prepositions plus the most common contracted forms.
pub(crate) const PREP_SEM: &str = r"(?:a|ad|al|alla|all'|ai|agli|alle|da|di|in|con|su|per|tra|fra)";

pub(crate) const ART_INDET: &str = r"(?:un|una|uno)";

/// Personal and clitic pronouns.
pub(crate) const PRON: &str = r"(?:io|tu|egli|lui|lei|noi|voi|essi|loro|mi|ti|ci|vi|lo|la|li|le|ne|si)";

/// Prepositions that end a topic phrase. Narrower than [`PREP_SEM`]: `di`,
/// `su` and `all'` may sit inside a topic ("storia di Roma").
pub(crate) const TOPIC_BREAK_PREP: &str = r"(?:a|ad|al|alla|ai|agli|da|in|con|per|tra|fra)";

// --- Dates ------------------------------------------------------------------

/// Month names, full or abbreviated to their first three letters.
pub(crate) const MONTHS: &str = r"(?:gen(?:naio)?|feb(?:braio)?|mar(?:zo)?|apr(?:ile)?|mag(?:gio)?|giu(?:gno)?|lug(?:lio)?|ago(?:sto)?|set(?:tembre)?|ott(?:obre)?|nov(?:embre)?|dic(?:embre)?)";

/// A single date: "12 maggio 2023", "12 maggio", "maggio 2023", "12/05/23",
/// "12-05", "2023" or just "maggio".
pub(crate) static DATE_TOKEN: Lazy<String> = Lazy::new(|| {
    format!(
        r"
        (?:
            \d{{1,2}}\s*{m}\s*\d{{4}}
          | \d{{1,2}}\s*{m}
          | {m}\s*\d{{4}}
          | \d{{1,2}}[/.\s-]\d{{1,2}}(?:[/.\s-]\d{{2,4}})?
          | \d{{4}}
          | {m}
        )",
        m = MONTHS
    )
});

// --- Numerals ---------------------------------------------------------------

/// Optional joint between numeral parts: nothing, blanks, or a hyphen.
const JOINT: &str = r"(?:\s*|-)?";

pub(crate) const UNITS: &str = r"(?:un[oa]|due|tr[eèé]|quattro|cinque|sei|sette|otto|nove)";

pub(crate) const TEENS: &str =
    r"(?:dieci|undici|dodici|tredici|quattordici|quindici|sedici|diciassette|diciotto|diciannove)";

const TENS_PREFIX: &str = r"(?:vent|trent|quarant|cinquant|sessant|settant|ottant|novant)";

/// 20..99. The final vowel of the tens word is optional so that elided forms
/// ("ventuno", "trentotto") match as well as the full ones ("ventitré").
pub(crate) static TENS: Lazy<String> =
    Lazy::new(|| format!(r"(?:{TENS_PREFIX}(?:i|a)?{JOINT}{UNITS}?)"));

pub(crate) static HUNDREDS: Lazy<String> = Lazy::new(|| format!(r"(?:cento|{UNITS}{JOINT}cento)"));

pub(crate) static THOUSANDS: Lazy<String> = Lazy::new(|| {
    let tens = &*TENS;
    let hundreds = &*HUNDREDS;
    format!(
        r"
        (?:
            mille
          | {UNITS}{JOINT}mila
          | {tens}{JOINT}mila
          | {hundreds}(?:{JOINT}(?:{tens}|{TEENS}|{UNITS})?){JOINT}mila
        )"
    )
});

/// 1..999 in words.
pub(crate) static SUB_THOUSAND: Lazy<String> = Lazy::new(|| {
    let tens = &*TENS;
    let hundreds = &*HUNDREDS;
    format!(
        r"
        (?:
            {hundreds}{JOINT}(?:{tens}|{TEENS}|{UNITS})?
          | {tens}
          | {TEENS}
          | {UNITS}
        )"
    )
});

/// 1..999 999 in words. A thousands word may stand alone ("duemila").
pub(crate) static WORD_NUMBER: Lazy<String> = Lazy::new(|| {
    let thousands = &*THOUSANDS;
    let sub = &*SUB_THOUSAND;
    format!(r"(?:{thousands}(?:{JOINT}{sub})?|{sub})")
});

/// Digits (up to six) or a number in words.
pub(crate) static NUMBER_VARIANT: Lazy<String> = Lazy::new(|| format!(r"(?:\d{{1,6}}|{})", &*WORD_NUMBER));

// --- Names ------------------------------------------------------------------

/// One to five name-like tokens: words (optionally abbreviated with a dot),
/// apostrophes or hyphens, with any spacing in between.
pub(crate) const NAME_TOKENS: &str = r"(?:\s*(?:[A-ZÀ-ÖØ-Ýa-zà-öø-ý]+\.?|['’-])\s*){1,5}";
