//! Date-range deduplication.
//!
//! The three date-range shapes overlap heavily: "dal 1 maggio 2023 al 3 giugno
//! 2023" also contains the single-anchor match "dal 1 maggio 2023". Every hit
//! of one scan is buffered and collapsed here, once, after all cases ran.
//!
//! ## Policy
//!
//! 1. If any fragment carries a four-digit year, only year-bearing fragments
//!    are considered; otherwise the year-less ones are.
//! 2. Longest fragment first (stable for equal lengths, measured in chars).
//! 3. A fragment is kept unless it is a substring of one already kept.
//!
//! The output order is the kept order: longest first.

use crate::DateLabel;

/// A buffered date-range hit.
pub(crate) type DateFragment = (DateLabel, String);

pub(crate) fn dedup_date_fragments(buffer: Vec<DateFragment>) -> Vec<DateFragment> {
    let year = regex!(r"\b\d{4}\b");

    let (with_year, without_year): (Vec<_>, Vec<_>) =
        buffer.into_iter().partition(|(_, fragment)| year.is_match(fragment));
    let mut candidates = if with_year.is_empty() { without_year } else { with_year };

    candidates.sort_by_key(|(_, fragment)| std::cmp::Reverse(fragment.chars().count()));

    let mut kept: Vec<DateFragment> = Vec::with_capacity(candidates.len());
    for (label, fragment) in candidates {
        if !kept.iter().any(|(_, existing)| existing.contains(fragment.as_str())) {
            kept.push((label, fragment));
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use DateLabel::*;

    fn frags(items: &[(DateLabel, &str)]) -> Vec<DateFragment> {
        items.iter().map(|(l, f)| (*l, f.to_string())).collect()
    }

    #[test]
    fn year_qualified_fragment_wins() {
        let out = dedup_date_fragments(frags(&[(SingleAnchor, "12 maggio"), (SingleAnchor, "12 maggio 2023")]));
        assert_eq!(out, frags(&[(SingleAnchor, "12 maggio 2023")]));
    }

    #[test]
    fn range_subsumes_its_anchor() {
        let out = dedup_date_fragments(frags(&[
            (FromTo, "dal 1 gennaio 2020 al 15 marzo 2020"),
            (SingleAnchor, "dal 1 gennaio 2020"),
        ]));
        assert_eq!(out, frags(&[(FromTo, "dal 1 gennaio 2020 al 15 marzo 2020")]));
    }

    #[test]
    fn without_years_nothing_distinct_is_dropped() {
        let out = dedup_date_fragments(frags(&[
            (SingleAnchor, "prima di marzo"),
            (Between, "tra marzo e aprile"),
            (SingleAnchor, "di marzo"),
        ]));
        assert_eq!(out, frags(&[(Between, "tra marzo e aprile"), (SingleAnchor, "prima di marzo")]));
    }

    #[test]
    fn equal_lengths_keep_buffer_order() {
        let out = dedup_date_fragments(frags(&[(SingleAnchor, "dopo il 2021"), (SingleAnchor, "prima 2019")]));
        assert_eq!(out, frags(&[(SingleAnchor, "dopo il 2021"), (SingleAnchor, "prima 2019")]));
        let out = dedup_date_fragments(frags(&[(SingleAnchor, "dopo 2021"), (SingleAnchor, "dopo 2020")]));
        assert_eq!(out, frags(&[(SingleAnchor, "dopo 2021"), (SingleAnchor, "dopo 2020")]));
    }

    #[test]
    fn empty_buffer() {
        assert!(dedup_date_fragments(Vec::new()).is_empty());
    }
}
