use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::entry::Entry;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Best score of `query` against the searchable fields of `entry`.
pub fn entry_score(matcher: &SkimMatcherV2, entry: &Entry, query: &str) -> Option<i64> {
    let emotion = entry.emotion().map(|emotion| emotion.label());
    let primary = entry.primary().map(|primary| primary.label());

    [
        Some(entry.title.as_str()),
        Some(entry.body.as_str()),
        entry.location.as_deref(),
        entry.ocr_text.as_deref(),
        emotion,
        primary,
    ]
    .into_iter()
    .flatten()
    .filter_map(|text| fuzzy_match_score(matcher, text, query))
    .max()
}

/// Entries matching `query`, in their original order. A blank query keeps everything.
pub fn filter_entries(entries: &[Entry], query: &str) -> Vec<Entry> {
    let query = query.trim();
    if query.is_empty() {
        return entries.to_vec();
    }

    let matcher = SkimMatcherV2::default();
    entries
        .iter()
        .filter(|entry| entry_score(&matcher, entry, query).is_some())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Classification, EntryId};
    use crate::taxonomy::Secondary;

    fn entries() -> Vec<Entry> {
        let mut walk = Entry::new(EntryId::new("walk"), "Evening walk", "2024-04-01")
            .with_classification(Classification::new(Secondary::Calm, 0.4, -0.6, 0.8));
        walk.location = Some("Lisbon".to_owned());
        let deadline = Entry::new(EntryId::new("deadline"), "Missed the deadline", "2024-04-02")
            .with_classification(Classification::new(Secondary::Frustration, -0.4, 0.6, 0.8));
        let pending = Entry::new(EntryId::new("pending"), "Untitled", "2024-04-03");
        vec![walk, deadline, pending]
    }

    fn ids(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.id.as_str()).collect()
    }

    #[test]
    fn blank_query_keeps_everything() {
        assert_eq!(ids(&filter_entries(&entries(), "  ")), ["walk", "deadline", "pending"]);
    }

    #[test]
    fn matches_title_location_and_labels() {
        let all = entries();
        assert_eq!(ids(&filter_entries(&all, "deadline")), ["deadline"]);
        assert_eq!(ids(&filter_entries(&all, "lisbon")), ["walk"]);
        assert_eq!(ids(&filter_entries(&all, "anger")), ["deadline"]);
        assert!(filter_entries(&all, "qqqxz").is_empty());
    }
}
