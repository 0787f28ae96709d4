//! Locating annotations in the draft.
//!
//! Annotations are anchored by their literal text, not by offsets, so every
//! render has to find them again. Each annotation claims at most one
//! occurrence: the first case-insensitive match that does not overlap a range
//! already claimed by a longer annotation.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::model::{Annotation, TextRange};

/// An annotation resolved to a concrete range of the normalized draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight<'a> {
    pub index: usize,
    pub range: TextRange,
    pub annotation: &'a Annotation,
}

/// Result of matching every annotation against the draft
#[derive(Debug, Clone)]
pub struct HighlightPlan<'a> {
    /// Draft text with runs of blank lines collapsed. All ranges index into this.
    pub text: Cow<'a, str>,
    /// Claimed ranges, ordered by start offset, never overlapping
    pub highlights: Vec<Highlight<'a>>,
    /// Annotations whose text occurs only inside longer highlights
    pub covered: Vec<usize>,
    /// Annotations whose text no longer occurs at all
    pub unmatched: Vec<usize>,
}

impl HighlightPlan<'_> {
    pub fn highlight_for(&self, index: usize) -> Option<&Highlight<'_>> {
        self.highlights.iter().find(|h| h.index == index)
    }
}

/// Collapse runs of three or more newlines (CRLF included) into a blank line.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    static BLANK_RUNS: OnceLock<Regex> = OnceLock::new();
    let re = BLANK_RUNS.get_or_init(|| Regex::new(r"(?:\r?\n){3,}").expect("static regex"));

    let text: Cow<'_, str> = if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    };
    let collapsed = match re.replace_all(&text, "\n\n") {
        Cow::Owned(collapsed) => Some(collapsed),
        Cow::Borrowed(_) => None,
    };
    collapsed.map_or(text, Cow::Owned)
}

/// Annotation indices in the order they are applied: longest text first,
/// insertion order among equals.
pub fn priority_order(annotations: &[Annotation]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..annotations.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(annotations[i].match_text.chars().count()));
    order
}

/// Needles are normalized like the draft so CRLF text still matches.
fn literal_pattern(needle: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(&normalize_newlines(needle)))
        .case_insensitive(true)
        .build()
        .map_err(|e| warn!(error = %e, "could not build highlight pattern"))
        .ok()
}

/// Case-insensitive literal search
pub fn occurs_in(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && literal_pattern(needle).is_some_and(|re| re.is_match(haystack))
}

/// Match `annotations` against `content`.
pub fn plan<'a>(content: &'a str, annotations: &'a [Annotation]) -> HighlightPlan<'a> {
    let text = normalize_newlines(content);
    let mut highlights: Vec<Highlight<'a>> = Vec::new();
    let mut covered = Vec::new();
    let mut unmatched = Vec::new();

    for index in priority_order(annotations) {
        let annotation = &annotations[index];
        let Some(re) = (!annotation.match_text.is_empty())
            .then(|| literal_pattern(&annotation.match_text))
            .flatten()
        else {
            unmatched.push(index);
            continue;
        };

        let mut found = false;
        let mut claimed = None;
        let mut start = 0;
        while let Some(m) = re.find_at(&text, start) {
            found = true;
            let range = TextRange::new(m.start(), m.end());
            if !range.is_empty() && highlights.iter().all(|h| !h.range.overlaps(&range)) {
                claimed = Some(range);
                break;
            }
            // Retry one character later so overlapping occurrences are considered.
            start = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
            if start > text.len() {
                break;
            }
        }

        match (claimed, found) {
            (Some(range), _) => highlights.push(Highlight {
                index,
                range,
                annotation,
            }),
            (None, true) => covered.push(index),
            (None, false) => unmatched.push(index),
        }
    }

    highlights.sort_by_key(|h| h.range.start_offset);
    unmatched.sort_unstable();
    covered.sort_unstable();

    HighlightPlan {
        text,
        highlights,
        covered,
        unmatched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HighlightColor;

    fn ann(text: &str) -> Annotation {
        Annotation::new(text.to_string(), HighlightColor::default(), String::new())
    }

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(normalize_newlines("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize_newlines("a\r\n\r\n\r\nb\r\nc"), "a\n\nb\nc");
        assert!(matches!(normalize_newlines("a\n\nb"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_priority_longest_first_then_insertion() {
        let anns = vec![ann("ab"), ann("abc"), ann("xy"), ann("a")];
        assert_eq!(priority_order(&anns), vec![1, 0, 2, 3]);
    }

    #[test]
    fn test_first_occurrence_only() {
        let anns = vec![ann("day")];
        let plan = plan("day after day", &anns);
        assert_eq!(plan.highlights.len(), 1);
        assert_eq!(plan.highlights[0].range, TextRange::new(0, 3));
    }

    #[test]
    fn test_case_insensitive() {
        let anns = vec![ann("DELIVER")];
        let plan = plan("We will deliver.", &anns);
        assert_eq!(plan.highlights[0].range, TextRange::new(8, 15));
    }

    #[test]
    fn test_longer_annotation_claims_first() {
        let anns = vec![ann("AB"), ann("ABC")];
        let plan = plan("ABC", &anns);
        assert_eq!(plan.highlights.len(), 1);
        assert_eq!(plan.highlights[0].index, 1);
        assert_eq!(plan.covered, vec![0]);
    }

    #[test]
    fn test_shorter_annotation_moves_to_free_occurrence() {
        let anns = vec![ann("AB"), ann("ABC")];
        let plan = plan("ABC then AB", &anns);
        assert_eq!(plan.highlights.len(), 2);
        assert_eq!(plan.highlights[1].index, 0);
        assert_eq!(plan.highlights[1].range, TextRange::new(9, 11));
    }

    #[test]
    fn test_overlapping_occurrence_is_retried() {
        let anns = vec![ann("aaa"), ann("aa")];
        let plan = plan("aaaaa", &anns);
        assert_eq!(plan.highlights.len(), 2);
        assert_eq!(plan.highlights[1].range, TextRange::new(3, 5));
    }

    #[test]
    fn test_pattern_syntax_is_literal() {
        let anns = vec![ann("$5.00 (net)")];
        let plan = plan("Price: $5.00 (net) or $5x00 net", &anns);
        assert_eq!(plan.highlights[0].range, TextRange::new(7, 18));
        assert!(occurs_in("a.b", "."));
        assert!(!occurs_in("ab", "a.b"));
    }

    #[test]
    fn test_unmatched_reported() {
        let anns = vec![ann("world"), ann("")];
        let plan = plan("hello", &anns);
        assert!(plan.highlights.is_empty());
        assert_eq!(plan.unmatched, vec![0, 1]);
    }

    #[test]
    fn test_ranges_index_normalized_text() {
        let anns = vec![ann("second")];
        let plan = plan("first\n\n\n\nsecond", &anns);
        assert_eq!(plan.text, "first\n\nsecond");
        assert_eq!(&plan.text[plan.highlights[0].range.start_offset..], "second");
    }

    #[test]
    fn test_crlf_annotation_matches_crlf_draft() {
        let anns = vec![ann("Scope\r\nTimeline")];
        let plan = plan("Scope\r\nTimeline follows", &anns);
        assert_eq!(plan.highlights[0].range, TextRange::new(0, 14));
        assert!(plan.unmatched.is_empty());
        assert!(occurs_in(&normalize_newlines("a\r\nb"), "A\r\nB"));
    }
}
