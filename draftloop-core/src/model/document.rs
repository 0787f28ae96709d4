use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{Annotation, AnnotationPolicy, EditLogEntry, HighlightColor, TextRange};
use crate::error::ReviewError;
use crate::highlight::{self, HighlightPlan};

/// Whether there is a draft to review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    Empty,
    Populated,
}

/// The proposal draft under review together with its annotations.
///
/// The draft and the annotation state share a lifecycle: replacing the draft
/// wholesale clears both the annotations and the edit log. Every other
/// mutation leaves annotations alone, even when their text disappears from
/// the draft; see [`Document::stale_annotations`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    content: String,
    annotations: Vec<Annotation>,
    edit_log: Vec<EditLogEntry>,
    pub policy: AnnotationPolicy,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(title: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            content: String::new(),
            annotations: Vec::new(),
            edit_log: Vec::new(),
            policy: AnnotationPolicy::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_policy(mut self, policy: AnnotationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn edit_log(&self) -> &[EditLogEntry] {
        &self.edit_log
    }

    pub fn state(&self) -> DraftState {
        if self.content.trim().is_empty() {
            DraftState::Empty
        } else {
            DraftState::Populated
        }
    }

    pub fn is_empty(&self) -> bool {
        self.state() == DraftState::Empty
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Replace the draft wholesale, discarding annotations and the edit log.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.content = text.into();
        let dropped = self.annotations.len();
        self.annotations.clear();
        self.edit_log.clear();
        self.touch();
        info!(words = self.word_count(), dropped, "draft replaced");
    }

    /// Append a correction as a new paragraph.
    pub fn append_text(&mut self, text: &str) -> Result<(), ReviewError> {
        if text.trim().is_empty() {
            warn!("rejected empty correction");
            return Err(ReviewError::empty_input());
        }
        if self.is_empty() {
            self.content = text.to_string();
        } else {
            self.content.push_str("\n\n");
            self.content.push_str(text);
        }
        self.touch();
        info!(chars = text.chars().count(), "appended correction");
        Ok(())
    }

    fn locate(&self, literal: &str) -> Result<TextRange, ReviewError> {
        let literal = literal.trim();
        if literal.is_empty() {
            return Err(ReviewError::empty_input());
        }
        self.content
            .find(literal)
            .map(|start| TextRange::new(start, start + literal.len()))
            .ok_or_else(|| ReviewError::NotFound(literal.to_string()))
    }

    /// Remove the first exact occurrence of `literal` (trimmed).
    ///
    /// Annotations anchored on the removed text are kept; they stop rendering
    /// and show up in [`Document::stale_annotations`].
    pub fn remove_text(&mut self, literal: &str) -> Result<TextRange, ReviewError> {
        self.replace_text(literal, "")
    }

    /// Replace the first exact occurrence of `find` (trimmed) with `replacement`.
    pub fn replace_text(&mut self, find: &str, replacement: &str) -> Result<TextRange, ReviewError> {
        let range = self.locate(find).map_err(|e| {
            warn!(error = %e, "edit rejected");
            e
        })?;
        self.content
            .replace_range(range.start_offset..range.end_offset, replacement);
        self.touch();

        let stale = self.stale_annotations().len();
        if stale > 0 {
            debug!(stale, "annotations no longer match the draft");
        }
        info!(
            removed = range.len(),
            inserted = replacement.len(),
            "draft edited"
        );
        Ok(TextRange::new(range.start_offset, range.start_offset + replacement.len()))
    }

    /// Record a highlight with feedback and return its index.
    pub fn add_annotation(
        &mut self,
        match_text: &str,
        color: HighlightColor,
        comment: &str,
    ) -> Result<usize, ReviewError> {
        if self.is_empty() {
            return Err(ReviewError::Validation("there is no draft to annotate".to_string()));
        }
        let match_text = match_text.trim();
        let comment = comment.trim();
        if match_text.is_empty() {
            return Err(ReviewError::Validation("highlighted text is empty".to_string()));
        }
        if self.policy == AnnotationPolicy::CommentRequired && comment.is_empty() {
            return Err(ReviewError::Validation("comment is empty".to_string()));
        }

        self.annotations.push(Annotation::new(
            match_text.to_string(),
            color,
            comment.to_string(),
        ));
        self.edit_log
            .push(EditLogEntry::new(match_text.to_string(), comment.to_string()));
        self.touch();

        let index = self.annotations.len() - 1;
        info!(index, text = match_text, "annotation added");
        Ok(index)
    }

    pub fn remove_annotation(&mut self, index: usize) -> Result<Annotation, ReviewError> {
        if index >= self.annotations.len() {
            return Err(ReviewError::NoSuchAnnotation(index));
        }
        self.touch();
        Ok(self.annotations.remove(index))
    }

    /// Match the annotations against the current draft
    pub fn highlight_plan(&self) -> HighlightPlan<'_> {
        highlight::plan(&self.content, &self.annotations)
    }

    /// Indices of annotations whose text no longer occurs in the draft
    pub fn stale_annotations(&self) -> Vec<usize> {
        let text = highlight::normalize_newlines(&self.content);
        self.annotations
            .iter()
            .enumerate()
            .filter(|(_, a)| !highlight::occurs_in(&text, &a.match_text))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> HighlightColor {
        HighlightColor::parse("#ffcccc").unwrap()
    }

    fn populated(text: &str) -> Document {
        let mut doc = Document::new("Test".to_string());
        doc.set_draft(text);
        doc
    }

    #[test]
    fn test_new_document_is_empty() {
        let doc = Document::new("Test".to_string());
        assert_eq!(doc.content(), "");
        assert_eq!(doc.state(), DraftState::Empty);
        assert!(doc.annotations().is_empty());
        assert!(doc.edit_log().is_empty());
    }

    #[test]
    fn test_set_draft_clears_annotations_and_log() {
        let mut doc = populated("We will deliver in 5 days.");
        doc.add_annotation("5 days", red(), "too tight").unwrap();

        doc.set_draft("new text");
        assert_eq!(doc.content(), "new text");
        assert!(doc.annotations().is_empty());
        assert!(doc.edit_log().is_empty());

        doc.set_draft("");
        assert_eq!(doc.state(), DraftState::Empty);
    }

    #[test]
    fn test_append_text() {
        let mut doc = populated("Intro");
        doc.append_text("Correction").unwrap();
        assert_eq!(doc.content(), "Intro\n\nCorrection");
    }

    #[test]
    fn test_append_to_empty_draft_populates_it() {
        let mut doc = Document::new("Test".to_string());
        doc.append_text("First words").unwrap();
        assert_eq!(doc.content(), "First words");
        assert_eq!(doc.state(), DraftState::Populated);
    }

    #[test]
    fn test_append_blank_is_rejected() {
        let mut doc = populated("Intro");
        for blank in ["", "   ", "\n\t"] {
            let err = doc.append_text(blank).unwrap_err();
            assert_eq!(err, ReviewError::Validation("empty input".to_string()));
        }
        assert_eq!(doc.content(), "Intro");
    }

    #[test]
    fn test_remove_first_occurrence() {
        let mut doc = populated("one two one");
        let range = doc.remove_text("  one ").unwrap();
        assert_eq!(range, TextRange::new(0, 0));
        assert_eq!(doc.content(), " two one");
    }

    #[test]
    fn test_remove_missing_text() {
        let mut doc = populated("hello world");
        let err = doc.remove_text("planet").unwrap_err();
        assert_eq!(err, ReviewError::NotFound("planet".to_string()));
        assert_eq!(doc.content(), "hello world");

        assert!(matches!(doc.remove_text("  "), Err(ReviewError::Validation(_))));
    }

    #[test]
    fn test_remove_on_empty_draft() {
        let mut doc = Document::new("Test".to_string());
        assert!(matches!(doc.remove_text("x"), Err(ReviewError::NotFound(_))));
    }

    #[test]
    fn test_replace_keeps_annotations() {
        let mut doc = populated("Delivery in 5 days by our team.");
        doc.add_annotation("our team", red(), "name them").unwrap();
        let range = doc.replace_text("5 days", "10 days").unwrap();
        assert_eq!(&doc.content()[range.start_offset..range.end_offset], "10 days");
        assert_eq!(doc.annotations().len(), 1);
    }

    #[test]
    fn test_add_annotation_records_log() {
        let mut doc = populated("We will deliver in 5 days.");
        let index = doc.add_annotation(" 5 days ", red(), "too tight").unwrap();
        assert_eq!(index, 0);
        assert_eq!(doc.annotations()[0].match_text, "5 days");
        assert_eq!(doc.edit_log().len(), 1);
        assert_eq!(doc.edit_log()[0].highlighted, "5 days");
        assert_eq!(doc.edit_log()[0].comment, "too tight");

        let second = doc.add_annotation("deliver", red(), "who delivers?").unwrap();
        assert_eq!(second, 1);
    }

    #[test]
    fn test_add_annotation_validation() {
        let mut doc = populated("text");
        assert!(matches!(
            doc.add_annotation("  ", red(), "comment"),
            Err(ReviewError::Validation(_))
        ));
        assert!(matches!(
            doc.add_annotation("text", red(), " "),
            Err(ReviewError::Validation(_))
        ));
        assert!(doc.annotations().is_empty());
        assert!(doc.edit_log().is_empty());

        let mut minimal = populated("text").with_policy(AnnotationPolicy::HighlightOnly);
        assert_eq!(minimal.add_annotation("text", red(), "").unwrap(), 0);
    }

    #[test]
    fn test_add_annotation_requires_draft() {
        let mut doc = Document::new("Test".to_string());
        assert!(matches!(
            doc.add_annotation("x", red(), "y"),
            Err(ReviewError::Validation(_))
        ));
    }

    #[test]
    fn test_remove_annotation_keeps_log() {
        let mut doc = populated("alpha beta");
        doc.add_annotation("alpha", red(), "a").unwrap();
        doc.add_annotation("beta", red(), "b").unwrap();

        let removed = doc.remove_annotation(0).unwrap();
        assert_eq!(removed.match_text, "alpha");
        assert_eq!(doc.annotations()[0].match_text, "beta");
        assert_eq!(doc.edit_log().len(), 2);
        assert_eq!(doc.remove_annotation(5), Err(ReviewError::NoSuchAnnotation(5)));
    }

    #[test]
    fn test_stale_annotations_after_removal() {
        let mut doc = populated("hello world");
        doc.add_annotation("world", red(), "vague").unwrap();
        doc.add_annotation("HELLO", red(), "greeting").unwrap();
        assert!(doc.stale_annotations().is_empty());

        doc.remove_text("world").unwrap();
        assert_eq!(doc.stale_annotations(), vec![0]);
        assert_eq!(doc.annotations().len(), 2);
    }

    #[test]
    fn test_word_count() {
        let doc = populated("Hello world\n\nagain");
        assert_eq!(doc.word_count(), 3);
    }
}
