use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::model::{Annotation, Document, EditLogEntry};
use crate::render::strip_markup;

/// Receives the finished draft as plain text
pub trait ExportSink {
    type Output;

    fn export(&self, title: &str, text: &str) -> Result<Self::Output>;
}

/// The draft as handed to export sinks: every markup tag removed
pub fn clean_text(doc: &Document) -> String {
    strip_markup(doc.content())
}

/// Hand the cleaned draft to `sink`.
pub fn finalize<S: ExportSink>(doc: &Document, sink: &S) -> Result<S::Output> {
    let text = clean_text(doc);
    info!(words = text.split_whitespace().count(), "finalizing draft");
    sink.export(&doc.title, &text)
}

/// JSON export of a review session
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub id: String,
    pub title: String,
    pub content: String,
    pub word_count: usize,
    pub annotations: Vec<ExportAnnotation>,
    pub edit_log: Vec<EditLogEntry>,
    pub prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportAnnotation {
    pub index: usize,
    pub text: String,
    pub color: String,
    pub comment: String,
    pub stale: bool,
}

impl ExportAnnotation {
    fn new(index: usize, ann: &Annotation, stale: bool) -> Self {
        Self {
            index,
            text: ann.match_text.clone(),
            color: ann.color.to_string(),
            comment: ann.comment.clone(),
            stale,
        }
    }
}

impl From<&Document> for ExportDocument {
    fn from(doc: &Document) -> Self {
        let stale = doc.stale_annotations();
        Self {
            id: doc.id.to_string(),
            title: doc.title.clone(),
            content: clean_text(doc),
            word_count: doc.word_count(),
            annotations: doc
                .annotations()
                .iter()
                .enumerate()
                .map(|(i, a)| ExportAnnotation::new(i, a, stale.contains(&i)))
                .collect(),
            edit_log: doc.edit_log().to_vec(),
            prompt: revision_prompt(doc),
        }
    }
}

pub fn to_json(doc: &Document) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ExportDocument::from(doc))
}

/// Build a prompt asking the model to revise the draft according to the
/// reviewer's annotations.
pub fn revision_prompt(doc: &Document) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!("## Proposal: {}\n\n", doc.title));
    prompt.push_str("Please revise this proposal draft based on the reviewer feedback below.\n\n");

    prompt.push_str("### Current Draft\n\n");
    prompt.push_str(&clean_text(doc));
    prompt.push_str("\n\n---\n\n");

    let stale = doc.stale_annotations();
    let live: Vec<_> = doc
        .annotations()
        .iter()
        .enumerate()
        .filter(|(i, _)| !stale.contains(i))
        .map(|(_, a)| a)
        .collect();

    if live.is_empty() {
        prompt.push_str("No reviewer feedback. Tighten wording and fix any errors.\n");
        return prompt;
    }

    prompt.push_str(&format!("### Reviewer Feedback ({} items)\n\n", live.len()));
    for ann in live {
        prompt.push_str(&format!("**\"{}\"**\n", ann.match_text));
        if ann.comment.is_empty() {
            prompt.push_str("- Feedback: (highlighted for attention)\n\n");
        } else {
            prompt.push_str(&format!("- Feedback: {}\n\n", ann.comment));
        }
    }

    prompt.push_str("---\n\n");
    prompt.push_str("Return only the revised proposal text, with every item of feedback addressed.");

    prompt
}
