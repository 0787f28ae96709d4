//! Markup view of the draft with highlights applied.

use std::sync::OnceLock;

use regex::Regex;

use crate::highlight::{self, Highlight};
use crate::model::{Annotation, Document};

/// Render the document's draft as HTML paragraphs with highlight spans.
pub fn render(doc: &Document) -> String {
    render_annotations(doc.content(), doc.annotations())
}

/// Render `content` with `annotations` applied.
///
/// The output depends only on the inputs, so repeated calls produce identical
/// strings. Annotations that no longer match are skipped.
pub fn render_annotations(content: &str, annotations: &[Annotation]) -> String {
    if content.is_empty() {
        return String::new();
    }

    let plan = highlight::plan(content, annotations);
    let text: &str = &plan.text;
    let mut writer = MarkupWriter::new(text, &plan.highlights);

    static BREAKS: OnceLock<Regex> = OnceLock::new();
    let breaks = BREAKS.get_or_init(|| Regex::new(r"\n\n|\n").expect("static regex"));

    let mut pos = 0;
    for m in breaks.find_iter(text) {
        writer.write_text(pos, m.start());
        if m.len() == 2 {
            writer.write_raw("</p>\n<p>");
        } else {
            writer.write_raw("<br>\n");
        }
        pos = m.end();
    }
    writer.write_text(pos, text.len());
    writer.finish()
}

/// Remove every markup tag, leaving the text between them.
pub fn strip_markup(text: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^<>]*>").expect("static regex"));
    tags.replace_all(text, "").into_owned()
}

struct MarkupWriter<'t, 'h> {
    text: &'t str,
    highlights: &'h [Highlight<'h>],
    next: usize,
    open: Option<usize>,
    out: String,
}

impl<'t, 'h> MarkupWriter<'t, 'h> {
    fn new(text: &'t str, highlights: &'h [Highlight<'h>]) -> Self {
        let mut out = String::with_capacity(text.len() + highlights.len() * 96 + 16);
        out.push_str("<p>");
        Self {
            text,
            highlights,
            next: 0,
            open: None,
            out,
        }
    }

    /// Emit `text[start..end]`, which contains no newlines.
    fn write_text(&mut self, mut start: usize, end: usize) {
        while start < end {
            while self
                .highlights
                .get(self.next)
                .is_some_and(|h| h.range.end_offset <= start)
            {
                self.next += 1;
            }
            let stop = match self.highlights.get(self.next) {
                Some(h) if h.range.start_offset <= start => {
                    self.open_span(self.next);
                    end.min(h.range.end_offset)
                }
                Some(h) => {
                    self.close_span();
                    end.min(h.range.start_offset)
                }
                None => {
                    self.close_span();
                    end
                }
            };
            escape_into(&self.text[start..stop], &mut self.out);
            start = stop;
        }
    }

    fn write_raw(&mut self, markup: &str) {
        self.close_span();
        self.out.push_str(markup);
    }

    fn open_span(&mut self, slot: usize) {
        if self.open == Some(slot) {
            return;
        }
        self.close_span();
        let annotation = self.highlights[slot].annotation;
        self.out.push_str("<span style=\"background-color: ");
        self.out.push_str(annotation.color.as_str());
        self.out.push_str("; padding: 0 2px; border-radius: 3px;\"");
        if !annotation.comment.is_empty() {
            self.out.push_str(" title=\"");
            escape_into(&annotation.comment, &mut self.out);
            self.out.push('"');
        }
        self.out.push('>');
        self.open = Some(slot);
    }

    fn close_span(&mut self) {
        if self.open.take().is_some() {
            self.out.push_str("</span>");
        }
    }

    fn finish(mut self) -> String {
        self.close_span();
        self.out.push_str("</p>");
        self.out
    }
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
