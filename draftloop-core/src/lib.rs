//! Draftloop Core - annotated proposal drafts
//!
//! This crate holds the review session: the draft produced by a language
//! model, the reviewer's highlights and comments layered over it, the
//! rendered markup view, and the export of the finished text. The model
//! services and export targets are traits implemented by the front end.

pub mod actions;
pub mod app;
pub mod error;
pub mod export;
pub mod highlight;
pub mod model;
pub mod prompt;
pub mod render;
pub mod service;

pub use app::{Analysis, App, Focus, InputTarget, Mode, SectionAction, Status, StatusLevel};
pub use error::{ReviewError, ServiceError};
pub use export::{finalize, revision_prompt, to_json, ExportAnnotation, ExportDocument, ExportSink};
pub use highlight::{Highlight, HighlightPlan};
pub use model::{
    Annotation, AnnotationPolicy, Document, DraftState, EditLogEntry, HighlightColor, Palette,
    TextRange,
};
pub use prompt::{GenerationOptions, SectionMode};
pub use render::{render, strip_markup};
pub use service::{DraftGenerator, RetryPolicy, SectionAnalyzer};
