pub mod annotation;
pub mod document;
pub mod edit_log;
pub mod text_range;

pub use annotation::{Annotation, AnnotationPolicy, HighlightColor, Palette};
pub use document::{DraftState, Document};
pub use edit_log::EditLogEntry;
pub use text_range::TextRange;
