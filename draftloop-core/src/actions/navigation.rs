use crate::model::Document;

/// Line of the rendered draft where the annotation at `index` is highlighted.
///
/// Returns `None` when the annotation is stale or covered by a longer one.
pub fn highlight_line(doc: &Document, index: usize) -> Option<usize> {
    let plan = doc.highlight_plan();
    let start = plan.highlight_for(index)?.range.start_offset;
    Some(plan.text[..start].matches('\n').count())
}
