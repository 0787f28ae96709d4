//! File I/O for native CLI

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use draftloop_core::{Document, ExportSink};

/// Get the ~/.draftloop directory path, creating it if needed
pub fn draftloop_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    let dir = home.join(".draftloop");

    if !dir.exists() {
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    Ok(dir)
}

/// Writes the finished draft as a plain-text file
pub struct TextFileSink {
    dir: PathBuf,
}

impl TextFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ExportSink for TextFileSink {
    type Output = PathBuf;

    fn export(&self, title: &str, text: &str) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}.txt", file_stem(title)));
        let mut body = text.trim_end().to_string();
        body.push('\n');
        fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// Export the session (draft, highlights, edit log) to `dir/session.json`
pub fn export_session(doc: &Document, dir: &Path) -> Result<PathBuf> {
    let export_path = dir.join("session.json");

    let json = draftloop_core::to_json(doc).context("Failed to serialize session")?;

    fs::write(&export_path, json)
        .with_context(|| format!("Failed to write {}", export_path.display()))?;

    Ok(export_path)
}

/// Write the highlighted review view to `dir/review.html`
pub fn export_rendered(doc: &Document, dir: &Path) -> Result<PathBuf> {
    let path = dir.join("review.html");
    let page = format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        draftloop_core::strip_markup(&doc.title),
        draftloop_core::render(doc)
    );
    fs::write(&path, page).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn file_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let stem = stem
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if stem.is_empty() {
        "proposal".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftloop_core::{finalize, HighlightColor};

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Cyber Training: Q3 Bid"), "cyber-training-q3-bid");
        assert_eq!(file_stem("  ***  "), "proposal");
    }

    #[test]
    fn test_text_sink_writes_clean_text() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let mut doc = Document::new("Bid".to_string());
        doc.set_draft("We <em>will</em> deliver.");
        doc.add_annotation("deliver", HighlightColor::default(), "when?").unwrap();

        let path = finalize(&doc, &TextFileSink::new(dir)).unwrap();
        assert_eq!(path, dir.join("bid.txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "We will deliver.\n");
    }

    #[test]
    fn test_export_session_json() {
        let tmp = tempfile::tempdir().unwrap();
        let mut doc = Document::new("Bid".to_string());
        doc.set_draft("We will deliver in 5 days.");
        doc.add_annotation("5 days", HighlightColor::default(), "too tight").unwrap();

        let path = export_session(&doc, tmp.path()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["editLog"][0]["highlighted"], "5 days");
        assert_eq!(json["annotations"][0]["stale"], false);
    }

    #[test]
    fn test_export_rendered_page() {
        let tmp = tempfile::tempdir().unwrap();
        let mut doc = Document::new("Bid".to_string());
        doc.set_draft("We will deliver in 5 days.");
        doc.add_annotation("5 days", HighlightColor::default(), "too tight").unwrap();

        let path = export_rendered(&doc, tmp.path()).unwrap();
        let page = fs::read_to_string(&path).unwrap();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(">5 days</span>"));
    }
}
