use tracing::{info, warn};

use crate::actions;
use crate::error::{ReviewError, ServiceError};
use crate::export::revision_prompt;
use crate::model::{Document, HighlightColor, Palette};
use crate::prompt::{GenerationOptions, SectionMode, DEFAULT_BID_PROMPT};
use crate::render::render;
use crate::service::{inline_result, DraftGenerator, SectionAnalyzer};

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Input,
    ColorPicker,
    SectionPicker,
    Help,
}

/// Focus area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Draft,
    Sidebar,
}

/// What the text typed in input mode is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    Prompt,
    Highlight,
    CustomColor,
    Comment,
    Correction,
    Removal,
    ReplaceFind,
    ReplaceWith,
    Section,
}

impl InputTarget {
    pub fn title(&self) -> &'static str {
        match self {
            InputTarget::Prompt => "Bid prompt (Enter to save)",
            InputTarget::Highlight => "Text to highlight",
            InputTarget::CustomColor => "Highlight color (e.g. #ffcccc)",
            InputTarget::Comment => "Comment for this highlight",
            InputTarget::Correction => "Correction to append",
            InputTarget::Removal => "Exact text to remove",
            InputTarget::ReplaceFind => "Exact text to replace",
            InputTarget::ReplaceWith => "Replacement text",
            InputTarget::Section => "Section to explain, cite, summarize or flag",
        }
    }
}

/// Entries of the section picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionAction {
    Analyze(SectionMode),
    Flag,
}

impl SectionAction {
    pub fn all() -> Vec<SectionAction> {
        SectionMode::all()
            .iter()
            .copied()
            .map(SectionAction::Analyze)
            .chain([SectionAction::Flag])
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionAction::Analyze(mode) => mode.as_str(),
            SectionAction::Flag => "Flag this claim",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub level: StatusLevel,
    pub text: String,
}

/// Output of the last service call shown beside the draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub heading: String,
    pub body: String,
}

/// Review session state, independent of the terminal front end
pub struct App {
    pub document: Document,
    pub prompt: String,
    pub options: GenerationOptions,
    pub mode: Mode,
    pub focus: Focus,
    pub running: bool,

    // Draft view state
    pub scroll: usize,
    pub sidebar_selected: usize,

    // Input state
    pub input_buffer: String,
    pub input_target: InputTarget,

    // Picker state
    pub color_selected: usize,
    pub section_selected: usize,

    // Pending values of multi-step workflows
    pub pending_match: Option<String>,
    pub pending_color: HighlightColor,
    pub pending_find: Option<String>,
    pub pending_section: Option<String>,

    pub analysis: Option<Analysis>,
    pub status: Option<Status>,
}

impl App {
    pub fn new() -> Self {
        Self {
            document: Document::new("Proposal".to_string()),
            prompt: DEFAULT_BID_PROMPT.to_string(),
            options: GenerationOptions::default(),
            mode: Mode::Normal,
            focus: Focus::Draft,
            running: true,

            scroll: 0,
            sidebar_selected: 0,

            input_buffer: String::new(),
            input_target: InputTarget::Prompt,

            color_selected: 0,
            section_selected: 0,

            pending_match: None,
            pending_color: HighlightColor::default(),
            pending_find: None,
            pending_section: None,

            analysis: None,
            status: None,
        }
    }

    /// Ask the generator for a fresh draft from the current prompt.
    ///
    /// On failure the previous draft and annotations stay as they were.
    pub fn generate(&mut self, generator: &dyn DraftGenerator) -> bool {
        if self.prompt.trim().is_empty() {
            self.warn("Please enter a prompt before generating.");
            return false;
        }
        info!(options = ?self.options, "generating draft");
        let result = generator.generate(&self.prompt, &self.options);
        self.accept_draft(result, "Draft generated")
    }

    /// Send the draft and its feedback back to the generator for a rewrite.
    pub fn revise(&mut self, generator: &dyn DraftGenerator) -> bool {
        if self.document.is_empty() {
            self.warn("Generate a draft before requesting a revision.");
            return false;
        }
        let prompt = revision_prompt(&self.document);
        info!(annotations = self.document.annotations().len(), "requesting revision");
        let result = generator.generate(&prompt, &self.options);
        self.accept_draft(result, "Draft revised")
    }

    fn accept_draft(&mut self, result: Result<String, ServiceError>, done: &str) -> bool {
        match result {
            Ok(text) => {
                self.document.set_draft(text);
                self.scroll = 0;
                self.sidebar_selected = 0;
                self.analysis = None;
                let words = self.document.word_count();
                self.succeed(&format!("{done} ({words} words)"));
                true
            }
            Err(e) => {
                warn!(error = %e, "draft generation failed");
                self.warn(&format!("Generation failed: {e}"));
                self.analysis = Some(Analysis {
                    heading: "Generation".to_string(),
                    body: inline_result(Err(e)),
                });
                false
            }
        }
    }

    pub fn analyze_section(&mut self, analyzer: &dyn SectionAnalyzer, text: &str, mode: SectionMode) {
        if text.trim().is_empty() {
            self.warn(&format!(
                "Please enter a section to {}.",
                mode.as_str().to_lowercase()
            ));
            return;
        }
        info!(mode = mode.as_str(), "analyzing section");
        let result = analyzer.analyze(text, mode);
        if let Err(e) = &result {
            warn!(error = %e, "section analysis failed");
            self.warn(&format!("{} failed: {e}", mode.as_str()));
        }
        self.analysis = Some(Analysis {
            heading: mode.as_str().to_string(),
            body: inline_result(result),
        });
    }

    pub fn flag_section(&mut self, text: &str) {
        if text.trim().is_empty() {
            self.warn("Please enter a section to flag.");
            return;
        }
        self.warn(&format!("Section flagged for review: \"{}\"", text.trim()));
    }

    pub fn add_highlight(&mut self, match_text: &str, color: HighlightColor, comment: &str) -> bool {
        match self.document.add_annotation(match_text, color, comment) {
            Ok(index) => {
                self.sidebar_selected = index;
                self.succeed("Highlight added");
                true
            }
            Err(e) => self.reject(e),
        }
    }

    pub fn append_correction(&mut self, text: &str) -> bool {
        match self.document.append_text(text) {
            Ok(()) => {
                self.succeed("Correction appended");
                true
            }
            Err(e) => self.reject(e),
        }
    }

    pub fn remove_text(&mut self, literal: &str) -> bool {
        match self.document.remove_text(literal) {
            Ok(_) => {
                self.report_edit("Text removed");
                true
            }
            Err(e) => self.reject(e),
        }
    }

    pub fn replace_text(&mut self, find: &str, replacement: &str) -> bool {
        match self.document.replace_text(find, replacement) {
            Ok(_) => {
                self.report_edit("Text replaced");
                true
            }
            Err(e) => self.reject(e),
        }
    }

    fn report_edit(&mut self, done: &str) {
        let stale = self.document.stale_annotations().len();
        if stale > 0 {
            self.warn(&format!("{done}; {stale} highlight(s) no longer match the draft"));
        } else {
            self.succeed(done);
        }
    }

    fn reject(&mut self, e: ReviewError) -> bool {
        self.warn(&e.to_string());
        false
    }

    /// Start collecting text for `target`
    pub fn begin_input(&mut self, target: InputTarget) {
        self.input_buffer = match target {
            InputTarget::Prompt => self.prompt.clone(),
            _ => String::new(),
        };
        self.input_target = target;
        self.mode = Mode::Input;
    }

    /// Abandon the current workflow
    pub fn cancel(&mut self) {
        self.mode = Mode::Normal;
        self.input_buffer.clear();
        self.pending_match = None;
        self.pending_find = None;
        self.pending_section = None;
    }

    /// Act on the text typed in input mode.
    pub fn submit_input(&mut self) {
        let input = std::mem::take(&mut self.input_buffer);
        self.mode = Mode::Normal;

        match self.input_target {
            InputTarget::Prompt => {
                self.prompt = input;
                self.set_status("Prompt updated");
            }
            InputTarget::Highlight => {
                if input.trim().is_empty() {
                    self.reject(ReviewError::Validation("highlighted text is empty".to_string()));
                } else {
                    self.pending_match = Some(input);
                    self.mode = Mode::ColorPicker;
                }
            }
            InputTarget::CustomColor => match HighlightColor::parse(&input) {
                Ok(color) => {
                    self.pending_color = color;
                    self.begin_input(InputTarget::Comment);
                }
                Err(e) => {
                    self.pending_match = None;
                    self.reject(e);
                }
            },
            InputTarget::Comment => {
                if let Some(match_text) = self.pending_match.take() {
                    let color = self.pending_color.clone();
                    self.add_highlight(&match_text, color, &input);
                }
            }
            InputTarget::Correction => {
                self.append_correction(&input);
            }
            InputTarget::Removal => {
                self.remove_text(&input);
            }
            InputTarget::ReplaceFind => {
                if input.trim().is_empty() {
                    self.reject(ReviewError::empty_input());
                } else {
                    self.pending_find = Some(input);
                    self.begin_input(InputTarget::ReplaceWith);
                }
            }
            InputTarget::ReplaceWith => {
                if let Some(find) = self.pending_find.take() {
                    self.replace_text(&find, &input);
                }
            }
            InputTarget::Section => {
                self.pending_section = Some(input);
                self.section_selected = 0;
                self.mode = Mode::SectionPicker;
            }
        }
    }

    /// Number of entries in the color picker: the palette plus "custom"
    pub fn color_choices(&self) -> usize {
        Palette::all().len() + 1
    }

    /// Confirm the color picker selection
    pub fn pick_color(&mut self) {
        match Palette::all().get(self.color_selected) {
            Some(palette) => {
                self.pending_color = (*palette).into();
                self.begin_input(InputTarget::Comment);
            }
            None => self.begin_input(InputTarget::CustomColor),
        }
    }

    /// Confirm the section picker selection
    pub fn pick_section_action(&mut self, analyzer: &dyn SectionAnalyzer) {
        self.mode = Mode::Normal;
        let Some(section) = self.pending_section.take() else {
            return;
        };
        match SectionAction::all().get(self.section_selected) {
            Some(SectionAction::Analyze(mode)) => self.analyze_section(analyzer, &section, *mode),
            Some(SectionAction::Flag) => self.flag_section(&section),
            None => {}
        }
    }

    pub fn toggle_option(&mut self, slot: usize) {
        self.options.toggle(slot);
        if let Some((label, on)) = self.options.flags().get(slot) {
            self.set_status(&format!("{label} {}", if *on { "on" } else { "off" }));
        }
    }

    fn jump_to_selected(&mut self) {
        if let Some(line) = actions::highlight_line(&self.document, self.sidebar_selected) {
            self.scroll = line;
        }
    }

    /// Navigate to next annotation
    pub fn next_annotation(&mut self) {
        let count = self.document.annotations().len();
        if count > 0 {
            self.sidebar_selected = (self.sidebar_selected + 1) % count;
            self.jump_to_selected();
        }
    }

    /// Navigate to previous annotation
    pub fn prev_annotation(&mut self) {
        let count = self.document.annotations().len();
        if count > 0 {
            self.sidebar_selected = if self.sidebar_selected == 0 {
                count - 1
            } else {
                self.sidebar_selected - 1
            };
            self.jump_to_selected();
        }
    }

    /// Delete selected annotation
    pub fn delete_selected_annotation(&mut self) -> bool {
        match self.document.remove_annotation(self.sidebar_selected) {
            Ok(_) => {
                let count = self.document.annotations().len();
                if self.sidebar_selected >= count && count > 0 {
                    self.sidebar_selected = count - 1;
                }
                self.set_status("Highlight deleted");
                true
            }
            Err(e) => self.reject(e),
        }
    }

    pub fn scroll_down(&mut self) {
        let lines = self.draft_lines();
        if self.scroll + 1 < lines {
            self.scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn draft_lines(&self) -> usize {
        self.document.highlight_plan().text.lines().count()
    }

    /// HTML view of the draft with highlights
    pub fn rendered(&self) -> String {
        render(&self.document)
    }

    pub fn set_status(&mut self, msg: &str) {
        self.status = Some(Status {
            level: StatusLevel::Info,
            text: msg.to_string(),
        });
    }

    pub fn succeed(&mut self, msg: &str) {
        self.status = Some(Status {
            level: StatusLevel::Success,
            text: msg.to_string(),
        });
    }

    pub fn warn(&mut self, msg: &str) {
        self.status = Some(Status {
            level: StatusLevel::Warning,
            text: msg.to_string(),
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Draft => Focus::Sidebar,
            Focus::Sidebar => Focus::Draft,
        };
    }

    /// Get title for display
    pub fn title(&self) -> String {
        if self.document.is_empty() {
            format!("{} (no draft)", self.document.title)
        } else {
            format!("{} ({} words)", self.document.title, self.document.word_count())
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
