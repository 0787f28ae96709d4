//! Prompt construction for the generation and section services.

use serde::{Deserialize, Serialize};

pub const DEFAULT_BID_PROMPT: &str =
    "We are seeking a vendor to provide cybersecurity training for our staff in Q3 2025...";

const HONESTY_SUFFIX: &str = "\n\nBe honest about limitations: do not promise capabilities, \
timelines or results that cannot be substantiated, and state assumptions explicitly.";

const SOURCES_SUFFIX: &str = "\n\nWhere the proposal relies on facts, figures or standards, \
name the source so a reviewer can verify it.";

const CONFIDENCE_SUFFIX: &str = "\n\nAfter each major section, add a line of the form \
\"Confidence: high|medium|low\" reflecting how well supported that section is.";

/// Extra instructions appended to the drafting prompt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub honesty: bool,
    pub sources: bool,
    pub confidence: bool,
}

impl GenerationOptions {
    /// Labels and states, in the order their suffixes are applied
    pub fn flags(&self) -> [(&'static str, bool); 3] {
        [
            ("Honesty", self.honesty),
            ("Sources", self.sources),
            ("Confidence", self.confidence),
        ]
    }

    pub fn toggle(&mut self, slot: usize) {
        match slot {
            0 => self.honesty = !self.honesty,
            1 => self.sources = !self.sources,
            2 => self.confidence = !self.confidence,
            _ => {}
        }
    }
}

/// The drafting prompt with option suffixes in a fixed order:
/// honesty, then sources, then confidence.
pub fn generation_prompt(prompt: &str, options: &GenerationOptions) -> String {
    let mut full = prompt.trim().to_string();
    if options.honesty {
        full.push_str(HONESTY_SUFFIX);
    }
    if options.sources {
        full.push_str(SOURCES_SUFFIX);
    }
    if options.confidence {
        full.push_str(CONFIDENCE_SUFFIX);
    }
    full
}

/// What to do with a section of the draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionMode {
    Explain,
    Cite,
    Summarize,
}

impl SectionMode {
    pub fn all() -> &'static [SectionMode] {
        &[SectionMode::Explain, SectionMode::Cite, SectionMode::Summarize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionMode::Explain => "Explain",
            SectionMode::Cite => "Cite",
            SectionMode::Summarize => "Summarize",
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            SectionMode::Explain => {
                "Explain the following section of a proposal in plain language, \
                 including what it commits the vendor to."
            }
            SectionMode::Cite => {
                "List sources, standards or evidence that support or contradict the claims \
                 in the following section of a proposal. Say so if none are known."
            }
            SectionMode::Summarize => {
                "Summarize the following section of a proposal in two or three sentences."
            }
        }
    }
}

pub fn section_prompt(text: &str, mode: SectionMode) -> String {
    format!("{}\n\n---\n{}\n---", mode.instruction(), text.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_options_is_plain_prompt() {
        let prompt = generation_prompt("  Bid for training  ", &GenerationOptions::default());
        assert_eq!(prompt, "Bid for training");
    }

    #[test]
    fn test_suffix_order_is_stable() {
        let all = GenerationOptions {
            honesty: true,
            sources: true,
            confidence: true,
        };
        let prompt = generation_prompt("Bid", &all);
        let honesty = prompt.find("honest").unwrap();
        let sources = prompt.find("name the source").unwrap();
        let confidence = prompt.find("Confidence:").unwrap();
        assert!(honesty < sources && sources < confidence);

        let only_confidence = GenerationOptions {
            confidence: true,
            ..Default::default()
        };
        assert_eq!(
            generation_prompt("Bid", &only_confidence),
            format!("Bid{CONFIDENCE_SUFFIX}")
        );
    }

    #[test]
    fn test_toggle() {
        let mut options = GenerationOptions::default();
        options.toggle(1);
        assert!(options.sources);
        options.toggle(1);
        options.toggle(7);
        assert_eq!(options, GenerationOptions::default());
    }

    #[test]
    fn test_section_prompt_contains_text() {
        let prompt = section_prompt(" Delivery in 5 days. ", SectionMode::Summarize);
        assert!(prompt.starts_with("Summarize"));
        assert!(prompt.contains("---\nDelivery in 5 days.\n---"));
    }
}
