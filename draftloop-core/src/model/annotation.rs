use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ReviewError;

/// Built-in highlight colors offered by the picker
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Palette {
    #[default]
    Yellow,
    Red,
    Green,
    Blue,
    Purple,
}

impl Palette {
    pub fn all() -> &'static [Palette] {
        &[
            Palette::Yellow,
            Palette::Red,
            Palette::Green,
            Palette::Blue,
            Palette::Purple,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Palette::Yellow => "Yellow",
            Palette::Red => "Red",
            Palette::Green => "Green",
            Palette::Blue => "Blue",
            Palette::Purple => "Purple",
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            Palette::Yellow => "#fff3b0",
            Palette::Red => "#ffcccc",
            Palette::Green => "#ccf2d1",
            Palette::Blue => "#cce0ff",
            Palette::Purple => "#e6ccff",
        }
    }
}

/// A color token safe to embed in a style attribute.
///
/// Accepts hex strings, named colors and functional notation such as
/// `rgb(255, 204, 204)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HighlightColor(String);

impl HighlightColor {
    pub fn parse(token: &str) -> Result<Self, ReviewError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ReviewError::Validation("color must not be empty".to_string()));
        }
        let allowed = |c: char| c.is_ascii_alphanumeric() || "#(),.% ".contains(c);
        if let Some(bad) = token.chars().find(|c| !allowed(*c)) {
            return Err(ReviewError::Validation(format!(
                "invalid character '{bad}' in color \"{token}\""
            )));
        }
        Ok(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// RGB components for `#rgb` and `#rrggbb` tokens
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.0.strip_prefix('#')?;
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Some((expand(0)?, expand(1)?, expand(2)?))
            }
            _ => None,
        }
    }
}

impl From<Palette> for HighlightColor {
    fn from(palette: Palette) -> Self {
        Self(palette.hex().to_string())
    }
}

impl Default for HighlightColor {
    fn default() -> Self {
        Palette::default().into()
    }
}

impl TryFrom<String> for HighlightColor {
    type Error = ReviewError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HighlightColor> for String {
    fn from(color: HighlightColor) -> Self {
        color.0
    }
}

impl fmt::Display for HighlightColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which fields a highlight submission must fill in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationPolicy {
    /// Only the highlighted text is required
    HighlightOnly,
    #[default]
    CommentRequired,
}

/// A highlight with reviewer feedback, anchored by its literal text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Annotation {
    #[serde(rename = "text")]
    pub match_text: String,
    pub color: HighlightColor,
    pub comment: String,
}

impl Annotation {
    pub fn new(match_text: String, color: HighlightColor, comment: String) -> Self {
        Self {
            match_text,
            color,
            comment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_tokens() {
        assert!(HighlightColor::parse("#ffcccc").is_ok());
        assert!(HighlightColor::parse("rgb(255, 204, 204)").is_ok());
        assert!(HighlightColor::parse("yellow").is_ok());
        assert!(HighlightColor::parse("   ").is_err());
        assert!(HighlightColor::parse("red\" onmouseover=\"x").is_err());
        assert!(HighlightColor::parse("red; display:none").is_err());
    }

    #[test]
    fn test_color_rgb() {
        assert_eq!(HighlightColor::parse("#ffcccc").unwrap().rgb(), Some((255, 204, 204)));
        assert_eq!(HighlightColor::parse("#fc0").unwrap().rgb(), Some((255, 204, 0)));
        assert_eq!(HighlightColor::parse("yellow").unwrap().rgb(), None);
    }

    #[test]
    fn test_palette_colors_are_valid_tokens() {
        for p in Palette::all() {
            let color = HighlightColor::from(*p);
            assert!(HighlightColor::parse(color.as_str()).is_ok());
            assert!(color.rgb().is_some());
        }
    }

    #[test]
    fn test_default_color_is_yellow() {
        assert_eq!(Palette::default(), Palette::Yellow);
        assert_eq!(HighlightColor::default().as_str(), "#fff3b0");
    }

    #[test]
    fn test_annotation_json_format() {
        let ann = Annotation::new(
            "5 days".to_string(),
            HighlightColor::parse("#ffcccc").unwrap(),
            "too tight".to_string(),
        );
        let json = serde_json::to_string(&ann).unwrap();
        assert!(json.contains("\"text\":\"5 days\""));
        assert!(json.contains("\"color\":\"#ffcccc\""));

        let bad = r#"{"text":"x","color":"","comment":""}"#;
        assert!(serde_json::from_str::<Annotation>(bad).is_err());
    }
}
