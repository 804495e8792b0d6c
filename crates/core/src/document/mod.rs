//! Line-oriented document model for INI-style configuration files.
//!
//! A document is an ordered list of [`Section`]s, each holding the trimmed,
//! non-blank lines that followed its `[name]` header. Line classification
//! (comment, header, content) is derived from the text on demand and never
//! stored, so the same helpers serve both the structured model and the
//! serialized merged text that the resolver patches.

pub mod parser;
pub mod serializer;

use serde::{Deserialize, Serialize};

pub use parser::parse;
pub use serializer::render;

/// Prefix marking a comment line.
pub const COMMENT_PREFIX: char = ';';

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

/// Derived classification of a single line of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Empty or whitespace-only.
    Blank,
    /// Starts with `;`.
    Comment,
    /// A `[name]` header; carries the trimmed inner name.
    SectionHeader(&'a str),
    /// Any other line: `Key=Value` or a bare flag.
    Content,
}

impl<'a> LineKind<'a> {
    /// Classify `line`, ignoring surrounding whitespace.
    pub fn of(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            Self::Blank
        } else if line.starts_with(COMMENT_PREFIX) {
            Self::Comment
        } else if line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
            Self::SectionHeader(line[1..line.len() - 1].trim())
        } else {
            Self::Content
        }
    }
}

/// Derive the setting name of a content line.
///
/// The name is the trimmed text before the first `=`. Bare flag lines, and
/// lines whose first character is `=`, name themselves with the whole
/// trimmed line.
pub fn setting_name(line: &str) -> &str {
    let line = line.trim();
    match line.find('=') {
        Some(pos) if pos > 0 => line[..pos].trim(),
        _ => line,
    }
}

/// Whether `line` is a comment line.
pub fn is_comment(line: &str) -> bool {
    matches!(LineKind::of(line), LineKind::Comment)
}

// ---------------------------------------------------------------------------
// Setting view
// ---------------------------------------------------------------------------

/// A borrowed view of a content line as a named setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setting<'a> {
    /// Setting name (see [`setting_name`]).
    pub name: &'a str,
    /// The full trimmed line. Used as the display value and as the key for
    /// exact-duplicate detection.
    pub raw: &'a str,
}

impl<'a> Setting<'a> {
    /// View `line` as a setting. Returns `None` for blanks, comments, and
    /// section headers.
    pub fn from_line(line: &'a str) -> Option<Self> {
        match LineKind::of(line) {
            LineKind::Content => {
                let raw = line.trim();
                Some(Self {
                    name: setting_name(raw),
                    raw,
                })
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Section & document
// ---------------------------------------------------------------------------

/// A named group of lines. Line order matters for output only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub lines: Vec<String>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Vec::new(),
        }
    }

    /// Iterate the content lines of this section as settings, in order.
    pub fn settings(&self) -> impl Iterator<Item = Setting<'_>> {
        self.lines.iter().filter_map(|l| Setting::from_line(l))
    }

    /// Whether the section holds a line with exactly this text.
    pub fn contains_line(&self, raw: &str) -> bool {
        self.lines.iter().any(|l| l == raw)
    }

    /// Number of content lines (comments excluded).
    pub fn setting_count(&self) -> usize {
        self.settings().count()
    }
}

/// A parsed document: sections in first-seen order.
///
/// Header name collisions fold into one logical section, so each name
/// appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    sections: Vec<Section>,
}

impl ParsedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.name == name)
    }

    /// Return the named section, appending an empty one if it is new.
    pub fn section_entry(&mut self, name: &str) -> &mut Section {
        let idx = match self.sections.iter().position(|s| s.name == name) {
            Some(idx) => idx,
            None => {
                self.sections.push(Section::new(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[idx]
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total content lines across all sections.
    pub fn setting_count(&self) -> usize {
        self.sections.iter().map(Section::setting_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_lines() {
        assert_eq!(LineKind::of("   "), LineKind::Blank);
        assert_eq!(LineKind::of("; note"), LineKind::Comment);
        assert_eq!(LineKind::of("  [Core.System] "), LineKind::SectionHeader("Core.System"));
        assert_eq!(LineKind::of("[ Padded ]"), LineKind::SectionHeader("Padded"));
        assert_eq!(LineKind::of("Key=Value"), LineKind::Content);
        assert_eq!(LineKind::of("[Unterminated"), LineKind::Content);
        assert_eq!(LineKind::of("bUseVSync"), LineKind::Content);
    }

    #[test]
    fn test_setting_name() {
        assert_eq!(setting_name("Quality=High"), "Quality");
        assert_eq!(setting_name("  Quality = High "), "Quality");
        assert_eq!(setting_name("a=b=c"), "a");
        assert_eq!(setting_name("+Suppress=ScriptWarning"), "+Suppress");
        assert_eq!(setting_name("bFlag"), "bFlag");
        assert_eq!(setting_name("=orphan"), "=orphan");
    }

    #[test]
    fn test_setting_view_skips_non_content() {
        assert!(Setting::from_line(";comment").is_none());
        assert!(Setting::from_line("[Section]").is_none());
        assert!(Setting::from_line("").is_none());

        let s = Setting::from_line(" Paths=../Content ").unwrap();
        assert_eq!(s.name, "Paths");
        assert_eq!(s.raw, "Paths=../Content");
    }

    #[test]
    fn test_section_entry_keeps_first_seen_order() {
        let mut doc = ParsedDocument::new();
        doc.section_entry("B").lines.push("x=1".into());
        doc.section_entry("A").lines.push("y=2".into());
        doc.section_entry("B").lines.push("z=3".into());

        let names: Vec<&str> = doc.sections().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(doc.section("B").unwrap().lines, vec!["x=1", "z=3"]);
        assert_eq!(doc.setting_count(), 3);
    }

    #[test]
    fn test_section_setting_count_ignores_comments() {
        let mut section = Section::new("S");
        section.lines = vec![";c".into(), "a=1".into(), "flag".into()];
        assert_eq!(section.setting_count(), 2);
        assert!(section.contains_line("flag"));
        assert!(!section.contains_line("a=2"));
    }
}
