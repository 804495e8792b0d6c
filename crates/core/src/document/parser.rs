//! Raw text to [`ParsedDocument`].
//!
//! Parsing never fails. Blank lines are dropped, and lines that appear
//! before the first section header are discarded because there is no
//! section to hold them.

use tracing::debug;

use super::{LineKind, ParsedDocument};

/// Parse `raw` into a document model.
pub fn parse(raw: &str) -> ParsedDocument {
    let mut doc = ParsedDocument::new();
    let mut current: Option<String> = None;
    let mut orphaned = 0usize;

    for line in raw.lines() {
        let line = line.trim();
        match LineKind::of(line) {
            LineKind::Blank => {}
            LineKind::SectionHeader(name) => {
                doc.section_entry(name);
                current = Some(name.to_string());
            }
            LineKind::Comment | LineKind::Content => match current.as_deref() {
                Some(name) => doc.section_entry(name).lines.push(line.to_string()),
                None => orphaned += 1,
            },
        }
    }

    if orphaned > 0 {
        debug!(orphaned, "discarded lines before first section header");
    }
    debug!(sections = doc.sections().len(), "parsed document");
    doc
}
