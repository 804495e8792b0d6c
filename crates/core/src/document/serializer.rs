//! [`ParsedDocument`] back to text.

use super::ParsedDocument;

/// Render `doc` as INI text.
///
/// Each section is its header, its lines, then one blank separator line.
/// The separator after the final section is trimmed, so the output has no
/// trailing newline.
pub fn render(doc: &ParsedDocument) -> String {
    let mut out = String::new();
    for section in doc.sections() {
        out.push('[');
        out.push_str(&section.name);
        out.push_str("]\n");
        for line in &section.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }
    out.truncate(out.trim_end().len());
    out
}
