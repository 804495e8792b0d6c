//! Applying a conflict choice to serialized merged text.
//!
//! Resolution patches the text itself rather than the structured model, so
//! the bytes the user sees are exactly the bytes that get saved. Section
//! boundaries are re-derived from the text on every call.

use tracing::debug;

use crate::document::{is_comment, LineKind, Setting};

/// How a chosen value landed in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// An existing line for the setting was replaced.
    Replaced,
    /// The section had no line for the setting; the value was appended to it.
    ///
    /// A session never produces this: the merge builder keeps the first
    /// value of every deferred setting in the body, so a matching line is
    /// always there to replace. Only direct callers patching arbitrary text
    /// reach it.
    Inserted,
    /// The section was missing; a new section block was appended.
    NewSection,
}

/// Stateless text patcher for conflict choices.
pub struct ConflictResolver;

impl ConflictResolver {
    /// Write `chosen` as the single line for `setting_name` in `section`.
    ///
    /// Within the section window (its header up to the next header or end of
    /// text) the first line for the setting is replaced by `chosen`, and any
    /// further lines for the same setting are removed. A comment directly
    /// after a replaced or removed line goes with it.
    pub fn apply(text: &str, section: &str, setting_name: &str, chosen: &str) -> (String, Placement) {
        let lines: Vec<&str> = if text.is_empty() {
            Vec::new()
        } else {
            text.split('\n').collect()
        };

        let Some(header) = lines
            .iter()
            .position(|l| LineKind::of(l) == LineKind::SectionHeader(section))
        else {
            debug!(section, setting_name, "section missing, appending new block");
            let mut out = text.to_string();
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            out.push_str(&format!("[{}]\n{}", section, chosen));
            return (out, Placement::NewSection);
        };

        let end = lines[header + 1..]
            .iter()
            .position(|l| matches!(LineKind::of(l), LineKind::SectionHeader(_)))
            .map(|offset| header + 1 + offset)
            .unwrap_or(lines.len());

        let mut out: Vec<&str> = lines[..=header].to_vec();
        let mut replaced = false;
        let mut i = header + 1;
        while i < end {
            let line = lines[i];
            let matches = Setting::from_line(line).is_some_and(|s| s.name == setting_name);
            if !matches {
                out.push(line);
                i += 1;
                continue;
            }
            if !replaced {
                out.push(chosen);
                replaced = true;
            }
            i += 1;
            if i < end && is_comment(lines[i]) {
                i += 1;
            }
        }

        let placement = if replaced {
            Placement::Replaced
        } else {
            // Last non-blank line of the window; the header at worst.
            let at = out
                .iter()
                .rposition(|l| !l.trim().is_empty())
                .map(|p| p + 1)
                .unwrap_or(out.len());
            out.insert(at, chosen);
            Placement::Inserted
        };
        out.extend_from_slice(&lines[end..]);

        debug!(section, setting_name, ?placement, "applied conflict choice");
        (out.join("\n"), placement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_existing_line() {
        let (text, placement) =
            ConflictResolver::apply("[Graphics]\nQuality=Low", "Graphics", "Quality", "Quality=High");
        assert_eq!(text, "[Graphics]\nQuality=High");
        assert_eq!(placement, Placement::Replaced);
    }

    #[test]
    fn test_replace_drops_trailing_comment() {
        let text = "[A]\nk=1\n;about k\nother=2\n\n[B]\nk=9";
        let (text, _) = ConflictResolver::apply(text, "A", "k", "k=5");
        assert_eq!(text, "[A]\nk=5\nother=2\n\n[B]\nk=9");
    }

    #[test]
    fn test_only_target_section_touched() {
        let text = "[A]\nk=1\n\n[B]\nk=1";
        let (text, _) = ConflictResolver::apply(text, "B", "k", "k=2");
        assert_eq!(text, "[A]\nk=1\n\n[B]\nk=2");
    }

    #[test]
    fn test_extra_lines_for_setting_removed() {
        let text = "[A]\nk=1\nx=0\nk=2\n;about two\ny=0";
        let (text, _) = ConflictResolver::apply(text, "A", "k", "k=2");
        assert_eq!(text, "[A]\nk=2\nx=0\ny=0");
    }

    #[test]
    fn test_insert_when_setting_absent() {
        let text = "[A]\nx=1\n\n[B]\ny=2";
        let (text, placement) = ConflictResolver::apply(text, "A", "k", "k=3");
        assert_eq!(text, "[A]\nx=1\nk=3\n\n[B]\ny=2");
        assert_eq!(placement, Placement::Inserted);
    }

    #[test]
    fn test_insert_into_last_section() {
        let (text, _) = ConflictResolver::apply("[A]\nx=1", "A", "k", "k=3");
        assert_eq!(text, "[A]\nx=1\nk=3");
    }

    #[test]
    fn test_insert_into_empty_section() {
        let (text, _) = ConflictResolver::apply("[A]\n\n[B]\ny=2", "A", "k", "k=3");
        assert_eq!(text, "[A]\nk=3\n\n[B]\ny=2");
    }

    #[test]
    fn test_new_section_appended() {
        let (text, placement) = ConflictResolver::apply("[A]\nx=1", "Z", "k", "k=1");
        assert_eq!(text, "[A]\nx=1\n\n[Z]\nk=1");
        assert_eq!(placement, Placement::NewSection);

        let (text, _) = ConflictResolver::apply("", "Z", "k", "k=1");
        assert_eq!(text, "[Z]\nk=1");
    }

    #[test]
    fn test_comment_lines_never_match() {
        let text = "[A]\n;k=old\nk=1";
        let (text, _) = ConflictResolver::apply(text, "A", "k", "k=2");
        assert_eq!(text, "[A]\n;k=old\nk=2");
    }

    #[test]
    fn test_bare_flag_setting() {
        let (text, _) = ConflictResolver::apply("[A]\nbFlag\nx=1", "A", "bFlag", "bFlag");
        assert_eq!(text, "[A]\nbFlag\nx=1");
    }
}
