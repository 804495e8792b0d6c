//! Comment reattachment.
//!
//! The merged body is built from content lines only. This pass collects
//! comments from every source and weaves them back in:
//!
//! - A comment directly after a content line belongs to that exact line and
//!   is emitted right after it. When several sources comment the same line,
//!   the first one in scan order (lowest source index) wins.
//! - Any other comment belongs to its section and is emitted at the top of
//!   the section, each distinct text once, in first-seen order.

use std::collections::HashMap;

use tracing::debug;

use crate::document::{is_comment, ParsedDocument, Section};

/// Comments gathered from all sources.
#[derive(Debug, Default)]
pub struct CommentIndex {
    /// Section-level comments per section, distinct, in first-seen order.
    section_comments: HashMap<String, Vec<String>>,
    /// `(section, exact content line)` to the comment that followed it.
    line_comments: HashMap<(String, String), String>,
}

impl CommentIndex {
    /// Scan `docs` in source order.
    pub fn collect(docs: &[ParsedDocument]) -> Self {
        let mut index = Self::default();
        for doc in docs {
            for section in doc.sections() {
                let mut previous: Option<&str> = None;
                for line in &section.lines {
                    if is_comment(line) {
                        match previous {
                            Some(prev) if !is_comment(prev) => {
                                index
                                    .line_comments
                                    .entry((section.name.clone(), prev.to_string()))
                                    .or_insert_with(|| line.clone());
                            }
                            _ => {
                                let comments = index
                                    .section_comments
                                    .entry(section.name.clone())
                                    .or_default();
                                if !comments.contains(line) {
                                    comments.push(line.clone());
                                }
                            }
                        }
                    }
                    previous = Some(line.as_str());
                }
            }
        }
        debug!(
            line_comments = index.line_comments.len(),
            sections_with_comments = index.section_comments.len(),
            "collected comments"
        );
        index
    }

    pub fn section_comments(&self, section: &str) -> &[String] {
        self.section_comments
            .get(section)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn comment_for(&self, section: &str, line: &str) -> Option<&str> {
        self.line_comments
            .get(&(section.to_string(), line.to_string()))
            .map(String::as_str)
    }

    /// Return a copy of `body` with comments woven back in.
    pub fn apply(&self, body: &ParsedDocument) -> ParsedDocument {
        let mut out = ParsedDocument::new();
        for section in body.sections() {
            let mut woven = Section::new(section.name.clone());
            woven
                .lines
                .extend(self.section_comments(&section.name).iter().cloned());
            for line in &section.lines {
                woven.lines.push(line.clone());
                if let Some(comment) = self.comment_for(&section.name, line) {
                    woven.lines.push(comment.to_string());
                }
            }
            *out.section_entry(&section.name) = woven;
        }
        out
    }
}

/// Collect comments from `docs` and reattach them to `body`.
pub fn attach_comments(docs: &[ParsedDocument], body: &ParsedDocument) -> ParsedDocument {
    CommentIndex::collect(docs).apply(body)
}
