//! Conflict detection across parsed source documents.
//!
//! A conflict exists when two or more sources give different lines for the
//! same non-repeatable setting name within the same section. Identical
//! lines from several sources are agreement, not conflict.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::document::ParsedDocument;
use crate::models::{ConflictOption, ConflictRecord, RepeatablePolicy};

type SectionKey = (String, String);

/// Stateless conflict detector.
pub struct ConflictDetector;

impl ConflictDetector {
    /// Scan `docs` in source order and return the conflicts found.
    ///
    /// Records are ordered by when their second distinct value was first
    /// seen (source, then section, then line order). Further distinct values
    /// for a setting that is already conflicting are appended to that
    /// record's options.
    pub fn detect(docs: &[ParsedDocument], policy: &RepeatablePolicy) -> Vec<ConflictRecord> {
        info!(sources = docs.len(), "detecting conflicts");

        // (section, exact line) -> sources that supplied it
        let mut seen_lines: HashMap<SectionKey, Vec<usize>> = HashMap::new();
        // (section, setting name) -> first value and its source
        let mut first_values: HashMap<SectionKey, (String, usize)> = HashMap::new();
        // (section, setting name) -> index into `conflicts`
        let mut open: HashMap<SectionKey, usize> = HashMap::new();
        let mut conflicts: Vec<ConflictRecord> = Vec::new();

        for (source, doc) in docs.iter().enumerate() {
            for section in doc.sections() {
                for setting in section.settings() {
                    if policy.is_repeatable(setting.name) {
                        continue;
                    }

                    let line_key = (section.name.clone(), setting.raw.to_string());
                    if let Some(sources) = seen_lines.get_mut(&line_key) {
                        if sources.last() != Some(&source) {
                            sources.push(source);
                        }
                        continue;
                    }
                    seen_lines.insert(line_key, vec![source]);

                    let name_key = (section.name.clone(), setting.name.to_string());
                    let Some((first_value, first_source)) = first_values.get(&name_key) else {
                        first_values.insert(name_key, (setting.raw.to_string(), source));
                        continue;
                    };

                    match open.get(&name_key) {
                        Some(&idx) => {
                            let record = &mut conflicts[idx];
                            if !record.has_value(setting.raw) {
                                debug!(
                                    section = %section.name,
                                    setting = setting.name,
                                    source,
                                    "additional divergent value"
                                );
                                record.options.push(ConflictOption {
                                    value: setting.raw.to_string(),
                                    source,
                                });
                            }
                        }
                        None => {
                            debug!(
                                section = %section.name,
                                setting = setting.name,
                                first_source,
                                source,
                                "conflict detected"
                            );
                            conflicts.push(ConflictRecord {
                                section: section.name.clone(),
                                setting_name: setting.name.to_string(),
                                options: vec![
                                    ConflictOption {
                                        value: first_value.clone(),
                                        source: *first_source,
                                    },
                                    ConflictOption {
                                        value: setting.raw.to_string(),
                                        source,
                                    },
                                ],
                            });
                            open.insert(name_key, conflicts.len() - 1);
                        }
                    }
                }
            }
        }

        info!(count = conflicts.len(), "conflict detection complete");
        conflicts
    }
}
