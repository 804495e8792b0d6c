//! Merge builder.
//!
//! Folds N parsed documents into one merged body. The first source is the
//! base; later sources contribute settings the body does not have yet.
//! Lines that disagree with a setting already in the body are left out and
//! the `(section, setting)` pair is deferred to conflict resolution.
//!
//! The merged body carries content lines only. Comments are reattached
//! afterwards by [`super::comments`].

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info};

use crate::document::{ParsedDocument, Setting};
use crate::errors::MergeError;
use crate::models::{MergeSummary, RepeatablePolicy, SectionSummary, SourceCount};

/// The result of folding all sources together.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Merged sections in first-seen order, content lines only.
    pub body: ParsedDocument,
    /// `(section, setting name)` pairs whose divergent values were held back.
    pub deferred: BTreeSet<(String, String)>,
    /// `(section, exact line)` to the sources that supplied it, in order.
    pub contributors: HashMap<(String, String), Vec<usize>>,
    pub summary: MergeSummary,
}

impl MergeOutcome {
    /// Sources that supplied `line` in `section`.
    pub fn contributors_of(&self, section: &str, line: &str) -> &[usize] {
        self.contributors
            .get(&(section.to_string(), line.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Stateless merge builder.
pub struct MergeBuilder;

impl MergeBuilder {
    /// Merge `docs` in source order. `names` are the display names of the
    /// sources, used only for the summary.
    pub fn build(
        docs: &[ParsedDocument],
        names: &[String],
        policy: &RepeatablePolicy,
    ) -> Result<MergeOutcome, MergeError> {
        let Some((base, rest)) = docs.split_first() else {
            return Err(MergeError::NoSources);
        };
        info!(sources = docs.len(), "building merged document");

        let mut outcome = MergeOutcome {
            body: ParsedDocument::new(),
            deferred: BTreeSet::new(),
            contributors: HashMap::new(),
            summary: MergeSummary {
                settings_per_source: docs
                    .iter()
                    .enumerate()
                    .map(|(i, doc)| SourceCount {
                        name: names.get(i).cloned().unwrap_or_else(|| format!("source {}", i)),
                        count: doc.setting_count(),
                    })
                    .collect(),
                ..Default::default()
            },
        };

        // Seed with the base document. Exact repeats within it collapse.
        for section in base.sections() {
            let merged = outcome.body.section_entry(&section.name);
            let stats = outcome
                .summary
                .section_summary
                .entry(section.name.clone())
                .or_insert_with(|| SectionSummary {
                    total_settings: 0,
                    sources: vec![0],
                });
            for setting in section.settings() {
                if !merged.contains_line(setting.raw) {
                    merged.lines.push(setting.raw.to_string());
                    stats.total_settings += 1;
                }
                track(&mut outcome.contributors, &section.name, setting.raw, 0);
            }
        }

        for (offset, doc) in rest.iter().enumerate() {
            let source = offset + 1;
            for section in doc.sections() {
                let stats = outcome
                    .summary
                    .section_summary
                    .entry(section.name.clone())
                    .or_default();
                if !stats.sources.contains(&source) {
                    stats.sources.push(source);
                }
                let merged = outcome.body.section_entry(&section.name);

                for setting in section.settings() {
                    if merged.contains_line(setting.raw) {
                        track(&mut outcome.contributors, &section.name, setting.raw, source);
                        continue;
                    }

                    if policy.is_repeatable(setting.name) {
                        merged.lines.push(setting.raw.to_string());
                        stats.total_settings += 1;
                        outcome.summary.repeated_settings += 1;
                        track(&mut outcome.contributors, &section.name, setting.raw, source);
                        continue;
                    }

                    let has_name = merged
                        .lines
                        .iter()
                        .filter_map(|l| Setting::from_line(l))
                        .any(|s| s.name == setting.name);
                    if has_name {
                        debug!(
                            section = %section.name,
                            setting = setting.name,
                            source,
                            "divergent value deferred to resolution"
                        );
                        outcome
                            .deferred
                            .insert((section.name.clone(), setting.name.to_string()));
                    } else {
                        merged.lines.push(setting.raw.to_string());
                        stats.total_settings += 1;
                        outcome.summary.unique_settings += 1;
                        track(&mut outcome.contributors, &section.name, setting.raw, source);
                    }
                }
            }
        }

        outcome.summary.total_settings = outcome
            .summary
            .section_summary
            .values()
            .map(|s| s.total_settings)
            .sum();

        info!(
            sections = outcome.body.sections().len(),
            settings = outcome.summary.total_settings,
            deferred = outcome.deferred.len(),
            "merged document built"
        );
        Ok(outcome)
    }
}

fn track(
    contributors: &mut HashMap<(String, String), Vec<usize>>,
    section: &str,
    line: &str,
    source: usize,
) {
    let sources = contributors
        .entry((section.to_string(), line.to_string()))
        .or_default();
    if !sources.contains(&source) {
        sources.push(source);
    }
}
