//! The merge session state machine.
//!
//! A [`MergeSession`] owns one end-to-end merge: the sources, the serialized
//! merged text, and the conflicts still awaiting a choice. Callers drive it
//! with a small request/response API:
//!
//! - [`MergeSession::start_merge`] runs parse, detect, build, reattach
//!   comments, and render. `Idle -> Merging -> AwaitingResolution | Complete`.
//! - [`MergeSession::resolve`] applies the user's choice for the current
//!   conflict to the merged text and advances the cursor.
//! - [`MergeSession::merged_text`] returns the current text.
//! - [`MergeSession::reset`] discards everything and returns to `Idle`.
//!
//! Starting a new merge on a session that already holds one replaces it.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info};

use crate::conflict::{attach_comments, ConflictDetector, ConflictResolver, MergeBuilder, Placement};
use crate::document::{parse, render, ParsedDocument};
use crate::errors::{MergeError, OutputError};
use crate::models::{ConflictRecord, MergePhase, MergeSummary, RepeatablePolicy, SourceFile};
use crate::output;

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Result of [`MergeSession::start_merge`].
#[derive(Debug, Clone, Serialize)]
pub struct MergeUpdate {
    pub merged_text: String,
    pub conflicts: Vec<ConflictRecord>,
    pub phase: MergePhase,
    pub summary: MergeSummary,
}

impl MergeUpdate {
    /// Status line for the user.
    pub fn status(&self) -> String {
        if self.conflicts.is_empty() {
            format!("{} No conflicts found!", self.summary.describe())
        } else {
            format!(
                "{} Found {} conflicts. Please resolve them one by one.",
                self.summary.describe(),
                self.conflicts.len()
            )
        }
    }
}

/// Result of [`MergeSession::resolve`].
#[derive(Debug, Clone)]
pub struct ResolveUpdate {
    pub merged_text: String,
    /// The conflict now awaiting a choice, if any remain.
    pub next_conflict: Option<ConflictRecord>,
    pub phase: MergePhase,
    pub placement: Placement,
    /// Conflicts resolved so far.
    pub resolved: usize,
    pub total: usize,
}

impl ResolveUpdate {
    /// Status line for the user.
    pub fn status(&self) -> String {
        match self.phase {
            MergePhase::Complete => "All conflicts resolved! Merge complete.".to_string(),
            _ => format!("Resolved {} of {} conflicts.", self.resolved, self.total),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One merge, from the initial fold through every conflict choice.
#[derive(Debug, Clone)]
pub struct MergeSession {
    policy: RepeatablePolicy,
    sources: Vec<SourceFile>,
    merged_text: String,
    conflicts: Vec<ConflictRecord>,
    cursor: usize,
    phase: MergePhase,
    summary: Option<MergeSummary>,
    /// Forces the next `run_merge` to fail with `Internal`.
    #[cfg(test)]
    fail_next_merge: Option<String>,
}

impl Default for MergeSession {
    fn default() -> Self {
        Self::new(RepeatablePolicy::default())
    }
}

impl MergeSession {
    pub fn new(policy: RepeatablePolicy) -> Self {
        Self {
            policy,
            sources: Vec::new(),
            merged_text: String::new(),
            conflicts: Vec::new(),
            cursor: 0,
            phase: MergePhase::Idle,
            summary: None,
            #[cfg(test)]
            fail_next_merge: None,
        }
    }

    pub fn phase(&self) -> MergePhase {
        self.phase
    }

    /// The current serialized merged text.
    pub fn merged_text(&self) -> &str {
        &self.merged_text
    }

    pub fn sources(&self) -> &[SourceFile] {
        &self.sources
    }

    /// All detected conflicts, resolved or not, in detection order.
    pub fn conflicts(&self) -> &[ConflictRecord] {
        &self.conflicts
    }

    pub fn summary(&self) -> Option<&MergeSummary> {
        self.summary.as_ref()
    }

    /// The conflict awaiting a choice.
    pub fn current_conflict(&self) -> Option<&ConflictRecord> {
        match self.phase {
            MergePhase::AwaitingResolution => self.conflicts.get(self.cursor),
            _ => None,
        }
    }

    /// `(1-based position, total)` of the current conflict.
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.current_conflict()
            .map(|_| (self.cursor + 1, self.conflicts.len()))
    }

    /// Display name of the source at `index`.
    pub fn source_name(&self, index: usize) -> &str {
        self.sources
            .get(index)
            .map(|s| s.display_name.as_str())
            .unwrap_or("unknown")
    }

    /// Merge `sources` in order, replacing any previous merge.
    ///
    /// With no conflicts the session completes immediately; otherwise it
    /// waits on the first conflict. An internal inconsistency moves the
    /// session to `Failed`, keeping the last good merged text.
    pub fn start_merge(&mut self, sources: Vec<SourceFile>) -> Result<MergeUpdate, MergeError> {
        if sources.is_empty() {
            self.reset();
            return Err(MergeError::NoSources);
        }

        info!(sources = sources.len(), "starting merge");
        self.sources = sources;
        self.conflicts.clear();
        self.cursor = 0;
        self.summary = None;
        self.phase = MergePhase::Merging;

        let (merged_text, conflicts, summary) = match self.run_merge() {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "merge failed");
                self.phase = MergePhase::Failed;
                return Err(e);
            }
        };

        self.merged_text = merged_text;
        self.conflicts = conflicts;
        self.summary = Some(summary.clone());
        self.phase = if self.conflicts.is_empty() {
            MergePhase::Complete
        } else {
            MergePhase::AwaitingResolution
        };
        info!(
            conflicts = self.conflicts.len(),
            phase = %self.phase,
            "merge built"
        );

        Ok(MergeUpdate {
            merged_text: self.merged_text.clone(),
            conflicts: self.conflicts.clone(),
            phase: self.phase,
            summary,
        })
    }

    fn run_merge(&self) -> Result<(String, Vec<ConflictRecord>, MergeSummary), MergeError> {
        #[cfg(test)]
        if let Some(reason) = &self.fail_next_merge {
            return Err(MergeError::Internal(reason.clone()));
        }

        let docs: Vec<ParsedDocument> = self.sources.iter().map(|s| parse(&s.raw_text)).collect();
        let names: Vec<String> = self.sources.iter().map(|s| s.display_name.clone()).collect();

        let conflicts = ConflictDetector::detect(&docs, &self.policy);
        let outcome = MergeBuilder::build(&docs, &names, &self.policy)?;
        self.check_consistency(&conflicts, &outcome.deferred, &outcome.body)?;

        let body = attach_comments(&docs, &outcome.body);
        Ok((render(&body), conflicts, outcome.summary))
    }

    /// Verify the detector and the builder agree before any text is shown.
    fn check_consistency(
        &self,
        conflicts: &[ConflictRecord],
        deferred: &BTreeSet<(String, String)>,
        body: &ParsedDocument,
    ) -> Result<(), MergeError> {
        let mut keys = HashSet::new();
        for conflict in conflicts {
            if !conflict.is_well_formed() {
                return Err(MergeError::Internal(format!(
                    "conflict on [{}] {} has fewer than two distinct options",
                    conflict.section, conflict.setting_name
                )));
            }
            if let Some(bad) = conflict.options.iter().find(|o| o.source >= self.sources.len()) {
                return Err(MergeError::Internal(format!(
                    "conflict option references unknown source {}",
                    bad.source
                )));
            }
            if body.section(&conflict.section).is_none() {
                return Err(MergeError::Internal(format!(
                    "conflict section [{}] missing from merged body",
                    conflict.section
                )));
            }
            keys.insert((conflict.section.as_str(), conflict.setting_name.as_str()));
        }
        for (section, name) in deferred {
            if !keys.contains(&(section.as_str(), name.as_str())) {
                return Err(MergeError::Internal(format!(
                    "deferred setting [{}] {} has no conflict record",
                    section, name
                )));
            }
        }
        Ok(())
    }

    /// Choose option `option_index` for the current conflict.
    pub fn resolve(&mut self, option_index: usize) -> Result<ResolveUpdate, MergeError> {
        if self.phase != MergePhase::AwaitingResolution {
            return Err(MergeError::InvalidPhase {
                expected: MergePhase::AwaitingResolution.to_string(),
                actual: self.phase.to_string(),
            });
        }
        let conflict = self.conflicts.get(self.cursor).ok_or_else(|| {
            MergeError::Internal(format!("conflict cursor {} out of range", self.cursor))
        })?;
        let option = conflict
            .options
            .get(option_index)
            .ok_or(MergeError::OptionOutOfRange {
                index: option_index,
                available: conflict.options.len(),
            })?;

        debug!(
            section = %conflict.section,
            setting = %conflict.setting_name,
            source = option.source,
            "resolving conflict"
        );
        let (text, placement) = ConflictResolver::apply(
            &self.merged_text,
            &conflict.section,
            &conflict.setting_name,
            &option.value,
        );
        self.merged_text = text;
        self.cursor += 1;

        if self.cursor == self.conflicts.len() {
            self.phase = MergePhase::Complete;
            info!(total = self.conflicts.len(), "all conflicts resolved");
        }

        Ok(ResolveUpdate {
            merged_text: self.merged_text.clone(),
            next_conflict: self.current_conflict().cloned(),
            phase: self.phase,
            placement,
            resolved: self.cursor,
            total: self.conflicts.len(),
        })
    }

    /// Write the current merged text to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf, OutputError> {
        output::write_merged(path, &self.merged_text)
    }

    /// Discard the merge and return to `Idle`.
    pub fn reset(&mut self) {
        debug!("resetting merge session");
        self.sources.clear();
        self.merged_text.clear();
        self.conflicts.clear();
        self.cursor = 0;
        self.summary = None;
        self.phase = MergePhase::Idle;
    }
}
