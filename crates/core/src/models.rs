//! Domain model types shared by the merge engine and its front ends.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// One input document as supplied by the file-acquisition layer.
///
/// Its position in the merge input (`source index`, 0-based) is its stable
/// identity in conflict and merge bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Unique identifier, typically the absolute path.
    pub identifier: String,
    /// Short name shown to the user.
    pub display_name: String,
    /// Full document text.
    pub raw_text: String,
}

impl SourceFile {
    pub fn new(
        identifier: impl Into<String>,
        display_name: impl Into<String>,
        raw_text: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            display_name: display_name.into(),
            raw_text: raw_text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Repeatable settings
// ---------------------------------------------------------------------------

/// Setting names exempt from conflict detection. Every distinct value of a
/// repeatable setting is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatablePolicy {
    names: HashSet<String>,
}

/// Names treated as repeatable when no configuration overrides them.
pub const DEFAULT_REPEATABLE_SETTINGS: &[&str] = &["Paths", "+Suppress"];

impl RepeatablePolicy {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_repeatable(&self, setting_name: &str) -> bool {
        self.names.contains(setting_name)
    }
}

impl Default for RepeatablePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_REPEATABLE_SETTINGS.iter().copied())
    }
}

// ---------------------------------------------------------------------------
// Conflicts
// ---------------------------------------------------------------------------

/// One candidate value for a conflicting setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictOption {
    /// The full line as it appeared in the source.
    pub value: String,
    /// Index of the source that first supplied this value.
    pub source: usize,
}

/// A disagreement between sources on one non-repeatable setting.
///
/// Always carries at least two options, all with distinct values, in the
/// order the values were first seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub section: String,
    pub setting_name: String,
    pub options: Vec<ConflictOption>,
}

impl ConflictRecord {
    /// Whether the record upholds its invariants: two or more options with
    /// pairwise distinct values.
    pub fn is_well_formed(&self) -> bool {
        if self.options.len() < 2 {
            return false;
        }
        let mut seen = HashSet::new();
        self.options.iter().all(|o| seen.insert(o.value.as_str()))
    }

    pub fn has_value(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

// ---------------------------------------------------------------------------
// Session phase
// ---------------------------------------------------------------------------

/// Lifecycle phase of a merge session.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MergePhase {
    #[default]
    Idle,
    Merging,
    AwaitingResolution,
    Complete,
    Failed,
}

impl std::fmt::Display for MergePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Merging => write!(f, "merging"),
            Self::AwaitingResolution => write!(f, "awaiting_resolution"),
            Self::Complete => write!(f, "complete"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Merge summary
// ---------------------------------------------------------------------------

/// Setting count for a single source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCount {
    pub name: String,
    pub count: usize,
}

/// Per-section totals in the merged body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub total_settings: usize,
    /// Indices of sources that contain this section, in source order.
    pub sources: Vec<usize>,
}

/// Informational report of what the merge builder did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSummary {
    /// Settings in the merged body before conflict resolution.
    pub total_settings: usize,
    /// Non-repeatable lines added from sources after the first.
    pub unique_settings: usize,
    /// Repeatable lines added from sources after the first.
    pub repeated_settings: usize,
    /// Content lines per source, indexed by source.
    pub settings_per_source: Vec<SourceCount>,
    pub section_summary: BTreeMap<String, SectionSummary>,
}

impl MergeSummary {
    /// One-line status text for the user.
    pub fn describe(&self) -> String {
        format!(
            "Merge Summary: Combined {} settings from {} files.",
            self.total_settings,
            self.settings_per_source.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(value: &str, source: usize) -> ConflictOption {
        ConflictOption {
            value: value.into(),
            source,
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RepeatablePolicy::default();
        assert!(policy.is_repeatable("Paths"));
        assert!(policy.is_repeatable("+Suppress"));
        assert!(!policy.is_repeatable("Quality"));
        assert!(!policy.is_repeatable("paths"));
    }

    #[test]
    fn test_conflict_record_well_formed() {
        let mut record = ConflictRecord {
            section: "Graphics".into(),
            setting_name: "Quality".into(),
            options: vec![option("Quality=Low", 0)],
        };
        assert!(!record.is_well_formed());

        record.options.push(option("Quality=High", 1));
        assert!(record.is_well_formed());
        assert!(record.has_value("Quality=High"));

        record.options.push(option("Quality=Low", 2));
        assert!(!record.is_well_formed());
    }

    #[test]
    fn test_phase_display_matches_serde() {
        for phase in [
            MergePhase::Idle,
            MergePhase::Merging,
            MergePhase::AwaitingResolution,
            MergePhase::Complete,
            MergePhase::Failed,
        ] {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase));
        }
    }

    #[test]
    fn test_conflict_record_serializes() {
        let record = ConflictRecord {
            section: "Graphics".into(),
            setting_name: "Quality".into(),
            options: vec![option("Quality=Low", 0), option("Quality=High", 1)],
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["setting_name"], "Quality");
        assert_eq!(json["options"][1]["source"], 1);
    }

    #[test]
    fn test_summary_describe() {
        let summary = MergeSummary {
            total_settings: 7,
            settings_per_source: vec![
                SourceCount {
                    name: "a.ini".into(),
                    count: 4,
                },
                SourceCount {
                    name: "b.ini".into(),
                    count: 3,
                },
            ],
            ..Default::default()
        };
        assert_eq!(
            summary.describe(),
            "Merge Summary: Combined 7 settings from 2 files."
        );
    }
}
