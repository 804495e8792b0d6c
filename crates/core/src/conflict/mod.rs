//! Conflict detection, merging, comment reattachment, and resolution.
//!
//! The conflict subsystem is responsible for:
//! 1. **Detection** -- finding settings whose value differs across sources.
//! 2. **Merging** -- folding all sources into one body, deferring conflicts.
//! 3. **Comments** -- weaving source comments back into the merged body.
//! 4. **Resolution** -- patching a chosen value into the merged text.

pub mod comments;
pub mod detector;
pub mod merger;
pub mod resolver;

pub use comments::{attach_comments, CommentIndex};
pub use detector::ConflictDetector;
pub use merger::{MergeBuilder, MergeOutcome};
pub use resolver::{ConflictResolver, Placement};
