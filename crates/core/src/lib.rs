//! inimerge core library.
//!
//! This crate merges several INI-style configuration documents into one:
//! parsing into a line-oriented model, detecting settings whose value
//! differs across sources, folding the non-conflicting settings together,
//! and walking the user through the conflicts one at a time while patching
//! the serialized result.
//!
//! The core does no prompting and owns no UI. Front ends supply source
//! texts, drive a [`MergeSession`], and persist the final text.

pub mod config;
pub mod conflict;
pub mod document;
pub mod errors;
pub mod models;
pub mod output;
pub mod session;
pub mod sources;

// Re-exports for convenience.
pub use config::MergeConfig;
pub use errors::CoreError;
pub use models::{ConflictOption, ConflictRecord, MergePhase, RepeatablePolicy, SourceFile};
pub use session::MergeSession;
pub use sources::SourceSet;
