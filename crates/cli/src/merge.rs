//! `inimerge merge`: load sources, merge, resolve conflicts, save.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use console::Term;
use dialoguer::{Confirm, Select};
use tracing::debug;

use inimerge_core::{ConflictRecord, MergeConfig, MergeSession, SourceSet};

use crate::style;

/// Automatic choice for every conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Accept {
    /// Keep the value seen first (lowest source index).
    First,
    /// Take the value seen last.
    Last,
}

impl Accept {
    fn pick(self, conflict: &ConflictRecord) -> usize {
        match self {
            Self::First => 0,
            Self::Last => conflict.options.len().saturating_sub(1),
        }
    }
}

/// Options for a merge run.
#[derive(Debug)]
pub struct MergeArgs {
    pub files: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub accept: Option<Accept>,
    pub print: bool,
    pub force: bool,
}

/// Run a merge end to end.
pub fn run_merge(config: &MergeConfig, args: MergeArgs) -> Result<()> {
    let set = load_sources(&args.files)?;

    let mut session = MergeSession::new(config.policy());
    let update = session
        .start_merge(set.into_files())
        .context("failed to merge source files")?;

    println!();
    print_sources(&session);
    println!("{}", style::header(&update.status()));
    println!();

    while let Some(conflict) = session.current_conflict().cloned() {
        let choice = match args.accept {
            Some(accept) => accept.pick(&conflict),
            None => prompt_choice(&session, &conflict)?,
        };
        let chosen = &conflict.options[choice];
        let result = session
            .resolve(choice)
            .context("failed to apply conflict resolution")?;
        println!(
            "{}",
            style::success(&format!(
                "{} {} = {}",
                style::section(&conflict.section),
                conflict.setting_name,
                chosen.value
            ))
        );
        if result.next_conflict.is_none() {
            println!();
            println!("{}", style::success(&result.status()));
        }
    }

    if args.print {
        println!();
        println!("{}", session.merged_text());
        println!();
    }

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.output.default_file_name));
    if !confirm_overwrite(&output, args.force)? {
        println!(
            "{}",
            style::warn("Save cancelled. Existing file was not modified.")
        );
        return Ok(());
    }

    let written = session
        .save(&output)
        .with_context(|| format!("failed to save merged file to {}", output.display()))?;
    println!(
        "{}",
        style::success(&format!("File saved successfully to: {}", written.display()))
    );
    Ok(())
}

/// Load every path, warning about the ones that cannot be read.
pub fn load_sources(files: &[PathBuf]) -> Result<SourceSet> {
    let mut set = SourceSet::new();
    for warning in set.load_paths(files) {
        eprintln!("{}", style::warn(&warning.to_string()));
    }
    if set.is_empty() {
        bail!("no readable source files");
    }
    debug!(count = set.len(), "sources ready");
    Ok(set)
}

fn print_sources(session: &MergeSession) {
    let Some(summary) = session.summary() else {
        return;
    };

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "File", "Settings"]);
    for (i, source) in summary.settings_per_source.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&source.name),
            Cell::new(source.count),
        ]);
    }
    println!("{}", table);
}

fn prompt_choice(session: &MergeSession, conflict: &ConflictRecord) -> Result<usize> {
    let (position, total) = session.progress().unwrap_or((1, 1));
    println!(
        "{}",
        style::header(&format!("Conflict {} of {}", position, total))
    );
    println!(
        "  {} {}",
        style::section(&conflict.section),
        conflict.setting_name
    );

    let items: Vec<String> = conflict
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            format!(
                "Option {} {}  {}",
                i + 1,
                style::dim(&format!("(from file {})", session.source_name(option.source))),
                option.value
            )
        })
        .collect();

    let choice = Select::new()
        .with_prompt("Choose the value to keep")
        .items(&items)
        .default(0)
        .interact()
        .context("failed to read conflict choice")?;
    Ok(choice)
}

/// `true` when it is fine to write `path`.
fn confirm_overwrite(path: &Path, force: bool) -> Result<bool> {
    if force || !path.exists() {
        return Ok(true);
    }
    if !Term::stdout().is_term() {
        bail!(
            "file already exists: {}. Use --force to overwrite it.",
            path.display()
        );
    }
    Confirm::new()
        .with_prompt(format!("{} already exists. Overwrite?", path.display()))
        .default(false)
        .interact()
        .context("failed to read confirmation")
}

#[cfg(test)]
mod tests {
    use super::*;
    use inimerge_core::ConflictOption;

    fn conflict(values: &[&str]) -> ConflictRecord {
        ConflictRecord {
            section: "A".into(),
            setting_name: "k".into(),
            options: values
                .iter()
                .enumerate()
                .map(|(source, v)| ConflictOption {
                    value: v.to_string(),
                    source,
                })
                .collect(),
        }
    }

    #[test]
    fn test_accept_pick() {
        let c = conflict(&["k=1", "k=2", "k=3"]);
        assert_eq!(Accept::First.pick(&c), 0);
        assert_eq!(Accept::Last.pick(&c), 2);
    }

    #[test]
    fn test_non_interactive_merge_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.ini");
        let b = dir.path().join("b.ini");
        std::fs::write(&a, "[G]\nQ=Low\n").unwrap();
        std::fs::write(&b, "[G]\nQ=High\n").unwrap();
        let out = dir.path().join("merged.ini");

        run_merge(
            &MergeConfig::default(),
            MergeArgs {
                files: vec![a, b],
                output: Some(out.clone()),
                accept: Some(Accept::Last),
                print: false,
                force: false,
            },
        )
        .unwrap();

        assert_eq!(std::fs::read_to_string(out).unwrap(), "[G]\nQ=High");
    }

    #[test]
    fn test_force_overwrites_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.ini");
        std::fs::write(&a, "[G]\nQ=Low\n").unwrap();
        let out = dir.path().join("merged.ini");
        std::fs::write(&out, "old").unwrap();

        run_merge(
            &MergeConfig::default(),
            MergeArgs {
                files: vec![a],
                output: Some(out.clone()),
                accept: None,
                print: false,
                force: true,
            },
        )
        .unwrap();

        assert_eq!(std::fs::read_to_string(out).unwrap(), "[G]\nQ=Low");
    }

    #[test]
    fn test_no_readable_sources() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_sources(&[dir.path().join("missing.ini")]);
        assert!(result.is_err());
    }
}
