//! `inimerge conflicts`: report conflicts without resolving them.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;

use inimerge_core::{MergeConfig, MergeSession};

use crate::{merge::load_sources, style};

#[derive(Debug, Serialize)]
struct ConflictReport {
    section: String,
    setting: String,
    options: Vec<OptionReport>,
}

#[derive(Debug, Serialize)]
struct OptionReport {
    value: String,
    source: String,
}

/// Merge the files and list every conflict found.
pub fn run_conflicts(config: &MergeConfig, files: &[PathBuf], json: bool) -> Result<()> {
    let set = load_sources(files)?;
    let mut session = MergeSession::new(config.policy());
    let update = session
        .start_merge(set.into_files())
        .context("failed to merge source files")?;

    let reports = build_reports(&session);

    if json {
        let out = serde_json::to_string_pretty(&reports).context("failed to serialize conflicts")?;
        println!("{}", out);
        return Ok(());
    }

    if reports.is_empty() {
        println!("{}", style::success(&update.status()));
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Section", "Setting", "Options"]);
    for report in &reports {
        let options = report
            .options
            .iter()
            .map(|o| format!("{}  ({})", o.value, o.source))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![
            Cell::new(&report.section),
            Cell::new(&report.setting),
            Cell::new(options),
        ]);
    }

    println!("{}", style::header(&update.status()));
    println!("{}", table);
    Ok(())
}

fn build_reports(session: &MergeSession) -> Vec<ConflictReport> {
    session
        .conflicts()
        .iter()
        .map(|c| ConflictReport {
            section: c.section.clone(),
            setting: c.setting_name.clone(),
            options: c
                .options
                .iter()
                .map(|o| OptionReport {
                    value: o.value.clone(),
                    source: session.source_name(o.source).to_string(),
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use inimerge_core::SourceFile;

    #[test]
    fn test_reports_name_sources() {
        let mut session = MergeSession::default();
        session
            .start_merge(vec![
                SourceFile::new("/a/one.ini", "one.ini", "[G]\nQ=1\n"),
                SourceFile::new("/a/two.ini", "two.ini", "[G]\nQ=2\n"),
            ])
            .unwrap();

        let reports = build_reports(&session);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].section, "G");
        assert_eq!(reports[0].setting, "Q");
        assert_eq!(reports[0].options[0].source, "one.ini");
        assert_eq!(reports[0].options[1].value, "Q=2");
        assert_eq!(reports[0].options[1].source, "two.ini");

        let json = serde_json::to_value(&reports).unwrap();
        assert_eq!(json[0]["options"][1]["source"], "two.ini");
    }

    #[test]
    fn test_no_conflicts_reports_empty() {
        let mut session = MergeSession::default();
        session
            .start_merge(vec![SourceFile::new("/a/one.ini", "one.ini", "[G]\nQ=1\n")])
            .unwrap();
        assert!(build_reports(&session).is_empty());
    }
}
