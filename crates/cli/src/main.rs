//! inimerge command-line tool.
//!
//! Merges several INI configuration files into one, walking through each
//! conflicting setting interactively (or automatically with `--accept`),
//! and generates / validates the tool's own configuration file.

mod conflicts;
mod merge;
mod style;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use inimerge_core::MergeConfig;

use crate::merge::{Accept, MergeArgs};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// inimerge command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "inimerge",
    version,
    about = "Merge INI configuration files and resolve conflicting settings"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge source files into one, resolving conflicts.
    Merge {
        /// Source files, in priority order.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Where to write the merged file.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Resolve every conflict automatically instead of prompting.
        #[arg(long, value_enum)]
        accept: Option<Accept>,

        /// Print the merged text before saving.
        #[arg(long)]
        print: bool,

        /// Overwrite the output file without asking.
        #[arg(long)]
        force: bool,
    },

    /// List conflicting settings without resolving them.
    Conflicts {
        /// Source files, in priority order.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print the conflicts as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate a default configuration file.
    Init {
        /// Output path for the generated config.
        #[arg(short, long, default_value = "inimerge.toml")]
        output: PathBuf,
    },

    /// Validate the configuration file.
    Validate,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", style::error(&format!("Error: {:#}", e)));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { output } => {
            init_logging("warn");
            cmd_init(&output)
        }
        Commands::Validate => {
            init_logging("warn");
            cmd_validate(cli.config.as_deref())
        }
        command => {
            let config = MergeConfig::load_or_default(cli.config.as_deref())
                .context("failed to load configuration")?;
            init_logging(&config.logging.level);

            match command {
                Commands::Merge {
                    files,
                    output,
                    accept,
                    print,
                    force,
                } => merge::run_merge(
                    &config,
                    MergeArgs {
                        files,
                        output,
                        accept,
                        print,
                        force,
                    },
                ),
                Commands::Conflicts { files, json } => {
                    conflicts::run_conflicts(&config, &files, json)
                }
                _ => unreachable!(),
            }
        }
    }
}

/// Log to stderr. `RUST_LOG` wins over the configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

fn cmd_init(output: &Path) -> Result<()> {
    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    let contents = format!(
        "# inimerge configuration\n\n{}",
        MergeConfig::default_toml().context("failed to render default configuration")?
    );
    std::fs::write(output, contents).context("failed to write config file")?;

    println!("Default configuration written to {}", output.display());
    println!();
    println!("Next steps:");
    println!("  1. Add any list settings that should never conflict to [merge]");
    println!(
        "  2. Validate with: inimerge validate --config {}",
        output.display()
    );
    println!(
        "  3. Merge with: inimerge merge --config {} <FILES>...",
        output.display()
    );

    Ok(())
}

fn cmd_validate(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => MergeConfig::default_path().context("no configuration directory on this system")?,
    };
    println!("Validating configuration: {}", path.display());
    println!();

    let config = MergeConfig::load_from_file(&path).context("failed to parse configuration")?;
    println!("  [OK] TOML structure is valid");

    match config.validate() {
        Ok(()) => println!("  [OK] All fields are valid"),
        Err(e) => {
            println!("  [FAIL] Validation error: {}", e);
            anyhow::bail!("configuration validation failed");
        }
    }

    println!();
    println!("Configuration summary:");
    println!(
        "  Repeatable settings : {}",
        if config.merge.repeatable_settings.is_empty() {
            "(none)".to_string()
        } else {
            config.merge.repeatable_settings.join(", ")
        }
    );
    println!("  Default output      : {}", config.output.default_file_name);
    println!("  Log level           : {}", config.logging.level);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_merge() {
        let cli = Cli::try_parse_from([
            "inimerge", "merge", "a.ini", "b.ini", "-o", "out.ini", "--accept", "last",
        ])
        .unwrap();
        match cli.command {
            Commands::Merge {
                files,
                output,
                accept,
                print,
                force,
            } => {
                assert_eq!(files, vec![PathBuf::from("a.ini"), PathBuf::from("b.ini")]);
                assert_eq!(output, Some(PathBuf::from("out.ini")));
                assert_eq!(accept, Some(Accept::Last));
                assert!(!print);
                assert!(!force);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_merge_requires_files() {
        assert!(Cli::try_parse_from(["inimerge", "merge"]).is_err());
    }

    #[test]
    fn test_cli_global_config() {
        let cli = Cli::try_parse_from(["inimerge", "validate", "-c", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_init_then_validate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inimerge.toml");

        cmd_init(&path).unwrap();
        assert!(cmd_init(&path).is_err(), "init must not overwrite");
        cmd_validate(Some(&path)).unwrap();

        let config = MergeConfig::load_from_file(&path).unwrap();
        assert_eq!(config, MergeConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(cmd_validate(Some(&path)).is_err());
    }
}
