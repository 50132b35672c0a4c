use anyhow::{Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::commands::{self, CommandReport};
use crate::logging;

/// Keep a working tree free of data that is already safely archived.
///
/// For every dataset (a directory holding `vYYYYMMDD` version directories)
/// the working copy of each version is compared against the archive's
/// `latest` version: older versions are replaced by symlinks into the
/// archive, the latest version is deduplicated only when verified identical,
/// and newer versions are reported as awaiting ingestion.
#[derive(Parser, Debug)]
#[command(name = "archlink")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconcile a working tree against its archive tree
    ///
    /// Both directories must exist. Datasets whose archive side lacks a
    /// valid `latest` link are skipped untouched.
    Reconcile {
        /// Working tree base (falls back to ARCHLINK_WORKING_DIR / config)
        working: Option<PathBuf>,
        /// Archive tree base (falls back to ARCHLINK_ARCHIVE_DIR / config)
        archive: Option<PathBuf>,
        /// Report decisions without deleting or linking anything
        #[arg(long)]
        dry_run: bool,
        /// Read block size in bytes used while hashing
        #[arg(long)]
        block_size: Option<usize>,
    },

    /// List the datasets and versions found under a tree (read-only)
    Scan {
        /// Tree to scan (falls back to the configured working tree)
        tree: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config,
}

fn print_report(report: &CommandReport) {
    for detail in &report.details {
        println!("{detail}");
    }
    for issue in &report.issues {
        eprintln!("issue: {issue}");
    }
}

pub fn run(dotenv: Option<&Path>) -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let report = match cli.command {
        Commands::Reconcile {
            working,
            archive,
            dry_run,
            block_size,
        } => commands::reconcile::run(&commands::reconcile::ReconcileArgs {
            working_dir: working,
            archive_dir: archive,
            dry_run,
            block_size,
        })?,
        Commands::Scan { tree } => commands::scan::run(tree)?,
        Commands::Config => commands::show_config::run(dotenv)?,
    };

    print_report(&report);
    if !report.ok {
        bail!(
            "{} finished with {} issue(s)",
            report.command,
            report.issues.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn reconcile_parses_paths_and_flags() {
        let cli = Cli::try_parse_from([
            "archlink",
            "-v",
            "reconcile",
            "/gws",
            "/archive",
            "--dry-run",
            "--block-size",
            "4096",
        ])
        .expect("parse");
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Reconcile {
                working,
                archive,
                dry_run,
                block_size,
            } => {
                assert_eq!(working, Some(PathBuf::from("/gws")));
                assert_eq!(archive, Some(PathBuf::from("/archive")));
                assert!(dry_run);
                assert_eq!(block_size, Some(4096));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
