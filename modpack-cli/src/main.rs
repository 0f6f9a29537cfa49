//! modpack: package a mod's source payload into a deployable folder.
//!
//! # Usage
//!
//! ```text
//! modpack [OUTPUT] [--project-root <DIR>] [--config <FILE>] [--clear-mode keep-empty|remove-empty]
//!         [--dry-run] [--verify] [--json] [-v|-vv] [-q]
//! ```
//!
//! Without `OUTPUT` the mod is packaged into `<project-root>/build`.

mod build;
mod logging;

use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use clap::{ArgAction, Parser};

use modpack_core::ClearMode;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "modpack",
    version,
    about = "Assemble a deployable mod folder from its source tree",
    long_about = None,
)]
struct Cli {
    /// Output directory (its parent must exist). Defaults to `<project-root>/build`.
    output: Option<PathBuf>,

    /// Directory holding the mod source. Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    project_root: Option<PathBuf>,

    /// Config file to use instead of `<project-root>/modpack.yaml`.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the configured handling of already-empty relevant folders.
    #[arg(long, value_name = "MODE")]
    clear_mode: Option<ClearModeArg>,

    /// Show what would be cleared and copied without touching the filesystem.
    #[arg(long)]
    dry_run: bool,

    /// Hash-compare the packaged files against the source after building.
    #[arg(long, conflicts_with = "dry_run")]
    verify: bool,

    /// Print the run report as JSON.
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

// ---------------------------------------------------------------------------
// ClearMode argument, parsed from CLI strings
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `ClearMode` from CLI args.
#[derive(Debug, Clone, Copy)]
pub struct ClearModeArg(pub ClearMode);

impl FromStr for ClearModeArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keep-empty" | "keep" => Ok(Self(ClearMode::KeepEmpty)),
            "remove-empty" | "remove" => Ok(Self(ClearMode::RemoveEmpty)),
            other => Err(format!(
                "unknown clear mode '{other}'; expected: keep-empty, remove-empty"
            )),
        }
    }
}

impl fmt::Display for ClearModeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<ClearModeArg> for ClearMode {
    fn from(m: ClearModeArg) -> Self {
        m.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    match build::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("build script failed: {err:?}");
            ExitCode::FAILURE
        }
    }
}
