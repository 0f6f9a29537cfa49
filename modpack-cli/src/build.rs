//! The build command: resolve paths, load config, run the pipeline, report.

use std::path::Path;

use anyhow::{bail, Context, Result};
use colored::Colorize;

use modpack_core::{config, BuildPaths};
use modpack_sync::{pipeline, RunOptions, SyncEvent, SyncReport, TracingReporter, VerifyIssue};

use crate::Cli;

pub fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("could not determine current directory")?;
    let project_root = match &cli.project_root {
        Some(path) => cwd.join(path),
        None => cwd.clone(),
    };
    let project_root = project_root
        .canonicalize()
        .with_context(|| format!("project root {} is not accessible", project_root.display()))?;

    let mut build_config = match &cli.config {
        Some(path) => config::load_file(&cwd.join(path), &project_root),
        None => config::load_at(&project_root),
    }
    .context("failed to load build configuration")?;
    if let Some(mode) = cli.clear_mode {
        build_config.clear_mode = mode.into();
    }

    let paths = BuildPaths::resolve(
        &project_root,
        cli.output.as_deref(),
        &cwd,
        &build_config.mod_name,
    );
    if paths.output_auto_selected {
        tracing::warn!(
            "Output directory automatically chosen: {}",
            paths.output_root.display()
        );
    }

    let options = RunOptions {
        dry_run: cli.dry_run,
        verify: cli.verify,
    };
    let report = pipeline::run(
        &build_config,
        &paths,
        options,
        TracingReporter::new(cli.dry_run),
    )
    .with_context(|| {
        format!(
            "failed to package '{}' into {}",
            build_config.mod_name,
            paths.mod_directory.display()
        )
    })?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize report JSON")?
        );
    } else {
        print_summary(&report);
    }

    let issues = report.verify_issues();
    if !issues.is_empty() {
        bail!(
            "verification failed: {} file(s) in {} do not match the source",
            issues.len(),
            report.mod_directory.display()
        );
    }
    Ok(())
}

fn print_summary(report: &SyncReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    println!(
        "{prefix}{} '{}' packaged into {} ({} copied, {} cleared, {} created, {} skipped)",
        "✓".green(),
        report.mod_name,
        report.mod_directory.display(),
        report.files_copied(),
        report.entries_cleared(),
        report.directories_created(),
        report.skipped(),
    );

    let rel = |path: &Path| -> String {
        path.strip_prefix(&report.mod_directory)
            .unwrap_or(path)
            .display()
            .to_string()
    };

    for event in &report.events {
        match event {
            SyncEvent::OutputRootCreated { path } | SyncEvent::ModDirectoryCreated { path } => {
                println!("  {}  {}", "+".green(), path.display());
            }
            SyncEvent::FolderCleared { name, .. }
            | SyncEvent::EmptyFolderRemoved { name, .. }
            | SyncEvent::StaleEntryRemoved { name, .. } => {
                println!("  {}  {name}", "✗".red());
            }
            SyncEvent::EmptyFolderKept { name, .. } => {
                println!("  {}  {name} (empty, kept)", "·".dimmed());
            }
            SyncEvent::DirectoryCreated { path } => {
                println!("  {}  {}/", "+".green(), rel(path));
            }
            SyncEvent::FileCopied { to, .. } => {
                println!("  {}  {}", "✎".cyan(), rel(to));
            }
            SyncEvent::SourceSkipped { entry, reason } => {
                println!("  {}  {entry}: {reason}", "~".yellow());
            }
        }
    }

    for issue in report.verify_issues() {
        match issue {
            VerifyIssue::Missing { path } => {
                println!("  {}  missing {}", "!".red().bold(), rel(path));
            }
            VerifyIssue::Mismatch { path, .. } => {
                println!("  {}  differs {}", "!".red().bold(), rel(path));
            }
        }
    }
}
