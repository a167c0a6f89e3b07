use std::path::Path;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use workspace_licenses::cli::{Cli, Command};
use workspace_licenses::config::load_config;
use workspace_licenses::entries::build_license_entries;
use workspace_licenses::error::SelectionError;
use workspace_licenses::graph::collector::Collector;
use workspace_licenses::graph::snapshot::ProjectSnapshot;
use workspace_licenses::graph::Workspace;
use workspace_licenses::license::audit::{audit_license_entries, has_violations};
use workspace_licenses::metadata::{MetadataSource, RegistryMetadata, SnapshotMetadata};
use workspace_licenses::report;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let args = cli.command.traversal();

    // The project root is the directory holding the snapshot
    let project_dir = cli
        .snapshot
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let config = load_config(project_dir, cli.config.as_deref())?;

    // Validate the allow-list before doing any work
    let allow = match &cli.command {
        Command::Audit { allow, .. } => Some(config.allow_list(allow)?),
        Command::List(_) => None,
    };

    let snapshot = ProjectSnapshot::load(&cli.snapshot)?;
    let seeds: Vec<&Workspace> = if args.all {
        if snapshot.workspaces().is_empty() {
            return Err(SelectionError::NoWorkspaces.into());
        }
        snapshot.workspaces().iter().collect()
    } else {
        snapshot.select_workspaces(&args.workspaces)?
    };

    let options = args.options(&config.collect);
    let collection = Collector::new(&snapshot, options).run(seeds.iter().copied());

    let quiet = args.quiet || args.json;
    if !quiet {
        eprintln!(
            "  {} {} workspace(s) visited, {} dependencies",
            "→".cyan(),
            collection.visited_workspaces.len(),
            collection.locators.len()
        );
    }
    if args.warn_unreached_workspaces(options, &collection, seeds.len()) {
        eprintln!(
            "  {} --recursive-workspaces reached no workspace beyond the selected ones",
            "⚠".yellow()
        );
    }

    let source: Box<dyn MetadataSource> = if args.online {
        Box::new(RegistryMetadata::new()?)
    } else {
        Box::new(SnapshotMetadata)
    };

    let pb = if quiet {
        None
    } else {
        let pb = ProgressBar::new(collection.locators.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    };

    let entries = build_license_entries(
        &snapshot,
        &collection.locators,
        source.as_ref(),
        args.concurrency(&config.collect),
        pb.as_ref(),
    )
    .await?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let Some(allow) = allow else {
        if args.json {
            println!("{}", report::json::render_list(&entries)?);
        } else {
            report::terminal::render_list(&entries, args.quiet);
        }
        return Ok(());
    };

    let audited = audit_license_entries(&entries, &allow);
    if args.json {
        println!("{}", report::json::render_audit(&audited)?);
    } else {
        report::terminal::render_audit(&audited, &allow, args.quiet);
    }

    // Exit code: 1 if any dependency violates the allow-list
    if has_violations(&audited) {
        std::process::exit(1);
    }

    Ok(())
}
