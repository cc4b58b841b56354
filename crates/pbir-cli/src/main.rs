//! `pbir-layout`: propagate a page layout across a Power BI project

mod job;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use pbir_sync::{duplicate_bookmarks, duplicate_visuals};
use pbir_template::create_empty_project;
use tracing_subscriber::EnvFilter;

use crate::job::{FilterArg, Job};

fn main() {
    init_tracing();

    if let Err(err) = run(&cli().get_matches()) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Arguments shared by the sync subcommands
fn sync_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("project")
                .long("project")
                .value_parser(value_parser!(PathBuf))
                .required(true)
                .help("Project directory containing the report folder"),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .help("Report root folder name, e.g. Sales.Report"),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .help("Source page folder (default: main)"),
        )
        .arg(
            Arg::new("target")
                .long("target")
                .action(ArgAction::Append)
                .help("Target page folder or id; repeat for several (default: every other page)"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Report changes without writing"),
        )
        .arg(
            Arg::new("direct-writes")
                .long("direct-writes")
                .action(ArgAction::SetTrue)
                .help("Write files in place instead of temp file + rename"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("TOML job file; flags override its values"),
        )
}

fn cli() -> Command {
    Command::new("pbir-layout")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Propagate a curated page layout across a Power BI (PBIR) project")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            sync_args(Command::new("visuals").about("Copy visuals and groups from the source page"))
                .arg(
                    Arg::new("name")
                        .long("name")
                        .action(ArgAction::Append)
                        .help("Only copy visuals with this display name; repeat for several"),
                )
                .arg(
                    Arg::new("title-visual")
                        .long("title-visual")
                        .help("Visual id whose second text run receives the page name"),
                ),
        )
        .subcommand(
            sync_args(
                Command::new("bookmarks").about("Mirror source bookmarks onto target pages"),
            )
            .arg(
                Arg::new("bookmark")
                    .long("bookmark")
                    .action(ArgAction::Append)
                    .help("Only mirror this bookmark id; repeat for several"),
            ),
        )
        .subcommand(
            Command::new("new")
                .about("Create an empty project")
                .arg(
                    Arg::new("output")
                        .long("output")
                        .value_parser(value_parser!(PathBuf))
                        .required(true)
                        .help("Directory to create the project in"),
                )
                .arg(
                    Arg::new("name")
                        .long("name")
                        .required(true)
                        .help("Project name"),
                ),
        )
}

fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("visuals", args)) => {
            let (project, job) = sync_job(args, FilterArg::Visuals)?;
            let summary = duplicate_visuals(&project, &job.request, &job.options)
                .context("visual duplication failed")?;

            println!(
                "Copied {} visual(s) and {} group(s) to {} page(s)",
                summary.visuals.len(),
                summary.groups.len(),
                summary.pages.len()
            );
            if summary.titles_stamped > 0 {
                println!("  Page titles stamped: {}", summary.titles_stamped);
            }
            if job.options.dry_run {
                println!("  Dry run: {} document(s) not written", summary.documents_staged);
            }
        }
        Some(("bookmarks", args)) => {
            let (project, job) = sync_job(args, FilterArg::Bookmarks)?;
            let summary = duplicate_bookmarks(&project, &job.request, &job.options)
                .context("bookmark sync failed")?;

            println!(
                "Synced {} bookmark(s) to {} page(s)",
                summary.source_bookmarks.len(),
                summary.pages.len()
            );
            println!("  Upserted: {}", summary.upserted.len());
            println!("  Deleted: {}", summary.deleted.len());
            println!("  Links rewritten: {}", summary.links_rewritten);
            if job.options.dry_run {
                println!("  Dry run: nothing written");
            }
        }
        Some(("new", args)) => {
            let output = args
                .get_one::<PathBuf>("output")
                .context("--output is required")?;
            let name = args.get_one::<String>("name").context("--name is required")?;

            let written = create_empty_project(output, name)
                .with_context(|| format!("cannot create project in {}", output.display()))?;
            println!("Created project {name} ({} files) in {}", written.len(), output.display());
        }
        _ => {}
    }
    Ok(())
}

fn sync_job(args: &ArgMatches, filter: FilterArg) -> Result<(PathBuf, Job)> {
    let project = args
        .get_one::<PathBuf>("project")
        .cloned()
        .context("--project is required")?;
    let job = Job::from_args(args, filter)?;
    Ok((project, job))
}
