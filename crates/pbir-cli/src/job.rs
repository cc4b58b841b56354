//! Merge the optional job file with command-line flags

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;
use pbir_sync::{FlushMode, JobConfig, NameFilter, SyncOptions, SyncRequest, DEFAULT_SOURCE_PAGE};

/// Which filter flag a subcommand takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FilterArg {
    /// `--name`, matched against visual display names
    Visuals,
    /// `--bookmark`, matched against bookmark ids
    Bookmarks,
}

impl FilterArg {
    fn flag(self) -> &'static str {
        match self {
            Self::Visuals => "name",
            Self::Bookmarks => "bookmark",
        }
    }
}

/// A fully resolved sync invocation
#[derive(Debug, Clone)]
pub(crate) struct Job {
    pub(crate) request: SyncRequest,
    pub(crate) options: SyncOptions,
}

impl Job {
    /// Flags win over the job file; the job file wins over defaults
    pub(crate) fn from_args(args: &ArgMatches, filter_arg: FilterArg) -> Result<Self> {
        let file = match args.get_one::<PathBuf>("config") {
            Some(path) => JobConfig::load(path)?,
            None => JobConfig::default(),
        };

        let report = args
            .get_one::<String>("report")
            .cloned()
            .or_else(|| file.report.clone())
            .context("no report given: pass --report or set `report` in the job file")?;

        let source = args
            .get_one::<String>("source")
            .cloned()
            .or_else(|| file.source.clone())
            .unwrap_or_else(|| DEFAULT_SOURCE_PAGE.to_string());

        let targets = args
            .get_many::<String>("target")
            .map(|pages| pages.cloned().collect::<Vec<_>>())
            .or_else(|| file.targets.clone());

        let filter = match args.get_many::<String>(filter_arg.flag()) {
            Some(names) => NameFilter::from_names(names.cloned()),
            None => match filter_arg {
                FilterArg::Visuals => file.visual_filter()?,
                FilterArg::Bookmarks => file.bookmark_filter()?,
            },
        };

        let mut request = SyncRequest::new(report).with_source(source).with_filter(filter);
        if let Some(targets) = targets {
            request = request.with_targets(targets);
        }

        let mut options = file.options();
        if args.get_flag("dry-run") {
            options.dry_run = true;
        }
        if args.get_flag("direct-writes") {
            options.flush_mode = FlushMode::Direct;
        }
        if filter_arg == FilterArg::Visuals {
            if let Some(visual) = args.get_one::<String>("title-visual") {
                options.title_visual = Some(visual.clone());
            }
        } else {
            options.title_visual = None;
        }

        tracing::debug!("Resolved job: {:?} {:?}", request, options);
        Ok(Self { request, options })
    }
}
