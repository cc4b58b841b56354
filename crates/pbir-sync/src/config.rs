//! Operation options and job files
//!
//! [`SyncRequest`] says *what* to sync, [`SyncOptions`] says *how*. A TOML
//! [`JobConfig`] can supply defaults for both; explicit values win.
//!
//! ```toml
//! report = "Sales.Report"
//! source = "main"
//! targets = ["p2", "p3"]
//! visuals = ["Revenue", "Margin"]   # or a single string
//! bookmarks = "bk_overview"
//! title_visual = "PageTitle"
//! dry_run = false
//! direct_writes = false
//! ```

use std::fs;
use std::path::Path;

use pbir_catalog::NameFilter;
use pbir_store::FlushMode;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{SyncError, SyncResult};

/// Default source page folder
pub const DEFAULT_SOURCE_PAGE: &str = "main";

/// What to sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    /// Report root name (e.g. `Sales.Report`)
    pub report: String,
    /// Source page, by folder or id
    pub source_page: String,
    /// Target pages by folder or id; `None` means every page except the source
    pub target_pages: Option<Vec<String>>,
    /// Which visuals (by display name) or bookmarks (by id) to sync
    pub filter: NameFilter,
}

impl SyncRequest {
    /// Request for every element from the default source page to every other page
    #[must_use]
    pub fn new(report: impl Into<String>) -> Self {
        Self {
            report: report.into(),
            source_page: DEFAULT_SOURCE_PAGE.to_string(),
            target_pages: None,
            filter: NameFilter::All,
        }
    }

    /// With source page
    #[inline]
    #[must_use]
    pub fn with_source(mut self, page: impl Into<String>) -> Self {
        self.source_page = page.into();
        self
    }

    /// With explicit target pages
    #[must_use]
    pub fn with_targets<I, S>(mut self, pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_pages = Some(pages.into_iter().map(Into::into).collect());
        self
    }

    /// With name filter
    #[inline]
    #[must_use]
    pub fn with_filter(mut self, filter: NameFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// How to sync
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Compute and report changes without writing
    pub dry_run: bool,
    /// Flush strategy
    pub flush_mode: FlushMode,
    /// Visual id whose second text run receives each target page's display name
    pub title_visual: Option<String>,
}

impl SyncOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With dry run
    #[inline]
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// With flush mode
    #[inline]
    #[must_use]
    pub fn with_flush_mode(mut self, mode: FlushMode) -> Self {
        self.flush_mode = mode;
        self
    }

    /// With page-title visual
    #[inline]
    #[must_use]
    pub fn with_title_visual(mut self, visual_id: impl Into<String>) -> Self {
        self.title_visual = Some(visual_id.into());
        self
    }
}

/// Job file contents; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Report root name
    pub report: Option<String>,
    /// Source page
    pub source: Option<String>,
    /// Target pages
    pub targets: Option<Vec<String>>,
    /// Visual name filter (string or list of strings)
    pub visuals: Option<Value>,
    /// Bookmark id filter (string or list of strings)
    pub bookmarks: Option<Value>,
    /// Page-title visual id
    pub title_visual: Option<String>,
    /// Dry run
    pub dry_run: Option<bool>,
    /// Write files in place instead of temp + rename
    pub direct_writes: Option<bool>,
}

impl JobConfig {
    /// Read and parse a TOML job file
    ///
    /// # Errors
    /// Returns [`SyncError::Config`] if the file cannot be read or parsed
    pub fn load(path: &Path) -> SyncResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| SyncError::config(path, e.to_string()))?;
        Self::parse(&text, path)
    }

    /// Parse TOML text; `origin` is only used in error messages
    ///
    /// # Errors
    /// Returns [`SyncError::Config`] on malformed TOML or unknown keys
    pub fn parse(text: &str, origin: &Path) -> SyncResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| SyncError::config(origin, e.message()))?;
        tracing::debug!("loaded job file {}", origin.display());
        Ok(config)
    }

    /// Resolved visual filter
    ///
    /// # Errors
    /// Returns input validation error for unsupported shapes
    pub fn visual_filter(&self) -> SyncResult<NameFilter> {
        Ok(NameFilter::from_value(self.visuals.as_ref())?)
    }

    /// Resolved bookmark filter
    ///
    /// # Errors
    /// Returns input validation error for unsupported shapes
    pub fn bookmark_filter(&self) -> SyncResult<NameFilter> {
        Ok(NameFilter::from_value(self.bookmarks.as_ref())?)
    }

    /// Options from the file's values
    #[must_use]
    pub fn options(&self) -> SyncOptions {
        SyncOptions {
            dry_run: self.dry_run.unwrap_or(false),
            flush_mode: if self.direct_writes.unwrap_or(false) {
                FlushMode::Direct
            } else {
                FlushMode::Atomic
            },
            title_visual: self.title_visual.clone(),
        }
    }

    /// Request from the file's values, with `filter` already resolved
    ///
    /// Returns `None` if the file names no report.
    #[must_use]
    pub fn request(&self, filter: NameFilter) -> Option<SyncRequest> {
        let report = self.report.clone()?;
        Some(SyncRequest {
            report,
            source_page: self
                .source
                .clone()
                .unwrap_or_else(|| DEFAULT_SOURCE_PAGE.to_string()),
            target_pages: self.targets.clone(),
            filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn origin() -> &'static Path {
        Path::new("job.toml")
    }

    #[test]
    fn request_builder() {
        let request = SyncRequest::new("R")
            .with_source("template")
            .with_targets(["p2"])
            .with_filter(NameFilter::One("Chart".into()));
        assert_eq!(request.source_page, "template");
        assert_eq!(request.target_pages, Some(vec!["p2".to_string()]));
        assert_eq!(SyncRequest::new("R").source_page, "main");
    }

    #[test]
    fn options_builder() {
        let options = SyncOptions::new()
            .with_dry_run(true)
            .with_flush_mode(FlushMode::Direct)
            .with_title_visual("PageTitle");
        assert!(options.dry_run);
        assert_eq!(options.flush_mode, FlushMode::Direct);
        assert_eq!(options.title_visual.as_deref(), Some("PageTitle"));
    }

    #[test]
    fn parse_full_job() {
        let config = JobConfig::parse(
            r#"
            report = "Sales.Report"
            source = "template"
            targets = ["p2", "p3"]
            visuals = ["Chart A", "Table"]
            bookmarks = "bk1"
            title_visual = "PageTitle"
            dry_run = true
            direct_writes = true
            "#,
            origin(),
        )
        .unwrap();

        let request = config.request(config.visual_filter().unwrap()).unwrap();
        assert_eq!(request.report, "Sales.Report");
        assert_eq!(request.source_page, "template");
        assert_eq!(request.filter, NameFilter::from_names(["Chart A", "Table"]));
        assert_eq!(config.bookmark_filter().unwrap(), NameFilter::One("bk1".into()));

        let options = config.options();
        assert!(options.dry_run);
        assert_eq!(options.flush_mode, FlushMode::Direct);
    }

    #[test]
    fn empty_job_has_defaults() {
        let config = JobConfig::parse("", origin()).unwrap();
        assert!(config.request(NameFilter::All).is_none());
        assert_eq!(config.options(), SyncOptions::default());
        assert_eq!(config.visual_filter().unwrap(), NameFilter::All);
    }

    #[test]
    fn bad_filter_shape_is_validation_error() {
        let config = JobConfig::parse("visuals = 3", origin()).unwrap();
        assert!(config.visual_filter().unwrap_err().is_validation());
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = JobConfig::parse("reprot = \"x\"", origin()).unwrap_err();
        assert!(matches!(err, SyncError::Config { .. }));
    }

    #[test]
    fn load_missing_file() {
        let err = JobConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, SyncError::Config { .. }));
    }
}
