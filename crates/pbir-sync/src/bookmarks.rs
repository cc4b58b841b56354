//! Bookmark synchronization
//!
//! Bookmarks on each target page mirror the source page's bookmarks: every
//! source bookmark `{src}` gets a derived copy `{src}_{page}`, derived copies
//! whose source is gone are deleted, and visual links are repointed at the
//! derived copies.
//!
//! Each target page runs through the same phases:
//!
//! ```text
//! CollectSource → ComputeExpected → DeleteOrphans → Upsert → RewriteLinks → Done
//! ```

use std::fmt::{self, Display, Formatter};
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use pbir_catalog::{bookmark_file_id, set_bookmark_link, Bookmark, Catalog, Page, ProjectLayout};
use pbir_store::{quote_literal, DocPath, DocumentStore};
use serde_json::{Map, Value};

use crate::config::{SyncOptions, SyncRequest};
use crate::error::{SyncResult, ValidationError};
use crate::resolve::{source_page, target_pages};

/// Phase of one target page's synchronization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncPhase {
    /// Source bookmarks for the page are known
    CollectSource,
    /// Derived ids for the page are computed
    ComputeExpected,
    /// Stale derived bookmarks are deleted
    DeleteOrphans,
    /// Derived bookmarks are written
    Upsert,
    /// Target visual links are repointed
    RewriteLinks,
    /// Finished
    Done,
}

impl SyncPhase {
    /// Following phase (`Done` is terminal)
    #[inline]
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::CollectSource => Self::ComputeExpected,
            Self::ComputeExpected => Self::DeleteOrphans,
            Self::DeleteOrphans => Self::Upsert,
            Self::Upsert => Self::RewriteLinks,
            Self::RewriteLinks | Self::Done => Self::Done,
        }
    }

    /// Check for the terminal phase
    #[inline]
    #[must_use]
    pub fn is_done(self) -> bool {
        self == Self::Done
    }
}

impl Display for SyncPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CollectSource => "collect-source",
            Self::ComputeExpected => "compute-expected",
            Self::DeleteOrphans => "delete-orphans",
            Self::Upsert => "upsert",
            Self::RewriteLinks => "rewrite-links",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Outcome of a bookmark synchronization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkSummary {
    /// Source bookmark ids, in path order
    pub source_bookmarks: Vec<String>,
    /// Target page ids that were processed
    pub pages: Vec<String>,
    /// Derived bookmark ids written
    pub upserted: Vec<String>,
    /// Orphaned bookmark file ids deleted
    pub deleted: Vec<String>,
    /// Visual links repointed
    pub links_rewritten: usize,
}

/// Per-run state shared by every target page
struct RunContext<'a> {
    layout: &'a ProjectLayout,
    source: &'a Page,
    /// Source bookmarks by id
    collected: IndexMap<String, &'a Bookmark>,
    /// Ids that must survive orphan cleanup
    protected: IndexSet<String>,
    /// Every bookmark file at operation start, readable or not
    existing: Vec<(String, DocPath)>,
    /// `(visual id, link index, source bookmark id)` on the source page
    links: Vec<(String, usize, String)>,
}

/// One target page moving through [`SyncPhase`]
struct PageSync<'r, 'a> {
    run: &'r RunContext<'a>,
    page: &'a Page,
    phase: SyncPhase,
    expected: IndexSet<String>,
    /// Derived ids actually written for this page
    upserted: IndexSet<String>,
}

impl<'r, 'a> PageSync<'r, 'a> {
    fn new(run: &'r RunContext<'a>, page: &'a Page) -> Self {
        Self {
            run,
            page,
            phase: SyncPhase::CollectSource,
            expected: IndexSet::new(),
            upserted: IndexSet::new(),
        }
    }

    fn run(mut self, store: &mut DocumentStore, summary: &mut BookmarkSummary) -> SyncResult<()> {
        while !self.phase.is_done() {
            tracing::debug!("Page {}: {}", self.page.id(), self.phase);
            match self.phase {
                SyncPhase::CollectSource => {
                    tracing::debug!("{} source bookmark(s)", self.run.collected.len());
                }
                SyncPhase::ComputeExpected => {
                    self.expected = expected_ids(self.run.collected.keys(), self.page.id());
                }
                SyncPhase::DeleteOrphans => self.delete_orphans(store, summary),
                SyncPhase::Upsert => self.upsert(store, summary)?,
                SyncPhase::RewriteLinks => self.rewrite_links(store, summary)?,
                SyncPhase::Done => {}
            }
            self.phase = self.phase.next();
        }
        Ok(())
    }

    fn delete_orphans(&self, store: &mut DocumentStore, summary: &mut BookmarkSummary) {
        let suffix = format!("_{}", self.page.id());
        for (file_id, path) in &self.run.existing {
            if !file_id.ends_with(&suffix)
                || self.expected.contains(file_id)
                || self.run.protected.contains(file_id)
            {
                continue;
            }
            if store.delete(path) {
                tracing::info!("Deleted orphaned bookmark {}", file_id);
                summary.deleted.push(file_id.to_string());
            }
        }
    }

    fn upsert(&mut self, store: &mut DocumentStore, summary: &mut BookmarkSummary) -> SyncResult<()> {
        for (source_id, bookmark) in &self.run.collected {
            let new_id = derived_id(source_id, self.page.id());
            let Ok(path) = self.run.layout.bookmark_doc(&new_id) else {
                tracing::warn!("Bookmark id {} cannot be used as a file name", new_id);
                continue;
            };
            let doc = derive_bookmark(
                bookmark,
                &new_id,
                self.run.source.id(),
                self.page.id(),
                self.page.display_name(),
            );
            store.put_json(path, &doc)?;
            tracing::debug!("Upserted bookmark {}", new_id);
            self.upserted.insert(new_id.clone());
            summary.upserted.push(new_id);
        }
        Ok(())
    }

    fn rewrite_links(&self, store: &mut DocumentStore, summary: &mut BookmarkSummary) -> SyncResult<()> {
        // visual id -> (current document, whether any link changed)
        let mut edited: IndexMap<&str, (Value, bool)> = IndexMap::new();

        for (visual_id, index, source_id) in &self.run.links {
            let new_id = derived_id(source_id, self.page.id());
            if !self.upserted.contains(&new_id) {
                tracing::debug!("Link {} of {} left alone: {} was not written", index, visual_id, new_id);
                continue;
            }
            if !edited.contains_key(visual_id.as_str()) {
                let path = self.run.layout.visual_doc(self.page.folder(), visual_id)?;
                let Some(doc) = store.get_json(&path) else {
                    tracing::debug!("No visual {} on {}", visual_id, self.page.id());
                    continue;
                };
                edited.insert(visual_id.as_str(), (doc, false));
            }
            let Some((doc, changed)) = edited.get_mut(visual_id.as_str()) else {
                continue;
            };
            let literal = quote_literal(&new_id);
            if set_bookmark_link(doc, *index, &literal) {
                *changed = true;
                summary.links_rewritten += 1;
            } else {
                tracing::debug!("Visual {} on {} has no link {}", visual_id, self.page.id(), index);
            }
        }

        for (visual_id, (doc, changed)) in edited {
            if changed {
                store.put_json(self.run.layout.visual_doc(self.page.folder(), visual_id)?, &doc)?;
            }
        }
        Ok(())
    }
}

/// `{source_id}_{page_id}`
#[inline]
#[must_use]
pub fn derived_id(source_id: &str, page_id: &str) -> String {
    format!("{source_id}_{page_id}")
}

fn expected_ids<'s>(sources: impl Iterator<Item = &'s String>, page_id: &str) -> IndexSet<String> {
    sources.map(|id| derived_id(id, page_id)).collect()
}

/// Build the derived copy of a source bookmark for one target page
fn derive_bookmark(
    source: &Bookmark,
    new_id: &str,
    source_page_id: &str,
    page_id: &str,
    page_display_name: &str,
) -> Value {
    let mut doc = source.doc().clone();
    let source_display = source.display_name().unwrap_or_else(|| source.name());

    if let Some(root) = doc.as_object_mut() {
        root.insert("name".to_string(), Value::String(new_id.to_string()));
        root.insert(
            "displayName".to_string(),
            Value::String(format!("{page_display_name}_{source_display}")),
        );

        let state = root
            .entry("explorationState")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(state) = state.as_object_mut() {
            state.insert("activeSection".to_string(), Value::String(page_id.to_string()));
            if let Some(sections) = state.get_mut("sections").and_then(Value::as_object_mut) {
                move_key(sections, source_page_id, page_id);
            }
        }
    }
    doc
}

/// Rename `from` to `to`, keeping the other entries in place
///
/// An existing `to` entry keeps its position and takes the moved value.
fn move_key(map: &mut Map<String, Value>, from: &str, to: &str) {
    if from == to || !map.contains_key(from) {
        return;
    }
    let mut moved = None;
    let rest: Vec<(String, Value)> = std::mem::take(map)
        .into_iter()
        .filter_map(|(k, v)| {
            if k == from {
                moved = Some(v);
                None
            } else {
                Some((k, v))
            }
        })
        .collect();
    map.extend(rest);
    if let Some(value) = moved {
        map.insert(to.to_string(), value);
    }
}

/// Synchronize bookmarks on an already-loaded store
///
/// Stages every change in `store`; nothing is written to disk.
///
/// # Errors
/// Returns validation errors before anything is staged
pub fn apply_bookmark_sync(
    store: &mut DocumentStore,
    request: &SyncRequest,
    _options: &SyncOptions,
) -> SyncResult<BookmarkSummary> {
    let layout = ProjectLayout::new(&request.report).map_err(ValidationError::from)?;
    let catalog = Catalog::build(store, &layout);

    let source = source_page(&catalog, request)?;
    let targets = target_pages(&catalog, source, request)?;

    let mut collected: IndexMap<String, &Bookmark> = IndexMap::new();
    for bookmark in catalog.bookmarks_on(source.id()) {
        if request.filter.matches_exact(bookmark.name()) {
            collected.entry(bookmark.name().to_string()).or_insert(bookmark);
        }
    }
    if collected.is_empty() && !request.filter.is_all() {
        tracing::warn!(
            "No bookmark on {} matches {:?}; only orphan cleanup will run",
            source.id(),
            request.filter.names()
        );
    }

    let mut protected: IndexSet<String> = collected.keys().cloned().collect();
    for page in &targets {
        protected.extend(expected_ids(collected.keys(), page.id()));
    }

    let links: Vec<(String, usize, String)> = source
        .visuals()
        .flat_map(|visual| {
            visual
                .bookmark_links()
                .into_iter()
                .enumerate()
                .filter_map(|(index, link)| link.map(|bookmark| (visual.id().to_string(), index, bookmark)))
                .collect::<Vec<_>>()
        })
        .filter(|(_, _, bookmark)| collected.contains_key(bookmark))
        .collect();

    let bookmarks_dir = layout.bookmarks_dir();
    let existing: Vec<(String, DocPath)> = store
        .paths_with_prefix(bookmarks_dir)
        .into_iter()
        .filter(|path| path.len() == bookmarks_dir.len() + 1)
        .filter_map(|path| {
            let file_id = bookmark_file_id(&path)?.to_string();
            Some((file_id, path))
        })
        .collect();

    let run = RunContext {
        layout: &layout,
        source,
        collected,
        protected,
        existing,
        links,
    };

    tracing::info!(
        "Syncing {} bookmark(s) from {} to {} page(s)",
        run.collected.len(),
        source.id(),
        targets.len()
    );

    let mut summary = BookmarkSummary {
        source_bookmarks: run.collected.keys().cloned().collect(),
        ..BookmarkSummary::default()
    };
    for page in targets {
        PageSync::new(&run, page).run(store, &mut summary)?;
        summary.pages.push(page.id().to_string());
    }
    Ok(summary)
}

/// Load, synchronize, and flush (unless dry run)
///
/// # Errors
/// Returns validation errors before any write, or the first IO error
pub fn duplicate_bookmarks(
    project_dir: &Path,
    request: &SyncRequest,
    options: &SyncOptions,
) -> SyncResult<BookmarkSummary> {
    let layout = ProjectLayout::new(&request.report).map_err(ValidationError::from)?;
    let mut store = DocumentStore::load_subtree(project_dir, layout.definition())?
        .with_flush_mode(options.flush_mode);

    let summary = apply_bookmark_sync(&mut store, request, options)?;

    if options.dry_run {
        tracing::info!(
            "Dry run: {} upsert(s) and {} deletion(s) not written",
            summary.upserted.len(),
            summary.deleted.len()
        );
        store.discard();
    } else {
        store.flush()?;
    }
    Ok(summary)
}
