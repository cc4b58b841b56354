//! Catalog of a report's pages and bookmarks
//!
//! Built once from a [`DocumentStore`] snapshot. Documents that are missing
//! or fail to decode are skipped with a warning; the catalog itself never
//! fails to build.

use indexmap::IndexMap;
use pbir_store::{decode_object, DocumentStore};

use crate::element::{Bookmark, Group, Page, Visual};
use crate::layout::{bookmark_file_id, ProjectLayout, GROUP_FILE, PAGE_FILE, VISUAL_FILE};

/// Ordered view over one report
#[derive(Debug, Clone)]
pub struct Catalog {
    layout: ProjectLayout,
    /// Keyed by page folder, in path order
    pages: IndexMap<String, Page>,
    /// Keyed by file id, in path order
    bookmarks: IndexMap<String, Bookmark>,
}

impl Catalog {
    /// Scan `store` for the report described by `layout`
    #[must_use]
    pub fn build(store: &DocumentStore, layout: &ProjectLayout) -> Self {
        let mut catalog = Self {
            layout: layout.clone(),
            pages: IndexMap::new(),
            bookmarks: IndexMap::new(),
        };
        catalog.scan_pages(store);
        catalog.scan_bookmarks(store);

        tracing::debug!(
            "catalog for {}: {} pages, {} bookmarks",
            layout.report(),
            catalog.pages.len(),
            catalog.bookmarks.len()
        );
        catalog
    }

    fn scan_pages(&mut self, store: &DocumentStore) {
        let pages_dir = self.layout.pages_dir().clone();
        let paths = store.paths_with_prefix(&pages_dir);

        // page.json first so visuals and groups always find their page
        for path in &paths {
            let Some([folder, file]) = path.strip_prefix(&pages_dir) else {
                continue;
            };
            if file != PAGE_FILE {
                continue;
            }
            match decode_object(store.get(path)) {
                Some(doc) => {
                    let page = Page::new(folder.clone(), path.clone(), doc);
                    self.pages.insert(folder.clone(), page);
                }
                None => tracing::warn!("skipping page {}: unreadable {}", folder, path),
            }
        }

        for path in &paths {
            let Some([folder, visuals, id, file]) = path.strip_prefix(&pages_dir) else {
                continue;
            };
            if visuals != "visuals" || (file != VISUAL_FILE && file != GROUP_FILE) {
                continue;
            }
            let Some(page) = self.pages.get_mut(folder) else {
                tracing::debug!("ignoring {} on page without page.json", path);
                continue;
            };
            let Some(doc) = decode_object(store.get(path)) else {
                tracing::warn!("skipping unreadable {}", path);
                continue;
            };
            if file == VISUAL_FILE {
                page.visuals
                    .insert(id.clone(), Visual::new(id.clone(), path.clone(), doc));
            } else {
                page.groups
                    .insert(id.clone(), Group::new(id.clone(), path.clone(), doc));
            }
        }
    }

    fn scan_bookmarks(&mut self, store: &DocumentStore) {
        let bookmarks_dir = self.layout.bookmarks_dir();
        for path in store.paths_with_prefix(bookmarks_dir) {
            if path.len() != bookmarks_dir.len() + 1 {
                continue;
            }
            let Some(file_id) = bookmark_file_id(&path).map(str::to_string) else {
                continue;
            };
            match decode_object(store.get(&path)) {
                Some(doc) => {
                    self.bookmarks
                        .insert(file_id.clone(), Bookmark::new(file_id, path, doc));
                }
                None => tracing::warn!("skipping unreadable bookmark {}", path),
            }
        }
    }

    /// Layout the catalog was built with
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Pages in path order
    #[inline]
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    /// Number of pages
    #[inline]
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page by folder, falling back to page id
    #[must_use]
    pub fn page(&self, key: &str) -> Option<&Page> {
        self.pages
            .get(key)
            .or_else(|| self.pages.values().find(|p| p.id() == key))
    }

    /// Bookmarks in path order
    #[inline]
    pub fn bookmarks(&self) -> impl Iterator<Item = &Bookmark> {
        self.bookmarks.values()
    }

    /// Bookmark by file id
    #[inline]
    #[must_use]
    pub fn bookmark(&self, file_id: &str) -> Option<&Bookmark> {
        self.bookmarks.get(file_id)
    }

    /// Bookmarks whose `activeSection` is `page_id`
    pub fn bookmarks_on<'a>(&'a self, page_id: &'a str) -> impl Iterator<Item = &'a Bookmark> {
        self.bookmarks
            .values()
            .filter(move |b| b.active_section() == Some(page_id))
    }
}
