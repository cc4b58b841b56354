//! Where documents live inside a report tree

use pbir_store::{DocPath, PathError};

/// File name of a page document
pub const PAGE_FILE: &str = "page.json";
/// File name of a visual document
pub const VISUAL_FILE: &str = "visual.json";
/// File name of a group document
pub const GROUP_FILE: &str = "group.json";
/// Suffix of a bookmark document file name
pub const BOOKMARK_SUFFIX: &str = ".bookmark.json";

/// Path builder for one report root (e.g. `Sales.Report`)
///
/// ```text
/// {report}/definition/pages/{page}/page.json
/// {report}/definition/pages/{page}/visuals/{visual}/visual.json
/// {report}/definition/pages/{page}/visuals/{group}/group.json
/// {report}/definition/bookmarks/{bookmark}.bookmark.json
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    definition: DocPath,
    pages: DocPath,
    bookmarks: DocPath,
}

impl ProjectLayout {
    /// Create layout for a report root name
    ///
    /// # Errors
    /// Returns error if the name is not a single path segment
    pub fn new(report: &str) -> Result<Self, PathError> {
        let definition = DocPath::root().join([report, "definition"])?;
        Ok(Self {
            pages: definition.child("pages")?,
            bookmarks: definition.child("bookmarks")?,
            definition,
        })
    }

    /// Report root name
    #[inline]
    #[must_use]
    pub fn report(&self) -> &str {
        self.definition.segments().first().map_or("", String::as_str)
    }

    /// `{report}/definition`
    #[inline]
    #[must_use]
    pub fn definition(&self) -> &DocPath {
        &self.definition
    }

    /// `{report}/definition/pages`
    #[inline]
    #[must_use]
    pub fn pages_dir(&self) -> &DocPath {
        &self.pages
    }

    /// `{report}/definition/bookmarks`
    #[inline]
    #[must_use]
    pub fn bookmarks_dir(&self) -> &DocPath {
        &self.bookmarks
    }

    /// `{report}/definition/pages/{page}/page.json`
    ///
    /// # Errors
    /// Returns error if `page` is not a valid segment
    pub fn page_doc(&self, page: &str) -> Result<DocPath, PathError> {
        self.pages_dir().join([page, PAGE_FILE])
    }

    /// `{report}/definition/pages/{page}/visuals`
    ///
    /// # Errors
    /// Returns error if `page` is not a valid segment
    pub fn visuals_dir(&self, page: &str) -> Result<DocPath, PathError> {
        self.pages_dir().join([page, "visuals"])
    }

    /// `{report}/definition/pages/{page}/visuals/{visual}/visual.json`
    ///
    /// # Errors
    /// Returns error if either name is not a valid segment
    pub fn visual_doc(&self, page: &str, visual: &str) -> Result<DocPath, PathError> {
        self.visuals_dir(page)?.join([visual, VISUAL_FILE])
    }

    /// `{report}/definition/pages/{page}/visuals/{group}/group.json`
    ///
    /// # Errors
    /// Returns error if either name is not a valid segment
    pub fn group_doc(&self, page: &str, group: &str) -> Result<DocPath, PathError> {
        self.visuals_dir(page)?.join([group, GROUP_FILE])
    }

    /// `{report}/definition/bookmarks/{bookmark}.bookmark.json`
    ///
    /// # Errors
    /// Returns error if the resulting file name is not a valid segment
    pub fn bookmark_doc(&self, bookmark: &str) -> Result<DocPath, PathError> {
        self.bookmarks_dir().child(format!("{bookmark}{BOOKMARK_SUFFIX}"))
    }
}

/// Bookmark file id: file name without `.bookmark.json`
#[must_use]
pub fn bookmark_file_id(path: &DocPath) -> Option<&str> {
    path.file_name()?
        .strip_suffix(BOOKMARK_SUFFIX)
        .filter(|id| !id.is_empty())
}
