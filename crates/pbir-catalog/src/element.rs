//! Pages, visuals, groups and bookmarks
//!
//! Each element keeps its decoded document verbatim; accessors read the
//! handful of fields layout sync cares about and ignore everything else.

use indexmap::IndexMap;
use pbir_store::{str_at, unquote_literal, DocPath};
use serde_json::Value;

const TITLE_POINTER: &str = "/visualContainerObjects/title/0/properties/text/expr/Literal/Value";
const LINK_VALUE_POINTER: &str = "/properties/bookmark/expr/Literal/Value";

/// Human-readable title of a visual document
///
/// Looks under `visual` first, then at the top level. Surrounding quotes and
/// whitespace are stripped.
#[must_use]
pub fn title_of(doc: &Value) -> Option<&str> {
    doc.get("visual")
        .and_then(|v| str_at(v, TITLE_POINTER))
        .or_else(|| str_at(doc, TITLE_POINTER))
        .map(|raw| unquote_literal(raw.trim()).trim())
        .filter(|title| !title.is_empty())
}

/// Display name of a visual: title, else `name`, else `id`
#[must_use]
pub fn visual_display_name(doc: &Value, id: &str) -> String {
    title_of(doc)
        .or_else(|| {
            doc.get("name")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|n| !n.is_empty())
        })
        .unwrap_or(id)
        .to_string()
}

/// Stacking coordinate `position.z` (absent reads as 0)
#[inline]
#[must_use]
pub fn z_of(doc: &Value) -> f64 {
    doc.pointer("/position/z")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

/// Owning group id (`parentGroupName`)
#[inline]
#[must_use]
pub fn parent_group_of(doc: &Value) -> Option<&str> {
    doc.get("parentGroupName").and_then(Value::as_str)
}

/// Bookmark id referenced by each `visualLink` entry, by index
///
/// Entries that carry no bookmark literal come back as `None` so indices stay
/// aligned with the document.
#[must_use]
pub fn bookmark_links_of(doc: &Value) -> Vec<Option<String>> {
    doc.pointer("/visual/visualContainerObjects/visualLink")
        .and_then(Value::as_array)
        .map(|links| {
            links
                .iter()
                .map(|link| str_at(link, LINK_VALUE_POINTER).map(|v| unquote_literal(v).to_string()))
                .collect()
        })
        .unwrap_or_default()
}

/// Overwrite the bookmark literal of link `index`
///
/// Returns `false` without touching the document if the slot does not exist.
pub fn set_bookmark_link(doc: &mut Value, index: usize, literal: &str) -> bool {
    let pointer = format!("/visual/visualContainerObjects/visualLink/{index}{LINK_VALUE_POINTER}");
    match doc.pointer_mut(&pointer) {
        Some(slot) => {
            *slot = Value::String(literal.to_string());
            true
        }
        None => false,
    }
}

/// String array field, skipping non-string entries
#[must_use]
pub fn string_list(doc: &Value, key: &str) -> Option<Vec<String>> {
    doc.get(key).and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}

/// A visual on one page
#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    id: String,
    path: DocPath,
    doc: Value,
}

impl Visual {
    pub(crate) fn new(id: String, path: DocPath, doc: Value) -> Self {
        Self { id, path, doc }
    }

    /// Visual id (its folder name)
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Document path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &DocPath {
        &self.path
    }

    /// Decoded document
    #[inline]
    #[must_use]
    pub fn doc(&self) -> &Value {
        &self.doc
    }

    /// Title, `name`, or id
    #[must_use]
    pub fn display_name(&self) -> String {
        visual_display_name(&self.doc, &self.id)
    }

    /// Stacking coordinate
    #[inline]
    #[must_use]
    pub fn z(&self) -> f64 {
        z_of(&self.doc)
    }

    /// Owning group id
    #[inline]
    #[must_use]
    pub fn parent_group(&self) -> Option<&str> {
        parent_group_of(&self.doc)
    }

    /// Bookmark links by index
    #[must_use]
    pub fn bookmark_links(&self) -> Vec<Option<String>> {
        bookmark_links_of(&self.doc)
    }
}

/// A group container on one page
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    id: String,
    path: DocPath,
    doc: Value,
}

impl Group {
    pub(crate) fn new(id: String, path: DocPath, doc: Value) -> Self {
        Self { id, path, doc }
    }

    /// Group id (its folder name)
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Document path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &DocPath {
        &self.path
    }

    /// Decoded document
    #[inline]
    #[must_use]
    pub fn doc(&self) -> &Value {
        &self.doc
    }

    /// Ordered member visual ids
    #[must_use]
    pub fn members(&self) -> Vec<String> {
        string_list(&self.doc, "visuals").unwrap_or_default()
    }
}

/// A report page with its visuals and groups in path order
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    folder: String,
    id: String,
    path: DocPath,
    doc: Value,
    pub(crate) visuals: IndexMap<String, Visual>,
    pub(crate) groups: IndexMap<String, Group>,
}

impl Page {
    pub(crate) fn new(folder: String, path: DocPath, doc: Value) -> Self {
        let id = doc
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .unwrap_or(&folder)
            .to_string();
        Self {
            folder,
            id,
            path,
            doc,
            visuals: IndexMap::new(),
            groups: IndexMap::new(),
        }
    }

    /// Folder name under `definition/pages`
    #[inline]
    #[must_use]
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Page id (`name` field, else folder)
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// `displayName`, else page id
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.doc
            .get("displayName")
            .and_then(Value::as_str)
            .unwrap_or(&self.id)
    }

    /// Path of `page.json`
    #[inline]
    #[must_use]
    pub fn path(&self) -> &DocPath {
        &self.path
    }

    /// Decoded `page.json`
    #[inline]
    #[must_use]
    pub fn doc(&self) -> &Value {
        &self.doc
    }

    /// Check whether `key` names this page by folder or by id
    #[inline]
    #[must_use]
    pub fn is_named(&self, key: &str) -> bool {
        self.folder == key || self.id == key
    }

    /// Ordered group container ids (`visualContainers`)
    #[must_use]
    pub fn containers(&self) -> Vec<String> {
        string_list(&self.doc, "visualContainers").unwrap_or_default()
    }

    /// Visuals in path order
    #[inline]
    pub fn visuals(&self) -> impl Iterator<Item = &Visual> {
        self.visuals.values()
    }

    /// Visual by id
    #[inline]
    #[must_use]
    pub fn visual(&self, id: &str) -> Option<&Visual> {
        self.visuals.get(id)
    }

    /// Groups in path order
    #[inline]
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// Group by id
    #[inline]
    #[must_use]
    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.get(id)
    }

    /// Highest stacking coordinate on the page (0 when it has no visuals)
    #[must_use]
    pub fn max_z(&self) -> f64 {
        self.visuals.values().map(Visual::z).reduce(f64::max).unwrap_or(0.0)
    }
}

/// A bookmark document
#[derive(Debug, Clone, PartialEq)]
pub struct Bookmark {
    file_id: String,
    path: DocPath,
    doc: Value,
}

impl Bookmark {
    pub(crate) fn new(file_id: String, path: DocPath, doc: Value) -> Self {
        Self { file_id, path, doc }
    }

    /// File name without `.bookmark.json`
    #[inline]
    #[must_use]
    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    /// Bookmark id (`name` field, else file id)
    #[must_use]
    pub fn name(&self) -> &str {
        self.doc
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(&self.file_id)
    }

    /// `displayName`, if any
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.doc.get("displayName").and_then(Value::as_str)
    }

    /// Page id the bookmark belongs to
    #[inline]
    #[must_use]
    pub fn active_section(&self) -> Option<&str> {
        str_at(&self.doc, "/explorationState/activeSection")
    }

    /// Document path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &DocPath {
        &self.path
    }

    /// Decoded document
    #[inline]
    #[must_use]
    pub fn doc(&self) -> &Value {
        &self.doc
    }
}
