//! Testing utilities for the PBIR layout workspace
//!
//! Fluent builders for small report trees, materialized either as an
//! in-memory [`DocumentStore`] or as a real directory.

#![allow(missing_docs)]
#![allow(clippy::must_use_candidate, clippy::missing_panics_doc)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use pbir_catalog::ProjectLayout;
use pbir_store::{decode_json, encode_json, DocPath, DocumentStore};
use serde_json::{json, Map, Value};
use tempfile::TempDir;

/// Visual document builder
#[derive(Debug, Clone)]
pub struct VisualSpec {
    z: f64,
    position: bool,
    title: Option<String>,
    group: Option<String>,
    links: Vec<Option<String>>,
    text_runs: Option<Vec<String>>,
}

impl Default for VisualSpec {
    fn default() -> Self {
        Self {
            z: 0.0,
            position: true,
            title: None,
            group: None,
            links: Vec::new(),
            text_runs: None,
        }
    }
}

impl VisualSpec {
    pub fn z(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn without_position(mut self) -> Self {
        self.position = false;
        self
    }

    /// Append a `visualLink` entry pointing at `bookmark`
    pub fn link(mut self, bookmark: &str) -> Self {
        self.links.push(Some(bookmark.to_string()));
        self
    }

    /// Append a `visualLink` entry with no bookmark
    pub fn plain_link(mut self) -> Self {
        self.links.push(None);
        self
    }

    /// Text box paragraphs with the given runs
    pub fn text_runs(mut self, runs: &[&str]) -> Self {
        self.text_runs = Some(runs.iter().map(|r| (*r).to_string()).collect());
        self
    }

    pub fn to_json(&self, id: &str) -> Value {
        let mut doc = Map::new();
        doc.insert("name".into(), json!(id));
        if self.position {
            doc.insert(
                "position".into(),
                json!({"x": 0, "y": 0, "z": self.z, "width": 320, "height": 200}),
            );
        }
        if let Some(group) = &self.group {
            doc.insert("parentGroupName".into(), json!(group));
        }

        let mut visual = Map::new();
        visual.insert(
            "visualType".into(),
            json!(if self.text_runs.is_some() { "textbox" } else { "card" }),
        );
        if let Some(runs) = &self.text_runs {
            let runs: Vec<Value> = runs.iter().map(|r| json!({"value": r})).collect();
            visual.insert(
                "objects".into(),
                json!({"general": [{"properties": {"paragraphs": [{"textRuns": runs}]}}]}),
            );
        }

        let mut container = Map::new();
        if let Some(title) = &self.title {
            container.insert(
                "title".into(),
                json!([{"properties": {"text": {"expr": {"Literal": {"Value": format!("'{title}'")}}}}}]),
            );
        }
        if !self.links.is_empty() {
            let links: Vec<Value> = self
                .links
                .iter()
                .map(|link| match link {
                    Some(bookmark) => json!({"properties": {
                        "show": {"expr": {"Literal": {"Value": "true"}}},
                        "bookmark": {"expr": {"Literal": {"Value": format!("'{bookmark}'")}}}
                    }}),
                    None => json!({"properties": {"show": {"expr": {"Literal": {"Value": "false"}}}}}),
                })
                .collect();
            container.insert("visualLink".into(), Value::Array(links));
        }
        if !container.is_empty() {
            visual.insert("visualContainerObjects".into(), Value::Object(container));
        }
        doc.insert("visual".into(), Value::Object(visual));
        Value::Object(doc)
    }
}

/// Fluent builder for a report tree
///
/// Paths follow [`ProjectLayout`] for the given report name.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    layout: ProjectLayout,
    files: BTreeMap<DocPath, Vec<u8>>,
}

impl ProjectFixture {
    pub fn new(report: &str) -> Self {
        Self {
            layout: ProjectLayout::new(report).unwrap(),
            files: BTreeMap::new(),
        }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    fn put(mut self, path: DocPath, doc: &Value) -> Self {
        self.files.insert(path, encode_json(doc).unwrap());
        self
    }

    /// Page whose id and display name equal its folder
    pub fn page(self, folder: &str) -> Self {
        let path = self.layout.page_doc(folder).unwrap();
        self.put(path, &json!({"name": folder, "displayName": folder}))
    }

    /// Page whose id differs from its folder
    pub fn page_with_id(self, folder: &str, id: &str) -> Self {
        let path = self.layout.page_doc(folder).unwrap();
        self.put(path, &json!({"name": id, "displayName": id}))
    }

    pub fn page_with_display_name(self, folder: &str, display_name: &str) -> Self {
        let path = self.layout.page_doc(folder).unwrap();
        self.put(path, &json!({"name": folder, "displayName": display_name}))
    }

    /// Set a page's `visualContainers`; the page must already exist
    pub fn containers(self, folder: &str, ids: &[&str]) -> Self {
        let path = self.layout.page_doc(folder).unwrap();
        let mut doc = decode_json(self.files.get(&path).map(Vec::as_slice)).unwrap();
        doc["visualContainers"] = json!(ids);
        self.put(path, &doc)
    }

    pub fn visual(self, folder: &str, id: &str, build: impl FnOnce(VisualSpec) -> VisualSpec) -> Self {
        let doc = build(VisualSpec::default()).to_json(id);
        let path = self.layout.visual_doc(folder, id).unwrap();
        self.put(path, &doc)
    }

    pub fn group(self, folder: &str, id: &str, members: &[&str]) -> Self {
        let path = self.layout.group_doc(folder, id).unwrap();
        self.put(
            path,
            &json!({"name": id, "displayName": id, "visualGroup": {"displayName": id}, "visuals": members}),
        )
    }

    /// Bookmark `id` attached to `page_id`, with a `sections` entry for it
    pub fn bookmark(self, id: &str, page_id: &str) -> Self {
        let doc = json!({
            "name": id,
            "displayName": format!("Bookmark {id}"),
            "explorationState": {
                "version": "1.3",
                "activeSection": page_id,
                "sections": {page_id: {"visualContainers": {}}}
            }
        });
        self.raw_bookmark(id, doc)
    }

    pub fn raw_bookmark(self, file_id: &str, doc: Value) -> Self {
        let path = self.layout.bookmark_doc(file_id).unwrap();
        self.put(path, &doc)
    }

    /// Arbitrary bytes at a `/`-separated path relative to the project root
    pub fn raw(mut self, path: &str, bytes: &[u8]) -> Self {
        self.files.insert(path.parse().unwrap(), bytes.to_vec());
        self
    }

    /// In-memory store with every document as its loaded snapshot
    pub fn build_store(&self) -> DocumentStore {
        let dir = self.build_dir();
        DocumentStore::load(dir.path()).unwrap()
    }

    /// Write the tree into a fresh temporary directory
    pub fn build_dir(&self) -> ProjectDir {
        let dir = tempfile::tempdir().unwrap();
        for (path, bytes) in &self.files {
            let full = path.to_fs(dir.path());
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, bytes).unwrap();
        }
        ProjectDir { dir }
    }
}

/// A fixture materialized on disk; removed on drop
#[derive(Debug)]
pub struct ProjectDir {
    dir: TempDir,
}

impl ProjectDir {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn full(&self, relative: &str) -> PathBuf {
        relative
            .parse::<DocPath>()
            .unwrap()
            .to_fs(self.dir.path())
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.full(relative).is_file()
    }

    pub fn read_json(&self, relative: &str) -> Option<Value> {
        let bytes = fs::read(self.full(relative)).ok()?;
        decode_json(Some(&bytes))
    }

    /// Every file and its bytes, for before/after comparisons
    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        let store = DocumentStore::load(self.dir.path()).unwrap();
        store
            .paths_with_prefix(&DocPath::root())
            .into_iter()
            .map(|path| {
                let bytes = store.get(&path).unwrap().to_vec();
                (path.to_string(), bytes)
            })
            .collect()
    }
}
