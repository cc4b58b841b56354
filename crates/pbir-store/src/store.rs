//! Staged document store
//!
//! [`DocumentStore`] is the only component that touches the project
//! directory. Reads come from a snapshot taken at load time; every mutation is
//! staged in memory and reaches the disk in a single [`DocumentStore::flush`].
//!
//! ```text
//! disk ──load──► base snapshot ─┐
//!                               ├─► merged view (get / paths_with_prefix)
//!        put / delete ► staged ─┘
//!                         │
//!                         └──flush──► disk
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::json::{decode_object, encode_json};
use crate::path::DocPath;

/// How staged documents are written at flush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// Write to a temp file in the target directory, then rename over the target
    #[default]
    Atomic,
    /// Truncate and write the target in place
    Direct,
}

/// What a flush did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Documents written (created or replaced)
    pub written: Vec<DocPath>,
    /// Documents removed from disk
    pub removed: Vec<DocPath>,
}

/// In-memory view of a project tree with staged writes and deletions
#[derive(Debug, Clone)]
pub struct DocumentStore {
    /// Filesystem root every [`DocPath`] is relative to
    root: PathBuf,
    /// Snapshot of documents as loaded (or as of the last flush)
    base: BTreeMap<DocPath, Vec<u8>>,
    /// Pending writes
    staged: BTreeMap<DocPath, Vec<u8>>,
    /// Pending deletions (only paths present in `base`)
    removed: BTreeSet<DocPath>,
    /// Write strategy for flush
    mode: FlushMode,
}

impl DocumentStore {
    /// Create an empty store rooted at `root` without reading anything
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base: BTreeMap::new(),
            staged: BTreeMap::new(),
            removed: BTreeSet::new(),
            mode: FlushMode::default(),
        }
    }

    /// Load every file under `root`
    ///
    /// # Errors
    /// Returns error if the directory cannot be walked or a file cannot be read
    pub fn load(root: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::load_subtree(root, &DocPath::root())
    }

    /// Load every file under `root/prefix`
    ///
    /// A missing subtree yields an empty store rather than an error; callers
    /// decide whether the absence is fatal.
    ///
    /// # Errors
    /// Returns error if the directory cannot be walked or a file cannot be read
    pub fn load_subtree(root: impl Into<PathBuf>, prefix: &DocPath) -> StoreResult<Self> {
        let mut store = Self::new(root);
        let start = prefix.to_fs(&store.root);
        if !start.exists() {
            tracing::warn!("nothing to load: {} does not exist", start.display());
            return Ok(store);
        }

        for entry in WalkDir::new(&start).follow_links(false) {
            let entry = entry.map_err(|source| StoreError::Walk {
                root: start.clone(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let full = entry.path();
            let key = DocPath::from_fs(&store.root, full)?;
            let bytes = fs::read(full).map_err(|e| StoreError::io_error(full, e))?;
            store.base.insert(key, bytes);
        }

        tracing::debug!(
            "loaded {} documents from {}",
            store.base.len(),
            start.display()
        );
        Ok(store)
    }

    /// Set flush strategy
    #[inline]
    #[must_use]
    pub fn with_flush_mode(mut self, mode: FlushMode) -> Self {
        self.mode = mode;
        self
    }

    /// Filesystem root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current bytes of a document (staged writes win, deletions hide)
    #[must_use]
    pub fn get(&self, path: &DocPath) -> Option<&[u8]> {
        if let Some(bytes) = self.staged.get(path) {
            return Some(bytes);
        }
        if self.removed.contains(path) {
            return None;
        }
        self.base.get(path).map(Vec::as_slice)
    }

    /// Current document decoded as a JSON object
    ///
    /// Missing and malformed documents both come back as `None`.
    #[inline]
    #[must_use]
    pub fn get_json(&self, path: &DocPath) -> Option<Value> {
        decode_object(self.get(path))
    }

    /// Check whether a document is visible
    #[inline]
    #[must_use]
    pub fn contains(&self, path: &DocPath) -> bool {
        self.get(path).is_some()
    }

    /// Stage a document write
    ///
    /// Writing bytes identical to the loaded snapshot un-stages the path.
    pub fn put(&mut self, path: DocPath, bytes: Vec<u8>) {
        self.removed.remove(&path);
        if self.base.get(&path) == Some(&bytes) {
            self.staged.remove(&path);
        } else {
            self.staged.insert(path, bytes);
        }
    }

    /// Stage a JSON document write
    ///
    /// # Errors
    /// Returns error if the value cannot be encoded
    pub fn put_json(&mut self, path: DocPath, value: &Value) -> StoreResult<()> {
        let bytes = encode_json(value)?;
        self.put(path, bytes);
        Ok(())
    }

    /// Stage a deletion
    ///
    /// Returns `true` if the document was visible before the call.
    pub fn delete(&mut self, path: &DocPath) -> bool {
        let was_visible = self.contains(path);
        self.staged.remove(path);
        if self.base.contains_key(path) {
            self.removed.insert(path.clone());
        }
        was_visible
    }

    /// Every visible path under `prefix`, in path order
    #[must_use]
    pub fn paths_with_prefix(&self, prefix: &DocPath) -> Vec<DocPath> {
        let from_base = self
            .base
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k)
            .filter(|k| !self.removed.contains(*k));
        let from_staged = self
            .staged
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k);

        from_base
            .chain(from_staged)
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of visible documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths_with_prefix(&DocPath::root()).len()
    }

    /// Check if no documents are visible
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check for pending writes or deletions
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.staged.is_empty() || !self.removed.is_empty()
    }

    /// Paths with a pending write
    pub fn pending_writes(&self) -> impl Iterator<Item = &DocPath> {
        self.staged.keys()
    }

    /// Paths with a pending deletion
    pub fn pending_deletions(&self) -> impl Iterator<Item = &DocPath> {
        self.removed.iter()
    }

    /// Discard every staged change
    pub fn discard(&mut self) {
        self.staged.clear();
        self.removed.clear();
    }

    /// Persist staged writes, then staged deletions
    ///
    /// Missing parent directories are created. A deletion whose file is
    /// already gone is not an error. On success the staged changes become the
    /// new snapshot.
    ///
    /// # Errors
    /// Returns the first IO error; documents flushed before it stay on disk
    pub fn flush(&mut self) -> StoreResult<FlushReport> {
        let mut report = FlushReport::default();

        for (path, bytes) in &self.staged {
            let target = path.to_fs(&self.root);
            write_document(&target, bytes, self.mode)?;
            report.written.push(path.clone());
        }

        for path in &self.removed {
            let target = path.to_fs(&self.root);
            match fs::remove_file(&target) {
                Ok(()) => report.removed.push(path.clone()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    tracing::debug!("{} already removed", target.display());
                }
                Err(e) => return Err(StoreError::io_error(target, e)),
            }
        }

        for path in std::mem::take(&mut self.removed) {
            self.base.remove(&path);
        }
        self.base.append(&mut self.staged);

        tracing::info!(
            "flushed {} written, {} removed under {}",
            report.written.len(),
            report.removed.len(),
            self.root.display()
        );
        Ok(report)
    }
}

fn write_document(target: &Path, bytes: &[u8], mode: FlushMode) -> StoreResult<()> {
    let parent = target
        .parent()
        .ok_or_else(|| StoreError::io_error(target, io::ErrorKind::InvalidInput.into()))?;
    fs::create_dir_all(parent).map_err(|e| StoreError::io_error(parent, e))?;

    match mode {
        FlushMode::Direct => fs::write(target, bytes).map_err(|e| StoreError::io_error(target, e)),
        FlushMode::Atomic => {
            let mut tmp = tempfile::NamedTempFile::new_in(parent)
                .map_err(|e| StoreError::io_error(parent, e))?;
            tmp.write_all(bytes)
                .and_then(|()| tmp.as_file().sync_all())
                .map_err(|e| StoreError::io_error(tmp.path(), e))?;
            tmp.persist(target)
                .map_err(|e| StoreError::io_error(target, e.error))?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(s: &str) -> DocPath {
        s.parse().unwrap()
    }

    fn seeded() -> (tempfile::TempDir, DocumentStore) {
        let dir = tempfile::tempdir().unwrap();
        let pages = dir.path().join("R/definition/pages/main");
        fs::create_dir_all(&pages).unwrap();
        fs::write(pages.join("page.json"), br#"{"name": "main"}"#).unwrap();
        fs::create_dir_all(dir.path().join("R/definition/bookmarks")).unwrap();
        fs::write(
            dir.path().join("R/definition/bookmarks/b.bookmark.json"),
            br#"{"name": "b"}"#,
        )
        .unwrap();
        fs::write(dir.path().join("R/readme.txt"), b"hello").unwrap();
        let store = DocumentStore::load(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn load_reads_every_file() {
        let (_dir, store) = seeded();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(&p("R/readme.txt")), Some(&b"hello"[..]));
        assert_eq!(store.get_json(&p("R/definition/pages/main/page.json")).unwrap()["name"], "main");
    }

    #[test]
    fn load_subtree_limits_scope() {
        let (dir, _) = seeded();
        let store = DocumentStore::load_subtree(dir.path(), &p("R/definition")).unwrap();
        assert_eq!(store.len(), 2);
        assert!(!store.contains(&p("R/readme.txt")));
    }

    #[test]
    fn load_missing_subtree_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::load_subtree(dir.path(), &p("nope")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn staged_writes_are_visible_but_not_persisted() {
        let (dir, mut store) = seeded();
        let path = p("R/definition/pages/p2/page.json");
        store.put_json(path.clone(), &json!({"name": "p2"})).unwrap();

        assert!(store.contains(&path));
        assert!(store.is_dirty());
        assert!(!path.to_fs(dir.path()).exists());
    }

    #[test]
    fn delete_hides_then_put_resurrects() {
        let (_dir, mut store) = seeded();
        let path = p("R/definition/bookmarks/b.bookmark.json");

        assert!(store.delete(&path));
        assert!(!store.contains(&path));
        assert!(!store.delete(&path));

        store.put(path.clone(), b"{}".to_vec());
        assert!(store.contains(&path));
        assert_eq!(store.pending_deletions().count(), 0);
    }

    #[test]
    fn unchanged_put_is_not_staged() {
        let (_dir, mut store) = seeded();
        store.put(p("R/readme.txt"), b"hello".to_vec());
        assert!(!store.is_dirty());
    }

    #[test]
    fn paths_with_prefix_merges_views() {
        let (_dir, mut store) = seeded();
        store.put(p("R/definition/bookmarks/a.bookmark.json"), b"{}".to_vec());
        store.delete(&p("R/definition/bookmarks/b.bookmark.json"));

        let paths = store.paths_with_prefix(&p("R/definition/bookmarks"));
        assert_eq!(paths, vec![p("R/definition/bookmarks/a.bookmark.json")]);
    }

    #[test]
    fn flush_writes_creates_dirs_and_deletes() {
        let (dir, mut store) = seeded();
        let new_visual = p("R/definition/pages/p2/visuals/v1/visual.json");
        store.put_json(new_visual.clone(), &json!({"name": "v1"})).unwrap();
        store.delete(&p("R/definition/bookmarks/b.bookmark.json"));

        let report = store.flush().unwrap();

        assert_eq!(report.written, vec![new_visual.clone()]);
        assert_eq!(report.removed, vec![p("R/definition/bookmarks/b.bookmark.json")]);
        assert!(new_visual.to_fs(dir.path()).is_file());
        assert!(!dir.path().join("R/definition/bookmarks/b.bookmark.json").exists());
        assert!(!store.is_dirty());
        assert!(store.contains(&new_visual));
    }

    #[test]
    fn flush_direct_mode_overwrites() {
        let (dir, store) = seeded();
        let mut store = store.with_flush_mode(FlushMode::Direct);
        store.put(p("R/readme.txt"), b"bye".to_vec());
        store.flush().unwrap();
        assert_eq!(fs::read(dir.path().join("R/readme.txt")).unwrap(), b"bye");
    }

    #[test]
    fn flush_tolerates_already_deleted_files() {
        let (dir, mut store) = seeded();
        store.delete(&p("R/readme.txt"));
        fs::remove_file(dir.path().join("R/readme.txt")).unwrap();
        let report = store.flush().unwrap();
        assert!(report.removed.is_empty());
    }

    #[test]
    fn discard_drops_pending_changes() {
        let (_dir, mut store) = seeded();
        store.delete(&p("R/readme.txt"));
        store.put(p("R/other.txt"), b"x".to_vec());
        store.discard();
        assert!(!store.is_dirty());
        assert!(store.contains(&p("R/readme.txt")));
        assert!(!store.contains(&p("R/other.txt")));
    }
}
