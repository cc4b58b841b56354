//! PBIR Document Store
//!
//! Path-keyed access to the JSON documents of a Power BI project tree.
//!
//! # Core Concepts
//!
//! - [`DocPath`]: Relative, `/`-separated document key
//! - [`DocumentStore`]: Snapshot of a tree with staged writes and deletions
//! - [`FlushMode`]: Atomic (temp file + rename) or direct writes
//! - [`decode_json`] / [`encode_json`]: Tolerant JSON codec
//!
//! # Example
//!
//! ```rust,ignore
//! use pbir_store::{DocPath, DocumentStore};
//!
//! let mut store = DocumentStore::load("./Sales")?;
//! let page: DocPath = "Sales.Report/definition/pages/main/page.json".parse()?;
//! if let Some(mut doc) = store.get_json(&page) {
//!     doc["displayName"] = "Main".into();
//!     store.put_json(page, &doc)?;
//! }
//! store.flush()?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod json;
mod path;
mod store;

// Re-exports
pub use error::{StoreError, StoreResult};
pub use json::{decode_json, decode_object, encode_json, quote_literal, str_at, unquote_literal};
pub use path::{DocPath, PathError};
pub use store::{DocumentStore, FlushMode, FlushReport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
