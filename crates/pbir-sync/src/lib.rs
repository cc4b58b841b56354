//! PBIR Layout Sync
//!
//! Propagates a curated layout from one source page to other pages of a
//! Power BI project:
//! - Visuals and their groups are copied with target identity preserved
//! - Group and stacking order follow the source, above anything already there
//! - Bookmarks are mirrored per target page and stale copies are pruned
//!
//! Every operation validates its input, stages all changes in memory, and
//! writes them in one final flush.
//!
//! # Example
//!
//! ```rust,ignore
//! use pbir_sync::{duplicate_bookmarks, duplicate_visuals, SyncOptions, SyncRequest};
//!
//! let request = SyncRequest::new("Sales.Report").with_targets(["p2", "p3"]);
//! let options = SyncOptions::new().with_title_visual("PageTitle");
//!
//! let visuals = duplicate_visuals(project_dir, &request, &options)?;
//! println!("Copied {} visuals to {} pages", visuals.visuals.len(), visuals.pages.len());
//!
//! let bookmarks = duplicate_bookmarks(project_dir, &request, &options)?;
//! println!("{} upserted, {} deleted", bookmarks.upserted.len(), bookmarks.deleted.len());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod bookmarks;
pub mod config;
pub mod error;
mod resolve;
pub mod title;
pub mod visuals;

// Re-exports for convenience
pub use bookmarks::{apply_bookmark_sync, derived_id, duplicate_bookmarks, BookmarkSummary, SyncPhase};
pub use config::{JobConfig, SyncOptions, SyncRequest, DEFAULT_SOURCE_PAGE};
pub use error::{SyncError, SyncResult, ValidationError};
pub use pbir_catalog::NameFilter;
pub use pbir_store::FlushMode;
pub use title::stamp_page_title;
pub use visuals::{apply_visual_duplication, duplicate_visuals, VisualSummary};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running layout sync
    pub use crate::{
        duplicate_bookmarks, duplicate_visuals, FlushMode, NameFilter, SyncError, SyncOptions,
        SyncRequest,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
