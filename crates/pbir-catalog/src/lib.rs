//! PBIR Page & Element Catalog
//!
//! Typed, ordered views over the documents of one report.
//!
//! # Core Concepts
//!
//! - [`ProjectLayout`]: Where page, visual, group and bookmark documents live
//! - [`Catalog`]: Pages (with their visuals and groups) and bookmarks in path order
//! - [`NameFilter`]: `All | One | Many` selection of elements by name
//!
//! # Example
//!
//! ```rust,ignore
//! use pbir_catalog::{Catalog, NameFilter, ProjectLayout};
//!
//! let layout = ProjectLayout::new("Sales.Report")?;
//! let catalog = Catalog::build(&store, &layout);
//! let filter = NameFilter::from_names(["Revenue"]);
//! for visual in catalog.page("main").into_iter().flat_map(|p| p.visuals()) {
//!     if filter.matches_display(&visual.display_name()) {
//!         println!("{} at z={}", visual.id(), visual.z());
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod catalog;
mod element;
mod filter;
mod layout;

// Re-exports
pub use catalog::Catalog;
pub use element::{
    bookmark_links_of, parent_group_of, set_bookmark_link, string_list, title_of,
    visual_display_name, z_of, Bookmark, Group, Page, Visual,
};
pub use filter::{FilterShapeError, NameFilter};
pub use layout::{
    bookmark_file_id, ProjectLayout, BOOKMARK_SUFFIX, GROUP_FILE, PAGE_FILE, VISUAL_FILE,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
