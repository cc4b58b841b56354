//! PBIR Project Template
//!
//! Stamps a new, empty Power BI project (`.pbip` plus its report and
//! semantic model folders) with one blank page.
//!
//! # Example
//!
//! ```rust,ignore
//! use pbir_template::create_empty_project;
//!
//! let written = create_empty_project(Path::new("./out"), "Sales")?;
//! // out/Sales.pbip, out/Sales.Report/..., out/Sales.SemanticModel/...
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod project;

// Re-exports
pub use error::{TemplateError, TemplateResult};
pub use project::{create_empty_project, render, PLACEHOLDER};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
