//! Empty project stamping
//!
//! The template tree is compiled into the binary. Every document path and
//! every UTF-8 body has [`PLACEHOLDER`] replaced by the project name before it
//! is staged; anything else is copied byte for byte.

use std::path::Path;

use pbir_store::{DocPath, DocumentStore};

use crate::error::{TemplateError, TemplateResult};

/// Token standing for the project name in template paths and contents
pub const PLACEHOLDER: &str = "__PROJECT__";

/// `(destination, embedded content)`
///
/// Dotfiles are stored under plain names in the template directory.
const TEMPLATE: &[(&str, &[u8])] = &[
    (".gitignore", include_bytes!("../template/gitignore")),
    (
        "__PROJECT__.pbip",
        include_bytes!("../template/__PROJECT__.pbip"),
    ),
    (
        "__PROJECT__.Report/.platform",
        include_bytes!("../template/__PROJECT__.Report/platform.json"),
    ),
    (
        "__PROJECT__.Report/definition.pbir",
        include_bytes!("../template/__PROJECT__.Report/definition.pbir"),
    ),
    (
        "__PROJECT__.Report/definition/report.json",
        include_bytes!("../template/__PROJECT__.Report/definition/report.json"),
    ),
    (
        "__PROJECT__.Report/definition/version.json",
        include_bytes!("../template/__PROJECT__.Report/definition/version.json"),
    ),
    (
        "__PROJECT__.Report/definition/pages/pages.json",
        include_bytes!("../template/__PROJECT__.Report/definition/pages/pages.json"),
    ),
    (
        "__PROJECT__.Report/definition/pages/42ce56b32d11a4101cb7/page.json",
        include_bytes!(
            "../template/__PROJECT__.Report/definition/pages/42ce56b32d11a4101cb7/page.json"
        ),
    ),
    (
        "__PROJECT__.SemanticModel/.platform",
        include_bytes!("../template/__PROJECT__.SemanticModel/platform.json"),
    ),
    (
        "__PROJECT__.SemanticModel/.pbi/editorSettings.json",
        include_bytes!("../template/__PROJECT__.SemanticModel/.pbi/editorSettings.json"),
    ),
    (
        "__PROJECT__.SemanticModel/definition/database.tmdl",
        include_bytes!("../template/__PROJECT__.SemanticModel/definition/database.tmdl"),
    ),
    (
        "__PROJECT__.SemanticModel/definition/model.tmdl",
        include_bytes!("../template/__PROJECT__.SemanticModel/definition/model.tmdl"),
    ),
    (
        "__PROJECT__.SemanticModel/definition/cultures/fr-FR.tmdl",
        include_bytes!("../template/__PROJECT__.SemanticModel/definition/cultures/fr-FR.tmdl"),
    ),
];

/// Write an empty project named `project_name` under `output_dir`
///
/// Existing files at the same paths are replaced; nothing else in
/// `output_dir` is touched. Returns the written paths, relative to
/// `output_dir`, in path order.
///
/// # Errors
/// - [`TemplateError::InvalidProjectName`] before anything is written
/// - [`TemplateError::Store`] on the first failed write
pub fn create_empty_project(output_dir: &Path, project_name: &str) -> TemplateResult<Vec<DocPath>> {
    validate_name(project_name)?;

    let mut store = DocumentStore::new(output_dir);
    for (template_path, content) in TEMPLATE {
        let path: DocPath = template_path
            .replace(PLACEHOLDER, project_name)
            .parse()
            .map_err(|_| TemplateError::invalid_name(project_name, "not usable in a file name"))?;
        tracing::debug!("Staging {}", path);
        store.put(path, render(content, project_name));
    }

    let report = store.flush()?;
    tracing::info!(
        "Created project {} ({} files) in {}",
        project_name,
        report.written.len(),
        output_dir.display()
    );
    Ok(report.written)
}

/// Substitute the project name into UTF-8 content
#[must_use]
pub fn render(content: &[u8], project_name: &str) -> Vec<u8> {
    match std::str::from_utf8(content) {
        Ok(text) => text.replace(PLACEHOLDER, project_name).into_bytes(),
        Err(_) => content.to_vec(),
    }
}

fn validate_name(name: &str) -> TemplateResult<()> {
    if name.trim().is_empty() {
        return Err(TemplateError::invalid_name(name, "empty"));
    }
    if name.contains(['/', '\\']) {
        return Err(TemplateError::invalid_name(name, "contains a path separator"));
    }
    if name == "." || name == ".." {
        return Err(TemplateError::invalid_name(name, "reserved"));
    }
    if name.contains(PLACEHOLDER) {
        return Err(TemplateError::invalid_name(name, "contains the template token"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn render_replaces_every_occurrence() {
        let out = render(b"__PROJECT__/x __PROJECT__", "Sales");
        assert_eq!(out, b"Sales/x Sales".to_vec());
    }

    #[test]
    fn render_copies_non_utf8() {
        let bytes = [0xff, 0xfe, b'_', b'_', 0x00];
        assert_eq!(render(&bytes, "Sales"), bytes.to_vec());
    }

    #[test]
    fn names_are_validated() {
        assert!(validate_name("Test_Report-2026").is_ok());
        assert!(validate_name("Sales 2026").is_ok());
        for bad in ["", "   ", "a/b", "a\\b", "..", "x__PROJECT__"] {
            assert!(
                matches!(validate_name(bad), Err(TemplateError::InvalidProjectName { .. })),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn template_paths_parse() {
        for (path, _) in TEMPLATE {
            let parsed = path.replace(PLACEHOLDER, "Sales").parse::<DocPath>();
            assert!(parsed.is_ok(), "{path}");
        }
    }
}
