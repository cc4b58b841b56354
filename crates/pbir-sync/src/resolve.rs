//! Source and target page resolution

use indexmap::IndexMap;
use pbir_catalog::{Catalog, Page};

use crate::config::SyncRequest;
use crate::error::ValidationError;

/// Source page of a request
///
/// # Errors
/// Returns [`ValidationError::SourcePageNotFound`] if no page matches
pub(crate) fn source_page<'a>(
    catalog: &'a Catalog,
    request: &SyncRequest,
) -> Result<&'a Page, ValidationError> {
    catalog
        .page(&request.source_page)
        .ok_or_else(|| ValidationError::SourcePageNotFound(request.source_page.clone()))
}

/// Target pages of a request, in request order (or path order for "all")
///
/// Duplicates collapse; naming the source page as a target is an error.
///
/// # Errors
/// Returns [`ValidationError::UnknownTargetPage`] for the first unmatched name
pub(crate) fn target_pages<'a>(
    catalog: &'a Catalog,
    source: &Page,
    request: &SyncRequest,
) -> Result<Vec<&'a Page>, ValidationError> {
    let Some(requested) = &request.target_pages else {
        return Ok(catalog.pages().filter(|p| p.id() != source.id()).collect());
    };

    let mut out: IndexMap<&str, &'a Page> = IndexMap::with_capacity(requested.len());
    for key in requested {
        match catalog.page(key) {
            Some(page) if page.id() != source.id() => {
                out.insert(page.folder(), page);
            }
            _ => return Err(ValidationError::UnknownTargetPage(key.clone())),
        }
    }
    Ok(out.into_values().collect())
}
