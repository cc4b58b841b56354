//! Visual layout duplication
//!
//! Copies visuals (and the groups they belong to) from the source page onto
//! each target page.
//!
//! # Per target page
//! 1. Merge every group referenced by a copied visual
//! 2. Recompute the page's `visualContainers` order (written only when changed)
//! 3. Merge the visuals in source stacking order and assign their z
//! 4. Stamp the page-title visual, if configured

use std::path::Path;

use indexmap::IndexSet;
use pbir_catalog::{Catalog, Page, ProjectLayout};
use pbir_composition::{apply_z, group_order, merge_element, MergeKind, StackingPlan};
use pbir_store::DocumentStore;
use serde_json::Value;

use crate::config::{SyncOptions, SyncRequest};
use crate::error::{SyncResult, ValidationError};
use crate::resolve::{source_page, target_pages};
use crate::title::stamp_page_title;

/// Outcome of a visual duplication
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisualSummary {
    /// Copied visual ids, in source order
    pub visuals: Vec<String>,
    /// Groups needed by the copied visuals
    pub groups: Vec<String>,
    /// Target page folders that were processed
    pub pages: Vec<String>,
    /// Pages whose title visual had at least one run rewritten
    pub titles_stamped: usize,
    /// Documents staged for writing
    pub documents_staged: usize,
}

/// What gets copied, decided once from the source page
struct Selection<'a> {
    source: &'a Page,
    visuals: IndexSet<String>,
    groups: IndexSet<String>,
}

/// Duplicate visuals on an already-loaded store
///
/// Stages every change in `store`; nothing is written to disk.
///
/// # Errors
/// Returns validation errors before anything is staged
pub fn apply_visual_duplication(
    store: &mut DocumentStore,
    request: &SyncRequest,
    options: &SyncOptions,
) -> SyncResult<VisualSummary> {
    let layout = ProjectLayout::new(&request.report).map_err(ValidationError::from)?;
    let catalog = Catalog::build(store, &layout);

    let source = source_page(&catalog, request)?;
    let selection = select(source, request)?;
    let targets = target_pages(&catalog, source, request)?;

    tracing::info!(
        "Copying {} visual(s) and {} group(s) from {} to {} page(s)",
        selection.visuals.len(),
        selection.groups.len(),
        source.folder(),
        targets.len()
    );

    let mut summary = VisualSummary {
        visuals: selection.visuals.iter().cloned().collect(),
        groups: selection.groups.iter().cloned().collect(),
        ..VisualSummary::default()
    };

    for target in targets {
        tracing::info!("Processing page {} ({})", target.folder(), target.display_name());
        merge_groups(store, &layout, &selection, target)?;
        update_container_order(store, &selection, target)?;
        merge_visuals(store, &layout, &selection, target)?;
        if let Some(title_visual) = &options.title_visual {
            if stamp_title(store, &layout, target, title_visual)? {
                summary.titles_stamped += 1;
            }
        }
        summary.pages.push(target.folder().to_string());
    }

    summary.documents_staged = store.pending_writes().count();
    Ok(summary)
}

/// Load, duplicate, and flush (unless dry run)
///
/// # Errors
/// Returns validation errors before any write, or the first IO error
pub fn duplicate_visuals(
    project_dir: &Path,
    request: &SyncRequest,
    options: &SyncOptions,
) -> SyncResult<VisualSummary> {
    let layout = ProjectLayout::new(&request.report).map_err(ValidationError::from)?;
    let mut store = DocumentStore::load_subtree(project_dir, layout.definition())?
        .with_flush_mode(options.flush_mode);

    let summary = apply_visual_duplication(&mut store, request, options)?;

    if options.dry_run {
        tracing::info!("Dry run: {} document(s) not written", summary.documents_staged);
        store.discard();
    } else {
        store.flush()?;
    }
    Ok(summary)
}

fn select<'a>(source: &'a Page, request: &SyncRequest) -> Result<Selection<'a>, ValidationError> {
    let mut visuals = IndexSet::new();
    let mut groups = IndexSet::new();

    for visual in source.visuals() {
        let name = visual.display_name();
        if !request.filter.matches_display(&name) {
            continue;
        }
        tracing::debug!("Selected {} (id {})", name, visual.id());
        visuals.insert(visual.id().to_string());
        if let Some(group) = visual.parent_group() {
            groups.insert(group.to_string());
        }
    }

    if visuals.is_empty() {
        return Err(ValidationError::NothingToCopy {
            page: source.folder().to_string(),
            filter: format!("{:?}", request.filter.names()),
        });
    }

    Ok(Selection {
        source,
        visuals,
        groups,
    })
}

fn merge_groups(
    store: &mut DocumentStore,
    layout: &ProjectLayout,
    selection: &Selection<'_>,
    target: &Page,
) -> SyncResult<()> {
    for group_id in &selection.groups {
        let Some(source_group) = selection.source.group(group_id) else {
            tracing::warn!("Group {} has no group.json on the source page", group_id);
            continue;
        };
        let existing = target.group(group_id).map(|g| g.doc());
        let merged = merge_element(
            source_group.doc(),
            existing,
            MergeKind::Group {
                copied_visuals: &selection.visuals,
            },
        );
        tracing::debug!(
            "{} group {} on {}",
            if existing.is_some() { "Updated" } else { "Created" },
            group_id,
            target.folder()
        );
        store.put_json(layout.group_doc(target.folder(), group_id)?, &merged)?;
    }
    Ok(())
}

fn update_container_order(
    store: &mut DocumentStore,
    selection: &Selection<'_>,
    target: &Page,
) -> SyncResult<()> {
    let before = target.containers();
    let after = group_order(&selection.source.containers(), &before, &selection.groups);
    if after == before {
        tracing::debug!("Group order on {} unchanged", target.folder());
        return Ok(());
    }

    let mut doc = target.doc().clone();
    if let Some(page) = doc.as_object_mut() {
        page.insert(
            "visualContainers".to_string(),
            Value::Array(after.into_iter().map(Value::String).collect()),
        );
    }
    store.put_json(target.path().clone(), &doc)?;
    Ok(())
}

fn merge_visuals(
    store: &mut DocumentStore,
    layout: &ProjectLayout,
    selection: &Selection<'_>,
    target: &Page,
) -> SyncResult<()> {
    let copied = selection.visuals.iter().filter_map(|id| {
        selection
            .source
            .visual(id)
            .map(|v| (id.clone(), v.z()))
    });
    let plan = StackingPlan::new(target.visuals().map(|v| v.z()), copied);

    for id in plan.order() {
        let Some(source_visual) = selection.source.visual(id) else {
            continue;
        };
        let existing = target.visual(id).map(|v| v.doc());
        let mut merged = merge_element(source_visual.doc(), existing, MergeKind::Visual);

        match plan.z_for(id) {
            Some(z) if apply_z(&mut merged, z) => {
                tracing::debug!("Visual {} on {} at z={}", id, target.folder(), z);
            }
            _ => tracing::debug!("Visual {} on {} has no position", id, target.folder()),
        }
        store.put_json(layout.visual_doc(target.folder(), id)?, &merged)?;
    }
    Ok(())
}

fn stamp_title(
    store: &mut DocumentStore,
    layout: &ProjectLayout,
    target: &Page,
    title_visual: &str,
) -> SyncResult<bool> {
    let path = layout.visual_doc(target.folder(), title_visual)?;
    let Some(mut doc) = store.get_json(&path) else {
        tracing::debug!("No title visual {} on {}", title_visual, target.folder());
        return Ok(false);
    };
    let changed = stamp_page_title(&mut doc, target.display_name());
    if changed == 0 {
        tracing::debug!("Title visual {} on {} left as is", title_visual, target.folder());
        return Ok(false);
    }
    tracing::debug!("Stamped '{}' into {} run(s)", target.display_name(), changed);
    store.put_json(path, &doc)?;
    Ok(true)
}
