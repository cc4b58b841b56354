//! Element merge
//!
//! Source is authoritative for content; target is authoritative for identity
//! when it already existed.

use indexmap::IndexSet;
use serde_json::Value;

use crate::order::member_order;

/// Fields that keep the target's value when a target document exists
pub const IDENTITY_FIELDS: [&str; 2] = ["id", "name"];

/// What kind of element is being merged
#[derive(Debug, Clone, Copy)]
pub enum MergeKind<'a> {
    /// A visual; stacking is assigned separately
    Visual,
    /// A group; its `visuals` list is reordered against the copied set
    Group {
        /// Visual ids being copied in this operation
        copied_visuals: &'a IndexSet<String>,
    },
}

/// Merge `source` into an optional pre-existing `target`
///
/// Every field comes from `source` except the identity fields present in
/// `target`. For groups, `visuals` is recomputed with [`member_order`] and
/// written when non-empty or when the source carried the list.
#[must_use]
pub fn merge_element(source: &Value, target: Option<&Value>, kind: MergeKind<'_>) -> Value {
    let mut merged = source.clone();

    if let (Some(out), Some(existing)) = (merged.as_object_mut(), target.and_then(Value::as_object)) {
        for key in IDENTITY_FIELDS {
            if let Some(value) = existing.get(key) {
                out.insert(key.to_string(), value.clone());
            }
        }
    }

    if let MergeKind::Group { copied_visuals } = kind {
        let source_list = string_items(source.get("visuals"));
        let target_list = string_items(target.and_then(|t| t.get("visuals")));
        let members = member_order(
            source_list.as_deref().unwrap_or_default(),
            target_list.as_deref().unwrap_or_default(),
            copied_visuals,
        );
        tracing::debug!(
            "group members: source={:?} target={:?} merged={:?}",
            source_list,
            target_list,
            members
        );

        if let Some(out) = merged.as_object_mut() {
            if !members.is_empty() || source_list.is_some() {
                out.insert(
                    "visuals".to_string(),
                    Value::Array(members.into_iter().map(Value::String).collect()),
                );
            }
        }
    }

    merged
}

fn string_items(value: Option<&Value>) -> Option<Vec<String>> {
    value.and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}
