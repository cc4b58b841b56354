//! PBIR Layout Composition
//!
//! Pure merge and ordering rules for propagating a layout from a source page
//! onto a target page.
//!
//! # Core Concepts
//!
//! - [`merge_element`]: Source content, target identity ([`MergeKind`] selects visual or group)
//! - [`group_order`] / [`member_order`]: Copied ids in source order, then the target's remaining ids
//! - [`StackingPlan`]: Copied visuals stacked above everything already on the page
//!
//! # Example
//!
//! ```rust,ignore
//! use pbir_composition::{apply_z, merge_element, MergeKind, StackingPlan};
//!
//! let plan = StackingPlan::new(existing_zs, copied_with_source_z);
//! for id in plan.order() {
//!     let mut merged = merge_element(&source[id], target.get(id), MergeKind::Visual);
//!     if let Some(z) = plan.z_for(id) {
//!         apply_z(&mut merged, z);
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod merge;
mod order;
mod stacking;

// Re-exports
pub use merge::{merge_element, MergeKind, IDENTITY_FIELDS};
pub use order::{group_order, member_order, two_phase_order};
pub use stacking::{apply_z, z_value, StackingPlan};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod property_tests {
    use super::*;
    use indexmap::IndexSet;
    use proptest::prelude::*;
    use serde_json::json;

    fn ids(max: usize) -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec("[a-f]", 0..max)
    }

    proptest! {
        /// Running the same merge twice yields the same order
        #[test]
        fn ordering_is_idempotent(source in ids(8), target in ids(8), copied in ids(6)) {
            let copied: IndexSet<String> = copied.into_iter().collect();
            let once = group_order(&source, &target, &copied);
            let twice = group_order(&source, &once, &copied);
            prop_assert_eq!(once, twice);
        }

        /// Merged orders never repeat an id
        #[test]
        fn ordering_has_no_duplicates(source in ids(8), target in ids(8), copied in ids(6)) {
            let copied: IndexSet<String> = copied.into_iter().collect();
            let order = member_order(&source, &target, &copied);
            let unique: IndexSet<&String> = order.iter().collect();
            prop_assert_eq!(unique.len(), order.len());
        }

        /// Copied visuals sit strictly above the existing page and keep source order
        #[test]
        fn stacking_invariant(
            existing in proptest::collection::vec(-5_000i32..5_000, 0..10),
            source_z in proptest::collection::vec(0u32..10_000, 1..10),
        ) {
            let copied: Vec<(String, f64)> = source_z
                .iter()
                .enumerate()
                .map(|(i, z)| (format!("v{i}"), f64::from(*z)))
                .collect();
            let max_existing = existing.iter().copied().max().map_or(0.0, f64::from);
            let existing_z: Vec<f64> = existing.iter().copied().map(f64::from).collect();
            let plan = StackingPlan::new(existing_z, copied.clone());

            for (id, _) in &copied {
                let z = plan.z_for(id).unwrap();
                prop_assert!(z > max_existing);
            }
            for (a, za) in &copied {
                for (b, zb) in &copied {
                    if za < zb {
                        prop_assert!(plan.z_for(a).unwrap() < plan.z_for(b).unwrap());
                    }
                }
            }
        }

        /// Group merge is stable when re-applied to its own output
        #[test]
        fn group_merge_idempotent(source in ids(6), target in ids(6), copied in ids(6)) {
            let copied: IndexSet<String> = copied.into_iter().collect();
            let src = json!({"name": "g", "visuals": source});
            let tgt = json!({"name": "g", "visuals": target});
            let kind = MergeKind::Group { copied_visuals: &copied };
            let once = merge_element(&src, Some(&tgt), kind);
            let twice = merge_element(&src, Some(&once), kind);
            prop_assert_eq!(once, twice);
        }
    }
}
