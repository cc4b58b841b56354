//! Two-phase ordering
//!
//! Copied ids first, in source order; then the target's remaining ids, in
//! their existing order. The result never contains duplicates.

use indexmap::IndexSet;

/// Merge a source order into a target order
///
/// `copied` decides which source ids are being brought over. Source ids not
/// in `copied` are dropped; target ids in `copied` are moved to their source
/// position.
#[must_use]
pub fn two_phase_order<S, T>(source: &[S], target: &[T], copied: &IndexSet<String>) -> Vec<String>
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    let mut out: IndexSet<&str> = IndexSet::with_capacity(source.len() + target.len());
    out.extend(
        source
            .iter()
            .map(AsRef::as_ref)
            .filter(|id| copied.contains(*id)),
    );
    out.extend(
        target
            .iter()
            .map(AsRef::as_ref)
            .filter(|id| !copied.contains(*id)),
    );
    out.into_iter().map(str::to_string).collect()
}

/// Page-level group container order
#[inline]
#[must_use]
pub fn group_order(
    source_order: &[String],
    target_order: &[String],
    copied_groups: &IndexSet<String>,
) -> Vec<String> {
    two_phase_order(source_order, target_order, copied_groups)
}

/// Member order of one group
#[inline]
#[must_use]
pub fn member_order(
    source_members: &[String],
    target_members: &[String],
    copied_visuals: &IndexSet<String>,
) -> Vec<String> {
    two_phase_order(source_members, target_members, copied_visuals)
}
