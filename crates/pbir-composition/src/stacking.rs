//! Stacking (z-order) resolution
//!
//! Copied visuals land strictly above everything already on the target page
//! and keep their source stacking relative to each other.

use indexmap::IndexMap;
use serde_json::{Number, Value};

/// Per-target-page z assignment for copied visuals
#[derive(Debug, Clone, PartialEq)]
pub struct StackingPlan {
    max_existing_z: f64,
    /// Copied ids ascending by source z, with their assigned z
    assigned: IndexMap<String, f64>,
}

impl StackingPlan {
    /// Compute the plan
    ///
    /// `existing` are the z values on the target page before the operation;
    /// `copied` are `(id, source_z)` pairs in encounter order. Ties in source
    /// z keep encounter order.
    #[must_use]
    pub fn new<E, C>(existing: E, copied: C) -> Self
    where
        E: IntoIterator<Item = f64>,
        C: IntoIterator<Item = (String, f64)>,
    {
        let max_existing_z = existing.into_iter().reduce(f64::max).unwrap_or(0.0);

        let mut ranked: Vec<(String, f64)> = copied.into_iter().collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut assigned = IndexMap::with_capacity(ranked.len());
        let mut next = max_existing_z + 1.0;
        for (id, _) in ranked {
            if assigned.contains_key(&id) {
                continue;
            }
            assigned.insert(id, next);
            next += 1.0;
        }

        Self {
            max_existing_z,
            assigned,
        }
    }

    /// Highest z on the target page before the operation (0 if the page is empty)
    #[inline]
    #[must_use]
    pub fn max_existing_z(&self) -> f64 {
        self.max_existing_z
    }

    /// Assigned z for a copied visual
    #[inline]
    #[must_use]
    pub fn z_for(&self, id: &str) -> Option<f64> {
        self.assigned.get(id).copied()
    }

    /// Copied ids, lowest stacking first
    pub fn order(&self) -> impl Iterator<Item = &str> {
        self.assigned.keys().map(String::as_str)
    }

    /// Number of copied visuals
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    /// Check if nothing is being copied
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

/// JSON number for a z value; integral values become JSON integers
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn z_value(z: f64) -> Value {
    if z.fract() == 0.0 && z.abs() < 9.0e15 {
        Value::from(z as i64)
    } else {
        Number::from_f64(z).map_or(Value::Null, Value::Number)
    }
}

/// Set `position.z` when the document has a `position` object
///
/// Returns `false` and leaves the document untouched otherwise.
pub fn apply_z(doc: &mut Value, z: f64) -> bool {
    match doc.get_mut("position").and_then(Value::as_object_mut) {
        Some(position) => {
            position.insert("z".to_string(), z_value(z));
            true
        }
        None => false,
    }
}
