//! Element name filters
//!
//! A filter arrives as "nothing", one name, or a list of names and is
//! resolved once into a [`NameFilter`].

use indexmap::IndexSet;
use serde_json::Value;

/// Which elements an operation applies to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NameFilter {
    /// Every element
    #[default]
    All,
    /// A single name
    One(String),
    /// Any of several names
    Many(IndexSet<String>),
}

/// A filter value that is neither absent, a string, nor a list of strings
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("name filter must be a string or a list of strings, got {found}")]
pub struct FilterShapeError {
    /// JSON kind that was found
    pub found: String,
}

impl NameFilter {
    /// Build from a list of names (empty means all)
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: IndexSet<String> = names.into_iter().map(Into::into).collect();
        match names.len() {
            0 => Self::All,
            1 => names.pop().map_or(Self::All, Self::One),
            _ => Self::Many(names),
        }
    }

    /// Decode from a configuration value
    ///
    /// `null`, absent, and an empty list mean all; a string means one name;
    /// an array of strings means several.
    ///
    /// # Errors
    /// Returns error for any other shape, including arrays with non-string items
    pub fn from_value(value: Option<&Value>) -> Result<Self, FilterShapeError> {
        match value {
            None | Some(Value::Null) => Ok(Self::All),
            Some(Value::String(name)) => Ok(Self::One(name.clone())),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| FilterShapeError {
                        found: format!("list containing {}", kind_of(item)),
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::from_names),
            Some(other) => Err(FilterShapeError {
                found: kind_of(other).to_string(),
            }),
        }
    }

    /// Check if the filter accepts everything
    #[inline]
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Names in the filter (empty for [`NameFilter::All`])
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::All => Vec::new(),
            Self::One(name) => vec![name.as_str()],
            Self::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }

    /// Display-name match: trimmed, case-insensitive
    #[must_use]
    pub fn matches_display(&self, display_name: &str) -> bool {
        let candidate = display_name.trim().to_uppercase();
        match self {
            Self::All => true,
            Self::One(name) => name.trim().to_uppercase() == candidate,
            Self::Many(names) => names.iter().any(|n| n.trim().to_uppercase() == candidate),
        }
    }

    /// Id match: exact
    #[must_use]
    pub fn matches_exact(&self, id: &str) -> bool {
        match self {
            Self::All => true,
            Self::One(name) => name == id,
            Self::Many(names) => names.contains(id),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_names_collapses() {
        assert_eq!(NameFilter::from_names(Vec::<String>::new()), NameFilter::All);
        assert_eq!(NameFilter::from_names(["a"]), NameFilter::One("a".into()));
        assert!(matches!(NameFilter::from_names(["a", "b"]), NameFilter::Many(_)));
        assert_eq!(NameFilter::from_names(["a", "a"]), NameFilter::One("a".into()));
    }

    #[test]
    fn from_value_shapes() {
        assert_eq!(NameFilter::from_value(None).unwrap(), NameFilter::All);
        assert_eq!(NameFilter::from_value(Some(&Value::Null)).unwrap(), NameFilter::All);
        assert_eq!(
            NameFilter::from_value(Some(&json!("Chart"))).unwrap(),
            NameFilter::One("Chart".into())
        );
        assert_eq!(
            NameFilter::from_value(Some(&json!(["A", "B"]))).unwrap().names(),
            vec!["A", "B"]
        );
    }

    #[test]
    fn empty_list_means_all() {
        let filter = NameFilter::from_value(Some(&json!([]))).unwrap();
        assert!(filter.is_all());
    }

    #[test]
    fn from_value_rejects_other_shapes() {
        assert!(NameFilter::from_value(Some(&json!(42))).is_err());
        assert!(NameFilter::from_value(Some(&json!({"a": 1}))).is_err());
        let err = NameFilter::from_value(Some(&json!(["ok", 3]))).unwrap_err();
        assert!(err.to_string().contains("list containing a number"));
    }

    #[test]
    fn display_match_ignores_case_and_padding() {
        let filter = NameFilter::from_names(["Chart A", "table b"]);
        assert!(filter.matches_display("  chart a "));
        assert!(filter.matches_display("TABLE B"));
        assert!(!filter.matches_display("Chart"));
        assert!(NameFilter::All.matches_display("anything"));
    }

    #[test]
    fn exact_match_is_case_sensitive() {
        let filter = NameFilter::One("bk1".into());
        assert!(filter.matches_exact("bk1"));
        assert!(!filter.matches_exact("BK1"));
    }
}
