//! Completion suggestions and their permission/prefix filtering.

use serde::Serialize;

use crate::identity::Identity;

/// A single completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Suggestion {
    /// The text inserted on completion.
    pub value: String,
    /// Optional hover text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    /// Permission required to see this candidate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
}

impl Suggestion {
    /// A bare suggestion visible to everyone.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            tooltip: None,
            permission: None,
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    /// Bare suggestions for each value, in order.
    pub fn of<S: AsRef<str>>(values: &[S]) -> Vec<Self> {
        values.iter().map(|v| Self::new(v.as_ref())).collect()
    }

    /// Suggestions from `(value, tooltip)` pairs.
    pub fn with_tooltips<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> Vec<Self> {
        pairs
            .iter()
            .map(|(k, v)| Self::new(k.as_ref()).with_tooltip(v.as_ref()))
            .collect()
    }

    /// Whether `identity` may see this suggestion.
    pub fn is_visible_to(&self, identity: &dyn Identity) -> bool {
        self.permission
            .as_deref()
            .is_none_or(|perm| identity.has_permission(perm))
    }

    /// Case-insensitive prefix test. An empty prefix matches everything.
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        starts_with_ignore_case(&self.value, prefix)
    }
}

/// Case-insensitive `starts_with`.
pub fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    prefix.is_empty() || value.to_lowercase().starts_with(&prefix.to_lowercase())
}

/// Case-insensitive equality.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

/// Keep the suggestions `identity` may see whose value starts with `prefix`,
/// sorted case-insensitively by value.
pub fn filter_for(
    suggestions: Vec<Suggestion>,
    prefix: &str,
    identity: &dyn Identity,
) -> Vec<Suggestion> {
    let mut kept: Vec<Suggestion> = suggestions
        .into_iter()
        .filter(|s| s.is_visible_to(identity) && s.matches_prefix(prefix))
        .collect();
    kept.sort_by_cached_key(|s| s.value.to_lowercase());
    kept
}

/// Collapse suggestions to their values.
pub fn to_values(suggestions: &[Suggestion]) -> Vec<String> {
    suggestions.iter().map(|s| s.value.clone()).collect()
}
