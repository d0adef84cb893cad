use serde::{Deserialize, Serialize};

/// Prefix spreadsheet exports give to blank header cells ("Unnamed: 1")
pub const PLACEHOLDER_PREFIX: &str = "Unnamed";

/// Two-part column key from a hierarchical header: the outer category on
/// the first header line and the inner category on the second
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeaderKey {
    /// Label from the first header line
    pub outer: String,
    /// Label from the second header line
    pub inner: String,
}

impl HeaderKey {
    pub fn new(outer: impl Into<String>, inner: impl Into<String>) -> Self {
        Self {
            outer: outer.into(),
            inner: inner.into(),
        }
    }

    /// Whether a header label marks a blank cell rather than a real category
    pub fn is_placeholder(label: &str) -> bool {
        let label = label.trim();
        label.is_empty() || label.starts_with(PLACEHOLDER_PREFIX)
    }

    /// Flatten into a single column name
    ///
    /// - identical labels collapse to one (`("소계", "소계")` -> `소계`)
    /// - a placeholder outer label yields the inner one
    /// - anything else joins as `outer_inner` (`("개", "소계")` -> `개_소계`)
    pub fn flatten(&self) -> String {
        if self.outer == self.inner {
            self.outer.clone()
        } else if Self::is_placeholder(&self.outer) {
            self.inner.clone()
        } else {
            format!("{}_{}", self.outer, self.inner)
        }
    }
}
