use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Error context information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    pub component: String,
    pub path: Option<String>,
    pub row: Option<usize>,
    pub additional: BTreeMap<String, String>,
}

impl ErrorContext {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Row numbers are 1-based data rows (the header is not counted).
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn add_context<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.additional.insert(key.into(), value.into());
        self
    }

    /// Render a message prefixed with everything known about where it happened.
    pub fn describe(&self, message: &str) -> String {
        let mut out = format!("[{}]", self.component);
        if let Some(path) = &self.path {
            let _ = write!(out, " {path}");
        }
        if let Some(row) = self.row {
            let _ = write!(out, " row {row}");
        }
        for (key, value) in &self.additional {
            let _ = write!(out, " {key}={value}");
        }
        let _ = write!(out, ": {message}");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_includes_location() {
        let ctx = ErrorContext::new("dataset")
            .with_path("dataset.csv")
            .with_row(12)
            .add_context("column", "Disease");

        assert_eq!(
            ctx.describe("missing disease name"),
            "[dataset] dataset.csv row 12 column=Disease: missing disease name"
        );
    }

    #[test]
    fn test_describe_component_only() {
        let ctx = ErrorContext::new("model");
        assert_eq!(ctx.describe("empty forest"), "[model]: empty forest");
    }
}
