//! Configuration for HTML form rendering

/// Configuration options for form output
#[derive(Debug, Clone)]
pub struct FormConfig {
    /// Whether to format output with indentation
    pub pretty_print: bool,

    /// Prefix for CSS class names (e.g., "snippet-" for "snippet-field")
    pub class_prefix: Option<String>,

    /// Field types edited with a multi-line text area
    pub multiline_types: Vec<String>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            pretty_print: true,
            class_prefix: Some("snippet-".to_string()),
            multiline_types: vec!["Html".to_string(), "Textarea".to_string()],
        }
    }
}

impl FormConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to pretty-print output
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Set the CSS class prefix
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = Some(prefix.into());
        self
    }

    /// Remove the CSS class prefix
    pub fn without_class_prefix(mut self) -> Self {
        self.class_prefix = None;
        self
    }

    pub fn is_multiline(&self, field_type: &str) -> bool {
        self.multiline_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(field_type))
    }
}
