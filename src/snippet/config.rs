//! Configuration for snippet harvesting and editing

use serde::Deserialize;

/// Configuration for the snippet editor form
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Template of the composite editor holding all field editors
    pub template: String,

    /// Field editors use `<field_template_prefix>.<field type>`
    pub field_template_prefix: String,

    /// Position key of the composite editor among the element's editors
    pub position: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            template: "Elements.Snippet".to_string(),
            field_template_prefix: "Elements.Snippet.Field".to_string(),
            position: "Fields:0".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Template name of the editor for one field type
    pub fn field_template(&self, field_type: &str) -> String {
        format!("{}.{}", self.field_template_prefix, field_type)
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = position.into();
        self
    }
}

/// Configuration options for harvesting snippet element types
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarvestConfig {
    /// Template keys ending in this suffix (any case) are snippets
    pub suffix: String,

    /// Key of the generic snippet wrapper template, never harvested
    pub default_wrapper: String,

    /// Element type every harvested snippet is an instance of
    pub element_type: String,

    /// Toolbox category of the snippet element type
    pub category: String,

    /// Toolbox icon glyph
    pub icon: String,

    pub editor: EditorConfig,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            suffix: "Snippet".to_string(),
            default_wrapper: "Elements_Snippet".to_string(),
            element_type: "Snippet".to_string(),
            category: "Snippets".to_string(),
            icon: "\u{f10c}".to_string(),
            editor: EditorConfig::default(),
        }
    }
}

impl HarvestConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a template key names a snippet
    pub fn qualifies(&self, key: &str) -> bool {
        if key.eq_ignore_ascii_case(&self.default_wrapper) {
            return false;
        }
        key.len()
            .checked_sub(self.suffix.len())
            .and_then(|start| key.get(start..))
            .is_some_and(|tail| tail.eq_ignore_ascii_case(&self.suffix))
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_default_wrapper(mut self, key: impl Into<String>) -> Self {
        self.default_wrapper = key.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_editor(mut self, editor: EditorConfig) -> Self {
        self.editor = editor;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HarvestConfig::default();
        assert_eq!(config.suffix, "Snippet");
        assert_eq!(config.default_wrapper, "Elements_Snippet");
        assert_eq!(config.icon, "\u{f10c}");
        assert_eq!(config.editor.position, "Fields:0");
        assert_eq!(config.editor.field_template("Html"), "Elements.Snippet.Field.Html");
    }

    #[test]
    fn test_qualifying_keys() {
        let config = HarvestConfig::default();
        assert!(config.qualifies("WelcomeBannerSnippet"));
        assert!(config.qualifies("footersnippet"));
        assert!(config.qualifies("Snippet"));
        assert!(!config.qualifies("Elements_Snippet"));
        assert!(!config.qualifies("elements_snippet"));
        assert!(!config.qualifies("Banner"));
        assert!(!config.qualifies("SnippetBanner"));
        assert!(!config.qualifies("nip"));
    }

    #[test]
    fn test_custom_suffix() {
        let config = HarvestConfig::new().with_suffix("Widget");
        assert!(config.qualifies("ClockWidget"));
        assert!(!config.qualifies("ClockSnippet"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: HarvestConfig = toml::from_str(
            r#"
            category = "Content"
            [editor]
            position = "Fields:5"
            "#,
        )
        .expect("Should parse");
        assert_eq!(config.category, "Content");
        assert_eq!(config.suffix, "Snippet");
        assert_eq!(config.editor.position, "Fields:5");
        assert_eq!(config.editor.template, "Elements.Snippet");
    }
}
