//! Snippet descriptors discovered by introspection

use serde::Serialize;

use super::localization::LocalizedString;

/// Field type used when a declaration does not name one
pub const DEFAULT_FIELD_TYPE: &str = "Text";

/// One input field a snippet template expects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnippetFieldDescriptor {
    /// Field name, also the key in the element's data bag
    pub name: String,
    /// Label for the editor; backfilled with `name` after introspection
    pub display_name: Option<LocalizedString>,
    /// Selects the field editor template
    pub field_type: String,
    pub description: Option<LocalizedString>,
}

impl SnippetFieldDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            field_type: DEFAULT_FIELD_TYPE.to_string(),
            description: None,
        }
    }

    pub fn with_display_name(mut self, display_name: LocalizedString) -> Self {
        self.display_name = Some(display_name);
        self
    }

    pub fn with_type(mut self, field_type: impl Into<String>) -> Self {
        self.field_type = field_type.into();
        self
    }

    pub fn with_description(mut self, description: LocalizedString) -> Self {
        self.description = Some(description);
        self
    }

    /// The label to show, falling back to the field name
    pub fn label(&self) -> &str {
        self.display_name
            .as_ref()
            .map(|d| d.text())
            .unwrap_or(&self.name)
    }
}

/// The fields a snippet template declared, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnippetDescriptor {
    pub fields: Vec<SnippetFieldDescriptor>,
}

impl SnippetDescriptor {
    pub fn new(fields: Vec<SnippetFieldDescriptor>) -> Self {
        Self { fields }
    }

    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&SnippetFieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}
