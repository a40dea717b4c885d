//! Editor forms for snippet elements
//!
//! One editor unit is built per declared field and grouped under a single
//! composite unit. When the form was submitted, the submitted values are
//! written into the element's data bag first, so the rebuilt form shows them.

use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::trace;

use super::config::EditorConfig;
use super::descriptor::{SnippetDescriptor, SnippetFieldDescriptor, DEFAULT_FIELD_TYPE};
use super::element::Element;

/// Source of submitted form values
pub trait ValueProvider {
    /// The submitted value for `name`, if the form carried one
    fn get_value(&self, name: &str) -> Option<String>;
}

/// Submitted values held in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: BTreeMap<String, String>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }
}

impl FromIterator<(String, String)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl ValueProvider for FormValues {
    fn get_value(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Model of the editor for one field
#[derive(Debug, Clone, PartialEq)]
pub struct SnippetFieldViewModel {
    pub descriptor: SnippetFieldDescriptor,
    /// Current value in the element's data bag
    pub value: Option<String>,
}

/// Model of the composite snippet editor
#[derive(Debug, Clone, PartialEq)]
pub struct SnippetViewModel {
    pub descriptor: Rc<SnippetDescriptor>,
    pub field_editors: Vec<EditorUnit>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorModel {
    Snippet(SnippetViewModel),
    Field(SnippetFieldViewModel),
}

/// An instantiated editor template
#[derive(Debug, Clone, PartialEq)]
pub struct EditorUnit {
    pub template_name: String,
    /// Form-field name prefix
    pub prefix: String,
    /// Ordering key among the element's editors, e.g. `Fields:0`
    pub position: Option<String>,
    pub model: EditorModel,
}

/// Creates editor units by template name
pub trait EditorUnitFactory {
    fn editor_template(&self, template_name: &str, model: EditorModel, prefix: &str) -> EditorUnit;
}

/// Creates plain editor units
#[derive(Debug, Clone, Copy, Default)]
pub struct EditorTemplates;

impl EditorUnitFactory for EditorTemplates {
    fn editor_template(&self, template_name: &str, model: EditorModel, prefix: &str) -> EditorUnit {
        EditorUnit {
            template_name: template_name.to_string(),
            prefix: prefix.to_string(),
            position: None,
            model,
        }
    }
}

/// One editor session for one element
pub struct ElementEditorContext<'a> {
    pub element: &'a mut Element,
    /// Present only when the form was submitted
    pub value_provider: Option<&'a dyn ValueProvider>,
    pub units: &'a dyn EditorUnitFactory,
    pub prefix: String,
}

impl<'a> ElementEditorContext<'a> {
    pub fn new(element: &'a mut Element, units: &'a dyn EditorUnitFactory) -> Self {
        Self {
            element,
            value_provider: None,
            units,
            prefix: String::new(),
        }
    }

    pub fn with_values(mut self, values: &'a dyn ValueProvider) -> Self {
        self.value_provider = Some(values);
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

/// Builds snippet editor forms and applies submitted values
#[derive(Debug, Clone, Default)]
pub struct EditorFormBuilder {
    config: EditorConfig,
}

impl EditorFormBuilder {
    pub fn new(config: EditorConfig) -> Self {
        Self { config }
    }

    /// Merge submitted values into the element, then build the editor
    ///
    /// Without a value provider this is a read-only build. Fields missing
    /// from the submission keep their previous value.
    pub fn build_or_apply(
        &self,
        descriptor: &Rc<SnippetDescriptor>,
        context: &mut ElementEditorContext<'_>,
    ) -> EditorUnit {
        if let Some(values) = context.value_provider {
            for field in &descriptor.fields {
                if let Some(value) = values.get_value(&field.name) {
                    trace!(field = %field.name, "applying submitted value");
                    context.element.data.set(field.name.clone(), value);
                }
            }
        }

        let field_editors = descriptor
            .fields
            .iter()
            .map(|field| {
                let field_type = if field.field_type.is_empty() {
                    DEFAULT_FIELD_TYPE
                } else {
                    field.field_type.as_str()
                };
                let model = EditorModel::Field(SnippetFieldViewModel {
                    descriptor: field.clone(),
                    value: context.element.data.get(&field.name).map(str::to_string),
                });
                context
                    .units
                    .editor_template(&self.config.field_template(field_type), model, &context.prefix)
            })
            .collect();

        let model = EditorModel::Snippet(SnippetViewModel {
            descriptor: Rc::clone(descriptor),
            field_editors,
        });
        let mut editor = context
            .units
            .editor_template(&self.config.template, model, &context.prefix);
        editor.position = Some(self.config.position.clone());
        editor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snippet::LocalizedString;

    fn descriptor() -> Rc<SnippetDescriptor> {
        Rc::new(SnippetDescriptor::new(vec![
            SnippetFieldDescriptor::new("Title").with_display_name(LocalizedString::new("Title")),
            SnippetFieldDescriptor::new("Body").with_type("Html"),
        ]))
    }

    fn element() -> Element {
        let mut element = Element::new("Snippet", "Snippets");
        element.data.set("Title", "Old title");
        element.data.set("Body", "Old body");
        element
    }

    fn field_editors(unit: &EditorUnit) -> &[EditorUnit] {
        match &unit.model {
            EditorModel::Snippet(model) => &model.field_editors,
            EditorModel::Field(_) => panic!("expected the composite snippet editor"),
        }
    }

    fn field_value(unit: &EditorUnit) -> Option<&str> {
        match &unit.model {
            EditorModel::Field(model) => model.value.as_deref(),
            EditorModel::Snippet(_) => panic!("expected a field editor"),
        }
    }

    #[test]
    fn test_build_without_provider_is_read_only() {
        let mut element = element();
        let mut context = ElementEditorContext::new(&mut element, &EditorTemplates).with_prefix("Element");
        let editor = EditorFormBuilder::default().build_or_apply(&descriptor(), &mut context);

        assert_eq!(editor.template_name, "Elements.Snippet");
        assert_eq!(editor.position.as_deref(), Some("Fields:0"));
        assert_eq!(editor.prefix, "Element");

        let fields = field_editors(&editor);
        let templates: Vec<_> = fields.iter().map(|f| f.template_name.as_str()).collect();
        assert_eq!(
            templates,
            vec!["Elements.Snippet.Field.Text", "Elements.Snippet.Field.Html"]
        );
        assert_eq!(field_value(&fields[0]), Some("Old title"));
        assert_eq!(element.data.get("Title"), Some("Old title"));
    }

    #[test]
    fn test_apply_submitted_values() {
        let mut element = element();
        let values = FormValues::new()
            .with_value("Title", "New title")
            .with_value("Unrelated", "ignored");
        let mut context = ElementEditorContext::new(&mut element, &EditorTemplates).with_values(&values);
        let editor = EditorFormBuilder::default().build_or_apply(&descriptor(), &mut context);

        let fields = field_editors(&editor);
        assert_eq!(field_value(&fields[0]), Some("New title"));
        assert_eq!(field_value(&fields[1]), Some("Old body"));
        assert_eq!(element.data.get("Title"), Some("New title"));
        assert_eq!(element.data.get("Body"), Some("Old body"));
        assert_eq!(element.data.get("Unrelated"), None);
    }

    #[test]
    fn test_submitted_empty_value_overwrites() {
        let mut element = element();
        let values = FormValues::new().with_value("Title", "");
        let mut context = ElementEditorContext::new(&mut element, &EditorTemplates).with_values(&values);
        EditorFormBuilder::default().build_or_apply(&descriptor(), &mut context);
        assert_eq!(element.data.get("Title"), Some(""));
    }

    #[test]
    fn test_no_fields_builds_empty_editor() {
        let mut element = element();
        let mut context = ElementEditorContext::new(&mut element, &EditorTemplates);
        let empty = Rc::new(SnippetDescriptor::default());
        let editor = EditorFormBuilder::new(EditorConfig::new().with_position("Fields:9"))
            .build_or_apply(&empty, &mut context);
        assert!(field_editors(&editor).is_empty());
        assert_eq!(editor.position.as_deref(), Some("Fields:9"));
    }
}
