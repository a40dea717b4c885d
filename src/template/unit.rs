//! Render units and the field-declaration channel

use std::rc::Rc;

use tracing::warn;

use crate::snippet::{Element, SnippetDescriptor, SnippetFieldDescriptor};

/// How the engine treats a render unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Field tags declare themselves on the channel and produce no output
    Introspect,
    /// Field tags output their values
    Display,
}

/// Records the fields a template declares during introspection
///
/// A channel is installed for exactly one render and taken back afterwards.
/// Only the first declaration of a field name is kept.
#[derive(Debug, Clone, Default)]
pub struct FieldChannel {
    fields: Vec<SnippetFieldDescriptor>,
}

impl FieldChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, field: SnippetFieldDescriptor) {
        if self.fields.iter().any(|f| f.name == field.name) {
            warn!(field = %field.name, "ignoring duplicate snippet field declaration");
            return;
        }
        self.fields.push(field);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_fields(self) -> Vec<SnippetFieldDescriptor> {
        self.fields
    }
}

/// An instantiated template with its bound values
#[derive(Debug, Clone)]
pub struct RenderUnit {
    /// Key of the template to render
    pub template: String,
    /// The element that owns this unit
    pub element: Option<Element>,
    pub snippet_descriptor: Option<Rc<SnippetDescriptor>>,
    /// Field-declaration channel; present only while introspecting
    pub registration: Option<FieldChannel>,
    /// Output of the last display pass
    pub output: Option<String>,
}

impl RenderUnit {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            element: None,
            snippet_descriptor: None,
            registration: None,
            output: None,
        }
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    pub fn mode(&self) -> RenderMode {
        if self.registration.is_some() {
            RenderMode::Introspect
        } else {
            RenderMode::Display
        }
    }
}

/// Creates render units by template key
pub trait RenderUnitFactory {
    fn create(&self, template: &str) -> RenderUnit;
}

/// Creates bare render units
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitFactory;

impl RenderUnitFactory for UnitFactory {
    fn create(&self, template: &str) -> RenderUnit {
        RenderUnit::new(template)
    }
}
