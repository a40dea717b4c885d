//! Display binding for snippet elements

use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

use crate::template::{Binding, RenderEngine, RenderError, RenderUnit, RenderUnitFactory, ThemeScope};

use super::descriptor::SnippetDescriptor;
use super::element::Element;

/// Child slot of the element's render tree that holds the snippet
pub const SNIPPET_CHILD: &str = "Snippet";

/// Render tree node of one displayed element
#[derive(Debug, Clone, Default)]
pub struct ElementShape {
    pub children: BTreeMap<String, RenderUnit>,
    pub snippet_descriptor: Option<Rc<SnippetDescriptor>>,
}

impl ElementShape {
    pub fn snippet(&self) -> Option<&RenderUnit> {
        self.children.get(SNIPPET_CHILD)
    }

    /// Output of the rendered snippet child
    pub fn output(&self) -> Option<&str> {
        self.snippet().and_then(|unit| unit.output.as_deref())
    }
}

/// One display pass of one element
#[derive(Debug, Clone)]
pub struct ElementDisplayContext {
    pub element: Element,
    pub shape: ElementShape,
}

impl ElementDisplayContext {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            shape: ElementShape::default(),
        }
    }
}

/// Instantiates snippet templates for real output
#[derive(Clone)]
pub struct DisplayBinder {
    units: Rc<dyn RenderUnitFactory>,
    engine: Rc<dyn RenderEngine>,
    scope: ThemeScope,
}

impl DisplayBinder {
    pub fn new(
        units: Rc<dyn RenderUnitFactory>,
        engine: Rc<dyn RenderEngine>,
        scope: ThemeScope,
    ) -> Self {
        Self {
            units,
            engine,
            scope,
        }
    }

    /// Render `binding` for the context's element and plug it into its shape
    pub fn attach(
        &self,
        context: &mut ElementDisplayContext,
        binding: &Binding,
        snippet: &Rc<SnippetDescriptor>,
    ) -> Result<(), RenderError> {
        let mut unit = self.units.create(&binding.key);
        unit.element = Some(context.element.clone());
        unit.snippet_descriptor = Some(Rc::clone(snippet));

        let output = {
            let _scope = self.scope.enable();
            self.engine.display(&mut unit)?
        };
        debug!(template = %binding.key, bytes = output.len(), "displayed snippet");

        unit.output = Some(output);
        context.shape.children.insert(SNIPPET_CHILD.to_string(), unit);
        context.shape.snippet_descriptor = Some(Rc::clone(snippet));
        Ok(())
    }
}
