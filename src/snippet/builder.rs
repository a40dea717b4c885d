//! Field discovery by introspection
//!
//! A snippet template declares its inputs with `field` tags. To find them the
//! template is rendered once with a [`FieldChannel`] installed on the unit;
//! the engine then records each declaration instead of printing a value.

use std::rc::Rc;

use tracing::debug;

use crate::template::{
    FieldChannel, RenderEngine, RenderError, RenderUnit, RenderUnitFactory, ThemeScope,
};

use super::descriptor::{SnippetDescriptor, SnippetFieldDescriptor};
use super::element::Element;
use super::localization::LocalizedString;

/// Builds [`SnippetDescriptor`]s by running templates in introspection mode
#[derive(Clone)]
pub struct SnippetDescriber {
    units: Rc<dyn RenderUnitFactory>,
    engine: Rc<dyn RenderEngine>,
    scope: ThemeScope,
}

impl SnippetDescriber {
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

    /// Instantiate `template` for `element` and discover its fields
    pub fn describe(
        &self,
        template: &str,
        element: &Element,
    ) -> Result<Rc<SnippetDescriptor>, RenderError> {
        let mut unit = self.units.create(template);
        unit.element = Some(element.clone());
        self.describe_unit(&mut unit)
    }

    /// Discover the fields of an already instantiated unit
    ///
    /// The unit is rendered exactly once with theme-scoped resolution on.
    /// Its output is discarded. On success the descriptor is also attached
    /// to the unit.
    pub fn describe_unit(&self, unit: &mut RenderUnit) -> Result<Rc<SnippetDescriptor>, RenderError> {
        unit.registration = Some(FieldChannel::new());
        let rendered = {
            let _scope = self.scope.enable();
            self.engine.display(unit)
        };
        // The channel is single-use, so take it back before looking at the result
        let channel = unit.registration.take().unwrap_or_default();
        rendered?;

        let fields: Vec<_> = channel.into_fields().into_iter().map(backfill_display_name).collect();
        debug!(template = %unit.template, fields = fields.len(), "introspected snippet template");

        let descriptor = Rc::new(SnippetDescriptor::new(fields));
        unit.snippet_descriptor = Some(Rc::clone(&descriptor));
        Ok(descriptor)
    }
}

fn backfill_display_name(mut field: SnippetFieldDescriptor) -> SnippetFieldDescriptor {
    if field.display_name.is_none() {
        field.display_name = Some(LocalizedString::new(field.name.clone()));
    }
    field
}
