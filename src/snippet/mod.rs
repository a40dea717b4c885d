//! Snippet element types harvested from theme templates

mod builder;
pub mod config;
mod descriptor;
mod display;
mod editor;
mod element;
mod harvester;
mod localization;
mod tokens;

pub use builder::SnippetDescriber;
pub use config::{EditorConfig, HarvestConfig};
pub use descriptor::{SnippetDescriptor, SnippetFieldDescriptor, DEFAULT_FIELD_TYPE};
pub use display::{DisplayBinder, ElementDisplayContext, ElementShape, SNIPPET_CHILD};
pub use editor::{
    EditorFormBuilder, EditorModel, EditorTemplates, EditorUnit, EditorUnitFactory,
    ElementEditorContext, FormValues, SnippetFieldViewModel, SnippetViewModel, ValueProvider,
};
pub use element::{DefaultElementFactory, Element, ElementData, ElementFactory};
pub use harvester::{
    display_name, CapabilityDescriptor, CapabilitySummary, DisplayCallback, EditorCallback,
    HarvestContext, HarvestError, HostServices, SnippetHarvester,
};
pub use localization::{Catalog, LocalizedString, Localizer, NullLocalizer};
pub use tokens::{TokenTable, Tokenizer};
