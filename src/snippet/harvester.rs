//! Harvesting snippet element types from the current theme
//!
//! Every template of the site's current theme whose key ends in the snippet
//! suffix becomes one element type. Its fields are discovered by rendering
//! the template once in introspection mode, and the resulting
//! [`CapabilityDescriptor`] carries the display and editor behavior for
//! elements of that type.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use heck::ToTitleCase;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::template::{
    Binding, BindingRegistry, RenderEngine, RenderError, RenderUnitFactory, ThemeResolver,
    ThemeScope,
};

use super::builder::SnippetDescriber;
use super::config::HarvestConfig;
use super::descriptor::SnippetDescriptor;
use super::display::{DisplayBinder, ElementDisplayContext};
use super::editor::{EditorFormBuilder, EditorUnit, ElementEditorContext};
use super::element::{Element, ElementFactory};
use super::localization::{LocalizedString, Localizer};

/// Description template of every harvested element type
const DESCRIPTION: &str = "An element that renders the {0} shape.";

/// Errors that can occur while harvesting or using a snippet element type
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("failed to introspect snippet template {template}: {source}")]
    Introspection {
        template: String,
        #[source]
        source: RenderError,
    },

    #[error("failed to display snippet template {template}: {source}")]
    Display {
        template: String,
        #[source]
        source: RenderError,
    },
}

impl HarvestError {
    pub fn template(&self) -> &str {
        match self {
            HarvestError::Introspection { template, .. } | HarvestError::Display { template, .. } => {
                template
            }
        }
    }

    /// Report for the underlying render failure
    pub fn report(&self) -> String {
        match self {
            HarvestError::Introspection { source, .. } | HarvestError::Display { source, .. } => {
                format!("{}\n{}", self, source.report())
            }
        }
    }
}

/// The collaborators one request's harvester works with
#[derive(Clone)]
pub struct HostServices {
    pub themes: Rc<dyn ThemeResolver>,
    pub bindings: Rc<dyn BindingRegistry>,
    pub elements: Rc<dyn ElementFactory>,
    pub units: Rc<dyn RenderUnitFactory>,
    pub engine: Rc<dyn RenderEngine>,
    pub scope: ThemeScope,
    pub localizer: Rc<dyn Localizer>,
}

/// Context of one harvest request
#[derive(Debug, Clone, Default)]
pub struct HarvestContext {
    /// Free-form request properties, unused by snippet harvesting
    pub properties: BTreeMap<String, String>,
}

pub type DisplayCallback = Box<dyn Fn(&mut ElementDisplayContext) -> Result<(), HarvestError>>;
pub type EditorCallback = Rc<dyn Fn(&mut ElementEditorContext<'_>) -> EditorUnit>;

fn display_callback<F>(f: F) -> DisplayCallback
where
    F: Fn(&mut ElementDisplayContext) -> Result<(), HarvestError> + 'static,
{
    Box::new(f)
}

fn editor_callback<F>(f: F) -> EditorCallback
where
    F: Fn(&mut ElementEditorContext<'_>) -> EditorUnit + 'static,
{
    Rc::new(f)
}

/// A synthesized element type for one snippet template
pub struct CapabilityDescriptor {
    pub element_type_id: String,
    /// Key of the snippet template
    pub template_name: String,
    pub display_name: LocalizedString,
    pub description: LocalizedString,
    pub category: String,
    pub icon: String,
    /// Whether elements of this type open an editor dialog
    pub has_editor_dialog: bool,
    pub snippet: Rc<SnippetDescriptor>,
    display: DisplayCallback,
    build_editor: EditorCallback,
    apply_editor: EditorCallback,
}

impl CapabilityDescriptor {
    /// Render the snippet into the display context's element shape
    pub fn display(&self, context: &mut ElementDisplayContext) -> Result<(), HarvestError> {
        (self.display)(context)
    }

    pub fn build_editor(&self, context: &mut ElementEditorContext<'_>) -> EditorUnit {
        (self.build_editor)(context)
    }

    /// Apply a submitted editor form and rebuild the editor
    pub fn apply_editor(&self, context: &mut ElementEditorContext<'_>) -> EditorUnit {
        (self.apply_editor)(context)
    }

    /// Plain data view of this descriptor, without its callbacks
    pub fn summary(&self) -> CapabilitySummary {
        CapabilitySummary {
            element_type_id: self.element_type_id.clone(),
            template_name: self.template_name.clone(),
            display_name: self.display_name.text().to_string(),
            description: self.description.text().to_string(),
            category: self.category.clone(),
            icon: self.icon.clone(),
            has_editor_dialog: self.has_editor_dialog,
            snippet: (*self.snippet).clone(),
        }
    }
}

impl fmt::Debug for CapabilityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityDescriptor")
            .field("element_type_id", &self.element_type_id)
            .field("template_name", &self.template_name)
            .field("display_name", &self.display_name)
            .field("category", &self.category)
            .field("has_editor_dialog", &self.has_editor_dialog)
            .field("snippet", &self.snippet)
            .finish_non_exhaustive()
    }
}

/// Serializable view of a [`CapabilityDescriptor`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilitySummary {
    pub element_type_id: String,
    pub template_name: String,
    pub display_name: String,
    pub description: String,
    pub category: String,
    pub icon: String,
    pub has_editor_dialog: bool,
    pub snippet: SnippetDescriptor,
}

/// Turns the current theme's snippet templates into element types
pub struct SnippetHarvester {
    services: HostServices,
    config: HarvestConfig,
}

impl SnippetHarvester {
    pub fn new(services: HostServices, config: HarvestConfig) -> Self {
        Self { services, config }
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Lazily harvest one descriptor per snippet template
    ///
    /// A template that fails to introspect yields an `Err` item and the
    /// harvest moves on to the next template. Nothing is cached: every call
    /// introspects the templates again.
    pub fn harvest_elements(
        &self,
        _context: &HarvestContext,
    ) -> impl Iterator<Item = Result<CapabilityDescriptor, HarvestError>> + '_ {
        let theme = self.services.themes.current_theme_name();
        let bindings = self.services.bindings.lookup(&theme);
        let element = self.services.elements.activate(&self.config.element_type);
        let describer = SnippetDescriber::new(
            Rc::clone(&self.services.units),
            Rc::clone(&self.services.engine),
            self.services.scope.clone(),
        );
        info!(theme = %theme, templates = bindings.len(), "harvesting snippet elements");

        bindings
            .into_values()
            .filter(move |binding| self.config.qualifies(&binding.key))
            .map(move |binding| self.capability(&describer, &element, binding))
    }

    /// Harvest, logging and skipping templates that fail
    pub fn harvest_resilient(&self, context: &HarvestContext) -> Vec<CapabilityDescriptor> {
        self.harvest_elements(context)
            .filter_map(|result| match result {
                Ok(descriptor) => Some(descriptor),
                Err(err) => {
                    warn!(template = err.template(), error = %err, "skipping snippet template");
                    None
                }
            })
            .collect()
    }

    fn capability(
        &self,
        describer: &SnippetDescriber,
        element: &Element,
        binding: Binding,
    ) -> Result<CapabilityDescriptor, HarvestError> {
        let snippet = describer
            .describe(&binding.key, element)
            .map_err(|source| HarvestError::Introspection {
                template: binding.key.clone(),
                source,
            })?;
        let name = display_name(&binding.source, &binding.key, &self.config.suffix);
        debug!(template = %binding.key, name = %name, fields = snippet.fields.len(), "harvested snippet");

        let localizer = &self.services.localizer;
        let display_name = localizer.translate(&name, &[]);
        let description = localizer.translate(DESCRIPTION, &[binding.key.as_str()]);
        let template_name = binding.key.clone();

        let binder = DisplayBinder::new(
            Rc::clone(&self.services.units),
            Rc::clone(&self.services.engine),
            self.services.scope.clone(),
        );
        let display = {
            let snippet = Rc::clone(&snippet);
            display_callback(move |context| {
                binder
                    .attach(context, &binding, &snippet)
                    .map_err(|source| HarvestError::Display {
                        template: binding.key.clone(),
                        source,
                    })
            })
        };

        let form = EditorFormBuilder::new(self.config.editor.clone());
        let editor = {
            let snippet = Rc::clone(&snippet);
            editor_callback(move |context| form.build_or_apply(&snippet, context))
        };

        Ok(CapabilityDescriptor {
            element_type_id: self.config.element_type.clone(),
            template_name,
            display_name,
            description,
            category: element.category.clone(),
            icon: self.config.icon.clone(),
            has_editor_dialog: snippet.has_fields(),
            snippet,
            display,
            build_editor: Rc::clone(&editor),
            apply_editor: editor,
        })
    }
}

/// Derive an element display name from a template's file name
///
/// The file stem is cut at the snippet suffix and split into words:
/// `WelcomeBannerSnippet.snip` becomes `Welcome Banner`. Falls back to the
/// template key, then to the raw key when nothing is left.
pub fn display_name(source: &Path, key: &str, suffix: &str) -> String {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    for candidate in [stem, key] {
        let name = humanize(strip_suffix(candidate, suffix));
        if !name.is_empty() {
            return name;
        }
    }
    key.to_string()
}

/// Split a name into space-separated words, keeping acronyms as written
///
/// Words break at `_`, `-` and spaces, at a lower-to-upper case change, and
/// before the last capital of an acronym run (`HTMLBlock` is `HTML Block`).
/// Words that are not acronyms are title cased.
fn humanize(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut word = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '_' | '-' | ' ') {
            words.extend(take_word(&mut word));
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                words.extend(take_word(&mut word));
            }
        }
        word.push(c);
    }
    words.extend(take_word(&mut word));

    words
        .iter()
        .map(|w| if is_acronym(w) { w.clone() } else { w.to_title_case() })
        .collect::<Vec<_>>()
        .join(" ")
}

fn take_word(word: &mut String) -> Option<String> {
    (!word.is_empty()).then(|| std::mem::take(word))
}

fn is_acronym(word: &str) -> bool {
    word.chars().count() > 1
        && word.chars().any(char::is_uppercase)
        && word.chars().all(|c| c.is_uppercase() || c.is_ascii_digit())
}

/// Cut `name` before the suffix, ignoring ASCII case
///
/// A trailing suffix is preferred; otherwise the first occurrence counts.
fn strip_suffix<'a>(name: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() {
        return name;
    }
    let lower = name.to_ascii_lowercase();
    let suffix = suffix.to_ascii_lowercase();
    if lower.ends_with(&suffix) {
        return &name[..name.len() - suffix.len()];
    }
    match lower.find(&suffix) {
        Some(index) => &name[..index],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::PathBuf;

    use super::*;
    use crate::snippet::{DefaultElementFactory, NullLocalizer};
    use crate::template::{FixedTheme, RenderUnit, Theme, ThemeRegistry, UnitFactory};

    /// Engine that counts introspection renders and declares nothing
    #[derive(Default)]
    struct CountingEngine {
        calls: Cell<usize>,
    }

    impl RenderEngine for CountingEngine {
        fn display(&self, _unit: &mut RenderUnit) -> Result<String, RenderError> {
            self.calls.set(self.calls.get() + 1);
            Ok(String::new())
        }
    }

    fn counting_harvester(engine: Rc<CountingEngine>) -> SnippetHarvester {
        let mut registry = ThemeRegistry::new();
        registry.add_theme(Theme::new("Site")).expect("Should add");
        for key in ["AlphaSnippet", "BetaSnippet", "GammaSnippet"] {
            registry
                .insert_template("Site", key, format!("Site/{}.snip", key), "")
                .expect("Should insert");
        }
        let services = HostServices {
            themes: Rc::new(FixedTheme::new("Site")),
            bindings: Rc::new(registry),
            elements: Rc::new(DefaultElementFactory::new("Snippets")),
            units: Rc::new(UnitFactory),
            engine,
            scope: ThemeScope::new(),
            localizer: Rc::new(NullLocalizer),
        };
        SnippetHarvester::new(services, HarvestConfig::default())
    }

    #[test]
    fn test_harvest_introspects_only_consumed_templates() {
        let engine = Rc::new(CountingEngine::default());
        let harvester = counting_harvester(Rc::clone(&engine));

        let mut elements = harvester.harvest_elements(&HarvestContext::default());
        assert_eq!(engine.calls.get(), 0);

        let first = elements.next().expect("Should yield").expect("Should harvest");
        assert_eq!(first.template_name, "AlphaSnippet");
        assert_eq!(engine.calls.get(), 1);

        assert_eq!(elements.count(), 2);
        assert_eq!(engine.calls.get(), 3);
    }

    #[test]
    fn test_display_name_from_file() {
        let path = PathBuf::from("themes/Contoso/WelcomeBannerSnippet.snip");
        assert_eq!(display_name(&path, "WelcomeBannerSnippet", "Snippet"), "Welcome Banner");
    }

    #[test]
    fn test_display_name_ignores_case() {
        let path = PathBuf::from("footer-linkssnippet.snip");
        assert_eq!(display_name(&path, "footer_linkssnippet", "Snippet"), "Footer Links");
    }

    #[test]
    fn test_display_name_keeps_acronyms() {
        let path = PathBuf::from("FAQSnippet.snip");
        assert_eq!(display_name(&path, "FAQSnippet", "Snippet"), "FAQ");
        let path = PathBuf::from("HTMLBlockSnippet.snip");
        assert_eq!(display_name(&path, "HTMLBlockSnippet", "Snippet"), "HTML Block");
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("WelcomeBanner"), "Welcome Banner");
        assert_eq!(humanize("welcome_banner"), "Welcome Banner");
        assert_eq!(humanize("PageURLList"), "Page URL List");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_display_name_cuts_at_first_occurrence() {
        let path = PathBuf::from("SnippetGallerySnippetOld.snip");
        assert_eq!(
            display_name(&path, "SnippetGallerySnippetOld", "Snippet"),
            "SnippetGallerySnippetOld"
        );
        let path = PathBuf::from("GallerySnippetOld.snip");
        assert_eq!(display_name(&path, "GallerySnippetOld", "Snippet"), "Gallery");
    }

    #[test]
    fn test_display_name_fallbacks() {
        let path = PathBuf::from("Snippet.snip");
        assert_eq!(display_name(&path, "Snippet", "Snippet"), "Snippet");
        let path = PathBuf::from("");
        assert_eq!(display_name(&path, "HeroSnippet", "Snippet"), "Hero");
    }

    #[test]
    fn test_strip_suffix() {
        assert_eq!(strip_suffix("QuoteSnippet", "Snippet"), "Quote");
        assert_eq!(strip_suffix("QuoteSNIPPET", "snippet"), "Quote");
        assert_eq!(strip_suffix("Quote", "Snippet"), "Quote");
        assert_eq!(strip_suffix("Quote", ""), "Quote");
    }
}
