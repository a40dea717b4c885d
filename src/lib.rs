//! Theme Snippets - editable element types harvested from theme templates
//!
//! A theme contributes a snippet by adding a template whose name ends in
//! `Snippet`. The harvester renders each such template once in introspection
//! mode to find the fields it declares, and turns it into an element type
//! with a display name, an editor form and a display binding.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use theme_snippets::{harvester, Config, HarvestContext, Theme, ThemeRegistry};
//!
//! let mut registry = ThemeRegistry::new();
//! registry.add_theme(Theme::new("Site")).unwrap();
//! registry
//!     .insert_template(
//!         "Site",
//!         "QuoteSnippet",
//!         "Site/QuoteSnippet.snip",
//!         r#"<blockquote>{{ field "Text" }}</blockquote>"#,
//!     )
//!     .unwrap();
//!
//! let config = Config::default().with_current_theme("Site");
//! let harvester = harvester(Rc::new(registry), &config);
//! let elements = harvester.harvest_resilient(&HarvestContext::default());
//!
//! assert_eq!(elements.len(), 1);
//! assert_eq!(elements[0].display_name.text(), "Quote");
//! assert!(elements[0].has_editor_dialog);
//! ```

pub mod config;
pub mod error;
pub mod parser;
pub mod renderer;
pub mod snippet;
pub mod template;

use std::rc::Rc;

pub use config::{Config, ConfigError};
pub use error::ParseError;
pub use renderer::{render_form, FormConfig};
pub use snippet::{
    CapabilityDescriptor, CapabilitySummary, Element, ElementDisplayContext, ElementEditorContext,
    FormValues, HarvestConfig, HarvestContext, HarvestError, HostServices, SnippetDescriptor,
    SnippetHarvester,
};
pub use template::{RegistryError, RenderError, Theme, ThemeRegistry};

use snippet::{Catalog, DefaultElementFactory, TokenTable};
use template::{FixedTheme, TemplateEngine, ThemeScope, UnitFactory};

/// Wire the concrete collaborators for one request
///
/// The current theme comes from the configuration, or is the first theme
/// of the registry when none is configured. The request theme defaults to
/// the current theme.
pub fn host_services(registry: Rc<ThemeRegistry>, config: &Config) -> HostServices {
    let current = config
        .themes
        .current
        .clone()
        .or_else(|| registry.theme_names().next().map(str::to_string))
        .unwrap_or_default();
    let request = config
        .themes
        .request
        .clone()
        .unwrap_or_else(|| current.clone());

    let themes = Rc::new(FixedTheme::new(current));
    let scope = ThemeScope::new();
    let engine = TemplateEngine::new(Rc::clone(&registry), themes.clone(), scope.clone())
        .with_request_theme(request)
        .with_tokenizer(Rc::new(TokenTable::new(config.tokens.clone())));

    HostServices {
        themes,
        bindings: registry,
        elements: Rc::new(DefaultElementFactory::new(config.harvest.category.clone())),
        units: Rc::new(UnitFactory),
        engine: Rc::new(engine),
        scope,
        localizer: Rc::new(Catalog::new(config.strings.clone())),
    }
}

/// Build a harvester over `registry` configured by `config`
pub fn harvester(registry: Rc<ThemeRegistry>, config: &Config) -> SnippetHarvester {
    SnippetHarvester::new(host_services(registry, config), config.harvest.clone())
}
