//! Render engine for snippet templates
//!
//! One entry point, [`RenderEngine::display`], serves both passes. The
//! unit's [`RenderMode`] decides whether `field` tags declare themselves on
//! the unit's channel or print their values.

use std::path::PathBuf;
use std::rc::Rc;

use thiserror::Error;
use tracing::trace;

use crate::error::ParseError;
use crate::parser::{parse, FieldDecl, Node};
use crate::renderer::escape_html;
use crate::snippet::{
    LocalizedString, SnippetFieldDescriptor, TokenTable, Tokenizer, DEFAULT_FIELD_TYPE,
};

use super::registry::{BindingRegistry, BindingTable, ThemeRegistry, ThemeResolver};
use super::scope::ThemeScope;
use super::unit::{RenderMode, RenderUnit};

/// Field type whose values are written without escaping
pub const HTML_FIELD_TYPE: &str = "Html";

/// Errors that can occur while rendering a template
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template not found: {template} (theme {theme})")]
    TemplateNotFound { template: String, theme: String },

    #[error("syntax errors in {path}: {}", format_parse_errors(.errors))]
    Parse {
        template: String,
        path: PathBuf,
        source_text: String,
        errors: Vec<ParseError>,
    },

    #[error("circular template include detected: {chain}")]
    CircularInclude { chain: String },
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl RenderError {
    /// Human-readable report, with source excerpts for syntax errors
    pub fn report(&self) -> String {
        match self {
            RenderError::Parse {
                path,
                source_text,
                errors,
                ..
            } => {
                let filename = path.display().to_string();
                errors
                    .iter()
                    .map(|e| e.format(source_text, &filename))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            other => other.to_string(),
        }
    }
}

/// Executes a render unit and returns its output
pub trait RenderEngine {
    fn display(&self, unit: &mut RenderUnit) -> Result<String, RenderError>;
}

/// Renders snippet templates from a [`ThemeRegistry`]
pub struct TemplateEngine {
    registry: Rc<ThemeRegistry>,
    themes: Rc<dyn ThemeResolver>,
    /// Theme used while the theme scope is off
    request_theme: String,
    scope: ThemeScope,
    tokenizer: Rc<dyn Tokenizer>,
}

/// Per-call state threaded through nested includes
struct RenderState {
    theme: String,
    bindings: BindingTable,
    resolving: Vec<String>,
    out: String,
}

impl TemplateEngine {
    /// Create an engine whose request theme is the current site theme
    pub fn new(registry: Rc<ThemeRegistry>, themes: Rc<dyn ThemeResolver>, scope: ThemeScope) -> Self {
        Self {
            request_theme: themes.current_theme_name(),
            registry,
            themes,
            scope,
            tokenizer: Rc::new(TokenTable::default()),
        }
    }

    /// Set the theme used for resolution outside the theme scope
    pub fn with_request_theme(mut self, theme: impl Into<String>) -> Self {
        self.request_theme = theme.into();
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: Rc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Theme that template keys resolve against right now
    pub fn active_theme(&self) -> String {
        if self.scope.is_enabled() {
            self.themes.current_theme_name()
        } else {
            self.request_theme.clone()
        }
    }

    fn render_template(
        &self,
        key: &str,
        unit: &mut RenderUnit,
        state: &mut RenderState,
    ) -> Result<(), RenderError> {
        if state.resolving.iter().any(|k| k == key) {
            let mut chain = state.resolving.clone();
            chain.push(key.to_string());
            return Err(RenderError::CircularInclude {
                chain: chain.join(" -> "),
            });
        }

        let binding = state
            .bindings
            .get(key)
            .ok_or_else(|| RenderError::TemplateNotFound {
                template: key.to_string(),
                theme: state.theme.clone(),
            })?;
        let source = self
            .registry
            .source(binding)
            .ok_or_else(|| RenderError::TemplateNotFound {
                template: key.to_string(),
                theme: binding.theme.clone(),
            })?;
        let template = parse(source).map_err(|errors| RenderError::Parse {
            template: key.to_string(),
            path: binding.source.clone(),
            source_text: source.to_string(),
            errors,
        })?;
        trace!(template = key, theme = %binding.theme, "rendering template");

        state.resolving.push(key.to_string());
        for node in &template.nodes {
            match &node.node {
                Node::Text(text) => state.out.push_str(text),
                Node::Field(decl) => self.render_field(decl, unit, &mut state.out),
                Node::Data(name) => {
                    let value = self.element_value(unit, &name.node);
                    state.out.push_str(&escape_html(&value));
                }
                Node::Include(name) => self.render_template(&name.node, unit, state)?,
            }
        }
        state.resolving.pop();
        Ok(())
    }

    fn render_field(&self, decl: &FieldDecl, unit: &mut RenderUnit, out: &mut String) {
        match unit.mode() {
            RenderMode::Introspect => {
                if let Some(channel) = unit.registration.as_mut() {
                    channel.declare(field_descriptor(decl));
                }
            }
            RenderMode::Display => {
                let value = self.element_value(unit, decl.name());
                let is_html = decl
                    .field_type()
                    .is_some_and(|t| t.eq_ignore_ascii_case(HTML_FIELD_TYPE));
                if is_html {
                    out.push_str(&value);
                } else {
                    out.push_str(&escape_html(&value));
                }
            }
        }
    }

    /// Tokenized data value of the unit's element, empty when unset
    fn element_value(&self, unit: &RenderUnit, name: &str) -> String {
        let element = unit.element.as_ref();
        element
            .and_then(|e| e.data.get(name))
            .map(|value| self.tokenizer.replace(value, element))
            .unwrap_or_default()
    }
}

impl RenderEngine for TemplateEngine {
    fn display(&self, unit: &mut RenderUnit) -> Result<String, RenderError> {
        let theme = self.active_theme();
        let mut state = RenderState {
            bindings: self.registry.lookup(&theme),
            theme,
            resolving: Vec::new(),
            out: String::new(),
        };
        let key = unit.template.clone();
        self.render_template(&key, unit, &mut state)?;
        Ok(state.out)
    }
}

/// Build the descriptor a `field` tag declares
fn field_descriptor(decl: &FieldDecl) -> SnippetFieldDescriptor {
    let mut field = SnippetFieldDescriptor::new(decl.name())
        .with_type(decl.field_type().unwrap_or(DEFAULT_FIELD_TYPE));
    if let Some(display) = decl.display() {
        field = field.with_display_name(LocalizedString::new(display));
    }
    if let Some(description) = decl.description() {
        field = field.with_description(LocalizedString::new(description));
    }
    field
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snippet::Element;
    use crate::template::registry::{FixedTheme, Theme};
    use crate::template::unit::FieldChannel;

    fn registry() -> Rc<ThemeRegistry> {
        let mut registry = ThemeRegistry::new();
        registry.add_theme(Theme::new("Site")).expect("Should add");
        registry.add_theme(Theme::new("Admin")).expect("Should add");
        for (key, source) in [
            (
                "GreetingSnippet",
                r#"<h1>{{ field "Title" [type: "Text"] }}</h1>{{ include "Body" }}"#,
            ),
            ("Body", r#"<div>{{ field "Body" [type: "Html"] }}</div>"#),
            ("Loop", r#"{{ include "Loop" }}"#),
            ("Broken", r#"{{ field "#),
            ("Info", r#"{{ data "Note" }}"#),
            ("Lower", r#"{{ field "Body" [type: "html"] }}|{{ field "Note" [type: "Text"] }}"#),
        ] {
            registry
                .insert_template("Site", key, format!("Site/{}.snip", key), source)
                .expect("Should insert");
        }
        registry
            .insert_template("Admin", "Body", "Admin/Body.snip", "admin body")
            .expect("Should insert");
        Rc::new(registry)
    }

    fn engine(scope: &ThemeScope) -> TemplateEngine {
        TemplateEngine::new(registry(), Rc::new(FixedTheme::new("Site")), scope.clone())
            .with_request_theme("Admin")
    }

    fn unit(template: &str) -> RenderUnit {
        let mut element = Element::new("Snippet", "Snippets");
        element.data.set("Title", "Fish & Chips");
        element.data.set("Body", "<b>{Element.Type}</b>");
        element.data.set("Note", "<i>");
        RenderUnit::new(template).with_element(element)
    }

    #[test]
    fn test_display_renders_values() {
        let scope = ThemeScope::new();
        let engine = engine(&scope);
        let _guard = scope.enable();
        let output = engine.display(&mut unit("GreetingSnippet")).expect("Should render");
        assert_eq!(output, "<h1>Fish &amp; Chips</h1><div><b>Snippet</b></div>");
    }

    #[test]
    fn test_introspection_declares_fields_without_values() {
        let scope = ThemeScope::new();
        let engine = engine(&scope);
        let _guard = scope.enable();
        let mut unit = unit("GreetingSnippet");
        unit.registration = Some(FieldChannel::new());
        let output = engine.display(&mut unit).expect("Should render");
        assert_eq!(output, "<h1></h1><div></div>");
        let fields = unit.registration.take().expect("channel").into_fields();
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Title", "Body"]);
        assert_eq!(fields[1].field_type, "Html");
    }

    #[test]
    fn test_resolution_outside_scope_uses_request_theme() {
        let scope = ThemeScope::new();
        let engine = engine(&scope);
        assert_eq!(engine.active_theme(), "Admin");
        let err = engine.display(&mut unit("GreetingSnippet")).unwrap_err();
        assert!(matches!(err, RenderError::TemplateNotFound { ref theme, .. } if theme == "Admin"));
        assert_eq!(engine.display(&mut unit("Body")).expect("Should render"), "admin body");
    }

    #[test]
    fn test_html_type_ignores_case() {
        let scope = ThemeScope::new();
        let engine = engine(&scope);
        let _guard = scope.enable();
        assert_eq!(
            engine.display(&mut unit("Lower")).expect("Should render"),
            "<b>Snippet</b>|&lt;i&gt;"
        );
    }

    #[test]
    fn test_data_tag_escapes() {
        let scope = ThemeScope::new();
        let engine = engine(&scope);
        let _guard = scope.enable();
        assert_eq!(engine.display(&mut unit("Info")).expect("Should render"), "&lt;i&gt;");
    }

    #[test]
    fn test_circular_include() {
        let scope = ThemeScope::new();
        let engine = engine(&scope);
        let _guard = scope.enable();
        let err = engine.display(&mut unit("Loop")).unwrap_err();
        assert!(err.to_string().contains("Loop -> Loop"));
    }

    #[test]
    fn test_parse_error_report() {
        let scope = ThemeScope::new();
        let engine = engine(&scope);
        let _guard = scope.enable();
        let err = engine.display(&mut unit("Broken")).unwrap_err();
        assert!(matches!(err, RenderError::Parse { .. }));
        assert!(err.report().contains("Site/Broken.snip"));
    }

    #[test]
    fn test_missing_values_render_empty() {
        let scope = ThemeScope::new();
        let engine = engine(&scope);
        let _guard = scope.enable();
        let mut unit = RenderUnit::new("GreetingSnippet");
        assert_eq!(engine.display(&mut unit).expect("Should render"), "<h1></h1><div></div>");
    }
}
