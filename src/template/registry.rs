//! Template bindings and the directory-backed theme registry

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// File extension of snippet templates
pub const TEMPLATE_EXTENSION: &str = "snip";

/// Name of the optional per-theme manifest
pub const THEME_MANIFEST: &str = "theme.toml";

/// Errors that can occur while building a registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid theme manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("duplicate theme definition: {name}")]
    DuplicateTheme { name: String },

    #[error("duplicate template '{key}' in theme {theme}")]
    DuplicateTemplate { theme: String, key: String },

    #[error("theme not found: {name}")]
    ThemeNotFound { name: String },

    #[error("theme {theme} has unknown base theme {base}")]
    UnknownBaseTheme { theme: String, base: String },

    #[error("circular base theme reference detected: {chain}")]
    CircularBaseTheme { chain: String },
}

/// Registry entry for one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Unique template key, e.g. `WelcomeBannerSnippet`
    pub key: String,
    /// File the template was loaded from
    pub source: PathBuf,
    /// Theme that contributed the template
    pub theme: String,
}

/// Bindings visible for one theme, keyed by template key
pub type BindingTable = BTreeMap<String, Binding>;

/// Maps a theme name to the template bindings it can see
pub trait BindingRegistry {
    fn lookup(&self, theme: &str) -> BindingTable;
}

/// Supplies the name of the site's current theme
pub trait ThemeResolver {
    fn current_theme_name(&self) -> String;
}

/// A theme resolver that always answers with the same theme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedTheme(pub String);

impl FixedTheme {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl ThemeResolver for FixedTheme {
    fn current_theme_name(&self) -> String {
        self.0.clone()
    }
}

/// Derive a template key from its file name
///
/// `Elements.Snippet.snip` becomes `Elements_Snippet`.
pub fn template_key(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() {
        return None;
    }
    Some(stem.replace(['.', '-'], "_"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ThemeManifest {
    name: Option<String>,
    description: Option<String>,
    base_theme: Option<String>,
}

#[derive(Debug, Clone)]
struct TemplateSource {
    binding: Binding,
    source: String,
}

/// A theme and the templates it contributes itself
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub description: Option<String>,
    /// Theme whose templates this one inherits and may override
    pub base_theme: Option<String>,
    templates: BTreeMap<String, TemplateSource>,
}

impl Theme {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            base_theme: None,
            templates: BTreeMap::new(),
        }
    }

    pub fn with_base_theme(mut self, base: impl Into<String>) -> Self {
        self.base_theme = Some(base.into());
        self
    }
}

/// Registry of themes and their snippet templates
#[derive(Debug, Default)]
pub struct ThemeRegistry {
    themes: BTreeMap<String, Theme>,
}

impl ThemeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every theme directory below `root`
    ///
    /// Each subdirectory is a theme. Its `*.snip` files, searched
    /// recursively, become template bindings.
    pub fn load(root: &Path) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for dir in sorted_entries(root)? {
            if !dir.is_dir() {
                continue;
            }
            registry.load_theme(&dir)?;
        }
        registry.validate()?;
        Ok(registry)
    }

    fn load_theme(&mut self, dir: &Path) -> Result<(), RegistryError> {
        let manifest_path = dir.join(THEME_MANIFEST);
        let manifest = if manifest_path.is_file() {
            let content =
                std::fs::read_to_string(&manifest_path).map_err(|source| RegistryError::Io {
                    path: manifest_path.clone(),
                    source,
                })?;
            toml::from_str(&content).map_err(|source| RegistryError::Manifest {
                path: manifest_path.clone(),
                source,
            })?
        } else {
            ThemeManifest::default()
        };

        let dir_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut theme = Theme::new(manifest.name.unwrap_or(dir_name));
        theme.description = manifest.description;
        theme.base_theme = manifest.base_theme;
        let name = theme.name.clone();
        self.add_theme(theme)?;

        let mut files = Vec::new();
        collect_templates(dir, &mut files)?;
        for path in files {
            let Some(key) = template_key(&path) else {
                continue;
            };
            let source = std::fs::read_to_string(&path).map_err(|source| RegistryError::Io {
                path: path.clone(),
                source,
            })?;
            self.insert_template(&name, &key, path, source)?;
        }
        debug!(theme = %name, "loaded theme");
        Ok(())
    }

    /// Register a theme with no templates yet
    pub fn add_theme(&mut self, theme: Theme) -> Result<(), RegistryError> {
        if self.themes.contains_key(&theme.name) {
            return Err(RegistryError::DuplicateTheme { name: theme.name });
        }
        self.themes.insert(theme.name.clone(), theme);
        Ok(())
    }

    /// Add a template to a registered theme
    pub fn insert_template(
        &mut self,
        theme: &str,
        key: &str,
        path: impl Into<PathBuf>,
        source: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let entry = self
            .themes
            .get_mut(theme)
            .ok_or_else(|| RegistryError::ThemeNotFound {
                name: theme.to_string(),
            })?;
        if entry.templates.contains_key(key) {
            return Err(RegistryError::DuplicateTemplate {
                theme: theme.to_string(),
                key: key.to_string(),
            });
        }
        let binding = Binding {
            key: key.to_string(),
            source: path.into(),
            theme: theme.to_string(),
        };
        entry.templates.insert(
            key.to_string(),
            TemplateSource {
                binding,
                source: source.into(),
            },
        );
        Ok(())
    }

    /// Check that every base theme exists and no inheritance chain loops
    pub fn validate(&self) -> Result<(), RegistryError> {
        for theme in self.themes.values() {
            let mut seen = vec![theme.name.as_str()];
            let mut current = theme;
            while let Some(base) = &current.base_theme {
                if seen.contains(&base.as_str()) {
                    seen.push(base);
                    return Err(RegistryError::CircularBaseTheme {
                        chain: seen.join(" -> "),
                    });
                }
                current = self
                    .themes
                    .get(base)
                    .ok_or_else(|| RegistryError::UnknownBaseTheme {
                        theme: current.name.clone(),
                        base: base.clone(),
                    })?;
                seen.push(base);
            }
        }
        Ok(())
    }

    pub fn theme(&self, name: &str) -> Option<&Theme> {
        self.themes.get(name)
    }

    /// Get all theme names
    pub fn theme_names(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(|s| s.as_str())
    }

    /// Source text of a bound template
    pub fn source(&self, binding: &Binding) -> Option<&str> {
        self.themes
            .get(&binding.theme)?
            .templates
            .get(&binding.key)
            .map(|t| t.source.as_str())
    }

    /// Theme names from the most basic ancestor down to `theme`
    fn inheritance_chain(&self, theme: &str) -> Vec<&Theme> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut next = self.themes.get(theme);
        while let Some(current) = next {
            if !visited.insert(current.name.as_str()) {
                break;
            }
            chain.push(current);
            next = current
                .base_theme
                .as_deref()
                .and_then(|base| self.themes.get(base));
        }
        chain.reverse();
        chain
    }
}

impl BindingRegistry for ThemeRegistry {
    fn lookup(&self, theme: &str) -> BindingTable {
        let mut table = BindingTable::new();
        // Derived themes come last so their templates replace inherited ones
        for current in self.inheritance_chain(theme) {
            for (key, template) in &current.templates {
                table.insert(key.clone(), template.binding.clone());
            }
        }
        table
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, RegistryError> {
    let io_err = |source| RegistryError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = std::fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    entries.sort();
    Ok(entries)
}

fn collect_templates(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), RegistryError> {
    for path in sorted_entries(dir)? {
        if path.is_dir() {
            collect_templates(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == TEMPLATE_EXTENSION) {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ThemeRegistry {
        let mut registry = ThemeRegistry::new();
        registry.add_theme(Theme::new("Base")).expect("Should add");
        registry
            .add_theme(Theme::new("Contoso").with_base_theme("Base"))
            .expect("Should add");
        registry
            .insert_template("Base", "FooterSnippet", "Base/FooterSnippet.snip", "base footer")
            .expect("Should insert");
        registry
            .insert_template("Base", "Heading", "Base/Heading.snip", "base heading")
            .expect("Should insert");
        registry
            .insert_template("Contoso", "Heading", "Contoso/Heading.snip", "contoso heading")
            .expect("Should insert");
        registry
    }

    #[test]
    fn test_template_key() {
        assert_eq!(
            template_key(Path::new("themes/Base/Elements.Snippet.snip")),
            Some("Elements_Snippet".to_string())
        );
        assert_eq!(
            template_key(Path::new("GreetingSnippet.snip")),
            Some("GreetingSnippet".to_string())
        );
        assert_eq!(
            template_key(Path::new("welcome-banner.snip")),
            Some("welcome_banner".to_string())
        );
    }

    #[test]
    fn test_lookup_merges_base_theme() {
        let registry = registry();
        let table = registry.lookup("Contoso");
        assert_eq!(table.len(), 2);
        assert_eq!(table["FooterSnippet"].theme, "Base");
        assert_eq!(table["Heading"].theme, "Contoso");
        assert_eq!(registry.source(&table["Heading"]), Some("contoso heading"));
    }

    #[test]
    fn test_lookup_base_theme_only() {
        let registry = registry();
        let table = registry.lookup("Base");
        assert_eq!(registry.source(&table["Heading"]), Some("base heading"));
    }

    #[test]
    fn test_lookup_unknown_theme_is_empty() {
        assert!(registry().lookup("Missing").is_empty());
    }

    #[test]
    fn test_duplicate_template_error() {
        let mut registry = registry();
        let result = registry.insert_template("Base", "Heading", "x.snip", "");
        assert!(matches!(result, Err(RegistryError::DuplicateTemplate { .. })));
    }

    #[test]
    fn test_duplicate_theme_error() {
        let mut registry = registry();
        let result = registry.add_theme(Theme::new("Base"));
        assert!(matches!(result, Err(RegistryError::DuplicateTheme { .. })));
    }

    #[test]
    fn test_insert_into_unknown_theme() {
        let mut registry = ThemeRegistry::new();
        let result = registry.insert_template("Nope", "A", "A.snip", "");
        assert!(matches!(result, Err(RegistryError::ThemeNotFound { .. })));
    }

    #[test]
    fn test_unknown_base_theme_error() {
        let mut registry = ThemeRegistry::new();
        registry
            .add_theme(Theme::new("Child").with_base_theme("Ghost"))
            .expect("Should add");
        assert!(matches!(
            registry.validate(),
            Err(RegistryError::UnknownBaseTheme { .. })
        ));
    }

    #[test]
    fn test_circular_base_theme_error() {
        let mut registry = ThemeRegistry::new();
        registry
            .add_theme(Theme::new("A").with_base_theme("B"))
            .expect("Should add");
        registry
            .add_theme(Theme::new("B").with_base_theme("A"))
            .expect("Should add");
        let err = registry.validate().unwrap_err();
        assert!(err.to_string().contains("A -> B -> A"));
        // lookup still terminates on a cyclic registry
        assert!(registry.lookup("A").is_empty());
    }
}
