//! Localized strings and the localizer seam

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A string that has been passed through a [`Localizer`]
///
/// Keeps the untranslated text as a hint so descriptors stay comparable
/// across locales.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LocalizedString {
    text: String,
    hint: String,
}

impl LocalizedString {
    /// A string with no translation applied
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            hint: text.clone(),
            text,
        }
    }

    pub fn translated(hint: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            hint: hint.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text before translation
    pub fn hint(&self) -> &str {
        &self.hint
    }
}

impl fmt::Display for LocalizedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Translates message templates with positional `{0}`-style arguments
pub trait Localizer {
    fn translate(&self, template: &str, args: &[&str]) -> LocalizedString;
}

/// Substitutes arguments without translating
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLocalizer;

impl Localizer for NullLocalizer {
    fn translate(&self, template: &str, args: &[&str]) -> LocalizedString {
        LocalizedString::translated(template, substitute(template, args))
    }
}

/// Flat string catalog, usually loaded from the `[strings]` config table
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    strings: BTreeMap<String, String>,
}

impl Catalog {
    pub fn new(strings: BTreeMap<String, String>) -> Self {
        Self { strings }
    }
}

impl Localizer for Catalog {
    fn translate(&self, template: &str, args: &[&str]) -> LocalizedString {
        let translated = self
            .strings
            .get(template)
            .map(|s| s.as_str())
            .unwrap_or(template);
        LocalizedString::translated(template, substitute(translated, args))
    }
}

/// Replace `{0}`, `{1}`, ... with the matching argument
///
/// Placeholders without an argument are left as written.
fn substitute(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let arg = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            args.get(index).map(|a| (close, *a))
        });
        match arg {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_localizer_substitutes() {
        let s = NullLocalizer.translate("Renders the {0} template.", &["QuoteSnippet"]);
        assert_eq!(s.text(), "Renders the QuoteSnippet template.");
        assert_eq!(s.hint(), "Renders the {0} template.");
    }

    #[test]
    fn test_substitute_leaves_unknown_placeholders() {
        assert_eq!(substitute("{0} and {1} {x}", &["a"]), "a and {1} {x}");
        assert_eq!(substitute("{", &[]), "{");
    }

    #[test]
    fn test_catalog_translates_known_strings() {
        let catalog = Catalog::new(BTreeMap::from([(
            "Welcome Banner".to_string(),
            "Welkomstbanner".to_string(),
        )]));
        let s = catalog.translate("Welcome Banner", &[]);
        assert_eq!(s.to_string(), "Welkomstbanner");
        assert_eq!(s.hint(), "Welcome Banner");
        assert_eq!(catalog.translate("Quote", &[]).text(), "Quote");
    }
}
