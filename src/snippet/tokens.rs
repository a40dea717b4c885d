//! Token replacement for displayed snippet values
//!
//! Field values may contain `{Token.Name}` markers. They are replaced when a
//! snippet is displayed, never when it is edited, so authors keep the marker
//! in the stored value.

use std::collections::BTreeMap;

use super::element::Element;

/// Replaces token markers in display output
pub trait Tokenizer {
    fn replace(&self, text: &str, element: Option<&Element>) -> String;
}

/// Token values from configuration plus the built-in element tokens
///
/// Built-ins: `{Element.Type}`, `{Element.Category}` and
/// `{Element.Data.<Key>}`. Unknown tokens are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    values: BTreeMap<String, String>,
}

impl TokenTable {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn with_token(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    fn resolve(&self, name: &str, element: Option<&Element>) -> Option<String> {
        if let Some(value) = self.values.get(name) {
            return Some(value.clone());
        }
        let element = element?;
        match name {
            "Element.Type" => Some(element.type_id.clone()),
            "Element.Category" => Some(element.category.clone()),
            _ => name
                .strip_prefix("Element.Data.")
                .and_then(|key| element.data.get(key))
                .map(str::to_string),
        }
    }
}

fn is_token_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
}

impl Tokenizer for TokenTable {
    fn replace(&self, text: &str, element: Option<&Element>) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let resolved = after.find('}').and_then(|close| {
                let name = &after[..close];
                if !is_token_name(name) {
                    return None;
                }
                self.resolve(name, element).map(|value| (close, value))
            });
            match resolved {
                Some((close, value)) => {
                    out.push_str(&value);
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
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element() -> Element {
        let mut element = Element::new("Snippet", "Snippets");
        element.data.set("Title", "Hello");
        element
    }

    #[test]
    fn test_configured_tokens() {
        let tokens = TokenTable::default().with_token("Site.Name", "Contoso");
        assert_eq!(
            tokens.replace("Welcome to {Site.Name}!", None),
            "Welcome to Contoso!"
        );
    }

    #[test]
    fn test_element_tokens() {
        let tokens = TokenTable::default();
        let element = element();
        assert_eq!(
            tokens.replace("{Element.Type}/{Element.Category}: {Element.Data.Title}", Some(&element)),
            "Snippet/Snippets: Hello"
        );
    }

    #[test]
    fn test_unknown_tokens_untouched() {
        let tokens = TokenTable::default();
        assert_eq!(
            tokens.replace("{Unknown} {Element.Type} { x } {", None),
            "{Unknown} {Element.Type} { x } {"
        );
    }
}
