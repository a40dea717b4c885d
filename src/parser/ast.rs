//! Abstract Syntax Tree types for snippet templates

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Root AST node - a complete snippet template
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    pub nodes: Vec<Spanned<Node>>,
}

impl Template {
    /// Iterate over the field declarations in source order
    pub fn field_decls(&self) -> impl Iterator<Item = &FieldDecl> {
        self.nodes.iter().filter_map(|n| match &n.node {
            Node::Field(decl) => Some(decl),
            _ => None,
        })
    }
}

/// A piece of template body
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text copied to the output
    Text(String),
    /// `{{ field "Name" [..] }}` - declares an input field and outputs its value
    Field(FieldDecl),
    /// `{{ data "Key" }}` - outputs a data value without declaring a field
    Data(Spanned<String>),
    /// `{{ include "Template" }}` - renders another template in place
    Include(Spanned<String>),
}

/// A field declaration with its modifiers
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: Spanned<String>,
    pub modifiers: Vec<Spanned<Modifier>>,
}

impl FieldDecl {
    pub fn name(&self) -> &str {
        &self.name.node
    }

    fn modifier(&self, key: ModifierKey) -> Option<&str> {
        // Last one wins when a modifier is repeated
        self.modifiers
            .iter()
            .rev()
            .find(|m| m.node.key.node == key)
            .map(|m| m.node.value.node.as_str())
    }

    /// The `display:` modifier
    pub fn display(&self) -> Option<&str> {
        self.modifier(ModifierKey::Display)
    }

    /// The `type:` modifier
    pub fn field_type(&self) -> Option<&str> {
        self.modifier(ModifierKey::Type)
    }

    /// The `description:` modifier
    pub fn description(&self) -> Option<&str> {
        self.modifier(ModifierKey::Description)
    }
}

/// `key: "value"` pair inside a field's modifier block
#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    pub key: Spanned<ModifierKey>,
    pub value: Spanned<String>,
}

/// Modifier keys understood by `field`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKey {
    Display,
    Type,
    Description,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spanned<T>(node: T) -> Spanned<T> {
        Spanned::new(node, 0..1)
    }

    fn modifier(key: ModifierKey, value: &str) -> Spanned<Modifier> {
        spanned(Modifier {
            key: spanned(key),
            value: spanned(value.to_string()),
        })
    }

    #[test]
    fn test_field_decl_modifiers() {
        let decl = FieldDecl {
            name: spanned("Title".to_string()),
            modifiers: vec![
                modifier(ModifierKey::Type, "Text"),
                modifier(ModifierKey::Display, "Heading"),
                modifier(ModifierKey::Type, "Html"),
            ],
        };
        assert_eq!(decl.name(), "Title");
        assert_eq!(decl.display(), Some("Heading"));
        assert_eq!(decl.field_type(), Some("Html"));
        assert_eq!(decl.description(), None);
    }

    #[test]
    fn test_template_field_decls_in_order() {
        let field = |name: &str| {
            spanned(Node::Field(FieldDecl {
                name: spanned(name.to_string()),
                modifiers: vec![],
            }))
        };
        let template = Template {
            nodes: vec![
                field("A"),
                spanned(Node::Text("<br>".to_string())),
                spanned(Node::Include(spanned("Footer".to_string()))),
                field("B"),
            ],
        };
        let names: Vec<_> = template.field_decls().map(|d| d.name()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
