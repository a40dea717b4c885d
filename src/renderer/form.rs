//! HTML generation from editor units

use crate::snippet::{EditorModel, EditorUnit, SnippetFieldViewModel};

use super::{escape_html, FormConfig};

/// Build form markup incrementally
pub struct FormBuilder {
    config: FormConfig,
    lines: Vec<String>,
    indent: usize,
}

impl FormBuilder {
    pub fn new(config: FormConfig) -> Self {
        Self {
            config,
            lines: vec![],
            indent: 0,
        }
    }

    fn prefix(&self) -> String {
        self.config.class_prefix.clone().unwrap_or_default()
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn push(&mut self, line: String) {
        let line = format!("{}{}", self.indent_str(), line);
        self.lines.push(line);
    }

    fn open(&mut self, line: String) {
        self.push(line);
        self.indent += 1;
    }

    fn close(&mut self, line: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.push(line.to_string());
    }

    /// Add an editor unit and everything below it
    pub fn add_unit(&mut self, unit: &EditorUnit) {
        match &unit.model {
            EditorModel::Snippet(model) => {
                let prefix = self.prefix();
                let position = unit
                    .position
                    .as_deref()
                    .map(|p| format!(r#" data-position="{}""#, escape_html(p)))
                    .unwrap_or_default();
                self.open(format!(
                    r#"<fieldset class="{}fields" data-template="{}"{}>"#,
                    prefix,
                    escape_html(&unit.template_name),
                    position
                ));
                for editor in &model.field_editors {
                    self.add_unit(editor);
                }
                self.close("</fieldset>");
            }
            EditorModel::Field(model) => self.add_field(unit, model),
        }
    }

    fn add_field(&mut self, unit: &EditorUnit, model: &SnippetFieldViewModel) {
        let prefix = self.prefix();
        let field = &model.descriptor;
        let name = input_name(&unit.prefix, &field.name);
        let id = name.replace('.', "_");
        let value = escape_html(model.value.as_deref().unwrap_or_default());

        self.open(format!(
            r#"<div class="{}field {}field-{}" data-template="{}">"#,
            prefix,
            prefix,
            escape_html(&field.field_type.to_ascii_lowercase()),
            escape_html(&unit.template_name)
        ));
        self.push(format!(
            r#"<label for="{}">{}</label>"#,
            escape_html(&id),
            escape_html(field.label())
        ));
        if self.config.is_multiline(&field.field_type) {
            self.push(format!(
                r#"<textarea id="{}" name="{}">{}</textarea>"#,
                escape_html(&id),
                escape_html(&name),
                value
            ));
        } else {
            self.push(format!(
                r#"<input type="text" id="{}" name="{}" value="{}"/>"#,
                escape_html(&id),
                escape_html(&name),
                value
            ));
        }
        if let Some(description) = &field.description {
            self.push(format!(
                r#"<p class="{}hint">{}</p>"#,
                prefix,
                escape_html(description.text())
            ));
        }
        self.close("</div>");
    }

    /// Build the final markup
    pub fn build(self) -> String {
        let separator = if self.config.pretty_print { "\n" } else { "" };
        self.lines.join(separator)
    }
}

/// Form-field name of a snippet field under an editor prefix
fn input_name(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

/// Render an editor unit tree to an HTML form fragment
pub fn render_form(unit: &EditorUnit, config: &FormConfig) -> String {
    let mut builder = FormBuilder::new(config.clone());
    builder.add_unit(unit);
    builder.build()
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::snippet::{
        EditorFormBuilder, EditorTemplates, Element, ElementEditorContext, LocalizedString,
        SnippetDescriptor, SnippetFieldDescriptor,
    };

    fn editor(prefix: &str) -> EditorUnit {
        let descriptor = Rc::new(SnippetDescriptor::new(vec![
            SnippetFieldDescriptor::new("Title")
                .with_display_name(LocalizedString::new("Banner title"))
                .with_description(LocalizedString::new("Shown on top")),
            SnippetFieldDescriptor::new("Body").with_type("Html"),
        ]));
        let mut element = Element::new("Snippet", "Snippets");
        element.data.set("Title", "Fish & \"Chips\"");
        let mut context = ElementEditorContext::new(&mut element, &EditorTemplates).with_prefix(prefix);
        EditorFormBuilder::default().build_or_apply(&descriptor, &mut context)
    }

    #[test]
    fn test_render_form() {
        let html = render_form(&editor("Element"), &FormConfig::default());
        assert_eq!(
            html,
            [
                r#"<fieldset class="snippet-fields" data-template="Elements.Snippet" data-position="Fields:0">"#,
                r#"  <div class="snippet-field snippet-field-text" data-template="Elements.Snippet.Field.Text">"#,
                r#"    <label for="Element_Title">Banner title</label>"#,
                r#"    <input type="text" id="Element_Title" name="Element.Title" value="Fish &amp; &quot;Chips&quot;"/>"#,
                r#"    <p class="snippet-hint">Shown on top</p>"#,
                r#"  </div>"#,
                r#"  <div class="snippet-field snippet-field-html" data-template="Elements.Snippet.Field.Html">"#,
                r#"    <label for="Element_Body">Body</label>"#,
                r#"    <textarea id="Element_Body" name="Element.Body"></textarea>"#,
                r#"  </div>"#,
                r#"</fieldset>"#,
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_compact_output_without_prefix() {
        let config = FormConfig::new().with_pretty_print(false).without_class_prefix();
        let html = render_form(&editor(""), &config);
        assert!(html.starts_with(r#"<fieldset class="fields""#));
        assert!(html.contains(r#"name="Title""#));
        assert!(!html.contains('\n'));
    }
}
