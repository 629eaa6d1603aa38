//! Component definitions found in template files.
//!
//! A component is an `<element name="x-foo">` definition. Its `<style>`
//! children hold the component's stylesheet; everything else is its template.

use crate::message::Messages;
use smol_str::SmolStr;
use source_map::{SourceFile, Span};
use style_parser::{parse_embedded_stylesheet, Element, Stylesheet, TemplateDocument, TemplateNode};

/// The element that introduces a component definition.
pub const DEFINITION_ELEMENT: &str = "element";

/// One component definition.
#[derive(Debug, Clone)]
pub struct Component {
    /// The custom element name, used as the scoping prefix.
    pub tag_name: SmolStr,
    /// Stylesheets in document order. Only the first one is compiled.
    pub stylesheets: Vec<Stylesheet>,
    /// The definition's children, minus its `<style>` elements.
    pub template: Vec<TemplateNode>,
    /// The span of the definition element.
    pub span: Span,
}

/// Returns true for `<element name="...">`.
pub fn is_definition(element: &Element) -> bool {
    element.name.eq_ignore_ascii_case(DEFINITION_ELEMENT) && element.attribute("name").is_some()
}

/// Finds every component definition in the document, without modifying it.
///
/// Definitions nested inside another definition's template belong to that
/// template and are not returned. Stylesheet parse errors are forwarded to
/// `messages`.
pub fn extract_components(document: &TemplateDocument, messages: &mut Messages) -> Vec<Component> {
    let mut components = Vec::new();
    visit(&document.nodes, &mut |element| {
        let mut definition = element.clone();
        if let Some(component) = take_component(&mut definition, &document.file, messages) {
            components.push(component);
        }
    });
    components
}

fn visit(nodes: &[TemplateNode], found: &mut impl FnMut(&Element)) {
    for node in nodes {
        if let TemplateNode::Element(element) = node {
            if is_definition(element) {
                found(element);
            } else {
                visit(&element.children, found);
            }
        }
    }
}

/// Moves a definition's children out into a [`Component`], parsing its
/// `<style>` elements. `element` is left without children.
pub(crate) fn take_component(
    element: &mut Element,
    file: &SourceFile,
    messages: &mut Messages,
) -> Option<Component> {
    let tag_name = SmolStr::new(element.attribute("name")?);
    let (styles, template): (Vec<_>, Vec<_>) = std::mem::take(&mut element.children)
        .into_iter()
        .partition(is_style_element);

    let stylesheets = styles
        .iter()
        .filter_map(|node| match node {
            TemplateNode::Element(style) => Some(parse_style(style, file, messages)),
            TemplateNode::Text(_) | TemplateNode::Comment(_) => None,
        })
        .collect();

    Some(Component {
        tag_name,
        stylesheets,
        template,
        span: element.span,
    })
}

fn is_style_element(node: &TemplateNode) -> bool {
    matches!(node, TemplateNode::Element(element) if element.name.eq_ignore_ascii_case("style"))
}

fn parse_style(style: &Element, file: &SourceFile, messages: &mut Messages) -> Stylesheet {
    let (text, offset) = match style.children.first() {
        Some(TemplateNode::Text(text)) => (text.text.as_str(), text.span.start),
        _ => ("", style.span.end),
    };
    let result = parse_embedded_stylesheet(text, file.clone(), offset);
    messages.forward_parse_errors(&result.errors, file);
    result.stylesheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageCode;
    use style_parser::{emit_template, parse_template};

    #[test]
    fn test_extracts_definitions() {
        let source = r#"<html><body>
<element name="x-foo"><style>.main { color: red; }</style><div class="main"></div></element>
<element name="x-bar"><p>no styles</p></element>
</body></html>"#;
        let document = parse_template("page.html", source).document;
        let mut messages = Messages::new();
        let components = extract_components(&document, &mut messages);

        assert!(messages.is_empty());
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].tag_name, "x-foo");
        assert_eq!(components[0].stylesheets.len(), 1);
        assert_eq!(emit_template(&components[0].template), r#"<div class="main"></div>"#);
        assert!(components[1].stylesheets.is_empty());
    }

    #[test]
    fn test_stylesheet_spans_point_into_template() {
        let source = "<element name=\"x-foo\">\n<style>\n.a { color red; }\n</style></element>";
        let document = parse_template("page.html", source).document;
        let mut messages = Messages::new();
        let components = extract_components(&document, &mut messages);

        assert_eq!(components[0].stylesheets[0].statements.len(), 1);
        assert_eq!(messages.len(), 1);
        let message = messages.iter().next().unwrap();
        assert_eq!(message.code, MessageCode::ParseWarning);
        assert_eq!(message.location.source, "page.html");
        assert_eq!(message.location.line, 3);
    }

    #[test]
    fn test_every_style_element_is_parsed() {
        let source = r#"<element name="x-foo"><style>.a{}</style><style>.b{}</style></element>"#;
        let document = parse_template("page.html", source).document;
        let components = extract_components(&document, &mut Messages::new());
        assert_eq!(components[0].stylesheets.len(), 2);
        assert!(components[0].template.is_empty());
    }

    #[test]
    fn test_element_without_name_is_not_a_definition() {
        let document = parse_template("page.html", "<element><style>.a{}</style></element>").document;
        assert!(extract_components(&document, &mut Messages::new()).is_empty());
    }
}
