//! Parser for component template files.
//!
//! This is a forgiving HTML fragment reader: it keeps text and attribute
//! values raw (no entity decoding), treats `<style>` and `<script>` contents as
//! raw text and closes void elements automatically.

use crate::ast::*;
use crate::error::{ParseError, ParseErrorKind};
use crate::TemplateParse;
use smol_str::SmolStr;
use source_map::{SourceFile, Span};

/// HTML void elements that are self-closing and should not have closing tags.
/// See: https://developer.mozilla.org/en-US/docs/Glossary/Void_element
const HTML_VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is not markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

/// Returns true if the given element name is an HTML void element.
pub fn is_void_element(name: &str) -> bool {
    HTML_VOID_ELEMENTS.contains(&name.to_ascii_lowercase().as_str())
}

fn span(start: usize, end: usize) -> Span {
    Span::from_range(start..end)
}

/// The template parser.
pub struct TemplateParser<'src> {
    source: &'src str,
    pos: usize,
    errors: Vec<ParseError>,
}

impl<'src> TemplateParser<'src> {
    /// Creates a new parser.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            errors: Vec::new(),
        }
    }

    /// Parses the source into a template document belonging to `file`.
    pub fn parse(mut self, file: SourceFile) -> TemplateParse {
        let nodes = self.parse_nodes(false);
        TemplateParse {
            document: TemplateDocument { file, nodes },
            errors: self.errors,
        }
    }

    fn rest(&self) -> &'src str {
        &self.source[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn error(&mut self, kind: ParseErrorKind, start: usize) {
        self.errors
            .push(ParseError::new(kind, span(start, self.pos.max(start))));
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.source.len() - trimmed.len();
    }

    /// Parses sibling nodes until end of input or, inside an element, a closing tag.
    fn parse_nodes(&mut self, in_element: bool) -> Vec<TemplateNode> {
        let mut nodes = Vec::new();
        while !self.at_end() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                nodes.push(self.parse_comment());
            } else if rest.starts_with("</") {
                if in_element {
                    break;
                }
                let start = self.pos;
                let name = self.read_closing_tag();
                self.error(
                    ParseErrorKind::MismatchedClosingTag {
                        expected: String::new(),
                        found: name,
                    },
                    start,
                );
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                let start = self.pos;
                let end = rest.find('>').map_or(rest.len(), |i| i + 1);
                self.pos += end;
                nodes.push(TemplateNode::Text(Text {
                    text: rest[..end].to_string(),
                    span: span(start, self.pos),
                }));
            } else if rest.starts_with('<') && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
                nodes.push(TemplateNode::Element(self.parse_element()));
            } else {
                nodes.push(self.parse_text());
            }
        }
        nodes
    }

    fn parse_text(&mut self) -> TemplateNode {
        let start = self.pos;
        let rest = self.rest();
        // A leading '<' here did not start a tag, so it belongs to the text.
        let first = rest.chars().next().map_or(1, char::len_utf8);
        let end = rest[first..].find('<').map_or(rest.len(), |i| i + first);
        self.pos += end;
        TemplateNode::Text(Text {
            text: rest[..end].to_string(),
            span: span(start, self.pos),
        })
    }

    fn parse_comment(&mut self) -> TemplateNode {
        let start = self.pos;
        let body = &self.rest()[4..];
        let (text, consumed) = match body.find("-->") {
            Some(end) => (&body[..end], 4 + end + 3),
            None => {
                self.pos = self.source.len();
                self.error(
                    ParseErrorKind::UnexpectedEof {
                        expected: "'-->'".to_string(),
                    },
                    start,
                );
                (body, self.source.len() - start)
            }
        };
        self.pos = start + consumed;
        TemplateNode::Comment(Comment {
            text: text.to_string(),
            span: span(start, self.pos),
        })
    }

    fn read_name(&mut self) -> &'src str {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/' || c == '=')
            .unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    /// Consumes `</name>` and returns the name.
    fn read_closing_tag(&mut self) -> String {
        self.pos += 2;
        let name = self.read_name().to_string();
        let rest = self.rest();
        self.pos += rest.find('>').map_or(rest.len(), |i| i + 1);
        name
    }

    fn parse_element(&mut self) -> Element {
        let start = self.pos;
        self.pos += 1;
        let name = SmolStr::new(self.read_name());
        let attributes = self.parse_attributes();

        let explicit_self_close = if self.rest().starts_with("/>") {
            self.pos += 2;
            true
        } else if self.rest().starts_with('>') {
            self.pos += 1;
            false
        } else {
            self.error(
                ParseErrorKind::UnexpectedEof {
                    expected: "'>'".to_string(),
                },
                start,
            );
            return Element {
                name,
                attributes,
                children: Vec::new(),
                self_closing: true,
                span: span(start, self.pos),
            };
        };

        let lower = name.to_ascii_lowercase();
        if explicit_self_close || is_void_element(&lower) {
            return Element {
                name,
                attributes,
                children: Vec::new(),
                self_closing: true,
                span: span(start, self.pos),
            };
        }

        let children = if RAW_TEXT_ELEMENTS.contains(&lower.as_str()) {
            self.parse_raw_text(&lower)
        } else {
            self.parse_nodes(true)
        };

        if self.at_end() {
            self.error(
                ParseErrorKind::UnclosedTag {
                    tag_name: name.to_string(),
                },
                start,
            );
        } else {
            let close_start = self.pos;
            let closing = self.read_closing_tag();
            if !closing.eq_ignore_ascii_case(&name) {
                self.error(
                    ParseErrorKind::MismatchedClosingTag {
                        expected: name.to_string(),
                        found: closing,
                    },
                    close_start,
                );
            }
        }

        Element {
            name,
            attributes,
            children,
            self_closing: false,
            span: span(start, self.pos),
        }
    }

    /// Reads everything up to `</name` as a single text child.
    fn parse_raw_text(&mut self, name: &str) -> Vec<TemplateNode> {
        let start = self.pos;
        let rest = self.rest();
        let closing = format!("</{name}");
        let end = rest
            .to_ascii_lowercase()
            .find(&closing)
            .unwrap_or(rest.len());
        self.pos += end;
        if end == 0 {
            return Vec::new();
        }
        vec![TemplateNode::Text(Text {
            text: rest[..end].to_string(),
            span: span(start, self.pos),
        })]
    }

    fn parse_attributes(&mut self) -> Vec<Attribute> {
        let mut attributes = Vec::new();
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() || rest.starts_with('>') || rest.starts_with("/>") {
                break;
            }

            let start = self.pos;
            let name = self.read_name();
            if name.is_empty() {
                let unexpected = rest.chars().next().unwrap_or_default();
                self.pos += unexpected.len_utf8();
                self.error(
                    ParseErrorKind::InvalidAttribute {
                        message: format!("unexpected character in tag: {unexpected:?}"),
                    },
                    start,
                );
                continue;
            }

            let before_value = self.pos;
            self.skip_whitespace();
            let value = if self.rest().starts_with('=') {
                self.pos += 1;
                self.skip_whitespace();
                Some(self.read_attribute_value(start))
            } else {
                self.pos = before_value;
                None
            };

            attributes.push(Attribute {
                name: SmolStr::new(name),
                value,
                span: span(start, self.pos),
            });
        }
        attributes
    }

    fn read_attribute_value(&mut self, attr_start: usize) -> String {
        let rest = self.rest();
        match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => match rest[1..].find(quote) {
                Some(end) => {
                    self.pos += end + 2;
                    rest[1..end + 1].to_string()
                }
                None => {
                    self.pos = self.source.len();
                    self.error(
                        ParseErrorKind::InvalidAttribute {
                            message: "unterminated attribute value".to_string(),
                        },
                        attr_start,
                    );
                    rest[1..].to_string()
                }
            },
            _ => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                self.pos += end;
                rest[..end].to_string()
            }
        }
    }
}
