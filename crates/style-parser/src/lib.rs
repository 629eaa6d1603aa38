//! Stylesheet and template parser for scoped-styles.
//!
//! This crate provides:
//! - A stylesheet lexer using `logos`
//! - A recursive descent stylesheet parser with `@name:` / `var-name:`
//!   variable definitions and `var(name, default)` usages
//! - A forgiving parser for component template files
//! - An emitter that writes both back to text
//!
//! # Example
//!
//! ```
//! use style_parser::{emit_stylesheet, parse_stylesheet, EmitOptions};
//!
//! let result = parse_stylesheet("button.css", "@accent: red;\n.button { color: var(accent); }");
//! assert!(result.errors.is_empty());
//!
//! let css = emit_stylesheet(&result.stylesheet, &EmitOptions::compact());
//! assert_eq!(css, "@accent: red;\n.button { color: var(accent); }");
//! ```

mod ast;
mod emit;
mod error;
mod lexer;
mod parser;
mod template;

pub use ast::*;
pub use emit::{emit_expressions, emit_selector_group, emit_stylesheet, emit_template, EmitOptions};
pub use error::{ParseError, ParseErrorKind};
pub use lexer::{Lexer, Token, TokenKind};
pub use source_map::Span;
pub use template::is_void_element;

use source_map::SourceFile;
use text_size::TextSize;

/// Options for parsing stylesheets.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Offset of the stylesheet text within its file. Non-zero for
    /// stylesheets embedded in a template.
    pub offset: TextSize,
}

/// The result of parsing a stylesheet.
#[derive(Debug)]
pub struct StylesheetParse {
    /// The parsed stylesheet.
    pub stylesheet: Stylesheet,
    /// Any errors encountered during parsing.
    pub errors: Vec<ParseError>,
}

/// The result of parsing a template file.
#[derive(Debug)]
pub struct TemplateParse {
    /// The parsed document.
    pub document: TemplateDocument,
    /// Any errors encountered during parsing.
    pub errors: Vec<ParseError>,
}

/// Parses a standalone stylesheet.
///
/// Parsing recovers from errors where possible, returning both the tree and
/// any errors encountered.
pub fn parse_stylesheet(name: &str, source: &str) -> StylesheetParse {
    parse_stylesheet_with_options(source, SourceFile::new(name, source), ParseOptions::default())
}

/// Parses stylesheet text that starts `offset` bytes into `file`.
pub fn parse_embedded_stylesheet(source: &str, file: SourceFile, offset: TextSize) -> StylesheetParse {
    parse_stylesheet_with_options(source, file, ParseOptions { offset })
}

/// Parses a stylesheet with custom options.
pub fn parse_stylesheet_with_options(
    source: &str,
    file: SourceFile,
    options: ParseOptions,
) -> StylesheetParse {
    parser::Parser::new(source, options).parse(file)
}

/// Parses a component template file.
pub fn parse_template(name: &str, source: &str) -> TemplateParse {
    template::TemplateParser::new(source).parse(SourceFile::new(name, source))
}
