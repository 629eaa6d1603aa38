//! Component-scoped stylesheet compiler.
//!
//! This crate runs the passes that turn a component's stylesheet and template
//! into scoped output:
//! - [`SelectorCatalog`]: class and id names the stylesheet selects on
//! - [`VariableTable`] and [`VariableResolver`]: `@name:` / `var-name:`
//!   definitions substituted into `var()` usages, with cycle warnings
//! - [`strip_definitions`]: definitions removed from the emitted CSS
//! - [`UrlRewriter`]: relative `url()` references relocated to the output
//! - [`collect_imports`]: `@import` dependencies
//! - [`ScopeRenamer`] and [`rename_selectors`]: `<prefix>_<name>` scoping
//! - [`SelectorTable`]: the original to scoped mapping for code generators
//!
//! Problems are never fatal; they are collected as warnings in [`Messages`].
//!
//! # Example
//!
//! ```
//! use scoped_styles::{compile_document, Messages, Paths, PipelineOptions};
//! use style_parser::{emit_template, parse_template, EmitOptions};
//!
//! let source = r#"<element name="x-foo"><style>
//! @accent: red;
//! .main { color: var(accent); }
//! </style><div class="main external"></div></element>"#;
//!
//! let mut document = parse_template("x-foo.html", source).document;
//! let options = PipelineOptions::default().with_emit(EmitOptions::compact());
//! let paths = Paths::new("x-foo.html", "x-foo.css");
//! let mut messages = Messages::new();
//!
//! let compiled = compile_document(&mut document, &options, &paths, &mut messages);
//! assert!(messages.is_empty());
//! assert_eq!(compiled[0].css, ".x-foo_main { color: red; }");
//! assert_eq!(
//!     emit_template(&document.nodes),
//!     r#"<element name="x-foo"><div class="x-foo_main external"></div></element>"#
//! );
//! ```

mod catalog;
mod component;
mod imports;
mod message;
mod paths;
mod pipeline;
mod scope;
mod selector_table;
mod urls;
mod vars;

pub use catalog::SelectorCatalog;
pub use component::{extract_components, is_definition, Component, DEFINITION_ELEMENT};
pub use imports::{collect_imports, UrlInfo};
pub use message::{Message, MessageCode, Messages, Severity};
pub use paths::normalize as normalize_path;
pub use pipeline::{compile_component, compile_document, CompiledComponent, Paths, PipelineOptions};
pub use scope::{rename_selectors, scoped_name, ScopeRenamer};
pub use selector_table::SelectorTable;
pub use urls::UrlRewriter;
pub use vars::{strip_definitions, VariableResolver, VariableTable};
