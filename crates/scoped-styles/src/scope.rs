//! Component scoping: renaming class and id tokens with a per-component prefix.

use crate::catalog::SelectorCatalog;
use style_parser::{Element, PseudoArgument, SelectorGroup, SimpleSelector, Statement, Stylesheet, TemplateNode};

const TRACE_TARGET: &str = "scoped_styles::scope";

/// The scoped form of a class or id token.
pub fn scoped_name(prefix: &str, token: &str) -> String {
    format!("{prefix}_{token}")
}

/// Rewrites `class` and `id` attributes in a component's template.
///
/// Only tokens the component's stylesheet selects on are renamed; every other
/// token is kept verbatim and in place. A renamer without a prefix changes
/// nothing.
#[derive(Debug, Clone)]
pub struct ScopeRenamer<'a> {
    catalog: &'a SelectorCatalog,
    prefix: Option<&'a str>,
    trace: bool,
}

impl<'a> ScopeRenamer<'a> {
    /// Creates a renamer. `prefix` is `None` when scoping is disabled.
    pub fn new(catalog: &'a SelectorCatalog, prefix: Option<&'a str>) -> Self {
        Self {
            catalog,
            prefix,
            trace: false,
        }
    }

    /// Logs each `old -> new` rewrite at debug level.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Renames tokens in `nodes` and all their descendants.
    ///
    /// Returns how many attributes changed.
    pub fn rename(&self, nodes: &mut [TemplateNode]) -> usize {
        let Some(prefix) = self.prefix else {
            return 0;
        };
        nodes
            .iter_mut()
            .map(|node| match node {
                TemplateNode::Element(element) => self.element(element, prefix),
                TemplateNode::Text(_) | TemplateNode::Comment(_) => 0,
            })
            .sum()
    }

    fn element(&self, element: &mut Element, prefix: &str) -> usize {
        let mut changed = 0;
        for attribute in &mut element.attributes {
            let Some(value) = &attribute.value else {
                continue;
            };
            let renamed = if attribute.name.eq_ignore_ascii_case("class") {
                self.class_value(value, prefix)
            } else if attribute.name.eq_ignore_ascii_case("id") && self.catalog.has_id(value) {
                Some(scoped_name(prefix, value))
            } else {
                None
            };
            if let Some(renamed) = renamed {
                if self.trace {
                    log::debug!(target: TRACE_TARGET, "<{}> {}: {} -> {}", element.name, attribute.name, value, renamed);
                }
                attribute.value = Some(renamed);
                changed += 1;
            }
        }
        changed + self.rename(&mut element.children)
    }

    /// Returns the new class list, or `None` if no token is in the catalog.
    fn class_value(&self, value: &str, prefix: &str) -> Option<String> {
        let mut any = false;
        let tokens: Vec<String> = value
            .split_whitespace()
            .map(|token| {
                if self.catalog.has_class(token) {
                    any = true;
                    scoped_name(prefix, token)
                } else {
                    token.to_string()
                }
            })
            .collect();
        any.then(|| tokens.join(" "))
    }
}

/// Renames class and id selectors in the stylesheet to match the template.
///
/// Returns how many simple selectors changed. Does nothing without a prefix.
pub fn rename_selectors(stylesheet: &mut Stylesheet, catalog: &SelectorCatalog, prefix: Option<&str>) -> usize {
    match prefix {
        Some(prefix) => rename_in_statements(&mut stylesheet.statements, catalog, prefix),
        None => 0,
    }
}

fn rename_in_statements(statements: &mut [Statement], catalog: &SelectorCatalog, prefix: &str) -> usize {
    statements
        .iter_mut()
        .map(|statement| match statement {
            Statement::RuleSet(rule) => rename_in_group(&mut rule.selectors, catalog, prefix),
            Statement::Nested(nested) => rename_in_statements(&mut nested.statements, catalog, prefix),
            Statement::VarDefinition(_) | Statement::Import(_) | Statement::AtRule(_) | Statement::Comment(_) => 0,
        })
        .sum()
}

fn rename_in_group(group: &mut SelectorGroup, catalog: &SelectorCatalog, prefix: &str) -> usize {
    let mut changed = 0;
    for part in group.selectors.iter_mut().flat_map(|s| s.parts.iter_mut()) {
        match &mut part.simple {
            SimpleSelector::Class(class) if catalog.has_class(&class.name) => {
                class.name = scoped_name(prefix, &class.name).into();
                changed += 1;
            }
            SimpleSelector::Id(id) if catalog.has_id(&id.name) => {
                id.name = scoped_name(prefix, &id.name).into();
                changed += 1;
            }
            SimpleSelector::PseudoClass(pseudo) | SimpleSelector::PseudoElement(pseudo) => {
                if let Some(PseudoArgument::Selectors(inner)) = &mut pseudo.argument {
                    changed += rename_in_group(inner, catalog, prefix);
                }
            }
            _ => {}
        }
    }
    changed
}
