//! Collection of the class and id names a stylesheet selects on.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use style_parser::{PseudoArgument, SelectorGroup, SimpleSelector, Statement, Stylesheet};

/// The class and id names referenced by one stylesheet's selectors.
///
/// Names are stored bare, without the leading `.` or `#`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorCatalog {
    /// Class selector names.
    pub classes: FxHashSet<SmolStr>,
    /// Id selector names.
    pub ids: FxHashSet<SmolStr>,
}

impl SelectorCatalog {
    /// Builds the catalog for a stylesheet.
    pub fn collect(stylesheet: &Stylesheet) -> Self {
        let mut catalog = Self::default();
        catalog.visit_statements(&stylesheet.statements);
        catalog
    }

    /// Returns true if `name` is a class selector in the stylesheet.
    pub fn has_class(&self, name: &str) -> bool {
        self.classes.contains(name)
    }

    /// Returns true if `name` is an id selector in the stylesheet.
    pub fn has_id(&self, name: &str) -> bool {
        self.ids.contains(name)
    }

    /// Returns true if the stylesheet selects on no class or id.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.ids.is_empty()
    }

    fn visit_statements(&mut self, statements: &[Statement]) {
        for statement in statements {
            match statement {
                Statement::RuleSet(rule) => self.visit_group(&rule.selectors),
                Statement::Nested(nested) => self.visit_statements(&nested.statements),
                Statement::VarDefinition(_)
                | Statement::Import(_)
                | Statement::AtRule(_)
                | Statement::Comment(_) => {}
            }
        }
    }

    fn visit_group(&mut self, group: &SelectorGroup) {
        for part in group.selectors.iter().flat_map(|s| &s.parts) {
            match &part.simple {
                SimpleSelector::Class(class) => {
                    self.classes.insert(class.name.clone());
                }
                SimpleSelector::Id(id) => {
                    self.ids.insert(id.name.clone());
                }
                SimpleSelector::PseudoClass(pseudo) | SimpleSelector::PseudoElement(pseudo) => {
                    if let Some(PseudoArgument::Selectors(inner)) = &pseudo.argument {
                        self.visit_group(inner);
                    }
                }
                SimpleSelector::Universal(_)
                | SimpleSelector::Element(_)
                | SimpleSelector::Attribute(_) => {}
            }
        }
    }
}
