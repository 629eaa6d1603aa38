//! The name to definition table.

use indexmap::IndexMap;
use smol_str::SmolStr;
use style_parser::{AtRuleBody, DeclarationGroup, DeclarationItem, Statement, Stylesheet, VarDefinition};

/// Every variable defined in a stylesheet, keyed by name.
///
/// Built in a single document-order scan; a later definition of a name
/// replaces the earlier one outright.
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    definitions: IndexMap<SmolStr, VarDefinition>,
}

impl VariableTable {
    /// Builds the table for a stylesheet.
    pub fn collect(stylesheet: &Stylesheet) -> Self {
        let mut table = Self::default();
        table.visit_statements(&stylesheet.statements);
        table
    }

    /// Records a definition, replacing any earlier one with the same name.
    pub fn insert(&mut self, definition: VarDefinition) {
        self.definitions.insert(definition.name.clone(), definition);
    }

    /// Looks up the surviving definition of `name`.
    pub fn get(&self, name: &str) -> Option<&VarDefinition> {
        self.definitions.get(name)
    }

    /// Returns true if `name` is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Iterates definitions in the order their names were first defined.
    pub fn iter(&self) -> impl Iterator<Item = &VarDefinition> {
        self.definitions.values()
    }

    /// Returns the number of distinct names.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if nothing is defined.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn visit_statements(&mut self, statements: &[Statement]) {
        for statement in statements {
            match statement {
                Statement::VarDefinition(definition) => self.insert(definition.clone()),
                Statement::RuleSet(rule) => self.visit_group(&rule.declarations),
                Statement::Nested(nested) => self.visit_statements(&nested.statements),
                Statement::AtRule(rule) => {
                    if let Some(AtRuleBody::Declarations(group)) = &rule.body {
                        self.visit_group(group);
                    }
                }
                Statement::Import(_) | Statement::Comment(_) => {}
            }
        }
    }

    fn visit_group(&mut self, group: &DeclarationGroup) {
        for item in &group.items {
            if let DeclarationItem::VarDefinition(definition) = item {
                self.insert(definition.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use style_parser::{emit_expressions, parse_stylesheet, DefinitionForm};

    fn table(source: &str) -> VariableTable {
        let result = parse_stylesheet("test.css", source);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        VariableTable::collect(&result.stylesheet)
    }

    #[test]
    fn test_both_definition_forms() {
        let table = table("@gap: 4px;\n.a { var-accent: red; color: var(accent); }");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("gap").map(|d| d.form), Some(DefinitionForm::Directive));
        assert_eq!(table.get("accent").map(|d| d.form), Some(DefinitionForm::Property));
    }

    #[test]
    fn test_last_definition_wins() {
        let table = table("@x: 1px solid;\n.a { var-x: blue; }\n@media print { @x: red; }");
        assert_eq!(table.len(), 1);
        let definition = table.get("x").unwrap();
        assert_eq!(emit_expressions(&definition.expression), "red");
    }

    #[test]
    fn test_font_face_definitions() {
        let table = table("@font-face { var-family: Icons; font-family: var(family); }");
        assert!(table.contains("family"));
    }

    #[test]
    fn test_empty_definition_is_recorded() {
        let table = table("@nothing: ;");
        assert!(table.get("nothing").unwrap().expression.terms.is_empty());
    }
}
