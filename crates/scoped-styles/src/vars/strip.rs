//! Removal of variable definitions after resolution.

use style_parser::{AtRuleBody, DeclarationGroup, DeclarationItem, Statement, Stylesheet};

/// Removes every variable definition from the stylesheet, at any depth.
///
/// Returns how many definitions were removed. Running it again removes
/// nothing.
pub fn strip_definitions(stylesheet: &mut Stylesheet) -> usize {
    strip_statements(&mut stylesheet.statements)
}

fn strip_statements(statements: &mut Vec<Statement>) -> usize {
    let before = statements.len();
    statements.retain(|s| !matches!(s, Statement::VarDefinition(_)));
    let mut removed = before - statements.len();

    for statement in statements.iter_mut() {
        removed += match statement {
            Statement::RuleSet(rule) => strip_group(&mut rule.declarations),
            Statement::Nested(nested) => strip_statements(&mut nested.statements),
            Statement::AtRule(rule) => match &mut rule.body {
                Some(AtRuleBody::Declarations(group)) => strip_group(group),
                Some(AtRuleBody::Raw(_)) | None => 0,
            },
            Statement::VarDefinition(_) | Statement::Import(_) | Statement::Comment(_) => 0,
        };
    }
    removed
}

fn strip_group(group: &mut DeclarationGroup) -> usize {
    let before = group.items.len();
    group
        .items
        .retain(|item| !matches!(item, DeclarationItem::VarDefinition(_)));
    before - group.items.len()
}
