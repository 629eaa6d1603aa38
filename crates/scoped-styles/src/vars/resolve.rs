//! Substitution of variable usages and cycle reporting.

use super::VariableTable;
use crate::message::{MessageCode, Messages};
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use source_map::SourceFile;
use style_parser::{
    AtRuleBody, DeclarationGroup, DeclarationItem, Statement, Stylesheet, Term, VarDefinition,
    VarUsage,
};

/// Where the walk currently is. Passed by value into every recursive call.
#[derive(Debug, Clone, Copy, Default)]
struct Context {
    /// Inside a definition body: usages there are placeholders.
    in_definition: bool,
    /// Inside the chase of another usage: failures propagate to that usage.
    in_usage: bool,
}

/// A usage chase reached a name that was already being chased.
#[derive(Debug, Clone, Copy)]
struct Cycle;

/// Rewrites every variable usage in a stylesheet to the terms it stands for.
///
/// - A defined name is replaced by its definition's terms, fully resolved.
///   The replacement may be longer than one term, or empty.
/// - An undefined name falls back to its default; a default that is itself a
///   usage is chased the same way.
/// - An undefined name without a default is removed.
/// - A usage whose chase runs into a cycle falls back to its default, or is
///   removed.
///
/// Independently of any usage, each variable that takes part in a reference
/// cycle gets one `var cycle detected var-<name>` warning at its definition.
/// Definitions themselves are left untouched.
pub struct VariableResolver<'a> {
    table: &'a VariableTable,
    report_unresolved: bool,
}

impl<'a> VariableResolver<'a> {
    /// Creates a resolver over `table`.
    pub fn new(table: &'a VariableTable) -> Self {
        Self {
            table,
            report_unresolved: false,
        }
    }

    /// Also warn about usages with neither a definition nor a default.
    pub fn report_unresolved(mut self, report: bool) -> Self {
        self.report_unresolved = report;
        self
    }

    /// Resolves all usages in `stylesheet` in place.
    pub fn resolve(&self, stylesheet: &mut Stylesheet, messages: &mut Messages) {
        report_cycles(self.table, &stylesheet.file, messages);

        let mut walk = Walk {
            table: self.table,
            file: stylesheet.file.clone(),
            report_unresolved: self.report_unresolved,
            messages,
        };
        walk.statements(&mut stylesheet.statements, Context::default());
    }
}

struct Walk<'a, 'm> {
    table: &'a VariableTable,
    file: SourceFile,
    report_unresolved: bool,
    messages: &'m mut Messages,
}

impl Walk<'_, '_> {
    fn statements(&mut self, statements: &mut [Statement], ctx: Context) {
        for statement in statements {
            match statement {
                Statement::RuleSet(rule) => self.group(&mut rule.declarations, ctx),
                Statement::VarDefinition(definition) => self.definition(definition, ctx),
                Statement::Nested(nested) => self.statements(&mut nested.statements, ctx),
                Statement::AtRule(rule) => {
                    if let Some(AtRuleBody::Declarations(group)) = &mut rule.body {
                        self.group(group, ctx);
                    }
                }
                Statement::Import(_) | Statement::Comment(_) => {}
            }
        }
    }

    fn group(&mut self, group: &mut DeclarationGroup, ctx: Context) {
        for item in &mut group.items {
            match item {
                DeclarationItem::Declaration(declaration) => {
                    self.top_level(&mut declaration.value.terms, ctx);
                }
                DeclarationItem::VarDefinition(definition) => self.definition(definition, ctx),
            }
        }
    }

    fn definition(&mut self, definition: &mut VarDefinition, ctx: Context) {
        let ctx = Context {
            in_definition: true,
            ..ctx
        };
        self.top_level(&mut definition.expression.terms, ctx);
    }

    fn top_level(&mut self, terms: &mut Vec<Term>, ctx: Context) {
        // Outside a chase every usage absorbs its own cycle.
        let _ = self.terms(terms, ctx, &mut FxHashSet::default());
    }

    /// Splices resolved usages into `terms`.
    fn terms(
        &mut self,
        terms: &mut Vec<Term>,
        ctx: Context,
        chasing: &mut FxHashSet<SmolStr>,
    ) -> Result<(), Cycle> {
        if ctx.in_definition {
            return Ok(());
        }
        let mut i = 0;
        while i < terms.len() {
            let usage = match &mut terms[i] {
                Term::VarUsage(usage) => usage.clone(),
                Term::Function(function) => {
                    self.terms(&mut function.args.terms, ctx, chasing)?;
                    i += 1;
                    continue;
                }
                Term::Literal(_) | Term::Uri(_) | Term::Operator(_) => {
                    i += 1;
                    continue;
                }
            };
            let replacement = self.usage(&usage, ctx, chasing)?;
            let len = replacement.len();
            terms.splice(i..i + 1, replacement);
            i += len;
        }
        Ok(())
    }

    fn usage(
        &mut self,
        usage: &VarUsage,
        ctx: Context,
        chasing: &mut FxHashSet<SmolStr>,
    ) -> Result<Vec<Term>, Cycle> {
        let table = self.table;
        let outcome = match (table.get(&usage.name), usage.default.as_deref()) {
            (Some(definition), default) => match self.chase(definition, chasing) {
                Ok(terms) => Ok(terms),
                Err(cycle) => match default {
                    Some(default) => self.fallback(default, chasing),
                    None => Err(cycle),
                },
            },
            (None, Some(default)) => self.fallback(default, chasing),
            (None, None) => {
                if self.report_unresolved && !ctx.in_usage {
                    self.messages.warn(
                        MessageCode::UnresolvedVar,
                        format!("unresolved variable var-{}", usage.name),
                        &self.file,
                        usage.span,
                    );
                }
                Ok(Vec::new())
            }
        };

        if ctx.in_usage {
            outcome
        } else {
            Ok(outcome.unwrap_or_default())
        }
    }

    /// Resolves a definition's terms with its name marked as being chased.
    fn chase(
        &mut self,
        definition: &VarDefinition,
        chasing: &mut FxHashSet<SmolStr>,
    ) -> Result<Vec<Term>, Cycle> {
        if !chasing.insert(definition.name.clone()) {
            return Err(Cycle);
        }
        let mut terms = definition.expression.terms.clone();
        let result = self.terms(&mut terms, chasing_context(), chasing);
        chasing.remove(&definition.name);
        result.map(|()| terms)
    }

    /// Resolves a usage's default down to terminal terms.
    fn fallback(&mut self, default: &Term, chasing: &mut FxHashSet<SmolStr>) -> Result<Vec<Term>, Cycle> {
        let mut terms = vec![default.clone()];
        self.terms(&mut terms, chasing_context(), chasing)?;
        Ok(terms)
    }
}

fn chasing_context() -> Context {
    Context {
        in_definition: false,
        in_usage: true,
    }
}

/// Warns once for every name that can reach itself through references.
fn report_cycles(table: &VariableTable, file: &SourceFile, messages: &mut Messages) {
    for definition in table.iter() {
        if reaches_itself(table, &definition.name) {
            messages.warn(
                MessageCode::VarCycle,
                format!("var cycle detected var-{}", definition.name),
                file,
                definition.span,
            );
        }
    }
}

fn reaches_itself(table: &VariableTable, start: &SmolStr) -> bool {
    let mut seen: FxHashSet<SmolStr> = FxHashSet::default();
    let mut stack = references(table, start);
    while let Some(name) = stack.pop() {
        if &name == start {
            return true;
        }
        if seen.insert(name.clone()) {
            stack.extend(references(table, &name));
        }
    }
    false
}

/// The names a definition's value leads to.
///
/// An undefined usage leads on to its default when the default is a usage.
fn references(table: &VariableTable, name: &str) -> Vec<SmolStr> {
    let mut names = Vec::new();
    if let Some(definition) = table.get(name) {
        collect_references(table, &definition.expression.terms, &mut names);
    }
    names
}

fn collect_references(table: &VariableTable, terms: &[Term], names: &mut Vec<SmolStr>) {
    for term in terms {
        match term {
            Term::VarUsage(usage) => usage_references(table, usage, names),
            Term::Function(function) => collect_references(table, &function.args.terms, names),
            Term::Literal(_) | Term::Uri(_) | Term::Operator(_) => {}
        }
    }
}

fn usage_references(table: &VariableTable, usage: &VarUsage, names: &mut Vec<SmolStr>) {
    names.push(usage.name.clone());
    if !table.contains(&usage.name) {
        if let Some(Term::VarUsage(default)) = usage.default.as_deref() {
            usage_references(table, default, names);
        }
    }
}
