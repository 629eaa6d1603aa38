//! Serialization of stylesheets and templates back to text.

use crate::ast::*;
use crate::template::is_void_element;

/// Options for stylesheet emission.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// One declaration per line with two-space indentation. When false, each
    /// top-level statement is written on a single line.
    pub pretty: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl EmitOptions {
    /// Options for single-line-per-rule output.
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

/// Serializes a stylesheet.
pub fn emit_stylesheet(stylesheet: &Stylesheet, options: &EmitOptions) -> String {
    let mut emitter = CssEmitter {
        out: String::new(),
        pretty: options.pretty,
        depth: 0,
    };
    emitter.statements(&stylesheet.statements);
    emitter.out
}

/// Serializes a selector list.
pub fn emit_selector_group(group: &SelectorGroup) -> String {
    let mut out = String::new();
    write_selector_group(&mut out, group);
    out
}

/// Serializes a value.
pub fn emit_expressions(expressions: &Expressions) -> String {
    let mut out = String::new();
    write_terms(&mut out, &expressions.terms);
    out
}

struct CssEmitter {
    out: String,
    pretty: bool,
    depth: usize,
}

impl CssEmitter {
    /// Starts a line (pretty) or separates items within a block (compact).
    fn line(&mut self) {
        if self.pretty {
            if !self.out.is_empty() {
                self.out.push('\n');
            }
            for _ in 0..self.depth {
                self.out.push_str("  ");
            }
        } else if !self.out.is_empty() {
            self.out.push(' ');
        }
    }

    fn statements(&mut self, statements: &[Statement]) {
        for statement in statements {
            if !self.pretty && self.depth == 0 && !self.out.is_empty() {
                self.out.push('\n');
            } else {
                self.line();
            }
            self.statement(statement);
        }
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::RuleSet(rule) => {
                write_selector_group(&mut self.out, &rule.selectors);
                self.block(&rule.declarations);
            }
            Statement::VarDefinition(def) => write_definition(&mut self.out, def),
            Statement::Import(import) => {
                self.out.push_str("@import \"");
                self.out.push_str(&import.url);
                self.out.push('"');
                if let Some(media) = &import.media {
                    self.out.push(' ');
                    self.out.push_str(media);
                }
                self.out.push(';');
            }
            Statement::Nested(nested) => {
                self.at_keyword(&nested.name, &nested.prelude);
                self.out.push_str(" {");
                self.depth += 1;
                self.statements(&nested.statements);
                self.depth -= 1;
                self.line();
                self.out.push('}');
            }
            Statement::AtRule(rule) => {
                self.at_keyword(&rule.name, &rule.prelude);
                match &rule.body {
                    None => self.out.push(';'),
                    Some(AtRuleBody::Declarations(group)) => self.block(group),
                    Some(AtRuleBody::Raw(raw)) => {
                        self.out.push_str(" { ");
                        self.out.push_str(raw);
                        self.out.push_str(" }");
                    }
                }
            }
            Statement::Comment(comment) => {
                self.out.push_str("/*");
                self.out.push_str(&comment.text);
                self.out.push_str("*/");
            }
        }
    }

    fn at_keyword(&mut self, name: &str, prelude: &str) {
        self.out.push('@');
        self.out.push_str(name);
        if !prelude.is_empty() {
            self.out.push(' ');
            self.out.push_str(prelude);
        }
    }

    fn block(&mut self, group: &DeclarationGroup) {
        self.out.push_str(" {");
        self.depth += 1;
        for item in &group.items {
            // A declaration whose value resolved to nothing has no valid CSS form.
            if matches!(item, DeclarationItem::Declaration(decl) if decl.value.terms.is_empty()) {
                continue;
            }
            self.line();
            match item {
                DeclarationItem::Declaration(decl) => {
                    self.out.push_str(&decl.property);
                    self.out.push_str(": ");
                    write_terms(&mut self.out, &decl.value.terms);
                    if decl.important {
                        self.out.push_str(" !important");
                    }
                    self.out.push(';');
                }
                DeclarationItem::VarDefinition(def) => write_definition(&mut self.out, def),
            }
        }
        self.depth -= 1;
        self.line();
        self.out.push('}');
    }
}

fn write_definition(out: &mut String, def: &VarDefinition) {
    match def.form {
        DefinitionForm::Directive => out.push('@'),
        DefinitionForm::Property => out.push_str("var-"),
    }
    out.push_str(&def.name);
    out.push_str(": ");
    write_terms(out, &def.expression.terms);
    out.push(';');
}

fn write_selector_group(out: &mut String, group: &SelectorGroup) {
    for (i, selector) in group.selectors.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        for (j, part) in selector.parts.iter().enumerate() {
            match part.combinator {
                Combinator::None if j > 0 => {}
                Combinator::None | Combinator::Descendant if j == 0 => {}
                Combinator::None | Combinator::Descendant => out.push(' '),
                Combinator::Child => out.push_str(if j == 0 { "> " } else { " > " }),
                Combinator::NextSibling => out.push_str(if j == 0 { "+ " } else { " + " }),
                Combinator::SubsequentSibling => out.push_str(if j == 0 { "~ " } else { " ~ " }),
            }
            write_simple_selector(out, &part.simple);
        }
    }
}

fn write_simple_selector(out: &mut String, simple: &SimpleSelector) {
    match simple {
        SimpleSelector::Universal(_) => out.push('*'),
        SimpleSelector::Element(n) => out.push_str(&n.name),
        SimpleSelector::Class(n) => {
            out.push('.');
            out.push_str(&n.name);
        }
        SimpleSelector::Id(n) => {
            out.push('#');
            out.push_str(&n.name);
        }
        SimpleSelector::Attribute(attr) => {
            out.push('[');
            out.push_str(&attr.raw);
            out.push(']');
        }
        SimpleSelector::PseudoClass(pseudo) => {
            out.push(':');
            write_pseudo(out, pseudo);
        }
        SimpleSelector::PseudoElement(pseudo) => {
            out.push_str("::");
            write_pseudo(out, pseudo);
        }
    }
}

fn write_pseudo(out: &mut String, pseudo: &PseudoSelector) {
    out.push_str(&pseudo.name);
    match &pseudo.argument {
        None => {}
        Some(PseudoArgument::Selectors(group)) => {
            out.push('(');
            write_selector_group(out, group);
            out.push(')');
        }
        Some(PseudoArgument::Raw(raw)) => {
            out.push('(');
            out.push_str(raw);
            out.push(')');
        }
    }
}

fn write_terms(out: &mut String, terms: &[Term]) {
    let mut previous: Option<&Term> = None;
    for term in terms {
        let glued = matches!(term, Term::Operator(_))
            || matches!(previous, Some(Term::Operator(OperatorTerm { op: Operator::Slash, .. })));
        if previous.is_some() && !glued {
            out.push(' ');
        }
        write_term(out, term);
        previous = Some(term);
    }
}

fn write_term(out: &mut String, term: &Term) {
    match term {
        Term::Literal(literal) => out.push_str(&literal.text),
        Term::VarUsage(usage) => {
            out.push_str("var(");
            out.push_str(&usage.name);
            if let Some(default) = &usage.default {
                out.push_str(", ");
                write_term(out, default);
            }
            out.push(')');
        }
        Term::Uri(uri) => {
            let needs_quotes = uri
                .url
                .contains(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | '\'' | '"'));
            out.push_str("url(");
            if needs_quotes {
                out.push('"');
                out.push_str(&uri.url.replace('"', "\\\""));
                out.push('"');
            } else {
                out.push_str(&uri.url);
            }
            out.push(')');
        }
        Term::Function(function) => {
            out.push_str(&function.name);
            out.push('(');
            write_terms(out, &function.args.terms);
            out.push(')');
        }
        Term::Operator(op) => out.push(match op.op {
            Operator::Comma => ',',
            Operator::Slash => '/',
        }),
    }
}

/// Serializes template nodes.
///
/// Attribute values are written in double quotes unless they contain one.
pub fn emit_template(nodes: &[TemplateNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node);
    }
    out
}

fn write_node(out: &mut String, node: &TemplateNode) {
    match node {
        TemplateNode::Element(element) => {
            out.push('<');
            out.push_str(&element.name);
            for attr in &element.attributes {
                out.push(' ');
                out.push_str(&attr.name);
                if let Some(value) = &attr.value {
                    let quote = if value.contains('"') { '\'' } else { '"' };
                    out.push('=');
                    out.push(quote);
                    out.push_str(value);
                    out.push(quote);
                }
            }
            if element.self_closing {
                out.push_str(if is_void_element(&element.name) { ">" } else { " />" });
                return;
            }
            out.push('>');
            for child in &element.children {
                write_node(out, child);
            }
            out.push_str("</");
            out.push_str(&element.name);
            out.push('>');
        }
        TemplateNode::Text(text) => out.push_str(&text.text),
        TemplateNode::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(&comment.text);
            out.push_str("-->");
        }
    }
}
