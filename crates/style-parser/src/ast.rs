//! AST types for component stylesheets and templates.
//!
//! Node kinds are closed sum types; passes dispatch on them with exhaustive
//! `match`es rather than a visitor hierarchy.

use smol_str::SmolStr;
use source_map::{SourceFile, Span};

// === Stylesheets ===

/// A parsed stylesheet.
#[derive(Debug, Clone)]
pub struct Stylesheet {
    /// The file the stylesheet was parsed from.
    pub file: SourceFile,
    /// Top-level statements in document order.
    pub statements: Vec<Statement>,
    /// The span of the whole stylesheet.
    pub span: Span,
}

impl Stylesheet {
    /// Creates a stylesheet from already-built statements.
    pub fn new(file: SourceFile, statements: Vec<Statement>) -> Self {
        Self {
            file,
            statements,
            span: Span::detached(),
        }
    }
}

/// A statement at the top level of a stylesheet or inside a nested at-rule.
#[derive(Debug, Clone)]
pub enum Statement {
    /// `selectors { declarations }`
    RuleSet(RuleSet),
    /// `@name: expression;`
    VarDefinition(VarDefinition),
    /// `@import url(...) media;`
    Import(ImportDirective),
    /// `@media`/`@supports`/`@document` with nested statements.
    Nested(NestedDirective),
    /// Any other at-rule, passed through.
    AtRule(AtRule),
    /// `/* ... */`
    Comment(Comment),
}

impl Statement {
    /// Returns the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Statement::RuleSet(n) => n.span,
            Statement::VarDefinition(n) => n.span,
            Statement::Import(n) => n.span,
            Statement::Nested(n) => n.span,
            Statement::AtRule(n) => n.span,
            Statement::Comment(n) => n.span,
        }
    }
}

/// A rule set.
#[derive(Debug, Clone)]
pub struct RuleSet {
    /// The selector list.
    pub selectors: SelectorGroup,
    /// The declaration block.
    pub declarations: DeclarationGroup,
    /// The span of the rule.
    pub span: Span,
}

/// A comma-separated selector list.
#[derive(Debug, Clone)]
pub struct SelectorGroup {
    /// The selectors.
    pub selectors: Vec<Selector>,
    /// The span of the list.
    pub span: Span,
}

/// A complex selector such as `nav > .item:hover`.
#[derive(Debug, Clone)]
pub struct Selector {
    /// The compound parts, each with the combinator joining it to the previous part.
    pub parts: Vec<SelectorPart>,
    /// The span of the selector.
    pub span: Span,
}

/// One simple selector and how it attaches to the part before it.
#[derive(Debug, Clone)]
pub struct SelectorPart {
    /// The combinator before this part.
    pub combinator: Combinator,
    /// The simple selector.
    pub simple: SimpleSelector,
}

/// Selector combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    /// Part of the same compound selector (or the first part).
    #[default]
    None,
    /// Whitespace.
    Descendant,
    /// `>`
    Child,
    /// `+`
    NextSibling,
    /// `~`
    SubsequentSibling,
}

/// A simple selector.
#[derive(Debug, Clone)]
pub enum SimpleSelector {
    /// `*`
    Universal(Span),
    /// `div`
    Element(NamedSelector),
    /// `.name`
    Class(NamedSelector),
    /// `#name`
    Id(NamedSelector),
    /// `[attr=value]`, kept as the raw text between the brackets.
    Attribute(AttributeSelector),
    /// `:hover`, `:not(.a)`
    PseudoClass(PseudoSelector),
    /// `::before`
    PseudoElement(PseudoSelector),
}

/// A simple selector identified by a bare name.
#[derive(Debug, Clone)]
pub struct NamedSelector {
    /// The name without its `.` or `#` sigil.
    pub name: SmolStr,
    /// The span of the selector including the sigil.
    pub span: Span,
}

/// An attribute selector.
#[derive(Debug, Clone)]
pub struct AttributeSelector {
    /// Raw text between `[` and `]`.
    pub raw: String,
    /// The span including brackets.
    pub span: Span,
}

/// A pseudo-class or pseudo-element selector.
#[derive(Debug, Clone)]
pub struct PseudoSelector {
    /// The name without colons.
    pub name: SmolStr,
    /// The parenthesized argument, if any.
    pub argument: Option<PseudoArgument>,
    /// The span of the selector.
    pub span: Span,
}

/// The argument of a functional pseudo selector.
#[derive(Debug, Clone)]
pub enum PseudoArgument {
    /// A nested selector list (`:not(.a, .b)`).
    Selectors(SelectorGroup),
    /// Anything else (`:nth-child(2n + 1)`).
    Raw(String),
}

/// A `{ ... }` block of declarations.
#[derive(Debug, Clone, Default)]
pub struct DeclarationGroup {
    /// The items in source order.
    pub items: Vec<DeclarationItem>,
    /// The span including braces.
    pub span: Span,
}

/// An entry of a declaration block.
#[derive(Debug, Clone)]
pub enum DeclarationItem {
    /// `property: value`
    Declaration(Declaration),
    /// `var-name: value`
    VarDefinition(VarDefinition),
}

/// A property declaration.
#[derive(Debug, Clone)]
pub struct Declaration {
    /// The property name.
    pub property: SmolStr,
    /// The value.
    pub value: Expressions,
    /// Whether the declaration ends in `!important`.
    pub important: bool,
    /// The span of the declaration.
    pub span: Span,
}

/// A variable definition.
#[derive(Debug, Clone)]
pub struct VarDefinition {
    /// The defined name (without `@` or `var-`).
    pub name: SmolStr,
    /// The defined value.
    pub expression: Expressions,
    /// Which syntax introduced the definition.
    pub form: DefinitionForm,
    /// The span of the definition.
    pub span: Span,
}

/// The syntax of a variable definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionForm {
    /// `@name: value;`
    Directive,
    /// `var-name: value;`
    Property,
}

/// An ordered list of value terms.
#[derive(Debug, Clone, Default)]
pub struct Expressions {
    /// The terms.
    pub terms: Vec<Term>,
    /// The span of the value.
    pub span: Span,
}

impl Expressions {
    /// Creates an expression list from terms.
    pub fn new(terms: Vec<Term>) -> Self {
        Self {
            terms,
            span: Span::detached(),
        }
    }
}

/// A value term.
#[derive(Debug, Clone)]
pub enum Term {
    /// Identifiers, numbers, dimensions, hashes, strings and other opaque tokens.
    Literal(Literal),
    /// `var(name)` or `var(name, default)`
    VarUsage(VarUsage),
    /// `url(...)`
    Uri(UriTerm),
    /// `name(args)`
    Function(FunctionTerm),
    /// `,` or `/`
    Operator(OperatorTerm),
}

impl Term {
    /// Creates a detached literal term.
    pub fn literal(text: impl Into<SmolStr>) -> Self {
        Term::Literal(Literal {
            text: text.into(),
            span: Span::detached(),
        })
    }

    /// Creates a detached `var(name)` term.
    pub fn var(name: impl Into<SmolStr>) -> Self {
        Term::VarUsage(VarUsage {
            name: name.into(),
            default: None,
            span: Span::detached(),
        })
    }

    /// Creates a detached `var(name, default)` term.
    pub fn var_or(name: impl Into<SmolStr>, default: Term) -> Self {
        Term::VarUsage(VarUsage {
            name: name.into(),
            default: Some(Box::new(default)),
            span: Span::detached(),
        })
    }

    /// Returns the span of this term.
    pub fn span(&self) -> Span {
        match self {
            Term::Literal(n) => n.span,
            Term::VarUsage(n) => n.span,
            Term::Uri(n) => n.span,
            Term::Function(n) => n.span,
            Term::Operator(n) => n.span,
        }
    }
}

/// An opaque literal term.
#[derive(Debug, Clone)]
pub struct Literal {
    /// The literal text as written.
    pub text: SmolStr,
    /// The span of the literal.
    pub span: Span,
}

/// A variable usage.
#[derive(Debug, Clone)]
pub struct VarUsage {
    /// The referenced name.
    pub name: SmolStr,
    /// The fallback used when `name` has no definition.
    pub default: Option<Box<Term>>,
    /// The span of the usage.
    pub span: Span,
}

/// A `url(...)` term.
#[derive(Debug, Clone)]
pub struct UriTerm {
    /// The reference without quotes.
    pub url: String,
    /// The span of the term.
    pub span: Span,
}

/// A function call term.
#[derive(Debug, Clone)]
pub struct FunctionTerm {
    /// The function name.
    pub name: SmolStr,
    /// The arguments.
    pub args: Expressions,
    /// The span of the call.
    pub span: Span,
}

/// An operator term.
#[derive(Debug, Clone)]
pub struct OperatorTerm {
    /// The operator.
    pub op: Operator,
    /// The span of the operator.
    pub span: Span,
}

/// Value operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `,`
    Comma,
    /// `/`
    Slash,
}

/// An `@import` directive.
#[derive(Debug, Clone)]
pub struct ImportDirective {
    /// The imported reference as written.
    pub url: String,
    /// Trailing media query text, if any.
    pub media: Option<String>,
    /// The span of the directive.
    pub span: Span,
}

/// A conditional group rule holding nested statements.
#[derive(Debug, Clone)]
pub struct NestedDirective {
    /// The at-keyword name (`media`, `supports`, ...).
    pub name: SmolStr,
    /// Raw prelude text.
    pub prelude: String,
    /// Nested statements.
    pub statements: Vec<Statement>,
    /// The span of the directive.
    pub span: Span,
}

/// An at-rule passed through without interpretation of its prelude.
#[derive(Debug, Clone)]
pub struct AtRule {
    /// The at-keyword name.
    pub name: SmolStr,
    /// Raw prelude text.
    pub prelude: String,
    /// The block, if the rule has one.
    pub body: Option<AtRuleBody>,
    /// The span of the rule.
    pub span: Span,
}

/// The block of a passthrough at-rule.
#[derive(Debug, Clone)]
pub enum AtRuleBody {
    /// A declaration block (`@font-face`, `@page`).
    Declarations(DeclarationGroup),
    /// Raw block contents (`@keyframes`).
    Raw(String),
}

/// A comment.
#[derive(Debug, Clone)]
pub struct Comment {
    /// The text between the comment delimiters.
    pub text: String,
    /// The span including delimiters.
    pub span: Span,
}

// === Templates ===

/// A parsed HTML template file.
#[derive(Debug, Clone)]
pub struct TemplateDocument {
    /// The file the template was parsed from.
    pub file: SourceFile,
    /// Top-level nodes.
    pub nodes: Vec<TemplateNode>,
}

/// A node of a template tree.
#[derive(Debug, Clone)]
pub enum TemplateNode {
    /// An element.
    Element(Element),
    /// Text content, kept raw.
    Text(Text),
    /// `<!-- ... -->`
    Comment(Comment),
}

impl TemplateNode {
    /// Returns the span of this node.
    pub fn span(&self) -> Span {
        match self {
            TemplateNode::Element(n) => n.span,
            TemplateNode::Text(n) => n.span,
            TemplateNode::Comment(n) => n.span,
        }
    }
}

/// An HTML element.
#[derive(Debug, Clone)]
pub struct Element {
    /// The tag name.
    pub name: SmolStr,
    /// Attributes in source order.
    pub attributes: Vec<Attribute>,
    /// Child nodes.
    pub children: Vec<TemplateNode>,
    /// Whether the tag was written self-closing or is a void element.
    pub self_closing: bool,
    /// The span of the element.
    pub span: Span,
}

impl Element {
    /// Creates a detached element with no attributes or children.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: false,
            span: Span::detached(),
        }
    }

    /// Adds an attribute, builder style.
    pub fn with_attribute(mut self, name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            value: Some(value.into()),
            span: Span::detached(),
        });
        self
    }

    /// Adds a child, builder style.
    pub fn with_child(mut self, child: TemplateNode) -> Self {
        self.children.push(child);
        self
    }

    /// Returns the value of the first attribute named `name` (ASCII case-insensitive).
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
            .and_then(|attr| attr.value.as_deref())
    }
}

/// An element attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    /// The attribute name.
    pub name: SmolStr,
    /// The raw value; `None` for boolean attributes.
    pub value: Option<String>,
    /// The span of the attribute.
    pub span: Span,
}

/// Raw text content.
#[derive(Debug, Clone)]
pub struct Text {
    /// The text as written.
    pub text: String,
    /// The span of the text.
    pub span: Span,
}
