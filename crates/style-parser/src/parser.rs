//! Recursive descent parser for component stylesheets.

use crate::ast::*;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::{ParseOptions, StylesheetParse};
use smol_str::SmolStr;
use source_map::{SourceFile, Span};
use text_size::TextSize;

/// At-rules whose blocks hold statements.
const NESTED_AT_RULES: &[&str] = &["media", "supports", "document", "layer"];

/// At-rules whose blocks hold declarations.
const DECLARATION_AT_RULES: &[&str] = &["font-face", "page", "viewport", "counter-style"];

/// At-rules that can never be read as a `@name: value;` definition.
const RESERVED_AT_RULES: &[&str] = &["import", "charset", "namespace", "keyframes"];

/// Pseudo-classes whose argument is a selector list.
const SELECTOR_LIST_PSEUDOS: &[&str] = &["not", "is", "where", "has", "matches", "host", "host-context"];

fn is_reserved_at_rule(name: &str) -> bool {
    NESTED_AT_RULES.contains(&name)
        || DECLARATION_AT_RULES.contains(&name)
        || RESERVED_AT_RULES.contains(&name)
        || name.ends_with("keyframes")
}

/// Strips `url(` / `)`, surrounding whitespace and quotes.
fn url_inner(text: &str) -> String {
    let inner = text
        .get(4..text.len().saturating_sub(1))
        .unwrap_or_default()
        .trim();
    unquote(inner).to_string()
}

fn unquote(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

/// The stylesheet parser.
pub struct Parser<'src> {
    /// The stylesheet text.
    source: &'src str,
    /// Offset of `source` within its file.
    offset: TextSize,
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<ParseError>,
    /// End of the last non-trivia token consumed.
    last_end: TextSize,
    eof_token: Token,
}

impl<'src> Parser<'src> {
    /// Creates a new parser.
    pub fn new(source: &'src str, options: ParseOptions) -> Self {
        let tokens: Vec<Token> = Lexer::with_offset(source, options.offset).collect();
        let end = options.offset + TextSize::from(source.len() as u32);
        Self {
            source,
            offset: options.offset,
            tokens,
            pos: 0,
            errors: Vec::new(),
            last_end: options.offset,
            eof_token: Token {
                kind: TokenKind::Eof,
                span: Span::empty(end),
            },
        }
    }

    /// Parses the source into a stylesheet belonging to `file`.
    pub fn parse(mut self, file: SourceFile) -> StylesheetParse {
        let statements = self.parse_statements(false);
        let span = Span::new(self.offset, self.eof_token.span.end);
        StylesheetParse {
            stylesheet: Stylesheet {
                file,
                statements,
                span,
            },
            errors: self.errors,
        }
    }

    // === Token helpers ===

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof_token)
    }

    fn kind(&self) -> TokenKind {
        self.current().kind
    }

    fn text(&self) -> &'src str {
        let span = self.current().span;
        self.slice(span.start, span.end)
    }

    fn slice(&self, start: TextSize, end: TextSize) -> &'src str {
        let start = u32::from(start - self.offset) as usize;
        let end = u32::from(end - self.offset) as usize;
        self.source.get(start..end).unwrap_or_default()
    }

    fn advance(&mut self) {
        if let Some(token) = self.tokens.get(self.pos) {
            if !token.kind.is_trivia() {
                self.last_end = token.span.end;
            }
            self.pos += 1;
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        if self.check(TokenKind::Eof) {
            self.error(ParseErrorKind::UnexpectedEof {
                expected: kind.name().to_string(),
            });
        } else {
            self.unexpected(kind.name());
        }
        false
    }

    fn skip_trivia(&mut self) {
        while self.kind().is_trivia() {
            self.advance();
        }
    }

    /// Returns the kind of the next non-trivia token without consuming anything.
    fn peek_significant(&self) -> TokenKind {
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .map(|t| t.kind)
            .find(|k| !k.is_trivia())
            .unwrap_or(TokenKind::Eof)
    }

    fn error(&mut self, kind: ParseErrorKind) {
        self.errors.push(ParseError::new(kind, self.current().span));
    }

    fn unexpected(&mut self, expected: &str) {
        self.error(ParseErrorKind::UnexpectedToken {
            expected: expected.to_string(),
            found: self.kind().name().to_string(),
        });
    }

    /// Consumes tokens up to (not including) one of `stops` at paren depth zero
    /// and returns the trimmed source text they cover.
    fn read_raw_until(&mut self, stops: &[TokenKind]) -> String {
        let start = self.current().span.start;
        let mut depth = 0usize;
        loop {
            let kind = self.kind();
            if kind == TokenKind::Eof || (depth == 0 && stops.contains(&kind)) {
                break;
            }
            match kind {
                TokenKind::LParen | TokenKind::Function => depth += 1,
                TokenKind::RParen => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.advance();
        }
        self.slice(start, self.current().span.start).trim().to_string()
    }

    /// Consumes a `{ ... }` block with balanced braces and returns its trimmed contents.
    fn read_raw_block(&mut self) -> String {
        let open = self.current().span.end;
        self.advance();
        let mut depth = 1usize;
        loop {
            match self.kind() {
                TokenKind::Eof => {
                    self.error(ParseErrorKind::UnexpectedEof {
                        expected: TokenKind::RBrace.name().to_string(),
                    });
                    return self.slice(open, self.current().span.start).trim().to_string();
                }
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        let inner = self.slice(open, self.current().span.start).trim().to_string();
                        self.advance();
                        return inner;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Skips a broken statement: through its block if it has one, or through `;`.
    fn recover_statement(&mut self) {
        loop {
            match self.kind() {
                TokenKind::Eof | TokenKind::RBrace => return,
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::LBrace => {
                    self.read_raw_block();
                    return;
                }
                _ => self.advance(),
            }
        }
    }

    /// Skips a broken declaration up to `;` or the closing `}` of its block.
    fn recover_declaration(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.kind() {
                TokenKind::Eof => return,
                TokenKind::RBrace if depth == 0 => return,
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                _ => {}
            }
            self.advance();
        }
    }

    // === Statements ===

    fn parse_statements(&mut self, nested: bool) -> Vec<Statement> {
        let mut statements = Vec::new();
        loop {
            match self.kind() {
                TokenKind::Whitespace | TokenKind::Semicolon => self.advance(),
                TokenKind::Comment => statements.push(Statement::Comment(self.parse_comment())),
                TokenKind::Eof => {
                    if nested {
                        self.error(ParseErrorKind::UnexpectedEof {
                            expected: TokenKind::RBrace.name().to_string(),
                        });
                    }
                    break;
                }
                TokenKind::RBrace => {
                    if nested {
                        break;
                    }
                    self.unexpected("statement");
                    self.advance();
                }
                TokenKind::AtKeyword => {
                    if let Some(statement) = self.parse_at_rule() {
                        statements.push(statement);
                    }
                }
                _ => {
                    if let Some(rule) = self.parse_rule_set() {
                        statements.push(Statement::RuleSet(rule));
                    }
                }
            }
        }
        statements
    }

    fn parse_comment(&mut self) -> Comment {
        let span = self.current().span;
        let text = self.text();
        self.advance();
        Comment {
            text: text
                .strip_prefix("/*")
                .and_then(|t| t.strip_suffix("*/"))
                .unwrap_or(text)
                .to_string(),
            span,
        }
    }

    fn parse_at_rule(&mut self) -> Option<Statement> {
        let start = self.current().span.start;
        let name = SmolStr::new(&self.text()[1..]);
        let lower = name.to_ascii_lowercase();

        if !is_reserved_at_rule(&lower) && self.peek_after_keyword() == TokenKind::Colon {
            return self
                .parse_var_definition(DefinitionForm::Directive)
                .map(Statement::VarDefinition);
        }

        self.advance();
        if lower == "import" {
            return self.parse_import(start);
        }

        self.skip_trivia();
        let prelude = self.read_raw_until(&[TokenKind::LBrace, TokenKind::Semicolon, TokenKind::RBrace]);
        match self.kind() {
            TokenKind::Semicolon => {
                self.advance();
                Some(Statement::AtRule(AtRule {
                    name,
                    prelude,
                    body: None,
                    span: Span::new(start, self.last_end),
                }))
            }
            TokenKind::LBrace if NESTED_AT_RULES.contains(&lower.as_str()) => {
                self.advance();
                let statements = self.parse_statements(true);
                self.expect(TokenKind::RBrace);
                Some(Statement::Nested(NestedDirective {
                    name,
                    prelude,
                    statements,
                    span: Span::new(start, self.last_end),
                }))
            }
            TokenKind::LBrace => {
                let body = if DECLARATION_AT_RULES.contains(&lower.as_str()) {
                    AtRuleBody::Declarations(self.parse_declaration_block())
                } else {
                    AtRuleBody::Raw(self.read_raw_block())
                };
                Some(Statement::AtRule(AtRule {
                    name,
                    prelude,
                    body: Some(body),
                    span: Span::new(start, self.last_end),
                }))
            }
            _ => {
                self.expect(TokenKind::Semicolon);
                None
            }
        }
    }

    /// Looks past the at-keyword under the cursor for the next significant token.
    fn peek_after_keyword(&self) -> TokenKind {
        self.tokens
            .iter()
            .skip(self.pos + 1)
            .map(|t| t.kind)
            .find(|k| !k.is_trivia())
            .unwrap_or(TokenKind::Eof)
    }

    fn parse_import(&mut self, start: TextSize) -> Option<Statement> {
        self.skip_trivia();
        let url = match self.kind() {
            TokenKind::String => unquote(self.text()).to_string(),
            TokenKind::Url => url_inner(self.text()),
            _ => {
                self.unexpected("import url");
                self.recover_statement();
                return None;
            }
        };
        self.advance();
        self.skip_trivia();

        let media = self.read_raw_until(&[TokenKind::Semicolon, TokenKind::LBrace, TokenKind::RBrace]);
        self.expect(TokenKind::Semicolon);

        Some(Statement::Import(ImportDirective {
            url,
            media: (!media.is_empty()).then_some(media),
            span: Span::new(start, self.last_end),
        }))
    }

    /// Parses `@name: value;` or `var-name: value;` with the cursor on the name.
    fn parse_var_definition(&mut self, form: DefinitionForm) -> Option<VarDefinition> {
        let start = self.current().span.start;
        let text = self.text();
        let name = match form {
            DefinitionForm::Directive => &text[1..],
            DefinitionForm::Property => text.get(4..).unwrap_or_default(),
        };
        let name = SmolStr::new(name);
        self.advance();
        self.skip_trivia();
        if !self.expect(TokenKind::Colon) {
            self.recover_declaration();
            return None;
        }

        let expression = self.parse_expressions();
        if self.check(TokenKind::Bang) {
            self.parse_important();
        }
        self.finish_declaration();

        Some(VarDefinition {
            name,
            expression,
            form,
            span: Span::new(start, self.last_end),
        })
    }

    fn parse_rule_set(&mut self) -> Option<RuleSet> {
        let start = self.current().span.start;
        let selectors = match self.parse_selector_group(TokenKind::LBrace) {
            Ok(selectors) => selectors,
            Err(error) => {
                self.errors.push(error);
                self.recover_statement();
                return None;
            }
        };
        if !self.check(TokenKind::LBrace) {
            self.expect(TokenKind::LBrace);
            self.recover_statement();
            return None;
        }
        let declarations = self.parse_declaration_block();
        Some(RuleSet {
            selectors,
            declarations,
            span: Span::new(start, self.last_end),
        })
    }

    // === Selectors ===

    fn parse_selector_group(&mut self, close: TokenKind) -> Result<SelectorGroup, ParseError> {
        self.skip_trivia();
        let start = self.current().span.start;
        let mut selectors = vec![self.parse_selector(close)?];
        while self.eat(TokenKind::Comma) {
            self.skip_trivia();
            selectors.push(self.parse_selector(close)?);
        }
        Ok(SelectorGroup {
            selectors,
            span: Span::new(start, self.last_end),
        })
    }

    fn parse_selector(&mut self, close: TokenKind) -> Result<Selector, ParseError> {
        let start = self.current().span.start;
        let mut parts = Vec::new();
        let mut combinator = Combinator::None;
        loop {
            match self.kind() {
                TokenKind::Whitespace | TokenKind::Comment => {
                    self.advance();
                    if !parts.is_empty() && combinator == Combinator::None {
                        combinator = Combinator::Descendant;
                    }
                }
                TokenKind::Greater => {
                    self.advance();
                    combinator = Combinator::Child;
                }
                TokenKind::Plus => {
                    self.advance();
                    combinator = Combinator::NextSibling;
                }
                TokenKind::Tilde => {
                    self.advance();
                    combinator = Combinator::SubsequentSibling;
                }
                kind if kind == close || kind == TokenKind::Comma || kind == TokenKind::Eof => break,
                _ => {
                    let simple = self.parse_simple_selector()?;
                    parts.push(SelectorPart { combinator, simple });
                    combinator = Combinator::None;
                }
            }
        }

        if parts.is_empty() {
            return Err(self.selector_error("empty selector"));
        }
        if !matches!(combinator, Combinator::None | Combinator::Descendant) {
            return Err(self.selector_error("selector ends with a combinator"));
        }
        Ok(Selector {
            parts,
            span: Span::new(start, self.last_end),
        })
    }

    fn selector_error(&self, message: &str) -> ParseError {
        ParseError::new(
            ParseErrorKind::InvalidSelector {
                message: message.to_string(),
            },
            self.current().span,
        )
    }

    fn parse_simple_selector(&mut self) -> Result<SimpleSelector, ParseError> {
        let span = self.current().span;
        let text = self.text();
        match self.kind() {
            TokenKind::Star => {
                self.advance();
                Ok(SimpleSelector::Universal(span))
            }
            TokenKind::Ident => {
                self.advance();
                Ok(SimpleSelector::Element(NamedSelector {
                    name: SmolStr::new(text),
                    span,
                }))
            }
            TokenKind::Hash => {
                self.advance();
                Ok(SimpleSelector::Id(NamedSelector {
                    name: SmolStr::new(&text[1..]),
                    span,
                }))
            }
            TokenKind::Dot => {
                self.advance();
                if !self.check(TokenKind::Ident) {
                    return Err(self.selector_error("expected a class name after '.'"));
                }
                let name = SmolStr::new(self.text());
                self.advance();
                Ok(SimpleSelector::Class(NamedSelector {
                    name,
                    span: Span::new(span.start, self.last_end),
                }))
            }
            TokenKind::LBracket => {
                self.advance();
                let raw = self.read_raw_until(&[TokenKind::RBracket, TokenKind::LBrace]);
                if !self.eat(TokenKind::RBracket) {
                    return Err(self.selector_error("unclosed attribute selector"));
                }
                Ok(SimpleSelector::Attribute(AttributeSelector {
                    raw,
                    span: Span::new(span.start, self.last_end),
                }))
            }
            TokenKind::Colon => {
                self.advance();
                let element = self.eat(TokenKind::Colon);
                let pseudo = self.parse_pseudo(span.start)?;
                Ok(if element {
                    SimpleSelector::PseudoElement(pseudo)
                } else {
                    SimpleSelector::PseudoClass(pseudo)
                })
            }
            kind => Err(ParseError::new(
                ParseErrorKind::UnexpectedToken {
                    expected: "selector".to_string(),
                    found: kind.name().to_string(),
                },
                span,
            )),
        }
    }

    fn parse_pseudo(&mut self, start: TextSize) -> Result<PseudoSelector, ParseError> {
        let text = self.text();
        match self.kind() {
            TokenKind::Ident => {
                self.advance();
                Ok(PseudoSelector {
                    name: SmolStr::new(text),
                    argument: None,
                    span: Span::new(start, self.last_end),
                })
            }
            TokenKind::Function => {
                let name = SmolStr::new(&text[..text.len() - 1]);
                self.advance();
                let argument = if SELECTOR_LIST_PSEUDOS.contains(&name.to_ascii_lowercase().as_str()) {
                    let group = self.parse_selector_group(TokenKind::RParen)?;
                    self.skip_trivia();
                    PseudoArgument::Selectors(group)
                } else {
                    PseudoArgument::Raw(self.read_raw_until(&[TokenKind::RParen, TokenKind::LBrace]))
                };
                if !self.eat(TokenKind::RParen) {
                    return Err(self.selector_error("unclosed pseudo-class argument"));
                }
                Ok(PseudoSelector {
                    name,
                    argument: Some(argument),
                    span: Span::new(start, self.last_end),
                })
            }
            _ => Err(self.selector_error("expected a pseudo-class name")),
        }
    }

    // === Declarations ===

    fn parse_declaration_block(&mut self) -> DeclarationGroup {
        let start = self.current().span.start;
        self.expect(TokenKind::LBrace);
        let mut items = Vec::new();
        loop {
            match self.kind() {
                TokenKind::Whitespace | TokenKind::Comment | TokenKind::Semicolon => self.advance(),
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    self.error(ParseErrorKind::UnexpectedEof {
                        expected: TokenKind::RBrace.name().to_string(),
                    });
                    break;
                }
                TokenKind::Ident => {
                    if let Some(item) = self.parse_declaration() {
                        items.push(item);
                    }
                }
                TokenKind::AtKeyword if self.peek_after_keyword() == TokenKind::Colon => {
                    if let Some(definition) = self.parse_var_definition(DefinitionForm::Directive) {
                        items.push(DeclarationItem::VarDefinition(definition));
                    }
                }
                _ => {
                    self.unexpected("declaration");
                    self.advance();
                    self.recover_declaration();
                }
            }
        }
        DeclarationGroup {
            items,
            span: Span::new(start, self.last_end),
        }
    }

    fn parse_declaration(&mut self) -> Option<DeclarationItem> {
        let text = self.text();
        if text.len() > 4 && text.starts_with("var-") {
            return self
                .parse_var_definition(DefinitionForm::Property)
                .map(DeclarationItem::VarDefinition);
        }

        let start = self.current().span.start;
        let property = SmolStr::new(text);
        self.advance();
        self.skip_trivia();
        if !self.expect(TokenKind::Colon) {
            self.recover_declaration();
            return None;
        }

        let value = self.parse_expressions();
        let important = self.check(TokenKind::Bang) && self.parse_important();
        self.finish_declaration();

        Some(DeclarationItem::Declaration(Declaration {
            property,
            value,
            important,
            span: Span::new(start, self.last_end),
        }))
    }

    fn parse_important(&mut self) -> bool {
        self.advance();
        self.skip_trivia();
        if self.check(TokenKind::Ident) && self.text().eq_ignore_ascii_case("important") {
            self.advance();
            self.skip_trivia();
            true
        } else {
            self.unexpected("'important'");
            false
        }
    }

    /// Consumes the `;` ending a declaration; `}` may end it too.
    fn finish_declaration(&mut self) {
        match self.kind() {
            TokenKind::Semicolon => self.advance(),
            TokenKind::RBrace | TokenKind::Eof => {}
            _ => {
                self.unexpected(TokenKind::Semicolon.name());
                self.recover_declaration();
            }
        }
    }

    // === Values ===

    fn parse_expressions(&mut self) -> Expressions {
        self.skip_trivia();
        let start = self.current().span.start;
        let mut terms = Vec::new();
        loop {
            self.skip_trivia();
            match self.kind() {
                TokenKind::Semicolon
                | TokenKind::RBrace
                | TokenKind::Bang
                | TokenKind::RParen
                | TokenKind::Eof => break,
                _ => {
                    if let Some(term) = self.parse_term() {
                        terms.push(term);
                    }
                }
            }
        }
        let span = if terms.is_empty() {
            Span::empty(start)
        } else {
            Span::new(start, self.last_end)
        };
        Expressions { terms, span }
    }

    fn parse_term(&mut self) -> Option<Term> {
        let span = self.current().span;
        let text = self.text();
        match self.kind() {
            TokenKind::Comma | TokenKind::Slash => {
                let op = if self.check(TokenKind::Comma) {
                    Operator::Comma
                } else {
                    Operator::Slash
                };
                self.advance();
                Some(Term::Operator(OperatorTerm { op, span }))
            }
            TokenKind::Url => {
                self.advance();
                Some(Term::Uri(UriTerm {
                    url: url_inner(text),
                    span,
                }))
            }
            TokenKind::Function => self.parse_function(),
            TokenKind::LParen => {
                self.advance();
                let args = self.parse_expressions();
                self.expect(TokenKind::RParen);
                Some(Term::Function(FunctionTerm {
                    name: SmolStr::default(),
                    args,
                    span: Span::new(span.start, self.last_end),
                }))
            }
            TokenKind::LBrace | TokenKind::LBracket | TokenKind::RBracket => {
                self.unexpected("value");
                self.advance();
                None
            }
            _ => {
                self.advance();
                Some(Term::Literal(Literal {
                    text: SmolStr::new(text),
                    span,
                }))
            }
        }
    }

    fn parse_function(&mut self) -> Option<Term> {
        let start = self.current().span.start;
        let text = self.text();
        let name = SmolStr::new(&text[..text.len() - 1]);
        self.advance();

        if name.eq_ignore_ascii_case("var") && !self.at_custom_property() {
            return self.parse_var_usage(start);
        }

        let args = self.parse_expressions();
        self.expect(TokenKind::RParen);
        Some(Term::Function(FunctionTerm {
            name,
            args,
            span: Span::new(start, self.last_end),
        }))
    }

    /// `var(--name)` refers to a native custom property and is left as a plain function.
    fn at_custom_property(&self) -> bool {
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .find(|t| !t.kind.is_trivia())
            .is_some_and(|t| {
                t.kind == TokenKind::Ident && self.slice(t.span.start, t.span.end).starts_with("--")
            })
    }

    fn parse_var_usage(&mut self, start: TextSize) -> Option<Term> {
        self.skip_trivia();
        if !self.check(TokenKind::Ident) {
            self.error(ParseErrorKind::InvalidVarUsage {
                message: "expected a variable name".to_string(),
            });
            self.read_raw_until(&[TokenKind::RParen, TokenKind::Semicolon, TokenKind::RBrace]);
            self.eat(TokenKind::RParen);
            return None;
        }
        let name = SmolStr::new(self.text());
        self.advance();
        self.skip_trivia();

        let mut default = None;
        if self.eat(TokenKind::Comma) {
            self.skip_trivia();
            if self.check(TokenKind::RParen) {
                self.error(ParseErrorKind::InvalidVarUsage {
                    message: "missing fallback value".to_string(),
                });
            } else {
                default = self.parse_term().map(Box::new);
                self.skip_trivia();
                if self.peek_significant() != TokenKind::RParen {
                    self.error(ParseErrorKind::InvalidVarUsage {
                        message: "fallback must be a single term".to_string(),
                    });
                    while !matches!(
                        self.kind(),
                        TokenKind::RParen | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
                    ) {
                        self.parse_term();
                        self.skip_trivia();
                    }
                }
            }
        }
        self.expect(TokenKind::RParen);

        Some(Term::VarUsage(VarUsage {
            name,
            default,
            span: Span::new(start, self.last_end),
        }))
    }
}
