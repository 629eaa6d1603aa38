//! Stylesheet lexer using logos.
//!
//! Whitespace and comments are real tokens: whitespace is significant as the
//! descendant combinator in selectors, and top-level comments are kept in the
//! tree. Characters with no token of their own lex as [`TokenKind::Error`] and
//! are treated as opaque delimiters by the parser.

use logos::Logos;
use source_map::Span;
use text_size::TextSize;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span of the token in the (possibly enclosing) source file.
    pub span: Span,
}

/// Token kinds for stylesheet syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos, Default)]
pub enum TokenKind {
    /// Spaces, tabs and newlines.
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    /// `/* ... */`
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    Comment,

    /// `{`
    #[token("{")]
    LBrace,

    /// `}`
    #[token("}")]
    RBrace,

    /// `(`
    #[token("(")]
    LParen,

    /// `)`
    #[token(")")]
    RParen,

    /// `[`
    #[token("[")]
    LBracket,

    /// `]`
    #[token("]")]
    RBracket,

    /// `:`
    #[token(":")]
    Colon,

    /// `;`
    #[token(";")]
    Semicolon,

    /// `,`
    #[token(",")]
    Comma,

    /// `.`
    #[token(".")]
    Dot,

    /// `>`
    #[token(">")]
    Greater,

    /// `+`
    #[token("+")]
    Plus,

    /// `~`
    #[token("~")]
    Tilde,

    /// `*`
    #[token("*")]
    Star,

    /// `/`
    #[token("/")]
    Slash,

    /// `!`
    #[token("!")]
    Bang,

    /// `@name`
    #[regex(r"@-?[a-zA-Z_][a-zA-Z0-9_-]*")]
    AtKeyword,

    /// `#name` (id selector or hex color)
    #[regex(r"#[a-zA-Z0-9_-]+")]
    Hash,

    /// An identifier.
    #[regex(r"-{0,2}[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    /// An identifier immediately followed by `(`.
    #[regex(r"-{0,2}[a-zA-Z_][a-zA-Z0-9_-]*\(")]
    Function,

    /// A complete `url(...)` token.
    #[regex(r#"[uU][rR][lL]\([ \t\r\n]*([^)"' \t\r\n]*|"[^"]*"|'[^']*')[ \t\r\n]*\)"#)]
    Url,

    /// A number, percentage or dimension.
    #[regex(r"[+-]?([0-9]+(\.[0-9]+)?|\.[0-9]+)(%|[a-zA-Z]+)?")]
    Number,

    /// A quoted string.
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r#"'([^'\\\n]|\\.)*'"#)]
    String,

    /// End of file
    Eof,

    /// Any other character.
    #[default]
    Error,
}

impl TokenKind {
    /// Returns true for tokens the parser skips between meaningful tokens.
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// Returns a human-readable name for this token kind.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Whitespace => "whitespace",
            TokenKind::Comment => "comment",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Greater => "'>'",
            TokenKind::Plus => "'+'",
            TokenKind::Tilde => "'~'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Bang => "'!'",
            TokenKind::AtKeyword => "at-keyword",
            TokenKind::Hash => "hash",
            TokenKind::Ident => "identifier",
            TokenKind::Function => "function",
            TokenKind::Url => "url",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "invalid token",
        }
    }
}

/// A lexer over stylesheet text.
///
/// Spans are shifted by `offset` so that a stylesheet embedded in a larger
/// file (a `<style>` element) reports positions in that file.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    offset: u32,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    pub fn new(source: &'src str) -> Self {
        Self::with_offset(source, TextSize::from(0))
    }

    /// Creates a lexer whose spans start at `offset`.
    pub fn with_offset(source: &'src str, offset: TextSize) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            offset: u32::from(offset),
        }
    }

    /// Returns the text of the current token.
    pub fn slice(&self) -> &'src str {
        self.inner.slice()
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let kind = self.inner.next()?.unwrap_or(TokenKind::Error);
        let range = self.inner.span();
        Some(Token {
            kind,
            span: Span::new(
                self.offset + range.start as u32,
                self.offset + range.end as u32,
            ),
        })
    }
}
