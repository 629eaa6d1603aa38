//! Source files and resolved locations.

use crate::{LineCol, LineIndex, Span};
use smol_str::SmolStr;
use std::fmt;
use std::sync::Arc;

/// A named source text together with its line index.
///
/// Cloning is cheap: the index is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    name: SmolStr,
    index: Arc<LineIndex>,
}

impl SourceFile {
    /// Creates a source file named `name` for the given text.
    pub fn new(name: impl Into<SmolStr>, text: &str) -> Self {
        Self {
            name: name.into(),
            index: Arc::new(LineIndex::new(text)),
        }
    }

    /// A file with no text, for trees built by hand.
    pub fn anonymous() -> Self {
        Self::new("<anonymous>", "")
    }

    /// The source identifier (usually a path).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The line index of the source text.
    pub fn line_index(&self) -> &LineIndex {
        &self.index
    }

    /// Resolves a span in this file to a 1-based location.
    pub fn locate(&self, span: Span) -> SourceLocation {
        let start = self
            .index
            .line_col(span.start)
            .unwrap_or(LineCol::new(0, 0));

        SourceLocation {
            source: self.name.clone(),
            span,
            line: start.line + 1,
            column: start.col + 1,
        }
    }
}

/// A span resolved against its source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceLocation {
    /// The source identifier.
    pub source: SmolStr,
    /// The byte span in that source.
    pub span: Span,
    /// 1-indexed line of the span start.
    pub line: u32,
    /// 1-indexed column of the span start.
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.line, self.column)
    }
}
