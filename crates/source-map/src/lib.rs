//! Source position tracking for scoped-styles.
//!
//! Every AST node produced by `style-parser` carries a byte [`Span`]. Passes
//! that report problems turn those spans into a [`SourceLocation`] through the
//! [`SourceFile`] the tree was parsed from, so messages always name the source
//! and a 1-based line/column.

mod file;
mod line_index;
mod span;

pub use file::{SourceFile, SourceLocation};
pub use line_index::{LineCol, LineIndex};
pub use span::{ByteOffset, Span};
