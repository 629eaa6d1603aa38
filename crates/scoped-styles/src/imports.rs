//! Collection of `@import` dependencies.

use crate::paths::{classify, normalize, parent_dir, ReferenceKind};
use camino::{Utf8Path, Utf8PathBuf};
use source_map::SourceLocation;
use style_parser::{Statement, Stylesheet};

/// One `@import` found in a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlInfo {
    /// The file containing the import.
    pub source_path: Utf8PathBuf,
    /// The import reference as written.
    pub url: String,
    /// Where a local import points, relative to the same root as
    /// `source_path`. `None` for imports that cannot be read from disk.
    pub resolved_path: Option<Utf8PathBuf>,
    /// The media query list after the reference, if any.
    pub media: Option<String>,
    /// The location of the directive.
    pub location: SourceLocation,
}

impl UrlInfo {
    /// Returns true if the import has a host or a scheme.
    pub fn is_external(&self) -> bool {
        self.resolved_path.is_none()
    }
}

/// Records every `@import` in document order.
///
/// Resolution is lexical: whether the imported file exists is for the caller
/// to decide.
pub fn collect_imports(stylesheet: &Stylesheet, source_path: &Utf8Path) -> Vec<UrlInfo> {
    let mut imports = Vec::new();
    visit(&stylesheet.statements, stylesheet, source_path, &mut imports);
    imports
}

fn visit(statements: &[Statement], stylesheet: &Stylesheet, source_path: &Utf8Path, imports: &mut Vec<UrlInfo>) {
    for statement in statements {
        match statement {
            Statement::Import(import) => {
                let resolved_path = match classify(&import.url) {
                    ReferenceKind::Local => Some(normalize(&parent_dir(source_path).join(&import.url))),
                    ReferenceKind::Package | ReferenceKind::External => None,
                };
                imports.push(UrlInfo {
                    source_path: source_path.to_path_buf(),
                    url: import.url.clone(),
                    resolved_path,
                    media: import.media.clone(),
                    location: stylesheet.file.locate(import.span),
                });
            }
            Statement::Nested(nested) => visit(&nested.statements, stylesheet, source_path, imports),
            Statement::RuleSet(_)
            | Statement::VarDefinition(_)
            | Statement::AtRule(_)
            | Statement::Comment(_) => {}
        }
    }
}
