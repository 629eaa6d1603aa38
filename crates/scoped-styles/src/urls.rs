//! Rewriting of relative `url()` references for relocated output.

use crate::paths::{classify, normalize, parent_dir, relative, to_slash, ReferenceKind};
use camino::{Utf8Path, Utf8PathBuf};
use style_parser::{AtRuleBody, DeclarationGroup, DeclarationItem, Statement, Stylesheet, Term};

/// Rewrites `url()` references so they still resolve once the stylesheet is
/// written somewhere other than its source.
///
/// A local reference `r` becomes `normalize(join(relative(outputDir, sourceDir), r))`.
/// References with a host or a scheme other than `package:` are left alone,
/// as are fragment-only references such as `url(#gradient)`. `@import`
/// directives are not touched.
#[derive(Debug, Clone)]
pub struct UrlRewriter {
    /// Leads from the output directory back to the source directory.
    base: Utf8PathBuf,
}

impl UrlRewriter {
    /// Creates a rewriter for a stylesheet read from `source_file` and written
    /// to `output_file`.
    pub fn new(source_file: &Utf8Path, output_file: &Utf8Path) -> Self {
        Self::for_dirs(parent_dir(source_file), parent_dir(output_file))
    }

    /// Creates a rewriter from the two directories directly.
    pub fn for_dirs(source_dir: &Utf8Path, output_dir: &Utf8Path) -> Self {
        Self {
            base: relative(output_dir, source_dir),
        }
    }

    /// Returns the rewritten form of `reference`, or `None` if it passes
    /// through unchanged.
    pub fn rewrite_reference(&self, reference: &str) -> Option<String> {
        if reference.is_empty() || reference.starts_with('#') {
            return None;
        }
        match classify(reference) {
            ReferenceKind::External => None,
            ReferenceKind::Local | ReferenceKind::Package => {
                let rewritten = to_slash(&normalize(&self.base.join(reference)));
                (rewritten != reference).then_some(rewritten)
            }
        }
    }

    /// Rewrites every `url()` term in the stylesheet. Returns how many changed.
    pub fn rewrite(&self, stylesheet: &mut Stylesheet) -> usize {
        self.statements(&mut stylesheet.statements)
    }

    fn statements(&self, statements: &mut [Statement]) -> usize {
        statements
            .iter_mut()
            .map(|statement| match statement {
                Statement::RuleSet(rule) => self.group(&mut rule.declarations),
                Statement::VarDefinition(definition) => self.terms(&mut definition.expression.terms),
                Statement::Nested(nested) => self.statements(&mut nested.statements),
                Statement::AtRule(rule) => match &mut rule.body {
                    Some(AtRuleBody::Declarations(group)) => self.group(group),
                    Some(AtRuleBody::Raw(_)) | None => 0,
                },
                Statement::Import(_) | Statement::Comment(_) => 0,
            })
            .sum()
    }

    fn group(&self, group: &mut DeclarationGroup) -> usize {
        group
            .items
            .iter_mut()
            .map(|item| match item {
                DeclarationItem::Declaration(declaration) => self.terms(&mut declaration.value.terms),
                DeclarationItem::VarDefinition(definition) => self.terms(&mut definition.expression.terms),
            })
            .sum()
    }

    fn terms(&self, terms: &mut [Term]) -> usize {
        terms.iter_mut().map(|term| self.term(term)).sum()
    }

    fn term(&self, term: &mut Term) -> usize {
        match term {
            Term::Uri(uri) => match self.rewrite_reference(&uri.url) {
                Some(rewritten) => {
                    uri.url = rewritten;
                    1
                }
                None => 0,
            },
            Term::Function(function) => self.terms(&mut function.args.terms),
            Term::VarUsage(usage) => usage.default.as_deref_mut().map_or(0, |d| self.term(d)),
            Term::Literal(_) | Term::Operator(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use style_parser::{emit_stylesheet, parse_stylesheet, EmitOptions};

    fn rewrite(source_file: &str, output_file: &str, css: &str) -> (String, usize) {
        let mut sheet = parse_stylesheet(source_file, css).stylesheet;
        let rewriter = UrlRewriter::new(Utf8Path::new(source_file), Utf8Path::new(output_file));
        let count = rewriter.rewrite(&mut sheet);
        (emit_stylesheet(&sheet, &EmitOptions::compact()), count)
    }

    #[test]
    fn test_relocates_relative_references() {
        let (css, count) = rewrite(
            "src/components/button.html",
            "build/components/button.css",
            ".a { background: url(img/bg.png); }",
        );
        assert_eq!(count, 1);
        assert_eq!(css, ".a { background: url(../../src/components/img/bg.png); }");
    }

    #[test]
    fn test_parent_segments_are_folded() {
        let rewriter = UrlRewriter::for_dirs(Utf8Path::new("src/ui"), Utf8Path::new("src/ui/out"));
        assert_eq!(rewriter.rewrite_reference("../shared/x.png").as_deref(), Some("../../shared/x.png"));
        assert_eq!(rewriter.rewrite_reference("./y.png").as_deref(), Some("../y.png"));
    }

    #[test]
    fn test_same_directory_only_normalizes() {
        let rewriter = UrlRewriter::for_dirs(Utf8Path::new("ui"), Utf8Path::new("ui"));
        assert_eq!(rewriter.rewrite_reference("img/a.png"), None);
        assert_eq!(rewriter.rewrite_reference("./img/../a.png").as_deref(), Some("a.png"));
    }

    #[test]
    fn test_network_urls_pass_through() {
        let source = ".a { background: url(http://example.com/a.png); } \
                      .b { background: url(//cdn.example.com/b.png); }";
        for output in ["out/a.css", "elsewhere/deep/a.css", "a.css"] {
            let (css, count) = rewrite("src/a.html", output, source);
            assert_eq!(count, 0);
            assert!(css.contains("url(http://example.com/a.png)"));
            assert!(css.contains("url(//cdn.example.com/b.png)"));
        }
    }

    #[test]
    fn test_other_schemes_and_fragments_pass_through() {
        let rewriter = UrlRewriter::for_dirs(Utf8Path::new("src"), Utf8Path::new("out"));
        assert_eq!(rewriter.rewrite_reference("data:image/png;base64,AAAA"), None);
        assert_eq!(rewriter.rewrite_reference("#gradient"), None);
        assert_eq!(rewriter.rewrite_reference(""), None);
    }

    #[test]
    fn test_nested_functions_and_at_rules() {
        let (css, count) = rewrite(
            "src/a.html",
            "out/a.css",
            "@font-face { src: url(f.woff) format(\"woff\"); }\n\
             @media print { .a { background: image-set(url(a.png) 1x, url(b.png) 2x); } }\n\
             @import \"theme.css\";",
        );
        assert_eq!(count, 3);
        assert!(css.contains("url(../src/f.woff)"));
        assert!(css.contains("image-set(url(../src/a.png) 1x, url(../src/b.png) 2x)"));
        assert!(css.contains("@import \"theme.css\";"));
    }
}
