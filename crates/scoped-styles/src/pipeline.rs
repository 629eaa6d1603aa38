//! Running every pass over a component, in order.

use crate::catalog::SelectorCatalog;
use crate::component::{is_definition, take_component, Component};
use crate::imports::{collect_imports, UrlInfo};
use crate::message::{MessageCode, Messages};
use crate::scope::{rename_selectors, ScopeRenamer};
use crate::selector_table::SelectorTable;
use crate::urls::UrlRewriter;
use crate::vars::{strip_definitions, VariableResolver, VariableTable};
use camino::Utf8PathBuf;
use smol_str::SmolStr;
use source_map::SourceFile;
use style_parser::{emit_stylesheet, EmitOptions, TemplateDocument, TemplateNode};

/// Options for compiling components.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Rename class and id tokens with the component's tag name.
    pub scoped: bool,
    /// Warn about usages with neither a definition nor a default.
    pub report_unresolved: bool,
    /// Log every scoping rewrite at debug level.
    pub trace: bool,
    /// How the compiled CSS is written.
    pub emit: EmitOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            scoped: true,
            report_unresolved: false,
            trace: false,
            emit: EmitOptions::default(),
        }
    }
}

impl PipelineOptions {
    /// Enables or disables scoping.
    pub fn with_scoping(mut self, scoped: bool) -> Self {
        self.scoped = scoped;
        self
    }

    /// Enables or disables unresolved-usage warnings.
    pub fn with_report_unresolved(mut self, report: bool) -> Self {
        self.report_unresolved = report;
        self
    }

    /// Enables or disables the scoping trace.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Sets the CSS emit options.
    pub fn with_emit(mut self, emit: EmitOptions) -> Self {
        self.emit = emit;
        self
    }
}

/// Where a component file is read from and where its CSS is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// The component file.
    pub source: Utf8PathBuf,
    /// The CSS output file.
    pub output: Utf8PathBuf,
}

impl Paths {
    /// Creates paths for a source file and its CSS output.
    pub fn new(source: impl Into<Utf8PathBuf>, output: impl Into<Utf8PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
        }
    }
}

/// The result of compiling one component.
#[derive(Debug, Clone)]
pub struct CompiledComponent {
    /// The custom element name.
    pub tag_name: SmolStr,
    /// The emitted stylesheet; empty for a component without styles.
    pub css: String,
    /// The stylesheet's `@import` dependencies.
    pub imports: Vec<UrlInfo>,
    /// Original to scoped selector names.
    pub selectors: SelectorTable,
    /// The component template with scoped attributes.
    pub template: Vec<TemplateNode>,
}

/// Compiles one component.
///
/// Passes run in a fixed order: selector catalog, variable table, variable
/// resolution, definition stripping, URL rewriting, import collection,
/// selector renaming, template scoping and finally the selector table.
pub fn compile_component(
    component: Component,
    options: &PipelineOptions,
    paths: &Paths,
    messages: &mut Messages,
) -> CompiledComponent {
    let Component {
        tag_name,
        stylesheets,
        mut template,
        ..
    } = component;

    let mut stylesheets = stylesheets.into_iter();
    let first = stylesheets.next();
    for extra in stylesheets {
        messages.warn(
            MessageCode::DuplicateStylesheet,
            format!("component <{tag_name}> has more than one stylesheet; only the first is used"),
            &extra.file,
            extra.span,
        );
    }

    let prefix = options.scoped.then_some(tag_name.as_str());
    let Some(mut stylesheet) = first else {
        return CompiledComponent {
            selectors: SelectorTable::build(&SelectorCatalog::default(), prefix),
            tag_name,
            css: String::new(),
            imports: Vec::new(),
            template,
        };
    };

    let catalog = SelectorCatalog::collect(&stylesheet);
    let table = VariableTable::collect(&stylesheet);
    VariableResolver::new(&table)
        .report_unresolved(options.report_unresolved)
        .resolve(&mut stylesheet, messages);
    let stripped = strip_definitions(&mut stylesheet);

    let rewritten = UrlRewriter::new(&paths.source, &paths.output).rewrite(&mut stylesheet);
    let imports = collect_imports(&stylesheet, &paths.source);

    rename_selectors(&mut stylesheet, &catalog, prefix);
    ScopeRenamer::new(&catalog, prefix)
        .with_trace(options.trace)
        .rename(&mut template);
    let selectors = SelectorTable::build(&catalog, prefix);

    log::debug!(
        "compiled <{}>: {} variables ({} definitions stripped), {} urls rewritten, {} imports, {} selectors",
        tag_name,
        table.len(),
        stripped,
        rewritten,
        imports.len(),
        selectors.len()
    );

    CompiledComponent {
        css: emit_stylesheet(&stylesheet, &options.emit),
        tag_name,
        imports,
        selectors,
        template,
    }
}

/// Compiles every component defined in `document`.
///
/// Each definition's `<style>` elements are removed from the document and
/// its template is scoped in place, so the returned components carry an
/// empty `template`. Components are returned in document order.
pub fn compile_document(
    document: &mut TemplateDocument,
    options: &PipelineOptions,
    paths: &Paths,
    messages: &mut Messages,
) -> Vec<CompiledComponent> {
    let file = document.file.clone();
    let mut compiled = Vec::new();
    compile_nodes(&mut document.nodes, &file, options, paths, messages, &mut compiled);
    compiled
}

fn compile_nodes(
    nodes: &mut [TemplateNode],
    file: &SourceFile,
    options: &PipelineOptions,
    paths: &Paths,
    messages: &mut Messages,
    compiled: &mut Vec<CompiledComponent>,
) {
    for node in nodes {
        let TemplateNode::Element(element) = node else {
            continue;
        };
        if !is_definition(element) {
            compile_nodes(&mut element.children, file, options, paths, messages, compiled);
            continue;
        }
        if let Some(component) = take_component(element, file, messages) {
            let mut result = compile_component(component, options, paths, messages);
            element.children = std::mem::take(&mut result.template);
            compiled.push(result);
        }
    }
}
