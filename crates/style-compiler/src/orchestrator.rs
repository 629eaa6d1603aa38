//! Main orchestration logic.

use crate::cli::{Args, OutputFormat, Threshold};
use crate::config::{BuildSettings, ConfigError, ProjectConfig};
use crate::output::{include_severity, CheckSummary, Formatter};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use scoped_styles::{
    collect_imports, compile_document, normalize_path, CompiledComponent, Message, MessageCode, Messages, Paths,
    SelectorTable, Severity,
};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::time::Instant;
use style_parser::{emit_template, parse_stylesheet, parse_template};
use thiserror::Error;
use walkdir::WalkDir;

/// Orchestration errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The workspace directory could not be resolved.
    #[error("invalid workspace {path}: {reason}")]
    InvalidWorkspace { path: Utf8PathBuf, reason: String },

    /// The config file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The output directory is the workspace, so outputs would replace sources.
    #[error("output directory {path} is the workspace; choose a separate directory")]
    OutputIsWorkspace { path: Utf8PathBuf },

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// Failed to read a component file.
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a build output.
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: Utf8PathBuf,
        source: std::io::Error,
    },
}

/// The result of compiling one component file.
#[derive(Debug)]
pub struct FileReport {
    /// The file, relative to the workspace.
    pub path: Utf8PathBuf,
    /// The file's text, kept for snippets and end positions.
    pub source: String,
    /// How many components the file defines.
    pub component_count: usize,
    /// Every message raised for the file.
    pub messages: Messages,
    /// Imported stylesheets found on disk, relative to the workspace.
    pub imports: Vec<Utf8PathBuf>,
}

/// Runs a build and prints its messages.
pub fn run(args: Args) -> Result<CheckSummary, OrchestratorError> {
    let total_start = Instant::now();
    let workspace = resolve_workspace(&args.workspace)?;
    let config = ProjectConfig::load(&workspace, args.config.as_deref())?;
    let settings = BuildSettings::resolve(&args, config);

    let files = find_files(&workspace, &settings)?;
    log::info!("compiling {} component files in {}", files.len(), workspace);

    let reports = compile_workspace(&workspace, &files, &settings)?;
    let summary = report(&reports, &args, &settings);

    log::info!(
        "compiled {} components in {} files in {:?}",
        summary.component_count,
        summary.file_count,
        total_start.elapsed()
    );
    Ok(summary)
}

fn resolve_workspace(workspace: &Utf8Path) -> Result<Utf8PathBuf, OrchestratorError> {
    if !workspace.is_relative() {
        return Ok(workspace.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| OrchestratorError::InvalidWorkspace {
        path: workspace.to_path_buf(),
        reason: e.to_string(),
    })?;
    let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| OrchestratorError::InvalidWorkspace {
        path: workspace.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(cwd.join(workspace))
}

/// Finds component files under `workspace`, sorted by path.
///
/// Ignore patterns match paths relative to the workspace. Dependencies and
/// the output directory are always skipped.
pub fn find_files(workspace: &Utf8Path, settings: &BuildSettings) -> Result<Vec<Utf8PathBuf>, OrchestratorError> {
    let ignore_set = ignore_set(workspace, settings)?;
    let mut files: Vec<Utf8PathBuf> = WalkDir::new(workspace)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("skipping unreadable path: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
        .filter(|p| settings.is_component_file(p.file_name().unwrap_or("")))
        .filter(|p| {
            let relative = p.strip_prefix(workspace).unwrap_or(p);
            !ignore_set.is_match(relative.as_str())
        })
        .collect();
    files.sort();
    Ok(files)
}

fn ignore_set(workspace: &Utf8Path, settings: &BuildSettings) -> Result<GlobSet, OrchestratorError> {
    let mut ignore_builder = GlobSetBuilder::new();
    for pattern in &settings.ignore {
        let glob = Glob::new(pattern).map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))?;
        ignore_builder.add(glob);
    }

    let mut defaults = vec!["**/node_modules/**".to_string()];
    if let Some(out_dir) = workspace_relative(workspace, &settings.out_dir) {
        defaults.push(format!("{}/**", out_dir.as_str().trim_end_matches('/')));
    }
    for pattern in defaults {
        if let Ok(glob) = Glob::new(&pattern) {
            ignore_builder.add(glob);
        }
    }

    ignore_builder
        .build()
        .map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))
}

/// Returns `path` relative to `workspace`, or `None` if it lies outside.
fn workspace_relative(workspace: &Utf8Path, path: &Utf8Path) -> Option<Utf8PathBuf> {
    if path.is_relative() {
        Some(path.to_path_buf())
    } else {
        path.strip_prefix(workspace).ok().map(Utf8Path::to_path_buf)
    }
}

/// Compiles `files` in parallel and writes their outputs, then copies the
/// stylesheets they import into the output directory.
///
/// Reports come back in the order of `files`.
pub fn compile_workspace(
    workspace: &Utf8Path,
    files: &[Utf8PathBuf],
    settings: &BuildSettings,
) -> Result<Vec<FileReport>, OrchestratorError> {
    let out_root = output_root(workspace, &settings.out_dir)?;
    let reports = files
        .par_iter()
        .map(|path| compile_file(workspace, path, settings))
        .collect::<Result<Vec<_>, _>>()?;
    copy_imports(workspace, &out_root, &reports)?;
    Ok(reports)
}

/// The output directory as a normalized absolute path.
///
/// Fails when it is the workspace itself.
fn output_root(workspace: &Utf8Path, out_dir: &Utf8Path) -> Result<Utf8PathBuf, OrchestratorError> {
    let out_root = normalize_path(&workspace.join(out_dir));
    if out_root == normalize_path(workspace) {
        return Err(OrchestratorError::OutputIsWorkspace {
            path: out_dir.to_path_buf(),
        });
    }
    Ok(out_root)
}

/// Returns `path` relative to `workspace` if it names an existing file there.
fn workspace_file(workspace: &Utf8Path, path: &Utf8Path) -> Option<Utf8PathBuf> {
    let absolute = normalize_path(&workspace.join(path));
    let relative = absolute.strip_prefix(normalize_path(workspace)).ok()?;
    absolute.is_file().then(|| relative.to_path_buf())
}

/// Mirrors every imported stylesheet under `out_root`, following the
/// imports of imported stylesheets, so `@import` references in the written
/// CSS resolve against the output tree.
fn copy_imports(workspace: &Utf8Path, out_root: &Utf8Path, reports: &[FileReport]) -> Result<(), OrchestratorError> {
    let compiled: BTreeSet<Utf8PathBuf> = reports.iter().map(|r| r.path.with_extension("css")).collect();
    let mut pending: Vec<Utf8PathBuf> = reports.iter().flat_map(|r| r.imports.iter().cloned()).collect();
    let mut copied = BTreeSet::new();

    while let Some(relative) = pending.pop() {
        if !copied.insert(relative.clone()) {
            continue;
        }
        if compiled.contains(&relative) {
            log::warn!("not copying {}: a component compiles to the same output", relative);
            continue;
        }
        let source_path = workspace.join(&relative);
        let text = fs::read_to_string(&source_path).map_err(|source| OrchestratorError::ReadFailed {
            path: source_path.clone(),
            source,
        })?;
        write_output(&out_root.join(&relative), &text)?;

        let stylesheet = parse_stylesheet(relative.as_str(), &text).stylesheet;
        for import in collect_imports(&stylesheet, &relative) {
            let Some(resolved) = import.resolved_path else {
                continue;
            };
            match workspace_file(workspace, &resolved) {
                Some(next) => pending.push(next),
                None => log::warn!("{}: cannot copy imported stylesheet {}", relative, import.url),
            }
        }
    }

    log::debug!("copied {} imported stylesheets", copied.len());
    Ok(())
}

/// Where one component file's outputs go.
struct OutputLayout {
    /// The source path handed to the pipeline.
    source: Utf8PathBuf,
    /// The CSS path handed to the pipeline.
    css: Utf8PathBuf,
    /// The directory that relative paths above are relative to.
    root: Utf8PathBuf,
}

impl OutputLayout {
    /// Mirrors `relative` under the output directory.
    ///
    /// Paths stay relative to the workspace when the output directory is
    /// inside it, so rewritten URLs never embed the build machine's layout.
    fn new(workspace: &Utf8Path, out_dir: &Utf8Path, relative: &Utf8Path) -> Self {
        let css_name = relative.with_extension("css");
        match workspace_relative(workspace, out_dir) {
            Some(out_dir) => Self {
                source: relative.to_path_buf(),
                css: out_dir.join(css_name),
                root: workspace.to_path_buf(),
            },
            None => Self {
                source: workspace.join(relative),
                css: out_dir.join(css_name),
                root: Utf8PathBuf::new(),
            },
        }
    }

    fn absolute(&self, path: &Utf8Path) -> Utf8PathBuf {
        self.root.join(path)
    }
}

fn compile_file(
    workspace: &Utf8Path,
    path: &Utf8Path,
    settings: &BuildSettings,
) -> Result<FileReport, OrchestratorError> {
    let source = fs::read_to_string(path).map_err(|source| OrchestratorError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    let relative = path.strip_prefix(workspace).unwrap_or(path).to_path_buf();
    let layout = OutputLayout::new(workspace, &settings.out_dir, &relative);

    let parse_result = parse_template(relative.as_str(), &source);
    let mut messages = Messages::new();
    messages.forward_parse_errors(&parse_result.errors, &parse_result.document.file);

    let mut document = parse_result.document;
    let compiled = compile_document(
        &mut document,
        &settings.pipeline_options(),
        &Paths::new(layout.source.clone(), layout.css.clone()),
        &mut messages,
    );
    let imports = check_imports(workspace, &compiled, &layout, &mut messages);

    let css_path = layout.absolute(&layout.css);
    write_output(&css_path.with_extension("html"), &emit_template(&document.nodes))?;
    write_output(&css_path, &join_css(&compiled))?;
    write_output(&css_path.with_extension("selectors.json"), &selectors_json(&compiled))?;

    if settings.fail_on_warnings {
        messages.promote_warnings();
    }
    log::debug!(
        "{}: {} components, {} messages",
        relative,
        compiled.len(),
        messages.len()
    );

    Ok(FileReport {
        path: relative,
        source,
        component_count: compiled.len(),
        messages,
        imports,
    })
}

/// Warns about local imports whose target file does not exist and returns
/// the ones that do, relative to the workspace.
fn check_imports(
    workspace: &Utf8Path,
    compiled: &[CompiledComponent],
    layout: &OutputLayout,
    messages: &mut Messages,
) -> Vec<Utf8PathBuf> {
    let mut found = Vec::new();
    for import in compiled.iter().flat_map(|component| &component.imports) {
        let Some(resolved) = &import.resolved_path else {
            continue;
        };
        let absolute = layout.absolute(resolved);
        if !absolute.exists() {
            messages.push(Message::new(
                MessageCode::ImportUnresolved,
                format!("cannot find imported stylesheet {} ({})", import.url, resolved),
                import.location.clone(),
            ));
            continue;
        }
        match workspace_file(workspace, &absolute) {
            Some(relative) => found.push(relative),
            None => log::warn!("{} is outside the workspace and is not copied", absolute),
        }
    }
    found
}

fn join_css(compiled: &[CompiledComponent]) -> String {
    let mut css = compiled
        .iter()
        .map(|component| component.css.as_str())
        .filter(|css| !css.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if !css.is_empty() && !css.ends_with('\n') {
        css.push('\n');
    }
    css
}

/// Selector tables keyed by component tag name.
fn selectors_json(compiled: &[CompiledComponent]) -> String {
    let tables: BTreeMap<&str, &SelectorTable> = compiled
        .iter()
        .map(|component| (component.tag_name.as_str(), &component.selectors))
        .collect();
    serde_json::to_string_pretty(&tables).unwrap_or_else(|_| "{}".to_string())
}

fn write_output(path: &Utf8Path, contents: &str) -> Result<(), OrchestratorError> {
    let write_failed = |source| OrchestratorError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_failed)?;
    }
    fs::write(path, contents).map_err(write_failed)
}

/// Prints every message that passes the threshold and the summary.
fn report(reports: &[FileReport], args: &Args, settings: &BuildSettings) -> CheckSummary {
    let formatter = Formatter::new(args.output);
    let output_json = args.output == OutputFormat::Json;
    let mut summary = CheckSummary {
        file_count: reports.len(),
        fail_on_warnings: settings.fail_on_warnings,
        ..Default::default()
    };
    let mut json_output = Vec::new();

    for file in reports {
        summary.component_count += file.component_count;
        let shown = visible_messages(&file.messages, args.threshold);
        log::debug!("{}: showing {} of {} messages", file.path, shown.len(), file.messages.len());
        summary.error_count += shown.iter().filter(|m| m.severity == Severity::Error).count();
        summary.warning_count += shown.iter().filter(|m| m.severity == Severity::Warning).count();
        if shown.is_empty() {
            continue;
        }
        if output_json {
            json_output.extend(Formatter::format_json_messages(&shown, &file.source));
        } else {
            print!("{}", formatter.format(&shown, &file.source));
        }
    }

    if output_json {
        let json = serde_json::to_string_pretty(&json_output).unwrap_or_else(|_| "[]".to_string());
        println!("{}", json);
    } else {
        println!("{}", summary.format());
    }

    summary
}

fn visible_messages(messages: &Messages, threshold: Threshold) -> Vec<Message> {
    messages
        .iter()
        .filter(|m| include_severity(m.severity, threshold))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn settings(extra: &[&str]) -> BuildSettings {
        let args = Args::parse_from(std::iter::once("scoped-styles").chain(extra.iter().copied()));
        BuildSettings::resolve(&args, ProjectConfig::default())
    }

    fn write(root: &Utf8Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_relative_workspace_is_joined_to_cwd() {
        let workspace = resolve_workspace(Utf8Path::new("site")).unwrap();
        assert!(workspace.is_absolute());
        assert!(workspace.ends_with("site"));
    }

    #[test]
    fn test_find_files_skips_ignored_and_output() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        write(root, "src/a.html", "");
        write(root, "src/b.html", "");
        write(root, "src/notes.txt", "");
        write(root, "node_modules/lib/c.html", "");
        write(root, "build/src/a.html", "");
        write(root, "legacy/d.html", "");

        let files = find_files(root, &settings(&["--ignore", "legacy/**"])).unwrap();
        let relative: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().as_str().to_string())
            .collect();
        assert_eq!(relative, ["src/a.html", "src/b.html"]);
    }

    #[test]
    fn test_invalid_glob() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        let err = find_files(root, &settings(&["--ignore", "a/[b"])).unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidGlob(_)));
    }

    #[test]
    fn test_layout_inside_workspace() {
        let layout = OutputLayout::new(
            Utf8Path::new("/site"),
            Utf8Path::new("/site/build"),
            Utf8Path::new("src/x-foo.html"),
        );
        assert_eq!(layout.source, "src/x-foo.html");
        assert_eq!(layout.css, "build/src/x-foo.css");
        assert_eq!(layout.absolute(&layout.css), "/site/build/src/x-foo.css");
    }

    #[test]
    fn test_layout_outside_workspace() {
        let layout = OutputLayout::new(
            Utf8Path::new("/site"),
            Utf8Path::new("/srv/www"),
            Utf8Path::new("x-foo.html"),
        );
        assert_eq!(layout.source, "/site/x-foo.html");
        assert_eq!(layout.css, "/srv/www/x-foo.css");
    }

    #[test]
    fn test_compile_workspace_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        write(root, "src/theme.css", "@import \"base/reset.css\";\n.theme { top: 0; }");
        write(root, "src/base/reset.css", "* { margin: 0; }");
        write(
            root,
            "src/x-card.html",
            r#"<element name="x-card"><style>@import "theme.css"; @import "missing.css";
.card { background: url(img/bg.png); }</style><div class="card"></div></element>"#,
        );

        let settings = settings(&["--compact"]);
        let files = find_files(root, &settings).unwrap();
        let reports = compile_workspace(root, &files, &settings).unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].path, "src/x-card.html");
        assert_eq!(reports[0].component_count, 1);
        let codes: Vec<_> = reports[0].messages.iter().map(|m| m.code).collect();
        assert_eq!(codes, [MessageCode::ImportUnresolved]);

        let css = fs::read_to_string(root.join("build/src/x-card.css")).unwrap();
        assert!(css.contains(".x-card_card { background: url(../../src/img/bg.png); }"), "{css}");
        assert!(css.contains("@import \"theme.css\";"), "{css}");
        assert_eq!(reports[0].imports, [Utf8PathBuf::from("src/theme.css")]);

        // Imports resolve from the written CSS, including nested ones.
        let out_dir = root.join("build/src");
        assert_eq!(
            fs::read_to_string(out_dir.join("theme.css")).unwrap(),
            fs::read_to_string(root.join("src/theme.css")).unwrap()
        );
        assert!(out_dir.join("base/reset.css").is_file());
        let html = fs::read_to_string(root.join("build/src/x-card.html")).unwrap();
        assert_eq!(html, r#"<element name="x-card"><div class="x-card_card"></div></element>"#);
        let selectors = fs::read_to_string(root.join("build/src/x-card.selectors.json")).unwrap();
        let selectors: serde_json::Value = serde_json::from_str(&selectors).unwrap();
        assert_eq!(selectors["x-card"][".card"], ".x-card_card");
    }

    #[test]
    fn test_imports_across_directories_are_mirrored() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        write(root, "styles/base.css", ".base { top: 0; }");
        write(
            root,
            "pages/x-page.html",
            r#"<element name="x-page"><style>@import "../styles/base.css";</style></element>"#,
        );
        let out = tempfile::tempdir().unwrap();
        let out = Utf8Path::from_path(out.path()).unwrap();

        for out_dir in [out.to_path_buf(), Utf8PathBuf::from("build")] {
            let settings = settings(&["--out-dir", out_dir.as_str()]);
            let files = find_files(root, &settings).unwrap();
            let reports = compile_workspace(root, &files, &settings).unwrap();
            assert!(reports[0].messages.is_empty());
            let out_root = root.join(&out_dir);
            assert!(out_root.join("pages/../styles/base.css").is_file(), "{out_root}");
        }
    }

    #[test]
    fn test_out_dir_must_not_be_the_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        let source = r#"<element name="x-a"><style>.a { top: 0; }</style><p class="a"></p></element>"#;
        write(root, "x-a.html", source);

        for out_dir in [".", "sub/..", root.as_str()] {
            let settings = settings(&["--out-dir", out_dir]);
            let files = [root.join("x-a.html")];
            let err = compile_workspace(root, &files, &settings).unwrap_err();
            assert!(matches!(err, OrchestratorError::OutputIsWorkspace { .. }), "{out_dir}: {err}");
        }
        assert_eq!(fs::read_to_string(root.join("x-a.html")).unwrap(), source);
    }

    #[test]
    fn test_find_files_skips_unreadable_paths() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        let files = find_files(&root.join("missing"), &settings(&[])).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_fail_on_warnings_promotes() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        write(
            root,
            "x-a.html",
            r#"<element name="x-a"><style>@a: var(a);</style></element>"#,
        );

        let settings = settings(&["--fail-on-warnings"]);
        let files = find_files(root, &settings).unwrap();
        let reports = compile_workspace(root, &files, &settings).unwrap();
        assert_eq!(reports[0].messages.error_count(), 1);
        assert_eq!(reports[0].messages.warning_count(), 0);
    }
}
