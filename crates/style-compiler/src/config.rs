//! Configuration loading.

use crate::cli::Args;
use camino::{Utf8Path, Utf8PathBuf};
use scoped_styles::PipelineOptions;
use serde::Deserialize;
use std::fs;
use style_parser::EmitOptions;
use thiserror::Error;

/// The config file looked up in the workspace root.
pub const CONFIG_FILE: &str = "scoped-styles.json";

/// The output directory used when neither the config nor the CLI names one.
pub const DEFAULT_OUT_DIR: &str = "build";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`ProjectConfig`].
    #[error("invalid config {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },
}

/// The contents of `scoped-styles.json`.
///
/// Every field is optional; CLI flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Output directory, relative to the workspace.
    pub out_dir: Option<Utf8PathBuf>,

    /// Whether class and id names are scoped.
    pub scoped: Option<bool>,

    /// Glob patterns to ignore.
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Warn about unresolved variable usages.
    pub report_unresolved: Option<bool>,

    /// Treat warnings as errors.
    pub fail_on_warnings: Option<bool>,

    /// Component file extensions.
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl ProjectConfig {
    /// Loads the config for a workspace.
    ///
    /// An explicit path must exist. Without one, a missing
    /// `scoped-styles.json` yields the default config.
    pub fn load(workspace: &Utf8Path, explicit: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) if path.is_relative() => workspace.join(path),
            Some(path) => path.to_path_buf(),
            None => {
                let path = workspace.join(CONFIG_FILE);
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Parses config text. `//` and `/* */` comments are allowed.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(&remove_json_comments(content))
    }
}

/// Build settings after merging the config file with CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    /// Output directory, absolute or relative to the workspace.
    pub out_dir: Utf8PathBuf,
    /// Whether class and id names are scoped.
    pub scoped: bool,
    /// Extra glob patterns to ignore.
    pub ignore: Vec<String>,
    /// Warn about unresolved variable usages.
    pub report_unresolved: bool,
    /// Treat warnings as errors.
    pub fail_on_warnings: bool,
    /// Component file extensions, with their leading dot.
    pub extensions: Vec<String>,
    /// Log every class and id rewrite.
    pub trace: bool,
    /// Write compact CSS.
    pub compact: bool,
}

impl BuildSettings {
    /// Merges `config` with the flags in `args`.
    ///
    /// Boolean flags can only switch a behaviour on (or scoping off); list
    /// flags are appended to the config's lists.
    pub fn resolve(args: &Args, config: ProjectConfig) -> Self {
        let mut ignore = config.ignore;
        ignore.extend(args.ignore.iter().cloned());

        let extensions = if args.extensions.is_empty() {
            config.extensions
        } else {
            args.extensions.clone()
        };
        let extensions = if extensions.is_empty() {
            vec![".html".to_string()]
        } else {
            extensions.into_iter().map(normalize_extension).collect()
        };

        Self {
            out_dir: args
                .out_dir
                .clone()
                .or(config.out_dir)
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUT_DIR)),
            scoped: !args.no_scope && config.scoped.unwrap_or(true),
            ignore,
            report_unresolved: args.report_unresolved || config.report_unresolved.unwrap_or(false),
            fail_on_warnings: args.fail_on_warnings || config.fail_on_warnings.unwrap_or(false),
            extensions,
            trace: args.trace,
            compact: args.compact,
        }
    }

    /// The options handed to the component pipeline.
    pub fn pipeline_options(&self) -> PipelineOptions {
        let emit = if self.compact {
            EmitOptions::compact()
        } else {
            EmitOptions::default()
        };
        PipelineOptions::default()
            .with_scoping(self.scoped)
            .with_report_unresolved(self.report_unresolved)
            .with_trace(self.trace)
            .with_emit(emit)
    }

    /// Returns true if `file_name` has one of the component extensions.
    pub fn is_component_file(&self, file_name: &str) -> bool {
        self.extensions.iter().any(|ext| file_name.ends_with(ext.as_str()))
    }
}

fn normalize_extension(extension: String) -> String {
    if extension.starts_with('.') {
        extension
    } else {
        format!(".{extension}")
    }
}

/// Removes single-line and multi-line comments from JSON.
fn remove_json_comments(json: &str) -> String {
    let mut result = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            result.push(c);
            if c == '"' {
                in_string = false;
            } else if c == '\\' {
                if let Some(next) = chars.next() {
                    result.push(next);
                }
            }
        } else if c == '"' {
            result.push(c);
            in_string = true;
        } else if c == '/' {
            match chars.peek() {
                Some('/') => {
                    while let Some(&next) = chars.peek() {
                        if next == '\n' {
                            break;
                        }
                        chars.next();
                    }
                }
                Some('*') => {
                    chars.next();
                    while let Some(next) = chars.next() {
                        if next == '*' && chars.peek() == Some(&'/') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => result.push(c),
            }
        } else {
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn args(extra: &[&str]) -> Args {
        Args::parse_from(std::iter::once("scoped-styles").chain(extra.iter().copied()))
    }

    #[test]
    fn test_remove_comments() {
        let json = r#"{
            // This is a comment
            "outDir": "dist/*x*/" /* inline comment */
        }"#;

        let cleaned = remove_json_comments(json);
        assert!(!cleaned.contains("//"));
        assert!(!cleaned.contains("inline"));
        assert!(cleaned.contains("\"dist/*x*/\""));
    }

    #[test]
    fn test_parse_config() {
        let config = ProjectConfig::parse(
            r#"{
                "outDir": "public/css",
                "scoped": false,
                "ignore": ["legacy/**"],
                "reportUnresolved": true,
                "extensions": [".htm"]
            }"#,
        )
        .unwrap();

        assert_eq!(
            config,
            ProjectConfig {
                out_dir: Some("public/css".into()),
                scoped: Some(false),
                ignore: vec!["legacy/**".to_string()],
                report_unresolved: Some(true),
                fail_on_warnings: None,
                extensions: vec![".htm".to_string()],
            }
        );
    }

    #[test]
    fn test_unknown_types_are_rejected() {
        assert!(ProjectConfig::parse(r#"{ "scoped": "yes" }"#).is_err());
    }

    #[test]
    fn test_defaults() {
        let settings = BuildSettings::resolve(&args(&[]), ProjectConfig::default());
        assert_eq!(settings.out_dir.as_str(), "build");
        assert!(settings.scoped);
        assert!(!settings.report_unresolved);
        assert!(!settings.fail_on_warnings);
        assert_eq!(settings.extensions, [".html"]);
        assert!(settings.is_component_file("index.html"));
        assert!(!settings.is_component_file("index.css"));
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = ProjectConfig {
            out_dir: Some("public".into()),
            ignore: vec!["legacy/**".to_string()],
            extensions: vec![".htm".to_string()],
            ..Default::default()
        };
        let settings = BuildSettings::resolve(
            &args(&["--out-dir", "dist", "--no-scope", "--ignore", "tmp/**", "--extensions", "html"]),
            config,
        );
        assert_eq!(settings.out_dir.as_str(), "dist");
        assert!(!settings.scoped);
        assert_eq!(settings.ignore, ["legacy/**", "tmp/**"]);
        assert_eq!(settings.extensions, [".html"]);
    }

    #[test]
    fn test_config_can_disable_scoping() {
        let config = ProjectConfig {
            scoped: Some(false),
            fail_on_warnings: Some(true),
            ..Default::default()
        };
        let settings = BuildSettings::resolve(&args(&[]), config);
        assert!(!settings.scoped);
        assert!(settings.fail_on_warnings);
        assert!(!settings.pipeline_options().scoped);
    }

    #[test]
    fn test_load_missing_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Utf8Path::from_path(dir.path()).unwrap();
        assert_eq!(ProjectConfig::load(workspace, None).unwrap(), ProjectConfig::default());
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Utf8Path::from_path(dir.path()).unwrap();
        let err = ProjectConfig::load(workspace, Some(Utf8Path::new("nope.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_from_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Utf8Path::from_path(dir.path()).unwrap();
        fs::write(workspace.join(CONFIG_FILE), r#"{ "outDir": "out" }"#).unwrap();
        let config = ProjectConfig::load(workspace, None).unwrap();
        assert_eq!(config.out_dir.as_deref(), Some(Utf8Path::new("out")));
    }
}
