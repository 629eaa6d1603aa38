//! Output formatting.

use crate::cli::{OutputFormat, Threshold};
use scoped_styles::{Message, Severity};
use serde::Serialize;
use source_map::{LineCol, LineIndex};

/// A formatted message for output.
#[derive(Debug, Serialize)]
pub struct FormattedMessage {
    /// The message type (Error or Warning).
    #[serde(rename = "type")]
    pub message_type: String,
    /// The file path.
    pub filename: String,
    /// The start position.
    pub start: Position,
    /// The end position.
    pub end: Position,
    /// The message.
    pub message: String,
    /// The message code.
    pub code: String,
}

/// A position in the source.
#[derive(Debug, Serialize)]
pub struct Position {
    /// 1-indexed line number.
    pub line: u32,
    /// 1-indexed column number.
    pub column: u32,
    /// Byte offset.
    pub offset: u32,
}

/// Returns true if a message of `severity` passes the threshold.
pub fn include_severity(severity: Severity, threshold: Threshold) -> bool {
    match threshold {
        Threshold::Error => severity == Severity::Error,
        Threshold::Warning => true,
    }
}

/// Formats messages for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the messages of one file. `source` is that file's text.
    ///
    /// JSON output is produced once for the whole run with
    /// [`Formatter::format_json_messages`]; here it renders a standalone array.
    pub fn format(&self, messages: &[Message], source: &str) -> String {
        match self.format {
            OutputFormat::Human => self.format_human(messages),
            OutputFormat::HumanVerbose => self.format_human_verbose(messages, source),
            OutputFormat::Json => {
                let formatted = Self::format_json_messages(messages, source);
                serde_json::to_string_pretty(&formatted).unwrap_or_default()
            }
            OutputFormat::Machine => self.format_machine(messages, source),
        }
    }

    /// Formats as human-readable output.
    fn format_human(&self, messages: &[Message]) -> String {
        let mut output = String::new();

        for message in messages {
            output.push_str(&format!(
                "{}\n{}: {} ({})\n\n",
                message.location,
                message.severity.as_str(),
                message.text,
                message.code
            ));
        }

        output
    }

    /// Formats as human-readable output with code snippets.
    fn format_human_verbose(&self, messages: &[Message], source: &str) -> String {
        let lines: Vec<&str> = source.lines().collect();
        let mut output = String::new();

        for message in messages {
            let location = &message.location;
            output.push_str(&format!(
                "{}\n{}: {} ({})\n",
                location,
                message.severity.as_str(),
                message.text,
                message.code
            ));

            let line_num = location.line.saturating_sub(1) as usize;
            if let Some(line) = lines.get(line_num) {
                output.push_str(&format!("  {} | {}\n", line_num + 1, line));

                let padding = " ".repeat(location.column.saturating_sub(1) as usize);
                output.push_str(&format!(
                    "  {} | {}^\n",
                    " ".repeat((line_num + 1).to_string().len()),
                    padding
                ));
            }

            output.push('\n');
        }

        output
    }

    /// Formats messages into JSON-ready structs.
    pub fn format_json_messages(messages: &[Message], source: &str) -> Vec<FormattedMessage> {
        let line_index = LineIndex::new(source);
        messages
            .iter()
            .map(|message| {
                let span = message.location.span;
                let end = line_index.line_col(span.end).unwrap_or(LineCol::new(0, 0));

                FormattedMessage {
                    message_type: message.severity.as_str().to_string(),
                    filename: message.location.source.to_string(),
                    start: Position {
                        line: message.location.line,
                        column: message.location.column,
                        offset: u32::from(span.start),
                    },
                    end: Position {
                        line: end.line + 1,
                        column: end.col + 1,
                        offset: u32::from(span.end),
                    },
                    message: message.text.clone(),
                    code: message.code.to_string(),
                }
            })
            .collect()
    }

    /// Formats as machine-readable output.
    fn format_machine(&self, messages: &[Message], source: &str) -> String {
        let line_index = LineIndex::new(source);
        let mut output = String::new();

        for message in messages {
            let location = &message.location;
            let end = line_index
                .line_col(location.span.end)
                .unwrap_or(LineCol::new(0, 0));

            let severity = match message.severity {
                Severity::Error => "ERROR",
                Severity::Warning => "WARNING",
            };

            output.push_str(&format!(
                "{} {}:{}:{}:{}:{} {} ({})\n",
                severity,
                location.source,
                location.line,
                location.column,
                end.line + 1,
                end.col + 1,
                message.text,
                message.code
            ));
        }

        output
    }
}

/// Summary of a build.
#[derive(Debug, Default)]
pub struct CheckSummary {
    /// Number of component files compiled.
    pub file_count: usize,
    /// Number of components found.
    pub component_count: usize,
    /// Number of errors.
    pub error_count: usize,
    /// Number of warnings.
    pub warning_count: usize,
    /// Whether to fail on warnings.
    pub fail_on_warnings: bool,
}

impl CheckSummary {
    /// Returns true if the build should exit with a failure status.
    pub fn failed(&self) -> bool {
        self.error_count > 0 || (self.warning_count > 0 && self.fail_on_warnings)
    }

    /// Formats the summary line.
    pub fn format(&self) -> String {
        let error_word = if self.error_count == 1 {
            "error"
        } else {
            "errors"
        };
        let warning_word = if self.warning_count == 1 {
            "warning"
        } else {
            "warnings"
        };
        let file_word = if self.file_count == 1 {
            "file"
        } else {
            "files"
        };

        format!(
            "====================================\nscoped-styles found {} {} and {} {} in {} {}",
            self.error_count,
            error_word,
            self.warning_count,
            warning_word,
            self.file_count,
            file_word
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scoped_styles::MessageCode;
    use source_map::{SourceFile, Span};

    const SOURCE: &str = "<element name=\"x-a\">\n<style>@a: var(a);</style>\n</element>";

    fn cycle_message() -> Message {
        let file = SourceFile::new("x-a.html", SOURCE);
        // `@a: var(a);` starts at line 2, column 8.
        Message::at(
            MessageCode::VarCycle,
            "var cycle detected var-a",
            &file,
            Span::from_range(28..39),
        )
    }

    #[test]
    fn test_format_human() {
        let formatter = Formatter::new(OutputFormat::Human);
        let output = formatter.format(&[cycle_message()], SOURCE);
        assert_eq!(
            output,
            "x-a.html:2:8\nWarning: var cycle detected var-a (var-cycle)\n\n"
        );
    }

    #[test]
    fn test_format_human_verbose() {
        let formatter = Formatter::new(OutputFormat::HumanVerbose);
        let output = formatter.format(&[cycle_message()], SOURCE);
        assert!(output.contains("  2 | <style>@a: var(a);</style>\n"));
        assert!(output.contains("    |        ^\n"));
    }

    #[test]
    fn test_format_json() {
        let formatted = Formatter::format_json_messages(&[cycle_message()], SOURCE);
        assert_eq!(formatted.len(), 1);
        assert_eq!(formatted[0].message_type, "Warning");
        assert_eq!(formatted[0].filename, "x-a.html");
        assert_eq!(formatted[0].code, "var-cycle");
        assert_eq!((formatted[0].start.line, formatted[0].start.column), (2, 8));
        assert_eq!((formatted[0].end.line, formatted[0].end.column), (2, 19));

        let output = Formatter::new(OutputFormat::Json).format(&[cycle_message()], SOURCE);
        assert!(output.contains("\"type\": \"Warning\""));
    }

    #[test]
    fn test_format_machine() {
        let formatter = Formatter::new(OutputFormat::Machine);
        let output = formatter.format(&[cycle_message()], SOURCE);
        assert_eq!(
            output,
            "WARNING x-a.html:2:8:2:19 var cycle detected var-a (var-cycle)\n"
        );
    }

    #[test]
    fn test_threshold() {
        assert!(include_severity(Severity::Warning, Threshold::Warning));
        assert!(include_severity(Severity::Error, Threshold::Error));
        assert!(!include_severity(Severity::Warning, Threshold::Error));
    }

    #[test]
    fn test_summary() {
        let summary = CheckSummary {
            file_count: 5,
            error_count: 2,
            warning_count: 3,
            ..Default::default()
        };

        let output = summary.format();
        assert!(output.ends_with("scoped-styles found 2 errors and 3 warnings in 5 files"));
        assert!(summary.failed());
    }

    #[test]
    fn test_summary_warnings_only_fail_when_asked() {
        let mut summary = CheckSummary {
            file_count: 1,
            warning_count: 1,
            ..Default::default()
        };
        assert!(!summary.failed());
        assert!(summary.format().ends_with("0 errors and 1 warning in 1 file"));

        summary.fail_on_warnings = true;
        assert!(summary.failed());
    }
}
