//! Message types and the append-only message sink.

use source_map::{SourceFile, SourceLocation, Span};
use style_parser::ParseError;

/// A message raised while compiling a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The message code.
    pub code: MessageCode,
    /// The severity level.
    pub severity: Severity,
    /// The message text.
    pub text: String,
    /// Where the message points.
    pub location: SourceLocation,
}

impl Message {
    /// Creates a message with the code's default severity.
    pub fn new(code: MessageCode, text: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            severity: code.default_severity(),
            code,
            text: text.into(),
            location,
        }
    }

    /// Creates a message pointing at `span` in `file`.
    pub fn at(code: MessageCode, text: impl Into<String>, file: &SourceFile, span: Span) -> Self {
        Self::new(code, text, file.locate(span))
    }
}

/// The severity of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Reported, but the build continues.
    Warning,
    /// Fails the build.
    Error,
}

impl Severity {
    /// Returns the capitalized severity name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// Message codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageCode {
    /// `parse-warning`: forwarded from the stylesheet or template parser
    ParseWarning,
    /// `var-cycle`: a variable takes part in a reference cycle
    VarCycle,
    /// `unresolved-var`: a usage with neither a definition nor a default
    UnresolvedVar,
    /// `import-unresolved`: an imported stylesheet does not exist
    ImportUnresolved,
    /// `duplicate-stylesheet`: a component carries more than one stylesheet
    DuplicateStylesheet,
}

impl MessageCode {
    /// Returns the default severity for this code.
    ///
    /// Nothing in the compiler is fatal on its own; errors only appear once a
    /// caller promotes warnings.
    pub fn default_severity(&self) -> Severity {
        match self {
            MessageCode::ParseWarning
            | MessageCode::VarCycle
            | MessageCode::UnresolvedVar
            | MessageCode::ImportUnresolved
            | MessageCode::DuplicateStylesheet => Severity::Warning,
        }
    }

    /// Returns the message code as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageCode::ParseWarning => "parse-warning",
            MessageCode::VarCycle => "var-cycle",
            MessageCode::UnresolvedVar => "unresolved-var",
            MessageCode::ImportUnresolved => "import-unresolved",
            MessageCode::DuplicateStylesheet => "duplicate-stylesheet",
        }
    }
}

impl std::fmt::Display for MessageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An append-only message sink.
///
/// Messages keep the order in which passes discover them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Messages {
    items: Vec<Message>,
}

impl Messages {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message.
    pub fn push(&mut self, message: Message) {
        self.items.push(message);
    }

    /// Appends a warning pointing at `span` in `file`.
    pub fn warn(&mut self, code: MessageCode, text: impl Into<String>, file: &SourceFile, span: Span) {
        self.push(Message::at(code, text, file, span));
    }

    /// Forwards parser errors verbatim as [`MessageCode::ParseWarning`]s.
    pub fn forward_parse_errors(&mut self, errors: &[ParseError], file: &SourceFile) {
        for error in errors {
            self.warn(MessageCode::ParseWarning, error.to_string(), file, error.span);
        }
    }

    /// Raises every warning to an error.
    pub fn promote_warnings(&mut self) {
        for message in &mut self.items {
            message.severity = Severity::Error;
        }
    }

    /// Iterates messages in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.items.iter()
    }

    /// Returns the number of messages.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if no message was raised.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Returns the number of errors.
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    fn count(&self, severity: Severity) -> usize {
        self.items.iter().filter(|m| m.severity == severity).count()
    }

    /// Consumes the sink.
    pub fn into_vec(self) -> Vec<Message> {
        self.items
    }
}

impl Extend<Message> for Messages {
    fn extend<T: IntoIterator<Item = Message>>(&mut self, iter: T) {
        self.items.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Messages {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for Messages {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use style_parser::parse_stylesheet;

    #[test]
    fn test_forwarded_parse_errors_keep_text() {
        let result = parse_stylesheet("bad.css", ".a { color red; }");
        let mut messages = Messages::new();
        messages.forward_parse_errors(&result.errors, &result.stylesheet.file);

        assert_eq!(messages.len(), 1);
        let message = messages.iter().next().unwrap();
        assert_eq!(message.code, MessageCode::ParseWarning);
        assert_eq!(message.text, result.errors[0].to_string());
        assert_eq!(message.location.source, "bad.css");
    }

    #[test]
    fn test_promote_warnings() {
        let file = SourceFile::new("a.css", "x");
        let mut messages = Messages::new();
        messages.warn(MessageCode::VarCycle, "var cycle detected var-x", &file, Span::new(0u32, 1u32));
        assert_eq!((messages.warning_count(), messages.error_count()), (1, 0));

        messages.promote_warnings();
        assert_eq!((messages.warning_count(), messages.error_count()), (0, 1));
    }

    #[test]
    fn test_code_strings() {
        assert_eq!(MessageCode::VarCycle.to_string(), "var-cycle");
        assert_eq!(MessageCode::ImportUnresolved.default_severity(), Severity::Warning);
    }
}
