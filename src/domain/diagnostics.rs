//! The diagnostic model (C9): error taxonomy, positions, and stable rendering.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::SourcePosition;

/// The diagnostic taxonomy (spec §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// The request line didn't match `METHOD SP URL [SP HTTP/x.y]`.
    MalformedRequestLine,
    /// A header line didn't match `Name: Value`, or used leading-whitespace continuation.
    MalformedHeader,
    /// A directive appeared somewhere it can't be attached to a request.
    MisplacedDirective,
    /// A block (e.g. a request) was never closed before end of input.
    UnterminatedBlock,
    /// `@name` was missing or empty.
    MissingRequestName,
    /// `@id` was present but empty.
    MissingRequestId,
    /// `@name` value didn't match the identifier grammar.
    InvalidRequestName,
    /// `@id` value didn't match the identifier grammar.
    InvalidRequestId,
    /// Two requests declared the same `@name`.
    DuplicateRequestName,
    /// Two requests declared the same `@id`.
    DuplicateRequestId,
    /// An `@expect-*` value was malformed (bad status, bad header shape, bad duration).
    InvalidMetadataValue,
    /// A variable reference formed a cycle during resolution. Non-fatal.
    CyclicVariable,
    /// Resolution was cancelled via the caller's cancellation token. Non-fatal.
    Cancelled,
}

/// A single diagnostic: what went wrong, where, and (for duplicates) where it
/// first happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The kind of problem.
    pub kind: DiagnosticKind,
    /// The core message text (exact wording depends on `kind`; see rendering rules).
    pub message: String,
    /// Where the diagnostic applies. `line == 0` / `column == 0` mean "unknown".
    pub position: SourcePosition,
    /// For duplicate-class diagnostics, where the name/id was first defined.
    pub first_occurrence_line: Option<u32>,
    /// The offending fragment of source text, when useful to show it verbatim.
    pub parsed_content: Option<String>,
}

impl Diagnostic {
    fn new(kind: DiagnosticKind, message: impl Into<String>, position: SourcePosition) -> Self {
        Self {
            kind,
            message: message.into(),
            position,
            first_occurrence_line: None,
            parsed_content: None,
        }
    }

    /// Attach the offending source fragment.
    #[must_use]
    pub fn with_parsed_content(mut self, content: impl Into<String>) -> Self {
        self.parsed_content = Some(content.into());
        self
    }

    /// `line`, 0 if unknown.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.position.line
    }

    /// `column`, 0 if unknown.
    #[must_use]
    pub fn column(&self) -> u32 {
        self.position.column
    }

    pub(crate) fn malformed_request_line(position: SourcePosition, raw: &str) -> Self {
        Self::new(
            DiagnosticKind::MalformedRequestLine,
            "Malformed request line, expected 'METHOD URL [HTTP/x.y]'",
            position,
        )
        .with_parsed_content(raw)
    }

    pub(crate) fn malformed_header(position: SourcePosition, raw: &str) -> Self {
        Self::new(
            DiagnosticKind::MalformedHeader,
            "Malformed header line, expected 'Name: Value' with no leading whitespace",
            position,
        )
        .with_parsed_content(raw)
    }

    pub(crate) fn misplaced_directive(position: SourcePosition, raw: &str) -> Self {
        Self::new(
            DiagnosticKind::MisplacedDirective,
            "Directive appeared where it cannot be attached to a request",
            position,
        )
        .with_parsed_content(raw)
    }

    pub(crate) fn unterminated_block(position: SourcePosition) -> Self {
        Self::new(
            DiagnosticKind::UnterminatedBlock,
            "Request block was not terminated before end of input",
            position,
        )
    }

    pub(crate) fn missing_request_name(line: u32) -> Self {
        Self::new(
            DiagnosticKind::MissingRequestName,
            format!("Request at line {line} is missing a required request name"),
            SourcePosition::at_line(line),
        )
    }

    pub(crate) fn missing_request_id(line: u32) -> Self {
        Self::new(
            DiagnosticKind::MissingRequestId,
            format!("Request at line {line} is missing a required request ID"),
            SourcePosition::at_line(line),
        )
    }

    pub(crate) fn invalid_request_name(position: SourcePosition, value: &str) -> Self {
        let shown = if value.is_empty() { "''" } else { value };
        Self::new(
            DiagnosticKind::InvalidRequestName,
            format!(
                "Invalid request name '{shown}'. Request names must contain only alphanumeric characters, hyphens, and underscores"
            ),
            position,
        )
    }

    pub(crate) fn invalid_request_id(position: SourcePosition, value: &str) -> Self {
        let shown = if value.is_empty() { "''" } else { value };
        Self::new(
            DiagnosticKind::InvalidRequestId,
            format!(
                "Invalid request ID '{shown}'. Request IDs must contain only alphanumeric characters, hyphens, and underscores"
            ),
            position,
        )
    }

    pub(crate) fn duplicate_request_name(line: u32, name: &str, first_occurrence_line: u32) -> Self {
        let shown = if name.is_empty() { "''" } else { name };
        Self {
            first_occurrence_line: Some(first_occurrence_line),
            ..Self::new(
                DiagnosticKind::DuplicateRequestName,
                format!(
                    "Duplicate request name '{shown}' found. First defined at line {first_occurrence_line}"
                ),
                SourcePosition::at_line(line),
            )
        }
    }

    pub(crate) fn duplicate_request_id(line: u32, id: &str, first_occurrence_line: u32) -> Self {
        let shown = if id.is_empty() { "''" } else { id };
        Self {
            first_occurrence_line: Some(first_occurrence_line),
            ..Self::new(
                DiagnosticKind::DuplicateRequestId,
                format!(
                    "Duplicate request ID '{shown}' found. First defined at line {first_occurrence_line}"
                ),
                SourcePosition::at_line(line),
            )
        }
    }

    pub(crate) fn invalid_metadata_value(position: SourcePosition, detail: &str) -> Self {
        Self::new(
            DiagnosticKind::InvalidMetadataValue,
            detail.to_string(),
            position,
        )
    }

    pub(crate) fn cyclic_variable(name: &str) -> Self {
        Self::new(
            DiagnosticKind::CyclicVariable,
            format!("Cyclic variable reference detected for '{name}'"),
            SourcePosition::default(),
        )
    }

    pub(crate) fn cancelled() -> Self {
        Self::new(
            DiagnosticKind::Cancelled,
            "Template resolution was cancelled",
            SourcePosition::default(),
        )
    }

    /// These kinds render their `message` verbatim (it already embeds any
    /// position/first-occurrence text); all others get the generic
    /// line/column suffixing rule from spec §4.9.
    fn renders_verbatim(&self) -> bool {
        matches!(
            self.kind,
            DiagnosticKind::MissingRequestName
                | DiagnosticKind::MissingRequestId
                | DiagnosticKind::InvalidRequestName
                | DiagnosticKind::InvalidRequestId
                | DiagnosticKind::DuplicateRequestName
                | DiagnosticKind::DuplicateRequestId
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.renders_verbatim() {
            return write!(f, "{}", self.message);
        }

        match (self.position.line, self.position.column) {
            (0, 0) => write!(f, "{}", self.message),
            (line, 0) => write!(f, "{} at line {line}", self.message),
            (0, column) => write!(f, "{}, column {column}", self.message),
            (line, column) => write!(f, "{} at line {line}, column {column}", self.message),
        }
    }
}

impl std::error::Error for Diagnostic {}

/// Sort diagnostics by `(line, column)` ascending, per spec §7.
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by_key(|d| (d.position.line, d.position.column));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_line_only() {
        let d = Diagnostic::malformed_request_line(SourcePosition::at_line(3), "oops");
        assert_eq!(
            d.to_string(),
            "Malformed request line, expected 'METHOD URL [HTTP/x.y]' at line 3"
        );
    }

    #[test]
    fn renders_line_and_column() {
        let d = Diagnostic::malformed_header(SourcePosition::at(3, 5), "oops");
        assert_eq!(
            d.to_string(),
            "Malformed header line, expected 'Name: Value' with no leading whitespace at line 3, column 5"
        );
    }

    #[test]
    fn renders_column_only() {
        let d = Diagnostic::invalid_metadata_value(SourcePosition::at(0, 5), "Bad status code");
        assert_eq!(d.to_string(), "Bad status code, column 5");
    }

    #[test]
    fn renders_neither() {
        let d = Diagnostic::cyclic_variable("x");
        assert_eq!(d.to_string(), "Cyclic variable reference detected for 'x'");
    }

    #[test]
    fn duplicate_name_message_matches_spec_wording() {
        let d = Diagnostic::duplicate_request_name(5, "x", 1);
        assert_eq!(
            d.to_string(),
            "Duplicate request name 'x' found. First defined at line 1"
        );
        assert_eq!(d.line(), 5);
        assert_eq!(d.first_occurrence_line, Some(1));
    }

    #[test]
    fn duplicate_id_message_matches_spec_wording() {
        let d = Diagnostic::duplicate_request_id(9, "dup", 2);
        assert_eq!(
            d.to_string(),
            "Duplicate request ID 'dup' found. First defined at line 2"
        );
    }

    #[test]
    fn missing_name_message_matches_spec_wording() {
        let d = Diagnostic::missing_request_name(7);
        assert_eq!(
            d.to_string(),
            "Request at line 7 is missing a required request name"
        );
    }

    #[test]
    fn invalid_name_message_renders_empty_as_quotes() {
        let d = Diagnostic::invalid_request_name(SourcePosition::at_line(1), "");
        assert_eq!(
            d.to_string(),
            "Invalid request name ''. Request names must contain only alphanumeric characters, hyphens, and underscores"
        );
    }

    #[test]
    fn sort_orders_by_line_then_column() {
        let mut diagnostics = vec![
            Diagnostic::malformed_header(SourcePosition::at(2, 1), "a"),
            Diagnostic::malformed_header(SourcePosition::at(1, 5), "b"),
            Diagnostic::malformed_header(SourcePosition::at(1, 2), "c"),
        ];
        sort_diagnostics(&mut diagnostics);
        let positions: Vec<_> = diagnostics.iter().map(|d| (d.line(), d.column())).collect();
        assert_eq!(positions, vec![(1, 2), (1, 5), (2, 1)]);
    }
}
