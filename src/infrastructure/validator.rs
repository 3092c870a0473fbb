//! The validator (C4): identifier grammar, name/id uniqueness. Metadata
//! *value* validation (status ranges, header shape, durations) happens in
//! the projector, since it needs the same directive scan to build
//! `ExpectedResponse` anyway.

use std::collections::BTreeMap;

use crate::domain::Diagnostic;
use crate::domain::model::SourcePosition;

use super::parser::RawRequest;

/// A raw request whose `@name`/`@id` have been grammar-checked and found
/// unique, paired back with its source record for the projector.
pub(crate) struct ValidatedRequest {
    pub raw: RawRequest,
    pub name: String,
    pub id: Option<String>,
}

/// Validate identifier grammar and name/id uniqueness across `requests`,
/// in source order. Requests without a usable name are dropped from the
/// returned list (their diagnostic, which is always fatal, is enough to
/// sink the whole parse) but validation of later requests still proceeds,
/// so a single call surfaces every problem in the file at once.
pub(crate) fn validate(requests: Vec<RawRequest>, diagnostics: &mut Vec<Diagnostic>) -> Vec<ValidatedRequest> {
    let mut seen_names: BTreeMap<String, u32> = BTreeMap::new();
    let mut seen_ids: BTreeMap<String, u32> = BTreeMap::new();
    let mut validated = Vec::new();

    for raw in requests {
        let start_line = raw.source_span.0;

        let name = match extract_name(&raw, start_line, diagnostics) {
            Some(name) => name,
            None => continue,
        };

        if let Some(&first_line) = seen_names.get(&name) {
            diagnostics.push(Diagnostic::duplicate_request_name(start_line, &name, first_line));
        } else {
            seen_names.insert(name.clone(), start_line);
        }

        let id = match extract_id(&raw, start_line, diagnostics) {
            ExtractedId::Absent => None,
            ExtractedId::Invalid => None,
            ExtractedId::Present(id) => {
                if let Some(&first_line) = seen_ids.get(&id) {
                    diagnostics.push(Diagnostic::duplicate_request_id(start_line, &id, first_line));
                } else {
                    seen_ids.insert(id.clone(), start_line);
                }
                Some(id)
            }
        };

        validated.push(ValidatedRequest { raw, name, id });
    }

    validated
}

fn extract_name(raw: &RawRequest, start_line: u32, diagnostics: &mut Vec<Diagnostic>) -> Option<String> {
    let Some(occurrence) = raw.directives.iter().rev().find(|d| d.name == "name") else {
        diagnostics.push(Diagnostic::missing_request_name(start_line));
        return None;
    };
    match &occurrence.value {
        None => {
            diagnostics.push(Diagnostic::missing_request_name(start_line));
            None
        }
        Some(value) if value.is_empty() => {
            diagnostics.push(Diagnostic::missing_request_name(start_line));
            None
        }
        Some(value) => {
            if is_valid_identifier(value) {
                Some(value.clone())
            } else {
                diagnostics.push(Diagnostic::invalid_request_name(occurrence.position, value));
                None
            }
        }
    }
}

enum ExtractedId {
    Absent,
    Invalid,
    Present(String),
}

fn extract_id(raw: &RawRequest, _start_line: u32, diagnostics: &mut Vec<Diagnostic>) -> ExtractedId {
    let Some(occurrence) = raw.directives.iter().rev().find(|d| d.name == "id") else {
        return ExtractedId::Absent;
    };

    match &occurrence.value {
        None => {
            diagnostics.push(Diagnostic::missing_request_id(occurrence.position.line));
            ExtractedId::Invalid
        }
        Some(value) if value.is_empty() => {
            diagnostics.push(Diagnostic::missing_request_id(occurrence.position.line));
            ExtractedId::Invalid
        }
        Some(value) => {
            if is_valid_identifier(value) {
                ExtractedId::Present(value.clone())
            } else {
                diagnostics.push(Diagnostic::invalid_request_id(occurrence.position, value));
                ExtractedId::Invalid
            }
        }
    }
}

/// `[A-Za-z0-9_-]+`, checked by hand rather than pulling in `regex` for one
/// character class.
fn is_valid_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
