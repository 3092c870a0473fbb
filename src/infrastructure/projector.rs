//! The projector (C8): drains `@expect-*` directives into `ExpectedResponse`,
//! validates their values (status range, header shape, duration), and
//! assembles the final `Request`/`TestCase` the catalog carries.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::domain::model::{Body, ExpectedResponse, Request, SourcePosition, TestCase};
use crate::domain::Diagnostic;

use super::parser::{DirectiveOccurrence, RawRequest};
use super::validator::ValidatedRequest;

/// Project one validated request into its final `TestCase`, recording any
/// malformed `@expect-*` value as an `InvalidMetadataValue` diagnostic.
pub(crate) fn project(validated: ValidatedRequest, diagnostics: &mut Vec<Diagnostic>) -> TestCase {
    let ValidatedRequest { raw, name, id } = validated;
    let RawRequest {
        method,
        url,
        headers,
        body,
        directives,
        source_span,
        ..
    } = raw;

    let (expected_response, metadata) = drain_directives(&directives, diagnostics);

    let request = Request {
        name,
        id,
        method,
        url,
        headers,
        body: body.map(normalize_body),
        metadata,
        expected_response: if expected_response.has_expectations() {
            Some(expected_response)
        } else {
            None
        },
        source_span,
    };

    TestCase { request }
}

fn normalize_body(body: Body) -> Body {
    body
}

/// Split directive occurrences into the `ExpectedResponse` they describe and
/// the opaque metadata bag (`@note`, `@no-log`, `@x-*`) that survives
/// untouched. `@name`/`@id` are consumed by the validator already and are
/// skipped here.
fn drain_directives(
    directives: &[DirectiveOccurrence],
    diagnostics: &mut Vec<Diagnostic>,
) -> (ExpectedResponse, BTreeMap<String, String>) {
    let mut expected = ExpectedResponse::default();
    let mut metadata = BTreeMap::new();

    for directive in directives {
        match directive.name.as_str() {
            "name" | "id" => {}
            "expect-status" => apply_status(directive, &mut expected, diagnostics),
            "expect-header" => apply_header(directive, &mut expected, diagnostics),
            "expect-body-contains" => {
                expected.body_contains = directive.value.clone();
            }
            "expect-body-path" => {
                expected.body_path = directive.value.clone();
            }
            "expect-schema" => {
                expected.schema_path = directive.value.clone();
            }
            "expect-max-time" => apply_max_time(directive, &mut expected, diagnostics),
            "note" | "no-log" => {
                metadata.insert(directive.name.clone(), directive.value.clone().unwrap_or_default());
            }
            other if other.starts_with("x-") => {
                metadata.insert(other.to_string(), directive.value.clone().unwrap_or_default());
            }
            other => {
                metadata.insert(other.to_string(), directive.value.clone().unwrap_or_default());
            }
        }
    }

    (expected, metadata)
}

fn apply_status(directive: &DirectiveOccurrence, expected: &mut ExpectedResponse, diagnostics: &mut Vec<Diagnostic>) {
    let Some(value) = &directive.value else {
        diagnostics.push(invalid(directive, "@expect-status requires a status code"));
        return;
    };
    match value.trim().parse::<u16>() {
        Ok(code) if (100..=599).contains(&code) => expected.status_code = Some(code),
        _ => diagnostics.push(invalid(
            directive,
            &format!("@expect-status value '{value}' must be an integer in 100..=599"),
        )),
    }
}

fn apply_header(directive: &DirectiveOccurrence, expected: &mut ExpectedResponse, diagnostics: &mut Vec<Diagnostic>) {
    let Some(value) = &directive.value else {
        diagnostics.push(invalid(directive, "@expect-header requires 'Name: Value'"));
        return;
    };
    match value.split_once(':') {
        Some((name, header_value)) if !name.trim().is_empty() => {
            expected
                .headers
                .insert(name.trim().to_ascii_lowercase(), header_value.trim().to_string());
        }
        _ => diagnostics.push(invalid(
            directive,
            &format!("@expect-header value '{value}' must be 'Name: Value'"),
        )),
    }
}

fn apply_max_time(directive: &DirectiveOccurrence, expected: &mut ExpectedResponse, diagnostics: &mut Vec<Diagnostic>) {
    let Some(value) = &directive.value else {
        diagnostics.push(invalid(directive, "@expect-max-time requires a duration"));
        return;
    };
    match parse_duration(value) {
        Some(duration) => expected.max_response_time = Some(duration),
        None => diagnostics.push(invalid(
            directive,
            &format!("@expect-max-time value '{value}' must be a number followed by ms, s, or m"),
        )),
    }
}

/// Parse `<number><unit>` where unit is one of `ms`, `s`, `m`. This is a
/// narrower alphabet than `$timestamp`'s offset units (`ms|s|m|h|d|w|M|y`):
/// a response-time budget in hours or larger has no practical meaning here.
fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let unit_start = value.find(|c: char| !c.is_ascii_digit())?;
    let (digits, unit) = value.split_at(unit_start);
    if digits.is_empty() {
        return None;
    }
    let amount: u64 = digits.parse().ok()?;
    match unit {
        "ms" => Some(Duration::from_millis(amount)),
        "s" => Some(Duration::from_secs(amount)),
        "m" => Some(Duration::from_secs(amount * 60)),
        _ => None,
    }
}

fn invalid(directive: &DirectiveOccurrence, detail: &str) -> Diagnostic {
    let position = if directive.position.line == 0 {
        SourcePosition::default()
    } else {
        directive.position
    };
    Diagnostic::invalid_metadata_value(position, detail)
}
