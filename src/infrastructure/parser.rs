//! The parser state machine (C3): consumes classified lines and emits
//! `RawRequest` records — headers, body, and directive occurrences, with
//! source spans — ready for the validator (C4) and projector (C8).

use crate::domain::model::{Body, SourcePosition};
use crate::domain::{Diagnostic, sort_diagnostics};

use super::classifier::{LineKind, classify, is_http_version_token};
use super::reader::{SourceLine, read_lines};

/// One `@name`/`@id`/`@expect-*`/`@note`/`@x-*` occurrence as written in the
/// file, in source order. The same directive name may repeat (notably
/// `@expect-header`).
#[derive(Debug, Clone)]
pub(crate) struct DirectiveOccurrence {
    pub name: String,
    pub value: Option<String>,
    pub position: SourcePosition,
}

/// The parser's raw output for one request block, before validation.
#[derive(Debug, Clone)]
pub(crate) struct RawRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
    pub directives: Vec<DirectiveOccurrence>,
    pub source_span: (u32, u32),
    pub method_line: u32,
}

/// A file-level `@name = value` definition, with its source line.
#[derive(Debug, Clone)]
pub(crate) struct RawVarDef {
    pub name: String,
    pub value: String,
    pub line: u32,
}

/// Full, unvalidated parse output.
pub(crate) struct ParseOutput {
    pub requests: Vec<RawRequest>,
    pub var_defs: Vec<RawVarDef>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeforeFirstRequest,
    ExpectMethodLine,
    InHeaders,
    InBody,
}

struct Draft {
    method: String,
    url: String,
    headers: Vec<(String, String)>,
    body_lines: Vec<String>,
    directives: Vec<DirectiveOccurrence>,
    start_line: u32,
    method_line: u32,
}

/// Run the parser state machine over `text`, producing raw requests, raw
/// file-level variable definitions, and any syntactic diagnostics.
pub(crate) fn parse(text: &str) -> ParseOutput {
    let lines = read_lines(text);

    let mut state = State::BeforeFirstRequest;
    let mut pending_directives: Vec<DirectiveOccurrence> = Vec::new();
    let mut pending_start_line: Option<u32> = None;
    let mut draft: Option<Draft> = None;

    let mut requests = Vec::new();
    let mut var_defs = Vec::new();
    let mut diagnostics = Vec::new();

    for line in &lines {
        // A separator always finalizes the request in progress (if any),
        // regardless of whether we're mid-headers or mid-body, so it's
        // intercepted here rather than threaded through each sub-state.
        if matches!(state, State::InHeaders | State::InBody) && is_separator(line.text).is_some() {
            let d = draft.take().expect("draft while InHeaders/InBody");
            requests.push(finalize_request(d, line.number));
            state = State::ExpectMethodLine;
            continue;
        }

        match state {
            State::BeforeFirstRequest | State::ExpectMethodLine => {
                handle_preamble_line(
                    *line,
                    &mut state,
                    &mut pending_directives,
                    &mut pending_start_line,
                    &mut draft,
                    &mut var_defs,
                    &mut diagnostics,
                );
            }
            State::InHeaders => {
                handle_header_line(*line, draft.as_mut().expect("draft in InHeaders"), &mut state, &mut diagnostics);
            }
            State::InBody => {
                handle_body_line(*line, draft.as_mut().expect("draft in InBody"), &mut diagnostics);
            }
        }
    }

    finalize_at_eof(state, draft, &mut requests, &mut diagnostics, lines.len() as u32);

    sort_diagnostics(&mut diagnostics);
    ParseOutput {
        requests,
        var_defs,
        diagnostics,
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_preamble_line(
    line: SourceLine<'_>,
    state: &mut State,
    pending_directives: &mut Vec<DirectiveOccurrence>,
    pending_start_line: &mut Option<u32>,
    draft: &mut Option<Draft>,
    var_defs: &mut Vec<RawVarDef>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match classify(line.text) {
        LineKind::Blank | LineKind::Comment | LineKind::Preamble => {}
        LineKind::Directive { name, value } => {
            if pending_start_line.is_none() {
                *pending_start_line = Some(line.number);
            }
            pending_directives.push(DirectiveOccurrence {
                name: name.to_string(),
                value: value.map(str::to_string),
                position: SourcePosition::at_line(line.number),
            });
        }
        LineKind::VarDef { name, value } => {
            var_defs.push(RawVarDef {
                name: name.to_string(),
                value: value.to_string(),
                line: line.number,
            });
        }
        LineKind::Separator(_) => {
            // No request was in progress; a stray separator just clears
            // any pending metadata (spec §4.3: "Any separator finalizes
            // the current request... and clears pending metadata").
            pending_directives.clear();
            *pending_start_line = None;
            *state = State::ExpectMethodLine;
        }
        LineKind::FileReference(_) | LineKind::Other(_) => {
            let raw = line.text.trim();
            if let Some((method, url)) = parse_request_line(raw) {
                let start_line = pending_start_line.take().unwrap_or(line.number);
                *draft = Some(Draft {
                    method,
                    url,
                    headers: Vec::new(),
                    body_lines: Vec::new(),
                    directives: std::mem::take(pending_directives),
                    start_line,
                    method_line: line.number,
                });
                *state = State::InHeaders;
            } else {
                diagnostics.push(Diagnostic::malformed_request_line(
                    SourcePosition::at_line(line.number),
                    raw,
                ));
            }
        }
    }
}

fn handle_header_line(line: SourceLine<'_>, draft: &mut Draft, state: &mut State, diagnostics: &mut Vec<Diagnostic>) {
    match classify(line.text) {
        LineKind::Blank => {
            *state = State::InBody;
        }
        LineKind::Comment | LineKind::Preamble => {}
        LineKind::Directive { name, value } => {
            if draft.headers.is_empty() {
                draft.directives.push(DirectiveOccurrence {
                    name: name.to_string(),
                    value: value.map(str::to_string),
                    position: SourcePosition::at_line(line.number),
                });
            } else {
                diagnostics.push(Diagnostic::misplaced_directive(
                    SourcePosition::at_line(line.number),
                    line.text.trim(),
                ));
            }
        }
        LineKind::Separator(_) => {
            unreachable!("separators are intercepted in the main loop before dispatch")
        }
        LineKind::VarDef { .. } => {
            diagnostics.push(Diagnostic::malformed_header(
                SourcePosition::at_line(line.number),
                line.text.trim(),
            ));
        }
        LineKind::FileReference(_) | LineKind::Other(_) => {
            if starts_with_whitespace(line.text) {
                diagnostics.push(Diagnostic::malformed_header(
                    SourcePosition::at_line(line.number),
                    line.text,
                ));
                return;
            }
            match parse_header(line.text.trim()) {
                Some((name, value)) => draft.headers.push((name, value)),
                None => diagnostics.push(Diagnostic::malformed_header(
                    SourcePosition::at_line(line.number),
                    line.text.trim(),
                )),
            }
        }
    }
}

fn handle_body_line(line: SourceLine<'_>, draft: &mut Draft, diagnostics: &mut Vec<Diagnostic>) {
    if let LineKind::Directive { .. } = classify(line.text) {
        diagnostics.push(Diagnostic::misplaced_directive(
            SourcePosition::at_line(line.number),
            line.text.trim(),
        ));
    }
    draft.body_lines.push(line.text.to_string());
}

/// `Some(title)` if `text` classifies as a separator line, `None` otherwise.
/// Checked up front in the main loop since a separator always finalizes the
/// request in progress regardless of whether we're mid-headers or mid-body.
fn is_separator(text: &str) -> Option<Option<&str>> {
    match classify(text) {
        LineKind::Separator(title) => Some(title),
        _ => None,
    }
}

fn finalize_at_eof(
    state: State,
    draft: Option<Draft>,
    requests: &mut Vec<RawRequest>,
    diagnostics: &mut Vec<Diagnostic>,
    last_line: u32,
) {
    match (state, draft) {
        (State::InHeaders, Some(d)) => {
            diagnostics.push(Diagnostic::unterminated_block(SourcePosition::at_line(
                d.method_line,
            )));
        }
        (State::InBody, Some(d)) => {
            requests.push(finalize_request(d, last_line + 1));
        }
        _ => {}
    }
}

fn finalize_request(draft: Draft, end_line: u32) -> RawRequest {
    let body = build_body(&draft.body_lines);
    RawRequest {
        method: draft.method,
        url: draft.url,
        headers: draft.headers,
        body,
        directives: draft.directives,
        source_span: (draft.start_line, end_line),
        method_line: draft.method_line,
    }
}

fn build_body(lines: &[String]) -> Option<Body> {
    let mut trimmed = lines.to_vec();
    while matches!(trimmed.last(), Some(l) if l.trim().is_empty()) {
        trimmed.pop();
    }
    if trimmed.is_empty() {
        return None;
    }

    let non_blank: Vec<&String> = trimmed.iter().filter(|l| !l.trim().is_empty()).collect();
    if non_blank.len() == 1 {
        if let LineKind::FileReference(path) = classify(non_blank[0]) {
            return Some(Body::FileReference(std::path::PathBuf::from(path)));
        }
    }

    Some(Body::Inline(trimmed.join("\n")))
}

fn starts_with_whitespace(raw: &str) -> bool {
    raw.starts_with(' ') || raw.starts_with('\t')
}

fn parse_request_line(line: &str) -> Option<(String, String)> {
    let mut parts = line.splitn(2, char::is_whitespace);
    let method = parts.next()?.trim();
    if method.is_empty() {
        return None;
    }
    let remainder = parts.next().unwrap_or("").trim();
    if remainder.is_empty() {
        return None;
    }

    let url = match remainder.rfind(char::is_whitespace) {
        Some(idx) => {
            let (maybe_url, maybe_version) = remainder.split_at(idx);
            let maybe_version = maybe_version.trim();
            if is_http_version_token(maybe_version) {
                maybe_url.trim()
            } else {
                remainder
            }
        }
        None => remainder,
    };

    if url.is_empty() {
        return None;
    }

    Some((method.to_uppercase(), url.to_string()))
}

const HEADER_NAME_EXTRA: &str = "!#$%&'*+-.^_`|~";

fn parse_header(line: &str) -> Option<(String, String)> {
    let colon = line.find(':')?;
    let name = &line[..colon];
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || HEADER_NAME_EXTRA.contains(c))
    {
        return None;
    }
    let value = line[colon + 1..].trim().to_string();
    Some((name.to_string(), value))
}
