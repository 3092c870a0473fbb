//! The template resolver (C7): scans text for `{{...}}`, classifies each
//! payload, and substitutes it. Unknown tokens pass through unchanged.

use std::collections::BTreeMap;

use crate::domain::{CancellationToken, Clock, Diagnostic, PriorResultsProvider, RandomSource, ResponseField, VariableStore};

use super::system_vars::{self, SystemVarContext};

const MAX_VARIABLE_DEPTH: u32 = 16;

/// Everything `resolve` needs to evaluate one pass of template substitution.
pub struct ResolutionContext<'a> {
    /// The four-tier plain-variable lookup (overrides, file vars, env).
    pub variables: &'a VariableStore,
    /// Injected clock, for `$timestamp`/`$datetime`/`$localDatetime`.
    pub clock: &'a dyn Clock,
    /// Injected randomness, for `$guid`/`$randomInt`.
    pub random: &'a dyn RandomSource,
    /// Snapshot consulted by `{{$processEnv NAME}}`.
    pub env_snapshot: &'a BTreeMap<String, String>,
    /// Snapshot consulted by `{{$dotenv NAME}}`.
    pub dotenv_snapshot: &'a BTreeMap<String, String>,
    /// Prior-results map for `{{name.response.*}}`, if the caller has one.
    pub prior_results: Option<&'a dyn PriorResultsProvider>,
    /// Checked between substitutions; `NeverCancelled` if the caller has
    /// nothing to cancel with.
    pub cancellation: &'a dyn CancellationToken,
}

/// Resolve every `{{...}}` occurrence in `text`, recording any
/// `CyclicVariable`/`Cancelled` diagnostics raised along the way. Both are
/// non-fatal: the caller decides what, if anything, to do with them.
#[must_use]
pub fn resolve(text: &str, ctx: &ResolutionContext<'_>, diagnostics: &mut Vec<Diagnostic>) -> String {
    let mut visited = Vec::new();
    resolve_scan(text, ctx, &mut visited, 0, diagnostics)
}

fn resolve_scan(
    text: &str,
    ctx: &ResolutionContext<'_>,
    visited: &mut Vec<String>,
    depth: u32,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    let mut out = String::new();
    let mut rest = text;

    loop {
        if ctx.cancellation.is_cancelled() {
            diagnostics.push(Diagnostic::cancelled());
            return String::new();
        }

        let Some(start) = rest.find("{{") else {
            out.push_str(rest);
            break;
        };
        out.push_str(&rest[..start]);

        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            // No closing brace anywhere in the remainder: not a token.
            out.push_str(&rest[start..]);
            break;
        };

        let raw_token = &rest[start..start + 2 + end + 2];
        let payload = after_open[..end].trim();

        match resolve_payload(payload, ctx, visited, depth, diagnostics) {
            Some(value) => out.push_str(&value),
            None => out.push_str(raw_token),
        }

        rest = &after_open[end + 2..];
    }

    out
}

fn resolve_payload(
    payload: &str,
    ctx: &ResolutionContext<'_>,
    visited: &mut Vec<String>,
    depth: u32,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<String> {
    if payload.starts_with('$') {
        let sys_ctx = SystemVarContext {
            clock: ctx.clock,
            random: ctx.random,
            env_snapshot: ctx.env_snapshot,
            dotenv_snapshot: ctx.dotenv_snapshot,
        };
        return system_vars::evaluate(payload, &sys_ctx);
    }

    if let Some(idx) = payload.find(".response.") {
        return Some(resolve_prior_result(payload, idx, ctx));
    }

    resolve_variable(payload, ctx, visited, depth, diagnostics)
}

/// `requestName.response.{body|headers}.<selector>` always resolves, even
/// to the empty string — the request hasn't executed yet, there's no
/// provider, or the selector doesn't match anything.
fn resolve_prior_result(payload: &str, response_marker_idx: usize, ctx: &ResolutionContext<'_>) -> String {
    let request_name = &payload[..response_marker_idx];
    let after = &payload[response_marker_idx + ".response.".len()..];
    let (field_str, selector) = after.split_once('.').unwrap_or((after, ""));
    let field = if field_str == "headers" {
        ResponseField::Headers
    } else {
        ResponseField::Body
    };

    ctx.prior_results
        .and_then(|provider| provider.resolve(request_name, field, selector))
        .unwrap_or_default()
}

/// Look up a plain variable name. File-level definitions may themselves
/// contain `{{...}}` references, so a resolved value is recursively
/// rescanned (depth-limited, cycle-detected); everything else is returned
/// as-is. Unknown names return `None` so the caller passes the literal
/// token through.
fn resolve_variable(
    name: &str,
    ctx: &ResolutionContext<'_>,
    visited: &mut Vec<String>,
    depth: u32,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<String> {
    let raw = ctx.variables.get(name)?;

    if depth >= MAX_VARIABLE_DEPTH || visited.iter().any(|v| v == name) {
        diagnostics.push(Diagnostic::cyclic_variable(name));
        return Some(format!("{{{{{name}}}}}"));
    }

    if !raw.contains("{{") {
        return Some(raw.to_string());
    }

    visited.push(name.to_string());
    let expanded = resolve_scan(raw, ctx, visited, depth + 1, diagnostics);
    visited.pop();
    Some(expanded)
}
