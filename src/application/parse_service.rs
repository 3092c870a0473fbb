//! The `parse` entry point: wires the reader/classifier (inside the parser),
//! parser, validator, and projector into the one public parsing operation.

use tracing::debug;

use crate::domain::{Catalog, Diagnostic, DiagnosticKind, TestCase, sort_diagnostics};
use crate::infrastructure::parser;
use crate::infrastructure::validator;
use crate::infrastructure::projector;

/// Parse `.http` source text into an ordered `Catalog`.
///
/// Every diagnostic kind except `CyclicVariable` and `Cancelled` (which are
/// resolution-time-only) is fatal: a catalog is returned only when none of
/// those were raised, otherwise every diagnostic found is returned together
/// so a caller can fix the whole file in one pass.
pub fn parse(text: &str) -> Result<Catalog, Vec<Diagnostic>> {
    let output = parser::parse(text);
    let mut diagnostics = output.diagnostics;

    let validated = validator::validate(output.requests, &mut diagnostics);
    let test_cases: Vec<TestCase> = validated
        .into_iter()
        .map(|v| projector::project(v, &mut diagnostics))
        .collect();

    sort_diagnostics(&mut diagnostics);

    debug!(
        requests = test_cases.len(),
        diagnostics = diagnostics.len(),
        "parsed http file"
    );

    if diagnostics.iter().any(|d| is_fatal(d.kind)) {
        return Err(diagnostics);
    }

    Ok(Catalog::from_test_cases(test_cases))
}

/// Collect the file-level `@name = value` definitions from `text`, in
/// source order, ready to feed into a `VariableStore` via `define`.
///
/// This mirrors `parse`'s own pass over the file rather than reusing its
/// output, since a file can be syntactically invalid as a request catalog
/// (and so `parse` returns `Err`) while its variable definitions are still
/// perfectly usable for resolving other files that share it via
/// `@import`-free convention (copy/paste of a shared preamble).
#[must_use]
pub fn file_variables(text: &str) -> Vec<(String, String)> {
    parser::parse(text)
        .var_defs
        .into_iter()
        .map(|def| (def.name, def.value))
        .collect()
}

fn is_fatal(kind: DiagnosticKind) -> bool {
    !matches!(kind, DiagnosticKind::CyclicVariable | DiagnosticKind::Cancelled)
}
