//! Core data model: source positions, requests, expectations, test cases, catalogs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A position in the source file, used for diagnostics.
///
/// `line == 0` and `column == 0` are reserved sentinels meaning "unknown",
/// used when a diagnostic can only pin down one coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourcePosition {
    /// 1-based line number, or 0 if unknown.
    pub line: u32,
    /// 1-based column number, or 0 if unknown.
    pub column: u32,
}

impl SourcePosition {
    /// A position that only carries a line number.
    #[must_use]
    pub const fn at_line(line: u32) -> Self {
        Self { line, column: 0 }
    }

    /// A position carrying both line and column.
    #[must_use]
    pub const fn at(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// The body of a request: inline text, or a reference to an external file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Body {
    /// Inline body text, newline-preserved, trailing blank lines trimmed.
    Inline(String),
    /// A `< path` line naming a file whose contents are the body.
    /// Resolution against the source file's directory is the executor's job;
    /// `Request::body_file_reference` does the path join for convenience.
    FileReference(PathBuf),
}

/// A single parsed HTTP request with its metadata and expectations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Request name from the required `@name` directive.
    pub name: String,
    /// Optional request id from the `@id` directive.
    pub id: Option<String>,
    /// Uppercase HTTP method (or an opaque uppercase verb).
    pub method: String,
    /// Raw URL text, possibly containing `{{...}}` placeholders.
    pub url: String,
    /// Ordered header pairs, name case preserved.
    pub headers: Vec<(String, String)>,
    /// Optional request body.
    pub body: Option<Body>,
    /// Non-expectation metadata directives (`@note`, `@no-log`, `@x-*`).
    pub metadata: BTreeMap<String, String>,
    /// Expectation metadata projected from `@expect-*` directives.
    pub expected_response: Option<ExpectedResponse>,
    /// Source span: start line inclusive, end line exclusive.
    pub source_span: (u32, u32),
}

impl Request {
    /// Look up a header by case-insensitive name, returning the first match
    /// in source order.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// If the body is a file reference, join it against `base_dir` (the
    /// source file's directory). Actual file I/O is left to the executor.
    #[must_use]
    pub fn body_file_reference(&self, base_dir: &Path) -> Option<PathBuf> {
        match &self.body {
            Some(Body::FileReference(path)) => Some(join_reference(base_dir, path)),
            _ => None,
        }
    }
}

fn join_reference(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Structured expectations extracted from `@expect-*` directives.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExpectedResponse {
    /// Expected HTTP status code, `100..=599`.
    pub status_code: Option<u16>,
    /// Expected headers, keyed by lowercase header name.
    pub headers: BTreeMap<String, String>,
    /// Substring the response body must contain (case-insensitive).
    pub body_contains: Option<String>,
    /// Opaque JSONPath-shaped body expression; evaluation is external.
    pub body_path: Option<String>,
    /// Opaque file reference to a JSON schema; evaluation is external.
    pub schema_path: Option<String>,
    /// Maximum allowed response time.
    pub max_response_time: Option<Duration>,
    /// Opaque custom expectation tags, e.g. from `@x-expect-*` directives.
    pub custom_expectations: BTreeMap<String, String>,
}

impl ExpectedResponse {
    /// True iff any expectation field is set.
    #[must_use]
    pub fn has_expectations(&self) -> bool {
        self.status_code.is_some()
            || !self.headers.is_empty()
            || self.body_contains.is_some()
            || self.body_path.is_some()
            || self.schema_path.is_some()
            || self.max_response_time.is_some()
            || !self.custom_expectations.is_empty()
    }

    /// Join `schema_path` against `base_dir`, the source file's directory.
    #[must_use]
    pub fn schema_reference(&self, base_dir: &Path) -> Option<PathBuf> {
        self.schema_path
            .as_deref()
            .map(|p| join_reference(base_dir, Path::new(p)))
    }
}

/// A `Request` projected with its `ExpectedResponse`, as stored in a `Catalog`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// The underlying request.
    pub request: Request,
}

impl TestCase {
    /// The test case's unique name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.request.name
    }

    /// The test case's expected response, if any expectation directive was present.
    #[must_use]
    pub fn expected_response(&self) -> Option<&ExpectedResponse> {
        self.request.expected_response.as_ref()
    }
}

/// The ordered, validated set of test cases produced from one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    test_cases: Vec<TestCase>,
    index: BTreeMap<String, usize>,
}

// Serializes/deserializes as just the ordered `Vec<TestCase>`; `index` is
// derived data, rebuilt on the way back in rather than carried on the wire.
impl Serialize for Catalog {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.test_cases.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let test_cases = Vec::<TestCase>::deserialize(deserializer)?;
        Ok(Self::from_test_cases(test_cases))
    }
}

impl Catalog {
    /// Build a catalog from an already-validated, name-unique list of test cases.
    ///
    /// Callers outside this crate should go through `parse` instead; this is
    /// exposed for the application layer that performs validation up front.
    #[must_use]
    pub fn from_test_cases(test_cases: Vec<TestCase>) -> Self {
        let index = test_cases
            .iter()
            .enumerate()
            .map(|(i, tc)| (tc.name().to_string(), i))
            .collect();
        Self { test_cases, index }
    }

    /// Number of test cases in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.test_cases.len()
    }

    /// True if the catalog has no test cases.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.test_cases.is_empty()
    }

    /// Iterate test cases in source order.
    pub fn iter(&self) -> impl Iterator<Item = &TestCase> {
        self.test_cases.iter()
    }

    /// Look up a test case by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TestCase> {
        self.index.get(name).map(|&i| &self.test_cases[i])
    }

    /// Look up a test case's index by name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a TestCase;
    type IntoIter = std::slice::Iter<'a, TestCase>;

    fn into_iter(self) -> Self::IntoIter {
        self.test_cases.iter()
    }
}
