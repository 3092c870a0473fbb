//! Port for the prior-results map: `{{requestName.response.{body|headers}.<selector>}}`.
//!
//! IMPORTANT: this module must have ZERO infrastructure dependencies; the
//! caller supplies an adapter that knows how to store the responses it
//! actually executed (typically the external executor collaborator).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which part of a prior response a `{{name.response...}}` token selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseField {
    /// `{{name.response.body...}}`
    Body,
    /// `{{name.response.headers...}}`
    Headers,
}

/// Port for resolving `{{name.response.*}}` tokens against previously
/// completed requests.
pub trait PriorResultsProvider: Send + Sync {
    /// Resolve `field`/`selector` for the named request's response.
    ///
    /// Returns `None` if the request has not executed yet, or the selector
    /// doesn't resolve to anything — both render as an empty string per
    /// spec §4.7.
    fn resolve(&self, request_name: &str, field: ResponseField, selector: &str) -> Option<String>;
}

/// One completed request's response, as recorded by the executor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordedResponse {
    /// Response body, parsed as JSON when possible (selectors navigate it);
    /// kept as the raw string otherwise.
    pub body: Value,
    /// Response headers, case-insensitive by convention (keys stored lowercase).
    pub headers: BTreeMap<String, String>,
}

/// A simple in-memory prior-results map, appended to as requests complete.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriorResults {
    responses: BTreeMap<String, RecordedResponse>,
}

impl InMemoryPriorResults {
    /// An empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) a completed request's response.
    pub fn record(&mut self, request_name: impl Into<String>, response: RecordedResponse) {
        self.responses.insert(request_name.into(), response);
    }
}

impl PriorResultsProvider for InMemoryPriorResults {
    fn resolve(&self, request_name: &str, field: ResponseField, selector: &str) -> Option<String> {
        let response = self.responses.get(request_name)?;
        match field {
            ResponseField::Headers => response.headers.get(&selector.to_lowercase()).cloned(),
            ResponseField::Body => select_json(&response.body, selector),
        }
    }
}

/// Navigate a JSON value with a dotted/bracket selector like `$.a.b[0].c` or
/// `a.b.0.c`. A leading `$` or `$.` is stripped if present. Returns `None`
/// if any segment fails to resolve.
fn select_json(value: &Value, selector: &str) -> Option<String> {
    let selector = selector.strip_prefix('$').unwrap_or(selector);
    let selector = selector.strip_prefix('.').unwrap_or(selector);

    let mut current = value;
    for segment in split_selector(selector) {
        current = match segment {
            Segment::Key(key) if key.is_empty() => current,
            Segment::Key(key) => current.get(key)?,
            Segment::Index(i) => current.get(i)?,
        };
    }

    match current {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

fn split_selector(selector: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    for dotted in selector.split('.') {
        let mut rest = dotted;
        loop {
            if let Some(open) = rest.find('[') {
                let (head, tail) = rest.split_at(open);
                if !head.is_empty() {
                    segments.push(Segment::Key(head));
                }
                let Some(close) = tail.find(']') else {
                    break;
                };
                let inside = &tail[1..close];
                if let Ok(index) = inside.parse::<usize>() {
                    segments.push(Segment::Index(index));
                } else if !inside.is_empty() {
                    segments.push(Segment::Key(inside));
                }
                rest = &tail[close + 1..];
            } else {
                if !rest.is_empty() {
                    segments.push(Segment::Key(rest));
                }
                break;
            }
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_header_case_insensitively_by_convention() {
        let mut map = InMemoryPriorResults::new();
        let mut response = RecordedResponse::default();
        response
            .headers
            .insert("content-type".to_string(), "application/json".to_string());
        map.record("login", response);

        assert_eq!(
            map.resolve("login", ResponseField::Headers, "Content-Type"),
            Some("application/json".to_string())
        );
        assert_eq!(map.resolve("login", ResponseField::Headers, "Missing"), None);
    }

    #[test]
    fn resolves_nested_body_field() {
        let mut map = InMemoryPriorResults::new();
        map.record(
            "login",
            RecordedResponse {
                body: json!({"token": {"value": "abc123"}, "roles": ["admin", "user"]}),
                headers: BTreeMap::new(),
            },
        );

        assert_eq!(
            map.resolve("login", ResponseField::Body, "$.token.value"),
            Some("abc123".to_string())
        );
        assert_eq!(
            map.resolve("login", ResponseField::Body, "roles[0]"),
            Some("admin".to_string())
        );
    }

    #[test]
    fn returns_none_for_request_that_has_not_executed() {
        let map = InMemoryPriorResults::new();
        assert_eq!(map.resolve("never-ran", ResponseField::Body, "$.x"), None);
    }

    #[test]
    fn returns_none_when_selector_path_is_absent() {
        let mut map = InMemoryPriorResults::new();
        map.record(
            "login",
            RecordedResponse {
                body: json!({"token": "abc"}),
                headers: BTreeMap::new(),
            },
        );
        assert_eq!(map.resolve("login", ResponseField::Body, "$.missing.field"), None);
    }
}
