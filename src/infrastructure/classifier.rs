//! The line classifier (C2): a pure, stateless tagger for the
//! context-independent line shapes spec.md §4.2 describes. Anything that
//! needs parser state to interpret (header vs. request-line vs. body-line)
//! comes back as `LineKind::Other` for the parser state machine to decide.

/// The classification of a single raw line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `### [title]` — begins a new request.
    Separator(Option<&'a str>),
    /// `# @name value` or `// @name value`.
    Directive {
        /// Directive name, without the leading `@`.
        name: &'a str,
        /// Directive value, if any text followed the name.
        value: Option<&'a str>,
    },
    /// `#`/`//` prefixed text that isn't a directive.
    Comment,
    /// `@name = value`, a file-level variable definition.
    VarDef {
        /// Variable name.
        name: &'a str,
        /// Variable value (may itself contain `{{...}}`).
        value: &'a str,
    },
    /// `HTTP/x.y ...` tolerated as a preamble line.
    Preamble,
    /// Empty or whitespace-only.
    Blank,
    /// `< path`, in a body context.
    FileReference(&'a str),
    /// Anything else; the parser state decides how to interpret it.
    Other(&'a str),
}

/// Classify one raw line by its leading, context-independent shape.
#[must_use]
pub fn classify(raw: &str) -> LineKind<'_> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return LineKind::Blank;
    }

    if let Some(rest) = separator_rest(trimmed) {
        return LineKind::Separator(rest);
    }

    if let Some((marker_rest, _)) = strip_comment_marker(trimmed) {
        let marker_rest = marker_rest.trim_start();
        if let Some(directive_rest) = marker_rest.strip_prefix('@') {
            let (name, value) = split_directive(directive_rest);
            return LineKind::Directive { name, value };
        }
        return LineKind::Comment;
    }

    if let Some(rest) = trimmed.strip_prefix('@') {
        if let Some((name, value)) = split_var_def(rest) {
            return LineKind::VarDef { name, value };
        }
    }

    if is_http_preamble(trimmed) {
        return LineKind::Preamble;
    }

    if let Some(path) = trimmed.strip_prefix('<') {
        let path = path.trim();
        if !path.is_empty() {
            return LineKind::FileReference(path);
        }
    }

    LineKind::Other(trimmed)
}

fn separator_rest(trimmed: &str) -> Option<Option<&str>> {
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if hashes < 3 {
        return None;
    }
    let rest = trimmed[hashes..].trim();
    Some(if rest.is_empty() { None } else { Some(rest) })
}

/// Strip a `#` or `//` comment marker, returning the text after it.
fn strip_comment_marker(trimmed: &str) -> Option<(&str, &str)> {
    if let Some(rest) = trimmed.strip_prefix('#') {
        Some((rest, "#"))
    } else {
        trimmed.strip_prefix("//").map(|rest| (rest, "//"))
    }
}

/// Split `name value` (directive body after `@`) into `(name, Some(value))`
/// or `(name, None)` if there's no value.
fn split_directive(rest: &str) -> (&str, Option<&str>) {
    match rest.find(char::is_whitespace) {
        Some(idx) => {
            let name = &rest[..idx];
            let value = rest[idx..].trim();
            (name, if value.is_empty() { None } else { Some(value) })
        }
        None => (rest, None),
    }
}

/// Recognize `name = value` or `name=value` after a leading `@` has been
/// stripped. Returns `None` if there's no `=`, so the line falls through to
/// `Other` (and the parser will reject it as a misplaced/invalid line).
fn split_var_def(rest: &str) -> Option<(&str, &str)> {
    let eq = rest.find('=')?;
    let name = rest[..eq].trim();
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return None;
    }
    let value = rest[eq + 1..].trim();
    Some((name, value))
}

fn is_http_preamble(trimmed: &str) -> bool {
    let Some(rest) = trimmed.strip_prefix("HTTP/") else {
        return false;
    };
    let mut parts = rest.splitn(2, char::is_whitespace);
    let version = parts.next().unwrap_or("");
    let mut digits = version.splitn(2, '.');
    let major = digits.next().unwrap_or("");
    let minor = digits.next().unwrap_or("");
    !major.is_empty()
        && !minor.is_empty()
        && major.chars().all(|c| c.is_ascii_digit())
        && minor.chars().all(|c| c.is_ascii_digit())
}

/// Recognize a bare `HTTP/x.y` version token, such as the trailing suffix on
/// a request line (`GET /users HTTP/1.1`). Shares the same grammar as the
/// tolerated preamble line, since both are just an `HTTP/` version token.
pub(crate) fn is_http_version_token(token: &str) -> bool {
    is_http_preamble(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_separator_with_and_without_title() {
        assert_eq!(classify("###"), LineKind::Separator(None));
        assert_eq!(classify("#### Get users"), LineKind::Separator(Some("Get users")));
    }

    #[test]
    fn classifies_hash_and_slash_directives() {
        assert_eq!(
            classify("# @name get-users"),
            LineKind::Directive {
                name: "name",
                value: Some("get-users")
            }
        );
        assert_eq!(
            classify("// @expect-status 200"),
            LineKind::Directive {
                name: "expect-status",
                value: Some("200")
            }
        );
    }

    #[test]
    fn classifies_directive_with_no_value() {
        assert_eq!(
            classify("# @no-log"),
            LineKind::Directive {
                name: "no-log",
                value: None
            }
        );
    }

    #[test]
    fn classifies_plain_comments() {
        assert_eq!(classify("# just a comment"), LineKind::Comment);
        assert_eq!(classify("// another comment"), LineKind::Comment);
    }

    #[test]
    fn classifies_file_level_var_def() {
        assert_eq!(
            classify("@host = https://example.com"),
            LineKind::VarDef {
                name: "host",
                value: "https://example.com"
            }
        );
    }

    #[test]
    fn var_def_without_equals_falls_through_to_other() {
        assert_eq!(classify("@not-a-vardef"), LineKind::Other("@not-a-vardef"));
    }

    #[test]
    fn classifies_blank_lines() {
        assert_eq!(classify(""), LineKind::Blank);
        assert_eq!(classify("   \t  "), LineKind::Blank);
    }

    #[test]
    fn classifies_file_reference() {
        assert_eq!(classify("< ./body.json"), LineKind::FileReference("./body.json"));
    }

    #[test]
    fn classifies_http_preamble() {
        assert_eq!(classify("HTTP/1.1 200 OK"), LineKind::Preamble);
        assert_eq!(classify("HTTP/1.1"), LineKind::Preamble);
    }

    #[test]
    fn non_preamble_http_like_line_is_other() {
        assert_eq!(classify("HTTPX/1.1"), LineKind::Other("HTTPX/1.1"));
    }

    #[test]
    fn everything_else_is_other() {
        assert_eq!(classify("GET https://example.com"), LineKind::Other("GET https://example.com"));
        assert_eq!(classify("Content-Type: application/json"), LineKind::Other("Content-Type: application/json"));
    }
}
