//! The source reader (C1): turns raw source text into a stable sequence of
//! `(line_number, raw_line)` pairs, normalizing line endings and stripping a
//! leading BOM.

use std::path::Path;

/// A single logical line with its 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// 1-based line number.
    pub number: u32,
    /// The raw line text, without its line terminator.
    pub text: &'a str,
}

/// Split `text` into logical lines, treating `\r\n`, `\r`, and `\n` all as
/// line boundaries, and stripping a leading UTF-8 BOM from the first line
/// without shifting its column numbering.
#[must_use]
pub fn read_lines(text: &str) -> Vec<SourceLine<'_>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = Vec::new();
    let mut number = 1u32;
    let mut rest = text;

    loop {
        let Some(idx) = rest.find(['\r', '\n']) else {
            if !rest.is_empty() {
                lines.push(SourceLine { number, text: rest });
            }
            break;
        };

        lines.push(SourceLine {
            number,
            text: &rest[..idx],
        });
        number += 1;

        rest = if rest.as_bytes().get(idx) == Some(&b'\r') && rest.as_bytes().get(idx + 1) == Some(&b'\n')
        {
            &rest[idx + 2..]
        } else {
            &rest[idx + 1..]
        };
    }

    lines
}

/// Read a `.http` source file from disk as UTF-8 text.
///
/// This is a convenience wrapper, not part of the hard-core pipeline: the
/// core entry point `application::parse` takes `&str` directly. I/O failure
/// propagates as a genuine `std::io::Error`, not a `Diagnostic` — it isn't
/// a condition the format itself can diagnose.
pub fn read_source_file(path: &Path) -> std::io::Result<String> {
    std::fs::read_to_string(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_all_line_ending_styles() {
        let text = "a\r\nb\nc\rd";
        let lines = read_lines(text);
        let texts: Vec<_> = lines.iter().map(|l| l.text).collect();
        assert_eq!(texts, vec!["a", "b", "c", "d"]);
        let numbers: Vec<_> = lines.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn strips_leading_bom_without_shifting_column() {
        let text = "\u{feff}GET /\n";
        let lines = read_lines(text);
        assert_eq!(lines[0].text, "GET /");
        assert_eq!(lines[0].number, 1);
    }

    #[test]
    fn empty_input_yields_no_lines() {
        assert!(read_lines("").is_empty());
    }

    #[test]
    fn trailing_newline_does_not_add_a_phantom_blank_line() {
        let lines = read_lines("GET /\n");
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn no_trailing_newline_still_yields_last_line() {
        let lines = read_lines("GET /");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "GET /");
    }

    #[test]
    fn reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.http");
        std::fs::write(&path, "GET https://example.com\n").unwrap();

        let content = read_source_file(&path).unwrap();
        assert_eq!(content, "GET https://example.com\n");
    }

    #[test]
    fn missing_file_propagates_io_error() {
        let result = read_source_file(Path::new("/no/such/file.http"));
        assert!(result.is_err());
    }
}
