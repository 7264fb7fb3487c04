use crate::protocol::ParseError;

/// Splits a header line on the first `": "`.
///
/// A line that has no `": "` is accepted only when it ends with `:`, which yields an empty
/// value. Names and values are returned as written.
pub(crate) fn parse_header_line(line: &str) -> Result<(&str, &str), ParseError> {
    if let Some((name, value)) = line.split_once(": ") {
        if name.is_empty() {
            return Err(ParseError::invalid_header(line));
        }
        return Ok((name, value));
    }

    match line.strip_suffix(':') {
        Some(name) if !name.is_empty() => Ok((name, "")),
        _ => Err(ParseError::invalid_header(line)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_colon_space() {
        assert_eq!(parse_header_line("Host: localhost:8080").unwrap(), ("Host", "localhost:8080"));
        assert_eq!(parse_header_line("X-Note: a: b").unwrap(), ("X-Note", "a: b"));
    }

    #[test]
    fn empty_value() {
        assert_eq!(parse_header_line("X-Empty:").unwrap(), ("X-Empty", ""));
        assert_eq!(parse_header_line("X-Empty: ").unwrap(), ("X-Empty", ""));
    }

    #[test]
    fn rejects_lines_without_separator() {
        for line in ["NoColonHere", "Host:localhost", ": value", ":"] {
            assert!(matches!(parse_header_line(line), Err(ParseError::InvalidHeader { .. })), "{line:?}");
        }
    }
}
