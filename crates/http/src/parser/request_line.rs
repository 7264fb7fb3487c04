use crate::ensure;
use crate::protocol::{Method, ParseError};

/// The three tokens of a request line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct RequestLine<'a> {
    pub method: Method,
    pub target: &'a str,
    pub version: &'a str,
}

/// Splits `METHOD SP TARGET SP VERSION` on single spaces.
pub(crate) fn parse_request_line(line: &str) -> Result<RequestLine<'_>, ParseError> {
    let mut tokens = line.split(' ');
    let (Some(method), Some(target), Some(version), None) = (tokens.next(), tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(ParseError::invalid_request_line(line));
    };

    ensure!(!target.is_empty() && !version.is_empty(), ParseError::invalid_request_line(line));

    let method = method.parse::<Method>()?;
    Ok(RequestLine { method, target, version })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_tokens() {
        let line = parse_request_line("GET /index.html?x=1 HTTP/1.1").unwrap();
        assert_eq!(line, RequestLine { method: Method::Get, target: "/index.html?x=1", version: "HTTP/1.1" });
    }

    #[test]
    fn wrong_token_count() {
        for line in ["GET /index.html", "GET /a b HTTP/1.1", "", "GET  /a HTTP/1.1"] {
            assert!(matches!(parse_request_line(line), Err(ParseError::InvalidRequestLine { .. })), "{line:?}");
        }
    }

    #[test]
    fn method_is_case_sensitive() {
        assert_eq!(parse_request_line("get / HTTP/1.1"), Err(ParseError::invalid_method("get")));
    }
}
