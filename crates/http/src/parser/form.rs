use std::collections::HashMap;

use crate::parser::decode::form_decode;
use crate::protocol::ParseError;

/// Decodes an `application/x-www-form-urlencoded` body.
///
/// Unlike a query string every pair must contain `=`. An empty body is an empty form.
pub(crate) fn parse_urlencoded(body: &[u8]) -> Result<HashMap<String, String>, ParseError> {
    let body = std::str::from_utf8(body).map_err(|_| ParseError::malformed_form("body is not utf-8"))?;
    // browsers may terminate the body with a line break
    let body = body.trim_end_matches(['\r', '\n']);

    let mut form = HashMap::new();
    for pair in body.split('&').filter(|pair| !pair.is_empty()) {
        let Some((name, value)) = pair.split_once('=') else {
            return Err(ParseError::malformed_form(format!("pair {pair:?} has no '='")));
        };
        let name = form_decode(name).map_err(|e| ParseError::malformed_form(format!("field name {name:?}: {e}")))?;
        let value = form_decode(value).map_err(|e| ParseError::malformed_form(format!("field {name:?}: {e}")))?;
        form.insert(name, value);
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_pairs() {
        let form = parse_urlencoded(b"a=1&b=two%20words").unwrap();
        assert_eq!(form, HashMap::from([("a".to_string(), "1".to_string()), ("b".to_string(), "two words".to_string())]));
    }

    #[test]
    fn empty_body_is_empty_form() {
        assert!(parse_urlencoded(b"").unwrap().is_empty());
    }

    #[test]
    fn pair_without_equals_is_malformed() {
        assert!(matches!(parse_urlencoded(b"a=1&broken"), Err(ParseError::MalformedFormBody { .. })));
    }

    #[test]
    fn non_utf8_is_malformed() {
        assert!(matches!(parse_urlencoded(&[b'a', b'=', 0xff]), Err(ParseError::MalformedFormBody { .. })));
    }
}
