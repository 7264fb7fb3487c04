use std::collections::HashMap;

use crate::parser::decode::form_decode;
use crate::protocol::ParseError;

/// Parses `a=1&b=two+words` into a mapping.
///
/// Tokens without `=` map to an empty value, empty tokens are skipped and later duplicates
/// win. Decoding to invalid UTF-8 is reported as [`ParseError::InvalidUri`].
pub fn parse_query(query: &str) -> Result<HashMap<String, String>, ParseError> {
    let mut params = HashMap::new();

    for token in query.split('&').filter(|token| !token.is_empty()) {
        let (name, value) = token.split_once('=').unwrap_or((token, ""));
        let name = form_decode(name).map_err(|e| ParseError::invalid_uri(format!("query name {name:?}: {e}")))?;
        let value = form_decode(value).map_err(|e| ParseError::invalid_uri(format!("query value {value:?}: {e}")))?;
        params.insert(name, value);
    }

    Ok(params)
}

/// Encodes name/value pairs as a query string, the inverse of [`parse_query`].
pub fn encode_query<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    params
        .into_iter()
        .map(|(name, value)| format!("{}={}", urlencoding::encode(name), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_pairs() {
        let params = parse_query("a=1&b=two%20words&c=three+words").unwrap();
        assert_eq!(params.len(), 3);
        assert_eq!(params["a"], "1");
        assert_eq!(params["b"], "two words");
        assert_eq!(params["c"], "three words");
    }

    #[test]
    fn missing_value_and_empty_tokens() {
        let params = parse_query("flag&&x=&y=1").unwrap();
        assert_eq!(params.len(), 3);
        assert_eq!(params["flag"], "");
        assert_eq!(params["x"], "");
        assert_eq!(params["y"], "1");
    }

    #[test]
    fn value_may_contain_equals() {
        let params = parse_query("expr=a=b").unwrap();
        assert_eq!(params["expr"], "a=b");
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(matches!(parse_query("a=%FF"), Err(ParseError::InvalidUri { .. })));
    }

    #[test]
    fn reencoded_query_parses_back_to_same_set() {
        let original = parse_query("name=J%C3%BCrgen+M&tags=a%26b&empty=&eq=1%3D1").unwrap();
        let encoded = encode_query(original.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        let reparsed = parse_query(&encoded).unwrap();
        assert_eq!(reparsed, original);
        assert_eq!(reparsed["name"], "Jürgen M");
        assert_eq!(reparsed["tags"], "a&b");
    }
}
