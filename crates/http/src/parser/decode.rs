//! Text decoders shared by the URL, query and form parsers.

use std::borrow::Cow;
use std::string::FromUtf8Error;

/// Percent-decodes `input`. Malformed escapes are kept literally, invalid UTF-8 is an error.
pub fn percent_decode(input: &str) -> Result<Cow<'_, str>, FromUtf8Error> {
    urlencoding::decode(input)
}

/// Percent-decodes a form or query component, where `+` stands for a space.
pub fn form_decode(input: &str) -> Result<String, FromUtf8Error> {
    if input.contains('+') {
        urlencoding::decode(&input.replace('+', " ")).map(Cow::into_owned)
    } else {
        urlencoding::decode(input).map(Cow::into_owned)
    }
}

/// Decodes the HTML character references a browser may put into a form value.
///
/// Named references `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;` and numeric references
/// (`&#39;`, `&#x27;`) are recognized. Anything else, including references to invalid code
/// points, is left untouched.
pub fn html_unescape(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('&') {
        output.push_str(&rest[..start]);
        rest = &rest[start..];

        match rest.find(';').and_then(|end| decode_reference(&rest[1..end]).map(|ch| (ch, end))) {
            Some((ch, end)) => {
                output.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                output.push('&');
                rest = &rest[1..];
            }
        }
    }
    output.push_str(rest);

    Cow::Owned(output)
}

fn decode_reference(reference: &str) -> Option<char> {
    match reference {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let numeric = reference.strip_prefix('#')?;
            let code = match numeric.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => numeric.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_decode_handles_plus_and_escapes() {
        assert_eq!(form_decode("two+words").unwrap(), "two words");
        assert_eq!(form_decode("two%20words").unwrap(), "two words");
        assert_eq!(form_decode("a%2Bb").unwrap(), "a+b");
        assert!(form_decode("%FF").is_err());
    }

    #[test]
    fn percent_decode_keeps_plus() {
        assert_eq!(percent_decode("/a+b/c%2Fd").unwrap(), "/a+b/c/d");
    }

    #[test]
    fn html_unescape_references() {
        assert_eq!(html_unescape("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(html_unescape("&lt;b&gt;&quot;hi&quot;&lt;/b&gt;"), "<b>\"hi\"</b>");
        assert_eq!(html_unescape("it&#39;s &#x41;"), "it's A");
    }

    #[test]
    fn html_unescape_leaves_unknown_alone() {
        assert_eq!(html_unescape("a & b"), "a & b");
        assert_eq!(html_unescape("&bogus; &#xZZ;"), "&bogus; &#xZZ;");
        assert_eq!(html_unescape("trailing &"), "trailing &");
    }
}
