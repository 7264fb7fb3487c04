//! `multipart/form-data` decoding for simple text fields.
//!
//! Each section opened by `--boundary` carries a `Content-Disposition: form-data; name="..."`
//! header, a blank line, and the value on the first non-empty line after it. File uploads
//! and multi-line values are not supported: only that first line is kept.

use std::collections::HashMap;

use crate::parser::decode::{html_unescape, percent_decode};
use crate::protocol::ParseError;

#[derive(Debug)]
enum Section {
    Preamble,
    Headers { name: Option<String> },
    Value { name: String },
    Done,
}

pub(crate) fn parse_multipart(body: &[u8], boundary: &str) -> Result<HashMap<String, String>, ParseError> {
    if boundary.is_empty() {
        return Err(ParseError::malformed_multipart("empty boundary"));
    }

    let body = std::str::from_utf8(body).map_err(|_| ParseError::malformed_multipart("body is not utf-8"))?;
    let delimiter = format!("--{boundary}");
    let close_delimiter = format!("--{boundary}--");

    let mut form = HashMap::new();
    let mut section = Section::Preamble;
    let mut closed = false;

    for line in body.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line)) {
        if line == close_delimiter || line == delimiter {
            finish_section(&section)?;
            if line == close_delimiter {
                closed = true;
                break;
            }
            section = Section::Headers { name: None };
            continue;
        }

        section = match section {
            Section::Preamble => Section::Preamble,
            Section::Done => Section::Done,
            Section::Headers { name } if line.is_empty() => match name {
                Some(name) => Section::Value { name },
                None => return Err(ParseError::malformed_multipart("section without a field name")),
            },
            Section::Headers { name: None } => Section::Headers { name: disposition_name(line)? },
            Section::Headers { name } => Section::Headers { name },
            Section::Value { name } if line.is_empty() => Section::Value { name },
            Section::Value { name } => {
                let value = percent_decode(line)
                    .map_err(|e| ParseError::malformed_multipart(format!("field {name:?}: {e}")))?;
                form.insert(name, html_unescape(&value).into_owned());
                Section::Done
            }
        };
    }

    if !closed {
        return Err(ParseError::malformed_multipart(format!("boundary {boundary:?} is never closed")));
    }

    Ok(form)
}

fn finish_section(section: &Section) -> Result<(), ParseError> {
    match section {
        Section::Preamble | Section::Done => Ok(()),
        Section::Headers { name: None } => Err(ParseError::malformed_multipart("section without a field name")),
        Section::Headers { name: Some(name) } | Section::Value { name } => {
            Err(ParseError::malformed_multipart(format!("field {name:?} has no value")))
        }
    }
}

/// Extracts the field name from a `Content-Disposition: form-data; name="..."` line.
///
/// Other section headers yield `None`.
fn disposition_name(line: &str) -> Result<Option<String>, ParseError> {
    let Some((header, value)) = line.split_once(':') else {
        return Ok(None);
    };
    if !header.trim().eq_ignore_ascii_case("content-disposition") {
        return Ok(None);
    }

    let mut params = value.split(';').map(str::trim);
    if !params.next().is_some_and(|kind| kind.eq_ignore_ascii_case("form-data")) {
        return Err(ParseError::malformed_multipart(format!("unsupported disposition {value:?}")));
    }

    params
        .find_map(|param| param.strip_prefix("name="))
        .map(|name| name.trim_matches('"'))
        .filter(|name| !name.is_empty())
        .map(|name| Some(name.to_string()))
        .ok_or_else(|| ParseError::malformed_multipart("content-disposition without a name"))
}
