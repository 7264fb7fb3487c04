//! Binding of declared handler parameters to request values.
//!
//! A handler entry declares its parameters with a name and a [`ParamType`]. Before the handler
//! runs, each one is looked up in the form body when the request has one, otherwise in the
//! query string, and coerced to its type. Parameters that are missing or fail coercion are left
//! out of the resulting [`Args`]; fields nobody declared are ignored.

use std::collections::HashMap;
use std::fmt;

use backed_http::protocol::ParsedRequest;
use tracing::debug;

/// Target type of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    String,
    /// signed 64-bit integer
    Int,
    /// unsigned 64-bit integer
    UInt,
    Float,
    /// `true`/`false`/`1`/`0`
    Bool,
}

/// A coerced parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

/// A declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    name: String,
    ty: ParamType,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self { name: name.into(), ty }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> ParamType {
        self.ty
    }
}

impl ParamType {
    /// Coerces `raw`, returning `None` when it is not a valid value of this type.
    pub fn coerce(self, raw: &str) -> Option<ParamValue> {
        match self {
            ParamType::String => Some(ParamValue::String(raw.to_string())),
            ParamType::Int => raw.trim().parse().ok().map(ParamValue::Int),
            ParamType::UInt => raw.trim().parse().ok().map(ParamValue::UInt),
            ParamType::Float => raw.trim().parse().ok().map(ParamValue::Float),
            ParamType::Bool => match raw.trim() {
                "true" | "1" => Some(ParamValue::Bool(true)),
                "false" | "0" => Some(ParamValue::Bool(false)),
                _ => None,
            },
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::String(value) => f.write_str(value),
            ParamValue::Int(value) => write!(f, "{value}"),
            ParamValue::UInt(value) => write!(f, "{value}"),
            ParamValue::Float(value) => write!(f, "{value}"),
            ParamValue::Bool(value) => write!(f, "{value}"),
        }
    }
}

/// The bound parameters of one invocation, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: Vec<(String, ParamValue)>,
}

impl Args {
    pub fn empty() -> Self {
        Default::default()
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ParamValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            ParamValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_u64(&self, name: &str) -> Option<u64> {
        match self.get(name)? {
            ParamValue::UInt(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            ParamValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            ParamValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Binds `params` against `request`.
pub fn bind(params: &[Param], request: &ParsedRequest) -> Args {
    if params.is_empty() {
        return Args::empty();
    }

    let source: &HashMap<String, String> = request.form().unwrap_or_else(|| request.query());

    let values = params
        .iter()
        .filter_map(|param| {
            let Some(raw) = source.get(param.name()) else {
                debug!(param = param.name(), "parameter not present in request");
                return None;
            };
            match param.ty().coerce(raw) {
                Some(value) => Some((param.name().to_string(), value)),
                None => {
                    debug!(param = param.name(), ty = ?param.ty(), raw = %raw, "parameter coercion failed, skip it");
                    None
                }
            }
        })
        .collect();

    Args { values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backed_http::protocol::Method;

    #[test]
    fn coercion_rules() {
        assert_eq!(ParamType::Int.coerce("-12"), Some(ParamValue::Int(-12)));
        assert_eq!(ParamType::UInt.coerce("-12"), None);
        assert_eq!(ParamType::UInt.coerce("42"), Some(ParamValue::UInt(42)));
        assert_eq!(ParamType::Float.coerce("2.5"), Some(ParamValue::Float(2.5)));
        assert_eq!(ParamType::Bool.coerce("1"), Some(ParamValue::Bool(true)));
        assert_eq!(ParamType::Bool.coerce("false"), Some(ParamValue::Bool(false)));
        assert_eq!(ParamType::Bool.coerce("yes"), None);
        assert_eq!(ParamType::String.coerce(" x "), Some(ParamValue::String(" x ".into())));
    }

    #[test]
    fn binds_from_query() {
        let request = ParsedRequest::builder(Method::Get, "/users").query("id", "7").query("verbose", "true").build();
        let params = [Param::new("id", ParamType::UInt), Param::new("verbose", ParamType::Bool)];

        let args = bind(&params, &request);
        assert_eq!(args.get_u64("id"), Some(7));
        assert_eq!(args.get_bool("verbose"), Some(true));
    }

    #[test]
    fn form_takes_precedence_over_query() {
        let request = ParsedRequest::builder(Method::Post, "/users").query("name", "from-query").form("name", "from-form").build();
        let args = bind(&[Param::new("name", ParamType::String)], &request);
        assert_eq!(args.get_str("name"), Some("from-form"));
    }

    #[test]
    fn failed_coercion_skips_only_that_parameter() {
        let request = ParsedRequest::builder(Method::Get, "/").query("age", "abc").query("name", "bob").query("extra", "1").build();
        let params = [Param::new("age", ParamType::Int), Param::new("name", ParamType::String)];

        let args = bind(&params, &request);
        assert_eq!(args.len(), 1);
        assert_eq!(args.get("age"), None);
        assert_eq!(args.get_str("name"), Some("bob"));
        assert_eq!(args.get("extra"), None);
    }

    #[test]
    fn typed_getters_check_the_type() {
        let request = ParsedRequest::builder(Method::Get, "/").query("n", "5").build();
        let args = bind(&[Param::new("n", ParamType::Int)], &request);
        assert_eq!(args.get_i64("n"), Some(5));
        assert_eq!(args.get_u64("n"), None);
        assert_eq!(args.get_str("n"), None);
        assert_eq!(args.get("n").map(ToString::to_string), Some("5".to_string()));
    }
}
