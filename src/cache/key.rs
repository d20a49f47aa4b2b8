//! Key Codec Module
//!
//! Turns a request's filter parameters into a single deterministic cache key.
//!
//! Parameters are encoded as `name:value|name:value|...` with names sorted
//! lexicographically. Scalars are written as plain strings, structured values
//! as canonical JSON (object keys sorted at every depth), so two logically
//! equal requests always land on the same key. A `\` or `|` inside any value
//! is escaped with a backslash, so a key always splits back into its fields.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{CacheError, Result};

const PAIR_SEPARATOR: char = '|';
const NAME_SEPARATOR: char = ':';

// == Param Value ==
/// A single filter value supplied by a dashboard caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Inclusive date window
    DateRange { start: NaiveDate, end: NaiveDate },
    /// Set of ticket statuses; order never matters
    Statuses(BTreeSet<String>),
    /// Support level (e.g. "N1")
    Level(String),
    /// Result count limit
    Limit(u64),
    /// Arbitrary numeric filter; must be finite
    Number(f64),
    Flag(bool),
    Text(String),
    /// Anything else a caller needs to key on
    Json(Value),
}

impl ParamValue {
    fn encode_into(&self, out: &mut String) -> Result<()> {
        match self {
            ParamValue::DateRange { start, end } => {
                out.push_str(&format!(
                    "{{\"end\":\"{}\",\"start\":\"{}\"}}",
                    end.format("%Y-%m-%d"),
                    start.format("%Y-%m-%d")
                ));
            }
            ParamValue::Statuses(statuses) => {
                let list: Vec<&String> = statuses.iter().collect();
                push_escaped(out, &to_json_string(&list)?);
            }
            ParamValue::Level(s) | ParamValue::Text(s) => push_escaped(out, s),
            ParamValue::Limit(n) => out.push_str(&n.to_string()),
            ParamValue::Number(n) => {
                if !n.is_finite() {
                    return Err(CacheError::Serialization(format!(
                        "non-finite number {} cannot be encoded",
                        n
                    )));
                }
                out.push_str(&n.to_string());
            }
            ParamValue::Flag(b) => out.push_str(if *b { "true" } else { "false" }),
            ParamValue::Json(Value::String(s)) => push_escaped(out, s),
            ParamValue::Json(value) => {
                let mut canonical = String::new();
                write_canonical(value, &mut canonical)?;
                push_escaped(out, &canonical);
            }
        }
        Ok(())
    }
}

// == Cache Params ==
/// A caller's parameter mapping. Field order is irrelevant to the key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheParams {
    fields: BTreeMap<String, ParamValue>,
}

impl CacheParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) -> &mut Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn with(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn date_range(self, start: NaiveDate, end: NaiveDate) -> Self {
        self.with("dateRange", ParamValue::DateRange { start, end })
    }

    pub fn statuses<I, S>(self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = statuses.into_iter().map(Into::into).collect();
        self.with("status", ParamValue::Statuses(set))
    }

    pub fn level(self, level: impl Into<String>) -> Self {
        self.with("level", ParamValue::Level(level.into()))
    }

    pub fn limit(self, limit: u64) -> Self {
        self.with("limit", ParamValue::Limit(limit))
    }

    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(name, ParamValue::Text(value.into()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds params from a JSON object, typing the well-known dashboard fields.
    ///
    /// `level`, `limit`, `status` and `dateRange` become their typed variants
    /// when they have the expected shape; everything else is kept as JSON.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::new()),
            other => {
                return Err(CacheError::InvalidRequest(format!(
                    "params must be a JSON object, got {}",
                    json_kind(other)
                )))
            }
        };

        let mut params = Self::new();
        for (name, raw) in object {
            params.insert(name.clone(), typed_value(name, raw));
        }
        Ok(params)
    }

    /// Encodes these params into their cache key.
    pub fn encode(&self) -> Result<CacheKey> {
        encode(self)
    }
}

impl FromIterator<(String, ParamValue)> for CacheParams {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

// == Cache Key ==
/// An encoded cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for CacheKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Encode ==
/// Serializes a parameter mapping into its deterministic cache key.
///
/// Fails with [`CacheError::Serialization`] when a field name is empty or
/// contains a separator, or when a value has no JSON representation.
pub fn encode(params: &CacheParams) -> Result<CacheKey> {
    let mut out = String::new();
    for (i, (name, value)) in params.fields.iter().enumerate() {
        if name.is_empty() || name.contains(PAIR_SEPARATOR) || name.contains(NAME_SEPARATOR) {
            return Err(CacheError::Serialization(format!(
                "invalid parameter name '{}'",
                name
            )));
        }
        if i > 0 {
            out.push(PAIR_SEPARATOR);
        }
        out.push_str(name);
        out.push(NAME_SEPARATOR);
        value.encode_into(&mut out)?;
    }
    Ok(CacheKey(out))
}

// == Helpers ==
fn typed_value(name: &str, raw: &Value) -> ParamValue {
    match (name, raw) {
        ("level", Value::String(s)) => ParamValue::Level(s.clone()),
        ("limit", Value::Number(n)) if n.is_u64() => {
            ParamValue::Limit(n.as_u64().unwrap_or_default())
        }
        ("status", Value::Array(items)) if items.iter().all(Value::is_string) => {
            ParamValue::Statuses(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
            )
        }
        ("dateRange", Value::Object(map)) => {
            let date = |field: &str| {
                map.get(field)
                    .and_then(Value::as_str)
                    .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            };
            match (date("start"), date("end")) {
                (Some(start), Some(end)) if map.len() == 2 => ParamValue::DateRange { start, end },
                _ => ParamValue::Json(raw.clone()),
            }
        }
        (_, Value::String(s)) => ParamValue::Text(s.clone()),
        (_, Value::Bool(b)) => ParamValue::Flag(*b),
        _ => ParamValue::Json(raw.clone()),
    }
}

/// Writes `value` as JSON with object keys sorted at every depth.
fn write_canonical(value: &Value, out: &mut String) -> Result<()> {
    match value {
        Value::Object(map) => {
            let mut names: Vec<&String> = map.keys().collect();
            names.sort();
            out.push('{');
            for (i, name) in names.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&to_json_string(name)?);
                out.push(':');
                write_canonical(&map[name], out)?;
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
        }
        scalar => out.push_str(&to_json_string(scalar)?),
    }
    Ok(())
}

fn to_json_string<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))
}

// Every value that can carry caller text goes through here, so no value can
// forge a field boundary.
fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        if c == '\\' || c == PAIR_SEPARATOR {
            out.push('\\');
        }
        out.push(c);
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_encode_sorts_names() {
        let params = CacheParams::new().limit(10).level("N1");
        assert_eq!(params.encode().unwrap().as_str(), "level:N1|limit:10");
    }

    #[test]
    fn test_encode_empty_params() {
        assert_eq!(CacheParams::new().encode().unwrap().as_str(), "");
    }

    #[test]
    fn test_insertion_order_irrelevant() {
        let a = CacheParams::new()
            .level("N2")
            .limit(5)
            .statuses(["open", "closed"]);
        let b = CacheParams::new()
            .statuses(["closed", "open"])
            .limit(5)
            .level("N2");
        assert_eq!(a.encode().unwrap(), b.encode().unwrap());
    }

    #[test]
    fn test_date_range_encoding() {
        let params = CacheParams::new().date_range(date("2024-01-01"), date("2024-01-31"));
        assert_eq!(
            params.encode().unwrap().as_str(),
            r#"dateRange:{"end":"2024-01-31","start":"2024-01-01"}"#
        );
    }

    #[test]
    fn test_nested_json_canonicalized() {
        let a = CacheParams::new().with(
            "filter",
            ParamValue::Json(json!({"b": {"y": 1, "x": [2, {"q": 1, "p": 0}]}, "a": null})),
        );
        let b = CacheParams::new().with(
            "filter",
            ParamValue::Json(json!({"a": null, "b": {"x": [2, {"p": 0, "q": 1}], "y": 1}})),
        );
        let key = a.encode().unwrap();
        assert_eq!(key, b.encode().unwrap());
        assert_eq!(
            key.as_str(),
            r#"filter:{"a":null,"b":{"x":[2,{"p":0,"q":1}],"y":1}}"#
        );
    }

    #[test]
    fn test_non_finite_number_is_an_error() {
        let params = CacheParams::new().with("ratio", ParamValue::Number(f64::NAN));
        assert!(matches!(params.encode(), Err(CacheError::Serialization(_))));

        let params = CacheParams::new().with("ratio", ParamValue::Number(f64::INFINITY));
        assert!(matches!(params.encode(), Err(CacheError::Serialization(_))));
    }

    #[test]
    fn test_separator_in_name_is_an_error() {
        let params = CacheParams::new().text("a|b", "x");
        assert!(matches!(params.encode(), Err(CacheError::Serialization(_))));

        let params = CacheParams::new().text("", "x");
        assert!(matches!(params.encode(), Err(CacheError::Serialization(_))));
    }

    #[test]
    fn test_values_cannot_forge_fields() {
        let forged = CacheParams::new().text("a", "x|b:y");
        let split = CacheParams::new().text("a", "x").text("b", "y");
        assert_ne!(forged.encode().unwrap(), split.encode().unwrap());
    }

    #[test]
    fn test_structured_values_cannot_forge_fields() {
        let nested = CacheParams::from_json(&json!({ "a": { "k": "x|b:y" } })).unwrap();
        let split = CacheParams::from_json(&json!({ "a": "{\"k\":\"x", "b": "y\"}" })).unwrap();
        assert_ne!(nested.encode().unwrap(), split.encode().unwrap());
        assert_eq!(nested.encode().unwrap().as_str(), r#"a:{"k":"x\|b:y"}"#);

        let listed = CacheParams::new().statuses(["x|b:y"]);
        let split = CacheParams::new().text("status", "[\"x").text("b", "y\"]");
        assert_ne!(listed.encode().unwrap(), split.encode().unwrap());

        let backslash = CacheParams::new().with("a", ParamValue::Json(json!(["x\\", "y"])));
        assert_eq!(backslash.encode().unwrap().as_str(), r#"a:["x\\\\","y"]"#);
    }

    #[test]
    fn test_scalar_coercion() {
        let params = CacheParams::new()
            .with("active", ParamValue::Flag(true))
            .with("ratio", ParamValue::Number(0.5))
            .with("whole", ParamValue::Number(3.0));
        assert_eq!(
            params.encode().unwrap().as_str(),
            "active:true|ratio:0.5|whole:3"
        );
    }

    #[test]
    fn test_from_json_types_known_fields() {
        let params = CacheParams::from_json(&json!({
            "level": "N1",
            "limit": 10,
            "status": ["new", "assigned"],
            "dateRange": {"start": "2024-01-01", "end": "2024-01-31"},
            "search": "printer"
        }))
        .unwrap();

        let typed = CacheParams::new()
            .level("N1")
            .limit(10)
            .statuses(["assigned", "new"])
            .date_range(date("2024-01-01"), date("2024-01-31"))
            .text("search", "printer");
        assert_eq!(params, typed);
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(matches!(
            CacheParams::from_json(&json!([1, 2])),
            Err(CacheError::InvalidRequest(_))
        ));
        assert!(CacheParams::from_json(&Value::Null).unwrap().is_empty());
    }
}
