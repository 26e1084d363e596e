//! core::codec::coerce
//!
//! Weakly-typed conversions from document values to Rust values.
//!
//! Values reach a section codec from three places: the TOML document (already
//! typed), maps built by callers, and single strings from the command line.
//! The conversions here accept all three, so `"4"`, `4` and `4.0` all decode
//! as an integer field and `"true"`, `"1"` and `1` all decode as `true`.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use std::time::Duration;
use toml::{Table, Value};

use super::duration;
use super::FieldKind;

/// A value that could not be converted to the requested type.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// Human readable name of the expected type.
    pub expected: &'static str,
    /// Description of the value that was found.
    pub found: String,
}

impl Mismatch {
    fn new(expected: &'static str, found: &Value) -> Self {
        Self {
            expected,
            found: describe(found),
        }
    }
}

/// Describe a value for error messages, e.g. `string "abc"`.
pub fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("string {:?}", s),
        Value::Integer(i) => format!("integer {}", i),
        Value::Float(f) => format!("float {}", f),
        Value::Boolean(b) => format!("boolean {}", b),
        Value::Datetime(d) => format!("datetime {}", d),
        Value::Array(a) => format!("array of {} values", a.len()),
        Value::Table(_) => "table".to_string(),
    }
}

fn parse_bool_token(token: &str) -> Option<bool> {
    match token {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

pub fn to_bool(value: &Value) -> Result<bool, Mismatch> {
    match value {
        Value::Boolean(b) => Ok(*b),
        Value::Integer(i) => Ok(*i != 0),
        Value::Float(f) => Ok(*f != 0.0),
        Value::String(s) if s.trim().is_empty() => Ok(false),
        Value::String(s) => parse_bool_token(s.trim()).ok_or_else(|| Mismatch::new("boolean", value)),
        _ => Err(Mismatch::new("boolean", value)),
    }
}

pub fn to_i64(value: &Value) -> Result<i64, Mismatch> {
    match value {
        Value::Integer(i) => Ok(*i),
        Value::Boolean(b) => Ok(i64::from(*b)),
        Value::Float(f) if f.is_finite() && f.trunc() >= i64::MIN as f64 && f.trunc() <= i64::MAX as f64 => {
            Ok(f.trunc() as i64)
        }
        Value::String(s) if s.trim().is_empty() => Ok(0),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| Mismatch::new("integer", value)),
        _ => Err(Mismatch::new("integer", value)),
    }
}

/// Convert to any integer type, checking its range.
pub fn to_int<T: TryFrom<i64>>(value: &Value) -> Result<T, Mismatch> {
    let wide = to_i64(value)?;
    T::try_from(wide).map_err(|_| Mismatch::new("integer in range", value))
}

pub fn to_f64(value: &Value) -> Result<f64, Mismatch> {
    match value {
        Value::Float(f) => Ok(*f),
        Value::Integer(i) => Ok(*i as f64),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) if s.trim().is_empty() => Ok(0.0),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| Mismatch::new("float", value)),
        _ => Err(Mismatch::new("float", value)),
    }
}

pub fn to_string(value: &Value) -> Result<String, Mismatch> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Boolean(b) => Ok(if *b { "1" } else { "0" }.to_string()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Datetime(d) => Ok(d.to_string()),
        _ => Err(Mismatch::new("string", value)),
    }
}

/// Integers are taken as nanoseconds.
pub fn to_duration(value: &Value) -> Result<Duration, Mismatch> {
    match value {
        Value::String(s) if s.trim().is_empty() => Ok(Duration::ZERO),
        Value::String(s) => duration::parse(s).map_err(|_| Mismatch::new("duration", value)),
        Value::Integer(i) if *i >= 0 => Ok(Duration::from_nanos(*i as u64)),
        _ => Err(Mismatch::new("duration", value)),
    }
}

/// Empty strings decode as "no timestamp".
pub fn to_timestamp(value: &Value) -> Result<Option<DateTime<Utc>>, Mismatch> {
    match value {
        Value::Datetime(d) => parse_timestamp(&d.to_string())
            .map(Some)
            .ok_or_else(|| Mismatch::new("timestamp", value)),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => parse_timestamp(s.trim())
            .map(Some)
            .ok_or_else(|| Mismatch::new("timestamp", value)),
        _ => Err(Mismatch::new("timestamp", value)),
    }
}

/// A single string is split on commas.
pub fn to_string_list(value: &Value) -> Result<Vec<String>, Mismatch> {
    match value {
        Value::Array(items) => items.iter().map(to_string).collect(),
        Value::String(s) => Ok(s
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()),
        _ => Err(Mismatch::new("list of strings", value)),
    }
}

/// A string is parsed as an inline TOML array, e.g. `[{ name = "a" }]`.
pub fn to_table_list(value: &Value) -> Result<Vec<Table>, Mismatch> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Table(t) => Ok(t.clone()),
                other => Err(Mismatch::new("list of tables", other)),
            })
            .collect(),
        Value::String(s) => {
            let wrapped: Table = toml::from_str(&format!("v = {}", s))
                .map_err(|_| Mismatch::new("list of tables", value))?;
            match wrapped.get("v") {
                Some(inner @ Value::Array(_)) => to_table_list(inner),
                _ => Err(Mismatch::new("list of tables", value)),
            }
        }
        _ => Err(Mismatch::new("list of tables", value)),
    }
}

/// Parse an RFC 3339 timestamp. Timestamps without an offset are taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Encode a timestamp as a TOML datetime.
pub fn timestamp_value(timestamp: &DateTime<Utc>) -> Value {
    let text = timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true);
    match text.parse::<toml::value::Datetime>() {
        Ok(datetime) => Value::Datetime(datetime),
        Err(_) => Value::String(text),
    }
}

/// Convert a value to the canonical document representation of `kind`.
pub fn canonical(kind: FieldKind, value: &Value) -> Result<Value, Mismatch> {
    Ok(match kind {
        FieldKind::Bool => Value::Boolean(to_bool(value)?),
        FieldKind::Int => Value::Integer(to_i64(value)?),
        FieldKind::UInt => {
            let i = to_i64(value)?;
            if i < 0 {
                return Err(Mismatch::new("unsigned integer", value));
            }
            Value::Integer(i)
        }
        FieldKind::Float => Value::Float(to_f64(value)?),
        FieldKind::String => Value::String(to_string(value)?),
        FieldKind::Duration => Value::String(duration::format(to_duration(value)?)),
        FieldKind::Timestamp => match to_timestamp(value)? {
            Some(ts) => timestamp_value(&ts),
            None => Value::String(String::new()),
        },
        FieldKind::StringList => Value::Array(
            to_string_list(value)?
                .into_iter()
                .map(Value::String)
                .collect(),
        ),
        FieldKind::TableList => {
            Value::Array(to_table_list(value)?.into_iter().map(Value::Table).collect())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn s(text: &str) -> Value {
        Value::String(text.to_string())
    }

    #[test]
    fn bools_from_tokens_and_numbers() {
        assert!(to_bool(&s("true")).unwrap());
        assert!(to_bool(&s("T")).unwrap());
        assert!(to_bool(&s("1")).unwrap());
        assert!(!to_bool(&s("False")).unwrap());
        assert!(!to_bool(&s("")).unwrap());
        assert!(to_bool(&Value::Integer(7)).unwrap());
        assert!(to_bool(&s("yes")).is_err());
    }

    #[test]
    fn integers_from_strings_floats_and_bools() {
        assert_eq!(to_i64(&s("4")).unwrap(), 4);
        assert_eq!(to_i64(&s(" -12 ")).unwrap(), -12);
        assert_eq!(to_i64(&Value::Float(3.9)).unwrap(), 3);
        assert_eq!(to_i64(&Value::Boolean(true)).unwrap(), 1);
        assert!(to_i64(&s("four")).is_err());
    }

    #[test]
    fn ranged_integers() {
        assert_eq!(to_int::<u16>(&s("65535")).unwrap(), 65535);
        let err = to_int::<u16>(&s("70000")).unwrap_err();
        assert_eq!(err.expected, "integer in range");
        assert!(to_int::<u32>(&Value::Integer(-1)).is_err());
    }

    #[test]
    fn floats_from_strings() {
        assert_eq!(to_f64(&s("123.321")).unwrap(), 123.321);
        assert_eq!(to_f64(&Value::Integer(2)).unwrap(), 2.0);
    }

    #[test]
    fn strings_from_scalars() {
        assert_eq!(to_string(&Value::Integer(5)).unwrap(), "5");
        assert_eq!(to_string(&Value::Boolean(true)).unwrap(), "1");
        assert!(to_string(&Value::Array(vec![])).is_err());
    }

    #[test]
    fn durations_from_text_and_nanos() {
        assert_eq!(to_duration(&s("10m4s")).unwrap(), Duration::from_secs(604));
        assert_eq!(
            to_duration(&Value::Integer(1_500_000_000)).unwrap(),
            Duration::from_millis(1500)
        );
        assert!(to_duration(&s("soon")).is_err());
    }

    #[test]
    fn timestamps_from_strings_and_datetimes() {
        let expected = Utc.with_ymd_and_hms(2020, 5, 17, 8, 30, 0).unwrap();
        assert_eq!(
            to_timestamp(&s("2020-05-17T08:30:00Z")).unwrap(),
            Some(expected)
        );
        assert_eq!(
            to_timestamp(&s("2020-05-17T20:30:00+12:00")).unwrap(),
            Some(expected)
        );
        assert_eq!(to_timestamp(&timestamp_value(&expected)).unwrap(), Some(expected));
        assert_eq!(to_timestamp(&s("")).unwrap(), None);
        assert!(to_timestamp(&s("yesterday")).is_err());
    }

    #[test]
    fn string_lists_from_arrays_and_csv() {
        assert_eq!(
            to_string_list(&s("a.example, b.example,,")).unwrap(),
            vec!["a.example", "b.example"]
        );
        let array = Value::Array(vec![s("x"), Value::Integer(1)]);
        assert_eq!(to_string_list(&array).unwrap(), vec!["x", "1"]);
    }

    #[test]
    fn table_lists_from_inline_toml() {
        let tables = to_table_list(&s(r#"[{ name = "modem" }, { name = "other" }]"#)).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].get("name"), Some(&s("modem")));
        assert!(to_table_list(&s("[1, 2]")).is_err());
        assert!(to_table_list(&s("not toml")).is_err());
    }

    #[test]
    fn canonical_forms() {
        assert_eq!(canonical(FieldKind::Int, &s("5")).unwrap(), Value::Integer(5));
        assert_eq!(
            canonical(FieldKind::Duration, &s("90s")).unwrap(),
            s("1m30s")
        );
        assert!(canonical(FieldKind::UInt, &s("-1")).is_err());
        assert_eq!(
            canonical(FieldKind::StringList, &s("a,b")).unwrap(),
            Value::Array(vec![s("a"), s("b")])
        );
    }
}
