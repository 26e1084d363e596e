//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! When `--json` is enabled, output is machine-readable JSON.

use std::fmt::Display;

use toml::{Table, Value};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print a success message (respects quiet mode).
pub fn success(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Render one section as a TOML table, header included.
pub fn format_section(key: &str, table: &Table) -> Result<String, toml::ser::Error> {
    if table.is_empty() {
        // An empty table serializes to nothing
        return Ok(format!("[{}]\n", key));
    }
    let mut wrapper = Table::new();
    wrapper.insert(key.to_string(), Value::Table(table.clone()));
    toml::to_string_pretty(&wrapper)
}

/// Convert a TOML table to JSON. Datetimes become RFC 3339 strings.
pub fn table_to_json(table: &Table) -> serde_json::Value {
    serde_json::Value::Object(
        table
            .iter()
            .map(|(key, value)| (key.clone(), value_to_json(value)))
            .collect(),
    )
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Float(f) => serde_json::Value::from(*f),
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Datetime(d) => serde_json::Value::String(d.to_string()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::Table(t) => table_to_json(t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn format_section_has_header() {
        let table: Table = toml::from_str("card = 1").unwrap();
        let text = format_section("audio", &table).unwrap();
        assert!(text.contains("[audio]"));
        assert!(text.contains("card = 1"));
        assert_eq!(format_section("audio", &Table::new()).unwrap(), "[audio]\n");
    }

    #[test]
    fn json_stringifies_datetimes() {
        let table: Table = toml::from_str("updated = 2024-01-02T03:04:05Z\nn = 2").unwrap();
        let json = table_to_json(&table);
        assert_eq!(json["updated"], "2024-01-02T03:04:05Z");
        assert_eq!(json["n"], 2);
    }
}
