//! core::codec
//!
//! Conversion between typed sections and generic TOML tables.
//!
//! # Overview
//!
//! Every configuration section is a plain Rust struct implementing
//! [`Section`]. The trait pairs an explicit `to_map` / `from_map` codec with a
//! declared field list ([`FieldSpec`]) that the store uses to check and
//! coerce single-field writes.
//!
//! Decoding is weakly typed (see [`coerce`]): numeric strings become numbers,
//! boolean tokens become booleans, duration text becomes [`Duration`] and
//! RFC 3339 text becomes timestamps. Missing keys decode to the field's zero
//! value and keys outside the schema are ignored; rejecting unknown keys is
//! the store's job, since only it knows whether a write was forced.
//!
//! # Example
//!
//! ```
//! use cacophony_config::core::codec::Section;
//! use cacophony_config::core::sections::Audio;
//!
//! let audio = Audio {
//!     directory: "/var/lib/audiobait".into(),
//!     card: 1,
//!     volume_control: "PCM".into(),
//! };
//! let map = audio.to_map();
//! assert_eq!(Audio::from_map(&map).unwrap(), audio);
//! ```

pub mod coerce;
pub mod duration;

use chrono::{DateTime, Utc};
use std::fmt::Debug;
use std::time::Duration;
use thiserror::Error;
use toml::{Table, Value};

pub use coerce::Mismatch;

/// Key of the synthetic per-section modification timestamp.
///
/// Written by the store, never declared by a section.
pub const UPDATED_KEY: &str = "updated";

/// Errors from decoding or validating a section.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("section '{section}' field '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        section: String,
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("unknown keys in section '{section}': {}", keys.join(", "))]
    UnknownKeys { section: String, keys: Vec<String> },

    #[error("invalid section '{section}': {message}")]
    Invalid { section: String, message: String },
}

impl CodecError {
    /// Build a mismatch error for `section.field`.
    pub fn mismatch(section: &str, field: &str, mismatch: Mismatch) -> Self {
        CodecError::TypeMismatch {
            section: section.to_string(),
            field: field.to_string(),
            expected: mismatch.expected,
            found: mismatch.found,
        }
    }

    /// Build a validation error for `section`.
    pub fn invalid(section: &str, message: impl Into<String>) -> Self {
        CodecError::Invalid {
            section: section.to_string(),
            message: message.into(),
        }
    }
}

/// Declared type of a section field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int,
    UInt,
    Float,
    String,
    /// Stored as duration text, e.g. `"5m0s"`.
    Duration,
    /// Stored as a TOML datetime.
    Timestamp,
    StringList,
    /// Array of tables, e.g. the modem list.
    TableList,
}

impl FieldKind {
    /// Short name used in listings and error messages.
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Int => "int",
            FieldKind::UInt => "uint",
            FieldKind::Float => "float",
            FieldKind::String => "string",
            FieldKind::Duration => "duration",
            FieldKind::Timestamp => "timestamp",
            FieldKind::StringList => "list",
            FieldKind::TableList => "table-list",
        }
    }

    /// Whether `value` is this kind's zero value ("not set").
    ///
    /// Arrays and tables are never zero.
    pub fn is_zero(self, value: &Value) -> bool {
        match (self, value) {
            (FieldKind::Bool, Value::Boolean(b)) => !*b,
            (FieldKind::Int | FieldKind::UInt, Value::Integer(i)) => *i == 0,
            (FieldKind::Float, Value::Float(f)) => *f == 0.0,
            (FieldKind::String | FieldKind::Timestamp, Value::String(s)) => s.is_empty(),
            (FieldKind::Duration, Value::String(s)) => s.is_empty() || s == "0s",
            _ => false,
        }
    }
}

/// A declared field of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }

    /// Find a field by (lower-case) name.
    pub fn find(fields: &'static [FieldSpec], name: &str) -> Option<&'static FieldSpec> {
        fields.iter().find(|f| f.name == name)
    }
}

/// A named, independently typed configuration section.
///
/// `Default` is the zero value of the section (nothing set). Sections that
/// ship non-zero defaults expose them through an inherent `defaults()`.
pub trait Section: Sized + Clone + Debug + Default {
    /// Section key, the top-level table name in the document.
    const KEY: &'static str;

    /// Declared fields, keyed by their document names.
    const FIELDS: &'static [FieldSpec];

    /// Encode every field, zero values included.
    fn to_map(&self) -> Table;

    /// Decode from a map, coercing weakly typed values.
    fn from_map(map: &Table) -> Result<Self, CodecError>;

    /// Check cross-field constraints.
    fn validate(&self) -> Result<(), CodecError> {
        Ok(())
    }

    /// Encode only fields that differ from their zero value.
    ///
    /// Merging this form into a stored section never overwrites stored
    /// values with defaults.
    fn to_sparse_map(&self) -> Table {
        strip_zero_values(Self::FIELDS, self.to_map())
    }
}

/// Remove declared fields holding their kind's zero value.
pub fn strip_zero_values(fields: &[FieldSpec], mut map: Table) -> Table {
    for field in fields {
        let is_zero = map
            .get(field.name)
            .map(|value| field.kind.is_zero(value))
            .unwrap_or(false);
        if is_zero {
            map.remove(field.name);
        }
    }
    map
}

/// Keys of `map` that are neither declared fields nor [`UPDATED_KEY`], sorted.
pub fn unknown_keys(fields: &[FieldSpec], map: &Table) -> Vec<String> {
    let mut keys: Vec<String> = map
        .keys()
        .filter(|key| key.as_str() != UPDATED_KEY && !fields.iter().any(|f| f.name == key.as_str()))
        .cloned()
        .collect();
    keys.sort();
    keys
}

/// Largest unsigned value a document can hold.
pub const MAX_UINT: u64 = i64::MAX as u64;

/// Reject `value` for `section.field` if it does not fit a TOML integer.
pub fn check_uint(section: &str, field: &str, value: u64) -> Result<(), CodecError> {
    if value > MAX_UINT {
        return Err(CodecError::invalid(
            section,
            format!("{} ({}) is above {}", field, value, MAX_UINT),
        ));
    }
    Ok(())
}

/// Lower-case every key, recursing into tables and arrays of tables.
pub fn lowercase_keys(map: Table) -> Table {
    map.into_iter()
        .map(|(key, value)| (key.to_lowercase(), lowercase_value(value)))
        .collect()
}

fn lowercase_value(value: Value) -> Value {
    match value {
        Value::Table(t) => Value::Table(lowercase_keys(t)),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_value).collect()),
        other => other,
    }
}

/// Typed field access over a section map.
///
/// Missing fields decode to their zero value.
#[derive(Debug, Clone, Copy)]
pub struct MapReader<'a> {
    section: &'static str,
    map: &'a Table,
}

impl<'a> MapReader<'a> {
    pub fn new(section: &'static str, map: &'a Table) -> Self {
        Self { section, map }
    }

    /// Raw value of `field`, matching names case-insensitively.
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field).or_else(|| {
            self.map
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(field))
                .map(|(_, value)| value)
        })
    }

    fn decode<T: Default>(
        &self,
        field: &str,
        convert: impl FnOnce(&Value) -> Result<T, Mismatch>,
    ) -> Result<T, CodecError> {
        match self.get(field) {
            Some(value) => convert(value).map_err(|m| CodecError::mismatch(self.section, field, m)),
            None => Ok(T::default()),
        }
    }

    pub fn bool(&self, field: &str) -> Result<bool, CodecError> {
        self.decode(field, coerce::to_bool)
    }

    pub fn int<T: TryFrom<i64> + Default>(&self, field: &str) -> Result<T, CodecError> {
        self.decode(field, coerce::to_int::<T>)
    }

    pub fn float64(&self, field: &str) -> Result<f64, CodecError> {
        self.decode(field, coerce::to_f64)
    }

    pub fn float32(&self, field: &str) -> Result<f32, CodecError> {
        self.decode(field, |v| coerce::to_f64(v).map(|f| f as f32))
    }

    pub fn string(&self, field: &str) -> Result<String, CodecError> {
        self.decode(field, coerce::to_string)
    }

    pub fn duration(&self, field: &str) -> Result<Duration, CodecError> {
        self.decode(field, coerce::to_duration)
    }

    pub fn timestamp(&self, field: &str) -> Result<Option<DateTime<Utc>>, CodecError> {
        self.decode(field, coerce::to_timestamp)
    }

    pub fn string_list(&self, field: &str) -> Result<Vec<String>, CodecError> {
        self.decode(field, coerce::to_string_list)
    }

    /// Decode an array of tables, each through `item`.
    pub fn table_list<T>(
        &self,
        field: &str,
        item: impl Fn(MapReader<'_>) -> Result<T, CodecError>,
    ) -> Result<Vec<T>, CodecError> {
        let tables = self.decode(field, coerce::to_table_list)?;
        tables
            .iter()
            .map(|table| item(MapReader::new(self.section, table)))
            .collect()
    }
}

/// Builder for a section map.
#[derive(Debug, Default)]
pub struct MapWriter {
    map: Table,
}

impl MapWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bool(mut self, field: &str, value: bool) -> Self {
        self.map.insert(field.to_string(), Value::Boolean(value));
        self
    }

    pub fn int(mut self, field: &str, value: impl Into<i64>) -> Self {
        self.map.insert(field.to_string(), Value::Integer(value.into()));
        self
    }

    /// TOML integers are signed, so values above [`MAX_UINT`] cannot be
    /// stored. Sections with `u64` fields reject them in `validate` (see
    /// [`check_uint`]); an unchecked value is written as text.
    pub fn uint64(mut self, field: &str, value: u64) -> Self {
        let stored = match i64::try_from(value) {
            Ok(v) => Value::Integer(v),
            Err(_) => Value::String(value.to_string()),
        };
        self.map.insert(field.to_string(), stored);
        self
    }

    pub fn float64(mut self, field: &str, value: f64) -> Self {
        self.map.insert(field.to_string(), Value::Float(value));
        self
    }

    /// Written via the shortest `f32` text so it reads back bit-exact.
    pub fn float32(mut self, field: &str, value: f32) -> Self {
        let widened = value.to_string().parse::<f64>().unwrap_or(value as f64);
        self.map.insert(field.to_string(), Value::Float(widened));
        self
    }

    pub fn string(mut self, field: &str, value: &str) -> Self {
        self.map
            .insert(field.to_string(), Value::String(value.to_string()));
        self
    }

    pub fn duration(mut self, field: &str, value: Duration) -> Self {
        self.map
            .insert(field.to_string(), Value::String(duration::format(value)));
        self
    }

    /// `None` leaves the field out.
    pub fn timestamp(mut self, field: &str, value: Option<&DateTime<Utc>>) -> Self {
        if let Some(ts) = value {
            self.map.insert(field.to_string(), coerce::timestamp_value(ts));
        }
        self
    }

    pub fn string_list(mut self, field: &str, values: &[String]) -> Self {
        let items = values.iter().cloned().map(Value::String).collect();
        self.map.insert(field.to_string(), Value::Array(items));
        self
    }

    pub fn table_list(mut self, field: &str, tables: Vec<Table>) -> Self {
        let items = tables.into_iter().map(Value::Table).collect();
        self.map.insert(field.to_string(), Value::Array(items));
        self
    }

    pub fn finish(self) -> Table {
        self.map
    }
}
