//! core::store::document
//!
//! Dotted-path access to the in-memory document tree.
//!
//! The document is a plain [`toml::Table`]: one top-level table per
//! section, plus whatever unknown top-level keys the file already holds.
//! Paths are lower-cased segments (`["location", "latitude"]`) produced by
//! [`split_key`].

use chrono::{DateTime, Utc};
use thiserror::Error;
use toml::{Table, Value};

use crate::core::codec::{coerce, UPDATED_KEY};

/// Errors from resolving a dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty key '{0}'")]
    Empty(String),

    #[error("'{path}' descends through non-table value '{at}'")]
    NotATable { path: String, at: String },
}

/// Split `section.field.sub` into lower-cased segments.
pub fn split_key(key: &str) -> Result<Vec<String>, PathError> {
    let segments: Vec<String> = key
        .trim()
        .split('.')
        .map(|s| s.trim().to_lowercase())
        .collect();
    if segments.iter().any(String::is_empty) {
        return Err(PathError::Empty(key.to_string()));
    }
    Ok(segments)
}

fn not_a_table(path: &[String], depth: usize) -> PathError {
    PathError::NotATable {
        path: path.join("."),
        at: path[..=depth].join("."),
    }
}

/// Value at `path`, if present.
///
/// A path running through a scalar simply resolves to nothing.
pub fn get<'a>(root: &'a Table, path: &[String]) -> Option<&'a Value> {
    let (last, parents) = path.split_last()?;
    let mut table = root;
    for segment in parents {
        table = table.get(segment)?.as_table()?;
    }
    table.get(last)
}

/// Insert `value` at `path`, creating intermediate tables.
pub fn insert(root: &mut Table, path: &[String], value: Value) -> Result<(), PathError> {
    let Some((last, parents)) = path.split_last() else {
        return Err(PathError::Empty(String::new()));
    };
    let mut table = root;
    for (depth, segment) in parents.iter().enumerate() {
        let entry = table
            .entry(segment.clone())
            .or_insert_with(|| Value::Table(Table::new()));
        table = match entry {
            Value::Table(t) => t,
            _ => return Err(not_a_table(path, depth)),
        };
    }
    table.insert(last.clone(), value);
    Ok(())
}

/// Remove the value at `path`.
///
/// Returns `Ok(None)` when nothing is stored there. Descending through a
/// non-table value is an error.
pub fn remove(root: &mut Table, path: &[String]) -> Result<Option<Value>, PathError> {
    let Some((last, parents)) = path.split_last() else {
        return Err(PathError::Empty(String::new()));
    };
    let mut table = root;
    for (depth, segment) in parents.iter().enumerate() {
        table = match table.get_mut(segment) {
            None => return Ok(None),
            Some(Value::Table(t)) => t,
            Some(_) => return Err(not_a_table(path, depth)),
        };
    }
    Ok(table.remove(last))
}

/// Set `<section>.updated` to `now`.
///
/// A missing (or non-table) section becomes a table holding only the stamp.
pub fn stamp(root: &mut Table, section: &str, now: &DateTime<Utc>) {
    let entry = root
        .entry(section.to_string())
        .or_insert_with(|| Value::Table(Table::new()));
    if !entry.is_table() {
        *entry = Value::Table(Table::new());
    }
    if let Value::Table(table) = entry {
        table.insert(UPDATED_KEY.to_string(), coerce::timestamp_value(now));
    }
}

/// Parse document text; blank text is an empty document.
///
/// Keys are folded to lower case on the way in, so a hand-edited
/// `[Audio]` is the `audio` section. Tables whose names differ only by
/// case are merged, the later key winning on conflicting values.
pub fn parse(text: &str) -> Result<Table, toml::de::Error> {
    if text.trim().is_empty() {
        return Ok(Table::new());
    }
    Ok(fold_keys(text.parse::<Table>()?))
}

fn fold_keys(table: Table) -> Table {
    let mut folded = Table::new();
    for (key, value) in table {
        merge_into(&mut folded, key.to_lowercase(), fold_value(value));
    }
    folded
}

fn fold_value(value: Value) -> Value {
    match value {
        Value::Table(t) => Value::Table(fold_keys(t)),
        Value::Array(items) => Value::Array(items.into_iter().map(fold_value).collect()),
        other => other,
    }
}

fn merge_into(table: &mut Table, key: String, value: Value) {
    match (table.get_mut(&key), value) {
        (Some(Value::Table(existing)), Value::Table(incoming)) => {
            for (k, v) in incoming {
                merge_into(existing, k, v);
            }
        }
        (_, value) => {
            table.insert(key, value);
        }
    }
}

pub fn serialize(document: &Table) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn doc(text: &str) -> Table {
        parse(text).unwrap()
    }

    fn path(key: &str) -> Vec<String> {
        split_key(key).unwrap()
    }

    #[test]
    fn parse_folds_key_case() {
        let d = doc("[Audio]\nCard = 3\n[audio]\nvolume = 7\n[Modemd.Extra]\nX = 1");
        assert_eq!(d.len(), 2);
        assert_eq!(get(&d, &path("audio.card")), Some(&Value::Integer(3)));
        assert_eq!(get(&d, &path("audio.volume")), Some(&Value::Integer(7)));
        assert_eq!(get(&d, &path("modemd.extra.x")), Some(&Value::Integer(1)));
        assert!(d.get("Audio").is_none());
    }

    #[test]
    fn split_key_lowercases() {
        assert_eq!(path("Location.LATITUDE"), vec!["location", "latitude"]);
        assert!(matches!(split_key("audio..card"), Err(PathError::Empty(_))));
        assert!(matches!(split_key(""), Err(PathError::Empty(_))));
    }

    #[test]
    fn get_nested_and_missing() {
        let d = doc("[location]\nlatitude = 1.5\n[modemd.extra]\nx = 1");
        assert_eq!(get(&d, &path("location.latitude")), Some(&Value::Float(1.5)));
        assert_eq!(get(&d, &path("modemd.extra.x")), Some(&Value::Integer(1)));
        assert!(get(&d, &path("location.longitude")).is_none());
        assert!(get(&d, &path("location.latitude.foo")).is_none());
        assert!(get(&d, &path("nothing")).is_none());
    }

    #[test]
    fn insert_creates_tables() {
        let mut d = Table::new();
        insert(&mut d, &path("audio.card"), Value::Integer(2)).unwrap();
        insert(&mut d, &path("audio.extra.deep"), Value::Boolean(true)).unwrap();
        assert_eq!(get(&d, &path("audio.card")), Some(&Value::Integer(2)));
        assert_eq!(get(&d, &path("audio.extra.deep")), Some(&Value::Boolean(true)));
    }

    #[test]
    fn insert_through_scalar_fails() {
        let mut d = doc("[audio]\ncard = 1");
        let err = insert(&mut d, &path("audio.card.x"), Value::Integer(2)).unwrap_err();
        assert_eq!(
            err,
            PathError::NotATable {
                path: "audio.card.x".into(),
                at: "audio.card".into(),
            }
        );
    }

    #[test]
    fn remove_field_keeps_siblings() {
        let mut d = doc("[location]\nlatitude = 1.0\nlongitude = 2.0");
        let removed = remove(&mut d, &path("location.latitude")).unwrap();
        assert_eq!(removed, Some(Value::Float(1.0)));
        assert!(get(&d, &path("location.longitude")).is_some());
    }

    #[test]
    fn remove_missing_is_none_and_scalar_is_error() {
        let mut d = doc("[location]\nlatitude = 1.0");
        assert_eq!(remove(&mut d, &path("windows.power-on")).unwrap(), None);
        assert!(matches!(
            remove(&mut d, &path("location.latitude.foo")),
            Err(PathError::NotATable { .. })
        ));
    }

    #[test]
    fn stamp_creates_section() {
        let now = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let mut d = Table::new();
        stamp(&mut d, "device", &now);
        let updated = get(&d, &path("device.updated")).unwrap();
        assert!(matches!(updated, Value::Datetime(_)));
        assert_eq!(coerce::to_timestamp(updated).unwrap(), Some(now));
    }

    #[test]
    fn parse_blank_is_empty() {
        assert!(parse("  \n").unwrap().is_empty());
        assert!(parse("[audio\n").is_err());
    }
}
