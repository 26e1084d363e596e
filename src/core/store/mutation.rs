//! core::store::mutation
//!
//! Single-section changes, replayable against a freshly loaded document.
//!
//! Every write path in the store builds one [`Mutation`]. Committing it
//! applies it to the document re-read under the lock, so a change made by
//! another process to a different section in the meantime is kept. Batched
//! stores keep the list and replay it in order on `write()`.

use chrono::{DateTime, Utc};
use toml::{Table, Value};

use super::document;
use super::StoreError;
use crate::core::codec::CodecError;
use crate::core::registry::SectionDescriptor;

#[derive(Debug, Clone)]
pub(crate) enum Mutation {
    /// Replace a section's map.
    Replace { section: String, map: Table },

    /// Merge one value into a section.
    ///
    /// `check` re-validates the merged section; it is `None` for forced
    /// writes.
    Field {
        section: String,
        path: Vec<String>,
        value: Value,
        check: Option<SectionDescriptor>,
    },

    /// Remove a field or a whole section.
    ///
    /// `stamp` names the registered section whose `updated` is bumped.
    Unset {
        path: Vec<String>,
        stamp: Option<String>,
    },
}

impl Mutation {
    /// Section touched by this change.
    pub(crate) fn section(&self) -> &str {
        match self {
            Mutation::Replace { section, .. } | Mutation::Field { section, .. } => section,
            Mutation::Unset { path, .. } => path.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// Apply to `document`, stamping with `now`.
    ///
    /// Returns whether the document changed. On error the document may be
    /// partly modified and must be discarded by the caller.
    pub(crate) fn apply(&self, document: &mut Table, now: &DateTime<Utc>) -> Result<bool, StoreError> {
        match self {
            Mutation::Replace { section, map } => {
                document.insert(section.clone(), Value::Table(map.clone()));
                document::stamp(document, section, now);
                Ok(true)
            }
            Mutation::Field {
                section,
                path,
                value,
                check,
            } => {
                document::insert(document, path, value.clone())?;
                if let Some(descriptor) = check {
                    let empty = Table::new();
                    let merged = document
                        .get(section)
                        .and_then(Value::as_table)
                        .unwrap_or(&empty);
                    descriptor
                        .check(merged)
                        .map_err(|e| rejected_merge(section, path.get(1), e))?;
                }
                document::stamp(document, section, now);
                Ok(true)
            }
            Mutation::Unset { path, stamp } => {
                if document::remove(document, path)?.is_none() {
                    return Ok(false);
                }
                if let Some(section) = stamp {
                    document::stamp(document, section, now);
                }
                Ok(true)
            }
        }
    }
}

/// A type mismatch on some other field means the stored section no longer
/// decodes; anything else is a bad value for the written field.
fn rejected_merge(section: &str, written: Option<&String>, error: CodecError) -> StoreError {
    let other_field =
        matches!(&error, CodecError::TypeMismatch { field, .. } if Some(field) != written);
    if other_field {
        return StoreError::Decode(error);
    }
    StoreError::InvalidField {
        section: section.to_string(),
        reason: error.to_string(),
    }
}
