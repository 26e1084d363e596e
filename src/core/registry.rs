//! core::registry
//!
//! Table of known configuration sections.
//!
//! # Architecture
//!
//! The registry maps a section key to a type-erased [`SectionDescriptor`]
//! holding the section's field list and codec entry points. It is built once
//! at startup with [`RegistryBuilder`], then shared read-only (usually behind
//! an `Arc`) by every store opened in the process.
//!
//! Registration is explicit: nothing is added behind the caller's back, and a
//! duplicate key is reported as [`RegistryError::DuplicateSection`] instead of
//! silently replacing the earlier entry.
//!
//! # Example
//!
//! ```
//! use cacophony_config::core::registry::Registry;
//!
//! let registry = Registry::builtin();
//! assert!(registry.get("audio").is_some());
//! assert!(registry.get("no-such-section").is_none());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;
use toml::Table;

use crate::core::codec::{CodecError, FieldSpec, Section};
use crate::core::sections;

/// Errors from building a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("section '{0}' is already registered")]
    DuplicateSection(String),
}

/// Type-erased description of a registered section.
#[derive(Clone, Copy)]
pub struct SectionDescriptor {
    key: &'static str,
    fields: &'static [FieldSpec],
    check: fn(&Table) -> Result<(), CodecError>,
    normalize: fn(&Table) -> Result<Table, CodecError>,
}

fn check_section<S: Section>(map: &Table) -> Result<(), CodecError> {
    S::from_map(map)?.validate()
}

fn normalize_section<S: Section>(map: &Table) -> Result<Table, CodecError> {
    let value = S::from_map(map)?;
    value.validate()?;
    Ok(value.to_sparse_map())
}

impl SectionDescriptor {
    /// Describe section type `S`.
    pub fn of<S: Section>() -> Self {
        Self {
            key: S::KEY,
            fields: S::FIELDS,
            check: check_section::<S>,
            normalize: normalize_section::<S>,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Look up a declared field by its document name.
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        FieldSpec::find(self.fields, name)
    }

    /// Decode `map` and run the section's validator.
    pub fn check(&self, map: &Table) -> Result<(), CodecError> {
        (self.check)(map)
    }

    /// Decode, validate and re-encode `map` in sparse canonical form.
    ///
    /// Keys outside the schema are dropped and zero values omitted.
    pub fn normalize(&self, map: &Table) -> Result<Table, CodecError> {
        (self.normalize)(map)
    }
}

impl fmt::Debug for SectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionDescriptor")
            .field("key", &self.key)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Immutable table of registered sections.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    sections: BTreeMap<&'static str, SectionDescriptor>,
}

impl Registry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry holding every built-in section.
    ///
    /// # Panics
    ///
    /// Panics if two built-in sections share a key. That is a programming
    /// error and is covered by this module's tests.
    pub fn builtin() -> Self {
        match sections::register_builtin(Self::builder()) {
            Ok(builder) => builder.build(),
            Err(e) => panic!("invalid built-in section table: {}", e),
        }
    }

    pub fn get(&self, key: &str) -> Option<&SectionDescriptor> {
        self.sections.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.sections.contains_key(key)
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.sections.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionDescriptor> {
        self.sections.values()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Builder for [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    sections: BTreeMap<&'static str, SectionDescriptor>,
}

impl RegistryBuilder {
    /// Register section type `S`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateSection`] if `S::KEY` is taken.
    pub fn register<S: Section>(mut self) -> Result<Self, RegistryError> {
        if self.sections.contains_key(S::KEY) {
            return Err(RegistryError::DuplicateSection(S::KEY.to_string()));
        }
        self.sections.insert(S::KEY, SectionDescriptor::of::<S>());
        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry {
            sections: self.sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::codec::UPDATED_KEY;
    use crate::core::sections::{Audio, Windows};

    #[test]
    fn builtin_registers_all_sections() {
        let registry = Registry::builtin();
        let keys: Vec<_> = registry.keys().collect();
        assert_eq!(
            keys,
            vec![
                "audio",
                "battery",
                "device",
                "gpio",
                "lepton",
                "location",
                "modemd",
                "ports",
                "secrets",
                "test-hosts",
                "thermal-motion",
                "thermal-recorder",
                "thermal-throttler",
                "windows",
            ]
        );
    }

    #[test]
    fn duplicate_registration_fails() {
        let result = Registry::builder()
            .register::<Audio>()
            .unwrap()
            .register::<Audio>();
        assert_eq!(
            result.unwrap_err(),
            RegistryError::DuplicateSection("audio".into())
        );
    }

    #[test]
    fn builtin_into_populated_builder_fails() {
        let builder = Registry::builder().register::<Windows>().unwrap();
        assert!(sections::register_builtin(builder).is_err());
    }

    #[test]
    fn no_section_declares_updated() {
        for descriptor in Registry::builtin().iter() {
            assert!(
                descriptor.field(UPDATED_KEY).is_none(),
                "section '{}' declares '{}'",
                descriptor.key(),
                UPDATED_KEY
            );
        }
    }

    #[test]
    fn normalize_coerces_and_drops_zero_values() {
        let registry = Registry::builtin();
        let audio = registry.get("audio").unwrap();
        let map: Table = toml::from_str("card = '4'\ndirectory = ''").unwrap();

        let normalized = audio.normalize(&map).unwrap();
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized.get("card"), Some(&toml::Value::Integer(4)));
    }

    #[test]
    fn check_runs_validator() {
        let registry = Registry::builtin();
        let windows = registry.get("windows").unwrap();
        let map: Table = toml::from_str("power-on = 'whenever'").unwrap();
        assert!(matches!(
            windows.check(&map),
            Err(CodecError::Invalid { .. })
        ));
    }
}
