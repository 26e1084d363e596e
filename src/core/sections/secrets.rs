//! core::sections::secrets
//!
//! Credentials kept alongside the rest of the configuration. The store never
//! logs section contents, so these stay out of debug output.

use toml::Table;

use crate::core::codec::{CodecError, FieldKind, FieldSpec, MapReader, MapWriter, Section};

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    pub device_password: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("device_password", &"<redacted>")
            .finish()
    }
}

impl Section for Secrets {
    const KEY: &'static str = "secrets";

    const FIELDS: &'static [FieldSpec] = &[FieldSpec::new("device-password", FieldKind::String)];

    fn to_map(&self) -> Table {
        MapWriter::new()
            .string("device-password", &self.device_password)
            .finish()
    }

    fn from_map(map: &Table) -> Result<Self, CodecError> {
        let r = MapReader::new(Self::KEY, map);
        Ok(Self {
            device_password: r.string("device-password")?,
        })
    }
}
