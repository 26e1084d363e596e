//! core::sections::ports

use toml::Table;

use crate::core::codec::{CodecError, FieldKind, FieldSpec, MapReader, MapWriter, Section};

/// Listening ports of local services.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ports {
    pub managementd: u16,
}

impl Ports {
    pub fn defaults() -> Self {
        Self { managementd: 80 }
    }
}

impl Section for Ports {
    const KEY: &'static str = "ports";

    const FIELDS: &'static [FieldSpec] = &[FieldSpec::new("managementd", FieldKind::UInt)];

    fn to_map(&self) -> Table {
        MapWriter::new().int("managementd", self.managementd).finish()
    }

    fn from_map(map: &Table) -> Result<Self, CodecError> {
        let r = MapReader::new(Self::KEY, map);
        Ok(Self {
            managementd: r.int("managementd")?,
        })
    }
}
