//! core::sections::device

use toml::Table;

use crate::core::codec::{CodecError, FieldKind, FieldSpec, MapReader, MapWriter, Section};

/// Device identity as registered with the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Device {
    pub id: u32,
    pub name: String,
    pub group: String,
    /// Base URL of the API server.
    pub server: String,
}

impl Section for Device {
    const KEY: &'static str = "device";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", FieldKind::UInt),
        FieldSpec::new("name", FieldKind::String),
        FieldSpec::new("group", FieldKind::String),
        FieldSpec::new("server", FieldKind::String),
    ];

    fn to_map(&self) -> Table {
        MapWriter::new()
            .int("id", self.id)
            .string("name", &self.name)
            .string("group", &self.group)
            .string("server", &self.server)
            .finish()
    }

    fn from_map(map: &Table) -> Result<Self, CodecError> {
        let r = MapReader::new(Self::KEY, map);
        Ok(Self {
            id: r.int("id")?,
            name: r.string("name")?,
            group: r.string("group")?,
            server: r.string("server")?,
        })
    }
}
