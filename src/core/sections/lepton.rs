//! core::sections::lepton

use toml::Table;

use crate::core::codec::{CodecError, FieldKind, FieldSpec, MapReader, MapWriter, Section};

/// Thermal camera (Lepton) capture settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lepton {
    /// SPI clock speed in Hz.
    pub spi_speed: i64,
    /// Socket that frames are written to.
    pub frame_output: String,
}

impl Lepton {
    pub fn defaults() -> Self {
        Self {
            spi_speed: 2_000_000,
            frame_output: "/var/run/lepton-frames".to_string(),
        }
    }
}

impl Section for Lepton {
    const KEY: &'static str = "lepton";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("spi-speed", FieldKind::Int),
        FieldSpec::new("frame-output", FieldKind::String),
    ];

    fn to_map(&self) -> Table {
        MapWriter::new()
            .int("spi-speed", self.spi_speed)
            .string("frame-output", &self.frame_output)
            .finish()
    }

    fn from_map(map: &Table) -> Result<Self, CodecError> {
        let r = MapReader::new(Self::KEY, map);
        Ok(Self {
            spi_speed: r.int("spi-speed")?,
            frame_output: r.string("frame-output")?,
        })
    }
}
