//! core::sections::gpio

use toml::Table;

use crate::core::codec::{CodecError, FieldKind, FieldSpec, MapReader, MapWriter, Section};

/// GPIO pins controlling power to peripherals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gpio {
    pub thermal_camera_power: String,
    pub modem_power: String,
}

impl Gpio {
    pub fn defaults() -> Self {
        Self {
            thermal_camera_power: "GPIO23".to_string(),
            modem_power: "GPIO22".to_string(),
        }
    }
}

impl Section for Gpio {
    const KEY: &'static str = "gpio";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("thermal-camera-power", FieldKind::String),
        FieldSpec::new("modem-power", FieldKind::String),
    ];

    fn to_map(&self) -> Table {
        MapWriter::new()
            .string("thermal-camera-power", &self.thermal_camera_power)
            .string("modem-power", &self.modem_power)
            .finish()
    }

    fn from_map(map: &Table) -> Result<Self, CodecError> {
        let r = MapReader::new(Self::KEY, map);
        Ok(Self {
            thermal_camera_power: r.string("thermal-camera-power")?,
            modem_power: r.string("modem-power")?,
        })
    }
}
