//! core::sections::battery

use toml::Table;

use crate::core::codec::{CodecError, FieldKind, FieldSpec, MapReader, MapWriter, Section};

/// Battery voltage reading thresholds (raw ADC values).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Battery {
    pub enable_voltage_readings: bool,
    pub no_battery_reading: u16,
    pub low_battery_reading: u16,
    pub full_battery_reading: u16,
}

impl Battery {
    pub fn defaults() -> Self {
        Self {
            enable_voltage_readings: true,
            ..Default::default()
        }
    }
}

impl Section for Battery {
    const KEY: &'static str = "battery";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("enable-voltage-readings", FieldKind::Bool),
        FieldSpec::new("no-battery-reading", FieldKind::UInt),
        FieldSpec::new("low-battery-reading", FieldKind::UInt),
        FieldSpec::new("full-battery-reading", FieldKind::UInt),
    ];

    fn to_map(&self) -> Table {
        MapWriter::new()
            .bool("enable-voltage-readings", self.enable_voltage_readings)
            .int("no-battery-reading", self.no_battery_reading)
            .int("low-battery-reading", self.low_battery_reading)
            .int("full-battery-reading", self.full_battery_reading)
            .finish()
    }

    fn from_map(map: &Table) -> Result<Self, CodecError> {
        let r = MapReader::new(Self::KEY, map);
        Ok(Self {
            enable_voltage_readings: r.bool("enable-voltage-readings")?,
            no_battery_reading: r.int("no-battery-reading")?,
            low_battery_reading: r.int("low-battery-reading")?,
            full_battery_reading: r.int("full-battery-reading")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_from_string_token() {
        let mut map = Table::new();
        map.insert("enable-voltage-readings".into(), "true".into());
        let battery = Battery::from_map(&map).unwrap();
        assert_eq!(
            battery,
            Battery {
                enable_voltage_readings: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn reading_out_of_range_is_rejected() {
        let mut map = Table::new();
        map.insert("low-battery-reading".into(), toml::Value::Integer(70_000));
        assert!(matches!(
            Battery::from_map(&map),
            Err(CodecError::TypeMismatch { .. })
        ));
    }
}
