//! core::sections::thermal_throttler

use std::time::Duration;
use toml::Table;

use crate::core::codec::{CodecError, FieldKind, FieldSpec, MapReader, MapWriter, Section};

/// Token bucket limiting how much thermal video gets recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThermalThrottler {
    pub activate: bool,
    pub bucket_size: Duration,
    pub min_refill: Duration,
}

impl ThermalThrottler {
    pub fn defaults() -> Self {
        Self {
            activate: true,
            bucket_size: Duration::from_secs(10 * 60),
            min_refill: Duration::from_secs(10 * 60),
        }
    }
}

impl Section for ThermalThrottler {
    const KEY: &'static str = "thermal-throttler";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("activate", FieldKind::Bool),
        FieldSpec::new("bucket-size", FieldKind::Duration),
        FieldSpec::new("min-refill", FieldKind::Duration),
    ];

    fn to_map(&self) -> Table {
        MapWriter::new()
            .bool("activate", self.activate)
            .duration("bucket-size", self.bucket_size)
            .duration("min-refill", self.min_refill)
            .finish()
    }

    fn from_map(map: &Table) -> Result<Self, CodecError> {
        let r = MapReader::new(Self::KEY, map);
        Ok(Self {
            activate: r.bool("activate")?,
            bucket_size: r.duration("bucket-size")?,
            min_refill: r.duration("min-refill")?,
        })
    }
}
