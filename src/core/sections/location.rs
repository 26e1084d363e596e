//! core::sections::location
//!
//! Device location, either entered by hand or reported by GPS.
//!
//! The timestamp is truncated to whole seconds when encoded so a location
//! read back from the document compares equal to the one written.

use chrono::{DateTime, Timelike, Utc};
use toml::Table;

use crate::core::codec::{CodecError, FieldKind, FieldSpec, MapReader, MapWriter, Section};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Location {
    pub latitude: f32,
    pub longitude: f32,
    pub altitude: f32,
    pub accuracy: f32,
    /// When the location was recorded.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Location {
    /// Location used for sunrise/sunset relative windows when none is set.
    pub fn default_window_location() -> Self {
        Self {
            latitude: -43.5321,
            longitude: 172.6362,
            ..Default::default()
        }
    }
}

fn whole_seconds(ts: &DateTime<Utc>) -> DateTime<Utc> {
    ts.with_nanosecond(0).unwrap_or(*ts)
}

impl Section for Location {
    const KEY: &'static str = "location";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("latitude", FieldKind::Float),
        FieldSpec::new("longitude", FieldKind::Float),
        FieldSpec::new("altitude", FieldKind::Float),
        FieldSpec::new("accuracy", FieldKind::Float),
        FieldSpec::new("timestamp", FieldKind::Timestamp),
    ];

    fn to_map(&self) -> Table {
        let timestamp = self.timestamp.as_ref().map(whole_seconds);
        MapWriter::new()
            .float32("latitude", self.latitude)
            .float32("longitude", self.longitude)
            .float32("altitude", self.altitude)
            .float32("accuracy", self.accuracy)
            .timestamp("timestamp", timestamp.as_ref())
            .finish()
    }

    fn from_map(map: &Table) -> Result<Self, CodecError> {
        let r = MapReader::new(Self::KEY, map);
        Ok(Self {
            latitude: r.float32("latitude")?,
            longitude: r.float32("longitude")?,
            altitude: r.float32("altitude")?,
            accuracy: r.float32("accuracy")?,
            timestamp: r.timestamp("timestamp")?,
        })
    }
}
