//! core::sections::windows
//!
//! Daily recording and power windows.
//!
//! Each window edge is either a time of day (`"21:30"`) or an offset from
//! sunset/sunrise (`"-30m"`, `"+1h15m"`). An empty value means "not set".

use chrono::NaiveTime;
use toml::Table;

use crate::core::codec::{duration, CodecError, FieldKind, FieldSpec, MapReader, MapWriter, Section};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Windows {
    pub start_recording: String,
    pub stop_recording: String,
    pub power_on: String,
    pub power_off: String,
}

impl Windows {
    pub fn defaults() -> Self {
        Self {
            start_recording: "-30m".to_string(),
            stop_recording: "+30m".to_string(),
            power_on: "12:00".to_string(),
            power_off: "12:00".to_string(),
        }
    }
}

/// Whether `edge` is a valid window edge.
pub fn is_valid_edge(edge: &str) -> bool {
    if edge.is_empty() {
        return true;
    }
    if let Some(offset) = edge.strip_prefix('+').or_else(|| edge.strip_prefix('-')) {
        return duration::parse(offset).is_ok();
    }
    NaiveTime::parse_from_str(edge, "%H:%M").is_ok()
}

impl Section for Windows {
    const KEY: &'static str = "windows";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("start-recording", FieldKind::String),
        FieldSpec::new("stop-recording", FieldKind::String),
        FieldSpec::new("power-on", FieldKind::String),
        FieldSpec::new("power-off", FieldKind::String),
    ];

    fn to_map(&self) -> Table {
        MapWriter::new()
            .string("start-recording", &self.start_recording)
            .string("stop-recording", &self.stop_recording)
            .string("power-on", &self.power_on)
            .string("power-off", &self.power_off)
            .finish()
    }

    fn from_map(map: &Table) -> Result<Self, CodecError> {
        let r = MapReader::new(Self::KEY, map);
        Ok(Self {
            start_recording: r.string("start-recording")?,
            stop_recording: r.string("stop-recording")?,
            power_on: r.string("power-on")?,
            power_off: r.string("power-off")?,
        })
    }

    fn validate(&self) -> Result<(), CodecError> {
        let edges = [
            ("start-recording", &self.start_recording),
            ("stop-recording", &self.stop_recording),
            ("power-on", &self.power_on),
            ("power-off", &self.power_off),
        ];
        for (field, edge) in edges {
            if !is_valid_edge(edge) {
                return Err(CodecError::invalid(
                    Self::KEY,
                    format!("{} '{}' is neither HH:MM nor a +/- offset", field, edge),
                ));
            }
        }
        Ok(())
    }
}
