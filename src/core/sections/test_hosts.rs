//! core::sections::test_hosts

use std::time::Duration;
use toml::Table;

use crate::core::codec::{CodecError, FieldKind, FieldSpec, MapReader, MapWriter, Section};

/// Hosts pinged to check connectivity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestHosts {
    pub urls: Vec<String>,
    pub ping_wait_time: Duration,
    pub ping_retries: i32,
}

impl TestHosts {
    pub fn defaults() -> Self {
        Self {
            urls: vec!["8.8.8.8".to_string(), "8.8.4.4".to_string()],
            ping_wait_time: Duration::from_secs(30),
            ping_retries: 5,
        }
    }
}

impl Section for TestHosts {
    const KEY: &'static str = "test-hosts";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("urls", FieldKind::StringList),
        FieldSpec::new("ping-wait-time", FieldKind::Duration),
        FieldSpec::new("ping-retries", FieldKind::Int),
    ];

    fn to_map(&self) -> Table {
        MapWriter::new()
            .string_list("urls", &self.urls)
            .duration("ping-wait-time", self.ping_wait_time)
            .int("ping-retries", self.ping_retries)
            .finish()
    }

    fn from_map(map: &Table) -> Result<Self, CodecError> {
        let r = MapReader::new(Self::KEY, map);
        Ok(Self {
            urls: r.string_list("urls")?,
            ping_wait_time: r.duration("ping-wait-time")?,
            ping_retries: r.int("ping-retries")?,
        })
    }
}
