//! core::sections::modemd
//!
//! Modem management daemon timings and the list of known modems.

use std::time::Duration;
use toml::Table;

use crate::core::codec::{CodecError, FieldKind, FieldSpec, MapReader, MapWriter, Section};

/// A USB modem the daemon knows how to bring up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modem {
    pub name: String,
    pub net_dev: String,
    /// `vendor:product` USB identifier, e.g. `12d1:14db`.
    pub vendor_product_id: String,
}

impl Modem {
    fn to_map(&self) -> Table {
        MapWriter::new()
            .string("name", &self.name)
            .string("net-dev", &self.net_dev)
            .string("vendor-product-id", &self.vendor_product_id)
            .finish()
    }

    fn from_reader(r: MapReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            name: r.string("name")?,
            net_dev: r.string("net-dev")?,
            vendor_product_id: r.string("vendor-product-id")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modemd {
    pub test_interval: Duration,
    pub initial_on_duration: Duration,
    pub find_modem_timeout: Duration,
    pub connection_timeout: Duration,
    pub request_on_duration: Duration,
    pub min_time_from_failed_connection: Duration,
    pub min_connection_duration: Duration,
    pub max_off_duration: Duration,
    pub modems: Vec<Modem>,
}

impl Modemd {
    pub fn defaults() -> Self {
        const MINUTE: u64 = 60;
        const HOUR: u64 = 60 * MINUTE;
        Self {
            test_interval: Duration::from_secs(5 * MINUTE),
            initial_on_duration: Duration::from_secs(24 * HOUR),
            find_modem_timeout: Duration::from_secs(2 * MINUTE),
            connection_timeout: Duration::from_secs(MINUTE),
            request_on_duration: Duration::from_secs(24 * HOUR),
            min_time_from_failed_connection: Duration::from_secs(20 * MINUTE),
            min_connection_duration: Duration::from_secs(MINUTE),
            max_off_duration: Duration::from_secs(24 * HOUR),
            modems: vec![
                Modem {
                    name: "Huawei 4G modem".to_string(),
                    net_dev: "eth1".to_string(),
                    vendor_product_id: "12d1:14db".to_string(),
                },
                Modem {
                    name: "Spark 3G modem".to_string(),
                    net_dev: "usb0".to_string(),
                    vendor_product_id: "19d2:1405".to_string(),
                },
            ],
        }
    }
}

impl Section for Modemd {
    const KEY: &'static str = "modemd";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("test-interval", FieldKind::Duration),
        FieldSpec::new("initial-on-duration", FieldKind::Duration),
        FieldSpec::new("find-modem-timeout", FieldKind::Duration),
        FieldSpec::new("connection-timeout", FieldKind::Duration),
        FieldSpec::new("request-on-duration", FieldKind::Duration),
        FieldSpec::new("min-time-from-failed-connection", FieldKind::Duration),
        FieldSpec::new("min-connection-duration", FieldKind::Duration),
        FieldSpec::new("max-off-duration", FieldKind::Duration),
        FieldSpec::new("modems", FieldKind::TableList),
    ];

    fn to_map(&self) -> Table {
        MapWriter::new()
            .duration("test-interval", self.test_interval)
            .duration("initial-on-duration", self.initial_on_duration)
            .duration("find-modem-timeout", self.find_modem_timeout)
            .duration("connection-timeout", self.connection_timeout)
            .duration("request-on-duration", self.request_on_duration)
            .duration(
                "min-time-from-failed-connection",
                self.min_time_from_failed_connection,
            )
            .duration("min-connection-duration", self.min_connection_duration)
            .duration("max-off-duration", self.max_off_duration)
            .table_list("modems", self.modems.iter().map(Modem::to_map).collect())
            .finish()
    }

    fn from_map(map: &Table) -> Result<Self, CodecError> {
        let r = MapReader::new(Self::KEY, map);
        Ok(Self {
            test_interval: r.duration("test-interval")?,
            initial_on_duration: r.duration("initial-on-duration")?,
            find_modem_timeout: r.duration("find-modem-timeout")?,
            connection_timeout: r.duration("connection-timeout")?,
            request_on_duration: r.duration("request-on-duration")?,
            min_time_from_failed_connection: r.duration("min-time-from-failed-connection")?,
            min_connection_duration: r.duration("min-connection-duration")?,
            max_off_duration: r.duration("max-off-duration")?,
            modems: r.table_list("modems", Modem::from_reader)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_duration_text_and_modem_list() {
        let map: Table = toml::from_str(
            r#"
            test-interval = "10m4s"

            [[modems]]
            name = "modem name"
            "#,
        )
        .unwrap();

        let modemd = Modemd::from_map(&map).unwrap();
        assert_eq!(
            modemd,
            Modemd {
                test_interval: Duration::from_secs(10 * 60 + 4),
                modems: vec![Modem {
                    name: "modem name".into(),
                    ..Default::default()
                }],
                ..Default::default()
            }
        );
    }

    #[test]
    fn defaults_round_trip() {
        let defaults = Modemd::defaults();
        assert_eq!(Modemd::from_map(&defaults.to_map()).unwrap(), defaults);
        assert_eq!(
            defaults.to_map().get("test-interval"),
            Some(&toml::Value::String("5m0s".into()))
        );
    }

    #[test]
    fn modem_entry_must_be_table() {
        let map: Table = toml::from_str("modems = ['not a table']").unwrap();
        assert!(Modemd::from_map(&map).is_err());
    }
}
