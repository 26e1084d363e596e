//! core::sections::thermal_recorder

use toml::Table;

use crate::core::codec::{
    check_uint, CodecError, FieldKind, FieldSpec, MapReader, MapWriter, Section,
};

/// Recording limits for thermal video clips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThermalRecorder {
    pub output_dir: String,
    pub min_disk_space_mb: u64,
    pub min_secs: i32,
    pub max_secs: i32,
    pub preview_secs: i32,
}

impl ThermalRecorder {
    pub fn defaults() -> Self {
        Self {
            output_dir: "/var/spool/cptv".to_string(),
            min_disk_space_mb: 200,
            min_secs: 10,
            max_secs: 600,
            preview_secs: 5,
        }
    }
}

impl Section for ThermalRecorder {
    const KEY: &'static str = "thermal-recorder";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("output-dir", FieldKind::String),
        FieldSpec::new("min-disk-space-mb", FieldKind::UInt),
        FieldSpec::new("min-secs", FieldKind::Int),
        FieldSpec::new("max-secs", FieldKind::Int),
        FieldSpec::new("preview-secs", FieldKind::Int),
    ];

    fn to_map(&self) -> Table {
        MapWriter::new()
            .string("output-dir", &self.output_dir)
            .uint64("min-disk-space-mb", self.min_disk_space_mb)
            .int("min-secs", self.min_secs)
            .int("max-secs", self.max_secs)
            .int("preview-secs", self.preview_secs)
            .finish()
    }

    fn from_map(map: &Table) -> Result<Self, CodecError> {
        let r = MapReader::new(Self::KEY, map);
        Ok(Self {
            output_dir: r.string("output-dir")?,
            min_disk_space_mb: r.int("min-disk-space-mb")?,
            min_secs: r.int("min-secs")?,
            max_secs: r.int("max-secs")?,
            preview_secs: r.int("preview-secs")?,
        })
    }

    fn validate(&self) -> Result<(), CodecError> {
        check_uint(Self::KEY, "min-disk-space-mb", self.min_disk_space_mb)?;
        if self.min_secs != 0 && self.max_secs != 0 && self.min_secs > self.max_secs {
            return Err(CodecError::invalid(
                Self::KEY,
                format!(
                    "min-secs ({}) is above max-secs ({})",
                    self.min_secs, self.max_secs
                ),
            ));
        }
        Ok(())
    }
}
