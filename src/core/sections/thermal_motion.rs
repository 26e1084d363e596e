//! core::sections::thermal_motion
//!
//! Motion detection thresholds for the thermal camera. Sensible defaults
//! depend on the camera model, since the Lepton 3.5 reports radiometric
//! values in centi-kelvin.

use toml::Table;

use crate::core::codec::{CodecError, FieldKind, FieldSpec, MapReader, MapWriter, Section};

/// Camera model string reported by a Lepton 3.5.
pub const LEPTON_35_MODEL: &str = "lepton3.5";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThermalMotion {
    pub dynamic_threshold: bool,
    pub temp_thresh_min: u16,
    pub temp_thresh_max: u16,
    pub temp_thresh: u16,
    pub delta_thresh: u16,
    pub count_thresh: i32,
    pub frame_compare_gap: i32,
    pub use_one_diff_only: bool,
    pub trigger_frames: i32,
    pub warmer_only: bool,
    pub edge_pixels: i32,
    pub verbose: bool,
}

impl ThermalMotion {
    /// Defaults for the given camera model.
    pub fn defaults_for(camera_model: &str) -> Self {
        if camera_model == LEPTON_35_MODEL {
            Self {
                temp_thresh: 28000,
                delta_thresh: 200,
                ..Self::common_defaults()
            }
        } else {
            Self {
                temp_thresh: 2900,
                delta_thresh: 50,
                ..Self::common_defaults()
            }
        }
    }

    fn common_defaults() -> Self {
        Self {
            dynamic_threshold: true,
            count_thresh: 3,
            frame_compare_gap: 45,
            use_one_diff_only: true,
            trigger_frames: 2,
            warmer_only: true,
            edge_pixels: 1,
            verbose: false,
            ..Default::default()
        }
    }
}

impl Section for ThermalMotion {
    const KEY: &'static str = "thermal-motion";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("dynamic-threshold", FieldKind::Bool),
        FieldSpec::new("temp-thresh-min", FieldKind::UInt),
        FieldSpec::new("temp-thresh-max", FieldKind::UInt),
        FieldSpec::new("temp-thresh", FieldKind::UInt),
        FieldSpec::new("delta-thresh", FieldKind::UInt),
        FieldSpec::new("count-thresh", FieldKind::Int),
        FieldSpec::new("frame-compare-gap", FieldKind::Int),
        FieldSpec::new("use-one-diff-only", FieldKind::Bool),
        FieldSpec::new("trigger-frames", FieldKind::Int),
        FieldSpec::new("warmer-only", FieldKind::Bool),
        FieldSpec::new("edge-pixels", FieldKind::Int),
        FieldSpec::new("verbose", FieldKind::Bool),
    ];

    fn to_map(&self) -> Table {
        MapWriter::new()
            .bool("dynamic-threshold", self.dynamic_threshold)
            .int("temp-thresh-min", self.temp_thresh_min)
            .int("temp-thresh-max", self.temp_thresh_max)
            .int("temp-thresh", self.temp_thresh)
            .int("delta-thresh", self.delta_thresh)
            .int("count-thresh", self.count_thresh)
            .int("frame-compare-gap", self.frame_compare_gap)
            .bool("use-one-diff-only", self.use_one_diff_only)
            .int("trigger-frames", self.trigger_frames)
            .bool("warmer-only", self.warmer_only)
            .int("edge-pixels", self.edge_pixels)
            .bool("verbose", self.verbose)
            .finish()
    }

    fn from_map(map: &Table) -> Result<Self, CodecError> {
        let r = MapReader::new(Self::KEY, map);
        Ok(Self {
            dynamic_threshold: r.bool("dynamic-threshold")?,
            temp_thresh_min: r.int("temp-thresh-min")?,
            temp_thresh_max: r.int("temp-thresh-max")?,
            temp_thresh: r.int("temp-thresh")?,
            delta_thresh: r.int("delta-thresh")?,
            count_thresh: r.int("count-thresh")?,
            frame_compare_gap: r.int("frame-compare-gap")?,
            use_one_diff_only: r.bool("use-one-diff-only")?,
            trigger_frames: r.int("trigger-frames")?,
            warmer_only: r.bool("warmer-only")?,
            edge_pixels: r.int("edge-pixels")?,
            verbose: r.bool("verbose")?,
        })
    }

    fn validate(&self) -> Result<(), CodecError> {
        if self.temp_thresh_min != 0
            && self.temp_thresh_max != 0
            && self.temp_thresh_min > self.temp_thresh_max
        {
            return Err(CodecError::invalid(
                Self::KEY,
                format!(
                    "temp-thresh-min ({}) is above temp-thresh-max ({})",
                    self.temp_thresh_min, self.temp_thresh_max
                ),
            ));
        }
        Ok(())
    }
}
