//! core::sections::audio
//!
//! Audio playback settings used by the audio bait service.

use toml::Table;

use crate::core::codec::{CodecError, FieldKind, FieldSpec, MapReader, MapWriter, Section};

/// Audio playback configuration.
///
/// ```toml
/// [audio]
/// directory = "/var/lib/audiobait"
/// card = 0
/// volume-control = "PCM"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Audio {
    /// Directory holding the audio files.
    pub directory: String,
    /// ALSA card number.
    pub card: i32,
    /// Mixer control used to set the volume.
    pub volume_control: String,
}

impl Audio {
    pub fn defaults() -> Self {
        Self {
            directory: "/var/lib/audiobait".to_string(),
            card: 0,
            volume_control: "PCM".to_string(),
        }
    }
}

impl Section for Audio {
    const KEY: &'static str = "audio";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("directory", FieldKind::String),
        FieldSpec::new("card", FieldKind::Int),
        FieldSpec::new("volume-control", FieldKind::String),
    ];

    fn to_map(&self) -> Table {
        MapWriter::new()
            .string("directory", &self.directory)
            .int("card", self.card)
            .string("volume-control", &self.volume_control)
            .finish()
    }

    fn from_map(map: &Table) -> Result<Self, CodecError> {
        let r = MapReader::new(Self::KEY, map);
        Ok(Self {
            directory: r.string("directory")?,
            card: r.int("card")?,
            volume_control: r.string("volume-control")?,
        })
    }
}
