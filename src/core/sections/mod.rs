//! core::sections
//!
//! Built-in configuration sections.
//!
//! Each section is a plain struct with its own [`Section`] codec. Adding a
//! section means adding a module here and one line to
//! [`register_builtin`].
//!
//! [`Section`]: crate::core::codec::Section

pub mod audio;
pub mod battery;
pub mod device;
pub mod gpio;
pub mod lepton;
pub mod location;
pub mod modemd;
pub mod ports;
pub mod secrets;
pub mod test_hosts;
pub mod thermal_motion;
pub mod thermal_recorder;
pub mod thermal_throttler;
pub mod windows;

pub use audio::Audio;
pub use battery::Battery;
pub use device::Device;
pub use gpio::Gpio;
pub use lepton::Lepton;
pub use location::Location;
pub use modemd::{Modem, Modemd};
pub use ports::Ports;
pub use secrets::Secrets;
pub use test_hosts::TestHosts;
pub use thermal_motion::ThermalMotion;
pub use thermal_recorder::ThermalRecorder;
pub use thermal_throttler::ThermalThrottler;
pub use windows::Windows;

use crate::core::registry::{RegistryBuilder, RegistryError};

/// Register every built-in section.
///
/// # Errors
///
/// Fails if any built-in key is already registered in `builder`.
pub fn register_builtin(builder: RegistryBuilder) -> Result<RegistryBuilder, RegistryError> {
    builder
        .register::<Audio>()?
        .register::<Battery>()?
        .register::<Device>()?
        .register::<Gpio>()?
        .register::<Lepton>()?
        .register::<Location>()?
        .register::<Modemd>()?
        .register::<Ports>()?
        .register::<Secrets>()?
        .register::<TestHosts>()?
        .register::<ThermalMotion>()?
        .register::<ThermalRecorder>()?
        .register::<ThermalThrottler>()?
        .register::<Windows>()
}
