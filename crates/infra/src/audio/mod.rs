//! Hardware property backends and the adapter on top of them
//!
//! - `MemoryBackend`: simulated hardware, available everywhere
//! - `CoreAudioBackend`: the macOS HAL

pub mod adapter;
pub mod memory_backend;

#[cfg(target_os = "macos")]
pub mod coreaudio_backend;

pub use adapter::HalAdapter;
pub use memory_backend::{MemoryBackend, WriteRecord};

#[cfg(target_os = "macos")]
pub use coreaudio_backend::CoreAudioBackend;

use tracing::info;
use volsync_core::domain::audio::AudioAdapter;
use volsync_core::domain::config::{BackendKind, HardwareConfig, SimulatedConfig};
use volsync_core::domain::hardware::Result;

/// Build the adapter selected by the configuration
pub fn create_adapter(
    hardware: &HardwareConfig,
    simulated: &SimulatedConfig,
) -> Result<Box<dyn AudioAdapter>> {
    info!(backend = ?hardware.backend, verify = hardware.verify_writes, "Creating audio adapter");

    match hardware.backend {
        BackendKind::Simulated => Ok(Box::new(
            HalAdapter::new(MemoryBackend::from_config(simulated))
                .with_verification(hardware.verify_writes),
        )),
        BackendKind::CoreAudio => coreaudio_adapter(hardware),
    }
}

#[cfg(target_os = "macos")]
fn coreaudio_adapter(hardware: &HardwareConfig) -> Result<Box<dyn AudioAdapter>> {
    Ok(Box::new(
        HalAdapter::new(CoreAudioBackend::new()).with_verification(hardware.verify_writes),
    ))
}

#[cfg(not(target_os = "macos"))]
fn coreaudio_adapter(_hardware: &HardwareConfig) -> Result<Box<dyn AudioAdapter>> {
    Err(volsync_core::domain::hardware::HardwareError::Unavailable(
        "CoreAudio backend is only available on macOS".to_string(),
    ))
}
