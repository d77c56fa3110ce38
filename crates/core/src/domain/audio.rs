//! Audio adapter interface
//!
//! The controller talks to hardware only through [`AudioAdapter`].
//! Implementations over a property backend live in the `infra` crate.

use crate::domain::device::{Device, DeviceId};
use crate::domain::hardware::Result;
use crate::domain::volume::Volume;

/// Discovery and volume writes against the audio hardware
pub trait AudioAdapter: Send {
    /// Enumerate output devices, expanding composites into children
    ///
    /// Fails only when the device list itself cannot be read; missing
    /// per-device properties fall back to defaults.
    fn discover(&self) -> Result<Vec<Device>>;

    /// Best-effort volume write to one device
    fn set_volume(&self, volume: Volume, device: DeviceId) -> Result<()>;
}

impl<A: AudioAdapter + ?Sized> AudioAdapter for Box<A> {
    fn discover(&self) -> Result<Vec<Device>> {
        (**self).discover()
    }

    fn set_volume(&self, volume: Volume, device: DeviceId) -> Result<()> {
        (**self).set_volume(volume, device)
    }
}
