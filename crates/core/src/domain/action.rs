//! Actions accepted by the synchronization controller

use crate::domain::device::{Device, DeviceId};

/// Every state change goes through one of these
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Re-run hardware discovery
    RefreshDevices,
    /// Fresh catalog from a discovery pass
    DevicesUpdated(Vec<Device>),
    SelectDevice(DeviceId),
    /// Set the virtual master volume; raw value, clamped by the reducer
    SetVolume(f32),
    /// Set one child of the selected composite device
    SetSubDeviceVolume(DeviceId, f32),
    IncreaseVolume,
    DecreaseVolume,
    ToggleMute,
    SetError(Option<String>),
}

impl Action {
    /// Short name for logging, without the payload
    pub fn name(&self) -> &'static str {
        match self {
            Action::RefreshDevices => "refresh_devices",
            Action::DevicesUpdated(_) => "devices_updated",
            Action::SelectDevice(_) => "select_device",
            Action::SetVolume(_) => "set_volume",
            Action::SetSubDeviceVolume(_, _) => "set_sub_device_volume",
            Action::IncreaseVolume => "increase_volume",
            Action::DecreaseVolume => "decrease_volume",
            Action::ToggleMute => "toggle_mute",
            Action::SetError(_) => "set_error",
        }
    }
}
