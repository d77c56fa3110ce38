//! Side effects attached to actions

use crate::domain::action::Action;
use crate::domain::device::DeviceId;
use crate::domain::volume::Volume;

/// Hardware work the controller performs after reducing an action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    None,
    /// Enumerate devices and feed the catalog back as `DevicesUpdated`
    Discover,
    /// Push the master (or per-child) levels of the new state to hardware
    SyncMaster { notify: bool },
    /// Single write to one sub-device
    WriteSubDevice { id: DeviceId, volume: Volume },
}

impl Effect {
    pub fn for_action(action: &Action) -> Self {
        match action {
            Action::RefreshDevices => Effect::Discover,
            Action::DevicesUpdated(_) => Effect::None,
            Action::SelectDevice(_) => Effect::None,
            Action::SetVolume(_) => Effect::SyncMaster { notify: false },
            Action::IncreaseVolume | Action::DecreaseVolume | Action::ToggleMute => {
                Effect::SyncMaster { notify: true }
            }
            Action::SetSubDeviceVolume(id, value) => Effect::WriteSubDevice {
                id: *id,
                volume: Volume::new(*value),
            },
            Action::SetError(_) => Effect::None,
        }
    }
}
