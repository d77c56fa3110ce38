//! Session state owned by the controller

use crate::domain::device::Device;
use crate::domain::volume::Volume;

/// Aggregate state of one volsync session
///
/// Only the reducer produces new values of this type; observers get a
/// shared reference between dispatch cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Catalog from the most recent discovery pass
    pub available_devices: Vec<Device>,

    /// Working copy of the selected device; may diverge from the catalog
    /// until the next refresh
    pub selected_device: Option<Device>,

    /// Virtual master volume
    pub virtual_volume: Volume,

    /// Virtual master mute
    pub is_muted: bool,

    pub error_message: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            available_devices: Vec::new(),
            selected_device: None,
            virtual_volume: Volume::NEUTRAL,
            is_muted: false,
            error_message: None,
        }
    }
}

impl SessionState {
    /// Level the hardware should see for the master control
    pub fn effective_volume(&self) -> Volume {
        if self.is_muted {
            Volume::SILENT
        } else {
            self.virtual_volume
        }
    }
}
