//! Pure state-transition function
//!
//! `reduce` encodes the whole synchronization policy: master changes are
//! propagated to the children of a composite selection as a signed delta,
//! each child clamped on its own. It performs no I/O.

use crate::domain::action::Action;
use crate::domain::device::find_device;
use crate::domain::state::SessionState;
use crate::domain::volume::Volume;

/// Compute the state that follows `state` under `action`
pub fn reduce(state: &SessionState, action: &Action) -> SessionState {
    let mut next = state.clone();

    match action {
        Action::RefreshDevices => {}

        Action::DevicesUpdated(devices) => {
            next.available_devices = devices.clone();

            // A disconnected device stays selected until the user picks another
            if let Some(selected) = &state.selected_device {
                if let Some(fresh) = find_device(devices, selected.id()) {
                    next.selected_device = Some(fresh.clone());
                }
            }
        }

        Action::SelectDevice(id) => {
            if let Some(device) = find_device(&state.available_devices, *id) {
                next.virtual_volume = device.volume();
                next.is_muted = device.is_muted();
                next.selected_device = Some(device.clone());
            }
        }

        Action::SetVolume(value) => {
            let target = Volume::new(*value);
            let delta = target.value() - state.virtual_volume.value();

            next.virtual_volume = target;
            next.is_muted = target.is_muted();
            shift_children(&mut next, delta);
        }

        Action::SetSubDeviceVolume(id, value) => {
            if let Some(selected) = &state.selected_device {
                if selected.is_composite() {
                    let target = Volume::new(*value);
                    next.selected_device = Some(selected.map_children(|child| {
                        if child.id() == *id {
                            target
                        } else {
                            child.volume()
                        }
                    }));
                }
            }
        }

        Action::IncreaseVolume => {
            next.virtual_volume = state.virtual_volume.offset(Volume::STEP);
            next.is_muted = false;
            shift_children(&mut next, Volume::STEP);
        }

        // Mute is left as-is on the way down
        Action::DecreaseVolume => {
            next.virtual_volume = state.virtual_volume.offset(-Volume::STEP);
            shift_children(&mut next, -Volume::STEP);
        }

        Action::ToggleMute => {
            next.is_muted = !state.is_muted;
        }

        Action::SetError(message) => {
            next.error_message = message.clone();
        }
    }

    next
}

/// Apply a signed offset to every child of a composite selection
fn shift_children(state: &mut SessionState, delta: f32) {
    if let Some(selected) = &state.selected_device {
        if selected.is_composite() {
            state.selected_device = Some(selected.map_children(|child| child.volume().offset(delta)));
        }
    }
}
