//! Plain-text rendering of the catalog and session state

use std::fmt::Write;

use volsync_core::domain::device::{Device, DeviceId};
use volsync_core::domain::display::StateObserver;
use volsync_core::domain::state::SessionState;

fn render_device(out: &mut String, device: &Device, depth: usize, selected: Option<DeviceId>) {
    let marker = if Some(device.id()) == selected { "*" } else { " " };
    let kind = if device.is_composite() { " (aggregate)" } else { "" };
    let mute = if device.is_muted() { " muted" } else { "" };

    let _ = writeln!(
        out,
        "{}{} [{}] {}{} {}{}",
        "  ".repeat(depth),
        marker,
        device.id(),
        device.name(),
        kind,
        device.volume(),
        mute
    );

    for child in device.children() {
        render_device(out, child, depth + 1, selected);
    }
}

/// Indented device tree, selected device marked with `*`
pub fn render_catalog(devices: &[Device], selected: Option<DeviceId>) -> String {
    let mut out = String::new();
    for device in devices {
        render_device(&mut out, device, 0, selected);
    }
    out
}

pub fn render_state(state: &SessionState) -> String {
    let mut out = String::new();

    match &state.selected_device {
        Some(device) => {
            let _ = writeln!(
                out,
                "{} [{}]: master {}{}",
                device.name(),
                device.id(),
                state.virtual_volume,
                if state.is_muted { " (muted)" } else { "" }
            );
            for child in device.children() {
                let _ = writeln!(out, "  [{}] {} {}", child.id(), child.name(), child.volume());
            }
        }
        None => {
            let _ = writeln!(out, "No device selected: master {}", state.virtual_volume);
        }
    }

    if let Some(error) = &state.error_message {
        let _ = writeln!(out, "error: {}", error);
    }

    out
}

/// Prints the session after every change
pub struct StatePrinter;

impl StateObserver for StatePrinter {
    fn state_changed(&mut self, state: &SessionState) {
        print!("{}", render_state(state));
    }
}
