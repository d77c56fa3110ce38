//! Example walking the reducer through a composite device session
//!
//! Run with: cargo run --package volsync-core --example reducer_demo

use volsync_core::domain::*;

fn print_state(label: &str, state: &SessionState) {
    println!(
        "{} -> master {} (muted: {})",
        label, state.virtual_volume, state.is_muted
    );
    if let Some(device) = &state.selected_device {
        for child in device.children() {
            println!("     {:<12} {}", child.name(), child.volume());
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("volsync_core=debug,info")
        .init();

    println!("=== Volsync Reducer Demo ===\n");

    let aggregate = Device::composite(
        DeviceId::new(50),
        "Living Room",
        Volume::new(0.5),
        false,
        vec![
            Device::simple(DeviceId::new(51), "Soundbar", Volume::new(0.95), false),
            Device::simple(DeviceId::new(52), "Subwoofer", Volume::new(0.2), false),
        ],
    );

    let mut state = SessionState::default();
    let actions = [
        ("devices updated", Action::DevicesUpdated(vec![aggregate])),
        ("select", Action::SelectDevice(DeviceId::new(50))),
        ("set 0.6", Action::SetVolume(0.6)),
        ("increase", Action::IncreaseVolume),
        ("sub 52 = 0.1", Action::SetSubDeviceVolume(DeviceId::new(52), 0.1)),
        ("toggle mute", Action::ToggleMute),
        ("decrease", Action::DecreaseVolume),
    ];

    for (label, action) in actions.iter() {
        state = reduce(&state, action);
        print_state(label, &state);
    }

    println!("\n=== Demo Complete ===");
}
