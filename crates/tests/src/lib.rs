//! Shared fixtures for the volsync integration tests

use volsync_core::domain::config::{SimulatedConfig, SimulatedDevice};
use volsync_core::domain::device::DeviceId;
use volsync_infra::audio::{HalAdapter, MemoryBackend};

pub const SPEAKERS: DeviceId = DeviceId::new(40);
pub const HEADPHONES: DeviceId = DeviceId::new(41);
pub const HDMI: DeviceId = DeviceId::new(42);
pub const AGGREGATE: DeviceId = DeviceId::new(50);

/// Heterogeneous rig: a master-element device, a channel-only device, a
/// read-only device and an aggregate over all three
pub fn studio_rig() -> SimulatedConfig {
    SimulatedConfig {
        devices: vec![
            SimulatedDevice::new(SPEAKERS.raw(), "Speakers").with_volume(0.95),
            SimulatedDevice::new(HEADPHONES.raw(), "Headphones").with_channels(vec![0.2, 0.2]),
            SimulatedDevice::new(HDMI.raw(), "HDMI Display")
                .with_volume(0.6)
                .read_only(),
            SimulatedDevice::new(AGGREGATE.raw(), "Studio Aggregate").with_sub_devices(vec![
                SPEAKERS.raw(),
                HEADPHONES.raw(),
                HDMI.raw(),
            ]),
        ],
    }
}

pub fn rig_adapter() -> HalAdapter<MemoryBackend> {
    HalAdapter::new(MemoryBackend::from_config(&studio_rig()))
}
