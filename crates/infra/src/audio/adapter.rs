//! Hardware abstraction adapter
//!
//! Translates between the property-addressed hardware model and the
//! `Device`/`Volume` domain types. Reads fall back to defaults when a
//! property is missing; writes try the master element first and then the
//! stereo channel elements.

use tracing::{debug, info, instrument, warn};
use volsync_core::domain::audio::AudioAdapter;
use volsync_core::domain::device::{Device, DeviceId};
use volsync_core::domain::hardware::{
    properties, Element, HardwareError, Property, PropertyAccess, PropertyBackend, Result,
    SYSTEM_OBJECT,
};
use volsync_core::domain::volume::Volume;

const UNKNOWN_DEVICE_NAME: &str = "Unknown Device";

/// Largest read-back difference accepted by write verification
const VERIFY_TOLERANCE: f32 = 1e-3;

/// Channel elements tried when a device has no settable master element
const STEREO_ELEMENTS: [Element; 2] = [Element::LEFT, Element::RIGHT];

/// [`AudioAdapter`] over any [`PropertyBackend`]
pub struct HalAdapter<B> {
    backend: B,
    verify_writes: bool,
}

impl<B: PropertyBackend> HalAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            verify_writes: false,
        }
    }

    /// Read every write back and log mismatches
    pub fn with_verification(mut self, enabled: bool) -> Self {
        self.verify_writes = enabled;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn has_output(&self, id: DeviceId) -> bool {
        matches!(self.backend.read(id, &properties::OUTPUT_STREAMS), Ok(n) if n > 0)
    }

    fn device_name(&self, id: DeviceId) -> String {
        self.backend
            .read(id, &properties::NAME)
            .unwrap_or_else(|_| UNKNOWN_DEVICE_NAME.to_string())
    }

    /// Master element, then channel 1, then a neutral default
    fn device_volume(&self, id: DeviceId) -> Volume {
        let master = properties::VOLUME;
        let left = master.on_element(Element::LEFT);

        self.backend
            .read(id, &master)
            .or_else(|_| self.backend.read(id, &left))
            .map(Volume::new)
            .unwrap_or(Volume::NEUTRAL)
    }

    fn device_muted(&self, id: DeviceId) -> bool {
        self.backend.read(id, &properties::MUTE).unwrap_or(false)
    }

    /// Aggregate iff the device exposes a sub-device list at all
    fn is_composite(&self, id: DeviceId) -> bool {
        self.backend
            .has_property(id, properties::ACTIVE_SUB_DEVICES.address())
    }

    /// Build a snapshot of `id`, recursing into sub-devices
    ///
    /// `path` holds the ids being resolved above this one; an aggregate that
    /// lists an ancestor is not expanded again.
    fn resolve(&self, id: DeviceId, path: &mut Vec<DeviceId>) -> Device {
        let name = self.device_name(id);
        let volume = self.device_volume(id);
        let muted = self.device_muted(id);

        if !self.is_composite(id) {
            return Device::simple(id, name, volume, muted);
        }

        if path.contains(&id) {
            warn!(device = %id, "Aggregate device lists itself, not expanding");
            return Device::composite(id, name, volume, muted, Vec::new());
        }

        let members = self
            .backend
            .read(id, &properties::ACTIVE_SUB_DEVICES)
            .unwrap_or_else(|e| {
                debug!(device = %id, error = %e, "Sub-device list unreadable");
                Vec::new()
            });

        path.push(id);
        let children = members
            .into_iter()
            .map(|member| self.resolve(member, path))
            .collect();
        path.pop();

        Device::composite(id, name, volume, muted, children)
    }

    /// Write one element and optionally read it back
    fn write_element(&self, id: DeviceId, property: &Property<f32>, volume: Volume) -> Result<()> {
        self.backend.write(id, property, volume.value())?;

        if self.verify_writes {
            match self.backend.read(id, property) {
                Ok(actual) if (actual - volume.value()).abs() > VERIFY_TOLERANCE => warn!(
                    device = %id,
                    element = property.address().element.0,
                    expected = volume.value(),
                    actual,
                    "Volume write did not take effect"
                ),
                Ok(_) => {}
                Err(e) => debug!(device = %id, error = %e, "Write verification read failed"),
            }
        }

        Ok(())
    }
}

impl<B: PropertyBackend> AudioAdapter for HalAdapter<B> {
    #[instrument(skip(self))]
    fn discover(&self) -> Result<Vec<Device>> {
        let ids = self.backend.read(SYSTEM_OBJECT, &properties::DEVICES)?;

        let mut path = Vec::new();
        let devices: Vec<Device> = ids
            .into_iter()
            .filter(|id| self.has_output(*id))
            .map(|id| self.resolve(id, &mut path))
            .collect();

        for device in &devices {
            debug!(
                device = %device.id(),
                name = device.name(),
                composite = device.is_composite(),
                children = device.children().len(),
                "Found output device"
            );
        }
        info!("Found {} output devices", devices.len());

        Ok(devices)
    }

    #[instrument(skip(self, volume), fields(volume = volume.value()))]
    fn set_volume(&self, volume: Volume, device: DeviceId) -> Result<()> {
        let master = properties::VOLUME;
        if self.backend.can_write(device, &master) {
            return self.write_element(device, &master, volume);
        }

        // Stereo fallback: each channel independently, first failure reported
        let mut outcome = Ok(());
        let mut attempted = false;

        for element in STEREO_ELEMENTS {
            let channel = master.on_element(element);
            if !self.backend.can_write(device, &channel) {
                continue;
            }
            attempted = true;

            if let Err(e) = self.write_element(device, &channel, volume) {
                warn!(device = %device, element = element.0, error = %e, "Channel write failed");
                if outcome.is_ok() {
                    outcome = Err(e);
                }
            }
        }

        if !attempted {
            return Err(HardwareError::NotSettable {
                object: device,
                address: *master.address(),
            });
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::memory_backend::MemoryBackend;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use volsync_core::domain::config::{SimulatedConfig, SimulatedDevice};
    use volsync_core::domain::hardware::{PropertyAddress, PropertyData, Selector};

    fn adapter(devices: Vec<SimulatedDevice>) -> HalAdapter<MemoryBackend> {
        HalAdapter::new(MemoryBackend::from_config(&SimulatedConfig { devices }))
    }

    fn written(adapter: &HalAdapter<MemoryBackend>) -> Vec<(u32, u32, f32)> {
        adapter
            .backend()
            .take_writes()
            .iter()
            .filter_map(|w| w.volume().map(|v| (w.object.raw(), w.address.element.0, v)))
            .collect()
    }

    #[test]
    fn test_discovery_filters_and_classifies() {
        let adapter = adapter(vec![
            SimulatedDevice::new(10, "Speakers").with_volume(0.3).muted(),
            SimulatedDevice::new(11, "Microphone").with_volume(0.8).input_only(),
            SimulatedDevice::new(12, "Headphones").with_channels(vec![0.6, 0.1]),
            SimulatedDevice::new(13, "Aggregate").with_sub_devices(vec![10, 12]),
        ]);

        let devices = adapter.discover().unwrap();
        let ids: Vec<u32> = devices.iter().map(|d| d.id().raw()).collect();
        assert_eq!(ids, vec![10, 12, 13]);

        assert!(devices[0].is_muted());
        assert_eq!(devices[0].volume().value(), 0.3);
        assert!(!devices[0].is_composite());

        // Channel 1 fallback
        assert_eq!(devices[1].volume().value(), 0.6);

        let aggregate = &devices[2];
        assert!(aggregate.is_composite());
        assert_eq!(aggregate.volume(), Volume::NEUTRAL);
        let children: Vec<&str> = aggregate.children().iter().map(|c| c.name()).collect();
        assert_eq!(children, vec!["Speakers", "Headphones"]);
    }

    #[test]
    fn test_missing_properties_fall_back_to_defaults() {
        let adapter = adapter(vec![SimulatedDevice::new(10, "Nameless").bare()]);

        let devices = adapter.discover().unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name(), "Unknown Device");
        assert_eq!(devices[0].volume(), Volume::NEUTRAL);
        assert!(!devices[0].is_muted());
        assert!(!devices[0].is_composite());
    }

    #[test]
    fn test_sub_devices_resolved_even_without_output() {
        let adapter = adapter(vec![
            SimulatedDevice::new(10, "Hidden").with_volume(0.2).input_only(),
            SimulatedDevice::new(11, "Aggregate").with_sub_devices(vec![10]),
        ]);

        let devices = adapter.discover().unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].children()[0].name(), "Hidden");
    }

    #[test]
    fn test_self_referencing_aggregate_terminates() {
        let adapter = adapter(vec![
            SimulatedDevice::new(10, "Loop A").with_sub_devices(vec![11]),
            SimulatedDevice::new(11, "Loop B").with_sub_devices(vec![10]),
        ]);

        let devices = adapter.discover().unwrap();
        assert_eq!(devices.len(), 2);
        let nested = &devices[0].children()[0].children()[0];
        assert_eq!(nested.id().raw(), 10);
        assert!(nested.is_composite());
        assert!(nested.children().is_empty());
    }

    #[test]
    fn test_discovery_error_propagates() {
        let adapter = adapter(vec![SimulatedDevice::new(10, "Speakers")]);
        adapter.backend().fail_enumeration(Some(-1));
        assert_eq!(adapter.discover(), Err(HardwareError::Status { code: -1 }));
    }

    #[test]
    fn test_write_prefers_master_element() {
        let adapter = adapter(vec![SimulatedDevice::new(10, "Speakers")
            .with_volume(0.3)
            .with_channels(vec![0.3, 0.3])]);

        adapter.set_volume(Volume::new(0.8), DeviceId::new(10)).unwrap();
        assert_eq!(written(&adapter), vec![(10, 0, 0.8)]);
    }

    #[test]
    fn test_write_falls_back_to_stereo_channels() {
        let adapter = adapter(vec![
            SimulatedDevice::new(10, "Headphones").with_channels(vec![0.1, 0.1]),
            SimulatedDevice::new(11, "Mono Speaker").with_channels(vec![0.1]),
        ]);

        adapter.set_volume(Volume::new(0.5), DeviceId::new(10)).unwrap();
        assert_eq!(written(&adapter), vec![(10, 1, 0.5), (10, 2, 0.5)]);

        // Missing right channel is skipped, not an error
        adapter.set_volume(Volume::new(0.25), DeviceId::new(11)).unwrap();
        assert_eq!(written(&adapter), vec![(11, 1, 0.25)]);
    }

    #[test]
    fn test_unsettable_device_reports_error() {
        let adapter = adapter(vec![SimulatedDevice::new(10, "HDMI").with_volume(0.7).read_only()]);

        let err = adapter
            .set_volume(Volume::new(0.2), DeviceId::new(10))
            .unwrap_err();
        assert!(matches!(err, HardwareError::NotSettable { .. }));
        assert!(written(&adapter).is_empty());
    }

    #[test]
    fn test_failed_write_surfaces_status() {
        let adapter = adapter(vec![SimulatedDevice::new(10, "Speakers")
            .with_volume(0.3)
            .failing(-10863)]);

        assert_eq!(
            adapter.set_volume(Volume::new(0.4), DeviceId::new(10)),
            Err(HardwareError::Status { code: -10863 })
        );
    }

    /// Backend whose volume writes are accepted but never stored
    #[derive(Default)]
    struct DeafBackend {
        inner: MemoryBackend,
        wrote: AtomicBool,
        reads_after_write: AtomicUsize,
    }

    impl PropertyBackend for DeafBackend {
        fn has_property(&self, object: DeviceId, address: &PropertyAddress) -> bool {
            self.inner.has_property(object, address)
        }

        fn is_settable(&self, object: DeviceId, address: &PropertyAddress) -> Result<bool> {
            self.inner.is_settable(object, address)
        }

        fn get(&self, object: DeviceId, address: &PropertyAddress) -> Result<PropertyData> {
            if self.wrote.load(Ordering::SeqCst) && address.selector == Selector::VolumeScalar {
                self.reads_after_write.fetch_add(1, Ordering::SeqCst);
            }
            self.inner.get(object, address)
        }

        fn set(&self, _object: DeviceId, _address: &PropertyAddress, _data: PropertyData) -> Result<()> {
            self.wrote.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn deaf_speakers() -> DeafBackend {
        let backend = DeafBackend::default();
        backend
            .inner
            .add_device(SimulatedDevice::new(10, "Speakers").with_volume(0.3));
        backend
    }

    #[test]
    fn test_verification_reads_back_without_failing() {
        let adapter = HalAdapter::new(deaf_speakers()).with_verification(true);

        // Read-back sees the stale level; the mismatch is logged only
        assert!(adapter.set_volume(Volume::new(0.9), DeviceId::new(10)).is_ok());
        assert_eq!(adapter.backend().reads_after_write.load(Ordering::SeqCst), 1);
        assert_eq!(
            adapter.backend().inner.volume(DeviceId::new(10), Element::MAIN),
            Some(0.3)
        );
    }

    #[test]
    fn test_no_read_back_without_verification() {
        let adapter = HalAdapter::new(deaf_speakers());

        assert!(adapter.set_volume(Volume::new(0.9), DeviceId::new(10)).is_ok());
        assert_eq!(adapter.backend().reads_after_write.load(Ordering::SeqCst), 0);
    }
}
