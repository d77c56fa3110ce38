//! In-process property backend
//!
//! Models the heterogeneous hardware the adapter has to cope with: devices
//! with a master volume element, devices with only per-channel elements,
//! read-only devices, aggregates and devices whose writes fail. Used for the
//! simulated backend and throughout the tests.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace, warn};
use volsync_core::domain::config::{SimulatedConfig, SimulatedDevice};
use volsync_core::domain::device::DeviceId;
use volsync_core::domain::hardware::{
    Element, HardwareError, PropertyAddress, PropertyBackend, PropertyData, Result, Scope,
    Selector, SYSTEM_OBJECT,
};

/// One successful volume or mute write
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRecord {
    pub object: DeviceId,
    pub address: PropertyAddress,
    pub data: PropertyData,
}

impl WriteRecord {
    /// Written scalar, if this was a volume write
    pub fn volume(&self) -> Option<f32> {
        match (self.address.selector, &self.data) {
            (Selector::VolumeScalar, PropertyData::Float(v)) => Some(*v),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    devices: BTreeMap<u32, SimulatedDevice>,
    /// Discovery order, as the platform would report it
    order: Vec<u32>,
    enumeration_status: Option<i32>,
    writes: Vec<WriteRecord>,
}

/// Thread-safe simulated audio hardware
#[derive(Debug, Default)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SimulatedConfig) -> Self {
        let backend = Self::new();
        for device in &config.devices {
            backend.add_device(device.clone());
        }
        debug!(devices = config.devices.len(), "Simulated hardware ready");
        backend
    }

    /// Register a device; a device with an existing id is replaced in place
    ///
    /// The system object id is reserved and never registered as a device.
    pub fn add_device(&self, device: SimulatedDevice) {
        if device.id == SYSTEM_OBJECT.raw() {
            warn!(id = device.id, name = %device.name, "Ignoring device with the system object id");
            return;
        }
        let mut inner = self.lock();
        if !inner.order.contains(&device.id) {
            inner.order.push(device.id);
        }
        inner.devices.insert(device.id, device);
    }

    pub fn remove_device(&self, id: DeviceId) {
        let mut inner = self.lock();
        inner.devices.remove(&id.raw());
        inner.order.retain(|d| *d != id.raw());
    }

    /// Make reads of the system device list fail with `status`
    pub fn fail_enumeration(&self, status: Option<i32>) {
        self.lock().enumeration_status = status;
    }

    /// Make every write to `id` fail with `status`
    pub fn fail_writes(&self, id: DeviceId, status: Option<i32>) {
        if let Some(device) = self.lock().devices.get_mut(&id.raw()) {
            device.fail_writes = status;
        }
    }

    pub fn writes(&self) -> Vec<WriteRecord> {
        self.lock().writes.clone()
    }

    pub fn take_writes(&self) -> Vec<WriteRecord> {
        std::mem::take(&mut self.lock().writes)
    }

    /// Current stored volume of one element
    pub fn volume(&self, id: DeviceId, element: Element) -> Option<f32> {
        let inner = self.lock();
        let device = inner.devices.get(&id.raw())?;
        match element {
            Element::MAIN => device.volume,
            Element(channel) => device.channels.get(channel as usize - 1).copied(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn unsupported(object: DeviceId, address: &PropertyAddress) -> HardwareError {
    HardwareError::UnsupportedProperty {
        object,
        address: *address,
    }
}

/// Volume slot addressed by an element, if the device has one
fn volume_slot<'a>(device: &'a mut SimulatedDevice, element: Element) -> Option<&'a mut f32> {
    match element {
        Element::MAIN => device.volume.as_mut(),
        Element(channel) => device.channels.get_mut(channel as usize - 1),
    }
}

fn exposes(device: &SimulatedDevice, address: &PropertyAddress) -> bool {
    match (address.selector, address.scope) {
        (Selector::Name, Scope::Global) => !device.bare,
        (Selector::StreamConfiguration, Scope::Output) => true,
        (Selector::Mute, Scope::Output) => !device.bare && address.element == Element::MAIN,
        (Selector::VolumeScalar, Scope::Output) => match address.element {
            Element::MAIN => device.volume.is_some(),
            Element(channel) => channel as usize <= device.channels.len(),
        },
        (Selector::ActiveSubDeviceList, Scope::Global) => !device.sub_devices.is_empty(),
        _ => false,
    }
}

impl PropertyBackend for MemoryBackend {
    fn has_property(&self, object: DeviceId, address: &PropertyAddress) -> bool {
        let inner = self.lock();
        if object == SYSTEM_OBJECT {
            return address.selector == Selector::Devices;
        }
        inner
            .devices
            .get(&object.raw())
            .map(|device| exposes(device, address))
            .unwrap_or(false)
    }

    fn is_settable(&self, object: DeviceId, address: &PropertyAddress) -> Result<bool> {
        let inner = self.lock();
        if object == SYSTEM_OBJECT {
            return Ok(false);
        }
        let device = inner
            .devices
            .get(&object.raw())
            .ok_or(HardwareError::UnknownObject(object))?;

        if !exposes(device, address) {
            return Err(unsupported(object, address));
        }

        Ok(device.settable && matches!(address.selector, Selector::VolumeScalar | Selector::Mute))
    }

    fn get(&self, object: DeviceId, address: &PropertyAddress) -> Result<PropertyData> {
        let inner = self.lock();

        if object == SYSTEM_OBJECT {
            if address.selector != Selector::Devices {
                return Err(unsupported(object, address));
            }
            if let Some(code) = inner.enumeration_status {
                return Err(HardwareError::Status { code });
            }
            return Ok(PropertyData::Objects(inner.order.clone()));
        }

        let device = inner
            .devices
            .get(&object.raw())
            .ok_or(HardwareError::UnknownObject(object))?;

        if !exposes(device, address) {
            return Err(unsupported(object, address));
        }

        let data = match address.selector {
            Selector::Name => PropertyData::Text(device.name.clone()),
            Selector::StreamConfiguration => PropertyData::UInt(device.output_streams),
            Selector::Mute => PropertyData::UInt(u32::from(device.muted)),
            Selector::ActiveSubDeviceList => PropertyData::Objects(device.sub_devices.clone()),
            Selector::VolumeScalar => {
                let value = match address.element {
                    Element::MAIN => device.volume,
                    Element(channel) => device.channels.get(channel as usize - 1).copied(),
                };
                PropertyData::Float(value.ok_or_else(|| unsupported(object, address))?)
            }
            Selector::Devices => return Err(unsupported(object, address)),
        };

        trace!(object = %object, address = %address, "Property read");
        Ok(data)
    }

    fn set(&self, object: DeviceId, address: &PropertyAddress, data: PropertyData) -> Result<()> {
        let mut inner = self.lock();

        let device = inner
            .devices
            .get_mut(&object.raw())
            .ok_or(HardwareError::UnknownObject(object))?;

        if !exposes(device, address) {
            return Err(unsupported(object, address));
        }
        if !device.settable || !matches!(address.selector, Selector::VolumeScalar | Selector::Mute) {
            return Err(HardwareError::NotSettable {
                object,
                address: *address,
            });
        }
        if let Some(code) = device.fail_writes {
            return Err(HardwareError::Status { code });
        }

        match (address.selector, &data) {
            (Selector::VolumeScalar, PropertyData::Float(value)) => {
                let slot = volume_slot(device, address.element)
                    .ok_or_else(|| unsupported(object, address))?;
                *slot = value.clamp(0.0, 1.0);
            }
            (Selector::Mute, PropertyData::UInt(flag)) => device.muted = *flag == 1,
            (Selector::VolumeScalar, _) => {
                return Err(HardwareError::TypeMismatch {
                    address: *address,
                    expected: "float",
                })
            }
            _ => {
                return Err(HardwareError::TypeMismatch {
                    address: *address,
                    expected: "uint",
                })
            }
        }

        inner.writes.push(WriteRecord {
            object,
            address: *address,
            data,
        });
        trace!(object = %object, address = %address, "Property written");
        Ok(())
    }
}
