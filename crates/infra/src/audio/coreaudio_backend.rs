//! CoreAudio HAL property backend for macOS
//!
//! Maps the typed property model onto `AudioObjectGetPropertyData` and
//! friends. Every call is synchronous and bounded only by the HAL itself.
//!
//! This file is only compiled on macOS via #[cfg(target_os = "macos")]

use std::ffi::c_void;
use std::mem::size_of;
use std::ptr;

use core_foundation::base::TCFType;
use core_foundation::string::{CFString, CFStringRef};
use coreaudio_sys::*;
use tracing::{debug, trace};

use volsync_core::domain::device::DeviceId;
use volsync_core::domain::hardware::{
    HardwareError, PropertyAddress, PropertyBackend, PropertyData, Result, Scope, Selector,
};

/// Property backend talking to the CoreAudio HAL
#[derive(Debug, Default)]
pub struct CoreAudioBackend;

impl CoreAudioBackend {
    pub fn new() -> Self {
        debug!("Using CoreAudio HAL backend");
        Self
    }
}

fn hal_address(address: &PropertyAddress) -> AudioObjectPropertyAddress {
    let selector = match address.selector {
        Selector::Devices => kAudioHardwarePropertyDevices,
        Selector::StreamConfiguration => kAudioDevicePropertyStreamConfiguration,
        Selector::Name => kAudioObjectPropertyName,
        Selector::VolumeScalar => kAudioDevicePropertyVolumeScalar,
        Selector::Mute => kAudioDevicePropertyMute,
        Selector::ActiveSubDeviceList => kAudioAggregateDevicePropertyActiveSubDeviceList,
    };
    let scope = match address.scope {
        Scope::Global => kAudioObjectPropertyScopeGlobal,
        Scope::Output => kAudioDevicePropertyScopeOutput,
    };

    AudioObjectPropertyAddress {
        mSelector: selector,
        mScope: scope,
        mElement: address.element.0,
    }
}

fn check(status: OSStatus) -> Result<()> {
    if status == 0 {
        Ok(())
    } else {
        Err(HardwareError::Status { code: status })
    }
}

fn data_size(object: AudioObjectID, address: &AudioObjectPropertyAddress) -> Result<u32> {
    let mut size: u32 = 0;
    // SAFETY: address and size outlive the call; no qualifier data is passed
    let status = unsafe { AudioObjectGetPropertyDataSize(object, address, 0, ptr::null(), &mut size) };
    check(status)?;
    Ok(size)
}

/// Read a fixed-size scalar property
fn read_scalar<T: Copy + Default>(object: AudioObjectID, address: &AudioObjectPropertyAddress) -> Result<T> {
    let mut value = T::default();
    let mut size = size_of::<T>() as u32;
    // SAFETY: `value` is a valid, writable T and `size` matches its layout
    let status = unsafe {
        AudioObjectGetPropertyData(
            object,
            address,
            0,
            ptr::null(),
            &mut size,
            &mut value as *mut T as *mut c_void,
        )
    };
    check(status)?;
    Ok(value)
}

/// Read a variable-length list of object ids
fn read_objects(object: AudioObjectID, address: &AudioObjectPropertyAddress) -> Result<Vec<u32>> {
    let mut size = data_size(object, address)?;
    let count = size as usize / size_of::<AudioObjectID>();
    let mut ids: Vec<AudioObjectID> = vec![0; count];
    if count == 0 {
        return Ok(ids);
    }

    // SAFETY: the buffer holds exactly `size` bytes of AudioObjectID
    let status = unsafe {
        AudioObjectGetPropertyData(
            object,
            address,
            0,
            ptr::null(),
            &mut size,
            ids.as_mut_ptr() as *mut c_void,
        )
    };
    check(status)?;

    ids.truncate(size as usize / size_of::<AudioObjectID>());
    Ok(ids)
}

/// Number of buffers in the output stream configuration
fn read_stream_count(object: AudioObjectID, address: &AudioObjectPropertyAddress) -> Result<u32> {
    let mut size = data_size(object, address)?;
    if (size as usize) < size_of::<AudioBufferList>() {
        return Ok(0);
    }

    // u64 words keep the AudioBufferList header aligned
    let words = (size as usize).div_ceil(size_of::<u64>());
    let mut buffer: Vec<u64> = vec![0; words];

    // SAFETY: the buffer is at least `size` bytes and suitably aligned
    let status = unsafe {
        AudioObjectGetPropertyData(
            object,
            address,
            0,
            ptr::null(),
            &mut size,
            buffer.as_mut_ptr() as *mut c_void,
        )
    };
    check(status)?;

    // SAFETY: the HAL filled the header of an AudioBufferList
    let list = unsafe { &*(buffer.as_ptr() as *const AudioBufferList) };
    Ok(list.mNumberBuffers)
}

fn read_name(object: AudioObjectID, address: &AudioObjectPropertyAddress) -> Result<String> {
    let mut cf_name: CFStringRef = ptr::null();
    let mut size = size_of::<CFStringRef>() as u32;
    // SAFETY: `cf_name` is a writable pointer slot of the advertised size
    let status = unsafe {
        AudioObjectGetPropertyData(
            object,
            address,
            0,
            ptr::null(),
            &mut size,
            &mut cf_name as *mut CFStringRef as *mut c_void,
        )
    };
    check(status)?;

    if cf_name.is_null() {
        return Err(HardwareError::Status { code: -1 });
    }
    // SAFETY: the name property returns a retained CFString we now own
    let name = unsafe { CFString::wrap_under_create_rule(cf_name) };
    Ok(name.to_string())
}

fn write_scalar<T: Copy>(object: AudioObjectID, address: &AudioObjectPropertyAddress, value: T) -> Result<()> {
    // SAFETY: `value` lives for the call and `size` matches its layout
    let status = unsafe {
        AudioObjectSetPropertyData(
            object,
            address,
            0,
            ptr::null(),
            size_of::<T>() as u32,
            &value as *const T as *const c_void,
        )
    };
    check(status)
}

impl PropertyBackend for CoreAudioBackend {
    fn has_property(&self, object: DeviceId, address: &PropertyAddress) -> bool {
        let hal = hal_address(address);
        // SAFETY: plain query on a stack address
        unsafe { AudioObjectHasProperty(object.raw(), &hal) != 0 }
    }

    fn is_settable(&self, object: DeviceId, address: &PropertyAddress) -> Result<bool> {
        let hal = hal_address(address);
        let mut settable: Boolean = 0;
        // SAFETY: both pointers reference live stack values
        let status = unsafe { AudioObjectIsPropertySettable(object.raw(), &hal, &mut settable) };
        check(status)?;
        Ok(settable != 0)
    }

    fn get(&self, object: DeviceId, address: &PropertyAddress) -> Result<PropertyData> {
        let hal = hal_address(address);
        let id = object.raw();

        let data = match address.selector {
            Selector::Devices | Selector::ActiveSubDeviceList => {
                PropertyData::Objects(read_objects(id, &hal)?)
            }
            Selector::StreamConfiguration => PropertyData::UInt(read_stream_count(id, &hal)?),
            Selector::Name => PropertyData::Text(read_name(id, &hal)?),
            Selector::VolumeScalar => PropertyData::Float(read_scalar::<f32>(id, &hal)?),
            Selector::Mute => PropertyData::UInt(read_scalar::<u32>(id, &hal)?),
        };

        trace!(object = %object, address = %address, "HAL read");
        Ok(data)
    }

    fn set(&self, object: DeviceId, address: &PropertyAddress, data: PropertyData) -> Result<()> {
        let hal = hal_address(address);

        match (address.selector, data) {
            (Selector::VolumeScalar, PropertyData::Float(value)) => {
                write_scalar::<f32>(object.raw(), &hal, value)
            }
            (Selector::Mute, PropertyData::UInt(flag)) => write_scalar::<u32>(object.raw(), &hal, flag),
            (Selector::VolumeScalar, _) => Err(HardwareError::TypeMismatch {
                address: *address,
                expected: "float",
            }),
            (Selector::Mute, _) => Err(HardwareError::TypeMismatch {
                address: *address,
                expected: "uint",
            }),
            _ => Err(HardwareError::NotSettable {
                object,
                address: *address,
            }),
        }
    }
}
