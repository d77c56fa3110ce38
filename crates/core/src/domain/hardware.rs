//! Typed hardware property model
//!
//! The audio hardware is addressed by property: a selector, a scope and an
//! element (0 is the master element, 1.. are channels). Backends move
//! untyped [`PropertyData`] across the platform boundary; callers go through
//! a typed [`Property`] descriptor so payload validation stays in one place.

use crate::domain::device::DeviceId;
use std::fmt;
use std::marker::PhantomData;
use thiserror::Error;

/// Errors raised by hardware property access
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HardwareError {
    /// No object with this id is known to the backend
    #[error("Unknown audio object: {0}")]
    UnknownObject(DeviceId),

    /// The object does not expose the property at all
    #[error("Property {address} not supported by object {object}")]
    UnsupportedProperty {
        object: DeviceId,
        address: PropertyAddress,
    },

    /// The property exists but rejects writes
    #[error("Property {address} on object {object} is not settable")]
    NotSettable {
        object: DeviceId,
        address: PropertyAddress,
    },

    /// Payload did not have the shape the descriptor expects
    #[error("Property {address}: expected {expected} payload")]
    TypeMismatch {
        address: PropertyAddress,
        expected: &'static str,
    },

    /// The platform call returned a non-success status code
    #[error("Hardware call failed with status {code}")]
    Status { code: i32 },

    /// The hardware layer cannot be reached at all
    #[error("Audio hardware unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, HardwareError>;

/// What a property describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Device list of the system object
    Devices,
    /// Stream layout; read as the number of output buffers
    StreamConfiguration,
    Name,
    VolumeScalar,
    Mute,
    /// Member list of an aggregate device
    ActiveSubDeviceList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Output,
}

/// Element index; 0 is the master element, 1.. are channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element(pub u32);

impl Element {
    pub const MAIN: Element = Element(0);
    pub const LEFT: Element = Element(1);
    pub const RIGHT: Element = Element(2);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyAddress {
    pub selector: Selector,
    pub scope: Scope,
    pub element: Element,
}

impl PropertyAddress {
    pub const fn new(selector: Selector, scope: Scope, element: Element) -> Self {
        Self {
            selector,
            scope,
            element,
        }
    }
}

impl fmt::Display for PropertyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}/{}", self.selector, self.scope, self.element.0)
    }
}

/// Untyped payload exchanged with a backend
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyData {
    Float(f32),
    UInt(u32),
    Text(String),
    Objects(Vec<u32>),
}

impl PropertyData {
    fn kind(&self) -> &'static str {
        match self {
            PropertyData::Float(_) => "float",
            PropertyData::UInt(_) => "uint",
            PropertyData::Text(_) => "text",
            PropertyData::Objects(_) => "object list",
        }
    }
}

/// Rust types that can be carried in a [`PropertyData`]
pub trait PropertyValue: Sized {
    const KIND: &'static str;

    fn from_data(data: PropertyData) -> Option<Self>;

    fn into_data(self) -> PropertyData;
}

impl PropertyValue for f32 {
    const KIND: &'static str = "float";

    fn from_data(data: PropertyData) -> Option<Self> {
        match data {
            PropertyData::Float(v) => Some(v),
            _ => None,
        }
    }

    fn into_data(self) -> PropertyData {
        PropertyData::Float(self)
    }
}

impl PropertyValue for u32 {
    const KIND: &'static str = "uint";

    fn from_data(data: PropertyData) -> Option<Self> {
        match data {
            PropertyData::UInt(v) => Some(v),
            _ => None,
        }
    }

    fn into_data(self) -> PropertyData {
        PropertyData::UInt(self)
    }
}

/// Boolean properties travel as a 32-bit flag; only 1 reads as true
impl PropertyValue for bool {
    const KIND: &'static str = "uint";

    fn from_data(data: PropertyData) -> Option<Self> {
        match data {
            PropertyData::UInt(v) => Some(v == 1),
            _ => None,
        }
    }

    fn into_data(self) -> PropertyData {
        PropertyData::UInt(u32::from(self))
    }
}

impl PropertyValue for String {
    const KIND: &'static str = "text";

    fn from_data(data: PropertyData) -> Option<Self> {
        match data {
            PropertyData::Text(v) => Some(v),
            _ => None,
        }
    }

    fn into_data(self) -> PropertyData {
        PropertyData::Text(self)
    }
}

impl PropertyValue for Vec<DeviceId> {
    const KIND: &'static str = "object list";

    fn from_data(data: PropertyData) -> Option<Self> {
        match data {
            PropertyData::Objects(ids) => Some(ids.into_iter().map(DeviceId::new).collect()),
            _ => None,
        }
    }

    fn into_data(self) -> PropertyData {
        PropertyData::Objects(self.into_iter().map(|id| id.raw()).collect())
    }
}

/// Typed property descriptor
pub struct Property<T> {
    address: PropertyAddress,
    _value: PhantomData<fn() -> T>,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Property<T> {}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&self.address).finish()
    }
}

impl<T: PropertyValue> Property<T> {
    pub const fn new(selector: Selector, scope: Scope, element: Element) -> Self {
        Self {
            address: PropertyAddress::new(selector, scope, element),
            _value: PhantomData,
        }
    }

    pub fn address(&self) -> &PropertyAddress {
        &self.address
    }

    /// Same property on another element (channel)
    pub fn on_element(self, element: Element) -> Self {
        Self::new(self.address.selector, self.address.scope, element)
    }

    /// Validate and convert a raw payload
    pub fn decode(&self, data: PropertyData) -> Result<T> {
        let found = data.kind();
        T::from_data(data).ok_or_else(|| {
            tracing::trace!(address = %self.address, found, "Payload type mismatch");
            HardwareError::TypeMismatch {
                address: self.address,
                expected: T::KIND,
            }
        })
    }
}

/// The system object owns the device list
pub const SYSTEM_OBJECT: DeviceId = DeviceId::new(1);

/// Well-known property descriptors
pub mod properties {
    use super::{Element, Property, Scope, Selector};
    use crate::domain::device::DeviceId;

    pub const DEVICES: Property<Vec<DeviceId>> =
        Property::new(Selector::Devices, Scope::Global, Element::MAIN);

    pub const OUTPUT_STREAMS: Property<u32> =
        Property::new(Selector::StreamConfiguration, Scope::Output, Element::MAIN);

    pub const NAME: Property<String> = Property::new(Selector::Name, Scope::Global, Element::MAIN);

    pub const VOLUME: Property<f32> =
        Property::new(Selector::VolumeScalar, Scope::Output, Element::MAIN);

    pub const MUTE: Property<bool> = Property::new(Selector::Mute, Scope::Output, Element::MAIN);

    pub const ACTIVE_SUB_DEVICES: Property<Vec<DeviceId>> =
        Property::new(Selector::ActiveSubDeviceList, Scope::Global, Element::MAIN);
}

/// Platform seam: untyped property access on audio objects
pub trait PropertyBackend: Send {
    fn has_property(&self, object: DeviceId, address: &PropertyAddress) -> bool;

    fn is_settable(&self, object: DeviceId, address: &PropertyAddress) -> Result<bool>;

    fn get(&self, object: DeviceId, address: &PropertyAddress) -> Result<PropertyData>;

    fn set(&self, object: DeviceId, address: &PropertyAddress, data: PropertyData) -> Result<()>;
}

/// Typed reads and writes on top of any [`PropertyBackend`]
pub trait PropertyAccess {
    fn read<T: PropertyValue>(&self, object: DeviceId, property: &Property<T>) -> Result<T>;

    fn write<T: PropertyValue>(&self, object: DeviceId, property: &Property<T>, value: T) -> Result<()>;

    fn can_write<T: PropertyValue>(&self, object: DeviceId, property: &Property<T>) -> bool;
}

impl<B: PropertyBackend + ?Sized> PropertyAccess for B {
    fn read<T: PropertyValue>(&self, object: DeviceId, property: &Property<T>) -> Result<T> {
        let data = self.get(object, property.address())?;
        property.decode(data)
    }

    fn write<T: PropertyValue>(&self, object: DeviceId, property: &Property<T>, value: T) -> Result<()> {
        self.set(object, property.address(), value.into_data())
    }

    fn can_write<T: PropertyValue>(&self, object: DeviceId, property: &Property<T>) -> bool {
        matches!(self.is_settable(object, property.address()), Ok(true))
    }
}
