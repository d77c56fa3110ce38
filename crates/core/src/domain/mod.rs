//! Domain entities and business rules

pub mod action;
pub mod audio;
pub mod config;
pub mod controller;
pub mod device;
pub mod display;
pub mod effect;
pub mod hardware;
pub mod reducer;
pub mod source;
pub mod state;
pub mod volume;

// Re-export specific items to avoid ambiguous glob imports
pub use action::Action;
pub use audio::AudioAdapter;
pub use config::{
    BackendKind, ConfigError, ConfigManager, DisplayConfig, HardwareConfig, SimulatedConfig,
    SimulatedDevice, VolsyncConfig,
};
pub use controller::Controller;
pub use device::{Device, DeviceId};
pub use display::{NullDisplay, StateObserver, VolumeDisplay};
pub use effect::Effect;
pub use hardware::{
    properties, Element, HardwareError, Property, PropertyAccess, PropertyAddress, PropertyBackend,
    PropertyData, PropertyValue, Scope, Selector, SYSTEM_OBJECT,
};
pub use reducer::reduce;
pub use source::{ActionSource, SourceError};
pub use state::SessionState;
pub use volume::Volume;
