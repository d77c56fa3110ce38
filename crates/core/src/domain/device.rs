//! Immutable device snapshots
//!
//! A [`Device`] is produced fresh by every discovery pass and never mutated
//! in place; volume edits build a new snapshot.

use crate::domain::volume::Volume;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque hardware identifier, unique within one discovery snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(u32);

impl DeviceId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for DeviceId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Snapshot of an output device
///
/// Only a composite device carries children; the constructors make
/// `is_composite == false` with non-empty children unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    id: DeviceId,
    name: String,
    volume: Volume,
    muted: bool,
    composite: bool,
    children: Vec<Device>,
}

impl Device {
    /// A plain device with no sub-devices
    pub fn simple(id: DeviceId, name: impl Into<String>, volume: Volume, muted: bool) -> Self {
        Self {
            id,
            name: name.into(),
            volume,
            muted,
            composite: false,
            children: Vec::new(),
        }
    }

    /// An aggregate device built from independently addressable children
    pub fn composite(
        id: DeviceId,
        name: impl Into<String>,
        volume: Volume,
        muted: bool,
        children: Vec<Device>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            volume,
            muted,
            composite: true,
            children,
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_composite(&self) -> bool {
        self.composite
    }

    pub fn children(&self) -> &[Device] {
        &self.children
    }

    pub fn child(&self, id: DeviceId) -> Option<&Device> {
        self.children.iter().find(|c| c.id == id)
    }

    /// Copy of this snapshot with a different stored volume
    pub fn with_volume(&self, volume: Volume) -> Self {
        Self {
            volume,
            ..self.clone()
        }
    }

    /// Copy of this snapshot with every child's volume rewritten by `f`
    ///
    /// The number and order of children is preserved.
    pub fn map_children<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&Device) -> Volume,
    {
        let children = self
            .children
            .iter()
            .map(|child| child.with_volume(f(child)))
            .collect();

        Self {
            children,
            ..self.clone()
        }
    }

    /// Depth-first count of this device and all descendants
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Device::node_count).sum::<usize>()
    }
}

/// Find a device by id in an ordered catalog (top level only)
pub fn find_device(catalog: &[Device], id: DeviceId) -> Option<&Device> {
    catalog.iter().find(|d| d.id == id)
}
