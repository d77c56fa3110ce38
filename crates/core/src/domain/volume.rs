//! Clamped scalar volume

use serde::{Deserialize, Serialize};
use std::fmt;

/// Volume level in the closed range [0.0, 1.0]
///
/// Construction never fails: out-of-range input is clamped and NaN maps to
/// silence, so no `Volume` can hold a value outside the range.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Volume(f32);

impl Volume {
    pub const MIN: f32 = 0.0;
    pub const MAX: f32 = 1.0;

    /// Fixed increment used by the increase/decrease actions
    pub const STEP: f32 = 1.0 / 16.0;

    /// Neutral level used when the hardware reports nothing
    pub const NEUTRAL: Volume = Volume(0.5);

    pub const SILENT: Volume = Volume(0.0);

    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::SILENT;
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    pub fn is_muted(&self) -> bool {
        self.0 == 0.0
    }

    /// Shift by a signed offset, clamping the result
    pub fn offset(&self, delta: f32) -> Self {
        Self::new(self.0 + delta)
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl From<f32> for Volume {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<Volume> for f32 {
    fn from(volume: Volume) -> Self {
        volume.0
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.0 * 100.0)
    }
}
