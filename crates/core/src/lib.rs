//! Volsync core: the virtual-master volume engine
//!
//! Platform-agnostic domain types, the pure state-transition function, the
//! synchronization controller and the hardware property model. Concrete
//! hardware backends live in the `infra` crate.

pub mod domain;

pub use domain::*;
