//! Volsync infrastructure: hardware backends and action sources

pub mod audio;
pub mod input;
