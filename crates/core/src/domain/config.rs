//! Configuration management for Volsync
//!
//! This module provides:
//! - Configuration structs for the on-screen display and the hardware layer
//! - A simulated device catalog used when no platform backend is available
//! - TOML load/save with a factory default and corrupt-file recovery

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, error, info, instrument};

use crate::domain::hardware::SYSTEM_OBJECT;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// On-screen display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Show the volume indicator after hotkey actions
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// How long the indicator stays visible, in milliseconds
    #[serde(default = "default_display_duration")]
    pub duration_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_ms: default_display_duration(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_display_duration() -> u64 {
    1500
}

/// Which property backend talks to the hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    CoreAudio,
    Simulated,
}

impl Default for BackendKind {
    fn default() -> Self {
        if cfg!(target_os = "macos") {
            BackendKind::CoreAudio
        } else {
            BackendKind::Simulated
        }
    }
}

/// Hardware layer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HardwareConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// Read each volume write back and log mismatches
    #[serde(default)]
    pub verify_writes: bool,
}

/// One device of the simulated hardware
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedDevice {
    pub id: u32,
    pub name: String,

    /// Master element volume; `None` for devices with channel controls only
    #[serde(default)]
    pub volume: Option<f32>,

    /// Per-channel volume elements, starting at channel 1
    #[serde(default)]
    pub channels: Vec<f32>,

    #[serde(default)]
    pub muted: bool,

    /// Whether volume elements accept writes
    #[serde(default = "default_true")]
    pub settable: bool,

    /// Number of output streams; 0 hides the device from discovery
    #[serde(default = "default_output_streams")]
    pub output_streams: u32,

    /// Member ids; a non-empty list makes this an aggregate device
    #[serde(default)]
    pub sub_devices: Vec<u32>,

    /// Status code returned by every write, to simulate a failing device
    #[serde(default)]
    pub fail_writes: Option<i32>,

    /// Publish neither a name nor a mute control
    #[serde(default)]
    pub bare: bool,
}

fn default_output_streams() -> u32 {
    1
}

impl SimulatedDevice {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            volume: None,
            channels: Vec::new(),
            muted: false,
            settable: true,
            output_streams: default_output_streams(),
            sub_devices: Vec::new(),
            fail_writes: None,
            bare: false,
        }
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_channels(mut self, channels: Vec<f32>) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_sub_devices(mut self, ids: Vec<u32>) -> Self {
        self.sub_devices = ids;
        self
    }

    pub fn muted(mut self) -> Self {
        self.muted = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.settable = false;
        self
    }

    pub fn input_only(mut self) -> Self {
        self.output_streams = 0;
        self
    }

    pub fn failing(mut self, status: i32) -> Self {
        self.fail_writes = Some(status);
        self
    }

    pub fn bare(mut self) -> Self {
        self.bare = true;
        self
    }
}

/// Simulated hardware catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SimulatedConfig {
    #[serde(default)]
    pub devices: Vec<SimulatedDevice>,
}

impl SimulatedConfig {
    /// Two speakers and an aggregate device combining them
    pub fn factory_default() -> Self {
        Self {
            devices: vec![
                SimulatedDevice::new(40, "Desk Speakers").with_volume(0.5),
                SimulatedDevice::new(41, "USB DAC").with_channels(vec![0.7, 0.7]),
                SimulatedDevice::new(42, "Studio Mic").with_volume(0.8).input_only(),
                SimulatedDevice::new(50, "Multi-Output Device")
                    .with_sub_devices(vec![40, 41]),
            ],
        }
    }

    /// Reject reserved or duplicate ids and aggregates naming unknown members
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for device in &self.devices {
            if device.id == SYSTEM_OBJECT.raw() {
                return Err(ConfigError::Invalid(format!(
                    "Simulated device id {} is reserved for the system object",
                    device.id
                )));
            }
            if !seen.insert(device.id) {
                return Err(ConfigError::Invalid(format!(
                    "Duplicate simulated device id: {}",
                    device.id
                )));
            }
        }

        for device in &self.devices {
            if let Some(missing) = device.sub_devices.iter().find(|id| !seen.contains(id)) {
                return Err(ConfigError::Invalid(format!(
                    "Device {} references unknown sub-device {}",
                    device.id, missing
                )));
            }
        }

        Ok(())
    }
}

/// Complete Volsync configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VolsyncConfig {
    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub hardware: HardwareConfig,

    #[serde(default)]
    pub simulated: SimulatedConfig,
}

impl VolsyncConfig {
    /// Load configuration from TOML file
    #[instrument(skip(path))]
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let contents = fs::read_to_string(path).await?;
        let config = Self::from_toml(&contents)?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Save configuration to TOML file
    #[instrument(skip(self, path))]
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!(path = %path.display(), "Saving configuration");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        fs::write(path, toml_str).await?;

        debug!("Configuration saved successfully");
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.simulated.validate()?;
        Ok(config)
    }

    /// Create factory default configuration
    pub fn factory_default() -> Self {
        Self {
            simulated: SimulatedConfig::factory_default(),
            ..Self::default()
        }
    }
}

/// Manages the main configuration file at `~/.config/volsync/config.toml`
pub struct ConfigManager {
    config_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_path = config_dir.join("config.toml");

        Self {
            config_dir,
            config_path,
        }
    }

    /// Manager for an explicit file path
    pub fn for_file(config_path: PathBuf) -> Self {
        let config_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self {
            config_dir,
            config_path,
        }
    }

    /// Returns `~/.config/volsync` on Linux/Mac
    pub fn default_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("volsync"))
            .ok_or_else(|| ConfigError::Invalid("Could not determine config directory".to_string()))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration from file
    ///
    /// If the config file doesn't exist, returns factory default.
    /// If the config file is corrupt, logs an error and returns factory default.
    #[instrument(skip(self))]
    pub async fn load(&self) -> VolsyncConfig {
        if !self.config_path.exists() {
            info!(
                path = %self.config_path.display(),
                "Config file not found, creating factory default"
            );

            let config = VolsyncConfig::factory_default();

            if let Err(e) = self.save(&config).await {
                error!(
                    path = %self.config_path.display(),
                    error = %e,
                    "Failed to save factory default config"
                );
            }

            return config;
        }

        match VolsyncConfig::load_from_file(&self.config_path).await {
            Ok(config) => config,
            Err(e) => {
                error!(
                    path = %self.config_path.display(),
                    error = %e,
                    "Failed to load config, using factory default"
                );

                let backup_path = self.config_path.with_extension("toml.corrupt");
                if let Err(copy_err) = fs::copy(&self.config_path, &backup_path).await {
                    error!(
                        path = %backup_path.display(),
                        error = %copy_err,
                        "Failed to backup corrupt config"
                    );
                }

                VolsyncConfig::factory_default()
            }
        }
    }

    #[instrument(skip(self, config))]
    pub async fn save(&self, config: &VolsyncConfig) -> Result<()> {
        fs::create_dir_all(&self.config_dir).await?;
        config.save_to_file(&self.config_path).await
    }

    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }
}
