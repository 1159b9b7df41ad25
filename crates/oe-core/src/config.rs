//! Configuration system for the oxidized-emotion frontend layer

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Base output width before upscaling
pub const BASE_WIDTH: u32 = 640;

/// Base output height before upscaling
pub const BASE_HEIGHT: u32 = 448;

/// Output audio sample rate in Hz
pub const AUDIO_SAMPLE_RATE: u32 = 48_000;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub video: VideoConfig,
    pub paths: PathConfig,
}

/// General emulator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Skip the BIOS boot animation when launching from an image
    pub fast_boot: bool,
    /// Console video region, decides the output frame rate
    pub region: Region,
}

/// Console video region
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum Region {
    #[default]
    Ntsc,
    Pal,
}

impl Region {
    /// Output frames per second for this region
    pub fn fps(&self) -> f64 {
        match self {
            Region::Ntsc => 60.0 / 1.001,
            Region::Pal => 50.0,
        }
    }
}

/// Video settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub renderer: Renderer,
    /// Internal resolution multiplier applied to the base 640x448 output
    pub upscale_multiplier: u32,
    pub frameskip: bool,
    pub frames_to_draw: u32,
    pub frames_to_skip: u32,
}

/// Renderer selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum Renderer {
    #[default]
    Auto,
    Vulkan,
    Software,
    Null,
}

impl Renderer {
    /// Software and null rendering always output at base resolution,
    /// regardless of the configured upscale multiplier.
    pub fn forces_base_resolution(&self) -> bool {
        matches!(self, Renderer::Software | Renderer::Null)
    }
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub bios: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            fast_boot: true,
            region: Region::default(),
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            renderer: Renderer::default(),
            upscale_multiplier: 1,
            frameskip: false,
            frames_to_draw: 1,
            frames_to_skip: 1,
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        let base = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("oxidized-emotion");

        Self {
            bios: base.join("bios"),
        }
    }
}

impl Config {
    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("oxidized-emotion")
            .join("config.toml")
    }

    /// Wrap this configuration for sharing with the run loop, which
    /// re-reads it every tick to pick up live option changes.
    pub fn into_shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }
}

/// Live-updatable configuration handle shared between the host surface
/// and the run loop
pub type SharedConfig = Arc<RwLock<Config>>;
