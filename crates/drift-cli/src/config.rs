//! Layered host configuration
//!
//! Config is resolved with three layers of precedence (highest wins):
//! 1. Command-line flags
//! 2. A config file: `--config <path>`, else `./drift.toml` if present
//! 3. Built-in defaults

use drift_core::{Color, DriftError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "drift.toml";

/// Page backdrop behind the layer in dark mode
const DARK_BACKDROP: u32 = 0x111827;
/// Page backdrop behind the layer in light mode
const LIGHT_BACKDROP: u32 = 0xF9FAFB;

/// Window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            title: "Drift".to_string(),
        }
    }
}

/// How the field layer is composited over the page backdrop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub opacity: f32,
    pub fade_in_secs: f32,
    pub dark: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            opacity: 0.3,
            fade_in_secs: 1.5,
            dark: true,
        }
    }
}

impl LayerConfig {
    pub fn backdrop(&self) -> Color {
        if self.dark {
            Color::from_hex(DARK_BACKDROP)
        } else {
            Color::from_hex(LIGHT_BACKDROP)
        }
    }

    /// Layer opacity `elapsed` seconds after the window first appears
    pub fn opacity_at(&self, elapsed: f32) -> f32 {
        if self.fade_in_secs <= 0.0 {
            return self.opacity;
        }
        self.opacity * (elapsed / self.fade_in_secs).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: Option<u64>,
    pub normalize_timestep: bool,
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    pub window: WindowConfig,
    pub layer: LayerConfig,
    pub simulation: SimulationConfig,
}

/// Values given on the command line; `None` leaves the lower layer alone
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fullscreen: bool,
    pub seed: Option<u64>,
    pub opacity: Option<f32>,
    pub light: bool,
    pub normalize_timestep: bool,
}

impl DriftConfig {
    /// Resolve the full stack: defaults < file < overrides
    pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = match Self::file_path(path)? {
            Some(file) => {
                tracing::debug!(path = %file.display(), "loading config file");
                Self::load_file(&file)?
            }
            None => Self::default(),
        };
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| {
            DriftError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(width) = overrides.width {
            self.window.width = width;
        }
        if let Some(height) = overrides.height {
            self.window.height = height;
        }
        if overrides.fullscreen {
            self.window.fullscreen = true;
        }
        if let Some(seed) = overrides.seed {
            self.simulation.seed = Some(seed);
        }
        if let Some(opacity) = overrides.opacity {
            self.layer.opacity = opacity;
        }
        if overrides.light {
            self.layer.dark = false;
        }
        if overrides.normalize_timestep {
            self.simulation.normalize_timestep = true;
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_range("layer.opacity", self.layer.opacity as f64, 0.0, 1.0)?;
        check_range("layer.fade_in_secs", self.layer.fade_in_secs as f64, 0.0, 60.0)?;
        check_range("window.width", self.window.width as f64, 1.0, 16384.0)?;
        check_range("window.height", self.window.height as f64, 1.0, 16384.0)?;
        Ok(())
    }

    /// An explicit path must exist; the default file is optional
    fn file_path(path: Option<&Path>) -> Result<Option<PathBuf>> {
        match path {
            Some(p) if p.exists() => Ok(Some(p.to_path_buf())),
            Some(p) => Err(DriftError::ConfigError(format!(
                "Config file not found: {}",
                p.display()
            ))),
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                Ok(local.exists().then_some(local))
            }
        }
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if value.is_nan() || value < min || value > max {
        return Err(DriftError::ValueOutOfRange {
            field: field.to_string(),
            min,
            max,
            value,
        });
    }
    Ok(())
}
