//! Runtime configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_width() -> u32 {
    2560
}

fn default_height() -> u32 {
    1080
}

fn default_jacobi_iterations() -> u32 {
    20
}

fn default_shaders_dir() -> String {
    "shaders".to_owned()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VisualizerConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_jacobi_iterations")]
    pub jacobi_iterations: u32,
    #[serde(default = "default_shaders_dir")]
    pub shaders_dir: String,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            jacobi_iterations: default_jacobi_iterations(),
            shaders_dir: default_shaders_dir(),
        }
    }
}

impl VisualizerConfig {
    pub fn load_json(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        Ok(config)
    }

    pub fn save_json(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads `path` if it exists; any failure logs and falls back to the
    /// defaults rather than aborting.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.is_file() {
            return Self::default();
        }
        match Self::load_json(path) {
            Ok(config) => {
                log::info!("loaded config from {}", path.display());
                config
            }
            Err(error) => {
                log::error!("failed to load {}: {error}; using defaults", path.display());
                Self::default()
            }
        }
    }
}
