use crate::params::SimulationParams;
use crate::presets::find_preset;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// Render surface properties
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Target ticks per second when pacing is enabled.
    pub frame_rate: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        CanvasConfig { width: 900, height: 900, frame_rate: 60 }
    }
}

// How a headless session runs
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub frames: u32,
    /// Preset applied on top of `[params]` before the first frame.
    pub preset: Option<String>,
    /// Frames between stats log lines. 0 disables them.
    pub stats_interval: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig { frames: 600, preset: None, stats_interval: 60 }
    }
}

// Where the still export goes
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig { directory: PathBuf::from("."), prefix: "neural-drift".to_string() }
    }
}

/// Studio configuration, loaded from config.toml. Every section is optional.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StudioConfig {
    pub canvas: CanvasConfig,
    pub params: SimulationParams,
    pub session: SessionConfig,
    pub output: OutputConfig,
}

impl StudioConfig {
    /// Loads the studio configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config = Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid config '{}': {}", path_ref.display(), e))?;
        Ok(config)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: StudioConfig = toml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            anyhow::bail!("canvas width and height must be greater than 0.");
        }
        if self.canvas.frame_rate == 0 {
            anyhow::bail!("canvas frame_rate must be greater than 0.");
        }
        if let Some(name) = &self.session.preset {
            if find_preset(name).is_none() {
                anyhow::bail!("session preset '{}' does not exist.", name);
            }
        }
        self.params.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::HexColor;

    #[test]
    fn empty_document_gives_defaults() {
        let config = StudioConfig::from_toml_str("").unwrap();
        assert_eq!(config, StudioConfig::default());
        assert_eq!(config.canvas.width, 900);
        assert_eq!(config.canvas.frame_rate, 60);
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let config = StudioConfig::from_toml_str(
            r##"
            [params]
            seed = 7
            color_bg = "#101010"

            [session]
            frames = 10
            preset = "Oceanic Flow"
            "##,
        )
        .unwrap();
        assert_eq!(config.params.seed, 7);
        assert_eq!(config.params.color_bg, HexColor::new(0x10, 0x10, 0x10));
        assert_eq!(config.params.particle_count, 1500);
        assert_eq!(config.session.frames, 10);
        assert_eq!(config.session.stats_interval, 60);
        assert_eq!(config.output.prefix, "neural-drift");
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(StudioConfig::from_toml_str("[canvas]\nwidth = 0").is_err());
        assert!(StudioConfig::from_toml_str("[params]\nparticle_count = 0").is_err());
        assert!(StudioConfig::from_toml_str("[params]\ncolor_bg = \"blue\"").is_err());
        assert!(StudioConfig::from_toml_str("[session]\npreset = \"Nope\"").is_err());
    }
}
