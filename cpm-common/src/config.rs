use serde::{Deserialize, Serialize};
use anyhow::Result;
use crate::error::InitError;
use std::path::Path;

// Grid dimensions in pixels
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
}

// Seed placement, loaded from the [seeding] table
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SeedingConfig {
    pub num_cells: usize,
    #[serde(default = "default_pad")]
    pub pad: usize,
    // 0 disables the separation constraint
    #[serde(default)]
    pub min_distance: u32,
    #[serde(default = "default_max_attempts_per_seed")]
    pub max_attempts_per_seed: usize,
    pub rng_seed: u64,
    // Continue with fewer cells when distance-constrained placement runs out of attempts
    #[serde(default)]
    pub allow_partial_placement: bool,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthStrategy {
    None,
    Round,
    Dla,
}

impl GrowthStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            GrowthStrategy::None => "none",
            GrowthStrategy::Round => "round",
            GrowthStrategy::Dla => "dla",
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GrowthConfig {
    #[serde(default = "default_strategy")]
    pub strategy: GrowthStrategy,

    // Disk radius (used if strategy == Round)
    #[serde(default)]
    pub radius: Option<u32>,

    // Target pixels per cell (used if strategy == Dla)
    #[serde(default)]
    pub volume: Option<usize>,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

// Output settings, loaded from the [output] table
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub base_filename: String,
    pub format: Option<String>, // Output format: "json", "bincode", "messagepack"
    #[serde(default)]
    pub save_seeds: bool,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        GrowthConfig {
            strategy: GrowthStrategy::None,
            radius: None,
            volume: None,
            max_steps: default_max_steps(),
        }
    }
}

// Full initializer configuration, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct InitConfig {
    pub grid: GridConfig,
    pub seeding: SeedingConfig,
    #[serde(default)]
    pub growth: GrowthConfig,
    pub output: OutputConfig,
}

impl InitConfig {
    /// Loads the initializer configuration from a TOML file.
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
        let config: InitConfig = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the parameter ranges the seeder and growers rely on.
    pub fn validate(&self) -> Result<(), InitError> {
        validate_seeding(
            self.grid.width,
            self.grid.height,
            self.seeding.pad,
            self.seeding.min_distance,
            self.seeding.max_attempts_per_seed,
        )?;

        match self.growth.strategy {
            GrowthStrategy::None => {}
            GrowthStrategy::Round => match self.growth.radius {
                Some(r) if r > 0 => {}
                _ => return Err(InitError::invalid("round growth needs a positive radius")),
            },
            GrowthStrategy::Dla => {
                let volume = match self.growth.volume {
                    Some(v) if v > 0 => v,
                    _ => return Err(InitError::invalid("DLA growth needs a positive volume")),
                };
                if volume.saturating_mul(self.seeding.num_cells) > self.grid.width * self.grid.height {
                    return Err(InitError::invalid(format!(
                        "{} cells of volume {} do not fit a {}x{} grid",
                        self.seeding.num_cells, volume, self.grid.width, self.grid.height
                    )));
                }
                if self.growth.max_steps == 0 {
                    return Err(InitError::invalid("max_steps must be greater than 0"));
                }
            }
        }

        if let Some(format) = self.output.format.as_deref() {
            if !matches!(format, "json" | "bincode" | "messagepack") {
                return Err(InitError::invalid(format!("unknown output format '{}'", format)));
            }
        }

        Ok(())
    }
}

/// Shared range checks for seeding parameters.
pub fn validate_seeding(
    width: usize,
    height: usize,
    pad: usize,
    min_distance: u32,
    max_attempts_per_seed: usize,
) -> Result<(), InitError> {
    if width == 0 || height == 0 {
        return Err(InitError::invalid(format!(
            "grid dimensions must be positive, got {}x{}",
            width, height
        )));
    }
    if 2 * pad >= width || 2 * pad >= height {
        return Err(InitError::invalid(format!(
            "pad {} leaves no interior on a {}x{} grid",
            pad, width, height
        )));
    }
    if min_distance > 0 && max_attempts_per_seed == 0 {
        return Err(InitError::invalid("max_attempts_per_seed must be greater than 0"));
    }
    Ok(())
}

fn default_pad() -> usize {
    10
}

fn default_max_attempts_per_seed() -> usize {
    1000
}

fn default_strategy() -> GrowthStrategy {
    GrowthStrategy::None
}

fn default_max_steps() -> usize {
    100_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const ROUND_CONFIG: &str = r#"
        [grid]
        width = 100
        height = 100

        [seeding]
        num_cells = 25
        pad = 10
        min_distance = 10
        rng_seed = 42

        [growth]
        strategy = "round"
        radius = 5

        [output]
        base_filename = "cells_round"
        format = "json"
        save_seeds = true
    "#;

    #[test]
    fn test_parse_round_config() {
        let config = InitConfig::from_toml_str(ROUND_CONFIG).unwrap();
        assert_eq!(config.grid.width, 100);
        assert_eq!(config.seeding.min_distance, 10);
        assert_eq!(config.seeding.max_attempts_per_seed, 1000);
        assert!(!config.seeding.allow_partial_placement);
        assert_eq!(config.growth.strategy, GrowthStrategy::Round);
        assert_eq!(config.growth.radius, Some(5));
        assert_eq!(config.growth.max_steps, 100_000);
    }

    #[test]
    fn test_defaults_when_growth_missing() {
        let config = InitConfig::from_toml_str(
            r#"
            [grid]
            width = 30
            height = 20
            [seeding]
            num_cells = 3
            rng_seed = 1
            [output]
            base_filename = "seeds"
            "#,
        )
        .unwrap();
        assert_eq!(config.seeding.pad, 10);
        assert_eq!(config.seeding.min_distance, 0);
        assert_eq!(config.growth.strategy, GrowthStrategy::None);
        assert!(config.output.format.is_none());
    }

    #[test]
    fn test_pad_too_large_is_rejected() {
        let err = validate_seeding(20, 50, 10, 0, 1000).unwrap_err();
        assert!(matches!(err, InitError::InvalidConfiguration(_)));
        assert!(validate_seeding(21, 50, 10, 0, 1000).is_ok());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(validate_seeding(0, 10, 0, 0, 1).is_err());
        assert!(validate_seeding(10, 0, 0, 0, 1).is_err());
    }

    #[test]
    fn test_round_without_radius_rejected() {
        let toml = ROUND_CONFIG.replace("radius = 5", "radius = 0");
        assert!(InitConfig::from_toml_str(&toml).is_err());
    }

    #[test]
    fn test_dla_volume_must_fit_grid() {
        let toml = ROUND_CONFIG
            .replace("strategy = \"round\"", "strategy = \"dla\"")
            .replace("radius = 5", "volume = 500");
        // 25 * 500 > 100 * 100
        assert!(InitConfig::from_toml_str(&toml).is_err());
        let toml = toml.replace("volume = 500", "volume = 80");
        let config = InitConfig::from_toml_str(&toml).unwrap();
        assert_eq!(config.growth.volume, Some(80));
    }

    #[test]
    fn test_unknown_format_rejected() {
        let toml = ROUND_CONFIG.replace("format = \"json\"", "format = \"yaml\"");
        assert!(InitConfig::from_toml_str(&toml).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), ROUND_CONFIG).unwrap();
        let config = InitConfig::load(temp_file.path()).unwrap();
        assert_eq!(config.output.base_filename, "cells_round");
    }

    #[test]
    fn test_missing_config_file() {
        assert!(InitConfig::load(Path::new("/nonexistent/path/config.toml")).is_err());
    }
}
