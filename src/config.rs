use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::{Error, Result, DEFAULT_STEP_DELAY_MS};

/// Visualizer settings, read from TOML. Every section and key is optional.
///
/// ```toml
/// [grid]
/// rows = 20
/// cols = 20
/// min_size = 5
/// max_size = 25
///
/// [search]
/// step_delay_ms = 50
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_size")]
    pub rows: usize,
    #[serde(default = "default_size")]
    pub cols: usize,
    /// Smallest dimension accepted when resizing through the [Visualizer](crate::Visualizer).
    #[serde(default = "default_min_size")]
    pub min_size: usize,
    #[serde(default = "default_max_size")]
    pub max_size: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SearchConfig {
    /// Clamped to [MIN_STEP_DELAY_MS](crate::MIN_STEP_DELAY_MS)..=[MAX_STEP_DELAY_MS](crate::MAX_STEP_DELAY_MS) on use.
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
}

fn default_size() -> usize {
    20
}
fn default_min_size() -> usize {
    5
}
fn default_max_size() -> usize {
    25
}
fn default_step_delay_ms() -> u64 {
    DEFAULT_STEP_DELAY_MS
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            rows: default_size(),
            cols: default_size(),
            min_size: default_min_size(),
            max_size: default_max_size(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            step_delay_ms: default_step_delay_ms(),
        }
    }
}

impl SearchConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

impl GridConfig {
    pub fn size_allowed(&self, rows: usize, cols: usize) -> bool {
        let range = self.min_size..=self.max_size;
        range.contains(&rows) && range.contains(&cols)
    }
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Config> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let contents = fs::read_to_string(path)?;
        Config::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        let grid = &self.grid;
        if grid.min_size == 0 || grid.min_size > grid.max_size {
            return Err(Error::Config(format!(
                "invalid size bounds {}..={}",
                grid.min_size, grid.max_size
            )));
        }
        if !grid.size_allowed(grid.rows, grid.cols) {
            return Err(Error::Config(format!(
                "default size {}x{} outside {}..={}",
                grid.rows, grid.cols, grid.min_size, grid.max_size
            )));
        }
        Ok(())
    }
}
