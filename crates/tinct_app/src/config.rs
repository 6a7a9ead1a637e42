//! Tinct configuration file handling

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use tinct_bench::StressConfig;
use tinct_theme::{default_theme, validate_partial, ApplyOrder, PartialTheme, SimulatedThemeApi, Theme};

/// File looked up in the working directory when no `--config` is given
pub const CONFIG_FILE_NAME: &str = "tinct.toml";

/// Top-level Tinct configuration (tinct.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TinctConfig {
    /// Overrides applied on top of the built-in default theme
    #[serde(default)]
    pub theme: PartialTheme,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub bench: BenchConfig,
}

/// Simulated theme endpoint
#[derive(Debug, Deserialize, Serialize)]
pub struct FetchConfig {
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Theme names whose requests fail
    #[serde(default)]
    pub fail: Vec<String>,
    #[serde(default)]
    pub order: ApplyOrder,
}

fn default_delay_ms() -> u64 {
    1500
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            fail: Vec::new(),
            order: ApplyOrder::default(),
        }
    }
}

impl FetchConfig {
    pub fn api(&self) -> SimulatedThemeApi {
        self.fail.iter().fold(
            SimulatedThemeApi::new(Duration::from_millis(self.delay_ms)),
            |api, name| api.with_failure(name.as_str()),
        )
    }
}

/// Benchmark timing
#[derive(Debug, Deserialize, Serialize)]
pub struct BenchConfig {
    #[serde(default = "default_stress_duration_ms")]
    pub stress_duration_ms: u64,
    #[serde(default = "default_stress_interval_ms")]
    pub stress_interval_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Single tests issued by a non-stress run
    #[serde(default = "default_samples")]
    pub samples: usize,
    /// Fixed seed for preset selection
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_stress_duration_ms() -> u64 {
    5000
}

fn default_stress_interval_ms() -> u64 {
    100
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_samples() -> usize {
    20
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            stress_duration_ms: default_stress_duration_ms(),
            stress_interval_ms: default_stress_interval_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            samples: default_samples(),
            seed: None,
        }
    }
}

impl BenchConfig {
    pub fn stress(&self) -> StressConfig {
        StressConfig {
            duration: Duration::from_millis(self.stress_duration_ms),
            interval: Duration::from_millis(self.stress_interval_ms),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl TinctConfig {
    /// Load `path`, or `tinct.toml` in the working directory if present,
    /// falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => {
                let local = Path::new(CONFIG_FILE_NAME);
                if local.is_file() {
                    Self::load_from_file(local)
                } else {
                    tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config file {} not found", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: TinctConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        validate_partial(&self.theme)?;
        if self.bench.stress_interval_ms == 0 {
            bail!("bench.stress_interval_ms must be greater than zero");
        }
        if self.bench.poll_interval_ms == 0 {
            bail!("bench.poll_interval_ms must be greater than zero");
        }
        Ok(())
    }

    /// The built-in default theme with `[theme]` overrides merged in
    pub fn default_theme(&self) -> Result<Theme> {
        let patch = validate_partial(&self.theme)?;
        Ok(default_theme().merge(&patch))
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
