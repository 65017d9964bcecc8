use eyre::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub run: RunConfig,
    pub cycles: Vec<CycleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// How long `run` lets the cycles go before killing them, in clock seconds
    pub duration_secs: f32,
    /// Clock speed relative to real time
    pub speed: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration_secs: 8.0,
            speed: 1.0,
        }
    }
}

/// One cycle to spawn, plus optional scripted control changes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    pub name: String,
    pub interval_secs: f32,
    pub playable: bool,
    pub pause_at_secs: Option<f32>,
    pub resume_at_secs: Option<f32>,
    pub retime_at_secs: Option<f32>,
    pub retime_interval_secs: Option<f32>,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            name: "cycle".to_string(),
            interval_secs: 1.0,
            playable: true,
            pause_at_secs: None,
            resume_at_secs: None,
            retime_at_secs: None,
            retime_interval_secs: None,
        }
    }
}

impl CycleConfig {
    pub fn interval(&self) -> Result<Duration> {
        cycler::interval_from_secs(self.interval_secs)
            .context(format!("Invalid interval for cycle '{}'", self.name))
    }

    /// Scheduled retime as (when, new interval)
    pub fn retime(&self) -> Result<Option<(Duration, Duration)>> {
        match (self.retime_at_secs, self.retime_interval_secs) {
            (None, None) => Ok(None),
            (Some(at), Some(interval)) => {
                let at = offset(at).context(format!("Invalid retime_at_secs for cycle '{}'", self.name))?;
                let interval = cycler::interval_from_secs(interval)
                    .context(format!("Invalid retime_interval_secs for cycle '{}'", self.name))?;
                Ok(Some((at, interval)))
            }
            _ => bail!(
                "Cycle '{}' must set both retime_at_secs and retime_interval_secs",
                self.name
            ),
        }
    }
}

/// Convert a non-negative offset in seconds
pub fn offset(secs: f32) -> Result<Duration> {
    Duration::try_from_secs_f32(secs).context(format!("{} is not a valid offset in seconds", secs))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            run: RunConfig::default(),
            cycles: vec![
                CycleConfig {
                    name: "spawner".to_string(),
                    interval_secs: 1.0,
                    ..CycleConfig::default()
                },
                CycleConfig {
                    name: "pulse".to_string(),
                    interval_secs: 2.0,
                    pause_at_secs: Some(3.0),
                    resume_at_secs: Some(5.0),
                    ..CycleConfig::default()
                },
            ],
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {:#}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {:#}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Check everything `run` will need before any cycle is spawned
    pub fn validate(&self) -> Result<()> {
        if !(self.run.duration_secs.is_finite() && self.run.duration_secs > 0.0) {
            bail!("run.duration_secs must be positive, got {}", self.run.duration_secs);
        }
        cycler::ScaledClock::new(self.run.speed).context("Invalid run.speed")?;

        let mut names = HashSet::new();
        for cycle in &self.cycles {
            if !names.insert(cycle.name.as_str()) {
                bail!("Duplicate cycle name '{}'", cycle.name);
            }
            cycle.interval()?;
            cycle.retime()?;
            for at in [cycle.pause_at_secs, cycle.resume_at_secs].into_iter().flatten() {
                offset(at).context(format!("Invalid pause/resume time for cycle '{}'", cycle.name))?;
            }
        }
        Ok(())
    }
}
