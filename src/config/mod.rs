mod cli;
mod file;

pub use cli::{Cli, Command};

use std::time::Duration;

use evdevil::event::Key;

use crate::error::Error;
use crate::geometry::Percentages;
use crate::input::relative::DEFAULT_TAP_MS;
use crate::input::RelativeSettings;
use crate::mode::Mode;
use crate::report;

use file::FileConfig;

/// Merged configuration from CLI args and TOML file.
#[derive(Debug, Clone)]
pub struct Config {
    pub device: String,
    pub by_name: bool,
    pub percentages: Percentages,
    pub sidekey: Option<u16>,
    pub mode: Mode,
    pub scale: f64,
    pub tap_ms: u64,
    pub grab: bool,
    pub queue_capacity: usize,
}

impl Config {
    /// Load configuration by merging TOML file with CLI overrides.
    pub fn load(cli: &Cli) -> Result<Self, Error> {
        let file_config = cli
            .config
            .as_ref()
            .and_then(|p| file::load_from_path(p))
            .or_else(file::load_from_default_paths)
            .unwrap_or_default();

        Self::merge(cli, file_config)
    }

    fn merge(cli: &Cli, file_config: FileConfig) -> Result<Self, Error> {
        let device = cli
            .device
            .clone()
            .or(file_config.device)
            .ok_or_else(|| Error::Config("no touchscreen given, see --help".into()))?;

        let percentages = match cli.dimensions.as_deref().or(file_config.dimensions.as_deref()) {
            Some(s) => s.parse::<Percentages>().map_err(Error::Config)?,
            None => Percentages::default(),
        };

        let config = Self {
            device,
            by_name: cli.by_name_flag().unwrap_or(file_config.by_name),
            percentages,
            sidekey: cli.sidekey.or(file_config.sidekey),
            mode: cli.mode.unwrap_or(file_config.mode),
            scale: cli.scale.or(file_config.scale).unwrap_or(1.0),
            tap_ms: cli.tap_ms.or(file_config.tap_ms).unwrap_or(DEFAULT_TAP_MS),
            grab: cli.grab_flag().unwrap_or(file_config.grab),
            queue_capacity: cli
                .queue_capacity
                .or(file_config.queue_capacity)
                .unwrap_or(report::DEFAULT_CAPACITY),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.percentages.validate()?;
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(Error::Config(format!(
                "scale must be a positive number, got {}",
                self.scale
            )));
        }
        if self.tap_ms == 0 {
            return Err(Error::Config("tap-ms must be greater than 0".into()));
        }
        if self.queue_capacity == 0 {
            return Err(Error::Config("queue-capacity must be at least 1".into()));
        }
        Ok(())
    }

    pub fn sidekey(&self) -> Option<Key> {
        self.sidekey.map(Key::from_raw)
    }

    pub fn relative_settings(&self) -> RelativeSettings {
        RelativeSettings {
            scale: self.scale,
            tap: Duration::from_millis(self.tap_ms),
        }
    }
}
