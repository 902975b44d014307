use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::mode::Mode;

const FILE_NAME: &str = "trackscreen.toml";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub device: Option<String>,
    #[serde(default)]
    pub by_name: bool,
    pub dimensions: Option<String>,
    pub sidekey: Option<u16>,
    #[serde(default)]
    pub mode: Mode,
    pub scale: Option<f64>,
    pub tap_ms: Option<u64>,
    #[serde(default = "default_true")]
    pub grab: bool,
    pub queue_capacity: Option<usize>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            device: None,
            by_name: false,
            dimensions: None,
            sidekey: None,
            mode: Mode::default(),
            scale: None,
            tap_ms: None,
            grab: true,
            queue_capacity: None,
        }
    }
}

fn default_true() -> bool {
    true
}

pub fn load_from_path(path: &Path) -> Option<FileConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => {
            log::debug!("Loaded config from {}", path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("Failed to parse {}: {}", path.display(), e);
            None
        }
    }
}

pub fn load_from_default_paths() -> Option<FileConfig> {
    default_config_paths()
        .into_iter()
        .filter(|p| p.exists())
        .find_map(|p| load_from_path(&p))
}

fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(FILE_NAME)];

    if let Ok(home) = std::env::var("HOME") {
        paths.push(PathBuf::from(home).join(".config").join(FILE_NAME));
    }

    paths
}
