//! How touches in the region are turned into pointer input.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Forward the multitouch stream as an absolute trackpad.
    #[default]
    Absolute,
    /// Drive a relative mouse from the primary finger, taps click.
    Relative,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Absolute => write!(f, "absolute"),
            Mode::Relative => write!(f, "relative"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "absolute" | "abs" | "trackpad" => Ok(Mode::Absolute),
            "relative" | "rel" | "mouse" => Ok(Mode::Relative),
            _ => Err(format!(
                "Invalid mode '{}'. Valid values: absolute, relative",
                s
            )),
        }
    }
}
