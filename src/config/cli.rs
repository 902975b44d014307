use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::mode::Mode;

#[derive(Parser, Debug)]
#[command(name = "trackscreen")]
#[command(about = "Turn an area of a touchscreen into a virtual trackpad")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Touchscreen device path (e.g. /dev/input/event5), or its name with --by-name
    pub device: Option<String>,

    /// Trackpad area as left,top,width,height percentages of the screen [default: 33,67,33,33]
    #[arg(short = 'd', long, value_name = "L,T,W,H")]
    pub dimensions: Option<String>,

    /// Find the touchscreen by name instead of path
    #[arg(short = 'n', long, overrides_with = "by_path")]
    pub by_name: bool,

    /// Treat DEVICE as a path even if the config file sets by_name
    #[arg(long, overrides_with = "by_name")]
    pub by_path: bool,

    /// Key code sent while a finger rests beside the trackpad area
    #[arg(short = 'k', long, value_name = "CODE")]
    pub sidekey: Option<u16>,

    /// Translation mode (absolute, relative)
    #[arg(short = 'm', long, value_parser = clap::value_parser!(Mode))]
    pub mode: Option<Mode>,

    /// Relative mode: pointer units per touchscreen unit
    #[arg(short = 's', long)]
    pub scale: Option<f64>,

    /// Relative mode: touches shorter than this many milliseconds click
    #[arg(long)]
    pub tap_ms: Option<u64>,

    /// Grab the touchscreen exclusively even if the config file disables it
    #[arg(long, overrides_with = "no_grab")]
    pub grab: bool,

    /// Do not grab the touchscreen exclusively
    #[arg(long, overrides_with = "grab")]
    pub no_grab: bool,

    /// Maximum events buffered per input report
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Path to config file
    #[arg(short = 'c', long, env = "TRACKSCREEN_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// `None` unless `--by-name` or `--by-path` was given.
    pub fn by_name_flag(&self) -> Option<bool> {
        flag_pair(self.by_name, self.by_path)
    }

    /// `None` unless `--grab` or `--no-grab` was given.
    pub fn grab_flag(&self) -> Option<bool> {
        flag_pair(self.grab, self.no_grab)
    }
}

// The pairs override each other, so at most one side is set.
fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print raw input events from a touchscreen
    Dump {
        /// Device path, or name with --by-name
        device: String,

        /// Find the device by name instead of path
        #[arg(short = 'n', long)]
        by_name: bool,
    },
    /// List devices that can be used as a touchscreen
    List,
}
