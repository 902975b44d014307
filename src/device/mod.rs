pub mod sink;
mod uinput;

use std::fs::File;
use std::os::fd::AsFd;
use std::path::{Path, PathBuf};

use evdevil::event::{Abs, EventType};
use evdevil::Evdev;

use crate::error::Error;
use crate::geometry::ScreenGeometry;

pub use uinput::{create_pointer, create_sidekey, create_trackpad};

const INPUT_DIR: &str = "/dev/input";

/// Used when the touchscreen has no ABS_PRESSURE axis.
const FALLBACK_PRESSURE_MAX: i32 = 255;

/// A touchscreen candidate found by scanning `/dev/input`.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: PathBuf,
    pub name: String,
}

/// The touchscreen being read. The handle is closed (and any grab released)
/// when this is dropped.
pub struct Touchscreen {
    evdev: Evdev,
    path: PathBuf,
    name: String,
}

impl Touchscreen {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let evdev = Evdev::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let name = evdev.name().unwrap_or_else(|_| "unknown".into());
        log::info!("Opened {} ({})", path.display(), name);
        Ok(Self {
            evdev,
            path: path.to_path_buf(),
            name,
        })
    }

    /// First device in `/dev/input` whose name matches and that looks like
    /// a multitouch screen.
    pub fn find_by_name(name: &str) -> Result<Self, Error> {
        for (path, evdev) in scan_event_nodes() {
            let device_name = match evdev.name() {
                Ok(n) => n,
                Err(e) => {
                    log::debug!("Could not get name for {}: {}", path.display(), e);
                    continue;
                }
            };
            if device_name != name {
                log::debug!("Skip '{}' != '{}'", device_name, name);
                continue;
            }
            if !is_touchscreen(&evdev) {
                log::debug!("Skip {}, missing EV_ABS or ABS_MT_POSITION_Y", path.display());
                continue;
            }
            log::info!("Found {} matching '{}'", path.display(), name);
            return Ok(Self {
                evdev,
                path,
                name: device_name,
            });
        }
        Err(Error::NotFound(name.to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exclusive grab. Failure is not fatal: the device is then shared with
    /// other readers.
    pub fn grab(&self) -> bool {
        match self.evdev.grab() {
            Ok(()) => {
                log::debug!("Grabbed {} exclusively", self.path.display());
                true
            }
            Err(e) => {
                log::warn!("Failed to grab {} exclusively: {}", self.path.display(), e);
                false
            }
        }
    }

    pub fn geometry(&self) -> Result<ScreenGeometry, Error> {
        let x = self.evdev.abs_info(Abs::X).map_err(Error::probe("X axis"))?;
        let y = self.evdev.abs_info(Abs::Y).map_err(Error::probe("Y axis"))?;
        let (pressure_min, pressure_max) = match self.evdev.abs_info(Abs::PRESSURE) {
            Ok(p) => (p.minimum(), p.maximum()),
            Err(e) => {
                log::warn!(
                    "No pressure axis on {} ({}), assuming 0 - {}",
                    self.path.display(),
                    e,
                    FALLBACK_PRESSURE_MAX
                );
                (0, FALLBACK_PRESSURE_MAX)
            }
        };

        let geometry = ScreenGeometry {
            min_x: x.minimum(),
            max_x: x.maximum(),
            min_y: y.minimum(),
            max_y: y.maximum(),
            resolution_x: x.resolution(),
            resolution_y: y.resolution(),
            pressure_min,
            pressure_max,
        };
        log::info!(
            "Touchscreen X [{} - {}], Y [{} - {}], Pressure [{} - {}]",
            geometry.min_x,
            geometry.max_x,
            geometry.min_y,
            geometry.max_y,
            geometry.pressure_min,
            geometry.pressure_max
        );
        Ok(geometry)
    }

    /// Blocking reader over the same open file description, so the grab
    /// applies to it.
    pub fn reader(&self) -> Result<File, Error> {
        let fd = self
            .evdev
            .as_fd()
            .try_clone_to_owned()
            .map_err(|source| Error::Open {
                path: self.path.clone(),
                source,
            })?;
        Ok(File::from(fd))
    }
}

/// Absolute events plus a multitouch Y axis.
pub fn is_touchscreen(evdev: &Evdev) -> bool {
    let has_abs = evdev
        .supported_events()
        .map(|ev| ev.contains(EventType::ABS))
        .unwrap_or(false);
    let has_mt = evdev
        .supported_abs_axes()
        .map(|axes| axes.contains(Abs::MT_POSITION_Y))
        .unwrap_or(false);
    has_abs && has_mt
}

/// Every touchscreen-like device under `/dev/input`.
pub fn discover_touchscreens() -> Vec<DeviceInfo> {
    scan_event_nodes()
        .filter(|(_, evdev)| is_touchscreen(evdev))
        .map(|(path, evdev)| DeviceInfo {
            name: evdev.name().unwrap_or_else(|_| "unknown".into()),
            path,
        })
        .collect()
}

fn scan_event_nodes() -> impl Iterator<Item = (PathBuf, Evdev)> {
    let mut paths: Vec<PathBuf> = match std::fs::read_dir(INPUT_DIR) {
        Ok(rd) => rd
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|s| s.to_str())
                    .is_some_and(|s| s.starts_with("event"))
            })
            .collect(),
        Err(e) => {
            log::warn!("Cannot read {}: {}", INPUT_DIR, e);
            Vec::new()
        }
    };
    paths.sort();

    paths.into_iter().filter_map(|p| match Evdev::open(&p) {
        Ok(evdev) => Some((p, evdev)),
        Err(e) => {
            log::debug!("Cannot open {}: {}", p.display(), e);
            None
        }
    })
}
