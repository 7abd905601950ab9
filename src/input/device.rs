// filepath: src/input/device.rs
//! Touch device discovery
//!
//! A device qualifies when it reports absolute positions and has calibrated
//! ranges for both multi-touch position axes.

use std::{
    fs, io,
    os::fd::AsRawFd,
    path::{Path, PathBuf},
};

use evdev::{AbsoluteAxisCode, Device, EventType};
use log::{debug, info, warn};
use nix::fcntl::{fcntl, FcntlArg, OFlag};

use super::decoder::{AxisRange, DeviceCalibration};
use crate::error::InputError;

pub struct TouchDevice {
    pub path: PathBuf,
    pub calibration: DeviceCalibration,
    pub device: Device,
}

fn is_event_node(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("event"))
}

/// Open every qualifying `event*` node under `dir`, sorted by path
pub fn enumerate_touch_devices(dir: &Path) -> Result<Vec<TouchDevice>, InputError> {
    let entries = fs::read_dir(dir).map_err(|source| InputError::Namespace {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_event_node(path))
        .collect();
    paths.sort();

    let mut devices = Vec::new();
    for path in paths {
        match open_touch_device(&path) {
            Ok(Some(device)) => {
                let c = &device.calibration;
                info!(
                    "Using input {} (name={}) with ranges X[{},{}] Y[{},{}]",
                    path.display(),
                    c.name,
                    c.x.min,
                    c.x.max,
                    c.y.min,
                    c.y.max
                );
                devices.push(device);
            }
            Ok(None) => debug!("Skipping {}: no multi-touch position axes", path.display()),
            Err(e) => warn!("Failed to open {}: {e}", path.display()),
        }
    }
    Ok(devices)
}

fn open_touch_device(path: &Path) -> io::Result<Option<TouchDevice>> {
    let device = Device::open(path)?;
    if !device.supported_events().contains(EventType::ABSOLUTE) {
        return Ok(None);
    }
    let has_axes = device.supported_absolute_axes().is_some_and(|axes| {
        axes.contains(AbsoluteAxisCode::ABS_MT_POSITION_X)
            && axes.contains(AbsoluteAxisCode::ABS_MT_POSITION_Y)
    });
    if !has_axes {
        return Ok(None);
    }

    let mut x = None;
    let mut y = None;
    for (code, info) in device.get_absinfo()? {
        let range = AxisRange {
            min: info.minimum(),
            max: info.maximum(),
        };
        if code == AbsoluteAxisCode::ABS_MT_POSITION_X {
            x = Some(range);
        } else if code == AbsoluteAxisCode::ABS_MT_POSITION_Y {
            y = Some(range);
        }
    }
    let (Some(x), Some(y)) = (x, y) else {
        return Ok(None);
    };

    set_nonblocking(&device)?;
    let name = device.name().unwrap_or("unknown").to_string();
    Ok(Some(TouchDevice {
        path: path.to_path_buf(),
        calibration: DeviceCalibration { name, x, y },
        device,
    }))
}

fn set_nonblocking(device: &Device) -> io::Result<()> {
    let fd = device.as_raw_fd();
    let flags = OFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFL)?);
    fcntl(fd, FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK))?;
    Ok(())
}
