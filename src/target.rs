// filepath: src/target.rs
//! Target application lookup and title patching
//!
//! The overlay can optionally bind to a running game: find it by package
//! name in the proc filesystem, launch it through the activity manager when
//! it is missing, and hand its pid to a memory patcher.

use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
    thread,
    time::Duration,
};

use log::{error, info, warn};

use crate::error::TargetError;

pub struct TargetProcess {
    package: String,
    activity: String,
    proc_root: PathBuf,
    pid: Option<i32>,
}

impl TargetProcess {
    pub fn new(package: &str, activity: &str, proc_root: &Path) -> Self {
        Self {
            package: package.to_string(),
            activity: activity.to_string(),
            proc_root: proc_root.to_path_buf(),
            pid: None,
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn pid(&self) -> Option<i32> {
        self.pid
    }

    /// Lowest pid whose first cmdline argument is exactly `package`
    pub fn find(proc_root: &Path, package: &str) -> Option<i32> {
        let entries = match fs::read_dir(proc_root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read {}: {e}", proc_root.display());
                return None;
            }
        };

        let mut pids: Vec<i32> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
            .filter_map(|entry| entry.file_name().to_str()?.parse().ok())
            .collect();
        pids.sort_unstable();

        pids.into_iter().find(|pid| {
            fs::read(proc_root.join(pid.to_string()).join("cmdline"))
                .map(|cmdline| cmdline.split(|&b| b == 0).next() == Some(package.as_bytes()))
                .unwrap_or(false)
        })
    }

    /// Look the process up once, remembering the pid on success
    pub fn initialize(&mut self) -> bool {
        self.pid = Self::find(&self.proc_root, &self.package);
        match self.pid {
            Some(pid) => {
                info!("Found pid {pid} for {}", self.package);
                true
            }
            None => {
                info!("Process {} not running yet", self.package);
                false
            }
        }
    }

    pub fn launch(&self) -> bool {
        let component = format!("{}/{}", self.package, self.activity);
        match Command::new("am").args(["start", "-n", &component]).status() {
            Ok(status) if status.success() => true,
            Ok(status) => {
                warn!("Command failed ({status}): am start -n {component}");
                false
            }
            Err(e) => {
                warn!("Failed to run am start -n {component}: {e}");
                false
            }
        }
    }

    /// Up to `attempts` lookups, launching the app and waiting between them
    pub fn attach_with_retry(
        &mut self,
        attempts: u32,
        delay: Duration,
    ) -> Result<i32, TargetError> {
        for attempt in 0..attempts {
            if self.initialize() {
                if let Some(pid) = self.pid {
                    return Ok(pid);
                }
            }
            if attempt + 1 < attempts {
                self.launch();
                thread::sleep(delay);
            }
        }
        Err(TargetError::NotRunning {
            package: self.package.clone(),
            attempts,
        })
    }
}

/// Writes values into a target process by symbol name
pub trait MemoryPatcher {
    fn attach(&mut self, pid: i32) -> bool;
    fn write_string(&mut self, symbol: &str, value: &str) -> bool;
}

/// Patcher that records the requested writes in the log only
#[derive(Debug, Default)]
pub struct LoggingPatcher {
    pid: Option<i32>,
}

impl LoggingPatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attached_pid(&self) -> Option<i32> {
        self.pid
    }
}

impl MemoryPatcher for LoggingPatcher {
    fn attach(&mut self, pid: i32) -> bool {
        self.pid = Some(pid);
        info!("Attached to pid {pid}");
        true
    }

    fn write_string(&mut self, symbol: &str, value: &str) -> bool {
        let Some(pid) = self.pid else {
            error!("attach() must be called before patching");
            return false;
        };
        info!("Would patch symbol {symbol} in pid {pid} with text '{value}'");
        true
    }
}
