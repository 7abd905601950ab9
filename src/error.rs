// filepath: src/error.rs
//! Error types for the overlay
//!
//! Start-up failures are split by how the caller reacts: a surface error
//! stops the overlay, an input error only leaves it non-interactive.

use std::{fmt, io, path::PathBuf};

#[derive(Debug)]
pub enum SurfaceError {
    Open { path: PathBuf, source: io::Error },
    Query { path: PathBuf, source: nix::Error },
    UnsupportedFormat { bits_per_pixel: u32 },
    Geometry { reason: String },
    Map { path: PathBuf, source: io::Error },
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "failed to open framebuffer {}: {source}", path.display())
            }
            Self::Query { path, source } => {
                write!(f, "failed to read fb info from {}: {source}", path.display())
            }
            Self::UnsupportedFormat { bits_per_pixel } => {
                write!(f, "unsupported pixel format: {bits_per_pixel} bpp")
            }
            Self::Geometry { reason } => write!(f, "inconsistent framebuffer geometry: {reason}"),
            Self::Map { path, source } => {
                write!(f, "failed to mmap framebuffer {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for SurfaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Map { source, .. } => Some(source),
            Self::Query { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum InputError {
    Namespace { path: PathBuf, source: io::Error },
    NoDevices { path: PathBuf },
    EventLoop(String),
    Spawn(io::Error),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Namespace { path, source } => {
                write!(f, "failed to open {}: {source}", path.display())
            }
            Self::NoDevices { path } => {
                write!(f, "no touch-capable devices found in {}", path.display())
            }
            Self::EventLoop(msg) => write!(f, "input event loop setup failed: {msg}"),
            Self::Spawn(err) => write!(f, "failed to spawn input thread: {err}"),
        }
    }
}

impl std::error::Error for InputError {}

#[derive(Debug)]
pub enum TargetError {
    NotRunning { package: String, attempts: u32 },
}

impl fmt::Display for TargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRunning { package, attempts } => {
                write!(f, "process {package} not found after {attempts} attempts")
            }
        }
    }
}

impl std::error::Error for TargetError {}
