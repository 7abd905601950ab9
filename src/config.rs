// filepath: src/config.rs
//! Configuration handling for touch-overlay
//!
//! This file defines the configuration structure and provides
//! functionality to load and save configuration from/to files.
//! Every section falls back to its defaults when absent.

use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

/// Menu size and docking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MenuConfig {
    pub width: u32,
    pub height: u32,
    /// Distance from the top and right edges when docked
    pub margin: i32,
    /// Keep the menu on screen when a center tap opens it
    pub clamp_on_open: bool,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            width: 240,
            height: 100,
            margin: 28,
            clamp_on_open: true,
        }
    }
}

/// Touch device discovery and gesture thresholds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    pub device_dir: PathBuf,
    /// Max displacement (screen pixels) for a contact to count as a tap
    pub move_threshold: i32,
    pub poll_timeout_ms: u64,
    pub idle_sleep_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            device_dir: PathBuf::from("/dev/input"),
            move_threshold: 18,
            poll_timeout_ms: 50,
            idle_sleep_ms: 200,
        }
    }
}

impl InputConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn idle_sleep(&self) -> Duration {
        Duration::from_millis(self.idle_sleep_ms)
    }
}

/// Colors are RGBA; the alpha byte is the blend factor used when drawing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StyleConfig {
    pub loader: [u8; 4],
    pub loader_text: [u8; 4],
    pub menu: [u8; 4],
    pub menu_dragging: [u8; 4],
    pub title_text: [u8; 4],
    pub hint_text: [u8; 4],
    pub loader_label: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            loader: [0x2E, 0xCC, 0x71, 180],
            loader_text: [0x0B, 0x0C, 0x10, 255],
            menu: [0x9B, 0x59, 0xB6, 210],
            menu_dragging: [0x34, 0x98, 0xDB, 210],
            title_text: [0xFF, 0xFF, 0xFF, 255],
            hint_text: [0xEC, 0xEC, 0xEC, 230],
            loader_label: "MENU_LOADER".to_string(),
        }
    }
}

/// Process the overlay is attached to before it starts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TargetConfig {
    pub package: Option<String>,
    pub activity: String,
    pub attach_attempts: u32,
    pub retry_delay_secs: u64,
    pub title_symbol: String,
    pub proc_root: PathBuf,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            package: None,
            activity: ".MainActivity".to_string(),
            attach_attempts: 3,
            retry_delay_secs: 5,
            title_symbol: "kOverlayTitle".to_string(),
            proc_root: PathBuf::from("/proc"),
        }
    }
}

/// Configuration for the overlay appearance and behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OverlayConfig {
    pub title: String,
    pub framebuffer: PathBuf,
    pub toggle_signal: String,
    pub frame_interval_ms: u64,
    pub menu: MenuConfig,
    pub input: InputConfig,
    pub style: StyleConfig,
    pub target: TargetConfig,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            title: "Game Overlay".to_string(),
            framebuffer: PathBuf::from("/dev/graphics/fb0"),
            toggle_signal: "SIGUSR1".to_string(),
            frame_interval_ms: 16,
            menu: MenuConfig::default(),
            input: InputConfig::default(),
            style: StyleConfig::default(),
            target: TargetConfig::default(),
        }
    }
}

impl OverlayConfig {
    /// Get the path to the configuration file
    pub fn get_config_path() -> PathBuf {
        let config_dir = if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("touch-overlay")
        } else {
            PathBuf::from(".config/touch-overlay")
        };

        config_dir.join("config.toml")
    }

    /// Load configuration from the default location
    pub fn load_from_file() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_from(&Self::get_config_path())
    }

    /// Load configuration from `path`, writing defaults there if it is missing
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let config: Self = toml::from_str(&content)?;
                Ok(config)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let default_config = Self::default();
                default_config.save_to(path)?;
                Ok(default_config)
            }
            Err(e) => Err(Box::new(e)),
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !Path::exists(parent) {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = OverlayConfig::load_from(&path).unwrap();
        assert_eq!(config, OverlayConfig::default());
        assert!(path.exists());

        let reloaded = OverlayConfig::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "title = \"Raid Helper\"\n\n[menu]\nwidth = 300\n\n[input]\nmove_threshold = 30\n",
        )
        .unwrap();

        let config = OverlayConfig::load_from(&path).unwrap();
        assert_eq!(config.title, "Raid Helper");
        assert_eq!(config.menu.width, 300);
        assert_eq!(config.menu.height, 100);
        assert_eq!(config.menu.margin, 28);
        assert_eq!(config.input.move_threshold, 30);
        assert_eq!(config.input.poll_timeout(), Duration::from_millis(50));
        assert_eq!(config.style, StyleConfig::default());
        assert!(config.target.package.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "menu = 12\n").unwrap();

        assert!(OverlayConfig::load_from(&path).is_err());
    }
}
