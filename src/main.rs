// filepath: src/main.rs

use std::{env, path::PathBuf, thread, time::Duration};

use log::{error, info, warn};
use touch_overlay::{
    config::OverlayConfig,
    framebuffer::Framebuffer,
    overlay::MenuOverlay,
    target::{LoggingPatcher, MemoryPatcher, TargetProcess},
    toggle::{install_shutdown_handler, install_toggle_handler, ToggleSwitch},
};

fn load_config() -> OverlayConfig {
    let loaded = match env::args().nth(1) {
        Some(path) => OverlayConfig::load_from(&PathBuf::from(path)),
        None => OverlayConfig::load_from_file(),
    };
    loaded.unwrap_or_else(|e| {
        warn!("Failed to load configuration, using defaults: {e}");
        OverlayConfig::default()
    })
}

fn attach_target(config: &OverlayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let Some(package) = config.target.package.as_deref() else {
        return Ok(());
    };
    let target_config = &config.target;
    let mut target = TargetProcess::new(package, &target_config.activity, &target_config.proc_root);
    let pid = target.attach_with_retry(
        target_config.attach_attempts,
        Duration::from_secs(target_config.retry_delay_secs),
    )?;

    let mut patcher = LoggingPatcher::new();
    if patcher.attach(pid) && !patcher.write_string(&target_config.title_symbol, &config.title) {
        warn!("Title patch for {} was rejected", target.package());
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting touch-overlay");

    let config = load_config();
    info!("Configuration loaded");

    if let Err(e) = attach_target(&config) {
        error!("Failed to attach to game process: {e}");
        return Err(e);
    }

    let surface = match Framebuffer::open(&config.framebuffer, config.style.clone()) {
        Ok(surface) => surface,
        Err(e) => {
            error!("Overlay init failed: {e}");
            return Err(e.into());
        }
    };

    let toggle = install_toggle_handler(&config.toggle_signal).unwrap_or_else(|e| {
        warn!(
            "Failed to install {} handler, menu toggle disabled: {e}",
            config.toggle_signal
        );
        ToggleSwitch::new()
    });
    let shutdown = install_shutdown_handler()?;

    let mut overlay = MenuOverlay::new(&config, surface, toggle);
    overlay.start_input();
    overlay.run()?;

    info!("Entering main loop");
    while !shutdown.requested() {
        thread::sleep(Duration::from_millis(200));
    }

    overlay.stop();
    info!("Overlay shutdown");
    Ok(())
}
