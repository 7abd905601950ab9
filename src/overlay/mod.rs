// filepath: src/overlay/mod.rs
//! Main overlay logic for touch-overlay
//!
//! `MenuOverlay` owns the shared menu state, feeds it from the touch
//! listener and redraws it on a fixed cadence from its own render thread.

pub mod state;

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, error, info, warn};

use crate::config::OverlayConfig;
use crate::input::{TouchEvent, TouchListener};
use crate::surface::{RenderFrame, Surface};
use crate::toggle::ToggleSwitch;
use state::{OverlayState, ScreenLayout, Transition};

/// State shared by the input thread (writer) and the render thread (reader)
struct Shared {
    title: Arc<str>,
    layout: ScreenLayout,
    state: Mutex<OverlayState>,
    toggle: ToggleSwitch,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, OverlayState> {
        // Every critical section leaves the state consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle_touch(&self, ev: &TouchEvent) {
        let transitions = self.lock().apply(ev, &self.layout);
        for transition in transitions {
            match transition {
                Transition::Opened { x, y } => info!("Tap center -> open menu at {x},{y}"),
                Transition::Closed => info!("Tap menu -> close menu, reset to top-right"),
                Transition::DragStarted { offset_x, offset_y } => info!(
                    "Start dragging at {},{} offset {offset_x},{offset_y}",
                    ev.x, ev.y
                ),
                Transition::Dragged { x, y } => debug!("Dragging -> {x},{y}"),
                Transition::DragEnded { x, y } => info!("Stop dragging at {x},{y}"),
            }
        }
    }

    /// Apply any pending toggle, then copy the state out
    fn snapshot(&self) -> RenderFrame {
        let toggle = self.toggle.take();
        let (frame, open) = {
            let mut state = self.lock();
            if toggle {
                state.toggle();
            }
            let frame = RenderFrame {
                title: Arc::clone(&self.title),
                open: state.open,
                dragging: state.dragging,
                menu: state.geometry,
                screen_width: self.layout.screen_w as u32,
                screen_height: self.layout.screen_h as u32,
            };
            (frame, state.open)
        };
        if toggle {
            info!("Menu toggle -> {}", if open { "OPEN" } else { "CLOSED" });
        }
        frame
    }
}

struct RenderWorker<S> {
    running: Arc<AtomicBool>,
    handle: JoinHandle<S>,
}

pub struct MenuOverlay<S: Surface + 'static> {
    shared: Arc<Shared>,
    frame_interval: Duration,
    input: TouchListener,
    surface: Option<S>,
    render: Option<RenderWorker<S>>,
}

impl<S: Surface + 'static> MenuOverlay<S> {
    /// Build the overlay for an initialized surface; the menu starts docked and closed
    pub fn new(config: &OverlayConfig, surface: S, toggle: ToggleSwitch) -> Self {
        let layout = ScreenLayout {
            screen_w: surface.width() as i32,
            screen_h: surface.height() as i32,
            menu_w: config.menu.width,
            menu_h: config.menu.height,
            margin: config.menu.margin,
            clamp_on_open: config.menu.clamp_on_open,
        };
        info!(
            "Overlay initialized with screen {}x{} menu size {}x{}",
            layout.screen_w, layout.screen_h, layout.menu_w, layout.menu_h
        );
        Self {
            shared: Arc::new(Shared {
                title: Arc::from(config.title.as_str()),
                layout,
                state: Mutex::new(OverlayState::new(&layout)),
                toggle,
            }),
            frame_interval: config.frame_interval(),
            input: TouchListener::new(config.input.clone()),
            surface: Some(surface),
            render: None,
        }
    }

    pub fn layout(&self) -> ScreenLayout {
        self.shared.layout
    }

    /// Start the touch listener. On failure the overlay keeps rendering
    /// but ignores touches.
    pub fn start_input(&mut self) -> bool {
        let shared = Arc::clone(&self.shared);
        let started = self.input.start(
            self.shared.layout.screen_w,
            self.shared.layout.screen_h,
            Box::new(move |ev| shared.handle_touch(&ev)),
        );
        if !started {
            warn!("Input listener failed, overlay still continues");
        }
        started
    }

    pub fn handle_touch(&self, ev: &TouchEvent) {
        self.shared.handle_touch(ev);
    }

    pub fn request_toggle(&self) {
        self.shared.toggle.request();
    }

    pub fn state(&self) -> OverlayState {
        self.shared.lock().clone()
    }

    pub fn snapshot(&self) -> RenderFrame {
        self.shared.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.render.is_some()
    }

    /// Spawn the render loop; a second call is a no-op
    pub fn run(&mut self) -> std::io::Result<()> {
        if self.render.is_some() {
            return Ok(());
        }
        let Some(mut surface) = self.surface.take() else {
            return Ok(());
        };

        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);
        let shared = Arc::clone(&self.shared);
        let interval = self.frame_interval;
        let handle = thread::Builder::new()
            .name("overlay-render".to_string())
            .spawn(move || {
                while thread_running.load(Ordering::Acquire) {
                    let started = Instant::now();
                    surface.render_frame(&shared.snapshot());
                    thread::sleep(interval.saturating_sub(started.elapsed()));
                }
                surface
            })?;

        self.render = Some(RenderWorker { running, handle });
        info!("Render loop started at {}ms per frame", interval.as_millis());
        Ok(())
    }

    /// Stop both loops, then release the surface
    pub fn stop(&mut self) {
        if let Some(worker) = self.render.take() {
            worker.running.store(false, Ordering::Release);
            match worker.handle.join() {
                Ok(surface) => self.surface = Some(surface),
                Err(_) => error!("Render thread panicked"),
            }
        }
        self.input.stop();
        if let Some(surface) = self.surface.as_mut() {
            surface.shutdown();
        }
    }
}

impl<S: Surface + 'static> Drop for MenuOverlay<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
