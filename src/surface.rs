// filepath: src/surface.rs
//! Composition of overlay frames onto a shared pixel buffer
//!
//! The live buffer belongs to someone else (the foreground app keeps drawing
//! into it), so a frame is composed in a private scratch copy and written
//! back in one pass.

use std::sync::Arc;

use crate::config::StyleConfig;
use crate::draw::Canvas;
use crate::overlay::state::MenuGeometry;
use crate::pixel::PixelFormat;

/// Inset of the docked loader from the top and right edges
pub const LOADER_INSET: i32 = 20;
const LOADER_LABEL_OFFSET: i32 = 8;

const HINT_DRAG: &str = "DRAG TO MOVE";
const HINT_CLOSE: &str = "TAP LABEL TO CLOSE";

/// Immutable snapshot handed to the surface once per render tick
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub title: Arc<str>,
    pub open: bool,
    pub dragging: bool,
    pub menu: MenuGeometry,
    pub screen_width: u32,
    pub screen_height: u32,
}

impl RenderFrame {
    /// The always-visible loader, docked top-right with the menu's size
    pub fn loader_rect(&self) -> MenuGeometry {
        MenuGeometry {
            x: self.screen_width as i32 - self.menu.w as i32 - LOADER_INSET,
            y: LOADER_INSET,
            w: self.menu.w,
            h: self.menu.h,
        }
    }
}

/// Layout of a pixel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceGeometry {
    pub width: u32,
    pub height: u32,
    /// Row length in bytes
    pub stride: usize,
    pub format: PixelFormat,
}

/// Something a rendered overlay frame can be committed to
pub trait Surface: Send {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn render_frame(&mut self, frame: &RenderFrame);
    /// Release the underlying buffer; safe to call more than once
    fn shutdown(&mut self);
}

/// Copy-compose-copy-back renderer with an instance-owned scratch buffer
pub struct Compositor {
    style: StyleConfig,
    scratch: Vec<u8>,
}

impl Compositor {
    pub fn new(style: StyleConfig) -> Self {
        Self {
            style,
            scratch: Vec::new(),
        }
    }

    pub fn compose(&mut self, live: &mut [u8], geometry: SurfaceGeometry, frame: &RenderFrame) {
        if self.scratch.len() != live.len() {
            self.scratch.resize(live.len(), 0);
        }
        self.scratch.copy_from_slice(live);

        let mut canvas = Canvas::new(
            &mut self.scratch,
            geometry.width,
            geometry.height,
            geometry.stride,
            geometry.format,
        );
        draw_overlay(&mut canvas, &self.style, frame);

        live.copy_from_slice(&self.scratch);
    }
}

fn draw_overlay(canvas: &mut Canvas<'_>, style: &StyleConfig, frame: &RenderFrame) {
    let loader = frame.loader_rect();
    canvas.fill_rect(loader.x, loader.y, loader.w, loader.h, style.loader);
    canvas.draw_text(
        loader.x + LOADER_LABEL_OFFSET,
        loader.y + LOADER_LABEL_OFFSET,
        &style.loader_label,
        style.loader_text,
    );

    if !frame.open {
        return;
    }

    let menu = frame.menu;
    let fill = if frame.dragging {
        style.menu_dragging
    } else {
        style.menu
    };
    canvas.fill_rect(menu.x, menu.y, menu.w, menu.h, fill);

    // The glyph set is uppercase only
    let title = frame.title.to_uppercase();
    canvas.draw_text(menu.x + 12, menu.y + 12, &title, style.title_text);
    canvas.draw_text(menu.x + 12, menu.y + 36, HINT_DRAG, style.hint_text);
    canvas.draw_text(menu.x + 12, menu.y + 56, HINT_CLOSE, style.hint_text);
}

/// Surface over an owned byte buffer; used headless and in tests
pub struct MemorySurface {
    geometry: SurfaceGeometry,
    compositor: Compositor,
    buffer: Vec<u8>,
    frames: usize,
}

impl MemorySurface {
    pub fn new(width: u32, height: u32, format: PixelFormat, style: StyleConfig) -> Self {
        let stride = width as usize * format.bytes_per_pixel();
        Self {
            geometry: SurfaceGeometry {
                width,
                height,
                stride,
                format,
            },
            compositor: Compositor::new(style),
            buffer: vec![0; stride * height as usize],
            frames: 0,
        }
    }

    pub fn geometry(&self) -> SurfaceGeometry {
        self.geometry
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    pub fn frames_rendered(&self) -> usize {
        self.frames
    }
}

impl Surface for MemorySurface {
    fn width(&self) -> u32 {
        self.geometry.width
    }

    fn height(&self) -> u32 {
        self.geometry.height
    }

    fn render_frame(&mut self, frame: &RenderFrame) {
        self.compositor
            .compose(&mut self.buffer, self.geometry, frame);
        self.frames += 1;
    }

    fn shutdown(&mut self) {}
}
