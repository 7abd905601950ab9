pub mod config;
pub mod draw;
pub mod error;
pub mod font;
pub mod framebuffer;
pub mod input;
pub mod overlay;
pub mod pixel;
pub mod surface;
pub mod target;
pub mod toggle;

// Re-exports for embedding the overlay in another binary
pub use crate::config::OverlayConfig;
pub use crate::draw::Canvas;
pub use crate::framebuffer::Framebuffer;
pub use crate::input::{TouchEvent, TouchListener};
pub use crate::overlay::state::{MenuGeometry, OverlayState};
pub use crate::overlay::MenuOverlay;
pub use crate::pixel::PixelFormat;
pub use crate::surface::{MemorySurface, RenderFrame, Surface};
pub use crate::toggle::ToggleSwitch;
