// filepath: src/input/mod.rs
//! Touch input: device discovery, decoding and the polling loop

pub mod decoder;
pub mod device;
mod listener;

pub use decoder::{AxisRange, DeviceCalibration, RawInput, TouchDecoder, TouchEvent};
pub use device::{enumerate_touch_devices, TouchDevice};
pub use listener::{TouchCallback, TouchListener};
