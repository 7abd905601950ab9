// filepath: src/input/decoder.rs
//! Raw touch records to semantic touch events
//!
//! Axis updates only move the tracked position. Contact begin/end emit
//! press and release, and while a contact is active each report boundary
//! emits one move, so move events are coalesced per report.

use evdev::{AbsoluteAxisCode, EventType, InputEvent, KeyCode, SynchronizationCode};

/// Touch in normalized screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchEvent {
    pub x: i32,
    pub y: i32,
    pub down: bool,
    pub up: bool,
    pub moved: bool,
    pub tap: bool,
}

impl TouchEvent {
    pub fn down_at(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            down: true,
            ..Self::default()
        }
    }

    pub fn up_at(x: i32, y: i32, tap: bool) -> Self {
        Self {
            x,
            y,
            up: true,
            tap,
            ..Self::default()
        }
    }

    pub fn tap_at(x: i32, y: i32) -> Self {
        Self::up_at(x, y, true)
    }

    pub fn move_to(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            moved: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
}

impl AxisRange {
    /// Map `raw` onto `[0, extent)`, clamped to `[0, extent - 1]`
    pub fn normalize(&self, raw: i32, extent: i32) -> i32 {
        let span = (self.max as i64 - self.min as i64).max(1);
        let scaled = ((raw as i64 - self.min as i64) * extent as i64).div_euclid(span);
        scaled.clamp(0, (extent as i64 - 1).max(0)) as i32
    }
}

/// Calibrated position ranges of one touch device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCalibration {
    pub name: String,
    pub x: AxisRange,
    pub y: AxisRange,
}

/// The subset of evdev records the decoder cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInput {
    PositionX(i32),
    PositionY(i32),
    Contact(bool),
    Report,
    Other,
}

impl RawInput {
    pub fn from_event(ev: &InputEvent) -> Self {
        let ty = ev.event_type();
        let code = ev.code();
        if ty == EventType::ABSOLUTE {
            if code == AbsoluteAxisCode::ABS_MT_POSITION_X.0 {
                return Self::PositionX(ev.value());
            }
            if code == AbsoluteAxisCode::ABS_MT_POSITION_Y.0 {
                return Self::PositionY(ev.value());
            }
        } else if ty == EventType::KEY && code == KeyCode::BTN_TOUCH.code() {
            match ev.value() {
                1 => return Self::Contact(true),
                0 => return Self::Contact(false),
                _ => {}
            }
        } else if ty == EventType::SYNCHRONIZATION && code == SynchronizationCode::SYN_REPORT.0 {
            return Self::Report;
        }
        Self::Other
    }
}

pub struct TouchDecoder {
    reference: DeviceCalibration,
    screen_w: i32,
    screen_h: i32,
    move_threshold: i32,
    contact: bool,
    raw: (i32, i32),
    start: (i32, i32),
}

impl TouchDecoder {
    /// `reference` calibrates every sample, whichever device produced it
    pub fn new(reference: DeviceCalibration, screen_w: i32, screen_h: i32, move_threshold: i32) -> Self {
        Self {
            reference,
            screen_w,
            screen_h,
            move_threshold,
            contact: false,
            raw: (0, 0),
            start: (0, 0),
        }
    }

    pub fn normalize(&self, raw_x: i32, raw_y: i32) -> (i32, i32) {
        (
            self.reference.x.normalize(raw_x, self.screen_w),
            self.reference.y.normalize(raw_y, self.screen_h),
        )
    }

    pub fn contact_active(&self) -> bool {
        self.contact
    }

    pub fn feed(&mut self, input: RawInput) -> Option<TouchEvent> {
        match input {
            RawInput::PositionX(v) => {
                self.raw.0 = v;
                None
            }
            RawInput::PositionY(v) => {
                self.raw.1 = v;
                None
            }
            RawInput::Contact(true) => {
                self.contact = true;
                let (x, y) = self.normalize(self.raw.0, self.raw.1);
                self.start = (x, y);
                Some(TouchEvent::down_at(x, y))
            }
            RawInput::Contact(false) => {
                let was_down = std::mem::replace(&mut self.contact, false);
                let (x, y) = self.normalize(self.raw.0, self.raw.1);
                let dx = (x - self.start.0).abs();
                let dy = (y - self.start.1).abs();
                let tap = was_down && dx < self.move_threshold && dy < self.move_threshold;
                Some(TouchEvent::up_at(x, y, tap))
            }
            RawInput::Report if self.contact => {
                let (x, y) = self.normalize(self.raw.0, self.raw.1);
                Some(TouchEvent::move_to(x, y))
            }
            RawInput::Report | RawInput::Other => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder() -> TouchDecoder {
        // raw range equals the screen so positions map one to one
        let calibration = DeviceCalibration {
            name: "test-panel".to_string(),
            x: AxisRange { min: 0, max: 1080 },
            y: AxisRange { min: 0, max: 2400 },
        };
        TouchDecoder::new(calibration, 1080, 2400, 18)
    }

    fn feed_all(decoder: &mut TouchDecoder, inputs: &[RawInput]) -> Vec<TouchEvent> {
        inputs.iter().filter_map(|i| decoder.feed(*i)).collect()
    }

    #[test]
    fn normalization_hits_both_ends() {
        let range = AxisRange { min: 100, max: 4195 };
        assert_eq!(range.normalize(100, 1080), 0);
        assert_eq!(range.normalize(4195, 1080), 1079);
        assert_eq!(range.normalize(-50, 1080), 0);
        assert_eq!(range.normalize(9000, 1080), 1079);
    }

    #[test]
    fn normalization_is_monotonic() {
        let range = AxisRange { min: -37, max: 4095 };
        let mut last = i32::MIN;
        for raw in -100..4200 {
            let v = range.normalize(raw, 2400);
            assert!(v >= last, "raw {raw} went backwards");
            assert!((0..2400).contains(&v));
            last = v;
        }
    }

    #[test]
    fn degenerate_range_does_not_divide_by_zero() {
        let range = AxisRange { min: 5, max: 5 };
        assert_eq!(range.normalize(5, 100), 0);
        assert_eq!(range.normalize(6, 100), 99);
    }

    #[test]
    fn axis_updates_alone_emit_nothing() {
        let mut d = decoder();
        let out = feed_all(
            &mut d,
            &[RawInput::PositionX(10), RawInput::PositionY(20), RawInput::Report, RawInput::Other],
        );
        assert!(out.is_empty());
    }

    #[test]
    fn short_contact_is_a_tap() {
        let mut d = decoder();
        let out = feed_all(
            &mut d,
            &[
                RawInput::PositionX(540),
                RawInput::PositionY(1200),
                RawInput::Contact(true),
                RawInput::Report,
                RawInput::PositionX(550),
                RawInput::Contact(false),
            ],
        );
        assert_eq!(
            out,
            vec![
                TouchEvent::down_at(540, 1200),
                TouchEvent::move_to(540, 1200),
                TouchEvent::up_at(550, 1200, true),
            ]
        );
    }

    #[test]
    fn displacement_at_threshold_is_not_a_tap() {
        let mut d = decoder();
        let out = feed_all(
            &mut d,
            &[
                RawInput::PositionX(500),
                RawInput::PositionY(500),
                RawInput::Contact(true),
                RawInput::PositionX(518),
                RawInput::Contact(false),
            ],
        );
        assert_eq!(out.last(), Some(&TouchEvent::up_at(518, 500, false)));

        let out = feed_all(
            &mut d,
            &[
                RawInput::PositionX(500),
                RawInput::Contact(true),
                RawInput::PositionX(517),
                RawInput::PositionY(483),
                RawInput::Contact(false),
            ],
        );
        assert_eq!(out.last(), Some(&TouchEvent::up_at(517, 483, true)));

        let out = feed_all(
            &mut d,
            &[
                RawInput::PositionY(500),
                RawInput::Contact(true),
                RawInput::PositionY(482),
                RawInput::Contact(false),
            ],
        );
        assert_eq!(out.last(), Some(&TouchEvent::up_at(517, 482, false)));
    }

    #[test]
    fn moves_are_coalesced_per_report() {
        let mut d = decoder();
        let out = feed_all(
            &mut d,
            &[
                RawInput::Contact(true),
                RawInput::PositionX(100),
                RawInput::PositionY(200),
                RawInput::PositionX(110),
                RawInput::PositionY(210),
                RawInput::Report,
            ],
        );
        assert_eq!(out, vec![TouchEvent::down_at(0, 0), TouchEvent::move_to(110, 210)]);
        assert!(d.contact_active());
    }

    #[test]
    fn release_without_press_is_never_a_tap() {
        let mut d = decoder();
        let out = feed_all(&mut d, &[RawInput::Contact(false), RawInput::Report]);
        assert_eq!(out, vec![TouchEvent::up_at(0, 0, false)]);
    }

    #[test]
    fn evdev_records_are_classified() {
        let x = InputEvent::new(EventType::ABSOLUTE.0, AbsoluteAxisCode::ABS_MT_POSITION_X.0, 42);
        let touch = InputEvent::new(EventType::KEY.0, KeyCode::BTN_TOUCH.code(), 1);
        let syn = InputEvent::new(EventType::SYNCHRONIZATION.0, SynchronizationCode::SYN_REPORT.0, 0);
        let pressure = InputEvent::new(EventType::ABSOLUTE.0, AbsoluteAxisCode::ABS_MT_PRESSURE.0, 9);
        assert_eq!(RawInput::from_event(&x), RawInput::PositionX(42));
        assert_eq!(RawInput::from_event(&touch), RawInput::Contact(true));
        assert_eq!(RawInput::from_event(&syn), RawInput::Report);
        assert_eq!(RawInput::from_event(&pressure), RawInput::Other);
    }
}
