// filepath: src/overlay/state.rs
//! Menu interaction state machine
//!
//! `(open, dragging)` gives three states: closed, open and resting, open and
//! being dragged. Rules are checked in a fixed order per touch event; the
//! tap rules end evaluation, the press/move/release rules stack.

use crate::input::TouchEvent;

/// Rectangle in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuGeometry {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl MenuGeometry {
    /// Hit test for touches; edges count as inside
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px <= self.x + self.w as i32 && py >= self.y && py <= self.y + self.h as i32
    }

    /// Whether the pixel at (`px`, `py`) is painted by a fill of this rectangle
    pub fn covers_pixel(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.w as i32 && py >= self.y && py < self.y + self.h as i32
    }
}

/// Screen and menu dimensions the rules are evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub screen_w: i32,
    pub screen_h: i32,
    pub menu_w: u32,
    pub menu_h: u32,
    pub margin: i32,
    pub clamp_on_open: bool,
}

impl ScreenLayout {
    pub fn docked(&self) -> MenuGeometry {
        MenuGeometry {
            x: self.screen_w - self.menu_w as i32 - self.margin,
            y: self.margin,
            w: self.menu_w,
            h: self.menu_h,
        }
    }

    /// Box spanning the middle third of the screen on both axes (exclusive edges)
    pub fn in_center_zone(&self, x: i32, y: i32) -> bool {
        let (cx, cy) = (self.screen_w / 2, self.screen_h / 2);
        let (half_w, half_h) = (self.screen_w / 3 / 2, self.screen_h / 3 / 2);
        x > cx - half_w && x < cx + half_w && y > cy - half_h && y < cy + half_h
    }

    /// Origin that keeps the whole menu on screen
    pub fn clamp_origin(&self, x: i32, y: i32) -> (i32, i32) {
        let max_x = (self.screen_w - self.menu_w as i32).max(0);
        let max_y = (self.screen_h - self.menu_h as i32).max(0);
        (x.clamp(0, max_x), y.clamp(0, max_y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuPhase {
    Closed,
    Open,
    Dragging,
}

/// What a touch event did to the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Opened { x: i32, y: i32 },
    Closed,
    DragStarted { offset_x: i32, offset_y: i32 },
    Dragged { x: i32, y: i32 },
    DragEnded { x: i32, y: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayState {
    pub open: bool,
    pub dragging: bool,
    pub geometry: MenuGeometry,
    pub drag_offset: (i32, i32),
}

impl OverlayState {
    pub fn new(layout: &ScreenLayout) -> Self {
        Self {
            open: false,
            dragging: false,
            geometry: layout.docked(),
            drag_offset: (0, 0),
        }
    }

    pub fn phase(&self) -> MenuPhase {
        match (self.open, self.dragging) {
            (false, _) => MenuPhase::Closed,
            (true, false) => MenuPhase::Open,
            (true, true) => MenuPhase::Dragging,
        }
    }

    /// Flip visibility only; position and drag state are kept
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Apply one touch event, returning the transitions it caused in order
    pub fn apply(&mut self, ev: &TouchEvent, layout: &ScreenLayout) -> Vec<Transition> {
        let mut transitions = Vec::new();

        if ev.tap {
            if !self.open && layout.in_center_zone(ev.x, ev.y) {
                self.open = true;
                let mut x = ev.x - self.geometry.w as i32 / 2;
                let mut y = ev.y - self.geometry.h as i32 / 2;
                if layout.clamp_on_open {
                    (x, y) = layout.clamp_origin(x, y);
                }
                self.geometry.x = x;
                self.geometry.y = y;
                transitions.push(Transition::Opened { x, y });
                return transitions;
            }

            if self.open && self.geometry.contains(ev.x, ev.y) {
                self.open = false;
                self.dragging = false;
                self.geometry = layout.docked();
                transitions.push(Transition::Closed);
                return transitions;
            }
        }

        if ev.down && self.phase() == MenuPhase::Open && self.geometry.contains(ev.x, ev.y) {
            self.dragging = true;
            self.drag_offset = (ev.x - self.geometry.x, ev.y - self.geometry.y);
            transitions.push(Transition::DragStarted {
                offset_x: self.drag_offset.0,
                offset_y: self.drag_offset.1,
            });
        }

        if ev.moved && self.dragging {
            let (x, y) =
                layout.clamp_origin(ev.x - self.drag_offset.0, ev.y - self.drag_offset.1);
            self.geometry.x = x;
            self.geometry.y = y;
            transitions.push(Transition::Dragged { x, y });
        }

        if ev.up && self.dragging {
            self.dragging = false;
            transitions.push(Transition::DragEnded {
                x: self.geometry.x,
                y: self.geometry.y,
            });
        }

        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ScreenLayout {
        ScreenLayout {
            screen_w: 1080,
            screen_h: 2400,
            menu_w: 240,
            menu_h: 100,
            margin: 28,
            clamp_on_open: true,
        }
    }

    #[test]
    fn starts_closed_and_docked() {
        let state = OverlayState::new(&layout());
        assert_eq!(state.phase(), MenuPhase::Closed);
        assert_eq!((state.geometry.x, state.geometry.y), (812, 28));
    }

    #[test]
    fn center_zone_edges_are_exclusive() {
        let l = layout();
        // cx=540, half box 180 → (360, 720) exclusive
        assert!(!l.in_center_zone(360, 1200));
        assert!(l.in_center_zone(361, 1200));
        assert!(!l.in_center_zone(720, 1200));
        assert!(!l.in_center_zone(540, 800));
        assert!(l.in_center_zone(540, 801));
    }

    #[test]
    fn tap_outside_center_keeps_menu_closed() {
        let l = layout();
        let mut state = OverlayState::new(&l);
        let t = state.apply(&TouchEvent::tap_at(100, 100), &l);
        assert!(t.is_empty());
        assert_eq!(state.phase(), MenuPhase::Closed);
    }

    #[test]
    fn tap_in_closed_docked_menu_does_nothing() {
        let l = layout();
        let mut state = OverlayState::new(&l);
        state.apply(&TouchEvent::tap_at(900, 60), &l);
        assert_eq!(state, OverlayState::new(&l));
    }

    #[test]
    fn open_centers_on_tap_point() {
        let l = layout();
        let mut state = OverlayState::new(&l);
        let t = state.apply(&TouchEvent::tap_at(400, 900), &l);
        assert_eq!(t, vec![Transition::Opened { x: 280, y: 850 }]);
        assert_eq!(state.phase(), MenuPhase::Open);
    }

    #[test]
    fn open_clamp_is_configurable() {
        // menu wider than two thirds of the screen can spill off the left edge
        let mut l = layout();
        l.menu_w = 900;
        let mut state = OverlayState::new(&l);
        state.apply(&TouchEvent::tap_at(400, 1200), &l);
        assert_eq!(state.geometry.x, 0);

        l.clamp_on_open = false;
        let mut state = OverlayState::new(&l);
        state.apply(&TouchEvent::tap_at(400, 1200), &l);
        assert_eq!(state.geometry.x, -50);
    }

    #[test]
    fn press_outside_menu_does_not_drag() {
        let l = layout();
        let mut state = OverlayState::new(&l);
        state.apply(&TouchEvent::tap_at(540, 1200), &l);
        state.apply(&TouchEvent::down_at(10, 10), &l);
        assert_eq!(state.phase(), MenuPhase::Open);
        state.apply(&TouchEvent::move_to(600, 600), &l);
        assert_eq!((state.geometry.x, state.geometry.y), (420, 1150));
    }

    #[test]
    fn press_while_closed_does_not_drag() {
        let l = layout();
        let mut state = OverlayState::new(&l);
        state.apply(&TouchEvent::down_at(820, 40), &l);
        assert!(!state.dragging);
    }

    #[test]
    fn release_ends_drag_and_keeps_position() {
        let l = layout();
        let mut state = OverlayState::new(&l);
        state.apply(&TouchEvent::tap_at(540, 1200), &l);
        state.apply(&TouchEvent::down_at(430, 1160), &l);
        state.apply(&TouchEvent::move_to(100, 300), &l);
        let t = state.apply(&TouchEvent::up_at(100, 300, false), &l);
        assert_eq!(t, vec![Transition::DragEnded { x: 90, y: 290 }]);
        assert_eq!(state.phase(), MenuPhase::Open);
        assert_eq!((state.geometry.x, state.geometry.y), (90, 290));
    }

    #[test]
    fn tap_on_menu_while_dragging_closes() {
        let l = layout();
        let mut state = OverlayState::new(&l);
        state.apply(&TouchEvent::tap_at(540, 1200), &l);
        state.apply(&TouchEvent::down_at(430, 1160), &l);
        assert_eq!(state.phase(), MenuPhase::Dragging);
        let t = state.apply(&TouchEvent::up_at(431, 1161, true), &l);
        assert_eq!(t, vec![Transition::Closed]);
        assert!(!state.dragging);
        assert_eq!(state.geometry, l.docked());
    }

    #[test]
    fn toggle_leaves_geometry_and_drag_alone() {
        let l = layout();
        let mut state = OverlayState::new(&l);
        state.apply(&TouchEvent::tap_at(540, 1200), &l);
        state.apply(&TouchEvent::down_at(430, 1160), &l);
        let before = state.clone();

        state.toggle();
        assert!(!state.open);
        assert!(state.dragging);
        assert_eq!(state.geometry, before.geometry);
        state.toggle();
        assert_eq!(state, before);
    }
}
