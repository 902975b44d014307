//! Relative pointer translation: the primary contact moves the cursor by its
//! scaled position delta, short touches become clicks.

use std::time::Duration;

use evdevil::event::{InputEvent, Key, KeyEvent, KeyState, Rel, RelEvent};

use crate::device::sink::{EventSink, WriteStats};
use crate::error::Error;
use crate::geometry::TrackpadRegion;
use crate::sidekey::Sidekey;
use crate::slots::{SlotTable, SLOT_COUNT};

use super::event::{RawEvent, ABS_MT_POSITION_X, ABS_MT_POSITION_Y, ABS_MT_TRACKING_ID, EV_ABS};
use super::Translate;

pub const DEFAULT_TAP_MS: u64 = 180;

/// Travel allowed for a tap, as a fraction of the region's larger side.
const TAP_SLOP_DIVISOR: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeSettings {
    /// Screen units to pointer units.
    pub scale: f64,
    /// Touches shorter than this are clicks.
    pub tap: Duration,
}

impl Default for RelativeSettings {
    fn default() -> Self {
        Self {
            scale: 1.0,
            tap: Duration::from_millis(DEFAULT_TAP_MS),
        }
    }
}

/// The contact currently driving the pointer.
#[derive(Debug, Clone, Copy)]
struct Contact {
    slot: usize,
    tracking_id: i32,
    last: (i32, i32),
    /// Contacts that land outside the region never move the pointer.
    inside: bool,
}

/// From the first finger down to the last finger up.
#[derive(Debug)]
struct Touch {
    started: Duration,
    max_fingers: usize,
    travel: i64,
    contact: Option<Contact>,
}

pub struct RelativeTranslator<S> {
    region: TrackpadRegion,
    settings: RelativeSettings,
    slots: SlotTable,
    positions: [(Option<i32>, Option<i32>); SLOT_COUNT],
    pointer: S,
    sidekey: Option<Sidekey<S>>,
    touch: Option<Touch>,
    remainder: (f64, f64),
    stats: WriteStats,
}

impl<S: EventSink> RelativeTranslator<S> {
    pub fn new(
        region: TrackpadRegion,
        settings: RelativeSettings,
        pointer: S,
        sidekey: Option<Sidekey<S>>,
    ) -> Self {
        Self {
            region,
            settings,
            slots: SlotTable::new(),
            positions: [(None, None); SLOT_COUNT],
            pointer,
            sidekey,
            touch: None,
            remainder: (0.0, 0.0),
            stats: WriteStats::default(),
        }
    }

    pub fn stats(&self) -> WriteStats {
        self.stats
    }

    fn apply_abs(&mut self, code: u16, value: i32) {
        self.slots.apply(code, value);
        let Some(slot) = self.slots.current() else {
            return;
        };
        match code {
            ABS_MT_POSITION_X => self.positions[slot].0 = Some(value),
            ABS_MT_POSITION_Y => self.positions[slot].1 = Some(value),
            ABS_MT_TRACKING_ID if value < 0 => self.positions[slot] = (None, None),
            _ => {}
        }
    }

    /// Lowest occupied slot, if both of its coordinates are known.
    fn primary(&self) -> Option<(usize, i32, i32, i32)> {
        let (slot, id) = self.slots.primary()?;
        match self.positions[slot] {
            (Some(x), Some(y)) => Some((slot, id, x, y)),
            _ => None,
        }
    }

    fn finish_report(&mut self, now: Duration) -> Result<(), Error> {
        let count = self.slots.finger_count();
        let primary = self.primary();

        self.update_sidekey(primary.map(|(_, _, x, y)| (x, y)), count)?;

        if count == 0 {
            if let Some(touch) = self.touch.take() {
                self.finish_touch(touch, now)?;
            }
            return Ok(());
        }

        let region = self.region;
        let touch = self.touch.get_or_insert_with(|| Touch {
            started: now,
            max_fingers: 0,
            travel: 0,
            contact: None,
        });
        touch.max_fingers = touch.max_fingers.max(count);

        let Some((slot, tracking_id, x, y)) = primary else {
            return Ok(());
        };

        let mut motion = None;
        match touch.contact.as_mut() {
            Some(c) if c.slot == slot && c.tracking_id == tracking_id => {
                let (dx, dy) = (x - c.last.0, y - c.last.1);
                c.last = (x, y);
                touch.travel += i64::from(dx.abs()) + i64::from(dy.abs());
                if c.inside {
                    motion = Some((dx, dy));
                }
            }
            _ => {
                touch.contact = Some(Contact {
                    slot,
                    tracking_id,
                    last: (x, y),
                    inside: region.contains(x, y),
                });
                self.remainder = (0.0, 0.0);
            }
        }

        match motion {
            Some((dx, dy)) if dx != 0 || dy != 0 => self.emit_motion(dx, dy),
            _ => Ok(()),
        }
    }

    fn update_sidekey(&mut self, position: Option<(i32, i32)>, count: usize) -> Result<(), Error> {
        let Some(sidekey) = self.sidekey.as_mut() else {
            return Ok(());
        };

        if count > 0 {
            if let Some((x, y)) = position {
                let result = sidekey.set(self.region.is_side_touch(x, y)).map(drop);
                self.stats.check("sidekey", result)?;
            }
        } else if sidekey.is_active() {
            let result = sidekey.set(false).map(drop);
            self.stats.check("sidekey", result)?;
        }
        Ok(())
    }

    fn emit_motion(&mut self, dx: i32, dy: i32) -> Result<(), Error> {
        let fx = f64::from(dx) * self.settings.scale + self.remainder.0;
        let fy = f64::from(dy) * self.settings.scale + self.remainder.1;
        let (ix, iy) = (fx.trunc(), fy.trunc());
        self.remainder = (fx - ix, fy - iy);

        let mut events: Vec<InputEvent> = Vec::with_capacity(2);
        if ix != 0.0 {
            events.push(RelEvent::new(Rel::X, ix as i32).into());
        }
        if iy != 0.0 {
            events.push(RelEvent::new(Rel::Y, iy as i32).into());
        }
        if events.is_empty() {
            return Ok(());
        }

        let result = self.pointer.emit(&events);
        self.stats.check("pointer", result).map(drop)
    }

    fn finish_touch(&mut self, touch: Touch, now: Duration) -> Result<(), Error> {
        let held = now.saturating_sub(touch.started);
        let slop = i64::from((self.region.width().max(self.region.height()) / TAP_SLOP_DIVISOR).max(1));
        let inside = touch.contact.is_some_and(|c| c.inside);

        if !inside || held >= self.settings.tap || touch.travel >= slop {
            return Ok(());
        }

        let button = if touch.max_fingers >= 2 {
            Key::BTN_RIGHT
        } else {
            Key::BTN_LEFT
        };
        log::debug!("tap ({} finger(s), {:?}) -> {:?}", touch.max_fingers, held, button);

        for state in [KeyState::PRESSED, KeyState::RELEASED] {
            let result = self.pointer.emit(&[KeyEvent::new(button, state).into()]);
            if !self.stats.check("pointer", result)? {
                break;
            }
        }
        Ok(())
    }
}

impl<S: EventSink> Translate for RelativeTranslator<S> {
    fn feed(&mut self, event: &RawEvent) -> Result<(), Error> {
        if event.is_syn_report() {
            return self.finish_report(event.time);
        }
        if event.ty() == EV_ABS {
            self.apply_abs(event.code(), event.value());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use evdevil::event::EventType;

    use super::*;
    use crate::device::sink::testing::{Log, Recorder};
    use crate::geometry::{ScreenGeometry, DEFAULT_PERCENTAGES};
    use crate::input::event::{ABS_MT_SLOT, EV_KEY, EV_REL, EV_SYN, SYN_REPORT};

    const REL_X: u16 = 0x00;
    const REL_Y: u16 = 0x01;
    const KEY_F13: u16 = 183;

    fn translator(log: &Log, scale: f64) -> RelativeTranslator<Recorder> {
        let screen = ScreenGeometry {
            min_x: 0,
            max_x: 1000,
            min_y: 0,
            max_y: 1000,
            resolution_x: 10,
            resolution_y: 10,
            pressure_min: 0,
            pressure_max: 255,
        };
        let region = TrackpadRegion::resolve(&screen, DEFAULT_PERCENTAGES).unwrap();
        let settings = RelativeSettings {
            scale,
            tap: Duration::from_millis(DEFAULT_TAP_MS),
        };
        RelativeTranslator::new(region, settings, Recorder::new("ptr", log), None)
    }

    fn with_sidekey(log: &Log) -> RelativeTranslator<Recorder> {
        let mut t = translator(log, 1.0);
        t.sidekey = Some(Sidekey::new(Recorder::new("kbd", log), Key::from_raw(KEY_F13)));
        t
    }

    fn at(ms: u64, code: u16, value: i32) -> RawEvent {
        RawEvent::new(
            Duration::from_millis(ms),
            InputEvent::new(EventType::from_raw(EV_ABS), code, value),
        )
    }

    fn syn(ms: u64) -> RawEvent {
        RawEvent::new(
            Duration::from_millis(ms),
            InputEvent::new(EventType::from_raw(EV_SYN), SYN_REPORT, 0),
        )
    }

    fn down(t: &mut RelativeTranslator<Recorder>, ms: u64, slot: i32, id: i32, x: i32, y: i32) {
        for ev in [
            at(ms, ABS_MT_SLOT, slot),
            at(ms, ABS_MT_TRACKING_ID, id),
            at(ms, ABS_MT_POSITION_X, x),
            at(ms, ABS_MT_POSITION_Y, y),
            syn(ms),
        ] {
            t.feed(&ev).unwrap();
        }
    }

    fn move_x(t: &mut RelativeTranslator<Recorder>, ms: u64, x: i32) {
        t.feed(&at(ms, ABS_MT_POSITION_X, x)).unwrap();
        t.feed(&syn(ms)).unwrap();
    }

    fn lift(t: &mut RelativeTranslator<Recorder>, ms: u64, slot: i32) {
        t.feed(&at(ms, ABS_MT_SLOT, slot)).unwrap();
        t.feed(&at(ms, ABS_MT_TRACKING_ID, -1)).unwrap();
        t.feed(&syn(ms)).unwrap();
    }

    fn rel_x(log: &Log) -> Vec<i32> {
        log.borrow()
            .iter()
            .filter(|e| e.1 == EV_REL && e.2 == REL_X)
            .map(|e| e.3)
            .collect()
    }

    fn clicks(log: &Log) -> Vec<(u16, i32)> {
        log.borrow()
            .iter()
            .filter(|e| e.1 == EV_KEY)
            .map(|e| (e.2, e.3))
            .collect()
    }

    #[test]
    fn test_motion_is_scaled_with_remainder() {
        let log = Log::default();
        let mut t = translator(&log, 0.5);
        down(&mut t, 0, 0, 1, 400, 800);
        move_x(&mut t, 500, 403);
        move_x(&mut t, 510, 406);
        move_x(&mut t, 520, 400);

        assert_eq!(rel_x(&log), vec![1, 2, -3]);
        assert!(!log.borrow().iter().any(|e| e.1 == EV_REL && e.2 == REL_Y));
    }

    #[test]
    fn test_contact_outside_region_does_not_move() {
        let log = Log::default();
        let mut t = translator(&log, 1.0);
        down(&mut t, 0, 0, 1, 100, 100);
        move_x(&mut t, 400, 400);
        move_x(&mut t, 410, 450);
        lift(&mut t, 420, 0);

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_new_primary_contact_does_not_jump() {
        let log = Log::default();
        let mut t = translator(&log, 1.0);
        down(&mut t, 0, 0, 1, 400, 800);
        lift(&mut t, 500, 0);
        down(&mut t, 600, 0, 2, 600, 900);
        move_x(&mut t, 1200, 610);

        assert_eq!(rel_x(&log), vec![10]);
    }

    #[test]
    fn test_short_touch_is_left_click() {
        let log = Log::default();
        let mut t = translator(&log, 1.0);
        down(&mut t, 1000, 0, 1, 500, 800);
        lift(&mut t, 1100, 0);

        let left = Key::BTN_LEFT.raw();
        assert_eq!(clicks(&log), vec![(left, 1), (left, 0)]);
    }

    #[test]
    fn test_two_finger_tap_is_right_click() {
        let log = Log::default();
        let mut t = translator(&log, 1.0);
        down(&mut t, 0, 0, 1, 500, 800);
        down(&mut t, 20, 1, 2, 550, 820);
        lift(&mut t, 60, 1);
        lift(&mut t, 80, 0);

        let right = Key::BTN_RIGHT.raw();
        assert_eq!(clicks(&log), vec![(right, 1), (right, 0)]);
    }

    #[test]
    fn test_long_or_moving_touch_is_not_a_click() {
        let log = Log::default();
        let mut t = translator(&log, 1.0);
        down(&mut t, 0, 0, 1, 500, 800);
        lift(&mut t, 400, 0);

        down(&mut t, 1000, 0, 2, 400, 800);
        move_x(&mut t, 1050, 450);
        lift(&mut t, 1100, 0);

        assert!(clicks(&log).is_empty());
        assert_eq!(rel_x(&log), vec![50]);
    }

    #[test]
    fn test_sidekey_in_relative_mode() {
        let log = Log::default();
        let mut t = with_sidekey(&log);
        down(&mut t, 0, 0, 1, 100, 800);
        move_x(&mut t, 50, 90);
        lift(&mut t, 400, 0);
        // Empty reports after the lift must not press again.
        t.feed(&syn(450)).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                ("kbd", EV_KEY, KEY_F13, 1),
                ("kbd", 0, 0, 0),
                ("kbd", EV_KEY, KEY_F13, 0),
                ("kbd", 0, 0, 0),
            ]
        );
    }

    #[test]
    fn test_sidekey_released_when_moving_into_region() {
        let log = Log::default();
        let mut t = with_sidekey(&log);
        down(&mut t, 0, 0, 1, 100, 800);
        move_x(&mut t, 300, 400);

        let keys: Vec<i32> = log
            .borrow()
            .iter()
            .filter(|e| e.0 == "kbd" && e.1 == EV_KEY)
            .map(|e| e.3)
            .collect();
        assert_eq!(keys, vec![1, 0]);
        // The contact landed outside the region, so the pointer stays put.
        assert!(rel_x(&log).is_empty());
    }
}
