//! Absolute trackpad translation: forward the touchscreen's report stream with
//! coordinates clipped into the trackpad region, plus tool-key events for the
//! finger count and the optional sidekey.
//!
//! Coordinates are queued raw and rewritten when the report completes, so the
//! sidekey check sees where the finger really is before it is clipped.

use evdevil::event::{InputEvent, Key, KeyEvent, KeyState};

use crate::device::sink::{EventSink, WriteStats};
use crate::error::Error;
use crate::geometry::TrackpadRegion;
use crate::report::PendingReport;
use crate::sidekey::Sidekey;
use crate::slots::{Slot, SlotTable, SLOT_COUNT};

use super::event::{
    abs_event, RawEvent, ABS_MT_POSITION_X, ABS_MT_POSITION_Y, ABS_MT_SLOT, ABS_MT_TRACKING_ID,
    ABS_X, ABS_Y, EV_ABS,
};
use super::Translate;

const TOOL_KEYS: [Key; 5] = [
    Key::BTN_TOOL_FINGER,
    Key::BTN_TOOL_DOUBLETAP,
    Key::BTN_TOOL_TRIPLETAP,
    Key::BTN_TOOL_QUADTAP,
    Key::BTN_TOOL_QUINTTAP,
];

/// Tool key for 1..=5 fingers.
pub fn tool_key(finger_count: usize) -> Option<Key> {
    finger_count
        .checked_sub(1)
        .and_then(|i| TOOL_KEYS.get(i))
        .copied()
}

/// Raw touchscreen coordinates of one contact, per axis.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Position {
    x: Option<i32>,
    y: Option<i32>,
}

impl Position {
    fn resolved(&self) -> Option<(i32, i32)> {
        self.x.zip(self.y)
    }
}

pub struct AbsoluteTranslator<S> {
    region: TrackpadRegion,
    slots: SlotTable,
    positions: [Position; SLOT_COUNT],
    /// Last slot whose coordinates changed in the current report.
    moved_slot: Option<usize>,
    /// Slot the sidekey was last checked against.
    last_slot: Option<usize>,
    /// Tool state and contacts as last written to the trackpad.
    finger_count: usize,
    written: [Slot; SLOT_COUNT],
    /// Slot selected when the current report started.
    start_slot: Option<usize>,
    resync: bool,
    report: PendingReport,
    frame: Vec<InputEvent>,
    trackpad: S,
    sidekey: Option<Sidekey<S>>,
    stats: WriteStats,
    reports: u64,
}

impl<S: EventSink> AbsoluteTranslator<S> {
    pub fn new(
        region: TrackpadRegion,
        queue_capacity: usize,
        trackpad: S,
        sidekey: Option<Sidekey<S>>,
    ) -> Self {
        let slots = SlotTable::new();
        Self {
            region,
            positions: [Position::default(); SLOT_COUNT],
            moved_slot: None,
            last_slot: None,
            finger_count: 0,
            written: slots.snapshot(),
            start_slot: slots.current(),
            resync: false,
            slots,
            report: PendingReport::new(queue_capacity),
            frame: Vec::with_capacity(queue_capacity + TOOL_KEYS.len()),
            trackpad,
            sidekey,
            stats: WriteStats::default(),
            reports: 0,
        }
    }

    pub fn stats(&self) -> WriteStats {
        self.stats
    }

    pub fn dropped_events(&self) -> u64 {
        self.report.dropped()
    }

    fn track_position(&mut self, code: u16, value: i32) {
        let Some(slot) = self.slots.current() else {
            return;
        };
        match code {
            ABS_MT_POSITION_X => {
                self.positions[slot].x = Some(value);
                self.moved_slot = Some(slot);
            }
            ABS_MT_POSITION_Y => {
                self.positions[slot].y = Some(value);
                self.moved_slot = Some(slot);
            }
            // A new or released contact starts without history.
            ABS_MT_TRACKING_ID => self.positions[slot] = Position::default(),
            _ => {}
        }
    }

    fn finish_report(&mut self) -> Result<(), Error> {
        let count = self.slots.finger_count();
        self.frame.clear();

        // Tool state goes ahead of this report's coordinates.
        if count != self.finger_count {
            log::debug!("fingers {} -> {}", self.finger_count, count);
            if let Some(key) = tool_key(self.finger_count) {
                self.frame.push(KeyEvent::new(key, KeyState::RELEASED).into());
            }
            if let Some(key) = tool_key(count) {
                self.frame.push(KeyEvent::new(key, KeyState::PRESSED).into());
            }
        }
        if self.resync {
            self.push_contact_resync();
        }

        let position = self.report_position();
        self.update_sidekey(position, count)?;
        self.remap_coordinates();
        self.moved_slot = None;
        self.start_slot = self.slots.current();

        self.report.drain_into(&mut self.frame);
        let result = self.trackpad.emit(&self.frame);
        if self.stats.check("trackpad", result)? {
            self.finger_count = count;
            self.written = self.slots.snapshot();
            self.resync = false;
        } else {
            self.resync = true;
        }

        self.log_progress(count);
        Ok(())
    }

    /// Position of the contact that moved in this report, or else of the
    /// contact checked last, or else of the primary contact. Never mixes
    /// axes from different contacts.
    fn report_position(&mut self) -> Option<(i32, i32)> {
        let slot = self
            .moved_slot
            .or(self.last_slot)
            .filter(|&s| self.slots.is_occupied(s))
            .or_else(|| self.slots.primary().map(|(s, _)| s))?;
        self.last_slot = Some(slot);
        self.positions[slot].resolved()
    }

    /// Contact changes lost with a dropped report are re-sent before the next
    /// one, then the slot the report expects is selected again.
    fn push_contact_resync(&mut self) {
        let before = self.frame.len();
        for (slot, (now, sent)) in self.slots.snapshot().into_iter().zip(self.written).enumerate() {
            if now == sent {
                continue;
            }
            self.frame.push(abs_event(ABS_MT_SLOT, slot as i32));
            self.frame
                .push(abs_event(ABS_MT_TRACKING_ID, now.tracking_id().unwrap_or(-1)));
            if let (Slot::Occupied(_), Some((x, y))) = (now, self.positions[slot].resolved()) {
                self.frame
                    .push(abs_event(ABS_MT_POSITION_X, self.region.local_x(x)));
                self.frame
                    .push(abs_event(ABS_MT_POSITION_Y, self.region.local_y(y)));
            }
        }
        if self.frame.len() > before {
            log::debug!("re-sent {} contact event(s)", self.frame.len() - before);
            if let Some(slot) = self.start_slot {
                self.frame.push(abs_event(ABS_MT_SLOT, slot as i32));
            }
        }
    }

    fn update_sidekey(&mut self, position: Option<(i32, i32)>, count: usize) -> Result<(), Error> {
        let Some(sidekey) = self.sidekey.as_mut() else {
            return Ok(());
        };

        if count > 0 {
            if let Some((x, y)) = position {
                let side = self.region.is_side_touch(x, y);
                let result = sidekey.set(side).map(drop);
                self.stats.check("sidekey", result)?;
            }
        } else if sidekey.is_active() {
            // All fingers lifted: release whatever the last position says.
            let result = sidekey.set(false).map(drop);
            self.stats.check("sidekey", result)?;
        }
        Ok(())
    }

    fn remap_coordinates(&mut self) {
        let region = self.region;
        for ev in self.report.events_mut() {
            if ev.event_type().raw() != EV_ABS {
                continue;
            }
            let code = ev.raw_code();
            let value = ev.raw_value();
            match code {
                ABS_X | ABS_MT_POSITION_X => *ev = abs_event(code, region.local_x(value)),
                ABS_Y | ABS_MT_POSITION_Y => *ev = abs_event(code, region.local_y(value)),
                _ => {}
            }
        }
    }

    fn log_progress(&mut self, count: usize) {
        if self.reports == 0 {
            log::info!("Touch events flowing");
        }
        self.reports += 1;

        if self.reports.is_multiple_of(500) {
            log::debug!(
                "Reports: {}, fingers: {}, dropped events: {}, dropped writes: {}",
                self.reports,
                count,
                self.report.dropped(),
                self.stats.dropped_reports
            );
        }
    }
}

impl<S: EventSink> Translate for AbsoluteTranslator<S> {
    fn feed(&mut self, event: &RawEvent) -> Result<(), Error> {
        if event.is_syn_report() {
            return self.finish_report();
        }
        if event.ty() == EV_ABS {
            self.slots.apply(event.code(), event.value());
            self.track_position(event.code(), event.value());
        }
        self.report.push(event.event);
        Ok(())
    }
}
