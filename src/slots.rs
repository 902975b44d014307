//! Per-slot contact tracking following the kernel multitouch slot protocol.

use crate::input::event::{ABS_MT_SLOT, ABS_MT_TRACKING_ID};

/// Slots tracked; higher slot numbers are forwarded but not recorded.
pub const SLOT_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Slot {
    #[default]
    Empty,
    Occupied(i32),
}

impl Slot {
    pub fn tracking_id(&self) -> Option<i32> {
        match *self {
            Slot::Occupied(id) => Some(id),
            Slot::Empty => None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SlotTable {
    slots: [Slot; SLOT_COUNT],
    current: usize,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an `EV_ABS` event. Only slot selection and tracking-id
    /// assignment change state; everything else is ignored.
    pub fn apply(&mut self, code: u16, value: i32) {
        match code {
            ABS_MT_SLOT => self.select(value),
            ABS_MT_TRACKING_ID => self.assign(value),
            _ => {}
        }
    }

    pub fn select(&mut self, slot: i32) {
        match usize::try_from(slot) {
            Ok(slot) if slot < SLOT_COUNT => self.current = slot,
            _ => {
                log::debug!("slot {} out of range, not tracked", slot);
                self.current = SLOT_COUNT;
            }
        }
    }

    /// Negative ids release the current slot.
    pub fn assign(&mut self, tracking_id: i32) {
        let Some(slot) = self.slots.get_mut(self.current) else {
            return;
        };
        *slot = if tracking_id >= 0 {
            Slot::Occupied(tracking_id)
        } else {
            Slot::Empty
        };
    }

    /// Currently selected slot, `None` if the last selection was out of range.
    pub fn current(&self) -> Option<usize> {
        (self.current < SLOT_COUNT).then_some(self.current)
    }

    pub fn is_occupied(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(Slot::is_occupied)
    }

    pub fn snapshot(&self) -> [Slot; SLOT_COUNT] {
        self.slots
    }

    /// Counted from scratch on every call.
    pub fn finger_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_occupied()).count()
    }

    /// Lowest occupied slot and its tracking id.
    pub fn primary(&self) -> Option<(usize, i32)> {
        self.slots
            .iter()
            .enumerate()
            .find_map(|(i, s)| s.tracking_id().map(|id| (i, id)))
    }
}
