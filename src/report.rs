//! Events accumulated for one input report, flushed on SYN_REPORT.

use evdevil::event::InputEvent;

pub const DEFAULT_CAPACITY: usize = 24;

/// Fixed-capacity queue. A push into a full queue drops the new event and
/// leaves the queued ones untouched.
#[derive(Debug)]
pub struct PendingReport {
    events: Vec<InputEvent>,
    capacity: usize,
    dropped: u64,
}

impl PendingReport {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Returns `false` if the event was dropped.
    pub fn push(&mut self, event: InputEvent) -> bool {
        if self.events.len() >= self.capacity {
            self.dropped += 1;
            if self.dropped == 1 || self.dropped.is_multiple_of(100) {
                log::warn!(
                    "report queue full ({} events), {} event(s) dropped so far",
                    self.capacity,
                    self.dropped
                );
            }
            return false;
        }
        self.events.push(event);
        true
    }

    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut [InputEvent] {
        &mut self.events
    }

    /// Move the queued events onto the end of `out` and clear the queue.
    pub fn drain_into(&mut self, out: &mut Vec<InputEvent>) {
        out.append(&mut self.events);
    }

    /// Total events dropped since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Default for PendingReport {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
