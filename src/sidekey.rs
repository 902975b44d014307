//! Edge-triggered key signal for touches beside the trackpad region.

use std::io;

use evdevil::event::{Key, KeyEvent, KeyState};

use crate::device::sink::EventSink;

pub struct Sidekey<S> {
    sink: S,
    key: Key,
    active: bool,
}

impl<S: EventSink> Sidekey<S> {
    pub fn new(sink: S, key: Key) -> Self {
        Self {
            sink,
            key,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Emit a press or release if `active` differs from the current state.
    /// Returns whether an event was written. The state only changes once the
    /// write succeeds, so a dropped write is retried on the next report.
    pub fn set(&mut self, active: bool) -> io::Result<bool> {
        if active == self.active {
            return Ok(false);
        }
        let state = if active {
            KeyState::PRESSED
        } else {
            KeyState::RELEASED
        };
        self.sink.emit(&[KeyEvent::new(self.key, state).into()])?;
        self.active = active;
        log::debug!("sidekey {}", if active { "pressed" } else { "released" });
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::sink::testing::{Log, Recorder};
    use crate::input::event::EV_KEY;

    const KEY_F13: u16 = 183;

    #[test]
    fn test_only_transitions_emit() {
        let log = Log::default();
        let mut key = Sidekey::new(Recorder::new("kbd", &log), Key::from_raw(KEY_F13));

        assert!(!key.set(false).unwrap());
        assert!(key.set(true).unwrap());
        for _ in 0..5 {
            assert!(!key.set(true).unwrap());
        }
        assert!(key.set(false).unwrap());

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
    fn test_failed_write_keeps_state() {
        let log = Log::default();
        let mut sink = Recorder::new("kbd", &log);
        sink.fail_with = Some(io::ErrorKind::WouldBlock);
        let mut key = Sidekey::new(sink, Key::from_raw(KEY_F13));

        assert!(key.set(true).is_err());
        assert!(!key.is_active());
        assert!(log.borrow().is_empty());
    }
}
