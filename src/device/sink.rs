//! Output seam between the translators and the uinput devices.

use std::io;

use evdevil::event::InputEvent;
use evdevil::uinput::UinputDevice;

use crate::error::Error;

/// Something that accepts one report at a time.
pub trait EventSink {
    /// Write `events` as one batch, then a SYN_REPORT.
    fn emit(&mut self, events: &[InputEvent]) -> io::Result<()>;
}

impl EventSink for UinputDevice {
    fn emit(&mut self, events: &[InputEvent]) -> io::Result<()> {
        self.writer().write_events(events)?.finish()
    }
}

/// Writes that would block on the non-blocking uinput fd.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteStats {
    pub dropped_reports: u64,
}

impl WriteStats {
    /// `Ok(true)` if written, `Ok(false)` if dropped because the device buffer
    /// was full. Any other failure is terminal.
    pub fn check(&mut self, what: &str, result: io::Result<()>) -> Result<bool, Error> {
        match result {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                self.dropped_reports += 1;
                log::warn!(
                    "{} write would block, report dropped ({} total)",
                    what,
                    self.dropped_reports
                );
                Ok(false)
            }
            Err(e) => Err(Error::Write(e)),
        }
    }
}

#[cfg(test)]
pub mod testing {
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    use evdevil::event::InputEvent;

    use super::EventSink;

    /// (device, type, code, value) per event; each emitted report ends with a
    /// `(device, 0, 0, 0)` SYN_REPORT entry.
    pub type Log = Rc<RefCell<Vec<(&'static str, u16, u16, i32)>>>;

    /// Records emitted reports into a log shared between devices, so tests can
    /// check ordering across them.
    #[derive(Clone)]
    pub struct Recorder {
        pub name: &'static str,
        pub log: Log,
        pub fail_with: Option<io::ErrorKind>,
    }

    impl Recorder {
        pub fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: log.clone(),
                fail_with: None,
            }
        }
    }

    impl EventSink for Recorder {
        fn emit(&mut self, events: &[InputEvent]) -> io::Result<()> {
            if let Some(kind) = self.fail_with {
                return Err(io::Error::from(kind));
            }
            let mut log = self.log.borrow_mut();
            for ev in events {
                log.push((self.name, ev.event_type().raw(), ev.raw_code(), ev.raw_value()));
            }
            log.push((self.name, 0, 0, 0));
            Ok(())
        }
    }
}
