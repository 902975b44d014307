pub mod absolute;
pub mod event;
pub mod relative;

use std::io::{self, Read};

use crate::error::Error;

pub use absolute::AbsoluteTranslator;
pub use event::{parse_input_event, RawEvent, INPUT_EVENT_SIZE};
pub use relative::{RelativeSettings, RelativeTranslator};

/// A consumer of the raw touchscreen event stream.
pub trait Translate {
    fn feed(&mut self, event: &RawEvent) -> Result<(), Error>;
}

/// Read one event record at a time until the input ends. End of input is a
/// normal shutdown; any other read error is returned.
pub fn run_event_loop(source: &mut impl Read, translator: &mut impl Translate) -> Result<(), Error> {
    let mut buf = [0u8; INPUT_EVENT_SIZE];

    loop {
        if let Err(e) = source.read_exact(&mut buf) {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                log::info!("Input closed");
                return Ok(());
            }
            return Err(Error::Read(e));
        }

        let Some(ev) = parse_input_event(&buf) else {
            continue;
        };
        log::debug!("RECV {:x} {:x} {:x}", ev.ty(), ev.code(), ev.value());

        translator.feed(&ev)?;
    }
}
