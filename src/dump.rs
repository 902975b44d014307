//! Dump raw touchscreen events for debugging.
//! Run: trackscreen dump /dev/input/eventN  (or dump -n "Device Name").

use std::io::{self, Read, Write};
use std::path::Path;

use crate::device::Touchscreen;
use crate::error::Error;
use crate::input::event::code_name;
use crate::input::{parse_input_event, INPUT_EVENT_SIZE};

pub fn run_dump(device: &str, by_name: bool) -> Result<(), Error> {
    let touchscreen = if by_name {
        Touchscreen::find_by_name(device)?
    } else {
        Touchscreen::open(Path::new(device))?
    };
    eprintln!(
        "Dumping events from {} ({}), Ctrl+C to stop:\n",
        touchscreen.path().display(),
        touchscreen.name()
    );

    let mut reader = touchscreen.reader()?;
    let stdout = io::stdout();
    dump_events(&mut reader, &mut stdout.lock())
}

fn dump_events(source: &mut impl Read, out: &mut impl Write) -> Result<(), Error> {
    let mut buf = [0u8; INPUT_EVENT_SIZE];
    let mut n = 0u64;
    loop {
        if let Err(e) = source.read_exact(&mut buf) {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                return Ok(());
            }
            return Err(Error::Read(e));
        }
        let Some(ev) = parse_input_event(&buf) else {
            continue;
        };
        n += 1;
        writeln!(
            out,
            "{:6}  {:>6}.{:06}  {}  value={}",
            n,
            ev.time.as_secs(),
            ev.time.subsec_micros(),
            code_name(ev.ty(), ev.code()),
            ev.value()
        )
        .map_err(Error::Write)?;
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::Duration;

    use super::*;
    use crate::input::event::{encode_input_event, ABS_MT_SLOT, EV_ABS, EV_SYN, SYN_REPORT};

    #[test]
    fn test_dump_prints_one_line_per_event() {
        let mut bytes = encode_input_event(Duration::from_micros(2_000_042), EV_ABS, ABS_MT_SLOT, 1);
        bytes.extend(encode_input_event(Duration::from_secs(2), EV_SYN, SYN_REPORT, 0));

        let mut out = Vec::new();
        dump_events(&mut Cursor::new(bytes), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "     1       2.000042  ABS_MT_SLOT(47)  value=1");
        assert!(lines[1].ends_with("SYN_REPORT  value=0"));
    }
}
