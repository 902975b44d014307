use std::time::Duration;

use evdevil::event::{EventType, InputEvent};

pub const INPUT_EVENT_SIZE_32: usize = 16;
pub const INPUT_EVENT_SIZE_64: usize = 24;

/// Size of the host's `struct input_event`.
#[cfg(target_pointer_width = "64")]
pub const INPUT_EVENT_SIZE: usize = INPUT_EVENT_SIZE_64;
#[cfg(not(target_pointer_width = "64"))]
pub const INPUT_EVENT_SIZE: usize = INPUT_EVENT_SIZE_32;

pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_REL: u16 = 0x02;
pub const EV_ABS: u16 = 0x03;
pub const EV_MSC: u16 = 0x04;
pub const SYN_REPORT: u16 = 0;

pub const ABS_X: u16 = 0x00;
pub const ABS_Y: u16 = 0x01;
pub const ABS_MT_SLOT: u16 = 0x2f;
pub const ABS_MT_POSITION_X: u16 = 0x35;
pub const ABS_MT_POSITION_Y: u16 = 0x36;
pub const ABS_MT_TRACKING_ID: u16 = 0x39;

/// One decoded `input_event` with its kernel timestamp.
#[derive(Debug, Clone, Copy)]
pub struct RawEvent {
    pub time: Duration,
    pub event: InputEvent,
}

impl RawEvent {
    pub fn new(time: Duration, event: InputEvent) -> Self {
        Self { time, event }
    }

    pub fn ty(&self) -> u16 {
        self.event.event_type().raw()
    }

    pub fn code(&self) -> u16 {
        self.event.raw_code()
    }

    pub fn value(&self) -> i32 {
        self.event.raw_value()
    }

    pub fn is_syn_report(&self) -> bool {
        self.ty() == EV_SYN && self.code() == SYN_REPORT
    }
}

/// Parse a Linux input_event in host byte order (32-bit or 64-bit format).
pub fn parse_input_event(buf: &[u8]) -> Option<RawEvent> {
    match buf.len() {
        INPUT_EVENT_SIZE_32 => parse_input_event_32(buf),
        INPUT_EVENT_SIZE_64 => parse_input_event_64(buf),
        len if len >= INPUT_EVENT_SIZE_64 => parse_input_event_64(buf),
        len if len >= INPUT_EVENT_SIZE_32 => parse_input_event_32(buf),
        _ => None,
    }
}

fn parse_input_event_32(buf: &[u8]) -> Option<RawEvent> {
    let sec = i32::from_ne_bytes(buf[0..4].try_into().ok()?);
    let usec = i32::from_ne_bytes(buf[4..8].try_into().ok()?);
    let ty = u16::from_ne_bytes([buf[8], buf[9]]);
    let code = u16::from_ne_bytes([buf[10], buf[11]]);
    let value = i32::from_ne_bytes([buf[12], buf[13], buf[14], buf[15]]);

    Some(RawEvent::new(
        timestamp(i64::from(sec), i64::from(usec)),
        InputEvent::new(EventType::from_raw(ty), code, value),
    ))
}

fn parse_input_event_64(buf: &[u8]) -> Option<RawEvent> {
    let sec = i64::from_ne_bytes(buf[0..8].try_into().ok()?);
    let usec = i64::from_ne_bytes(buf[8..16].try_into().ok()?);
    let ty = u16::from_ne_bytes([buf[16], buf[17]]);
    let code = u16::from_ne_bytes([buf[18], buf[19]]);
    let value = i32::from_ne_bytes([buf[20], buf[21], buf[22], buf[23]]);

    Some(RawEvent::new(
        timestamp(sec, usec),
        InputEvent::new(EventType::from_raw(ty), code, value),
    ))
}

fn timestamp(sec: i64, usec: i64) -> Duration {
    Duration::from_secs(sec.max(0) as u64) + Duration::from_micros(usec.max(0) as u64)
}

/// Encode an event in the host layout. Used to replay events in tests.
#[cfg(test)]
pub fn encode_input_event(time: Duration, ty: u16, code: u16, value: i32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(INPUT_EVENT_SIZE);
    if INPUT_EVENT_SIZE == INPUT_EVENT_SIZE_64 {
        buf.extend_from_slice(&(time.as_secs() as i64).to_ne_bytes());
        buf.extend_from_slice(&i64::from(time.subsec_micros()).to_ne_bytes());
    } else {
        buf.extend_from_slice(&(time.as_secs() as i32).to_ne_bytes());
        buf.extend_from_slice(&(time.subsec_micros() as i32).to_ne_bytes());
    }
    buf.extend_from_slice(&ty.to_ne_bytes());
    buf.extend_from_slice(&code.to_ne_bytes());
    buf.extend_from_slice(&value.to_ne_bytes());
    buf
}

pub fn abs_event(code: u16, value: i32) -> InputEvent {
    InputEvent::new(EventType::from_raw(EV_ABS), code, value)
}

/// Printable name for the codes a touchscreen typically sends.
pub fn code_name(ty: u16, code: u16) -> String {
    match ty {
        EV_SYN if code == SYN_REPORT => "SYN_REPORT".into(),
        EV_SYN => format!("SYN/{}", code),
        EV_KEY => format!("KEY/{}", code),
        EV_REL => format!("REL/{}", code),
        EV_MSC => format!("MSC/{}", code),
        EV_ABS => {
            let abs = match code {
                0x00 => "X",
                0x01 => "Y",
                0x18 => "PRESSURE",
                0x2f => "MT_SLOT",
                0x30 => "MT_TOUCH_MAJOR",
                0x31 => "MT_TOUCH_MINOR",
                0x34 => "MT_ORIENTATION",
                0x35 => "MT_POSITION_X",
                0x36 => "MT_POSITION_Y",
                0x37 => "MT_TOOL_TYPE",
                0x39 => "MT_TRACKING_ID",
                0x3a => "MT_PRESSURE",
                _ => "?",
            };
            format!("ABS_{}({})", abs, code)
        }
        _ => format!("type{} code{}", ty, code),
    }
}
