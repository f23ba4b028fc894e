//! Host stand-ins for the timer hardware: stdin keypad, system RTC, and
//! display/ring/buzzer outputs that log what the device would show.

use std::time::Instant;

use chrono::{Duration, Utc};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc::{UnboundedReceiver, UnboundedSender},
};
use tracing::{debug, info, trace, warn};

use kitchen_timer_common::{
    Alarm, CivilTimestamp, ClockSource, Display, Glyph, Hsv, IndicatorRing, Key, KeyInput, Millis,
    MonotonicClock,
};

pub fn spawn_keypad_reader(tx: UnboundedSender<char>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    for ch in line.chars().filter(|ch| !ch.is_whitespace()) {
                        if let Err(err) = Key::try_from(ch) {
                            warn!("{err}");
                            continue;
                        }
                        if tx.send(ch).is_err() {
                            return;
                        }
                    }
                }
                Ok(None) => {
                    info!("stdin closed; keypad input disabled");
                    return;
                }
                Err(err) => {
                    warn!("keypad read error: {err}");
                    return;
                }
            }
        }
    });
}

pub struct ChannelKeypad {
    rx: UnboundedReceiver<char>,
}

impl ChannelKeypad {
    pub fn new(rx: UnboundedReceiver<char>) -> Self {
        Self { rx }
    }
}

impl KeyInput for ChannelKeypad {
    fn poll(&mut self) -> Option<char> {
        self.rx.try_recv().ok()
    }
}

/// System clock standing in for the battery-backed RTC. Provisioning stores
/// an offset from the host's UTC time.
#[derive(Debug, Clone)]
pub struct SystemRtc {
    offset: Duration,
}

impl Default for SystemRtc {
    fn default() -> Self {
        Self {
            offset: Duration::zero(),
        }
    }
}

impl ClockSource for SystemRtc {
    fn read_utc(&mut self) -> CivilTimestamp {
        CivilTimestamp::from((Utc::now() + self.offset).naive_utc())
    }

    fn set(&mut self, utc: CivilTimestamp) {
        match utc.to_naive() {
            Some(target) => self.offset = target - Utc::now().naive_utc(),
            None => warn!("ignoring invalid rtc time {utc}"),
        }
    }
}

pub struct InstantClock {
    start: Instant,
}

impl InstantClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for InstantClock {
    fn now_millis(&mut self) -> Millis {
        // Truncation is the counter wrap.
        self.start.elapsed().as_millis() as Millis
    }
}

#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    digits: Option<String>,
    colon: bool,
}

impl ConsoleDisplay {
    fn show(&mut self, digits: String, colon: bool) {
        let frame = format_frame(&digits, colon);
        if self.digits.as_deref() != Some(digits.as_str()) {
            info!("display [{frame}]");
        } else if self.colon != colon {
            trace!("display [{frame}]");
        }
        self.digits = Some(digits);
        self.colon = colon;
    }
}

impl Display for ConsoleDisplay {
    fn render_digits(&mut self, glyphs: [Glyph; 4], colon: bool) {
        self.show(glyph_digits(&glyphs), colon);
    }

    fn render_time(&mut self, value: u32, colon: bool, leading_zeros: bool) {
        self.show(time_digits(value, leading_zeros), colon);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RingMode {
    Off,
    Filled(Hsv),
    Rotating,
}

pub struct ConsoleRing {
    animation: Hsv,
    mode: RingMode,
}

impl ConsoleRing {
    pub fn new(animation: Hsv) -> Self {
        Self {
            animation,
            mode: RingMode::Off,
        }
    }

    fn switch(&mut self, mode: RingMode) {
        if self.mode != mode {
            debug!("ring {mode:?}");
            self.mode = mode;
        }
    }
}

impl IndicatorRing for ConsoleRing {
    fn fill(&mut self, color: Hsv) {
        self.switch(RingMode::Filled(color));
    }

    fn clear(&mut self) {
        self.switch(RingMode::Off);
    }

    fn step(&mut self, frame: u8) {
        self.switch(RingMode::Rotating);
        trace!(frame, hue = self.animation.hue, "ring step");
    }
}

#[derive(Debug, Default)]
pub struct ConsoleBuzzer {
    on: bool,
}

impl Alarm for ConsoleBuzzer {
    fn set(&mut self, on: bool) {
        if self.on != on {
            info!("buzzer {}", if on { "ON" } else { "off" });
            self.on = on;
        }
    }
}

fn glyph_digits(glyphs: &[Glyph; 4]) -> String {
    glyphs
        .iter()
        .map(|glyph| match glyph {
            Glyph::Blank => ' ',
            Glyph::Digit(digit) => char::from(b'0' + digit % 10),
            Glyph::Full => '8',
        })
        .collect()
}

fn time_digits(value: u32, leading_zeros: bool) -> String {
    if leading_zeros {
        format!("{value:04}")
    } else {
        format!("{value:>4}")
    }
}

/// Places the colon before the last two digits.
fn format_frame(digits: &str, colon: bool) -> String {
    let split = digits.len().saturating_sub(2);
    let separator = if colon { ':' } else { ' ' };
    format!("{}{separator}{}", &digits[..split], &digits[split..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_clock_and_countdown_frames() {
        assert_eq!(format_frame(&time_digits(118, false), true), " 1:18");
        assert_eq!(format_frame(&time_digits(130, true), true), "01:30");
        assert_eq!(format_frame(&time_digits(1205, false), false), "12 05");
        assert_eq!(format_frame(&time_digits(10039, true), true), "100:39");
    }

    #[test]
    fn formats_glyph_frames() {
        let partial = [Glyph::Blank, Glyph::Digit(0), Glyph::Digit(0), Glyph::Digit(1)];
        assert_eq!(format_frame(&glyph_digits(&partial), true), " 0:01");
        assert_eq!(format_frame(&glyph_digits(&[Glyph::Full; 4]), true), "88:88");
        assert_eq!(format_frame(&glyph_digits(&[Glyph::Blank; 4]), true), "  :  ");
    }

    #[test]
    fn provisioned_rtc_reads_back_near_target() {
        let mut rtc = SystemRtc::default();
        let target = CivilTimestamp::new(2026, 1, 5, 18, 18, 0);

        rtc.set(target);
        let reading = rtc.read_utc();

        let drift = reading.to_naive().unwrap() - target.to_naive().unwrap();
        assert!(drift >= Duration::zero() && drift < Duration::seconds(5));
    }
}
