//! Capability interfaces for the hardware the timer drives.
//!
//! The engine never talks to hardware; the control loop hands its actions to
//! implementations of these traits. Keypad scanning, segment encoding, RTC
//! registers and LED protocols all live behind them.

use serde::{Deserialize, Serialize};

use crate::{scheduler::Millis, types::CivilTimestamp};

/// What one position of the four-digit display shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Blank,
    Digit(u8),
    /// Every segment lit, used by the power-on self test.
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hsv {
    pub hue: u16,
    pub saturation: u8,
    pub value: u8,
}

impl Hsv {
    pub const fn new(hue: u16, saturation: u8, value: u8) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }
}

pub trait KeyInput {
    /// Non-blocking; at most one key per call.
    fn poll(&mut self) -> Option<char>;
}

pub trait ClockSource {
    fn read_utc(&mut self) -> CivilTimestamp;

    /// Provisioning only, never called from the control loop.
    fn set(&mut self, utc: CivilTimestamp);
}

pub trait Display {
    fn render_digits(&mut self, glyphs: [Glyph; 4], colon: bool);
    fn render_time(&mut self, value: u32, colon: bool, leading_zeros: bool);
}

pub trait IndicatorRing {
    fn fill(&mut self, color: Hsv);
    fn clear(&mut self);
    fn step(&mut self, frame: u8);
}

pub trait Alarm {
    fn set(&mut self, on: bool);
}

pub trait MonotonicClock {
    fn now_millis(&mut self) -> Millis;
}
