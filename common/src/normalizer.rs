use std::{fmt, str::FromStr};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("timer input is empty")]
    Empty,
    #[error("timer input contains non-digit character {0:?}")]
    InvalidDigit(char),
    #[error("timer input does not fit in 32 bits")]
    Overflow,
}

/// Countdown remainder. `seconds` is kept in `0..=59`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Remainder {
    pub minutes: u32,
    pub seconds: u8,
}

impl Remainder {
    pub const ZERO: Self = Self {
        minutes: 0,
        seconds: 0,
    };

    /// Builds a remainder, carrying whole minutes out of `seconds`.
    pub fn new(minutes: u32, seconds: u32) -> Self {
        Self {
            minutes: minutes.saturating_add(seconds / 60),
            seconds: (seconds % 60) as u8,
        }
    }

    /// Reads keypad digits as `MMSS` ("130" is 1:30, "175" is 2:15).
    pub fn parse(digits: &str) -> Result<Self, ParseError> {
        if digits.is_empty() {
            return Err(ParseError::Empty);
        }

        let mut value: u32 = 0;
        for ch in digits.chars() {
            let digit = ch.to_digit(10).ok_or(ParseError::InvalidDigit(ch))?;
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .ok_or(ParseError::Overflow)?;
        }

        Ok(Self::new(value / 100, value % 100))
    }

    pub fn parse_optional(digits: Option<&str>) -> Result<Self, ParseError> {
        digits.map_or(Err(ParseError::Empty), Self::parse)
    }

    /// Steps one second down. Returns true only when called at 0:00, which
    /// leaves the remainder untouched.
    pub fn decrement_one_second(&mut self) -> bool {
        if self.seconds > 0 {
            self.seconds -= 1;
            false
        } else if self.minutes > 0 {
            self.minutes -= 1;
            self.seconds = 59;
            false
        } else {
            true
        }
    }

    pub fn is_zero(&self) -> bool {
        self.minutes == 0 && self.seconds == 0
    }

    pub fn total_seconds(&self) -> u64 {
        u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }

    /// `MMSS` as a decimal number for the four-digit display.
    pub fn display_value(&self) -> u32 {
        self.minutes
            .saturating_mul(100)
            .saturating_add(u32::from(self.seconds))
    }
}

impl FromStr for Remainder {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Remainder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}
