use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimerState {
    ShowingClock,
    ShowingClockDimmed,
    AwaitingInput,
    SettingTimer,
    CountingDown,
    Complete,
}

impl TimerState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShowingClock => "SHOWING_CLOCK",
            Self::ShowingClockDimmed => "SHOWING_CLOCK_DIMMED",
            Self::AwaitingInput => "AWAITING_INPUT",
            Self::SettingTimer => "SETTING_TIMER",
            Self::CountingDown => "COUNTING_DOWN",
            Self::Complete => "COMPLETE",
        }
    }

    /// States in which digits, `#` and `*` are interpreted as timer input.
    pub fn accepts_input(self) -> bool {
        matches!(
            self,
            Self::ShowingClock
                | Self::ShowingClockDimmed
                | Self::AwaitingInput
                | Self::SettingTimer
        )
    }

    pub fn shows_clock(self) -> bool {
        matches!(self, Self::ShowingClock | Self::ShowingClockDimmed)
    }
}

/// Calendar reading of the hardware clock, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CivilTimestamp {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl CivilTimestamp {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_opt(
            self.hour,
            self.minute,
            self.second,
        )
    }
}

impl From<NaiveDateTime> for CivilTimestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self {
            year: value.year(),
            month: value.month(),
            day: value.day(),
            hour: value.hour(),
            minute: value.minute(),
            second: value.second(),
        }
    }
}

impl std::fmt::Display for CivilTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// UTC reading shifted into local civil time. The day is not carried into
/// the month, so it can read 0 or one past the last day of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocalTimestamp {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub daylight: bool,
}

impl LocalTimestamp {
    pub fn display_hour_12(&self) -> u32 {
        match self.hour % 12 {
            0 => 12,
            hour => hour,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimerStatus {
    pub state: &'static str,
    pub input: String,
    pub remainder: String,
    #[serde(rename = "remainingSeconds")]
    pub remaining_seconds: u64,
    #[serde(rename = "alarmOn")]
    pub alarm_on: bool,
    #[serde(rename = "blinkCount")]
    pub blink_count: u8,
}
