pub mod config;
pub mod control;
pub mod daylight;
pub mod engine;
pub mod input;
pub mod io;
pub mod normalizer;
pub mod scheduler;
pub mod types;

pub use config::{RuntimeConfig, TimerConfig};
pub use control::{ControlLoop, Peripherals};
pub use engine::{EngineAction, Key, TimerEngine, UnknownKey};
pub use input::{InputBuffer, MAX_INPUT_DIGITS};
pub use io::{Alarm, ClockSource, Display, Glyph, Hsv, IndicatorRing, KeyInput, MonotonicClock};
pub use normalizer::{ParseError, Remainder};
pub use scheduler::{Gate, Millis};
pub use types::{CivilTimestamp, LocalTimestamp, TimerState, TimerStatus};
