use thiserror::Error;

use crate::{
    config::TimerConfig,
    daylight,
    input::InputBuffer,
    io::{Glyph, Hsv},
    normalizer::Remainder,
    scheduler::{Gate, Millis},
    types::{CivilTimestamp, TimerState, TimerStatus},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    /// `*`
    Cancel,
    /// `#`
    Commit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unmapped keypad character {0:?}")]
pub struct UnknownKey(pub char);

impl TryFrom<char> for Key {
    type Error = UnknownKey;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '0'..='9' => Ok(Self::Digit(value as u8 - b'0')),
            '*' => Ok(Self::Cancel),
            '#' => Ok(Self::Commit),
            other => Err(UnknownKey(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineAction {
    RenderDigits { glyphs: [Glyph; 4], colon: bool },
    RenderTime {
        value: u32,
        colon: bool,
        leading_zeros: bool,
    },
    RingFill(Hsv),
    RingClear,
    RingStep(u8),
    Alarm(bool),
    Delay(u64),
}

impl EngineAction {
    pub const COLON_ONLY: Self = Self::RenderDigits {
        glyphs: [Glyph::Blank; 4],
        colon: true,
    };

    fn countdown(remainder: &Remainder) -> Self {
        Self::RenderTime {
            value: remainder.display_value(),
            colon: true,
            leading_zeros: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimerEngine {
    config: TimerConfig,
    state: TimerState,
    input: InputBuffer,
    remainder: Remainder,

    dim_gate: Gate,
    input_timeout_gate: Gate,
    countdown_gate: Gate,
    animation_gate: Gate,
    blink_gate: Gate,

    ring_frame: u8,
    // Completed on/off pairs of the finish signal.
    blink_count: u8,
    alarm_on: bool,
}

impl TimerEngine {
    pub fn new(mut config: TimerConfig, now_ms: Millis) -> Self {
        config.sanitize();
        Self {
            dim_gate: Gate::new(config.dim_after_ms, now_ms),
            input_timeout_gate: Gate::new(config.input_timeout_ms, now_ms),
            countdown_gate: Gate::new(config.countdown_tick_ms, now_ms),
            animation_gate: Gate::new(config.animation_frame_ms, now_ms),
            blink_gate: Gate::new(config.blink_off_ms, now_ms),
            config,
            state: TimerState::ShowingClock,
            input: InputBuffer::new(),
            remainder: Remainder::ZERO,
            ring_frame: 0,
            blink_count: 0,
            alarm_on: false,
        }
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    pub fn remainder(&self) -> Remainder {
        self.remainder
    }

    pub fn is_alarm_on(&self) -> bool {
        self.alarm_on
    }

    pub fn blink_count(&self) -> u8 {
        self.blink_count
    }

    /// Power-on display self test.
    pub fn boot_sequence(&self) -> Vec<EngineAction> {
        vec![
            EngineAction::RenderDigits {
                glyphs: [Glyph::Full; 4],
                colon: true,
            },
            EngineAction::Delay(self.config.self_test_ms),
            EngineAction::COLON_ONLY,
        ]
    }

    /// Leaves the clock for a bare colon prompt. Only valid while the engine
    /// is accepting input.
    pub fn await_input(&mut self, now_ms: Millis) -> Vec<EngineAction> {
        if !self.state.accepts_input() {
            return Vec::new();
        }
        self.input.clear();
        self.input_timeout_gate.reset(now_ms);
        self.state = TimerState::AwaitingInput;
        vec![EngineAction::COLON_ONLY]
    }

    pub fn handle_key(&mut self, key: Key, now_ms: Millis) -> Vec<EngineAction> {
        let mut actions = Vec::new();
        self.input_timeout_gate.reset(now_ms);

        match self.state {
            TimerState::CountingDown => {
                if key == Key::Cancel {
                    self.cancel(now_ms, &mut actions);
                }
            }
            TimerState::Complete => self.dismiss(now_ms, &mut actions),
            TimerState::ShowingClock
            | TimerState::ShowingClockDimmed
            | TimerState::AwaitingInput
            | TimerState::SettingTimer => self.handle_input_key(key, now_ms, &mut actions),
        }

        actions
    }

    /// Runs the periodic work of the current state. `utc` is only consulted
    /// while the clock is shown.
    pub fn tick(&mut self, now_ms: Millis, utc: Option<CivilTimestamp>) -> Vec<EngineAction> {
        self.tick_with(now_ms, || utc)
    }

    /// Like `tick`, but reads the clock only if this tick ends up showing it,
    /// including the tick that falls back to the clock from input or the
    /// finish signal.
    pub fn tick_with<F>(&mut self, now_ms: Millis, read_utc: F) -> Vec<EngineAction>
    where
        F: FnOnce() -> Option<CivilTimestamp>,
    {
        let mut actions = Vec::new();

        self.expire_input_if_needed(now_ms, &mut actions);

        match self.state {
            TimerState::ShowingClock => {
                if self.dim_gate.should_fire(now_ms) {
                    self.state = TimerState::ShowingClockDimmed;
                    actions.push(EngineAction::RingClear);
                } else {
                    actions.push(EngineAction::RingFill(self.config.standby_color));
                }
            }
            TimerState::ShowingClockDimmed => actions.push(EngineAction::RingClear),
            TimerState::AwaitingInput => actions.push(EngineAction::COLON_ONLY),
            TimerState::SettingTimer => {}
            TimerState::CountingDown => self.run_countdown(now_ms, &mut actions),
            TimerState::Complete => self.run_finish_signal(now_ms, &mut actions),
        }

        if self.state.shows_clock() {
            self.render_clock(read_utc(), &mut actions);
        }

        actions
    }

    pub fn status(&self) -> TimerStatus {
        TimerStatus {
            state: self.state.as_str(),
            input: self.input.as_str().to_string(),
            remainder: self.remainder.to_string(),
            remaining_seconds: self.remainder.total_seconds(),
            alarm_on: self.alarm_on,
            blink_count: self.blink_count,
        }
    }

    fn handle_input_key(&mut self, key: Key, now_ms: Millis, actions: &mut Vec<EngineAction>) {
        match key {
            Key::Digit(digit) => {
                if self.input.push_digit(digit) {
                    self.state = TimerState::SettingTimer;
                    actions.push(EngineAction::RenderDigits {
                        glyphs: self.input.glyphs(),
                        colon: true,
                    });
                }
            }
            Key::Commit => self.commit(now_ms, actions),
            Key::Cancel => self.cancel(now_ms, actions),
        }
    }

    fn commit(&mut self, now_ms: Millis, actions: &mut Vec<EngineAction>) {
        let Ok(remainder) = Remainder::parse(self.input.as_str()) else {
            return;
        };

        self.remainder = remainder;
        self.input.clear();
        self.state = TimerState::CountingDown;
        self.countdown_gate.reset(now_ms);
        self.animation_gate.reset(now_ms);
        self.ring_frame = 0;
        actions.push(EngineAction::countdown(&self.remainder));
    }

    fn cancel(&mut self, now_ms: Millis, actions: &mut Vec<EngineAction>) {
        self.input.clear();
        self.remainder = Remainder::ZERO;
        actions.push(EngineAction::COLON_ONLY);
        self.enter_clock(now_ms);
    }

    fn dismiss(&mut self, now_ms: Millis, actions: &mut Vec<EngineAction>) {
        self.alarm_on = false;
        self.blink_count = 0;
        actions.push(EngineAction::Alarm(false));
        self.enter_clock(now_ms);
    }

    fn enter_clock(&mut self, now_ms: Millis) {
        self.state = TimerState::ShowingClock;
        self.dim_gate.reset(now_ms);
    }

    fn enter_complete(&mut self, now_ms: Millis) {
        self.state = TimerState::Complete;
        self.blink_count = 0;
        self.alarm_on = false;
        self.blink_gate.set_interval(self.config.blink_off_ms);
        self.blink_gate.reset(now_ms);
    }

    fn expire_input_if_needed(&mut self, now_ms: Millis, actions: &mut Vec<EngineAction>) {
        let waiting = matches!(self.state, TimerState::SettingTimer | TimerState::AwaitingInput);
        if waiting && self.input_timeout_gate.should_fire(now_ms) {
            self.input.clear();
            actions.push(EngineAction::COLON_ONLY);
            self.enter_clock(now_ms);
        }
    }

    fn render_clock(&self, utc: Option<CivilTimestamp>, actions: &mut Vec<EngineAction>) {
        let Some(utc) = utc else {
            return;
        };
        let local = daylight::apply_offset(&utc);
        actions.push(EngineAction::RenderTime {
            value: local.display_hour_12() * 100 + local.minute,
            colon: local.second % 2 == 0,
            leading_zeros: false,
        });
    }

    fn run_countdown(&mut self, now_ms: Millis, actions: &mut Vec<EngineAction>) {
        if self.animation_gate.should_fire(now_ms) {
            actions.push(EngineAction::RingStep(self.ring_frame));
            self.ring_frame = (self.ring_frame + 1) % self.config.ring_pixels;
        }

        if self.countdown_gate.should_fire(now_ms) {
            let finished = self.remainder.decrement_one_second();
            actions.push(EngineAction::countdown(&self.remainder));
            if finished || self.remainder.is_zero() {
                self.enter_complete(now_ms);
            }
        }
    }

    /// Alternates "00:00" with the buzzer on and a bare colon with it off,
    /// then falls back to the clock after the configured number of cycles.
    fn run_finish_signal(&mut self, now_ms: Millis, actions: &mut Vec<EngineAction>) {
        actions.push(EngineAction::RingFill(self.config.standby_color));

        let interval = if self.alarm_on {
            self.config.blink_on_ms
        } else {
            self.config.blink_off_ms
        };
        self.blink_gate.set_interval(interval);
        if !self.blink_gate.should_fire(now_ms) {
            return;
        }

        if self.alarm_on {
            self.alarm_on = false;
            self.blink_count = self.blink_count.saturating_add(1);
            actions.push(EngineAction::Alarm(false));
            actions.push(EngineAction::COLON_ONLY);
        } else {
            self.alarm_on = true;
            actions.push(EngineAction::Alarm(true));
            actions.push(EngineAction::countdown(&Remainder::ZERO));
        }

        if self.blink_count >= self.config.blink_cycles {
            self.blink_count = 0;
            self.enter_clock(now_ms);
        }
    }
}
