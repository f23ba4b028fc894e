use crate::{
    config::TimerConfig,
    engine::{EngineAction, Key, TimerEngine},
    io::{Alarm, ClockSource, Display, IndicatorRing, KeyInput, MonotonicClock},
    scheduler::Millis,
    types::CivilTimestamp,
};

pub struct Peripherals {
    pub keys: Box<dyn KeyInput>,
    pub clock: Box<dyn ClockSource>,
    pub display: Box<dyn Display>,
    pub ring: Box<dyn IndicatorRing>,
    pub alarm: Box<dyn Alarm>,
    pub monotonic: Box<dyn MonotonicClock>,
}

/// Owns the engine and its collaborators; one `iterate` call is one pass of
/// the device's main loop.
pub struct ControlLoop {
    engine: TimerEngine,
    io: Peripherals,
}

impl ControlLoop {
    pub fn new(config: TimerConfig, mut io: Peripherals) -> Self {
        let now_ms = io.monotonic.now_millis();
        Self {
            engine: TimerEngine::new(config, now_ms),
            io,
        }
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn now_millis(&mut self) -> Millis {
        self.io.monotonic.now_millis()
    }

    pub fn read_clock(&mut self) -> CivilTimestamp {
        self.io.clock.read_utc()
    }

    pub fn boot_sequence(&self) -> Vec<EngineAction> {
        self.engine.boot_sequence()
    }

    /// Enters the bare colon prompt. The keypad has no key for this, so the
    /// host binary never calls it; an embedding that adds such a trigger does.
    pub fn await_input(&mut self) {
        let now_ms = self.io.monotonic.now_millis();
        let actions = self.engine.await_input(now_ms);
        self.apply_all(&actions);
    }

    /// Polls at most one key and applies it before running the periodic work
    /// of whatever state the key left the engine in. Returns the key, if any.
    pub fn iterate(&mut self) -> Option<Key> {
        let now_ms = self.io.monotonic.now_millis();

        let key = self.io.keys.poll().and_then(|ch| Key::try_from(ch).ok());
        if let Some(key) = key {
            let actions = self.engine.handle_key(key, now_ms);
            self.apply_all(&actions);
        }

        let clock = &mut self.io.clock;
        let actions = self.engine.tick_with(now_ms, || Some(clock.read_utc()));
        self.apply_all(&actions);

        key
    }

    /// Sends one action to its collaborator. `Delay` is left to the caller,
    /// which decides how to wait.
    pub fn apply(&mut self, action: &EngineAction) {
        match action {
            EngineAction::RenderDigits { glyphs, colon } => {
                self.io.display.render_digits(*glyphs, *colon)
            }
            EngineAction::RenderTime {
                value,
                colon,
                leading_zeros,
            } => self.io.display.render_time(*value, *colon, *leading_zeros),
            EngineAction::RingFill(color) => self.io.ring.fill(*color),
            EngineAction::RingClear => self.io.ring.clear(),
            EngineAction::RingStep(frame) => self.io.ring.step(*frame),
            EngineAction::Alarm(on) => self.io.alarm.set(*on),
            EngineAction::Delay(_) => {}
        }
    }

    pub fn apply_all(&mut self, actions: &[EngineAction]) {
        for action in actions {
            self.apply(action);
        }
    }

    pub fn silence(&mut self) {
        self.io.alarm.set(false);
        self.io.ring.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::VecDeque, rc::Rc};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        io::{Glyph, Hsv},
        normalizer::Remainder,
        types::TimerState,
    };

    #[derive(Debug, Clone, PartialEq)]
    enum Output {
        Digits([Glyph; 4], bool),
        Time(u32, bool, bool),
        Fill(Hsv),
        Clear,
        Step(u8),
        Alarm(bool),
    }

    struct BoardState {
        keys: VecDeque<char>,
        now_ms: Millis,
        utc: CivilTimestamp,
        clock_reads: usize,
        outputs: Vec<Output>,
    }

    #[derive(Clone)]
    struct FakeBoard(Rc<RefCell<BoardState>>);

    impl FakeBoard {
        fn new() -> Self {
            Self(Rc::new(RefCell::new(BoardState {
                keys: VecDeque::new(),
                now_ms: 0,
                utc: CivilTimestamp::new(2026, 1, 5, 18, 18, 0),
                clock_reads: 0,
                outputs: Vec::new(),
            })))
        }

        fn peripherals(&self) -> Peripherals {
            Peripherals {
                keys: Box::new(self.clone()),
                clock: Box::new(self.clone()),
                display: Box::new(self.clone()),
                ring: Box::new(self.clone()),
                alarm: Box::new(self.clone()),
                monotonic: Box::new(self.clone()),
            }
        }

        fn type_keys(&self, keys: &str) {
            self.0.borrow_mut().keys.extend(keys.chars());
        }

        fn advance(&self, ms: Millis) {
            let mut state = self.0.borrow_mut();
            state.now_ms = state.now_ms.wrapping_add(ms);
        }

        fn take_outputs(&self) -> Vec<Output> {
            std::mem::take(&mut self.0.borrow_mut().outputs)
        }

        fn clock_reads(&self) -> usize {
            self.0.borrow().clock_reads
        }

        fn record(&self, output: Output) {
            self.0.borrow_mut().outputs.push(output);
        }
    }

    impl KeyInput for FakeBoard {
        fn poll(&mut self) -> Option<char> {
            self.0.borrow_mut().keys.pop_front()
        }
    }

    impl ClockSource for FakeBoard {
        fn read_utc(&mut self) -> CivilTimestamp {
            let mut state = self.0.borrow_mut();
            state.clock_reads += 1;
            state.utc
        }

        fn set(&mut self, utc: CivilTimestamp) {
            self.0.borrow_mut().utc = utc;
        }
    }

    impl Display for FakeBoard {
        fn render_digits(&mut self, glyphs: [Glyph; 4], colon: bool) {
            self.record(Output::Digits(glyphs, colon));
        }

        fn render_time(&mut self, value: u32, colon: bool, leading_zeros: bool) {
            self.record(Output::Time(value, colon, leading_zeros));
        }
    }

    impl IndicatorRing for FakeBoard {
        fn fill(&mut self, color: Hsv) {
            self.record(Output::Fill(color));
        }

        fn clear(&mut self) {
            self.record(Output::Clear);
        }

        fn step(&mut self, frame: u8) {
            self.record(Output::Step(frame));
        }
    }

    impl Alarm for FakeBoard {
        fn set(&mut self, on: bool) {
            self.record(Output::Alarm(on));
        }
    }

    impl MonotonicClock for FakeBoard {
        fn now_millis(&mut self) -> Millis {
            self.0.borrow().now_ms
        }
    }

    fn control_loop(board: &FakeBoard) -> ControlLoop {
        ControlLoop::new(TimerConfig::default(), board.peripherals())
    }

    #[test]
    fn keypad_scenario_runs_countdown_to_completion() {
        let board = FakeBoard::new();
        let mut control = control_loop(&board);

        board.type_keys("130#");
        for _ in 0..4 {
            board.advance(10);
            control.iterate();
        }
        assert_eq!(control.engine().state(), TimerState::CountingDown);
        assert_eq!(control.engine().remainder(), Remainder::new(1, 30));

        for _ in 0..90 {
            board.advance(1_000);
            control.iterate();
        }
        assert_eq!(control.engine().state(), TimerState::Complete);
        assert_eq!(control.engine().remainder(), Remainder::ZERO);

        board.take_outputs();
        board.type_keys("5");
        board.advance(10);
        assert_eq!(control.iterate(), Some(Key::Digit(5)));
        assert_eq!(control.engine().state(), TimerState::ShowingClock);
        assert_eq!(board.take_outputs()[0], Output::Alarm(false));
    }

    #[test]
    fn polls_one_key_per_iteration() {
        let board = FakeBoard::new();
        let mut control = control_loop(&board);
        board.type_keys("12");

        assert_eq!(control.iterate(), Some(Key::Digit(1)));
        assert_eq!(control.engine().input().as_str(), "1");

        assert_eq!(control.iterate(), Some(Key::Digit(2)));
        assert_eq!(control.engine().input().as_str(), "12");
        assert_eq!(control.iterate(), None);
    }

    #[test]
    fn unknown_characters_are_ignored() {
        let board = FakeBoard::new();
        let mut control = control_loop(&board);
        board.type_keys("A");

        assert_eq!(control.iterate(), None);
        assert_eq!(control.engine().state(), TimerState::ShowingClock);
    }

    #[test]
    fn clock_is_read_only_while_displayed() {
        let board = FakeBoard::new();
        let mut control = control_loop(&board);

        control.iterate();
        assert_eq!(board.clock_reads(), 1);
        assert_eq!(
            board.take_outputs(),
            vec![
                Output::Fill(TimerConfig::default().standby_color),
                Output::Time(118, true, false),
            ]
        );

        board.type_keys("3");
        control.iterate();
        control.iterate();
        assert_eq!(board.clock_reads(), 1);
    }

    #[test]
    fn key_is_applied_before_periodic_work() {
        let board = FakeBoard::new();
        let mut control = control_loop(&board);

        board.type_keys("9");
        control.iterate();

        assert_eq!(
            board.take_outputs(),
            vec![Output::Digits(
                [Glyph::Blank, Glyph::Blank, Glyph::Blank, Glyph::Digit(9)],
                true
            )]
        );
        assert_eq!(board.clock_reads(), 0);
    }

    #[test]
    fn cancel_is_observed_mid_blink() {
        let board = FakeBoard::new();
        let mut control = control_loop(&board);
        board.type_keys("1#");
        control.iterate();
        control.iterate();
        board.advance(1_000);
        control.iterate();
        board.advance(200);
        control.iterate();
        assert!(control.engine().is_alarm_on());

        board.type_keys("*");
        board.advance(50);
        control.iterate();

        assert!(!control.engine().is_alarm_on());
        assert_eq!(control.engine().state(), TimerState::ShowingClock);
    }

    #[test]
    fn await_input_renders_colon_prompt() {
        let board = FakeBoard::new();
        let mut control = control_loop(&board);

        control.await_input();

        assert_eq!(control.engine().state(), TimerState::AwaitingInput);
        assert_eq!(
            board.take_outputs(),
            vec![Output::Digits([Glyph::Blank; 4], true)]
        );
    }

    #[test]
    fn input_timeout_renders_clock_on_the_same_pass() {
        let board = FakeBoard::new();
        let mut control = control_loop(&board);
        board.type_keys("12");
        control.iterate();
        control.iterate();
        board.take_outputs();

        board.advance(60_000);
        control.iterate();

        assert_eq!(control.engine().state(), TimerState::ShowingClock);
        assert_eq!(
            board.take_outputs(),
            vec![
                Output::Digits([Glyph::Blank; 4], true),
                Output::Fill(TimerConfig::default().standby_color),
                Output::Time(118, true, false),
            ]
        );
    }

    #[test]
    fn finish_signal_hands_back_to_clock_on_the_last_blink() {
        let board = FakeBoard::new();
        let mut control = control_loop(&board);
        board.type_keys("1#");
        control.iterate();
        control.iterate();
        board.advance(1_000);
        control.iterate();
        assert_eq!(control.engine().state(), TimerState::Complete);

        for _ in 0..3 {
            board.advance(200);
            control.iterate();
            board.advance(500);
            control.iterate();
        }
        board.advance(200);
        control.iterate();
        let reads_before = board.clock_reads();
        board.take_outputs();

        board.advance(500);
        control.iterate();

        assert_eq!(control.engine().state(), TimerState::ShowingClock);
        assert_eq!(board.clock_reads(), reads_before + 1);
        assert_eq!(board.take_outputs().last(), Some(&Output::Time(118, true, false)));
    }

    #[test]
    fn awaiting_prompt_times_out_to_clock() {
        let board = FakeBoard::new();
        let mut control = control_loop(&board);
        control.await_input();
        board.take_outputs();

        board.advance(59_999);
        control.iterate();
        assert_eq!(control.engine().state(), TimerState::AwaitingInput);

        board.advance(1);
        control.iterate();
        assert_eq!(control.engine().state(), TimerState::ShowingClock);
        assert_eq!(board.take_outputs().last(), Some(&Output::Time(118, true, false)));
    }

    #[test]
    fn silence_turns_outputs_off() {
        let board = FakeBoard::new();
        let mut control = control_loop(&board);

        control.silence();

        assert_eq!(board.take_outputs(), vec![Output::Alarm(false), Output::Clear]);
    }

    #[test]
    fn boot_sequence_skips_delay_when_applied() {
        let board = FakeBoard::new();
        let mut control = control_loop(&board);

        let actions = control.boot_sequence();
        control.apply_all(&actions);

        assert_eq!(
            board.take_outputs(),
            vec![
                Output::Digits([Glyph::Full; 4], true),
                Output::Digits([Glyph::Blank; 4], true),
            ]
        );
    }
}
