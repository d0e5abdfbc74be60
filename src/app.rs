//! The countdown application state machine.
//!
//! Owns remaining/preset time and the timer phase, reacts to classified
//! button events and the second interrupt, and keeps the display in sync
//! by issuing at most one bus transfer per tick. A display write that the
//! bus engine rejects is retried on the next tick, never in a loop.

use ufmt::derive::uDebug;

use crate::bus::SubmitError;
use crate::buttons::{Button, ButtonEvent, EventKind};
use crate::config;
use crate::drivers::lcd::{self, BlinkRate};

#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Finished,
}

/// Inputs delivered from the interrupt paths.
#[derive(Debug, Clone, Copy)]
pub enum Event {
    Button(ButtonEvent),
    SecondElapsed,
}

/// Everything the state machine needs from the board. Implemented on the
/// real peripherals in the binary and on fakes in tests.
pub trait Board {
    /// Begin second counting from an arbitrary count so a paused timer
    /// resumes with sub-second precision preserved.
    fn start_second_timer(&mut self, from_count: u16);
    /// Stop second counting and return the exact in-flight count.
    fn stop_second_timer(&mut self) -> u16;
    fn led_on(&mut self);
    fn led_off(&mut self);
    fn led_toggle(&mut self);
    /// Submit a display write through the bus transfer engine.
    fn submit_display(&mut self, bytes: &[u8]) -> nb::Result<(), SubmitError>;
}

pub struct App {
    phase: Phase,
    remaining: u16,
    preset: u16,
    /// RTC count captured when pausing, restored on resume.
    saved_count: u16,
    /// Colon segment state, toggled by the second interrupt while running.
    colon: bool,
    blink: BlinkRate,
    /// Blink rate last written to the controller, `None` before the first
    /// successful write.
    shown_blink: Option<BlinkRate>,
    frame_dirty: bool,
}

impl App {
    pub const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            remaining: 0,
            preset: 0,
            saved_count: 0,
            colon: false,
            blink: BlinkRate::Off,
            shown_blink: None,
            frame_dirty: true,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining(&self) -> u16 {
        self.remaining
    }

    pub fn preset(&self) -> u16 {
        self.preset
    }

    pub fn handle<B: Board>(&mut self, event: Event, board: &mut B) {
        match event {
            Event::Button(ev) => self.on_button(ev, board),
            Event::SecondElapsed => self.on_second(board),
        }
    }

    /// Reconcile the display with the desired state; one transfer per tick
    /// at most, blink command before frame content.
    pub fn refresh<B: Board>(&mut self, board: &mut B) {
        if self.shown_blink != Some(self.blink) {
            if board
                .submit_display(&[lcd::blink_command(self.blink)])
                .is_ok()
            {
                self.shown_blink = Some(self.blink);
            }
            return;
        }

        if self.frame_dirty {
            let colon = self.colon && self.phase == Phase::Running;
            let frame = lcd::frame(self.remaining / 60, self.remaining % 60, colon);
            if board.submit_display(&frame).is_ok() {
                self.frame_dirty = false;
            }
        }
    }

    fn on_button<B: Board>(&mut self, ev: ButtonEvent, board: &mut B) {
        match (ev.button, ev.kind) {
            // actions trigger on release or on the long-press firing
            (_, EventKind::Pressed) => {}
            (Button::Add, EventKind::Released) => self.add_seconds(config::ADD_SHORT_SECS),
            (Button::Add, EventKind::LongPress) => self.add_seconds(config::ADD_LONG_SECS),
            (Button::Set, EventKind::Released) => self.on_set(board),
            (Button::Set, EventKind::LongPress) => self.reset(board),
        }
    }

    fn add_seconds(&mut self, secs: u16) {
        match self.phase {
            // while running the increment applies to `remaining` only,
            // the recorded preset stays untouched
            Phase::Idle | Phase::Running => {
                self.remaining = (self.remaining + secs).min(config::MAX_SECONDS);
                self.frame_dirty = true;
            }
            Phase::Paused | Phase::Finished => {}
        }
    }

    fn on_set<B: Board>(&mut self, board: &mut B) {
        match self.phase {
            Phase::Idle => {
                if self.remaining == 0 {
                    board.led_toggle();
                } else {
                    self.preset = self.remaining;
                    board.start_second_timer(1);
                    self.phase = Phase::Running;
                    self.frame_dirty = true;
                }
            }
            Phase::Running => {
                self.saved_count = board.stop_second_timer();
                self.blink = BlinkRate::OneHz;
                self.phase = Phase::Paused;
                // redraw so a colon lit by the last second goes dark
                self.frame_dirty = true;
            }
            Phase::Paused => {
                board.start_second_timer(self.saved_count);
                self.blink = BlinkRate::Off;
                self.phase = Phase::Running;
            }
            Phase::Finished => {
                self.remaining = self.preset;
                self.blink = BlinkRate::Off;
                board.led_off();
                self.colon = false;
                self.phase = Phase::Idle;
                self.frame_dirty = true;
            }
        }
    }

    /// Ultra-long Set press: back to a blank idle timer from any state.
    fn reset<B: Board>(&mut self, board: &mut B) {
        if self.phase == Phase::Running {
            board.stop_second_timer();
        }
        self.phase = Phase::Idle;
        self.remaining = 0;
        self.preset = 0;
        self.saved_count = 0;
        self.colon = false;
        self.blink = BlinkRate::Off;
        board.led_off();
        self.frame_dirty = true;
    }

    fn on_second<B: Board>(&mut self, board: &mut B) {
        if self.phase != Phase::Running {
            return;
        }
        self.remaining = self.remaining.saturating_sub(1);
        self.colon = !self.colon;
        self.frame_dirty = true;

        if self.remaining == 0 {
            board.stop_second_timer();
            self.blink = BlinkRate::TwoHz;
            board.led_on();
            self.phase = Phase::Finished;
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeBoard {
        timer_running: bool,
        /// Count handed back by `stop_second_timer`.
        timer_count: u16,
        started_from: Option<u16>,
        led: bool,
        led_toggles: u8,
        reject_submit: bool,
        submissions: Vec<Vec<u8>>,
    }

    impl FakeBoard {
        fn new() -> Self {
            Self {
                timer_running: false,
                timer_count: 0,
                started_from: None,
                led: false,
                led_toggles: 0,
                reject_submit: false,
                submissions: Vec::new(),
            }
        }

        fn last_submission(&self) -> &[u8] {
            self.submissions.last().expect("no display write issued")
        }
    }

    impl Board for FakeBoard {
        fn start_second_timer(&mut self, from_count: u16) {
            self.timer_running = true;
            self.started_from = Some(from_count);
        }
        fn stop_second_timer(&mut self) -> u16 {
            self.timer_running = false;
            self.timer_count
        }
        fn led_on(&mut self) {
            self.led = true;
        }
        fn led_off(&mut self) {
            self.led = false;
        }
        fn led_toggle(&mut self) {
            self.led = !self.led;
            self.led_toggles += 1;
        }
        fn submit_display(&mut self, bytes: &[u8]) -> nb::Result<(), SubmitError> {
            if self.reject_submit {
                return Err(nb::Error::WouldBlock);
            }
            self.submissions.push(bytes.to_vec());
            Ok(())
        }
    }

    fn released(button: Button) -> Event {
        Event::Button(ButtonEvent {
            button,
            kind: EventKind::Released,
        })
    }

    fn long_press(button: Button) -> Event {
        Event::Button(ButtonEvent {
            button,
            kind: EventKind::LongPress,
        })
    }

    /// App with `remaining` seconds loaded while idle.
    fn app_with(remaining: u16, board: &mut FakeBoard) -> App {
        let mut app = App::new();
        assert_eq!(remaining % 10, 0, "loaded via short Add presses");
        for _ in 0..remaining / 10 {
            app.handle(released(Button::Add), board);
        }
        assert_eq!(app.remaining(), remaining);
        app
    }

    #[test]
    fn add_short_increments_by_ten() {
        let mut board = FakeBoard::new();
        let mut app = App::new();

        app.handle(released(Button::Add), &mut board);
        assert_eq!(app.remaining(), 10);
        assert_eq!(app.phase(), Phase::Idle);
    }

    #[test]
    fn add_long_increments_by_sixty_and_clamps() {
        let mut board = FakeBoard::new();
        let mut app = App::new();

        for _ in 0..200 {
            app.handle(long_press(Button::Add), &mut board);
        }
        assert_eq!(app.remaining(), config::MAX_SECONDS);

        app.handle(released(Button::Add), &mut board);
        assert_eq!(app.remaining(), config::MAX_SECONDS);
    }

    #[test]
    fn set_with_zero_remaining_only_toggles_led() {
        let mut board = FakeBoard::new();
        let mut app = App::new();

        app.handle(released(Button::Set), &mut board);

        assert_eq!(app.phase(), Phase::Idle);
        assert_eq!(app.remaining(), 0);
        assert_eq!(board.led_toggles, 1);
        assert!(!board.timer_running);
    }

    #[test]
    fn set_starts_countdown_and_records_preset() {
        let mut board = FakeBoard::new();
        let mut app = app_with(30, &mut board);

        app.handle(released(Button::Set), &mut board);

        assert_eq!(app.phase(), Phase::Running);
        assert_eq!(app.preset(), 30);
        assert_eq!(board.started_from, Some(1));
        assert!(board.timer_running);
    }

    #[test]
    fn seconds_count_down_to_finished_exactly_at_zero() {
        let mut board = FakeBoard::new();
        let mut app = app_with(30, &mut board);
        app.handle(released(Button::Set), &mut board);

        for elapsed in 1..30 {
            app.handle(Event::SecondElapsed, &mut board);
            assert_eq!(app.remaining(), 30 - elapsed);
            assert_eq!(app.phase(), Phase::Running);
        }

        app.handle(Event::SecondElapsed, &mut board);
        assert_eq!(app.remaining(), 0);
        assert_eq!(app.phase(), Phase::Finished);
        assert!(!board.timer_running);
        assert!(board.led);
    }

    #[test]
    fn pause_preserves_the_exact_count() {
        let mut board = FakeBoard::new();
        let mut app = app_with(30, &mut board);
        app.handle(released(Button::Set), &mut board);

        board.timer_count = 12_345;
        app.handle(released(Button::Set), &mut board);
        assert_eq!(app.phase(), Phase::Paused);
        assert!(!board.timer_running);

        app.handle(released(Button::Set), &mut board);
        assert_eq!(app.phase(), Phase::Running);
        assert_eq!(board.started_from, Some(12_345));
    }

    #[test]
    fn pause_blinks_at_one_hz_and_resume_clears_it() {
        let mut board = FakeBoard::new();
        let mut app = app_with(10, &mut board);
        app.handle(released(Button::Set), &mut board);
        app.refresh(&mut board);
        board.submissions.clear();

        app.handle(released(Button::Set), &mut board);
        app.refresh(&mut board);
        assert_eq!(
            board.last_submission(),
            [lcd::blink_command(BlinkRate::OneHz)]
        );

        app.handle(released(Button::Set), &mut board);
        app.refresh(&mut board);
        assert_eq!(
            board.last_submission(),
            [lcd::blink_command(BlinkRate::Off)]
        );
    }

    #[test]
    fn pause_turns_a_lit_colon_off() {
        let mut board = FakeBoard::new();
        let mut app = app_with(30, &mut board);
        app.handle(released(Button::Set), &mut board);
        app.refresh(&mut board); // blink state
        app.refresh(&mut board); // frame

        app.handle(Event::SecondElapsed, &mut board);
        app.refresh(&mut board);
        assert_eq!(board.last_submission(), lcd::frame(0, 29, true));

        // pausing redraws the frame with the colon gated off
        app.handle(released(Button::Set), &mut board);
        app.refresh(&mut board);
        assert_eq!(
            board.last_submission(),
            [lcd::blink_command(BlinkRate::OneHz)]
        );
        app.refresh(&mut board);
        assert_eq!(board.last_submission(), lcd::frame(0, 29, false));
    }

    #[test]
    fn finish_blinks_at_two_hz() {
        let mut board = FakeBoard::new();
        let mut app = app_with(10, &mut board);
        app.handle(released(Button::Set), &mut board);
        app.refresh(&mut board);
        board.submissions.clear();

        for _ in 0..10 {
            app.handle(Event::SecondElapsed, &mut board);
        }
        assert_eq!(app.phase(), Phase::Finished);

        app.refresh(&mut board);
        assert_eq!(
            board.last_submission(),
            [lcd::blink_command(BlinkRate::TwoHz)]
        );
    }

    #[test]
    fn finished_set_reloads_preset_and_goes_idle() {
        let mut board = FakeBoard::new();
        let mut app = app_with(20, &mut board);
        app.handle(released(Button::Set), &mut board);
        for _ in 0..20 {
            app.handle(Event::SecondElapsed, &mut board);
        }
        assert_eq!(app.phase(), Phase::Finished);

        app.handle(released(Button::Set), &mut board);

        assert_eq!(app.phase(), Phase::Idle);
        assert_eq!(app.remaining(), 20);
        assert!(!board.led);
    }

    #[test]
    fn ultra_long_set_resets_from_any_phase() {
        for seconds in [0u16, 30] {
            for presses in 0..3 {
                let mut board = FakeBoard::new();
                let mut app = app_with(seconds, &mut board);
                // walk into idle/running/paused depending on press count
                for _ in 0..presses {
                    app.handle(released(Button::Set), &mut board);
                }

                app.handle(long_press(Button::Set), &mut board);

                assert_eq!(app.phase(), Phase::Idle);
                assert_eq!(app.remaining(), 0);
                assert_eq!(app.preset(), 0);
                assert!(!board.timer_running);
                assert!(!board.led);
            }
        }
    }

    #[test]
    fn add_is_ignored_while_paused_and_finished() {
        let mut board = FakeBoard::new();
        let mut app = app_with(10, &mut board);
        app.handle(released(Button::Set), &mut board);
        app.handle(released(Button::Set), &mut board);
        assert_eq!(app.phase(), Phase::Paused);

        app.handle(released(Button::Add), &mut board);
        assert_eq!(app.remaining(), 10);

        app.handle(released(Button::Set), &mut board);
        for _ in 0..10 {
            app.handle(Event::SecondElapsed, &mut board);
        }
        assert_eq!(app.phase(), Phase::Finished);

        app.handle(long_press(Button::Add), &mut board);
        assert_eq!(app.remaining(), 0);
    }

    #[test]
    fn running_increment_leaves_preset_untouched() {
        let mut board = FakeBoard::new();
        let mut app = app_with(30, &mut board);
        app.handle(released(Button::Set), &mut board);

        app.handle(released(Button::Add), &mut board);

        assert_eq!(app.remaining(), 40);
        assert_eq!(app.preset(), 30);
    }

    #[test]
    fn refresh_writes_blink_state_before_frame_content() {
        let mut board = FakeBoard::new();
        let mut app = App::new();

        app.refresh(&mut board);
        assert_eq!(
            board.last_submission(),
            [lcd::blink_command(BlinkRate::Off)]
        );

        app.refresh(&mut board);
        assert_eq!(board.last_submission(), lcd::frame(0, 0, false));
    }

    #[test]
    fn refresh_retries_on_the_next_tick_when_bus_is_busy() {
        let mut board = FakeBoard::new();
        let mut app = App::new();
        app.refresh(&mut board);
        app.refresh(&mut board);
        assert_eq!(board.submissions.len(), 2);

        app.handle(released(Button::Add), &mut board);
        board.reject_submit = true;
        app.refresh(&mut board);
        assert_eq!(board.submissions.len(), 2);

        board.reject_submit = false;
        app.refresh(&mut board);
        assert_eq!(board.last_submission(), lcd::frame(0, 10, false));
    }

    #[test]
    fn colon_toggles_with_the_seconds_while_running() {
        let mut board = FakeBoard::new();
        let mut app = app_with(30, &mut board);
        app.handle(released(Button::Set), &mut board);
        app.refresh(&mut board); // blink state
        app.refresh(&mut board); // frame

        app.handle(Event::SecondElapsed, &mut board);
        app.refresh(&mut board);
        assert_eq!(board.last_submission(), lcd::frame(0, 29, true));

        app.handle(Event::SecondElapsed, &mut board);
        app.refresh(&mut board);
        assert_eq!(board.last_submission(), lcd::frame(0, 28, false));
    }

    #[test]
    fn idle_refresh_is_quiescent_once_synced() {
        let mut board = FakeBoard::new();
        let mut app = App::new();
        app.refresh(&mut board);
        app.refresh(&mut board);
        let writes = board.submissions.len();

        for _ in 0..50 {
            app.refresh(&mut board);
        }
        assert_eq!(board.submissions.len(), writes);
    }
}
