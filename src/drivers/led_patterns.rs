//! LED feedback sequencer.
//!
//! Drives the single indicator LED through timed on/off programs. Only one
//! program runs at a time: starting a new one cancels the pending
//! transition and restarts from the "on" phase. Requests are never queued.
//!
//! Identify is a mode, not a program: a blink played while it is active
//! runs once (a solid program becomes a single pulse) and the toggle
//! resumes when it ends. Only [`stop`](LedSequencer::stop) leaves the mode.
//!
//! ## States
//!
//! | State           | LED | Next transition                               |
//! |-----------------|-----|-----------------------------------------------|
//! | `Idle`          | off | none                                          |
//! | `On { 0 }`      | on  | none (solid)                                  |
//! | `On { n }`      | on  | after `on_ms` → off, then `Off { n - 1 }` if n > 1 |
//! | `Off { n }`     | off | after `off_ms` → `On { n }`                   |
//! | `Identify`      | ±   | toggles every 100 ms until stopped            |
//!
//! ## Well-known programs
//!
//! | Program         | On    | Off   | Count | Use                        |
//! |-----------------|-------|-------|-------|----------------------------|
//! | `CONFIRM`       | 200ms | -     | solid | command sent, network join |
//! | `ERROR`         | 50ms  | 200ms | 2     | command failed             |
//! | `ACK`           | 100ms | -     | 1     | gesture accepted           |
//! | `HEARTBEAT`     | 50ms  | -     | 1     | not joined, every few s    |

use log::debug;

use crate::app::ports::LedPort;
use crate::scheduler::{AlarmQueue, TimerKey};

/// Half period of the identify toggle.
pub const IDENTIFY_PERIOD_MS: u32 = 100;

/// One on/off program. `count == 0` turns the LED on and holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkProgram {
    pub on_ms: u32,
    pub off_ms: u32,
    pub count: u8,
}

impl BlinkProgram {
    pub const CONFIRM: Self = Self::new(200, 0, 0);
    pub const ERROR: Self = Self::new(50, 200, 2);
    pub const ACK: Self = Self::new(100, 0, 1);
    pub const HEARTBEAT: Self = Self::new(50, 0, 1);

    pub const fn new(on_ms: u32, off_ms: u32, count: u8) -> Self {
        Self { on_ms, off_ms, count }
    }

    pub const fn is_solid(&self) -> bool {
        self.count == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    On { remaining: u8 },
    Off { remaining: u8 },
    Identify,
}

pub struct LedSequencer {
    program: BlinkProgram,
    state: SequencerState,
    lit: bool,
    identify: bool,
}

impl Default for LedSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl LedSequencer {
    pub fn new() -> Self {
        Self {
            program: BlinkProgram::new(0, 0, 0),
            state: SequencerState::Idle,
            lit: false,
            identify: false,
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Last level written to the LED.
    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn program(&self) -> BlinkProgram {
        self.program
    }

    fn drive(&mut self, on: bool, led: &mut impl LedPort) {
        self.lit = on;
        led.set(on);
    }

    /// Replace whatever is running with `program`, starting lit.
    pub fn play(
        &mut self,
        program: BlinkProgram,
        now_ms: u32,
        alarms: &mut AlarmQueue,
        led: &mut impl LedPort,
    ) {
        alarms.cancel(TimerKey::BlinkTransition);
        debug!("led: play {:?}", program);
        self.program = program;
        let count = if self.identify { program.count.max(1) } else { program.count };
        self.enter_on(count, now_ms, alarms, led);
    }

    fn enter_on(&mut self, remaining: u8, now_ms: u32, alarms: &mut AlarmQueue, led: &mut impl LedPort) {
        self.drive(true, led);
        self.state = SequencerState::On { remaining };
        if remaining >= 1 {
            alarms.schedule(
                TimerKey::BlinkTransition,
                remaining as u16,
                now_ms,
                self.program.on_ms,
            );
        }
    }

    /// Cancel any program and force the LED off.
    pub fn stop(&mut self, alarms: &mut AlarmQueue, led: &mut impl LedPort) {
        alarms.cancel(TimerKey::BlinkTransition);
        self.state = SequencerState::Idle;
        self.identify = false;
        self.drive(false, led);
    }

    /// Blink continuously until [`stop`](Self::stop).
    pub fn start_identify(&mut self, now_ms: u32, alarms: &mut AlarmQueue, led: &mut impl LedPort) {
        self.identify = true;
        self.drive(true, led);
        self.resume_identify(now_ms, alarms);
    }

    fn resume_identify(&mut self, now_ms: u32, alarms: &mut AlarmQueue) {
        self.state = SequencerState::Identify;
        alarms.schedule(TimerKey::BlinkTransition, 0, now_ms, IDENTIFY_PERIOD_MS);
    }

    /// Identify mode is active, even while a one-shot blink preempts it.
    pub fn is_identifying(&self) -> bool {
        self.identify
    }

    /// The `BlinkTransition` alarm fired.
    pub fn on_transition(&mut self, now_ms: u32, alarms: &mut AlarmQueue, led: &mut impl LedPort) {
        match self.state {
            SequencerState::On { remaining } if remaining >= 1 => {
                self.drive(false, led);
                if remaining > 1 {
                    self.state = SequencerState::Off {
                        remaining: remaining - 1,
                    };
                    alarms.schedule(
                        TimerKey::BlinkTransition,
                        (remaining - 1) as u16,
                        now_ms,
                        self.program.off_ms,
                    );
                } else if self.identify {
                    self.resume_identify(now_ms, alarms);
                } else {
                    self.state = SequencerState::Idle;
                }
            }
            SequencerState::Off { remaining } => {
                self.enter_on(remaining, now_ms, alarms, led);
            }
            SequencerState::Identify => {
                let next = !self.lit;
                self.drive(next, led);
                alarms.schedule(TimerKey::BlinkTransition, 0, now_ms, IDENTIFY_PERIOD_MS);
            }
            // Solid or idle: nothing is pending, a stale alarm is ignored.
            SequencerState::On { .. } | SequencerState::Idle => {}
        }
    }
}
