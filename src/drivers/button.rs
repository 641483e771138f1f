//! Press-duration classifier for single-button on/off switches.
//!
//! Boards without a multi-tap input filter report only raw presses. There,
//! the time a button is held picks the command:
//!
//! | Held for                        | Command  |
//! |---------------------------------|----------|
//! | < window                        | `On`     |
//! | window .. window + rearm        | `Off`    |
//! | ≥ window + rearm                | `Toggle` |
//!
//! Timing uses the `PressWindow` alarm: it first fires after the
//! classification window, then re-arms once more after the re-arm period.
//! The classifier consumes raw press / release gestures, so a press that
//! is part of a chord never starts a classification.

use log::debug;

use crate::dispatch::OnOffCommand;
use crate::gesture::GestureKind;
use crate::scheduler::{AlarmQueue, TimerKey};

/// Number of alarm ticks after which the command stops changing.
const MAX_TICKS: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressState {
    Idle,
    AwaitingRelease { since_ms: u32, ticks: u8 },
}

pub struct PressDurationClassifier {
    button: u8,
    window_ms: u32,
    rearm_ms: u32,
    state: PressState,
}

impl PressDurationClassifier {
    pub fn new(button: u8, window_ms: u32, rearm_ms: u32) -> Self {
        Self {
            button,
            window_ms,
            rearm_ms,
            state: PressState::Idle,
        }
    }

    pub fn state(&self) -> PressState {
        self.state
    }

    /// Feed a classified gesture. Returns a command when the watched
    /// button is released after a tracked press.
    pub fn on_gesture(
        &mut self,
        kind: GestureKind,
        now_ms: u32,
        alarms: &mut AlarmQueue,
    ) -> Option<OnOffCommand> {
        match kind {
            GestureKind::RawPress(b) if b == self.button => {
                self.state = PressState::AwaitingRelease {
                    since_ms: now_ms,
                    ticks: 0,
                };
                alarms.schedule(TimerKey::PressWindow, b as u16, now_ms, self.window_ms);
                None
            }
            GestureKind::RawRelease(b) if b == self.button => {
                let PressState::AwaitingRelease { since_ms, ticks } = self.state else {
                    return None;
                };
                alarms.cancel(TimerKey::PressWindow);
                self.state = PressState::Idle;
                let command = match ticks {
                    0 => OnOffCommand::On,
                    1 => OnOffCommand::Off,
                    _ => OnOffCommand::Toggle,
                };
                debug!(
                    "button {}: held {}ms, {} ticks -> {:?}",
                    b,
                    now_ms.wrapping_sub(since_ms),
                    ticks,
                    command
                );
                Some(command)
            }
            _ => None,
        }
    }

    /// The `PressWindow` alarm fired.
    pub fn on_tick(&mut self, now_ms: u32, alarms: &mut AlarmQueue) {
        if let PressState::AwaitingRelease { ticks, .. } = &mut self.state {
            *ticks = ticks.saturating_add(1).min(MAX_TICKS);
            if *ticks < MAX_TICKS {
                alarms.schedule(
                    TimerKey::PressWindow,
                    self.button as u16,
                    now_ms,
                    self.rearm_ms,
                );
            }
        }
    }
}
