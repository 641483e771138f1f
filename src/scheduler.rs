//! Alarm queue.
//!
//! Every delay in the core is a one-shot alarm that re-enters the
//! [`Controller`](crate::app::service::Controller) later; periodic behaviour
//! is an alarm handler that re-arms itself. Alarms are keyed by a
//! [`TimerKey`] naming the logical timer, and carry a small parameter.
//!
//! ```text
//!  component ──schedule(key, param, delay)──▶ ┌────────────┐
//!  component ──cancel(key)──────────────────▶ │ AlarmQueue │
//!  reactor ───time_remaining(key)───────────▶ │ (heapless) │
//!                                             └─────┬──────┘
//!  Controller::poll(now) ◀──pop_due(now)────────────┘
//! ```
//!
//! Scheduling a key that is already pending replaces it, so each logical
//! timer has at most one live instance. Time is a wrapping `u32` millisecond
//! counter supplied by the caller, so no delay may exceed
//! [`MAX_DELAY_MS`]; longer delays are clamped to it.

use heapless::Vec;
use log::{debug, warn};

/// Logical timers owned by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// Long-press repeat; param = key code being repeated.
    LongPressRepeat,
    /// Next LED sequencer transition.
    BlinkTransition,
    /// "Not joined" heartbeat pulse; param = interval in seconds.
    JoinHeartbeat,
    /// Next battery sample.
    BatterySample,
    /// Press-duration classification step; param = button index.
    PressWindow,
}

impl TimerKey {
    /// Number of distinct keys, which bounds the queue size.
    pub const COUNT: usize = 5;
}

/// A fired alarm handed back to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alarm {
    pub key: TimerKey,
    pub param: u16,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    alarm: Alarm,
    deadline_ms: u32,
    /// Insertion order, breaks ties between equal deadlines.
    seq: u32,
}

/// Longest delay the wrapping comparison can tell apart from "overdue".
pub const MAX_DELAY_MS: u32 = i32::MAX as u32;

/// Signed distance from `now` to `deadline`; negative once overdue.
fn until(deadline_ms: u32, now_ms: u32) -> i32 {
    deadline_ms.wrapping_sub(now_ms) as i32
}

/// Fixed-capacity alarm queue with one slot per [`TimerKey`].
pub struct AlarmQueue {
    entries: Vec<Entry, { TimerKey::COUNT }>,
    next_seq: u32,
}

impl Default for AlarmQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl AlarmQueue {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    /// Arm `key` to fire `delay_ms` after `now_ms`, replacing any pending
    /// instance of the same key.
    pub fn schedule(&mut self, key: TimerKey, param: u16, now_ms: u32, delay_ms: u32) {
        self.cancel(key);
        let delay_ms = if delay_ms > MAX_DELAY_MS {
            warn!("AlarmQueue: {:?} delay {}ms clamped to {}ms", key, delay_ms, MAX_DELAY_MS);
            MAX_DELAY_MS
        } else {
            delay_ms
        };
        let entry = Entry {
            alarm: Alarm { key, param },
            deadline_ms: now_ms.wrapping_add(delay_ms),
            seq: self.next_seq,
        };
        self.next_seq = self.next_seq.wrapping_add(1);
        if self.entries.push(entry).is_err() {
            warn!("AlarmQueue: no slot for {:?}", key);
            return;
        }
        debug!("AlarmQueue: {:?}({}) in {}ms", key, param, delay_ms);
    }

    /// Cancel the pending instance of `key`. Returns whether one existed.
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        match self.entries.iter().position(|e| e.alarm.key == key) {
            Some(idx) => {
                self.entries.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    /// Milliseconds until `key` fires, or `None` if it is not scheduled.
    /// An overdue alarm reports zero.
    pub fn time_remaining(&self, key: TimerKey, now_ms: u32) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.alarm.key == key)
            .map(|e| until(e.deadline_ms, now_ms).max(0) as u32)
    }

    pub fn is_scheduled(&self, key: TimerKey) -> bool {
        self.entries.iter().any(|e| e.alarm.key == key)
    }

    /// Remove and return the most overdue alarm, if any is due at `now_ms`.
    /// Equal deadlines fire in scheduling order.
    pub fn pop_due(&mut self, now_ms: u32) -> Option<Alarm> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| until(e.deadline_ms, now_ms) <= 0)
            .min_by_key(|(_, e)| (until(e.deadline_ms, now_ms), e.seq))
            .map(|(i, _)| i)?;
        Some(self.entries.swap_remove(idx).alarm)
    }

    /// Delay until the earliest pending alarm (zero if one is overdue).
    pub fn next_deadline(&self, now_ms: u32) -> Option<u32> {
        self.entries
            .iter()
            .map(|e| until(e.deadline_ms, now_ms).max(0) as u32)
            .min()
    }

    /// Number of pending alarms.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
