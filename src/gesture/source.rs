//! Gesture sources: adapters from a board's native input reports to
//! [`ButtonEvent`]s.
//!
//! Boards differ in how they report keys. Some run an input subsystem that
//! already encodes long / single / double presses into the key code, others
//! only report a bitmask of buttons that changed. Each style gets a
//! [`GestureSource`]; the classifier behind it is the same.

use heapless::Vec;

use super::{ButtonEvent, KIND_RAW, KIND_SINGLE_PRESS, KeyValue, key_code};

/// Upper bound on events produced by one report (15 buttons × 2).
pub const MAX_EVENTS_PER_REPORT: usize = 32;

pub type Translated = Vec<ButtonEvent, MAX_EVENTS_PER_REPORT>;

/// Converts one native input report into zero or more key transitions.
pub trait GestureSource {
    type Report;

    fn translate(&mut self, report: Self::Report) -> Translated;
}

// ── Input-subsystem events ────────────────────────────────────

/// Event type of key reports in the input subsystem.
pub const EV_KEY: u8 = 0x01;

/// A report from an input-event style driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputReport {
    pub event_type: u8,
    pub code: u16,
    pub value: i32,
}

/// Passes key events through; drops other event types and autorepeat.
#[derive(Debug, Default)]
pub struct KeyCodeSource;

impl GestureSource for KeyCodeSource {
    type Report = InputReport;

    fn translate(&mut self, report: InputReport) -> Translated {
        let mut out = Translated::new();
        if report.event_type != EV_KEY {
            return out;
        }
        if let Some(value) = KeyValue::from_raw(report.value) {
            // Capacity is far above one.
            let _ = out.push(ButtonEvent {
                code: report.code,
                value,
            });
        }
        out
    }
}

// ── Button bitmask reports ────────────────────────────────────

/// Development-kit style report: current button levels and which changed.
/// Bit `n` is button `n + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskReport {
    pub state: u32,
    pub changed: u32,
}

/// Expands a bitmask report into raw transitions. A press additionally
/// yields a single-press code for that button, so one tap recalls its
/// scene immediately.
#[derive(Debug, Default)]
pub struct BitmaskSource;

impl GestureSource for BitmaskSource {
    type Report = MaskReport;

    fn translate(&mut self, report: MaskReport) -> Translated {
        let mut out = Translated::new();
        for bit in 0..15u8 {
            let mask = 1u32 << bit;
            if report.changed & mask == 0 {
                continue;
            }
            let button = bit + 1;
            let raw = key_code(KIND_RAW, button);
            if report.state & mask != 0 {
                let _ = out.push(ButtonEvent::pressed(raw));
                let _ = out.push(ButtonEvent::released(key_code(KIND_SINGLE_PRESS, button)));
            } else {
                let _ = out.push(ButtonEvent::released(raw));
            }
        }
        out
    }
}
