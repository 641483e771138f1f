//! Gesture classification.
//!
//! Raw key transitions arrive as [`ButtonEvent`]s whose 16-bit code packs a
//! gesture *kind* in the high bits and a button index (1..=15) in the low
//! nibble, the way the input subsystem's long-press / multi-tap filters
//! report them:
//!
//! | Kind | Pressed           | Released          |
//! |------|-------------------|-------------------|
//! | 0    | raw press         | raw release       |
//! | 2    | long press start  | long press end    |
//! | 3    | -                 | single press      |
//! | 4    | -                 | double press      |
//! | 0xF  | maintenance keys (see [`maintenance`])|
//!
//! The [`GestureClassifier`] keeps a [`PressedMask`] of raw buttons that
//! are currently down. Whenever more than one is down, nothing is emitted:
//! chords are ambiguous and never trigger an action.

pub mod maintenance;
pub mod source;

use log::debug;

use crate::dispatch::ActionId;
use crate::scheduler::{AlarmQueue, TimerKey};

pub const KIND_RAW: u16 = 0x0;
pub const KIND_LONG_PRESS: u16 = 0x2;
pub const KIND_SINGLE_PRESS: u16 = 0x3;
pub const KIND_DOUBLE_PRESS: u16 = 0x4;
pub const KIND_MAINTENANCE: u16 = 0xF;

/// Key transition direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyValue {
    Released,
    Pressed,
}

impl KeyValue {
    /// Input-event value: 0 = release, 1 = press. Autorepeat (2) and
    /// anything else are not transitions.
    pub fn from_raw(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Released),
            1 => Some(Self::Pressed),
            _ => None,
        }
    }
}

/// One physical key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub code: u16,
    pub value: KeyValue,
}

impl ButtonEvent {
    pub const fn pressed(code: u16) -> Self {
        Self {
            code,
            value: KeyValue::Pressed,
        }
    }

    pub const fn released(code: u16) -> Self {
        Self {
            code,
            value: KeyValue::Released,
        }
    }

    pub const fn kind(&self) -> u16 {
        self.code >> 4
    }

    pub const fn button(&self) -> u8 {
        (self.code & 0x0F) as u8
    }
}

/// Pack a kind and a button index into a key code.
pub const fn key_code(kind: u16, button: u8) -> u16 {
    (kind << 4) | (button as u16 & 0x0F)
}

/// Classified gesture, carrying the button index (1..=15).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    RawPress(u8),
    RawRelease(u8),
    LongPressStart(u8),
    LongPressRepeat(u8),
    LongPressEnd(u8),
    SinglePress(u8),
    DoublePress(u8),
}

/// A gesture together with the key code it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gesture {
    pub kind: GestureKind,
    pub code: u16,
}

impl Gesture {
    /// Action requested by this gesture. Key codes double as action ids;
    /// raw transitions and the end of a long press request nothing.
    pub fn action(&self) -> ActionId {
        match self.kind {
            GestureKind::LongPressStart(_)
            | GestureKind::LongPressRepeat(_)
            | GestureKind::SinglePress(_)
            | GestureKind::DoublePress(_) => ActionId(self.code),
            GestureKind::RawPress(_) | GestureKind::RawRelease(_) | GestureKind::LongPressEnd(_) => {
                ActionId::NONE
            }
        }
    }
}

/// Set of raw buttons currently held down. Bit `n - 1` is button `n`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PressedMask(u16);

impl PressedMask {
    pub fn insert(&mut self, button: u8) {
        self.0 |= Self::bit(button);
    }

    pub fn remove(&mut self, button: u8) {
        self.0 &= !Self::bit(button);
    }

    pub fn contains(&self, button: u8) -> bool {
        self.0 & Self::bit(button) != 0
    }

    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    fn bit(button: u8) -> u16 {
        1u16 << (button.wrapping_sub(1) & 0x0F)
    }
}

/// Turns [`ButtonEvent`]s into [`Gesture`]s and drives the long-press
/// repeat alarm.
pub struct GestureClassifier {
    pressed: PressedMask,
    repeat_ms: u32,
}

impl GestureClassifier {
    pub fn new(repeat_ms: u32) -> Self {
        Self {
            pressed: PressedMask::default(),
            repeat_ms,
        }
    }

    pub fn pressed(&self) -> PressedMask {
        self.pressed
    }

    fn ambiguous(&self) -> bool {
        self.pressed.count() > 1
    }

    /// Classify one transition. `None` means no gesture: either the
    /// combination encodes none, or several buttons are down.
    pub fn classify(
        &mut self,
        event: ButtonEvent,
        now_ms: u32,
        alarms: &mut AlarmQueue,
    ) -> Option<Gesture> {
        let button = event.button();
        if button == 0 {
            debug!("gesture: code 0x{:x} has no button index", event.code);
            return None;
        }

        let kind = match (event.kind(), event.value) {
            (KIND_RAW, KeyValue::Pressed) => {
                self.pressed.insert(button);
                GestureKind::RawPress(button)
            }
            (KIND_RAW, KeyValue::Released) => {
                if !self.pressed.contains(button) {
                    return None;
                }
                // Judge the chord before this button leaves it.
                let ambiguous = self.ambiguous();
                self.pressed.remove(button);
                if ambiguous {
                    debug!("gesture: release of {} inside a chord suppressed", button);
                    return None;
                }
                return Some(Gesture {
                    kind: GestureKind::RawRelease(button),
                    code: event.code,
                });
            }
            (KIND_LONG_PRESS, KeyValue::Pressed) => GestureKind::LongPressStart(button),
            (KIND_LONG_PRESS, KeyValue::Released) => {
                alarms.cancel(TimerKey::LongPressRepeat);
                GestureKind::LongPressEnd(button)
            }
            (KIND_SINGLE_PRESS, KeyValue::Released) => GestureKind::SinglePress(button),
            (KIND_DOUBLE_PRESS, KeyValue::Released) => GestureKind::DoublePress(button),
            _ => return None,
        };

        if self.ambiguous() {
            debug!(
                "gesture: {:?} suppressed, mask=0b{:016b}",
                kind,
                self.pressed.bits()
            );
            return None;
        }

        if let GestureKind::LongPressStart(_) = kind {
            alarms.schedule(TimerKey::LongPressRepeat, event.code, now_ms, self.repeat_ms);
        }

        Some(Gesture {
            kind,
            code: event.code,
        })
    }

    /// The repeat alarm fired for long-press `code`. Re-arms itself and
    /// re-emits the long press unless a chord is being held.
    pub fn on_repeat(&mut self, code: u16, now_ms: u32, alarms: &mut AlarmQueue) -> Option<Gesture> {
        alarms.schedule(TimerKey::LongPressRepeat, code, now_ms, self.repeat_ms);
        if self.ambiguous() {
            return None;
        }
        Some(Gesture {
            kind: GestureKind::LongPressRepeat((code & 0x0F) as u8),
            code,
        })
    }
}
