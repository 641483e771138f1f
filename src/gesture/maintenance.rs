//! Maintenance key combinations.
//!
//! A separate very-long-press filter reports three service codes. They are
//! not gestures: nothing is dispatched to the network, the core only asks
//! the stack or the platform to act.
//!
//! | Code       | Condition            | Request                |
//! |------------|----------------------|------------------------|
//! | `0xF1`     | pressed              | reboot into bootloader |
//! | `0xF3+0xF4`| both held together   | local factory reset    |

use log::warn;

use super::{ButtonEvent, KIND_MAINTENANCE, KeyValue};

pub const CODE_BOOTLOADER: u16 = 0xF1;
pub const CODE_RESET_A: u16 = 0xF3;
pub const CODE_RESET_B: u16 = 0xF4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceAction {
    FactoryReset,
    RebootToBootloader,
}

/// Tracks the two reset keys.
#[derive(Debug, Default)]
pub struct MaintenanceKeys {
    reset_a: bool,
    reset_b: bool,
}

impl MaintenanceKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `event` belongs to the maintenance range.
    pub fn owns(event: &ButtonEvent) -> bool {
        event.kind() == KIND_MAINTENANCE
    }

    /// Feed a maintenance-range event.
    pub fn on_event(&mut self, event: ButtonEvent) -> Option<MaintenanceAction> {
        let pressed = event.value == KeyValue::Pressed;
        let was_combo = self.reset_a && self.reset_b;
        match event.code {
            CODE_RESET_A => self.reset_a = pressed,
            CODE_RESET_B => self.reset_b = pressed,
            CODE_BOOTLOADER if pressed => {
                warn!("maintenance: bootloader key");
                return Some(MaintenanceAction::RebootToBootloader);
            }
            _ => return None,
        }
        if self.reset_a && self.reset_b && !was_combo {
            warn!("maintenance: factory reset combination held");
            return Some(MaintenanceAction::FactoryReset);
        }
        None
    }
}
