//! Device configuration
//!
//! All deployment parameters for the scene switch. Values come from
//! [`DeviceConfig::default`], a JSON document supplied at provisioning time,
//! or a postcard blob previously persisted by the platform.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scheduler::MAX_DELAY_MS;

/// Capacity of the basic-cluster strings.
pub const INFO_STR_CAP: usize = 32;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub battery: BatteryConfig,
    pub input: InputConfig,
    pub dispatch: DispatchConfig,
    pub network: NetworkConfig,
    pub device: DeviceInfo,
}

// --- Battery ---

/// Battery rail description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryConfig {
    /// Voltage reported as 0 %.
    pub min_mv: u32,
    /// Voltage reported as 100 %.
    pub max_mv: u32,
    /// Divider correction applied to the converted reading (1 = direct rail).
    pub divider: u32,
    /// Sampling period in milliseconds.
    pub interval_ms: u32,
}

impl BatteryConfig {
    /// Li-ion cell measured through the SoC's internal ÷5 high-voltage input.
    pub const fn divided_rail() -> Self {
        Self {
            min_mv: 3000,
            max_mv: 4200,
            divider: 5,
            interval_ms: 60_000,
        }
    }

    /// Two alkaline cells measured directly on the supply rail.
    pub const fn direct_rail() -> Self {
        Self {
            min_mv: 2000,
            max_mv: 3200,
            divider: 1,
            interval_ms: 60_000,
        }
    }
}

// --- Input ---

/// Which gesture pipeline drives the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputMode {
    /// Encoded key codes (long / single / double press kinds) map to actions.
    Gestures,
    /// Hold duration of one raw button maps to On / Off / Toggle.
    PressDuration { button: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    pub mode: InputMode,
    /// Period of the long-press repeat alarm.
    pub long_press_repeat_ms: u32,
    /// Hold time before a press stops being "short".
    pub press_window_ms: u32,
    /// Hold time per further classification step.
    pub press_rearm_ms: u32,
}

// --- Dispatch ---

/// What kind of command an action id turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Binding {
    /// Recall scene `action & 0xFF` in `group_id`.
    Scenes { group_id: u16 },
    /// Action ids 1 / 2 / 3 send On / Off / Toggle.
    OnOff,
}

/// How a send buffer is obtained from the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Acquisition {
    /// Fail fast when the pool is empty.
    Immediate,
    /// Let the stack queue the request and call back once a buffer frees up.
    Delayed,
}

/// Addressing of outgoing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub short_addr: u16,
    pub endpoint: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub binding: Binding,
    pub acquisition: Acquisition,
    pub destination: Destination,
    pub source_endpoint: u8,
}

// --- Network ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Period of the "not joined" heartbeat pulse.
    pub heartbeat_interval_s: u8,
    /// Poll interval requested from the stack once joined.
    pub long_poll_interval_ms: u32,
}

// --- Device information ---

/// Basic-cluster identification strings and versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub manufacturer: String<INFO_STR_CAP>,
    pub model: String<INFO_STR_CAP>,
    pub date_code: String<INFO_STR_CAP>,
    pub sw_build_id: String<INFO_STR_CAP>,
    /// Major / minor nibbles.
    pub app_version: u8,
    pub hw_version: u8,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            manufacturer: info_str("SceneSwitch"),
            model: info_str("Scene controller"),
            date_code: info_str("20250503"),
            sw_build_id: info_str(env!("CARGO_PKG_VERSION")),
            app_version: 0x01,
            hw_version: 0x01,
        }
    }
}

fn info_str(s: &str) -> String<INFO_STR_CAP> {
    String::try_from(s).unwrap_or_default()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            mode: InputMode::Gestures,
            long_press_repeat_ms: 1000,
            press_window_ms: 500,
            press_rearm_ms: 1500,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            binding: Binding::Scenes { group_id: 0 },
            acquisition: Acquisition::Delayed,
            destination: Destination {
                short_addr: 0x0000,
                endpoint: 1,
            },
            source_endpoint: 1,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_s: 5,
            long_poll_interval_ms: 900_000,
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            battery: BatteryConfig::divided_rail(),
            input: InputConfig::default(),
            dispatch: DispatchConfig::default(),
            network: NetworkConfig::default(),
            device: DeviceInfo::default(),
        }
    }
}

impl DeviceConfig {
    /// Reject values that would break an invariant of the core.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.battery;
        if b.min_mv >= b.max_mv {
            return Err(ConfigError::ValidationFailed("battery.min_mv must be below max_mv"));
        }
        if b.divider == 0 {
            return Err(ConfigError::ValidationFailed("battery.divider must be non-zero"));
        }
        if !(1..=MAX_DELAY_MS).contains(&b.interval_ms) {
            return Err(ConfigError::ValidationFailed("battery.interval_ms out of range"));
        }

        let i = &self.input;
        let timings = [i.long_press_repeat_ms, i.press_window_ms, i.press_rearm_ms];
        if timings.iter().any(|t| !(1..=MAX_DELAY_MS).contains(t)) {
            return Err(ConfigError::ValidationFailed("input timings out of range"));
        }
        match i.mode {
            InputMode::PressDuration { button } => {
                if !(1..=15).contains(&button) {
                    return Err(ConfigError::ValidationFailed("input.mode.button must be 1..=15"));
                }
                if self.dispatch.binding != Binding::OnOff {
                    return Err(ConfigError::ValidationFailed(
                        "press-duration input requires the OnOff binding",
                    ));
                }
            }
            InputMode::Gestures => {
                if self.dispatch.binding == Binding::OnOff {
                    return Err(ConfigError::ValidationFailed(
                        "gesture input requires the Scenes binding",
                    ));
                }
            }
        }

        if self.network.heartbeat_interval_s == 0 {
            return Err(ConfigError::ValidationFailed("network.heartbeat_interval_s must be non-zero"));
        }
        Ok(())
    }

    /// Parse and validate a JSON provisioning document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            log::warn!("config: JSON rejected: {}", e);
            ConfigError::Corrupted
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Encode for persistent storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        postcard::to_allocvec(self).map_err(|_| ConfigError::EncodeFailed)
    }

    /// Decode a persisted blob and validate it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }
}
