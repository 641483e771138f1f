//! Attribute state published on the device endpoint.
//!
//! One explicit struct, built at startup and owned by the
//! [`Controller`](crate::app::service::Controller), replaces a set of
//! process-wide attribute variables. The battery sampler updates the
//! power-configuration part and mirrors each value into the stack.

use crate::config::DeviceInfo;

/// Cluster identifier on the device endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterId(pub u16);

impl ClusterId {
    /// Power configuration, home of the battery attributes.
    pub const POWER_CONFIG: Self = Self(0x0001);
}

/// Attribute identifier within a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeId(pub u16);

impl AttributeId {
    /// Power configuration: battery voltage, 100 mV units.
    pub const BATTERY_VOLTAGE: Self = Self(0x0020);
    /// Power configuration: remaining capacity, 0.5 % units.
    pub const BATTERY_PERCENTAGE_REMAINING: Self = Self(0x0021);
}

/// Encoded "no reading yet" for the battery voltage attribute.
pub const BATTERY_VOLTAGE_INVALID: u8 = 0xFF;
/// Encoded "unknown" for the percentage attribute.
pub const BATTERY_PERCENTAGE_UNKNOWN: u8 = 0xFF;
/// Largest valid voltage encoding.
const BATTERY_VOLTAGE_MAX: u8 = 0xFE;

/// Built-in, non-replaceable cell.
pub const BATTERY_SIZE_BUILT_IN: u8 = 0x01;
/// Battery-powered device.
pub const POWER_SOURCE_BATTERY: u8 = 0x03;

/// Power configuration cluster attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerConfig {
    pub battery_voltage: u8,
    pub battery_percentage_remaining: u8,
    pub battery_size: u8,
    pub battery_quantity: u8,
    /// Rated voltage, 100 mV units.
    pub battery_rated_voltage: u8,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            battery_voltage: BATTERY_VOLTAGE_INVALID,
            battery_percentage_remaining: BATTERY_PERCENTAGE_UNKNOWN,
            battery_size: BATTERY_SIZE_BUILT_IN,
            battery_quantity: 1,
            battery_rated_voltage: (3700 / 100) as u8,
        }
    }
}

/// Everything the endpoint exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAttributes {
    pub info: DeviceInfo,
    pub power_source: u8,
    pub power: PowerConfig,
}

impl DeviceAttributes {
    pub fn new(info: DeviceInfo) -> Self {
        Self {
            info,
            power_source: POWER_SOURCE_BATTERY,
            power: PowerConfig::default(),
        }
    }
}

/// Millivolts to the 100 mV voltage encoding, saturating below the
/// "invalid" marker.
pub fn encode_voltage(millivolts: u32) -> u8 {
    (millivolts / 100).min(BATTERY_VOLTAGE_MAX as u32) as u8
}

/// Tenths of a percent (0..=1000) to the 0.5 % encoding (0..=200).
pub fn encode_percentage(decipercent: u16) -> u8 {
    (decipercent.min(1000) / 5) as u8
}
