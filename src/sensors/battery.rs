//! Battery telemetry sampler.
//!
//! Reads the cell voltage through the [`AdcPort`], corrects for the board's
//! voltage divider, maps it linearly onto 0..=1000 tenths of a percent and
//! publishes both values into the power-configuration attributes.
//!
//! The sampler re-arms its alarm before touching the ADC, so a failed read
//! never stops future sampling. On failure the previously published values
//! stay in place.

use log::{debug, warn};

use crate::app::ports::{AdcPort, ProtocolStack};
use crate::attributes::{AttributeId, ClusterId, DeviceAttributes, encode_percentage, encode_voltage};
use crate::config::BatteryConfig;
use crate::error::SensorError;
use crate::scheduler::{AlarmQueue, TimerKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatterySample {
    pub voltage_mv: u32,
    /// Tenths of a percent, 0..=1000.
    pub percentage_decipercent: u16,
}

/// Linear state of charge between `min_mv` (empty) and `max_mv` (full).
pub fn percentage(voltage_mv: u32, min_mv: u32, max_mv: u32) -> u16 {
    let range = max_mv.saturating_sub(min_mv);
    if range == 0 {
        return if voltage_mv >= max_mv { 1000 } else { 0 };
    }
    let above = voltage_mv.saturating_sub(min_mv).min(range);
    (1000 * above as u64 / range as u64) as u16
}

pub struct BatterySampler {
    config: BatteryConfig,
    last: Option<BatterySample>,
    failures: u32,
}

impl BatterySampler {
    pub fn new(config: BatteryConfig) -> Self {
        Self {
            config,
            last: None,
            failures: 0,
        }
    }

    /// Last sample that was published.
    pub fn last(&self) -> Option<BatterySample> {
        self.last
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Raw ADC sample to a sample at the battery terminals.
    pub fn measure(&self, adc: &mut impl AdcPort) -> Result<BatterySample, SensorError> {
        let raw = adc.sample()?;
        let at_pin = adc.raw_to_millivolts(raw)?;
        let voltage_mv = (at_pin.max(0) as u32).saturating_mul(self.config.divider);
        Ok(BatterySample {
            voltage_mv,
            percentage_decipercent: percentage(voltage_mv, self.config.min_mv, self.config.max_mv),
        })
    }

    /// The `BatterySample` alarm fired.
    pub fn tick(
        &mut self,
        now_ms: u32,
        alarms: &mut AlarmQueue,
        adc: &mut impl AdcPort,
        attributes: &mut DeviceAttributes,
        stack: &mut impl ProtocolStack,
    ) -> Result<BatterySample, SensorError> {
        alarms.schedule(TimerKey::BatterySample, 0, now_ms, self.config.interval_ms);

        let sample = match self.measure(adc) {
            Ok(s) => s,
            Err(e) => {
                self.failures = self.failures.saturating_add(1);
                warn!("battery: {}", e);
                return Err(e);
            }
        };

        let voltage = encode_voltage(sample.voltage_mv);
        let percent = encode_percentage(sample.percentage_decipercent);
        attributes.power.battery_voltage = voltage;
        attributes.power.battery_percentage_remaining = percent;

        for (attr, value) in [
            (AttributeId::BATTERY_VOLTAGE, voltage),
            (AttributeId::BATTERY_PERCENTAGE_REMAINING, percent),
        ] {
            if let Err(e) = stack.set_attribute(ClusterId::POWER_CONFIG, attr, value) {
                warn!("battery: attribute 0x{:04x} not updated: {}", attr.0, e);
            }
        }

        debug!(
            "battery: {} mV, {}.{}%",
            sample.voltage_mv,
            sample.percentage_decipercent / 10,
            sample.percentage_decipercent % 10
        );
        self.last = Some(sample);
        Ok(sample)
    }
}
