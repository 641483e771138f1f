//! Battery sampling once joined: publishing, failure retention, re-arming.

use sceneswitch::app::events::AppEvent;
use sceneswitch::attributes::{AttributeId, BATTERY_PERCENTAGE_UNKNOWN, BATTERY_VOLTAGE_INVALID};
use sceneswitch::config::{BatteryConfig, DeviceConfig};
use sceneswitch::network::{Signal, Status};
use sceneswitch::scheduler::{TimerKey, MAX_DELAY_MS};

use crate::mock_hw::Rig;

fn joined(config: DeviceConfig) -> Rig {
    let mut rig = Rig::new(config);
    rig.signal(Signal::Steering, Status::OK, None).unwrap();
    rig
}

#[test]
fn no_sampling_before_join() {
    let mut rig = Rig::new(DeviceConfig::default());
    rig.hw.queue_adc(720);
    rig.advance(120_000);
    assert!(rig.ctl.battery().last().is_none());
    assert_eq!(rig.hw.adc.len(), 1);
}

#[test]
fn first_sample_right_after_join() {
    let mut rig = joined(DeviceConfig::default());
    // 720 mV at the pin, ×5 divider → 3.6 V, halfway between 3.0 and 4.2 V.
    rig.hw.queue_adc(720);
    rig.advance(0);

    let attrs = rig.ctl.attributes();
    assert_eq!(attrs.power.battery_voltage, 36);
    assert_eq!(attrs.power.battery_percentage_remaining, 100);
    assert_eq!(rig.stack.attribute(AttributeId::BATTERY_VOLTAGE), Some(36));
    assert_eq!(rig.stack.attribute(AttributeId::BATTERY_PERCENTAGE_REMAINING), Some(100));
    assert_eq!(
        rig.ctl.alarms().time_remaining(TimerKey::BatterySample, rig.now),
        Some(60_000)
    );
}

#[test]
fn direct_rail_uses_its_own_range() {
    let mut config = DeviceConfig::default();
    config.battery = BatteryConfig::direct_rail();
    let mut rig = joined(config);
    rig.hw.queue_adc(3200);
    rig.advance(0);

    let sample = rig.ctl.battery().last().unwrap();
    assert_eq!(sample.voltage_mv, 3200);
    assert_eq!(sample.percentage_decipercent, 1000);
    assert_eq!(rig.ctl.attributes().power.battery_percentage_remaining, 200);
}

#[test]
fn read_failure_keeps_previous_value_and_rearms() {
    let mut rig = joined(DeviceConfig::default());
    rig.hw.queue_adc_error();
    rig.advance(0);

    assert_eq!(rig.ctl.attributes().power.battery_voltage, BATTERY_VOLTAGE_INVALID);
    assert_eq!(
        rig.ctl.attributes().power.battery_percentage_remaining,
        BATTERY_PERCENTAGE_UNKNOWN
    );
    assert_eq!(rig.stack.attribute(AttributeId::BATTERY_VOLTAGE), None);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::BatteryReadFailed)), 1);
    assert!(rig.ctl.alarms().is_scheduled(TimerKey::BatterySample));

    rig.hw.queue_adc(800);
    rig.advance(60_000);
    assert_eq!(rig.ctl.attributes().power.battery_voltage, 40);

    rig.hw.queue_adc_error();
    rig.advance(60_000);
    assert_eq!(rig.ctl.attributes().power.battery_voltage, 40);
    assert_eq!(rig.ctl.battery().failures(), 2);
}

#[test]
fn samples_keep_coming() {
    let mut rig = joined(DeviceConfig::default());
    for _ in 0..4 {
        rig.hw.queue_adc(700);
    }
    rig.advance(180_000);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Battery(_))), 4);
}

#[test]
fn overlong_interval_waits_instead_of_spinning() {
    let mut config = DeviceConfig::default();
    config.battery.interval_ms = 3_000_000_000;
    let mut rig = joined(config);
    rig.hw.queue_adc(720);
    rig.hw.queue_adc(720);
    rig.advance(0);
    rig.advance(1);

    assert_eq!(rig.hw.adc.len(), 1);
    assert_eq!(
        rig.ctl.alarms().time_remaining(TimerKey::BatterySample, rig.now),
        Some(MAX_DELAY_MS - 1)
    );
}

#[test]
fn rejected_attribute_write_keeps_local_state() {
    let mut rig = joined(DeviceConfig::default());
    rig.stack.reject_attributes = true;
    rig.hw.queue_adc(720);
    rig.advance(0);

    assert!(matches!(rig.sink.events.last(), Some(AppEvent::Battery(_))));
    assert_eq!(rig.ctl.attributes().power.battery_voltage, 36);
    assert_eq!(rig.stack.attribute(AttributeId::BATTERY_PERCENTAGE_REMAINING), Some(100));
}
