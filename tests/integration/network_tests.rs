//! Lifecycle signals → LED, heartbeat, battery start, buffer release.

use sceneswitch::app::events::AppEvent;
use sceneswitch::app::inputs::Input;
use sceneswitch::app::ports::BufferId;
use sceneswitch::config::DeviceConfig;
use sceneswitch::error::{Error, StackError};
use sceneswitch::network::{NetworkState, Signal, Status};
use sceneswitch::scheduler::TimerKey;

use crate::mock_hw::{Rig, StackCall};

const FAILED: Status = Status(-1);

fn pulses(rig: &Rig) -> usize {
    rig.hw.led.iter().filter(|on| **on).count()
}

#[test]
fn steering_success_joins() {
    let mut rig = Rig::new(DeviceConfig::default());
    rig.signal(Signal::Other(0x01), Status::OK, None).unwrap();
    assert!(rig.ctl.alarms().is_scheduled(TimerKey::JoinHeartbeat));

    rig.signal(Signal::Steering, Status::OK, Some(BufferId(9))).unwrap();

    assert_eq!(rig.ctl.network_state(), NetworkState::Joined);
    assert!(!rig.ctl.alarms().is_scheduled(TimerKey::JoinHeartbeat));
    assert!(rig.hw.led_on());
    assert!(!rig.ctl.alarms().is_scheduled(TimerKey::BlinkTransition));
    assert!(rig.stack.calls.contains(&StackCall::LongPoll(900_000)));
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::NetworkChanged {
                from: NetworkState::Joining,
                to: NetworkState::Joined
            }
        )),
        1
    );
}

#[test]
fn signal_forwarded_then_buffer_released_once() {
    let mut rig = Rig::new(DeviceConfig::default());
    rig.signal(Signal::Steering, Status::OK, Some(BufferId(9))).unwrap();

    let n = rig.stack.calls.len();
    assert_eq!(
        &rig.stack.calls[n - 2..],
        &[
            StackCall::DefaultHandler(Signal::Steering, Status::OK),
            StackCall::Release(BufferId(9)),
        ]
    );
    assert_eq!(rig.stack.releases(), vec![BufferId(9)]);
}

#[test]
fn device_reboot_behaves_like_steering() {
    let mut rig = Rig::new(DeviceConfig::default());
    rig.signal(Signal::DeviceReboot, Status::OK, None).unwrap();
    assert_eq!(rig.ctl.network_state(), NetworkState::Joined);
    assert!(rig.ctl.alarms().is_scheduled(TimerKey::BatterySample));
}

#[test]
fn steering_failure_turns_led_off_and_keeps_heartbeat() {
    let mut rig = Rig::new(DeviceConfig::default());
    rig.input(Input::Identify(true)).unwrap();
    rig.signal(Signal::Steering, FAILED, None).unwrap();

    assert_eq!(rig.ctl.network_state(), NetworkState::Unjoined);
    assert!(!rig.hw.led_on());
    assert!(rig.ctl.alarms().is_scheduled(TimerKey::JoinHeartbeat));
}

#[test]
fn heartbeat_pulses_while_unjoined() {
    let mut rig = Rig::new(DeviceConfig::default());
    rig.signal(Signal::Steering, FAILED, None).unwrap();
    rig.advance(0);
    assert_eq!(pulses(&rig), 1);

    rig.advance(100);
    assert!(!rig.hw.led_on());

    rig.advance(10_000);
    assert_eq!(pulses(&rig), 3, "pulses at 0, 5 s and 10 s");
}

#[test]
fn heartbeat_not_rearmed_when_pending() {
    let mut rig = Rig::new(DeviceConfig::default());
    rig.signal(Signal::Other(0x01), Status::OK, None).unwrap();
    rig.advance(1000);
    assert_eq!(rig.ctl.alarms().time_remaining(TimerKey::JoinHeartbeat, rig.now), Some(4000));

    rig.signal(Signal::Steering, FAILED, None).unwrap();
    assert_eq!(rig.ctl.alarms().time_remaining(TimerKey::JoinHeartbeat, rig.now), Some(4000));
}

#[test]
fn leave_turns_led_off_and_restarts_heartbeat() {
    let mut rig = Rig::new(DeviceConfig::default());
    rig.signal(Signal::Steering, Status::OK, None).unwrap();
    rig.signal(Signal::Leave, Status::OK, None).unwrap();

    assert_eq!(rig.ctl.network_state(), NetworkState::Unjoined);
    assert!(!rig.hw.led_on());
    assert!(rig.ctl.alarms().is_scheduled(TimerKey::JoinHeartbeat));
}

#[test]
fn can_sleep_is_only_forwarded() {
    let mut rig = Rig::new(DeviceConfig::default());
    rig.signal(Signal::CanSleep, Status::OK, Some(BufferId(2))).unwrap();

    assert_eq!(rig.ctl.network_state(), NetworkState::Joining);
    assert!(rig.ctl.alarms().is_empty());
    assert!(rig.hw.led.is_empty());
    assert_eq!(
        rig.stack.calls,
        vec![
            StackCall::DefaultHandler(Signal::CanSleep, Status::OK),
            StackCall::Release(BufferId(2)),
        ]
    );
}

#[test]
fn default_handler_failure_is_fatal_after_release() {
    let mut rig = Rig::new(DeviceConfig::default());
    rig.stack.fail_default_handler = true;
    let result = rig.signal(Signal::Steering, Status::OK, Some(BufferId(4)));

    assert_eq!(result, Err(Error::Stack(StackError::Rejected(-1))));
    assert_eq!(rig.stack.releases(), vec![BufferId(4)]);
    assert_eq!(rig.ctl.network_state(), NetworkState::Joined);
}

#[test]
fn identify_toggles_until_stopped() {
    let mut rig = Rig::new(DeviceConfig::default());
    rig.input(Input::Identify(true)).unwrap();
    rig.advance(250);
    assert_eq!(rig.hw.led, vec![true, false, true]);

    rig.input(Input::Identify(false)).unwrap();
    assert!(!rig.hw.led_on());
    assert!(!rig.ctl.alarms().is_scheduled(TimerKey::BlinkTransition));
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Identify(_))), 2);
}
