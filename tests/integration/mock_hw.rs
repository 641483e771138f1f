//! Mock adapters for integration tests.
//!
//! Record every port call so tests can assert on the full history without
//! a radio, an ADC or a GPIO.

use std::collections::VecDeque;

use sceneswitch::app::events::AppEvent;
use sceneswitch::app::inputs::Input;
use sceneswitch::app::ports::{AdcPort, BufferId, EventSink, LedPort, PlatformPort, ProtocolStack};
use sceneswitch::app::service::Controller;
use sceneswitch::attributes::{AttributeId, ClusterId, DeviceAttributes};
use sceneswitch::config::{Destination, DeviceConfig};
use sceneswitch::dispatch::{ActionId, OnOffCommand};
use sceneswitch::error::{Error, SensorError, StackError};
use sceneswitch::gesture::ButtonEvent;
use sceneswitch::network::{Signal, Status};

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    /// Every level written to the LED, in order.
    pub led: Vec<bool>,
    /// Raw samples returned by the ADC, oldest first. Empty = read error.
    pub adc: VecDeque<Result<i16, SensorError>>,
    /// Millivolts per raw count.
    pub mv_per_count: i32,
    pub activity: u32,
    pub bootloader_requests: u32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            led: Vec::new(),
            adc: VecDeque::new(),
            mv_per_count: 1,
            activity: 0,
            bootloader_requests: 0,
        }
    }

    pub fn led_on(&self) -> bool {
        self.led.last().copied().unwrap_or(false)
    }

    pub fn queue_adc(&mut self, raw: i16) {
        self.adc.push_back(Ok(raw));
    }

    pub fn queue_adc_error(&mut self) {
        self.adc.push_back(Err(SensorError::AdcReadFailed(-1)));
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl LedPort for MockHardware {
    fn set(&mut self, on: bool) {
        self.led.push(on);
    }
}

impl AdcPort for MockHardware {
    fn sample(&mut self) -> Result<i16, SensorError> {
        self.adc
            .pop_front()
            .unwrap_or(Err(SensorError::AdcReadFailed(-1)))
    }

    fn raw_to_millivolts(&mut self, raw: i16) -> Result<i32, SensorError> {
        Ok(raw as i32 * self.mv_per_count)
    }
}

impl PlatformPort for MockHardware {
    fn notify_user_activity(&mut self) {
        self.activity += 1;
    }

    fn reboot_into_bootloader(&mut self) {
        self.bootloader_requests += 1;
    }
}

// ── MockStack ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum StackCall {
    RecallScene { buffer: BufferId, group_id: u16, scene_id: u8 },
    OnOff { buffer: BufferId, command: OnOffCommand },
    SetAttribute { cluster: ClusterId, attribute: AttributeId, value: u8 },
    DefaultHandler(Signal, Status),
    Release(BufferId),
    LongPoll(u32),
    FactoryReset,
    Register,
    Enable,
}

pub struct MockStack {
    pub calls: Vec<StackCall>,
    /// Free send buffers; `acquire_send_resource` pops from here.
    pub free: Vec<BufferId>,
    /// Actions queued through delayed allocation.
    pub delayed: Vec<ActionId>,
    pub refuse_delayed: bool,
    pub fail_default_handler: bool,
    pub fail_register: bool,
    pub reject_attributes: bool,
}

#[allow(dead_code)]
impl MockStack {
    pub fn new() -> Self {
        Self::with_buffers(4)
    }

    pub fn with_buffers(n: u8) -> Self {
        Self {
            calls: Vec::new(),
            free: (0..n).rev().map(BufferId).collect(),
            delayed: Vec::new(),
            refuse_delayed: false,
            fail_default_handler: false,
            fail_register: false,
            reject_attributes: false,
        }
    }

    pub fn releases(&self) -> Vec<BufferId> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                StackCall::Release(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    pub fn sends(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, StackCall::RecallScene { .. } | StackCall::OnOff { .. }))
            .count()
    }

    pub fn attribute(&self, attribute: AttributeId) -> Option<u8> {
        self.calls.iter().rev().find_map(|c| match c {
            StackCall::SetAttribute {
                attribute: a,
                value,
                ..
            } if *a == attribute => Some(*value),
            _ => None,
        })
    }
}

impl Default for MockStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolStack for MockStack {
    fn acquire_send_resource(&mut self) -> Option<BufferId> {
        self.free.pop()
    }

    fn acquire_send_resource_delayed(&mut self, action: ActionId) -> Result<(), StackError> {
        if self.refuse_delayed {
            return Err(StackError::Busy);
        }
        self.delayed.push(action);
        Ok(())
    }

    fn send_recall_scene(
        &mut self,
        buffer: BufferId,
        _destination: &Destination,
        _source_endpoint: u8,
        group_id: u16,
        scene_id: u8,
    ) -> Result<(), StackError> {
        self.calls.push(StackCall::RecallScene {
            buffer,
            group_id,
            scene_id,
        });
        Ok(())
    }

    fn send_on_off(
        &mut self,
        buffer: BufferId,
        _destination: &Destination,
        _source_endpoint: u8,
        command: OnOffCommand,
    ) -> Result<(), StackError> {
        self.calls.push(StackCall::OnOff { buffer, command });
        Ok(())
    }

    fn set_attribute(
        &mut self,
        cluster: ClusterId,
        attribute: AttributeId,
        value: u8,
    ) -> Result<(), StackError> {
        self.calls.push(StackCall::SetAttribute {
            cluster,
            attribute,
            value,
        });
        if self.reject_attributes {
            return Err(StackError::Rejected(-3));
        }
        Ok(())
    }

    fn default_signal_handler(&mut self, signal: Signal, status: Status) -> Result<(), StackError> {
        self.calls.push(StackCall::DefaultHandler(signal, status));
        if self.fail_default_handler {
            return Err(StackError::Rejected(-1));
        }
        Ok(())
    }

    fn release_resource(&mut self, buffer: BufferId) {
        self.calls.push(StackCall::Release(buffer));
    }

    fn set_long_poll_interval(&mut self, interval_ms: u32) {
        self.calls.push(StackCall::LongPoll(interval_ms));
    }

    fn reset_to_factory_new(&mut self) {
        self.calls.push(StackCall::FactoryReset);
    }

    fn register_device(&mut self, _attributes: &DeviceAttributes) -> Result<(), StackError> {
        self.calls.push(StackCall::Register);
        if self.fail_register {
            return Err(StackError::Rejected(-2));
        }
        Ok(())
    }

    fn enable(&mut self) -> Result<(), StackError> {
        self.calls.push(StackCall::Enable);
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// A started controller wired to fresh mocks, with a simulated clock.
pub struct Rig {
    pub ctl: Controller,
    pub hw: MockHardware,
    pub stack: MockStack,
    pub sink: RecordingSink,
    pub now: u32,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(config: DeviceConfig) -> Self {
        let mut sink = RecordingSink::new();
        let mut ctl = Controller::new(config);
        ctl.start(&mut sink);
        Self {
            ctl,
            hw: MockHardware::new(),
            stack: MockStack::new(),
            sink,
            now: 0,
        }
    }

    pub fn input(&mut self, input: Input) -> Result<(), Error> {
        self.ctl
            .handle(input, self.now, &mut self.hw, &mut self.stack, &mut self.sink)
    }

    pub fn press(&mut self, code: u16) {
        self.input(Input::Button(ButtonEvent::pressed(code)))
            .expect("button input never fails");
    }

    pub fn release(&mut self, code: u16) {
        self.input(Input::Button(ButtonEvent::released(code)))
            .expect("button input never fails");
    }

    pub fn signal(&mut self, signal: Signal, status: Status, buffer: Option<BufferId>) -> Result<(), Error> {
        self.input(Input::Signal {
            signal,
            status,
            buffer,
        })
    }

    /// Move the clock forward by `ms`, firing every alarm on the way at
    /// its own deadline.
    pub fn advance(&mut self, ms: u32) {
        let target = self.now + ms;
        while let Some(wait) = self.ctl.next_wakeup(self.now) {
            if self.now + wait > target {
                break;
            }
            self.now += wait;
            self.ctl
                .poll(self.now, &mut self.hw, &mut self.stack, &mut self.sink);
        }
        self.now = target;
    }
}
