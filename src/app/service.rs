//! Controller: the hexagonal core.
//!
//! [`Controller`] owns every component of the switch: gesture classifier,
//! dispatcher, LED sequencer, battery sampler, network reactor, and the
//! alarm queue they share. All I/O flows through port traits injected at
//! call sites, making the whole core testable with mock adapters.
//!
//! ```text
//!  Input ─────▶ ┌──────────────────────────────┐ ──▶ EventSink
//!               │          Controller           │
//!  LedPort   ◀──│ Gestures · Dispatch · LED     │──▶ ProtocolStack
//!  AdcPort   ◀──│ Battery · Network · Alarms    │
//!               └──────────────────────────────┘
//! ```
//!
//! The outer loop feeds [`Input`]s through [`handle`](Controller::handle),
//! calls [`poll`](Controller::poll) to fire due alarms, and may sleep for
//! [`next_wakeup`](Controller::next_wakeup) in between.

use log::{debug, info};

use crate::attributes::DeviceAttributes;
use crate::config::{DeviceConfig, InputMode};
use crate::dispatch::{ActionDispatcher, ActionId, Completion, DispatchOutcome, DispatchStats};
use crate::drivers::button::PressDurationClassifier;
use crate::drivers::led_patterns::{BlinkProgram, LedSequencer};
use crate::error::Error;
use crate::gesture::maintenance::{MaintenanceAction, MaintenanceKeys};
use crate::gesture::source::GestureSource;
use crate::gesture::{ButtonEvent, Gesture, GestureClassifier};
use crate::network::{NetworkReactor, NetworkState, ReactorIo};
use crate::scheduler::{AlarmQueue, TimerKey};
use crate::sensors::battery::BatterySampler;

use super::events::AppEvent;
use super::inputs::Input;
use super::ports::{AdcPort, EventSink, LedPort, PlatformPort, ProtocolStack};

/// The control core of the switch.
pub struct Controller {
    alarms: AlarmQueue,
    classifier: GestureClassifier,
    /// Present when a single button's hold time selects the command.
    press: Option<PressDurationClassifier>,
    maintenance: MaintenanceKeys,
    dispatcher: ActionDispatcher,
    sequencer: LedSequencer,
    battery: BatterySampler,
    network: NetworkReactor,
    attributes: DeviceAttributes,
}

impl Controller {
    /// Build the core from a validated configuration.
    pub fn new(config: DeviceConfig) -> Self {
        let press = match config.input.mode {
            InputMode::Gestures => None,
            InputMode::PressDuration { button } => Some(PressDurationClassifier::new(
                button,
                config.input.press_window_ms,
                config.input.press_rearm_ms,
            )),
        };

        Self {
            alarms: AlarmQueue::new(),
            classifier: GestureClassifier::new(config.input.long_press_repeat_ms),
            press,
            maintenance: MaintenanceKeys::new(),
            dispatcher: ActionDispatcher::new(config.dispatch),
            sequencer: LedSequencer::new(),
            battery: BatterySampler::new(config.battery),
            network: NetworkReactor::new(config.network),
            attributes: DeviceAttributes::new(config.device),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        let state = self.network.state();
        sink.emit(&AppEvent::Started(state));
        info!("controller started, network {:?}", state);
    }

    // ── Inputs ────────────────────────────────────────────────

    /// Process one input.
    ///
    /// Only a failure of the stack's default signal handler is returned;
    /// everything else is handled here with logging and LED feedback.
    pub fn handle<H, S>(
        &mut self,
        input: Input,
        now_ms: u32,
        hw: &mut H,
        stack: &mut S,
        sink: &mut impl EventSink,
    ) -> Result<(), Error>
    where
        H: LedPort + AdcPort + PlatformPort,
        S: ProtocolStack,
    {
        match input {
            Input::Button(event) => self.on_button(event, now_ms, hw, stack, sink),
            Input::BufferReady { buffer, action } => {
                let outcome = self.dispatcher.on_buffer_ready(buffer, action, stack);
                self.report_dispatch(outcome, action, now_ms, hw, sink);
            }
            Input::SendComplete { buffer, status } => {
                let completion = self.dispatcher.on_complete(buffer, status, stack);
                let (program, command) = match completion {
                    Completion::Confirmed(command) => (BlinkProgram::CONFIRM, command),
                    Completion::Failed { command, .. } => (BlinkProgram::ERROR, command),
                };
                self.sequencer.play(program, now_ms, &mut self.alarms, hw);
                sink.emit(&AppEvent::CommandCompleted { command, status });
                sink.emit(&AppEvent::Stats(self.dispatcher.stats()));
            }
            Input::Signal {
                signal,
                status,
                buffer,
            } => {
                let before = self.network.state();
                let io = ReactorIo {
                    alarms: &mut self.alarms,
                    sequencer: &mut self.sequencer,
                    led: hw,
                    stack,
                };
                let result = self.network.on_signal(signal, status, buffer, now_ms, io);
                let after = self.network.state();
                if after != before {
                    sink.emit(&AppEvent::NetworkChanged {
                        from: before,
                        to: after,
                    });
                }
                result?;
            }
            Input::Identify(true) => {
                self.sequencer.start_identify(now_ms, &mut self.alarms, hw);
                sink.emit(&AppEvent::Identify(true));
            }
            Input::Identify(false) => {
                self.sequencer.stop(&mut self.alarms, hw);
                sink.emit(&AppEvent::Identify(false));
            }
        }
        Ok(())
    }

    /// Translate a native input report and handle each resulting key
    /// transition.
    pub fn feed<G, H, S>(
        &mut self,
        source: &mut G,
        report: G::Report,
        now_ms: u32,
        hw: &mut H,
        stack: &mut S,
        sink: &mut impl EventSink,
    ) where
        G: GestureSource,
        H: LedPort + AdcPort + PlatformPort,
        S: ProtocolStack,
    {
        for event in source.translate(report) {
            self.on_button(event, now_ms, hw, stack, sink);
        }
    }

    /// Fire every alarm due at `now_ms`.
    pub fn poll<H, S>(&mut self, now_ms: u32, hw: &mut H, stack: &mut S, sink: &mut impl EventSink)
    where
        H: LedPort + AdcPort + PlatformPort,
        S: ProtocolStack,
    {
        while let Some(alarm) = self.alarms.pop_due(now_ms) {
            match alarm.key {
                TimerKey::LongPressRepeat => {
                    if let Some(gesture) = self.classifier.on_repeat(alarm.param, now_ms, &mut self.alarms)
                    {
                        self.on_gesture(gesture, now_ms, hw, stack, sink);
                    }
                }
                TimerKey::BlinkTransition => {
                    self.sequencer.on_transition(now_ms, &mut self.alarms, hw);
                }
                TimerKey::JoinHeartbeat => {
                    self.network
                        .on_heartbeat(now_ms, &mut self.alarms, &mut self.sequencer, hw);
                }
                TimerKey::BatterySample => {
                    match self
                        .battery
                        .tick(now_ms, &mut self.alarms, hw, &mut self.attributes, stack)
                    {
                        Ok(sample) => sink.emit(&AppEvent::Battery(sample)),
                        Err(_) => sink.emit(&AppEvent::BatteryReadFailed),
                    }
                }
                TimerKey::PressWindow => {
                    if let Some(press) = self.press.as_mut() {
                        press.on_tick(now_ms, &mut self.alarms);
                    }
                }
            }
        }
    }

    /// Milliseconds until the next alarm, `None` if nothing is pending.
    pub fn next_wakeup(&self, now_ms: u32) -> Option<u32> {
        self.alarms.next_deadline(now_ms)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn network_state(&self) -> NetworkState {
        self.network.state()
    }

    pub fn attributes(&self) -> &DeviceAttributes {
        &self.attributes
    }

    pub fn dispatch_stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }

    pub fn sequencer(&self) -> &LedSequencer {
        &self.sequencer
    }

    pub fn alarms(&self) -> &AlarmQueue {
        &self.alarms
    }

    pub fn battery(&self) -> &BatterySampler {
        &self.battery
    }

    // ── Internal ──────────────────────────────────────────────

    fn on_button<H, S>(
        &mut self,
        event: ButtonEvent,
        now_ms: u32,
        hw: &mut H,
        stack: &mut S,
        sink: &mut impl EventSink,
    ) where
        H: LedPort + AdcPort + PlatformPort,
        S: ProtocolStack,
    {
        if MaintenanceKeys::owns(&event) {
            if let Some(action) = self.maintenance.on_event(event) {
                match action {
                    MaintenanceAction::FactoryReset => stack.reset_to_factory_new(),
                    MaintenanceAction::RebootToBootloader => hw.reboot_into_bootloader(),
                }
                sink.emit(&AppEvent::Maintenance(action));
            }
            return;
        }

        if let Some(gesture) = self.classifier.classify(event, now_ms, &mut self.alarms) {
            self.on_gesture(gesture, now_ms, hw, stack, sink);
        }
    }

    fn on_gesture<H, S>(
        &mut self,
        gesture: Gesture,
        now_ms: u32,
        hw: &mut H,
        stack: &mut S,
        sink: &mut impl EventSink,
    ) where
        H: LedPort + AdcPort + PlatformPort,
        S: ProtocolStack,
    {
        hw.notify_user_activity();
        sink.emit(&AppEvent::Gesture(gesture));

        let action = match self.press.as_mut() {
            Some(press) => press
                .on_gesture(gesture.kind, now_ms, &mut self.alarms)
                .map_or(ActionId::NONE, |cmd| cmd.action_id()),
            None => gesture.action(),
        };
        if action.is_none() {
            return;
        }

        if self.dispatcher.command_for(action).is_some() {
            self.sequencer.play(BlinkProgram::ACK, now_ms, &mut self.alarms, hw);
        }
        let outcome = self.dispatcher.dispatch(action, stack);
        self.report_dispatch(outcome, action, now_ms, hw, sink);
    }

    fn report_dispatch(
        &mut self,
        outcome: DispatchOutcome,
        action: ActionId,
        now_ms: u32,
        led: &mut impl LedPort,
        sink: &mut impl EventSink,
    ) {
        match outcome {
            DispatchOutcome::Sent(command) => sink.emit(&AppEvent::CommandSent(command)),
            DispatchOutcome::Exhausted => sink.emit(&AppEvent::ResourceExhausted(action)),
            DispatchOutcome::SendFailed(_) => {
                self.sequencer.play(BlinkProgram::ERROR, now_ms, &mut self.alarms, led);
            }
            DispatchOutcome::Queued | DispatchOutcome::Ignored | DispatchOutcome::Unmapped => {
                debug!("dispatch 0x{:x}: {:?}", action.0, outcome);
            }
        }
    }
}
