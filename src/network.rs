//! Network lifecycle reactor.
//!
//! The stack commissions, rejoins and polls on its own. It reports what
//! happened as lifecycle [`Signal`]s; the reactor turns those into LED
//! feedback, starts battery telemetry once joined, and keeps a short
//! heartbeat pulse going while the device is not on a network.
//!
//! ```text
//!            steering / reboot ok
//!  Joining ─────────────────────────▶ Joined
//!     │                                 │
//!     │ steering / reboot failed        │ leave
//!     ▼                                 ▼
//!  Unjoined ◀───────────────────────────┘
//! ```
//!
//! Every signal is handed to the stack's default handler after the local
//! reaction, and a buffer delivered with the signal is released exactly
//! once whatever the outcome.

use log::{debug, error, info, warn};

use crate::app::ports::{BufferId, LedPort, ProtocolStack};
use crate::config::NetworkConfig;
use crate::drivers::led_patterns::{BlinkProgram, LedSequencer};
use crate::error::StackError;
use crate::scheduler::{AlarmQueue, TimerKey};

/// Lifecycle signal kinds the core reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Started from persisted network state; rejoin attempted.
    DeviceReboot,
    /// Network steering (commissioning) finished.
    Steering,
    /// The device left the network.
    Leave,
    /// The stack may put the radio to sleep.
    CanSleep,
    /// Anything else; only forwarded.
    Other(u16),
}

/// Stack status code. Zero is success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(pub i32);

impl Status {
    pub const OK: Self = Self(0);

    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkState {
    Joining,
    Joined,
    Unjoined,
}

/// What the reactor needs from its surroundings for one signal.
pub struct ReactorIo<'a, L: LedPort, S: ProtocolStack> {
    pub alarms: &'a mut AlarmQueue,
    pub sequencer: &'a mut LedSequencer,
    pub led: &'a mut L,
    pub stack: &'a mut S,
}

pub struct NetworkReactor {
    config: NetworkConfig,
    state: NetworkState,
}

impl NetworkReactor {
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            state: NetworkState::Joining,
        }
    }

    pub fn state(&self) -> NetworkState {
        self.state
    }

    pub fn is_joined(&self) -> bool {
        self.state == NetworkState::Joined
    }

    fn heartbeat_interval_ms(&self) -> u32 {
        self.config.heartbeat_interval_s as u32 * 1000
    }

    /// React to one signal, forward it, then release `buffer`.
    ///
    /// An `Err` is a failure of the stack's default handler and is fatal
    /// to the caller. The buffer has already been released by then.
    pub fn on_signal<L: LedPort, S: ProtocolStack>(
        &mut self,
        signal: Signal,
        status: Status,
        buffer: Option<BufferId>,
        now_ms: u32,
        io: ReactorIo<'_, L, S>,
    ) -> Result<(), StackError> {
        let ReactorIo {
            alarms,
            sequencer,
            led,
            stack,
        } = io;

        match signal {
            Signal::Steering | Signal::DeviceReboot => {
                if status.is_ok() {
                    self.joined(now_ms, alarms, sequencer, led, stack);
                } else {
                    warn!("net: {:?} failed, status {}", signal, status.0);
                    self.state = NetworkState::Unjoined;
                    sequencer.stop(alarms, led);
                }
            }
            Signal::Leave => {
                info!("net: left network");
                self.state = NetworkState::Unjoined;
                sequencer.stop(alarms, led);
            }
            Signal::CanSleep => {}
            Signal::Other(id) => debug!("net: signal 0x{:x}, status {}", id, status.0),
        }

        if signal != Signal::CanSleep {
            self.maintain_heartbeat(now_ms, alarms);
        }

        let result = stack.default_signal_handler(signal, status);
        if let Some(buffer) = buffer {
            stack.release_resource(buffer);
        }
        if let Err(e) = result {
            error!("net: default handler failed for {:?}: {}", signal, e);
        }
        result
    }

    fn joined(
        &mut self,
        now_ms: u32,
        alarms: &mut AlarmQueue,
        sequencer: &mut LedSequencer,
        led: &mut impl LedPort,
        stack: &mut impl ProtocolStack,
    ) {
        info!("net: joined");
        self.state = NetworkState::Joined;
        alarms.cancel(TimerKey::JoinHeartbeat);
        sequencer.play(BlinkProgram::CONFIRM, now_ms, alarms, led);
        alarms.schedule(TimerKey::BatterySample, 0, now_ms, 0);
        stack.set_long_poll_interval(self.config.long_poll_interval_ms);
    }

    /// Heartbeat off when joined; on when not, without re-arming one that
    /// is already pending.
    fn maintain_heartbeat(&self, now_ms: u32, alarms: &mut AlarmQueue) {
        if self.is_joined() {
            alarms.cancel(TimerKey::JoinHeartbeat);
        } else if alarms.time_remaining(TimerKey::JoinHeartbeat, now_ms).is_none() {
            alarms.schedule(
                TimerKey::JoinHeartbeat,
                self.config.heartbeat_interval_s as u16,
                now_ms,
                0,
            );
        }
    }

    /// The `JoinHeartbeat` alarm fired.
    pub fn on_heartbeat(
        &mut self,
        now_ms: u32,
        alarms: &mut AlarmQueue,
        sequencer: &mut LedSequencer,
        led: &mut impl LedPort,
    ) {
        if self.is_joined() {
            return;
        }
        sequencer.play(BlinkProgram::HEARTBEAT, now_ms, alarms, led);
        alarms.schedule(
            TimerKey::JoinHeartbeat,
            self.config.heartbeat_interval_s as u16,
            now_ms,
            self.heartbeat_interval_ms(),
        );
    }
}
