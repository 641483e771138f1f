//! Action dispatcher.
//!
//! Maps an [`ActionId`] to an outgoing command, obtains a send buffer from
//! the stack and hands the command off. Every buffer the dispatcher hands
//! to the stack is tracked as a [`SendAttempt`] until the completion
//! report arrives, at which point the buffer is released.
//!
//! ```text
//!  dispatch(id) ──▶ acquire ──▶ send ──▶ … ──▶ on_complete(status) ──▶ release
//!                     │
//!                     └─ exhausted: warn, count as dropped, stop
//! ```
//!
//! Delivery is at-most-once. Nothing is re-queued here: in delayed mode the
//! stack's own allocation queue is the only retry.

use heapless::Vec;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{BufferId, ProtocolStack};
use crate::config::{Acquisition, Binding, DispatchConfig};
use crate::error::StackError;
use crate::network::Status;

/// Upper bound on commands the stack holds at once.
pub const MAX_IN_FLIGHT: usize = 8;

/// Opaque action identifier. Zero means "no action".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub u16);

impl ActionId {
    pub const NONE: Self = Self(0);

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// On/Off cluster command identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum OnOffCommand {
    Off = 0x00,
    On = 0x01,
    Toggle = 0x02,
}

impl OnOffCommand {
    /// Action id that selects this command under the on/off binding.
    pub const fn action_id(self) -> ActionId {
        match self {
            Self::On => ActionId(1),
            Self::Off => ActionId(2),
            Self::Toggle => ActionId(3),
        }
    }

    pub const fn from_action(action: ActionId) -> Option<Self> {
        match action.0 {
            1 => Some(Self::On),
            2 => Some(Self::Off),
            3 => Some(Self::Toggle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    RecallScene { group_id: u16, scene_id: u8 },
    OnOff(OnOffCommand),
}

/// One command the stack currently owns a buffer for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendAttempt {
    pub command: Command,
    pub buffer: Option<BufferId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Id zero.
    Ignored,
    /// The binding has no command for this id.
    Unmapped,
    /// Handed to the stack; completion follows.
    Sent(Command),
    /// Delayed allocation queued; `on_buffer_ready` follows.
    Queued,
    /// No buffer available; the command is dropped.
    Exhausted,
    /// The stack refused the command; the buffer was released.
    SendFailed(StackError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Confirmed(Option<Command>),
    Failed {
        command: Option<Command>,
        status: Status,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub sent: u32,
    pub confirmed: u32,
    pub failed: u32,
    pub dropped: u32,
}

pub struct ActionDispatcher {
    config: DispatchConfig,
    in_flight: Vec<SendAttempt, MAX_IN_FLIGHT>,
    stats: DispatchStats,
}

impl ActionDispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            config,
            in_flight: Vec::new(),
            stats: DispatchStats::default(),
        }
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn in_flight(&self) -> &[SendAttempt] {
        &self.in_flight
    }

    /// Command selected by `action` under the configured binding.
    pub fn command_for(&self, action: ActionId) -> Option<Command> {
        if action.is_none() {
            return None;
        }
        match self.config.binding {
            Binding::Scenes { group_id } => Some(Command::RecallScene {
                group_id,
                scene_id: (action.0 & 0xFF) as u8,
            }),
            Binding::OnOff => OnOffCommand::from_action(action).map(Command::OnOff),
        }
    }

    pub fn dispatch(&mut self, action: ActionId, stack: &mut impl ProtocolStack) -> DispatchOutcome {
        if action.is_none() {
            return DispatchOutcome::Ignored;
        }
        let Some(command) = self.command_for(action) else {
            debug!("dispatch: action 0x{:x} has no command", action.0);
            return DispatchOutcome::Unmapped;
        };

        match self.config.acquisition {
            Acquisition::Immediate => match stack.acquire_send_resource() {
                Some(buffer) => self.send(buffer, command, stack),
                None => self.exhausted(action),
            },
            Acquisition::Delayed => match stack.acquire_send_resource_delayed(action) {
                Ok(()) => {
                    debug!("dispatch: action 0x{:x} waiting for a buffer", action.0);
                    DispatchOutcome::Queued
                }
                Err(e) => {
                    warn!("dispatch: delayed allocation refused: {}", e);
                    self.exhausted(action)
                }
            },
        }
    }

    /// A delayed allocation completed. The action may be arbitrarily old.
    pub fn on_buffer_ready(
        &mut self,
        buffer: BufferId,
        action: ActionId,
        stack: &mut impl ProtocolStack,
    ) -> DispatchOutcome {
        match self.command_for(action) {
            Some(command) => self.send(buffer, command, stack),
            None => {
                stack.release_resource(buffer);
                DispatchOutcome::Unmapped
            }
        }
    }

    /// Completion report for `buffer`. Always releases the buffer.
    pub fn on_complete(
        &mut self,
        buffer: BufferId,
        status: Status,
        stack: &mut impl ProtocolStack,
    ) -> Completion {
        let command = match self.in_flight.iter().position(|a| a.buffer == Some(buffer)) {
            Some(i) => Some(self.in_flight.swap_remove(i).command),
            None => {
                warn!("dispatch: completion for untracked buffer {:?}", buffer);
                None
            }
        };
        stack.release_resource(buffer);

        if status.is_ok() {
            self.stats.confirmed = self.stats.confirmed.wrapping_add(1);
            info!("dispatch: {:?} confirmed", command);
            Completion::Confirmed(command)
        } else {
            self.stats.failed = self.stats.failed.wrapping_add(1);
            warn!("dispatch: {:?} failed, status {}", command, status.0);
            Completion::Failed { command, status }
        }
    }

    fn send(
        &mut self,
        buffer: BufferId,
        command: Command,
        stack: &mut impl ProtocolStack,
    ) -> DispatchOutcome {
        let dest = self.config.destination;
        let src = self.config.source_endpoint;
        let result = match command {
            Command::RecallScene { group_id, scene_id } => {
                stack.send_recall_scene(buffer, &dest, src, group_id, scene_id)
            }
            Command::OnOff(cmd) => stack.send_on_off(buffer, &dest, src, cmd),
        };

        if let Err(e) = result {
            stack.release_resource(buffer);
            self.stats.failed = self.stats.failed.wrapping_add(1);
            warn!("dispatch: {:?} rejected: {}", command, e);
            return DispatchOutcome::SendFailed(e);
        }

        let attempt = SendAttempt {
            command,
            buffer: Some(buffer),
        };
        if self.in_flight.push(attempt).is_err() {
            warn!("dispatch: in-flight table full, {:?} untracked", buffer);
        }
        self.stats.sent = self.stats.sent.wrapping_add(1);
        info!("dispatch: {:?} sent on {:?}", command, buffer);
        DispatchOutcome::Sent(command)
    }

    fn exhausted(&mut self, action: ActionId) -> DispatchOutcome {
        self.stats.dropped = self.stats.dropped.wrapping_add(1);
        warn!("dispatch: no send buffer, action 0x{:x} dropped", action.0);
        DispatchOutcome::Exhausted
    }
}
