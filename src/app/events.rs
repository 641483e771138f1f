//! Outbound application events.
//!
//! The [`Controller`](super::service::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them.

use crate::dispatch::{ActionId, Command, DispatchStats};
use crate::gesture::Gesture;
use crate::gesture::maintenance::MaintenanceAction;
use crate::network::{NetworkState, Status};
use crate::sensors::battery::BatterySample;

/// Structured events emitted by the control core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The controller has started (carries the initial network state).
    Started(NetworkState),

    /// A gesture was recognised.
    Gesture(Gesture),

    /// A command was handed to the stack.
    CommandSent(Command),

    /// The stack reported the outcome of a command.
    CommandCompleted {
        command: Option<Command>,
        status: Status,
    },

    /// No send buffer was available; the action was dropped.
    ResourceExhausted(ActionId),

    /// A battery sample was published.
    Battery(BatterySample),

    /// A battery read failed; the previous values stay published.
    BatteryReadFailed,

    /// The network state changed.
    NetworkChanged { from: NetworkState, to: NetworkState },

    /// Identify mode toggled.
    Identify(bool),

    /// A maintenance key combination was recognised.
    Maintenance(MaintenanceAction),

    /// Dispatcher counters after a completion.
    Stats(DispatchStats),
}
