//! Inbound inputs to the controller.
//!
//! Everything the outside world delivers into the core: key transitions
//! from the input driver, asynchronous stack callbacks, and identify
//! requests from the network. Alarm expiry is not an input; the
//! controller drains its own queue in [`poll`](super::service::Controller::poll).

use crate::app::ports::BufferId;
use crate::dispatch::ActionId;
use crate::gesture::ButtonEvent;
use crate::network::{Signal, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// One key transition.
    Button(ButtonEvent),

    /// A delayed buffer allocation for `action` completed.
    BufferReady { buffer: BufferId, action: ActionId },

    /// The stack finished with a command buffer.
    SendComplete { buffer: BufferId, status: Status },

    /// Lifecycle signal, optionally carried in a stack buffer.
    Signal {
        signal: Signal,
        status: Status,
        buffer: Option<BufferId>,
    },

    /// Identify started (`true`) or stopped (`false`) by a remote peer.
    Identify(bool),
}
