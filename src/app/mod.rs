//! Application core: pure domain logic, zero I/O.
//!
//! The [`Controller`](service::Controller) routes key transitions, stack
//! callbacks and alarm expiry into the switch components. All interaction
//! with hardware and the protocol stack happens through **port traits**
//! defined in [`ports`], keeping this layer testable without a radio.

pub mod events;
pub mod inputs;
pub mod ports;
pub mod service;
pub mod startup;
