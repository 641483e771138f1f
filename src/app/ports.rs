//! Port traits: the hexagonal boundary between the control core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! The LED driver, the ADC driver, the power-management policy and the
//! wireless protocol stack all sit behind these traits. The
//! [`Controller`](super::service::Controller) takes them as generics at
//! each call site, so the core never touches hardware or the stack directly
//! and every behaviour can be driven from host tests.

use crate::attributes::{AttributeId, ClusterId, DeviceAttributes};
use crate::config::Destination;
use crate::dispatch::{ActionId, OnOffCommand};
use crate::error::{SensorError, StackError};
use crate::network::{Signal, Status};

// ───────────────────────────────────────────────────────────────
// Board ports (driven adapters: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// The single indicator LED.
pub trait LedPort {
    fn set(&mut self, on: bool);
}

/// Battery measurement channel.
pub trait AdcPort {
    /// Take one raw sample.
    fn sample(&mut self) -> Result<i16, SensorError>;

    /// Convert a raw sample to millivolts at the ADC input, using the
    /// driver's gain and reference calibration.
    fn raw_to_millivolts(&mut self, raw: i16) -> Result<i32, SensorError>;
}

/// Power-management and boot control owned by the platform.
pub trait PlatformPort {
    /// A user interacted with the device; restart the inactivity timer.
    fn notify_user_activity(&mut self);

    /// Reboot into the serial/USB bootloader.
    fn reboot_into_bootloader(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Protocol stack port
// ───────────────────────────────────────────────────────────────

/// Opaque stack buffer handle. Used both for outgoing command buffers and
/// for buffers that carry lifecycle signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u8);

/// Narrow view of the wireless protocol stack.
///
/// Completion of a send and delayed buffer allocation are asynchronous:
/// the stack reports them back as
/// [`Input::SendComplete`](super::inputs::Input::SendComplete) and
/// [`Input::BufferReady`](super::inputs::Input::BufferReady).
pub trait ProtocolStack {
    /// Allocate an outgoing buffer, or `None` if the pool is exhausted.
    fn acquire_send_resource(&mut self) -> Option<BufferId>;

    /// Queue a buffer allocation. Once one is free the stack delivers
    /// `Input::BufferReady { buffer, action }`.
    fn acquire_send_resource_delayed(&mut self, action: ActionId) -> Result<(), StackError>;

    /// Hand `buffer` to the stack carrying a Scenes "recall scene" request.
    fn send_recall_scene(
        &mut self,
        buffer: BufferId,
        destination: &Destination,
        source_endpoint: u8,
        group_id: u16,
        scene_id: u8,
    ) -> Result<(), StackError>;

    /// Hand `buffer` to the stack carrying an On/Off cluster command.
    fn send_on_off(
        &mut self,
        buffer: BufferId,
        destination: &Destination,
        source_endpoint: u8,
        command: OnOffCommand,
    ) -> Result<(), StackError>;

    /// Write a server attribute on the local endpoint.
    fn set_attribute(
        &mut self,
        cluster: ClusterId,
        attribute: AttributeId,
        value: u8,
    ) -> Result<(), StackError>;

    /// Stack's own handling of a lifecycle signal (commissioning retries,
    /// sleep admission, ...). A failure here is fatal.
    fn default_signal_handler(&mut self, signal: Signal, status: Status) -> Result<(), StackError>;

    /// Return a buffer to the pool.
    fn release_resource(&mut self, buffer: BufferId);

    /// Poll interval used by the sleepy end device.
    fn set_long_poll_interval(&mut self, interval_ms: u32);

    /// Leave the network and wipe network state (local factory reset).
    fn reset_to_factory_new(&mut self);

    /// Declare the endpoint and its clusters. Called once at startup.
    fn register_device(&mut self, attributes: &DeviceAttributes) -> Result<(), StackError>;

    /// Start the stack's own thread / commissioning.
    fn enable(&mut self) -> Result<(), StackError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
