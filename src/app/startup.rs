//! Startup wiring.
//!
//! Validates the configuration, declares the device to the stack and
//! starts it. Any failure here is fatal: the caller logs it and lets the
//! platform restart.

use anyhow::{Context, Result};
use log::info;

use crate::config::DeviceConfig;

use super::ports::ProtocolStack;
use super::service::Controller;

pub fn bootstrap(config: DeviceConfig, stack: &mut impl ProtocolStack) -> Result<Controller> {
    config.validate().context("invalid device configuration")?;

    let controller = Controller::new(config);
    stack
        .register_device(controller.attributes())
        .context("device registration rejected by the stack")?;
    stack.enable().context("protocol stack failed to start")?;

    info!(
        "bootstrap: {} / {} registered",
        controller.attributes().info.manufacturer,
        controller.attributes().info.model
    );
    Ok(controller)
}
