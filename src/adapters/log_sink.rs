//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events
//! through the `log` facade. The platform decides where the records go.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] as a single tagged line.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | network={:?}", state);
            }
            AppEvent::Gesture(g) => {
                info!("GESTURE | {:?} code=0x{:02x}", g.kind, g.code);
            }
            AppEvent::CommandSent(cmd) => {
                info!("SEND | {:?}", cmd);
            }
            AppEvent::CommandCompleted { command, status } => {
                if status.is_ok() {
                    info!("SEND | {:?} confirmed", command);
                } else {
                    warn!("SEND | {:?} failed status={}", command, status.0);
                }
            }
            AppEvent::ResourceExhausted(action) => {
                warn!("SEND | no buffer, action 0x{:02x} dropped", action.0);
            }
            AppEvent::Battery(s) => {
                info!(
                    "BATT | {}mV | {}.{}%",
                    s.voltage_mv,
                    s.percentage_decipercent / 10,
                    s.percentage_decipercent % 10
                );
            }
            AppEvent::BatteryReadFailed => {
                warn!("BATT | read failed, keeping last value");
            }
            AppEvent::NetworkChanged { from, to } => {
                info!("NET | {:?} -> {:?}", from, to);
            }
            AppEvent::Identify(on) => {
                info!("IDENTIFY | {}", if *on { "start" } else { "stop" });
            }
            AppEvent::Maintenance(action) => {
                warn!("MAINT | {:?}", action);
            }
            AppEvent::Stats(s) => {
                info!(
                    "STATS | sent={} confirmed={} failed={} dropped={}",
                    s.sent, s.confirmed, s.failed, s.dropped
                );
            }
        }
    }
}
