//! Scene switch control core.
//!
//! Turns key transitions from a battery-powered wireless switch into
//! gestures and outgoing scene / on-off commands, drives the indicator
//! LED, samples the battery and reacts to network lifecycle signals.
//! The protocol stack, the ADC and the GPIO sit behind the port traits in
//! [`app::ports`]; the embedding platform supplies adapters for them.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod attributes;
pub mod config;
pub mod dispatch;
pub mod drivers;
pub mod error;
pub mod gesture;
pub mod network;
pub mod scheduler;
pub mod sensors;
