//! Sensor drivers. The switch has one: the battery voltage channel.

pub mod battery;
