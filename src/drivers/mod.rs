//! LED drivers and the press-duration button classifier.

pub mod button;
pub mod led_patterns;
pub mod status_led;
