//! Unified error types for the scene switch core.
//!
//! A single `Error` enum for the failures that leave the controller, plus
//! one error type per subsystem. All variants are `Copy` so they can
//! be passed through the reactor and dispatcher without allocation.
//!
//! Almost every failure is handled where it happens (log + LED pattern).
//! The only errors that leave the core are fatal stack failures.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The protocol stack rejected a request.
    Stack(StackError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stack(e) => write!(f, "stack: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC read returned a driver error code.
    AdcReadFailed(i32),
    /// The driver cannot convert raw readings for this channel.
    ConversionUnsupported,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed(rc) => write!(f, "ADC read failed (rc={rc})"),
            Self::ConversionUnsupported => write!(f, "raw to millivolt conversion unsupported"),
        }
    }
}

impl std::error::Error for SensorError {}

// ---------------------------------------------------------------------------
// Protocol stack errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    /// No buffer is free and the request could not be queued.
    Busy,
    /// The stack refused a request with the given return code.
    Rejected(i32),
}

impl fmt::Display for StackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "buffer pool busy"),
            Self::Rejected(rc) => write!(f, "request rejected (rc={rc})"),
        }
    }
}

impl std::error::Error for StackError {}

impl From<StackError> for Error {
    fn from(e: StackError) -> Self {
        Self::Stack(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored or supplied config could not be deserialised.
    Corrupted,
    /// Config could not be serialised for storage.
    EncodeFailed,
    /// A field failed range validation. The message names the field.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::EncodeFailed => write!(f, "config encode failed"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
