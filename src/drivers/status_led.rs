//! Indicator LED driver.
//!
//! Wraps any `embedded_hal` output pin as a [`LedPort`]. Boards that sink
//! the LED current through the GPIO wire it active-low; the polarity is
//! chosen at construction.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::LedPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

pub struct StatusLed<P: OutputPin> {
    pin: P,
    polarity: Polarity,
    lit: bool,
}

impl<P: OutputPin> StatusLed<P> {
    pub fn new(pin: P, polarity: Polarity) -> Self {
        Self {
            pin,
            polarity,
            lit: false,
        }
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> LedPort for StatusLed<P> {
    fn set(&mut self, on: bool) {
        let high = match self.polarity {
            Polarity::ActiveHigh => on,
            Polarity::ActiveLow => !on,
        };
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match result {
            Ok(()) => self.lit = on,
            Err(e) => warn!("status led: pin write failed: {:?}", e),
        }
    }
}
