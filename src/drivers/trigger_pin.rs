//! `embedded-hal` output pin over a raw GPIO number, used for the
//! ultrasonic trigger line.

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

use crate::drivers::hw_init;

/// `gpio_set_level` returned a non-OK code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioWriteError(pub i32);

impl embedded_hal::digital::Error for GpioWriteError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct GpioTrigger {
    gpio: i32,
}

impl GpioTrigger {
    /// `gpio` must already be configured as an output (see
    /// `hw_init::init_peripherals`).
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }
}

impl ErrorType for GpioTrigger {
    type Error = GpioWriteError;
}

impl OutputPin for GpioTrigger {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.gpio, false).map_err(GpioWriteError)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.gpio, true).map_err(GpioWriteError)
    }
}
