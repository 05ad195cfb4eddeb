//! embedded-hal 1.0 adapters
//!
//! Implements the platform traits on top of `embedded-hal` 1.0 types so the
//! driver runs on any HAL that speaks the ecosystem traits (`SpiBus`,
//! `OutputPin`, `DelayNs`).

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::platform::{
    error::{GpioError, PlatformError, SpiError},
    traits::{GpioInterface, GpioMode, SpiInterface, TimerInterface},
    Result,
};

/// `SpiInterface` over an `embedded_hal::spi::SpiBus`
///
/// The bus is used half-duplex; received bytes during writes are discarded
/// by the HAL.
pub struct HalSpi<B> {
    bus: B,
}

impl<B: SpiBus<u8>> HalSpi<B> {
    /// Wrap an embedded-hal SPI bus
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Release the wrapped bus
    pub fn release(self) -> B {
        self.bus
    }
}

impl<B: SpiBus<u8>> SpiInterface for HalSpi<B> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.bus
            .write(data)
            .and_then(|_| self.bus.flush())
            .map_err(|_| PlatformError::Spi(SpiError::TransferFailed))
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<()> {
        self.bus
            .read(buffer)
            .map_err(|_| PlatformError::Spi(SpiError::TransferFailed))
    }
}

/// `GpioInterface` over an `embedded_hal::digital::OutputPin`
///
/// `OutputPin` carries no readback, so the last driven level is tracked
/// locally. The pin is output-only; requesting input mode is an error.
pub struct HalPin<P> {
    pin: P,
    level: bool,
}

impl<P: OutputPin> HalPin<P> {
    /// Wrap an embedded-hal output pin, driving it to the given initial level
    pub fn new(mut pin: P, initial_high: bool) -> Result<Self> {
        let res = if initial_high {
            pin.set_high()
        } else {
            pin.set_low()
        };
        res.map_err(|_| PlatformError::Gpio(GpioError::InvalidPin))?;
        Ok(Self {
            pin,
            level: initial_high,
        })
    }

    /// Release the wrapped pin
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> GpioInterface for HalPin<P> {
    fn set_high(&mut self) -> Result<()> {
        self.pin
            .set_high()
            .map_err(|_| PlatformError::Gpio(GpioError::InvalidPin))?;
        self.level = true;
        Ok(())
    }

    fn set_low(&mut self) -> Result<()> {
        self.pin
            .set_low()
            .map_err(|_| PlatformError::Gpio(GpioError::InvalidPin))?;
        self.level = false;
        Ok(())
    }

    fn read(&self) -> bool {
        self.level
    }

    fn set_mode(&mut self, mode: GpioMode) -> Result<()> {
        match mode {
            GpioMode::OutputPushPull | GpioMode::OutputOpenDrain => Ok(()),
            GpioMode::Input => Err(PlatformError::Gpio(GpioError::InvalidMode)),
        }
    }

    fn mode(&self) -> GpioMode {
        GpioMode::OutputPushPull
    }
}

/// `TimerInterface` over an `embedded_hal::delay::DelayNs`
///
/// embedded-hal 1.0 has no clock trait, so the monotonic timestamp is the
/// accumulated delay time. That is a lower bound on wall time, which keeps
/// the driver's poll-loop timeouts conservative: a loop that delays between
/// iterations times out no earlier than the configured bound.
pub struct HalDelay<D> {
    delay: D,
    elapsed_us: u64,
}

impl<D: DelayNs> HalDelay<D> {
    /// Wrap an embedded-hal delay provider
    pub fn new(delay: D) -> Self {
        Self {
            delay,
            elapsed_us: 0,
        }
    }

    /// Release the wrapped delay provider
    pub fn release(self) -> D {
        self.delay
    }
}

impl<D: DelayNs> TimerInterface for HalDelay<D> {
    fn delay_us(&mut self, us: u32) -> Result<()> {
        self.delay.delay_us(us);
        self.elapsed_us = self.elapsed_us.wrapping_add(us as u64);
        Ok(())
    }

    fn now_us(&self) -> u64 {
        self.elapsed_us
    }
}
