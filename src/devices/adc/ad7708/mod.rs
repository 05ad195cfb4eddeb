//! AD7708 8/10-Channel Sigma-Delta ADC Driver
//!
//! SPI driver for the Analog Devices AD7708. Every register access is a
//! two-phase transaction under one chip-select assertion: a one-byte
//! address phase selecting the target register and direction, then the
//! data phase. Calibration is a blocking poll of the mode register bounded
//! by a caller timeout and a hard ceiling.
//!
//! ## Usage
//!
//! ```ignore
//! use ad7708::devices::adc::ad7708::{Ad7708Config, Ad7708Driver, Channel, Polarity, Range};
//! use ad7708::devices::traits::AdcSensor;
//!
//! let mut adc = Ad7708Driver::new(spi, cs, timer, Ad7708Config::default())?;
//! adc.probe()?;
//! adc.configure_channel(Channel::Ain2, Range::V2p56, Polarity::Bipolar)?;
//! adc.calibrate(400)?;
//! let code = adc.read_raw()?;
//! ```

mod config;
mod driver;
mod registers;

pub use config::{
    Ad7708Config, Channel, OperatingMode, PinDirection, Polarity, Range, ReferenceInput,
    TEN_CHANNEL,
};
pub use driver::Ad7708Driver;
pub use registers::{
    CommReg, ControlReg, Direction, FilterReg, IoControlReg, ModeReg, Register, StatusReg,
    DEVICE_ID,
};
