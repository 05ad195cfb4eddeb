#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

//! ad7708 - Driver for the Analog Devices AD7708 sigma-delta ADC
//!
//! This library provides platform abstraction traits, a mock platform for
//! host-side testing, and a register-level driver for the AD7708
//! multiplexed 16-bit sigma-delta ADC on a chip-select-framed SPI bus.

// The mock platform is host-only and needs heap-backed logs
#[cfg(feature = "mock")]
extern crate std;

// Platform abstraction layer (SPI, chip-select GPIO, monotonic timer)
pub mod platform;

// Device drivers using platform abstraction
pub mod devices;

// Logging macros (defmt on embedded builds, println in host tests)
pub mod logging;
