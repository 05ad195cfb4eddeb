//! Device traits
//!
//! This module contains hardware-independent trait definitions for device
//! drivers. These traits enable unit testing with mock implementations and
//! sensor independence for higher-level code.

pub mod adc;

pub use adc::{AdcError, AdcSensor};
