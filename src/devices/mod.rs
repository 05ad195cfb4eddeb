//! Device drivers
//!
//! This module contains device drivers that use platform abstraction traits,
//! keeping register-level logic independent of any particular HAL.
//!
//! ## Modules
//!
//! - `adc`: ADC drivers (AD7708)
//! - `traits`: Device trait definitions (AdcSensor, AdcError)

pub mod adc;
pub mod traits;
