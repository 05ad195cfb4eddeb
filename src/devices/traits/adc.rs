//! ADC Sensor Trait and Error Types
//!
//! Device-independent interface for multiplexed ADC chips.
//!
//! ## Usage
//!
//! ```ignore
//! use ad7708::devices::traits::AdcSensor;
//!
//! fn sample<A: AdcSensor>(adc: &mut A) -> Result<u16, ad7708::devices::traits::AdcError> {
//!     adc.read_raw()
//! }
//! ```

use crate::platform::PlatformError;
use core::fmt;

/// ADC error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// Underlying bus transfer failed or timed out at the bus layer
    Bus(PlatformError),

    /// Calibration poll exceeded its bound
    Timeout,

    /// Presence probe failed its device-ID check
    NotPresent,
}

impl From<PlatformError> for AdcError {
    fn from(e: PlatformError) -> Self {
        AdcError::Bus(e)
    }
}

impl fmt::Display for AdcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdcError::Bus(e) => write!(f, "bus error: {}", e),
            AdcError::Timeout => write!(f, "calibration timed out"),
            AdcError::NotPresent => write!(f, "device not present"),
        }
    }
}

/// ADC sensor trait
///
/// Blocking, synchronous interface. Every operation either completes or
/// blocks the calling thread until the bus reports completion or a polling
/// timeout elapses. No retries are performed; the caller decides whether to
/// re-attempt a failed operation.
pub trait AdcSensor {
    /// Verify the device responds with the expected identifier
    fn probe(&mut self) -> Result<(), AdcError>;

    /// Run the device's self-calibration sequence
    ///
    /// Blocks until the device returns to idle or `timeout_ms` elapses.
    /// A timeout is terminal for this call; calibration is abandoned.
    fn calibrate(&mut self, timeout_ms: u32) -> Result<(), AdcError>;

    /// Read the latest raw conversion code (no scaling applied)
    fn read_raw(&mut self) -> Result<u16, AdcError>;
}
