//! Timer interface trait
//!
//! This module defines the monotonic time source and blocking delay the
//! driver uses to bound its calibration poll loop.

use crate::platform::Result;

/// Timer interface trait
///
/// Platform implementations must provide a monotonic microsecond clock and
/// a blocking delay. The clock never goes backwards; it may start at any
/// value.
pub trait TimerInterface {
    /// Block for at least `us` microseconds
    fn delay_us(&mut self, us: u32) -> Result<()>;

    /// Block for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32) -> Result<()> {
        self.delay_us(ms.saturating_mul(1000))
    }

    /// Monotonic timestamp in microseconds
    fn now_us(&self) -> u64;

    /// Monotonic timestamp in milliseconds
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }
}
