//! Platform abstraction layer
//!
//! This module provides hardware abstraction for the collaborators the
//! AD7708 driver depends on: a half-duplex SPI bus, the chip-select line,
//! and a monotonic time source. All platform-specific code lives behind
//! these traits.

pub mod error;
pub mod traits;

// Platform implementations (feature-gated)
#[cfg(feature = "embedded-hal")]
pub mod eh1;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{PlatformError, Result};
pub use traits::{GpioInterface, SpiInterface, TimerInterface};
