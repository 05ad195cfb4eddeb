//! SPI interface trait
//!
//! This module defines the half-duplex SPI surface the AD7708 driver
//! consumes. The AD7708 never transfers in both directions at once: every
//! transaction is a one-byte command write followed by a payload write or
//! read, so the trait only exposes `write` and `read`.

use crate::platform::Result;

/// SPI configuration
#[derive(Debug, Clone, Copy)]
pub struct SpiConfig {
    /// Bus frequency in Hz
    pub frequency: u32,
    /// SPI mode (CPOL and CPHA)
    pub mode: SpiMode,
    /// Bit order
    pub bit_order: SpiBitOrder,
}

impl Default for SpiConfig {
    fn default() -> Self {
        // The AD7708 clocks data on SCLK mode 1,1 with MSB first.
        Self {
            frequency: 1_000_000, // 1 MHz
            mode: SpiMode::Mode3,
            bit_order: SpiBitOrder::MsbFirst,
        }
    }
}

/// SPI mode (Clock Polarity and Phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiMode {
    /// CPOL=0, CPHA=0
    Mode0,
    /// CPOL=0, CPHA=1
    Mode1,
    /// CPOL=1, CPHA=0
    Mode2,
    /// CPOL=1, CPHA=1
    Mode3,
}

/// SPI bit order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiBitOrder {
    /// Most significant bit first
    MsbFirst,
    /// Least significant bit first
    LsbFirst,
}

/// SPI interface trait
///
/// Platform implementations must provide this interface for SPI bus
/// communication. Transfer timeouts are owned by the implementation; a
/// transfer that times out reports `SpiError::Timeout`.
///
/// # Safety Invariants
///
/// - SPI peripheral must be initialized before use
/// - Only one owner per SPI bus instance
/// - No concurrent access to the same SPI bus from multiple contexts
/// - Chip select (CS) is managed separately by the caller (typically via GPIO)
pub trait SpiInterface {
    /// Write data (transmit only)
    ///
    /// Transmits data and discards received bytes.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Spi` if the write operation fails or times out.
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Read data (receive only)
    ///
    /// Receives data while transmitting dummy bytes (typically 0x00 or 0xFF).
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Spi` if the read operation fails or times out.
    fn read(&mut self, buffer: &mut [u8]) -> Result<()>;
}
