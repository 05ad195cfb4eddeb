//! Mock SPI implementation for testing

use crate::platform::{
    error::{PlatformError, SpiError},
    traits::{SpiConfig, SpiInterface},
    Result,
};
use core::cell::RefCell;
use std::vec::Vec;

/// SPI transaction type for logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpiTransaction {
    /// Write only
    Write { data: Vec<u8> },
    /// Read only
    Read { len: usize },
}

/// Mock SPI implementation
///
/// Records all transactions for test verification, allows pre-programming
/// expected read data, and can be scripted to fail the n-th write or read
/// to exercise error paths.
#[derive(Debug)]
pub struct MockSpi {
    config: SpiConfig,
    transactions: RefCell<Vec<SpiTransaction>>,
    read_data: RefCell<Vec<u8>>,
    write_calls: usize,
    read_calls: usize,
    fail_write_at: Option<usize>,
    fail_read_at: Option<usize>,
}

impl MockSpi {
    /// Create a new mock SPI
    pub fn new(config: SpiConfig) -> Self {
        Self {
            config,
            transactions: RefCell::new(Vec::new()),
            read_data: RefCell::new(Vec::new()),
            write_calls: 0,
            read_calls: 0,
            fail_write_at: None,
            fail_read_at: None,
        }
    }

    /// Get transaction log (for test verification)
    pub fn transactions(&self) -> Vec<SpiTransaction> {
        self.transactions.borrow().clone()
    }

    /// Clear transaction log
    pub fn clear_transactions(&mut self) {
        self.transactions.borrow_mut().clear();
    }

    /// Set data to return for read operations
    ///
    /// Reads consume from the front of the queue; appending more data queues
    /// it behind whatever is still pending.
    pub fn queue_read_data(&mut self, data: &[u8]) {
        self.read_data.borrow_mut().extend_from_slice(data);
    }

    /// Make the `index`-th write call (0-based, counted from now) fail
    /// with `SpiError::TransferFailed`
    pub fn fail_write_at(&mut self, index: usize) {
        self.fail_write_at = Some(self.write_calls + index);
    }

    /// Make the `index`-th read call (0-based, counted from now) fail
    /// with `SpiError::TransferFailed`
    pub fn fail_read_at(&mut self, index: usize) {
        self.fail_read_at = Some(self.read_calls + index);
    }

    /// Get configured frequency
    pub fn frequency(&self) -> u32 {
        self.config.frequency
    }
}

impl SpiInterface for MockSpi {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        let call = self.write_calls;
        self.write_calls += 1;
        if self.fail_write_at == Some(call) {
            return Err(PlatformError::Spi(SpiError::TransferFailed));
        }

        self.transactions.borrow_mut().push(SpiTransaction::Write {
            data: data.to_vec(),
        });
        Ok(())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<()> {
        let call = self.read_calls;
        self.read_calls += 1;
        if self.fail_read_at == Some(call) {
            return Err(PlatformError::Spi(SpiError::TransferFailed));
        }

        let mut read_data = self.read_data.borrow_mut();
        let to_read = core::cmp::min(buffer.len(), read_data.len());
        buffer[..to_read].copy_from_slice(&read_data[..to_read]);
        read_data.drain(..to_read);

        self.transactions
            .borrow_mut()
            .push(SpiTransaction::Read { len: buffer.len() });
        Ok(())
    }
}
