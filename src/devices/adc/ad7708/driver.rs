//! AD7708 Driver Implementation
//!
//! Register-level driver for the AD7708 sigma-delta ADC. Every access to
//! the chip is a two-phase transaction framed by one chip-select
//! assertion: an address phase that shifts out the communications
//! register (selecting the target register and direction), immediately
//! followed by the data phase on the same select window. Splitting the
//! phases across select windows is a protocol violation, so the split is
//! not representable here: the private transaction engine is the only
//! path to the bus.

use super::config::{
    Ad7708Config, Channel, OperatingMode, PinDirection, Polarity, Range, ReferenceInput,
    TEN_CHANNEL,
};
use super::registers::{
    CommReg, ControlReg, Direction, FilterReg, IoControlReg, ModeReg, Register, StatusReg,
    DATA_LEN, DEVICE_ID,
};
use crate::devices::traits::{AdcError, AdcSensor};
use crate::platform::{GpioInterface, SpiInterface, TimerInterface};

/// Ceiling on each calibration poll phase, applied on top of the caller's
/// timeout; whichever elapses first aborts the wait
const CAL_HARD_TIMEOUT_MS: u64 = 500;

/// Delay between calibration polls
const CAL_POLL_INTERVAL_MS: u32 = 1;

/// Payload of the data phase of one transaction
enum DataPhase<'a> {
    Write(&'a [u8]),
    Read(&'a mut [u8]),
}

/// AD7708 SPI Driver
///
/// Owns the bus handle, the chip-select line, the time source, and the
/// in-memory image of every on-chip register. One driver instance per
/// physical chip; the instance is not internally synchronized, so sharing
/// it across threads requires external serialization by the caller.
///
/// # Type Parameters
///
/// * `SPI` - Half-duplex bus, any `SpiInterface`
/// * `CS` - Chip-select line, any `GpioInterface` output
/// * `TIM` - Monotonic clock and delay, any `TimerInterface`
pub struct Ad7708Driver<SPI: SpiInterface, CS: GpioInterface, TIM: TimerInterface> {
    /// SPI bus handle
    spi: SPI,

    /// Chip-select line (active low)
    cs: CS,

    /// Monotonic time source
    timer: TIM,

    /// Driver configuration
    config: Ad7708Config,

    /// Communications register image
    comm: CommReg,

    /// Status register image (last value read back)
    status: StatusReg,

    /// Mode register image
    mode: ModeReg,

    /// Control register image
    control: ControlReg,

    /// Filter register image
    filter: FilterReg,

    /// I/O control register image
    io_control: IoControlReg,
}

impl<SPI: SpiInterface, CS: GpioInterface, TIM: TimerInterface> Ad7708Driver<SPI, CS, TIM> {
    /// Create and initialize a new AD7708 driver
    ///
    /// Deasserts chip-select, zeroes the register images, then brings the
    /// device to a known state: I/O pin directions, filter word, default
    /// channel/range/polarity, single-conversion mode. The chip-select pin
    /// must already be configured as an output, idle level high.
    ///
    /// # Errors
    ///
    /// Returns the first failing operation's error; the device state is
    /// then undefined and a new initialization attempt is required.
    pub fn new(spi: SPI, cs: CS, timer: TIM, config: Ad7708Config) -> Result<Self, AdcError> {
        let mut driver = Self {
            spi,
            cs,
            timer,
            config,
            comm: CommReg::default(),
            status: StatusReg::default(),
            mode: ModeReg::default(),
            control: ControlReg::default(),
            filter: FilterReg::default(),
            io_control: IoControlReg::default(),
        };

        driver.init()?;
        Ok(driver)
    }

    /// Initialize the device to the configured defaults
    fn init(&mut self) -> Result<(), AdcError> {
        // Select line idle high before the first transaction
        self.cs.set_high()?;

        self.configure_io(self.config.io_p1, self.config.io_p2)?;
        self.set_filter(self.config.filter_word)?;
        self.configure_channel(self.config.channel, self.config.range, self.config.polarity)?;
        self.set_mode(OperatingMode::SingleConversion)?;

        crate::log_info!("AD7708 initialized");
        Ok(())
    }

    /// Build the command byte for the address phase
    ///
    /// WEN is driven low here; the transaction engine restores it once the
    /// transaction completes.
    fn command_byte(&mut self, reg: Register, direction: Direction) -> u8 {
        self.comm.set_wen(false);
        self.comm.set_direction(direction);
        self.comm.set_addr(reg);
        self.comm.byte()
    }

    /// One complete chip-select-framed transaction
    ///
    /// Asserts chip-select, shifts out the command byte, runs the data
    /// phase under the same assertion, then deasserts. Chip-select release
    /// and the WEN restore happen on every exit path, including a transfer
    /// failure partway through.
    fn transact(&mut self, reg: Register, phase: DataPhase<'_>) -> Result<(), AdcError> {
        let direction = match &phase {
            DataPhase::Write(_) => Direction::Write,
            DataPhase::Read(_) => Direction::Read,
        };
        let cmd = self.command_byte(reg, direction);

        if let Err(e) = self.cs.set_low() {
            self.comm.set_wen(true);
            return Err(e.into());
        }

        let mut transfer = self.spi.write(&[cmd]);
        if transfer.is_ok() {
            transfer = match phase {
                DataPhase::Write(data) => self.spi.write(data),
                DataPhase::Read(buf) => self.spi.read(buf),
            };
        }

        let release = self.cs.set_high();
        // Subsequent communications require WEN high again
        self.comm.set_wen(true);

        transfer?;
        release?;
        Ok(())
    }

    /// Write a register: address phase, then transmit `data`
    ///
    /// `data` is one byte for every register except the 2-byte data,
    /// offset, and gain registers.
    pub fn write_register(&mut self, reg: Register, data: &[u8]) -> Result<(), AdcError> {
        self.transact(reg, DataPhase::Write(data))
    }

    /// Read a register: address phase, then receive `buf.len()` bytes
    pub fn read_register(&mut self, reg: Register, buf: &mut [u8]) -> Result<(), AdcError> {
        self.transact(reg, DataPhase::Read(buf))
    }

    /// Write the mode register
    ///
    /// Combines the 3-bit mode code with the device-behavior flags from the
    /// held configuration. The CHCON bit always reflects the channel table
    /// compiled into this build. Channel, range, and polarity must already
    /// be configured before a mode that starts a conversion or calibration.
    pub fn set_mode(&mut self, mode: OperatingMode) -> Result<(), AdcError> {
        let mut image = ModeReg::default();
        image.set_mode_bits(mode.bits());
        image.set_oscpd(self.config.oscillator_power_down);
        image.set_chcon(TEN_CHANNEL);
        image.set_refsel(self.config.reference == ReferenceInput::RefIn2);
        image.set_negbuf(self.config.negative_buffer);
        image.set_chop(self.config.chop);

        self.mode = image;
        self.write_register(Register::Mode, &[image.byte()])
    }

    /// Write the control register: input channel, range, and polarity
    ///
    /// Must be called before a mode change that starts a conversion or
    /// calibration so the device acts on the intended channel.
    pub fn configure_channel(
        &mut self,
        channel: Channel,
        range: Range,
        polarity: Polarity,
    ) -> Result<(), AdcError> {
        let mut image = ControlReg::default();
        image.set_channel_bits(channel.bits());
        image.set_range_bits(range.bits());
        image.set_unipolar(polarity == Polarity::Unipolar);

        self.config.channel = channel;
        self.config.range = range;
        self.config.polarity = polarity;

        self.control = image;
        self.write_register(Register::Control, &[image.byte()])
    }

    /// Write the filter register
    ///
    /// The SF word is an opaque device-specific update-rate code,
    /// transmitted verbatim as a single byte.
    pub fn set_filter(&mut self, sf_word: u8) -> Result<(), AdcError> {
        self.config.filter_word = sf_word;
        self.filter = FilterReg::from_byte(sf_word);
        self.write_register(Register::Filter, &[sf_word])
    }

    /// Configure the direction of the P1/P2 digital I/O pins
    pub fn configure_io(&mut self, p1: PinDirection, p2: PinDirection) -> Result<(), AdcError> {
        let mut image = self.io_control;
        image.set_p1dir(p1.is_output());
        image.set_p2dir(p2.is_output());

        self.io_control = image;
        self.write_register(Register::IoControl, &[image.byte()])
    }

    /// Drive the P1/P2 output data bits
    ///
    /// Only pins configured as outputs drive their level; the bits are
    /// ignored by the chip for pins left as inputs.
    pub fn set_io_pins(&mut self, p1: bool, p2: bool) -> Result<(), AdcError> {
        let mut image = self.io_control;
        image.set_p1dat(p1);
        image.set_p2dat(p2);

        self.io_control = image;
        self.write_register(Register::IoControl, &[image.byte()])
    }

    /// Read the mode register back from the device
    pub fn read_mode(&mut self) -> Result<ModeReg, AdcError> {
        let mut buf = [0u8; 1];
        self.read_register(Register::Mode, &mut buf)?;
        self.mode = ModeReg::from_byte(buf[0]);
        Ok(self.mode)
    }

    /// Read the status register
    pub fn read_status(&mut self) -> Result<StatusReg, AdcError> {
        let mut buf = [0u8; 1];
        self.read_register(Register::Status, &mut buf)?;
        self.status = StatusReg::from_byte(buf[0]);
        Ok(self.status)
    }

    /// Read the latest conversion from the data register
    ///
    /// Returns the raw 16-bit conversion code, MSB first on the wire. No
    /// scaling or unit conversion is applied.
    pub fn read_conversion(&mut self) -> Result<u16, AdcError> {
        let mut buf = [0u8; DATA_LEN];
        self.read_register(Register::Data, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Check whether an AD7708 is responding on the bus
    ///
    /// Reads the ID register and compares its high nibble against the
    /// known device identifier. Liveness probe only; not part of the data
    /// path.
    pub fn is_present(&mut self) -> Result<bool, AdcError> {
        let mut buf = [0u8; 1];
        self.read_register(Register::Id, &mut buf)?;
        Ok(buf[0] >> 4 == DEVICE_ID)
    }

    /// Poll the mode register until the device reports idle
    ///
    /// Bounded by the caller-supplied timeout and by the hard ceiling,
    /// whichever elapses first, so the loop terminates even for oversized
    /// or zero timeouts.
    fn wait_for_idle(&mut self, timeout_ms: u32) -> Result<(), AdcError> {
        let start = self.timer.now_ms();
        loop {
            let mode = self.read_mode()?;
            if mode.mode_bits() == OperatingMode::Idle.bits() {
                return Ok(());
            }

            let elapsed = self.timer.now_ms().saturating_sub(start);
            if elapsed >= timeout_ms as u64 || elapsed >= CAL_HARD_TIMEOUT_MS {
                crate::log_warn!("AD7708 calibration timed out after {} ms", elapsed);
                return Err(AdcError::Timeout);
            }

            self.timer.delay_ms(CAL_POLL_INTERVAL_MS)?;
        }
    }

    /// Current driver configuration
    pub fn config(&self) -> &Ad7708Config {
        &self.config
    }

    /// Current communications register image
    pub fn comm_image(&self) -> CommReg {
        self.comm
    }

    /// Current mode register image
    pub fn mode_image(&self) -> ModeReg {
        self.mode
    }

    /// Current control register image
    pub fn control_image(&self) -> ControlReg {
        self.control
    }

    /// Current filter register image
    pub fn filter_image(&self) -> FilterReg {
        self.filter
    }

    /// Current I/O control register image
    pub fn io_control_image(&self) -> IoControlReg {
        self.io_control
    }

    /// Last status register value read back
    pub fn status_image(&self) -> StatusReg {
        self.status
    }

    /// Mutable access to the bus handle
    pub fn spi_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Mutable access to the chip-select line
    pub fn cs_mut(&mut self) -> &mut CS {
        &mut self.cs
    }

    /// Mutable access to the time source
    pub fn timer_mut(&mut self) -> &mut TIM {
        &mut self.timer
    }

    /// Release the platform collaborators
    pub fn release(self) -> (SPI, CS, TIM) {
        (self.spi, self.cs, self.timer)
    }
}

impl<SPI: SpiInterface, CS: GpioInterface, TIM: TimerInterface> AdcSensor
    for Ad7708Driver<SPI, CS, TIM>
{
    fn probe(&mut self) -> Result<(), AdcError> {
        if self.is_present()? {
            Ok(())
        } else {
            crate::log_error!("AD7708 not detected (ID high nibble mismatch)");
            Err(AdcError::NotPresent)
        }
    }

    /// Internal zero-scale then internal full-scale calibration for the
    /// configured channel, each phase waiting for the device to return to
    /// idle. A timeout at either phase abandons calibration; no retries.
    fn calibrate(&mut self, timeout_ms: u32) -> Result<(), AdcError> {
        crate::log_info!("AD7708 internal zero-scale calibration");
        self.set_mode(OperatingMode::InternalZeroCalibration)?;
        self.wait_for_idle(timeout_ms)?;

        crate::log_info!("AD7708 internal full-scale calibration");
        self.set_mode(OperatingMode::InternalFullCalibration)?;
        self.wait_for_idle(timeout_ms)?;

        crate::log_info!("AD7708 calibration complete");
        Ok(())
    }

    fn read_raw(&mut self) -> Result<u16, AdcError> {
        self.read_conversion()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockGpio, MockSpi, MockTimer, SpiTransaction};
    use crate::platform::traits::SpiConfig;

    type MockDriver = Ad7708Driver<MockSpi, MockGpio, MockTimer>;

    fn new_driver() -> MockDriver {
        Ad7708Driver::new(
            MockSpi::new(SpiConfig::default()),
            MockGpio::new_output(),
            MockTimer::new(),
            Ad7708Config::default(),
        )
        .unwrap()
    }

    /// Written bytes only, flattened in bus order
    fn written_bytes(spi: &MockSpi) -> Vec<Vec<u8>> {
        spi.transactions()
            .iter()
            .filter_map(|t| match t {
                SpiTransaction::Write { data } => Some(data.clone()),
                SpiTransaction::Read { .. } => None,
            })
            .collect()
    }

    fn read_count(spi: &MockSpi) -> usize {
        spi.transactions()
            .iter()
            .filter(|t| matches!(t, SpiTransaction::Read { .. }))
            .count()
    }

    #[test]
    fn test_init_sequence_bytes() {
        let mut driver = new_driver();
        let writes = written_bytes(driver.spi_mut());

        // io-control, filter, control, mode: command byte then payload each
        let mode_byte = 0x02 | ((TEN_CHANNEL as u8) << 4);
        assert_eq!(
            writes,
            vec![
                vec![0x07],
                vec![0x00],
                vec![0x03],
                vec![150],
                vec![0x02],
                vec![0x07],
                vec![0x01],
                vec![mode_byte],
            ]
        );
    }

    #[test]
    fn test_command_byte_write_direction() {
        let mut driver = new_driver();
        driver.spi_mut().clear_transactions();

        driver.set_filter(0x52).unwrap();

        let writes = written_bytes(driver.spi_mut());
        assert_eq!(writes.len(), 2);
        // Address phase: addr=3, RW=0, WEN=0, reserved zero
        assert_eq!(writes[0], vec![0b0000_0011]);
        // Data phase: the SF word verbatim, one byte
        assert_eq!(writes[1], vec![0x52]);
    }

    #[test]
    fn test_command_byte_read_direction() {
        let mut driver = new_driver();
        driver.spi_mut().clear_transactions();
        driver.spi_mut().queue_read_data(&[0x75]);

        driver.is_present().unwrap();

        let writes = written_bytes(driver.spi_mut());
        // Address phase: addr=0xF, RW=1, WEN=0
        assert_eq!(writes, vec![vec![0b0100_1111]]);
        assert_eq!(read_count(driver.spi_mut()), 1);
    }

    #[test]
    fn test_wen_restored_after_transaction() {
        let mut driver = new_driver();
        assert!(driver.comm_image().wen());

        driver.set_filter(0x10).unwrap();
        assert!(driver.comm_image().wen());
    }

    #[test]
    fn test_wen_restored_after_failed_transaction() {
        let mut driver = new_driver();
        driver.spi_mut().fail_write_at(1); // data phase of the next write

        let err = driver.set_filter(0x10).unwrap_err();
        assert!(matches!(err, AdcError::Bus(_)));
        assert!(driver.comm_image().wen());
    }

    #[test]
    fn test_chip_select_framing() {
        let mut driver = new_driver();

        // One assert per deassert; the extra high is the initial idle level
        let low = driver.cs_mut().low_count();
        let high = driver.cs_mut().high_count();
        assert_eq!(high, low + 1);

        driver.read_conversion().unwrap();
        assert_eq!(driver.cs_mut().low_count(), low + 1);
        assert_eq!(driver.cs_mut().high_count(), high + 1);
    }

    #[test]
    fn test_chip_select_released_on_bus_failure() {
        let mut driver = new_driver();
        let low = driver.cs_mut().low_count();
        let high = driver.cs_mut().high_count();

        driver.spi_mut().fail_write_at(0); // address phase fails
        assert!(driver.set_filter(0x10).is_err());

        assert_eq!(driver.cs_mut().low_count(), low + 1);
        assert_eq!(driver.cs_mut().high_count(), high + 1);

        // CS idles high again: the level log ends with the deassert
        assert!(driver.cs_mut().read());
        let log = driver.cs_mut().level_log();
        assert_eq!(log.last(), Some(&true));
    }

    #[test]
    fn test_control_register_roundtrip() {
        let mut driver = new_driver();
        driver.spi_mut().clear_transactions();

        driver
            .configure_channel(Channel::Ain5, Range::Mv160, Polarity::Unipolar)
            .unwrap();

        // Loop the written control byte back and read it
        let writes = written_bytes(driver.spi_mut());
        let control_byte = writes[1][0];
        driver.spi_mut().queue_read_data(&[control_byte]);

        let mut buf = [0u8; 1];
        driver.read_register(Register::Control, &mut buf).unwrap();
        let readback = ControlReg::from_byte(buf[0]);

        assert_eq!(readback.channel_bits(), Channel::Ain5.bits());
        assert_eq!(readback.range_bits(), Range::Mv160.bits());
        assert!(readback.unipolar());
    }

    #[test]
    fn test_mode_write_carries_config_flags() {
        let mut driver = Ad7708Driver::new(
            MockSpi::new(SpiConfig::default()),
            MockGpio::new_output(),
            MockTimer::new(),
            Ad7708Config {
                chop: true,
                reference: ReferenceInput::RefIn2,
                ..Ad7708Config::default()
            },
        )
        .unwrap();
        driver.spi_mut().clear_transactions();

        driver.set_mode(OperatingMode::ContinuousConversion).unwrap();

        let writes = written_bytes(driver.spi_mut());
        let mode_byte = writes[1][0];
        let image = ModeReg::from_byte(mode_byte);
        assert_eq!(image.mode_bits(), 3);
        assert!(image.chop());
        assert!(image.refsel());
        assert_eq!(image.chcon(), TEN_CHANNEL);
    }

    #[test]
    fn test_calibration_completes_after_k_polls() {
        let mut driver = new_driver();
        driver.spi_mut().clear_transactions();

        // Zero-scale phase: still calibrating for 3 polls, then idle.
        // Full-scale phase: one busy poll, then idle.
        driver
            .spi_mut()
            .queue_read_data(&[0x14, 0x14, 0x14, 0x01, 0x15, 0x01]);

        driver.calibrate(100).unwrap();

        assert_eq!(read_count(driver.spi_mut()), 6);

        // The two mode writes requested internal zero then full calibration:
        // a mode-register command byte (0x01) immediately followed by its
        // payload write. Poll reads issue the read command 0x41 instead.
        let writes = written_bytes(driver.spi_mut());
        let mode_writes: Vec<u8> = writes
            .windows(2)
            .filter(|pair| pair[0] == vec![0x01])
            .map(|pair| pair[1][0])
            .collect();
        assert_eq!(mode_writes.len(), 2);
        assert_eq!(ModeReg::from_byte(mode_writes[0]).mode_bits(), 4);
        assert_eq!(ModeReg::from_byte(mode_writes[1]).mode_bits(), 5);
    }

    #[test]
    fn test_calibration_timeout_when_never_idle() {
        let mut driver = new_driver();

        // No queued data: the mode register reads back 0 (power-down),
        // which never matches idle.
        let err = driver.calibrate(5).unwrap_err();
        assert_eq!(err, AdcError::Timeout);
        assert!(driver.timer_mut().now_ms() <= 5);
    }

    #[test]
    fn test_calibration_hard_ceiling_bounds_oversized_timeout() {
        let mut driver = new_driver();
        let start = driver.timer_mut().now_ms();

        let err = driver.calibrate(u32::MAX).unwrap_err();
        assert_eq!(err, AdcError::Timeout);

        let elapsed = driver.timer_mut().now_ms() - start;
        assert_eq!(elapsed, CAL_HARD_TIMEOUT_MS);
    }

    #[test]
    fn test_calibration_zero_timeout_still_reads_once() {
        let mut driver = new_driver();
        driver.spi_mut().clear_transactions();

        let err = driver.calibrate(0).unwrap_err();
        assert_eq!(err, AdcError::Timeout);
        // Mode write happened, exactly one poll before the trip
        assert_eq!(read_count(driver.spi_mut()), 1);
    }

    #[test]
    fn test_calibration_zero_timeout_succeeds_if_already_idle() {
        let mut driver = new_driver();
        driver.spi_mut().queue_read_data(&[0x01, 0x01]);

        driver.calibrate(0).unwrap();
    }

    #[test]
    fn test_presence_probe() {
        let mut driver = new_driver();

        driver.spi_mut().queue_read_data(&[0x75]);
        assert!(driver.is_present().unwrap());

        driver.spi_mut().queue_read_data(&[0x0A]);
        assert!(!driver.is_present().unwrap());

        driver.spi_mut().queue_read_data(&[0x0A]);
        assert_eq!(driver.probe().unwrap_err(), AdcError::NotPresent);
    }

    #[test]
    fn test_read_conversion_is_big_endian_raw() {
        let mut driver = new_driver();
        driver.spi_mut().queue_read_data(&[0xAB, 0xCD]);

        assert_eq!(driver.read_conversion().unwrap(), 0xABCD);
    }

    #[test]
    fn test_read_status_decodes_flags() {
        let mut driver = new_driver();
        driver.spi_mut().clear_transactions();
        driver.spi_mut().queue_read_data(&[0b1010_0000]);

        let status = driver.read_status().unwrap();
        assert!(status.rdy());
        assert!(status.cal());
        assert!(!status.err());

        // Status shares address 0 with the comm register, read direction
        let writes = written_bytes(driver.spi_mut());
        assert_eq!(writes, vec![vec![0b0100_0000]]);
    }

    #[test]
    fn test_io_configuration_keeps_reserved_zero() {
        let mut driver = new_driver();
        driver.spi_mut().clear_transactions();

        driver
            .configure_io(PinDirection::Output, PinDirection::Output)
            .unwrap();
        driver.set_io_pins(true, false).unwrap();

        let writes = written_bytes(driver.spi_mut());
        // Direction write: P1DIR | P2DIR
        assert_eq!(writes[1], vec![0b0011_0000]);
        // Data write keeps the direction bits and reserved bits zero
        assert_eq!(writes[3], vec![0b0011_0001]);
        assert_eq!(writes[3][0] & 0b1100_1100, 0);
    }

    #[test]
    fn test_bus_error_propagates_unwrapped() {
        let mut driver = new_driver();
        driver.spi_mut().fail_read_at(0);
        driver.spi_mut().queue_read_data(&[0xAB, 0xCD]);

        let err = driver.read_conversion().unwrap_err();
        assert!(matches!(err, AdcError::Bus(_)));
    }

    #[test]
    fn test_release_returns_collaborators() {
        let driver = new_driver();
        let (spi, cs, _timer) = driver.release();
        assert!(!spi.transactions().is_empty());
        assert!(cs.read());
    }
}
