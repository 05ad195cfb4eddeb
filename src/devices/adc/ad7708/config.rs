//! AD7708 Configuration Types
//!
//! Typed values for the mode, control, filter, and I/O registers, plus the
//! driver configuration applied at initialization. The channel table exists
//! in two non-interchangeable variants selected by the CHCON mode bit; the
//! active variant is fixed per build through the `chcon-8` / `chcon-10`
//! cargo features.

#[cfg(all(feature = "chcon-8", feature = "chcon-10"))]
compile_error!("features `chcon-8` and `chcon-10` are mutually exclusive");

#[cfg(not(any(feature = "chcon-8", feature = "chcon-10")))]
compile_error!("one of the features `chcon-8` or `chcon-10` must be enabled");

/// Channel-configuration width baked into this build (the CHCON mode bit)
pub const TEN_CHANNEL: bool = cfg!(feature = "chcon-10");

/// Operating mode codes (MD2..MD0 of the mode register)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    /// Power-down (power-on default)
    PowerDown = 0,
    /// Idle: no conversion or calibration in progress
    Idle = 1,
    /// Single conversion, then return to idle
    SingleConversion = 2,
    /// Continuous conversion
    ContinuousConversion = 3,
    /// Internal zero-scale calibration
    InternalZeroCalibration = 4,
    /// Internal full-scale calibration
    InternalFullCalibration = 5,
    /// System zero-scale calibration
    SystemZeroCalibration = 6,
    /// System full-scale calibration
    SystemFullCalibration = 7,
}

impl OperatingMode {
    /// 3-bit mode code
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// ADC input range codes (RN2..RN0 of the control register)
///
/// Spans at VREF = 2.5 V; each step doubles the previous range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Range {
    /// ±20 mV
    Mv20 = 0,
    /// ±40 mV
    Mv40 = 1,
    /// ±80 mV
    Mv80 = 2,
    /// ±160 mV
    Mv160 = 3,
    /// ±320 mV
    Mv320 = 4,
    /// ±640 mV
    Mv640 = 5,
    /// ±1.28 V
    V1p28 = 6,
    /// ±2.56 V
    V2p56 = 7,
}

impl Range {
    /// 3-bit range code
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Input coding polarity (U/B bit of the control register)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Bipolar coding
    Bipolar = 0,
    /// Unipolar coding
    Unipolar = 1,
}

/// Reference input selection (REFSEL mode bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReferenceInput {
    /// REFIN1 active
    RefIn1 = 0,
    /// REFIN2 active
    RefIn2 = 1,
}

/// Direction of one of the chip's general-purpose digital pins (P1/P2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinDirection {
    /// High-impedance input
    Input = 0,
    /// Driven output
    Output = 1,
}

impl PinDirection {
    /// True for `Output`
    pub const fn is_output(self) -> bool {
        matches!(self, PinDirection::Output)
    }
}

/// Input channel selection (CH3..CH0 of the control register),
/// 8-channel table (CHCON = 0: two reference inputs, AIN1..AIN8)
#[cfg(feature = "chcon-8")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// AIN1 / AINCOM
    Ain1 = 0x00,
    /// AIN2 / AINCOM
    Ain2 = 0x01,
    /// AIN3 / AINCOM
    Ain3 = 0x02,
    /// AIN4 / AINCOM
    Ain4 = 0x03,
    /// AIN5 / AINCOM
    Ain5 = 0x04,
    /// AIN6 / AINCOM
    Ain6 = 0x05,
    /// AIN7 / AINCOM
    Ain7 = 0x06,
    /// AIN8 / AINCOM
    Ain8 = 0x07,
    /// AIN1 / AIN2 differential
    Ain1Ain2 = 0x08,
    /// AIN3 / AIN4 differential
    Ain3Ain4 = 0x09,
    /// AIN5 / AIN6 differential
    Ain5Ain6 = 0x0A,
    /// AIN7 / AIN8 differential
    Ain7Ain8 = 0x0B,
    /// AIN2 / AIN2 (zero-input self-check)
    Ain2Ain2 = 0x0C,
    /// AINCOM / AINCOM (zero-input self-check)
    AincomAincom = 0x0D,
    /// REFIN(+) / REFIN(-)
    RefIn = 0x0E,
    /// Both inputs open
    Open = 0x0F,
}

/// Input channel selection (CH3..CH0 of the control register),
/// 10-channel table (CHCON = 1: one reference input, AIN1..AIN10)
#[cfg(feature = "chcon-10")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// AIN1 / AINCOM
    Ain1 = 0x00,
    /// AIN2 / AINCOM
    Ain2 = 0x01,
    /// AIN3 / AINCOM
    Ain3 = 0x02,
    /// AIN4 / AINCOM
    Ain4 = 0x03,
    /// AIN5 / AINCOM
    Ain5 = 0x04,
    /// AIN6 / AINCOM
    Ain6 = 0x05,
    /// AIN7 / AINCOM
    Ain7 = 0x06,
    /// AIN8 / AINCOM
    Ain8 = 0x07,
    /// AIN1 / AIN2 differential
    Ain1Ain2 = 0x08,
    /// AIN3 / AIN4 differential
    Ain3Ain4 = 0x09,
    /// AIN5 / AIN6 differential
    Ain5Ain6 = 0x0A,
    /// AIN7 / AIN8 differential
    Ain7Ain8 = 0x0B,
    /// AIN9 / AIN10 differential
    Ain9Ain10 = 0x0C,
    /// AINCOM / AINCOM (zero-input self-check)
    AincomAincom = 0x0D,
    /// AIN9 / AINCOM
    Ain9 = 0x0E,
    /// AIN10 / AINCOM
    Ain10 = 0x0F,
}

impl Channel {
    /// 4-bit channel code
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Driver configuration applied at initialization
///
/// Channel, range, and polarity can be changed later through
/// `configure_channel`; the mode-register flags are fixed for the life of
/// the driver instance.
#[derive(Debug, Clone, Copy)]
pub struct Ad7708Config {
    /// Initial input channel
    pub channel: Channel,
    /// Initial input range
    pub range: Range,
    /// Initial coding polarity
    pub polarity: Polarity,
    /// Reference input fed to the modulator
    pub reference: ReferenceInput,
    /// Chop enable (reduces offset drift at the cost of update rate)
    pub chop: bool,
    /// Shut the oscillator off in standby mode
    pub oscillator_power_down: bool,
    /// Disable the AINCOM buffer (true = AINCOM unused)
    pub negative_buffer: bool,
    /// SF word written to the filter register (device update-rate code)
    pub filter_word: u8,
    /// Direction of the P1 digital I/O pin
    pub io_p1: PinDirection,
    /// Direction of the P2 digital I/O pin
    pub io_p2: PinDirection,
}

impl Default for Ad7708Config {
    fn default() -> Self {
        Self {
            channel: Channel::Ain1,
            range: Range::V2p56,
            polarity: Polarity::Bipolar,
            reference: ReferenceInput::RefIn1,
            chop: false,
            oscillator_power_down: false,
            negative_buffer: false,
            filter_word: 150,
            io_p1: PinDirection::Input,
            io_p2: PinDirection::Input,
        }
    }
}
