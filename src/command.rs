//! UC8176 command definitions
//!
//! Opcodes understood by the UC8176 (IL0398) controller used on 4.2" 400×300 panels.
//! Commands are sent over SPI with the DC pin low; any parameter bytes follow with
//! DC high.
//!
//! ## Example
//!
//! ```rust,no_run
//! use epd_status::{command, DisplayInterface, Interface, PolledBusy};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::{InputPin, OutputPin};
//! # use embedded_hal::spi::{Operation, SpiDevice};
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! # }
//! # let mut interface = Interface::new(MockSpi, MockPin, MockPin, PolledBusy::new(MockPin));
//! // Enable partial mode, then set the border to "unchanged"
//! let _ = interface.send_command(command::PARTIAL_IN);
//! let _ = interface.send_command(command::VCOM_DATA_INTERVAL);
//! let _ = interface.send_data(&[0xD7]);
//! ```

// Power and panel setup

/// Panel setting (0x00)
///
/// Requires 1 byte: resolution, LUT source, scan direction, booster switch.
pub const PANEL_SETTING: u8 = 0x00;

/// Power setting (0x01)
///
/// Requires 4 bytes: source/gate power selection, VCOM level, VDH, VDL.
pub const POWER_SETTING: u8 = 0x01;

/// Power off (0x02)
///
/// BUSY is asserted until the charge pumps are discharged.
pub const POWER_OFF: u8 = 0x02;

/// Power on (0x04)
///
/// BUSY is asserted until the booster reaches its operating voltages.
pub const POWER_ON: u8 = 0x04;

/// Booster soft start (0x06)
///
/// Requires 3 bytes: soft-start timing for phases A, B and C.
pub const BOOSTER_SOFT_START: u8 = 0x06;

// Image transfer

/// Data start transmission 1 (0x10)
///
/// Receives the "old" frame used as the reference of a partial refresh.
/// Requires W*H/8 bytes.
pub const DATA_START_TRANSMISSION_1: u8 = 0x10;

/// Display refresh (0x12)
///
/// Drives the panel with the loaded waveforms. BUSY stays asserted for the
/// whole update, which takes seconds on a full refresh.
pub const DISPLAY_REFRESH: u8 = 0x12;

/// Data start transmission 2 (0x13)
///
/// Receives the "new" frame. Requires W*H/8 bytes.
pub const DATA_START_TRANSMISSION_2: u8 = 0x13;

// Waveform (LUT) registers

/// VCOM LUT (0x20), 44 bytes
pub const LUT_VCOM: u8 = 0x20;
/// White-to-white LUT (0x21), 42 bytes
pub const LUT_WW: u8 = 0x21;
/// Black-to-white LUT (0x22), 42 bytes
pub const LUT_BW: u8 = 0x22;
/// White-to-black LUT (0x23), 42 bytes
pub const LUT_WB: u8 = 0x23;
/// Black-to-black LUT (0x24), 42 bytes
pub const LUT_BB: u8 = 0x24;

// Timing and voltage

/// PLL control (0x30)
///
/// Requires 1 byte selecting the frame rate.
pub const PLL_CONTROL: u8 = 0x30;

/// VCOM and data interval setting (0x50)
///
/// Requires 1 byte. Also selects the border waveform:
/// `0x97` draws a white border, `0xD7` leaves the border untouched.
pub const VCOM_DATA_INTERVAL: u8 = 0x50;

/// Resolution setting (0x61)
///
/// Requires 4 bytes: width and height, each split big-endian.
pub const RESOLUTION_SETTING: u8 = 0x61;

/// Get status (0x71)
///
/// Only used when the BUSY line is polled instead of interrupt driven.
pub const GET_STATUS: u8 = 0x71;

/// VCOM_DC setting (0x82)
///
/// Requires 1 byte.
pub const VCOM_DC_SETTING: u8 = 0x82;

// Partial update

/// Partial window (0x90)
///
/// Requires 9 bytes: horizontal start/end and vertical start/end, each split
/// big-endian, followed by a scan flag byte.
pub const PARTIAL_WINDOW: u8 = 0x90;

/// Partial in (0x91): restrict updates to the partial window
pub const PARTIAL_IN: u8 = 0x91;

/// Partial out (0x92): update the whole panel
pub const PARTIAL_OUT: u8 = 0x92;

/// Border setting for full refreshes: white border, VCOM interval 10
pub const BORDER_WHITE: u8 = 0x97;

/// Border setting for partial refreshes: border left untouched
pub const BORDER_UNCHANGED: u8 = 0xD7;
