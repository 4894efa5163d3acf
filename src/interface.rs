//! Hardware interface abstraction
//!
//! This module provides the [`DisplayInterface`] trait and the [`Interface`] struct
//! for communicating with the UC8176 controller over SPI.
//!
//! ## Hardware Requirements
//!
//! The UC8176 requires:
//! - SPI bus (MOSI + SCK, chip select handled by the [`SpiDevice`])
//! - 3 GPIO pins:
//!   - **DC**: Data/Command select (output)
//!   - **RST**: Reset (output, active low)
//!   - **BUSY**: Busy status (input, low while the controller is busy)
//!
//! BUSY is consumed through the [`BusyLine`] trait. [`PolledBusy`] samples the pin
//! directly; with the `std` feature,
//! [`InterruptBusy`](crate::busy::InterruptBusy) waits for a rising-edge
//! notification pushed from an interrupt handler.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use epd_status::{DisplayInterface, Interface, PolledBusy};
//! # use core::convert::Infallible;
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
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let mut delay = MockDelay;
//! // Create interface with SPI, GPIO pins and a polled busy line
//! let mut interface = Interface::new(MockSpi, MockPin, MockPin, PolledBusy::new(MockPin));
//!
//! // Power on and wait for the booster
//! let _ = interface.arm_busy();
//! let _ = interface.send_command(0x04);
//! let _ = interface.busy_wait(&mut delay, 10_000);
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::command::GET_STATUS;

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Trait for hardware interface to the UC8176 controller
///
/// This trait abstracts over different hardware implementations,
/// allowing the [`PanelDriver`](crate::driver::PanelDriver) to work with any
/// SPI + GPIO implementation that satisfies embedded-hal traits.
///
/// ## Implementing
///
/// For most cases, use the provided [`Interface`] struct. Test code implements
/// this trait on recording mocks.
pub trait DisplayInterface {
    /// Error type for interface operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Send a command byte to the controller
    ///
    /// The implementation must:
    /// 1. Set DC pin low (command mode)
    /// 2. Send the command byte over SPI
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication or GPIO fails.
    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error>;

    /// Send data bytes to the controller
    ///
    /// The implementation must:
    /// 1. Set DC pin high (data mode)
    /// 2. Send the data bytes over SPI
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication or GPIO fails.
    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Perform hardware reset
    ///
    /// Pulses RST low then high `cycles` times, holding each level for
    /// `pulse_ms` milliseconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the reset pin cannot be driven.
    fn reset<D: DelayNs>(
        &mut self,
        delay: &mut D,
        cycles: u8,
        pulse_ms: u32,
    ) -> InterfaceResult<(), Self::Error>;

    /// Discard any stale ready notification
    ///
    /// Must be called before the command that asserts BUSY, so a ready edge from a
    /// previous operation cannot satisfy the next wait.
    ///
    /// # Errors
    ///
    /// Returns an error if the busy source is unusable.
    fn arm_busy(&mut self) -> InterfaceResult<(), Self::Error>;

    /// Wait for the controller to release BUSY
    ///
    /// Returns `Ok(true)` when the controller is idle and `Ok(false)` if
    /// `timeout_ms` elapsed first. A timeout of 0 waits forever.
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication, GPIO or the busy source fails.
    fn busy_wait<D: DelayNs>(
        &mut self,
        delay: &mut D,
        timeout_ms: u32,
    ) -> InterfaceResult<bool, Self::Error>;
}

/// Source of BUSY readiness
///
/// Implementations either sample the pin ([`PolledBusy`]) or wait for a
/// notification raised by an interrupt handler.
pub trait BusyLine {
    /// Error type of the busy source
    type Error: Debug;

    /// Interval between status polls, or `None` when readiness is pushed
    ///
    /// When polling, [`Interface`] issues a `GET_STATUS` command before each
    /// sample, as the controller only refreshes BUSY in response to it.
    fn poll_interval_ms(&self) -> Option<u32>;

    /// Drop any pending ready notification
    fn arm(&mut self) -> InterfaceResult<(), Self::Error>;

    /// Wait up to `timeout_ms` (0 = forever) for the controller to become idle
    fn wait_ready<D: DelayNs>(
        &mut self,
        delay: &mut D,
        timeout_ms: u32,
    ) -> InterfaceResult<bool, Self::Error>;
}

/// Default interval between BUSY samples when polling, in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 100;

/// Busy line sampled directly from an input pin
///
/// The UC8176 pulls BUSY low while it is working.
pub struct PolledBusy<P> {
    pin: P,
    poll_interval_ms: u32,
}

impl<P: InputPin> PolledBusy<P> {
    /// Poll `pin` every [`DEFAULT_POLL_INTERVAL_MS`]
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Set the polling interval in milliseconds (minimum 1)
    pub fn set_poll_interval(&mut self, interval_ms: u32) -> &mut Self {
        self.poll_interval_ms = interval_ms.max(1);
        self
    }
}

impl<P: InputPin> BusyLine for PolledBusy<P> {
    type Error = P::Error;

    fn poll_interval_ms(&self) -> Option<u32> {
        Some(self.poll_interval_ms)
    }

    fn arm(&mut self) -> InterfaceResult<(), Self::Error> {
        Ok(())
    }

    /// Sample the pin once and sleep through `timeout_ms` if it reads busy
    ///
    /// BUSY only changes in response to a status command, so a second sample
    /// before the next poll would read the same level.
    fn wait_ready<D: DelayNs>(
        &mut self,
        delay: &mut D,
        timeout_ms: u32,
    ) -> InterfaceResult<bool, Self::Error> {
        if self.pin.is_high()? {
            return Ok(true);
        }
        delay.delay_ms(timeout_ms);
        Ok(false)
    }
}

/// Errors that can occur at the interface level
///
/// Generic over SPI, GPIO and busy-source error types.
#[derive(Debug)]
pub enum InterfaceError<SpiErr, PinErr, BusyErr> {
    /// SPI communication error
    Spi(SpiErr),
    /// GPIO pin error
    Pin(PinErr),
    /// Busy source error
    Busy(BusyErr),
}

impl<SpiErr: Debug, PinErr: Debug, BusyErr: Debug> core::fmt::Display
    for InterfaceError<SpiErr, PinErr, BusyErr>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI error: {e:?}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
            Self::Busy(e) => write!(f, "Busy line error: {e:?}"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug, BusyErr: Debug> core::error::Error
    for InterfaceError<SpiErr, PinErr, BusyErr>
{
}

/// Hardware interface implementation for the UC8176
///
/// Implements [`DisplayInterface`] for embedded-hal v1.0 SPI and GPIO traits.
/// The instance owns the bus device and the busy source for its whole lifetime;
/// nothing else talks to the controller concurrently.
///
/// ## Type Parameters
///
/// * `SPI` - SPI device implementing [`SpiDevice`]
/// * `DC` - Data/Command pin implementing [`OutputPin`]
/// * `RST` - Reset pin implementing [`OutputPin`]
/// * `BUSY` - Busy source implementing [`BusyLine`]
pub struct Interface<SPI, DC, RST, BUSY> {
    /// SPI device for communication
    spi: SPI,
    /// Data/Command select pin (low=command, high=data)
    dc: DC,
    /// Reset pin (active low)
    rst: RST,
    /// Busy source
    busy: BUSY,
}

impl<SPI, DC, RST, BUSY> Interface<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: BusyLine,
{
    /// Create a new Interface
    ///
    /// # Arguments
    ///
    /// * `spi` - SPI device (must implement [`SpiDevice`])
    /// * `dc` - Data/Command pin (output, low=command, high=data)
    /// * `rst` - Reset pin (output, active low)
    /// * `busy` - Busy source
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY) -> Self {
        Self { spi, dc, rst, busy }
    }

    /// Release the bus device, pins and busy source
    pub fn release(self) -> (SPI, DC, RST, BUSY) {
        (self.spi, self.dc, self.rst, self.busy)
    }
}

impl<SPI, DC, RST, BUSY, PinErr> DisplayInterface for Interface<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: BusyLine,
    PinErr: Debug,
{
    type Error = InterfaceError<SPI::Error, PinErr, BUSY::Error>;

    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error> {
        self.dc.set_low().map_err(InterfaceError::Pin)?;
        self.spi.write(&[command]).map_err(InterfaceError::Spi)?;
        Ok(())
    }

    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.dc.set_high().map_err(InterfaceError::Pin)?;
        self.spi.write(data).map_err(InterfaceError::Spi)?;
        Ok(())
    }

    fn reset<D: DelayNs>(
        &mut self,
        delay: &mut D,
        cycles: u8,
        pulse_ms: u32,
    ) -> InterfaceResult<(), Self::Error> {
        for _ in 0..cycles {
            self.rst.set_low().map_err(InterfaceError::Pin)?;
            delay.delay_ms(pulse_ms);
            self.rst.set_high().map_err(InterfaceError::Pin)?;
            delay.delay_ms(pulse_ms);
        }
        Ok(())
    }

    fn arm_busy(&mut self) -> InterfaceResult<(), Self::Error> {
        self.busy.arm().map_err(InterfaceError::Busy)
    }

    fn busy_wait<D: DelayNs>(
        &mut self,
        delay: &mut D,
        timeout_ms: u32,
    ) -> InterfaceResult<bool, Self::Error> {
        let Some(step) = self.busy.poll_interval_ms() else {
            return self
                .busy
                .wait_ready(delay, timeout_ms)
                .map_err(InterfaceError::Busy);
        };

        let step = step.max(1);
        let mut waited = 0u32;
        loop {
            self.send_command(GET_STATUS)?;
            if self
                .busy
                .wait_ready(delay, step)
                .map_err(InterfaceError::Busy)?
            {
                return Ok(true);
            }
            waited = waited.saturating_add(step);
            if timeout_ms > 0 && waited >= timeout_ms {
                return Ok(false);
            }
        }
    }
}
