//! UC8176 panel driver
//!
//! [`PanelDriver`] owns the [`DisplayInterface`] for the duration of a wake cycle and
//! tracks which waveform set is currently loaded. Mode switches only reprogram the
//! controller when the requested mode differs from the loaded one.
//!
//! ```text
//! Undefined ──set_mode_full──▶ Full ◀──────▶ Partial ◀──set_mode_partial── Undefined
//! ```

use embedded_hal::delay::DelayNs;
use log::{debug, error, info, warn};

use crate::command::{
    BOOSTER_SOFT_START, DATA_START_TRANSMISSION_1, DATA_START_TRANSMISSION_2, DISPLAY_REFRESH,
    PANEL_SETTING, PARTIAL_IN, PARTIAL_OUT, PARTIAL_WINDOW, PLL_CONTROL, POWER_OFF, POWER_ON,
    POWER_SETTING, RESOLUTION_SETTING, VCOM_DATA_INTERVAL, VCOM_DC_SETTING,
};
use crate::config::{BusyTimeoutPolicy, Config, Dimensions};
use crate::error::Error;
use crate::interface::DisplayInterface;
use crate::lut::{LUT_FULL, LUT_PARTIAL, WaveformTable};

type DriverResult<I> = core::result::Result<(), Error<I>>;

/// Waveform set currently programmed into the controller
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PanelMode {
    /// Nothing programmed since `init`
    #[default]
    Undefined,
    /// Full refresh waveforms, white border, partial window disabled
    Full,
    /// Partial refresh waveforms, border untouched, partial window enabled
    Partial,
}

/// Driver for a UC8176 e-paper controller
///
/// # Example
///
/// ```rust,no_run
/// # use core::convert::Infallible;
/// # use embedded_hal::delay::DelayNs;
/// # use embedded_hal::digital::{InputPin, OutputPin};
/// # use embedded_hal::spi::{Operation, SpiDevice};
/// use epd_status::{Builder, Interface, PanelDriver, PolledBusy};
/// # struct MockSpi;
/// # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
/// # impl SpiDevice for MockSpi {
/// #     fn transaction(
/// #         &mut self,
/// #         _operations: &mut [Operation<'_, u8>],
/// #     ) -> Result<(), Self::Error> {
/// #         Ok(())
/// #     }
/// # }
/// # struct MockPin;
/// # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
/// # impl OutputPin for MockPin {
/// #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// # }
/// # impl InputPin for MockPin {
/// #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(true) }
/// #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(false) }
/// # }
/// # struct MockDelay;
/// # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
/// # let mut delay = MockDelay;
/// let interface = Interface::new(MockSpi, MockPin, MockPin, PolledBusy::new(MockPin));
/// let config = match Builder::new().build() {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// let mut driver = PanelDriver::new(interface, config);
/// let frame = [0xFFu8; 15_000];
///
/// if driver.init(&mut delay).is_ok() {
///     let _ = driver.set_mode_full();
///     let _ = driver.display_full(&frame);
///     let _ = driver.refresh(&mut delay);
///     let _ = driver.turn_off(&mut delay);
/// }
/// ```
#[derive(Debug)]
pub struct PanelDriver<I>
where
    I: DisplayInterface,
{
    /// Hardware interface
    interface: I,
    /// Panel configuration
    config: Config,
    /// Loaded waveform set
    mode: PanelMode,
    /// Busy waits that expired since construction
    busy_timeouts: u32,
}

impl<I> PanelDriver<I>
where
    I: DisplayInterface,
{
    /// Create a driver; nothing is sent until [`init`](Self::init)
    pub fn new(interface: I, config: Config) -> Self {
        Self {
            interface,
            config,
            mode: PanelMode::Undefined,
            busy_timeouts: 0,
        }
    }

    /// Reset the controller and run the power-on sequence
    ///
    /// Pulses reset, programs power and booster settings, powers the panel on,
    /// then sets panel configuration, PLL, resolution, VCOM_DC and a partial window
    /// covering the whole screen. Any interface failure is returned and leaves the
    /// driver in [`PanelMode::Undefined`].
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> DriverResult<I> {
        info!("initializing panel");
        self.mode = PanelMode::Undefined;

        self.interface
            .reset(delay, self.config.reset_cycles, self.config.reset_pulse_ms)
            .map_err(Error::Interface)?;

        let power = self.config.power_settings;
        self.command(POWER_SETTING, &power)?;
        let booster = self.config.booster_soft_start;
        self.command(BOOSTER_SOFT_START, &booster)?;

        self.arm_busy()?;
        self.command(POWER_ON, &[])?;
        self.wait_busy(delay)?;

        self.command(PANEL_SETTING, &[self.config.panel_setting])?;
        self.command(PLL_CONTROL, &[self.config.pll])?;
        let resolution = resolution_payload(self.config.dimensions);
        self.command(RESOLUTION_SETTING, &resolution)?;
        self.command(VCOM_DC_SETTING, &[self.config.vcom_dc])?;
        let window = partial_window_payload(self.config.dimensions);
        self.command(PARTIAL_WINDOW, &window)?;

        info!(
            "panel initialized ({}x{})",
            self.config.dimensions.width, self.config.dimensions.height
        );
        Ok(())
    }

    /// Send one command followed by its parameter bytes
    ///
    /// Every controller transaction goes through here. An empty `data` slice sends
    /// the opcode alone.
    pub fn command(&mut self, opcode: u8, data: &[u8]) -> DriverResult<I> {
        self.interface.send_command(opcode).map_err(Error::Interface)?;
        if !data.is_empty() {
            self.interface.send_data(data).map_err(Error::Interface)?;
        }
        Ok(())
    }

    /// Load the full refresh waveforms and disable the partial window
    ///
    /// No-op when already in [`PanelMode::Full`].
    pub fn set_mode_full(&mut self) -> DriverResult<I> {
        if self.mode == PanelMode::Full {
            return Ok(());
        }
        self.load_waveforms(&LUT_FULL)?;
        self.command(PARTIAL_OUT, &[])?;
        self.command(VCOM_DATA_INTERVAL, &[self.config.border_full])?;
        debug!("mode {:?} -> Full", self.mode);
        self.mode = PanelMode::Full;
        Ok(())
    }

    /// Load the partial refresh waveforms and enable the partial window
    ///
    /// No-op when already in [`PanelMode::Partial`].
    pub fn set_mode_partial(&mut self) -> DriverResult<I> {
        if self.mode == PanelMode::Partial {
            return Ok(());
        }
        self.load_waveforms(&LUT_PARTIAL)?;
        self.command(PARTIAL_IN, &[])?;
        self.command(VCOM_DATA_INTERVAL, &[self.config.border_partial])?;
        debug!("mode {:?} -> Partial", self.mode);
        self.mode = PanelMode::Partial;
        Ok(())
    }

    /// Currently loaded waveform set
    pub fn mode(&self) -> PanelMode {
        self.mode
    }

    /// Power the panel on and wait for the booster
    pub fn turn_on<D: DelayNs>(&mut self, delay: &mut D) -> DriverResult<I> {
        self.arm_busy()?;
        self.command(POWER_ON, &[])?;
        self.wait_busy(delay)
    }

    /// Power the panel off and wait for the discharge
    pub fn turn_off<D: DelayNs>(&mut self, delay: &mut D) -> DriverResult<I> {
        self.arm_busy()?;
        self.command(POWER_OFF, &[])?;
        self.wait_busy(delay)
    }

    /// Transmit the frame shown by the next full refresh
    ///
    /// `image` must hold at least one frame (`W*H/8` bytes); extra bytes are ignored.
    pub fn display_full(&mut self, image: &[u8]) -> DriverResult<I> {
        let frame = self.frame(image)?;
        debug!("sending frame ({} bytes)", frame.len());
        self.command(DATA_START_TRANSMISSION_2, frame)
    }

    /// Transmit the reference and target frames of a partial refresh
    ///
    /// Both payloads are validated before anything is sent; the old frame always goes
    /// first.
    pub fn display_partial(&mut self, old: &[u8], new: &[u8]) -> DriverResult<I> {
        let old = self.frame(old)?;
        let new = self.frame(new)?;
        debug!("sending frame pair ({} bytes each)", old.len());
        self.command(DATA_START_TRANSMISSION_1, old)?;
        self.command(DATA_START_TRANSMISSION_2, new)
    }

    /// Transmit only the reference frame of a partial refresh
    pub fn display_partial_old(&mut self, old: &[u8]) -> DriverResult<I> {
        let old = self.frame(old)?;
        self.command(DATA_START_TRANSMISSION_1, old)
    }

    /// Transmit only the target frame of a partial refresh
    pub fn display_partial_new(&mut self, new: &[u8]) -> DriverResult<I> {
        let new = self.frame(new)?;
        self.command(DATA_START_TRANSMISSION_2, new)
    }

    /// Drive the panel with the transmitted frames
    ///
    /// Blocks until BUSY is released, which takes seconds for a full refresh.
    pub fn refresh<D: DelayNs>(&mut self, delay: &mut D) -> DriverResult<I> {
        self.arm_busy()?;
        self.command(DISPLAY_REFRESH, &[])?;
        self.wait_busy(delay)
    }

    /// Number of busy waits that expired
    pub fn busy_timeouts(&self) -> u32 {
        self.busy_timeouts
    }

    /// Panel dimensions
    pub fn dimensions(&self) -> Dimensions {
        self.config.dimensions
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Access the hardware interface
    pub fn interface(&self) -> &I {
        &self.interface
    }

    /// Access the hardware interface mutably
    ///
    /// Commands sent this way bypass the mode tracking.
    pub fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }

    /// Consume the driver and return the hardware interface
    pub fn release(self) -> I {
        self.interface
    }

    fn load_waveforms(&mut self, table: &WaveformTable) -> DriverResult<I> {
        for (register, data) in table.registers() {
            self.command(register, data)?;
        }
        Ok(())
    }

    fn frame<'a>(&self, image: &'a [u8]) -> Result<&'a [u8], Error<I>> {
        let required = self.config.dimensions.buffer_size();
        image.get(..required).ok_or(Error::BufferTooSmall {
            required,
            provided: image.len(),
        })
    }

    fn arm_busy(&mut self) -> DriverResult<I> {
        self.interface.arm_busy().map_err(Error::Interface)
    }

    fn wait_busy<D: DelayNs>(&mut self, delay: &mut D) -> DriverResult<I> {
        let timeout_ms = self.config.busy_timeout_ms;
        let ready = self
            .interface
            .busy_wait(delay, timeout_ms)
            .map_err(Error::Interface)?;
        if ready {
            return Ok(());
        }

        self.busy_timeouts = self.busy_timeouts.saturating_add(1);
        error!("busy flag still asserted after {timeout_ms} ms");
        match self.config.busy_timeout_policy {
            BusyTimeoutPolicy::Proceed => {
                warn!("proceeding with a possibly busy controller");
                Ok(())
            }
            BusyTimeoutPolicy::Abort => Err(Error::BusyTimeout),
        }
    }
}

/// Width and height, each split big-endian
fn resolution_payload(dims: Dimensions) -> [u8; 4] {
    let [w_hi, w_lo] = dims.width.to_be_bytes();
    let [h_hi, h_lo] = dims.height.to_be_bytes();
    [w_hi, w_lo, h_hi, h_lo]
}

/// Window from (0, 0) to (W-1, H-1), scanning inside and outside the window
fn partial_window_payload(dims: Dimensions) -> [u8; 9] {
    let [x_hi, x_lo] = dims.width.saturating_sub(1).to_be_bytes();
    let [y_hi, y_lo] = dims.height.saturating_sub(1).to_be_bytes();
    [0x00, 0x00, x_hi, x_lo, 0x00, 0x00, y_hi, y_lo, 0x01]
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::command::{LUT_BB, LUT_VCOM, POWER_ON};
    use crate::config::Builder;
    use alloc::vec::Vec;

    /// Records every transaction; `timeouts` busy waits report expiry.
    #[derive(Debug, Default)]
    pub(crate) struct MockInterface {
        pub(crate) commands: Vec<u8>,
        pub(crate) command_data: Vec<(u8, Vec<u8>)>,
        pub(crate) arms: u32,
        pub(crate) waits: u32,
        pub(crate) resets: u32,
        pub(crate) timeouts: u32,
        pub(crate) fail_on: Option<u8>,
        last_command: Option<u8>,
    }

    impl MockInterface {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn data_for(&self, command: u8) -> Vec<&[u8]> {
            self.command_data
                .iter()
                .filter(|(cmd, _)| *cmd == command)
                .map(|(_, data)| data.as_slice())
                .collect()
        }

        pub(crate) fn count(&self, command: u8) -> usize {
            self.commands.iter().filter(|c| **c == command).count()
        }
    }

    #[derive(Debug, PartialEq, Eq)]
    pub(crate) struct MockError;

    impl DisplayInterface for MockInterface {
        type Error = MockError;

        fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
            if self.fail_on == Some(command) {
                return Err(MockError);
            }
            self.commands.push(command);
            self.last_command = Some(command);
            Ok(())
        }

        fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
            if let Some(cmd) = self.last_command {
                self.command_data.push((cmd, data.to_vec()));
            }
            Ok(())
        }

        fn reset<D: DelayNs>(
            &mut self,
            _delay: &mut D,
            _cycles: u8,
            _pulse_ms: u32,
        ) -> Result<(), Self::Error> {
            self.resets += 1;
            Ok(())
        }

        fn arm_busy(&mut self) -> Result<(), Self::Error> {
            self.arms += 1;
            Ok(())
        }

        fn busy_wait<D: DelayNs>(
            &mut self,
            _delay: &mut D,
            _timeout_ms: u32,
        ) -> Result<bool, Self::Error> {
            self.waits += 1;
            if self.timeouts > 0 {
                self.timeouts -= 1;
                return Ok(false);
            }
            Ok(true)
        }
    }

    pub(crate) struct MockDelay;

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn test_driver() -> PanelDriver<MockInterface> {
        PanelDriver::new(MockInterface::new(), Builder::new().build().unwrap())
    }

    #[test]
    fn test_init_sequence() {
        let mut driver = test_driver();
        driver.init(&mut MockDelay).unwrap();
        let iface = driver.interface();
        assert_eq!(iface.resets, 1);
        assert_eq!(
            iface.commands,
            alloc::vec![0x01, 0x06, 0x04, 0x00, 0x30, 0x61, 0x82, 0x90]
        );
        assert_eq!(iface.data_for(0x01), alloc::vec![&[0x03, 0x00, 0x2B, 0x2B][..]]);
        assert_eq!(iface.data_for(0x06), alloc::vec![&[0x17, 0x17, 0x17][..]]);
        assert_eq!(iface.data_for(0x61), alloc::vec![&[0x01, 0x90, 0x01, 0x2C][..]]);
        assert_eq!(
            iface.data_for(0x90),
            alloc::vec![&[0x00, 0x00, 0x01, 0x8F, 0x00, 0x00, 0x01, 0x2B, 0x01][..]]
        );
        assert_eq!(iface.arms, 1);
        assert_eq!(iface.waits, 1);
        assert_eq!(driver.mode(), PanelMode::Undefined);
    }

    #[test]
    fn test_init_propagates_interface_failure() {
        let mut iface = MockInterface::new();
        iface.fail_on = Some(POWER_ON);
        let mut driver = PanelDriver::new(iface, Builder::new().build().unwrap());
        let result = driver.init(&mut MockDelay);
        assert!(matches!(result, Err(Error::Interface(MockError))));
        assert_eq!(driver.interface().count(0x00), 0);
    }

    #[test]
    fn test_set_mode_full_twice_programs_once() {
        let mut driver = test_driver();
        driver.set_mode_full().unwrap();
        let after_first = driver.interface().commands.len();
        driver.set_mode_full().unwrap();
        assert_eq!(driver.interface().commands.len(), after_first);
        assert_eq!(driver.interface().count(LUT_VCOM), 1);
        assert_eq!(driver.mode(), PanelMode::Full);
        assert_eq!(
            driver.interface().commands,
            alloc::vec![0x20, 0x21, 0x22, 0x23, 0x24, 0x92, 0x50]
        );
        assert_eq!(driver.interface().data_for(0x50), alloc::vec![&[0x97][..]]);
    }

    #[test]
    fn test_mode_transitions_reprogram_luts() {
        let mut driver = test_driver();
        driver.set_mode_partial().unwrap();
        driver.set_mode_partial().unwrap();
        driver.set_mode_full().unwrap();
        driver.set_mode_partial().unwrap();
        let iface = driver.interface();
        assert_eq!(iface.count(LUT_BB), 3);
        assert_eq!(iface.count(PARTIAL_IN), 2);
        assert_eq!(iface.count(PARTIAL_OUT), 1);
        let vcom = iface.data_for(LUT_VCOM);
        assert_eq!(vcom[0].len(), 44);
        assert_eq!(vcom[0][..6], [0x00, 0x01, 0x20, 0x01, 0x00, 0x01]);
        assert_eq!(iface.data_for(0x50).last(), Some(&&[0xD7][..]));
    }

    #[test]
    fn test_display_partial_sends_old_first() {
        let mut driver = test_driver();
        let old = alloc::vec![0xAAu8; 15_000];
        let new = alloc::vec![0x55u8; 15_000];
        driver.display_partial(&old, &new).unwrap();
        let iface = driver.interface();
        assert_eq!(iface.commands, alloc::vec![0x10, 0x13]);
        assert_eq!(iface.command_data[0].1[0], 0xAA);
        assert_eq!(iface.command_data[1].1[0], 0x55);
    }

    #[test]
    fn test_short_payload_rejected_without_transmission() {
        let mut driver = test_driver();
        let old = alloc::vec![0xFFu8; 15_000];
        let short = alloc::vec![0xFFu8; 100];
        let result = driver.display_partial(&old, &short);
        assert!(matches!(
            result,
            Err(Error::BufferTooSmall {
                required: 15_000,
                provided: 100
            })
        ));
        assert!(driver.interface().commands.is_empty());
    }

    #[test]
    fn test_long_payload_truncated() {
        let mut driver = test_driver();
        let image = alloc::vec![0x00u8; 16_000];
        driver.display_full(&image).unwrap();
        assert_eq!(driver.interface().command_data[0].1.len(), 15_000);
    }

    #[test]
    fn test_refresh_arms_before_command() {
        let mut driver = test_driver();
        driver.refresh(&mut MockDelay).unwrap();
        driver.turn_off(&mut MockDelay).unwrap();
        driver.turn_on(&mut MockDelay).unwrap();
        let iface = driver.interface();
        assert_eq!(iface.commands, alloc::vec![0x12, 0x02, 0x04]);
        assert_eq!(iface.arms, 3);
        assert_eq!(iface.waits, 3);
    }

    #[test]
    fn test_busy_timeout_proceeds_and_counts() {
        let mut iface = MockInterface::new();
        iface.timeouts = 1;
        let mut driver = PanelDriver::new(iface, Builder::new().build().unwrap());
        driver.refresh(&mut MockDelay).unwrap();
        driver.turn_off(&mut MockDelay).unwrap();
        assert_eq!(driver.busy_timeouts(), 1);
        assert_eq!(driver.interface().count(POWER_OFF), 1);
    }

    #[test]
    fn test_busy_timeout_aborts_under_policy() {
        let mut iface = MockInterface::new();
        iface.timeouts = 1;
        let config = Builder::new()
            .busy_timeout_policy(BusyTimeoutPolicy::Abort)
            .build()
            .unwrap();
        let mut driver = PanelDriver::new(iface, config);
        let result = driver.refresh(&mut MockDelay);
        assert!(matches!(result, Err(Error::BusyTimeout)));
        assert_eq!(driver.busy_timeouts(), 1);
    }

    #[test]
    fn test_command_without_data() {
        let mut driver = test_driver();
        driver.command(0x71, &[]).unwrap();
        assert_eq!(driver.interface().commands, alloc::vec![0x71]);
        assert!(driver.interface().command_data.is_empty());
    }
}
