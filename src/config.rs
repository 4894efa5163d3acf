//! Panel configuration types and builder

pub use crate::error::{BuilderError, MAX_GATE_OUTPUTS, MAX_SOURCE_OUTPUTS};

/// Panel dimensions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    /// Width in pixels (source outputs)
    pub width: u16,
    /// Height in pixels (gate outputs)
    pub height: u16,
}

impl Dimensions {
    /// The 4.2" 400×300 panel
    pub const PANEL_400X300: Self = Self {
        width: 400,
        height: 300,
    };

    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if:
    /// - width == 0 or width > MAX_SOURCE_OUTPUTS
    /// - height == 0 or height > MAX_GATE_OUTPUTS
    /// - width % 8 != 0 (rows must be byte-aligned on the wire)
    pub fn new(width: u16, height: u16) -> Result<Self, BuilderError> {
        if width == 0 || width > MAX_SOURCE_OUTPUTS || !width.is_multiple_of(8) {
            return Err(BuilderError::InvalidDimensions { width, height });
        }
        if height == 0 || height > MAX_GATE_OUTPUTS {
            return Err(BuilderError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Size of one frame in bytes
    pub fn buffer_size(&self) -> usize {
        (self.width as usize * self.height as usize).div_ceil(8)
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::PANEL_400X300
    }
}

/// What the driver does when BUSY does not clear in time
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BusyTimeoutPolicy {
    /// Log the timeout, count it, and keep issuing commands
    #[default]
    Proceed,
    /// Fail the operation with [`Error::BusyTimeout`](crate::Error::BusyTimeout)
    Abort,
}

/// Panel configuration
///
/// This struct holds the power-on parameters and timing of the UC8176
/// controller. Use [`Builder`] to create a Config.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Panel dimensions
    pub dimensions: Dimensions,
    /// Power setting (4 bytes for command 0x01)
    pub power_settings: [u8; 4],
    /// Booster soft-start settings (3 bytes for command 0x06)
    pub booster_soft_start: [u8; 3],
    /// Panel setting byte (command 0x00)
    pub panel_setting: u8,
    /// PLL control byte (command 0x30)
    pub pll: u8,
    /// VCOM_DC byte (command 0x82)
    pub vcom_dc: u8,
    /// Border/VCOM interval byte for full refresh mode
    pub border_full: u8,
    /// Border/VCOM interval byte for partial refresh mode
    pub border_partial: u8,
    /// Number of reset pulses issued by `init`
    pub reset_cycles: u8,
    /// Duration of each reset level in milliseconds
    pub reset_pulse_ms: u32,
    /// Busy-wait timeout in milliseconds
    pub busy_timeout_ms: u32,
    /// Reaction to an expired busy wait
    pub busy_timeout_policy: BusyTimeoutPolicy,
    /// Number of wake cycles per full refresh (N); cycle 0 of every N is full
    pub full_refresh_interval: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dimensions: Dimensions::PANEL_400X300,
            power_settings: [0x03, 0x00, 0x2B, 0x2B],
            booster_soft_start: [0x17, 0x17, 0x17],
            panel_setting: 0xBF,
            pll: 0x3C,
            vcom_dc: 0x12,
            border_full: crate::command::BORDER_WHITE,
            border_partial: crate::command::BORDER_UNCHANGED,
            reset_cycles: 3,
            reset_pulse_ms: 10,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            busy_timeout_policy: BusyTimeoutPolicy::Proceed,
            full_refresh_interval: DEFAULT_FULL_REFRESH_INTERVAL,
        }
    }
}

/// Default timeout for busy-wait in milliseconds
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 10_000;

/// Default number of wake cycles between two full refreshes
pub const DEFAULT_FULL_REFRESH_INTERVAL: u8 = 15;

/// Builder for constructing panel configuration
///
/// # Example
///
/// ```rust
/// use epd_status::{Builder, BusyTimeoutPolicy, Dimensions};
///
/// let config = match Builder::new()
///     .dimensions(Dimensions::PANEL_400X300)
///     .busy_timeout_policy(BusyTimeoutPolicy::Abort)
///     .full_refresh_interval(10)
///     .build()
/// {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// assert_eq!(config.full_refresh_interval, 10);
/// ```
#[must_use]
#[derive(Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    /// Create a new Builder with the 400×300 panel defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set panel dimensions
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.config.dimensions = dims;
        self
    }

    /// Set the power setting parameters
    pub fn power_settings(mut self, values: [u8; 4]) -> Self {
        self.config.power_settings = values;
        self
    }

    /// Set booster soft-start parameters
    pub fn booster_soft_start(mut self, values: [u8; 3]) -> Self {
        self.config.booster_soft_start = values;
        self
    }

    /// Set the panel setting byte
    pub fn panel_setting(mut self, value: u8) -> Self {
        self.config.panel_setting = value;
        self
    }

    /// Set the PLL control byte
    pub fn pll(mut self, value: u8) -> Self {
        self.config.pll = value;
        self
    }

    /// Set the VCOM_DC byte
    pub fn vcom_dc(mut self, value: u8) -> Self {
        self.config.vcom_dc = value;
        self
    }

    /// Set the border bytes used in full and partial mode
    pub fn border(mut self, full: u8, partial: u8) -> Self {
        self.config.border_full = full;
        self.config.border_partial = partial;
        self
    }

    /// Set the reset sequence (pulse count and per-level duration)
    pub fn reset_sequence(mut self, cycles: u8, pulse_ms: u32) -> Self {
        self.config.reset_cycles = cycles;
        self.config.reset_pulse_ms = pulse_ms;
        self
    }

    /// Set the busy-wait timeout in milliseconds
    pub fn busy_timeout_ms(mut self, value: u32) -> Self {
        self.config.busy_timeout_ms = value;
        self
    }

    /// Set the reaction to an expired busy wait
    pub fn busy_timeout_policy(mut self, policy: BusyTimeoutPolicy) -> Self {
        self.config.busy_timeout_policy = policy;
        self
    }

    /// Set the number of wake cycles per full refresh
    pub fn full_refresh_interval(mut self, value: u8) -> Self {
        self.config.full_refresh_interval = value;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if the dimensions exceed the
    /// controller, and `BuilderError::InvalidRefreshInterval` if the interval is 0.
    pub fn build(self) -> Result<Config, BuilderError> {
        let dims = self.config.dimensions;
        Dimensions::new(dims.width, dims.height)?;
        if self.config.full_refresh_interval == 0 {
            return Err(BuilderError::InvalidRefreshInterval);
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_buffer_size() {
        assert_eq!(Dimensions::PANEL_400X300.buffer_size(), 15_000);
        assert_eq!(Dimensions::new(8, 1).unwrap().buffer_size(), 1);
    }

    #[test]
    fn test_dimensions_rejects_unaligned_width() {
        assert_eq!(
            Dimensions::new(401, 300),
            Err(BuilderError::InvalidDimensions {
                width: 401,
                height: 300
            })
        );
    }

    #[test]
    fn test_dimensions_rejects_oversize() {
        assert!(Dimensions::new(408, 300).is_err());
        assert!(Dimensions::new(400, 301).is_err());
        assert!(Dimensions::new(0, 10).is_err());
        assert!(Dimensions::new(8, 0).is_err());
    }

    #[test]
    fn test_builder_defaults_match_panel() {
        let config = Builder::new().build().unwrap();
        assert_eq!(config.dimensions, Dimensions::PANEL_400X300);
        assert_eq!(config.busy_timeout_ms, 10_000);
        assert_eq!(config.full_refresh_interval, 15);
        assert_eq!(config.reset_cycles, 3);
        assert_eq!(config.busy_timeout_policy, BusyTimeoutPolicy::Proceed);
    }

    #[test]
    fn test_builder_rejects_zero_interval() {
        let result = Builder::new().full_refresh_interval(0).build();
        assert_eq!(result, Err(BuilderError::InvalidRefreshInterval));
    }

    #[test]
    fn test_builder_rejects_bad_dimensions() {
        let result = Builder::new()
            .dimensions(Dimensions {
                width: 12,
                height: 10,
            })
            .build();
        assert!(matches!(result, Err(BuilderError::InvalidDimensions { .. })));
    }
}
