//! E-Paper Status Panel
//!
//! Renders a status screen into a 1-bit framebuffer and drives a UC8176 e-paper
//! controller (400x300), choosing between slow flicker-free full refreshes and fast
//! partial refreshes.
//!
//! ## Features
//!
//! - `no_std` compatible core
//! - `embedded-hal` v1.0 support
//! - GFX-style drawing and text layout on [`BitCanvas`], built-in 5x7 font
//! - `embedded-graphics` integration (with `graphics` feature)
//! - Status screen renderer and heap-allocated frames (with `alloc` feature)
//! - Interrupt-driven busy line and a one-shot display worker (with `std` feature)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use epd_status::{
//!     BitCanvas, Builder, Color, Interface, MemoryStore, PanelDriver, PolledBusy,
//!     RefreshScheduler, ResetReason, View, ViewModel, init_store,
//! };
//!
//! /// Battery charge as a bar across the top of the panel
//! struct ChargeBar;
//!
//! impl View for ChargeBar {
//!     fn render<B>(&self, canvas: &mut BitCanvas<'_, B>, model: &ViewModel)
//!     where
//!         B: AsRef<[u8]> + AsMut<[u8]>,
//!     {
//!         canvas.fill_screen(Color::White);
//!         canvas.fill_rect(0, 0, model.charge * 4, 16, Color::Black);
//!     }
//! }
//!
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
//! let interface = Interface::new(MockSpi, MockPin, MockPin, PolledBusy::new(MockPin));
//! let config = match Builder::new().full_refresh_interval(15).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let interval = config.full_refresh_interval;
//! let mut driver = PanelDriver::new(interface, config);
//!
//! let mut store = MemoryStore::new();
//! init_store(&mut store, ResetReason::PowerOn);
//!
//! // With the `alloc` feature, `StatusView` renders the full status screen and
//! // `run_cycle` allocates the two frames itself.
//! let scheduler = RefreshScheduler::new(ChargeBar, interval);
//! let model = ViewModel {
//!     pv_power_w: 4200.0,
//!     charge: 74,
//!     ..ViewModel::baseline()
//! };
//!
//! let mut old_frame = [0xFF; 400 * 300 / 8];
//! let mut new_frame = [0xFF; 400 * 300 / 8];
//! if driver.init(&mut delay).is_ok() {
//!     let _ = scheduler.run_cycle_in(
//!         &mut driver,
//!         &mut store,
//!         &model,
//!         &mut delay,
//!         &mut old_frame,
//!         &mut new_frame,
//!     );
//!     let _ = driver.turn_off(&mut delay);
//! }
//! ```

#![no_std]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;
#[cfg(any(test, feature = "std"))]
extern crate std;

/// Monochrome color with the panel's inverted bit convention
pub mod color;
/// UC8176 command definitions
pub mod command;
/// Panel configuration types and builder
pub mod config;
/// Error types
pub mod error;
/// Hardware interface abstraction
pub mod interface;
/// Waveform tables for full and partial refresh
pub mod lut;
/// Panel driver state machine
pub mod driver;
/// Interrupt-fed busy line (requires `std` feature)
#[cfg(feature = "std")]
pub mod busy;

/// 1-bit framebuffer and drawing primitives
pub mod canvas;
/// Bitmap fonts
pub mod font;
/// Text layout
pub mod text;
/// Status icons
pub mod icon;
/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

/// View model and status screen
pub mod view;
/// State kept across deep sleep
pub mod persistence;
/// Full/partial refresh scheduling
pub mod scheduler;

pub use canvas::BitCanvas;
pub use color::Color;
pub use config::{
    Builder, BusyTimeoutPolicy, Config, DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_FULL_REFRESH_INTERVAL,
    Dimensions,
};
pub use driver::{PanelDriver, PanelMode};
pub use error::{BuilderError, CanvasError, Error, MAX_GATE_OUTPUTS, MAX_SOURCE_OUTPUTS};
pub use font::{Glyph, GlyphFont};
pub use icon::XBitmap;
pub use interface::{
    BusyLine, DEFAULT_POLL_INTERVAL_MS, DisplayInterface, Interface, InterfaceError, PolledBusy,
};
pub use lut::WaveformTable;
pub use persistence::{MemoryStore, ResetReason, ViewStore, init_store};
pub use scheduler::{CycleReport, RefreshKind, RefreshScheduler};
pub use text::TextBounds;
pub use view::{
    BatteryStatus, ConnectionStatus, Labels, NetworkStatus, RequestStatus, View, ViewConfig,
    ViewFonts, ViewModel,
};

#[cfg(feature = "alloc")]
pub use view::StatusView;

#[cfg(feature = "std")]
pub use busy::{BusyNotifier, InterruptBusy, NotifierGone};
#[cfg(feature = "std")]
pub use scheduler::{DisplayTask, TaskCompletion, TaskError};
