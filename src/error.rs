//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and panel operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`CanvasError`] - Framebuffer construction errors
//! - [`Error`] - Runtime errors during panel operations
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level hardware communication errors
//!
//! Drawing never fails: out-of-range coordinates are clipped silently.
//!
//! ## Example
//!
//! ```
//! use epd_status::{Builder, BuilderError, Dimensions};
//!
//! // Refresh interval must be at least one cycle
//! let result = Builder::new().full_refresh_interval(0).build();
//! assert!(matches!(result, Err(BuilderError::InvalidRefreshInterval)));
//!
//! // Invalid dimensions
//! let result = Dimensions::new(403, 300); // width not byte aligned
//! assert!(result.is_err());
//! ```

use crate::interface::DisplayInterface;

/// Maximum horizontal resolution supported by the UC8176 (source outputs)
pub const MAX_SOURCE_OUTPUTS: u16 = 400;

/// Maximum vertical resolution supported by the UC8176 (gate outputs)
pub const MAX_GATE_OUTPUTS: u16 = 300;

/// Errors that can occur when interacting with the panel
///
/// Generic over the interface type to preserve the specific error type.
#[derive(Debug)]
pub enum Error<I: DisplayInterface> {
    /// Interface error (SPI/GPIO/busy line)
    ///
    /// Wraps the underlying hardware error from the [`DisplayInterface`] implementation.
    Interface(I::Error),
    /// Image payload is smaller than one full frame
    ///
    /// Nothing was transmitted.
    BufferTooSmall {
        /// Required buffer size in bytes
        required: usize,
        /// Provided buffer size in bytes
        provided: usize,
    },
    /// Canvas or panel dimensions do not match
    InvalidDimensions {
        /// Width in pixels
        width: u16,
        /// Height in pixels
        height: u16,
    },
    /// BUSY was still asserted when the wait expired
    ///
    /// Only returned under [`BusyTimeoutPolicy::Abort`](crate::config::BusyTimeoutPolicy::Abort);
    /// the default policy logs and proceeds.
    BusyTimeout,
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(e) => write!(f, "Interface error: {e:?}"),
            Self::BufferTooSmall { required, provided } => {
                write!(
                    f,
                    "Buffer too small: required {required} bytes, provided {provided}"
                )
            }
            Self::InvalidDimensions { width, height } => {
                write!(f, "Invalid dimensions: {width}x{height}")
            }
            Self::BusyTimeout => write!(f, "Timeout waiting for busy line"),
        }
    }
}

impl<I: DisplayInterface + core::fmt::Debug> core::error::Error for Error<I> {}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the driver is created.
#[derive(Debug, PartialEq, Eq)]
pub enum BuilderError {
    /// Invalid dimensions provided
    ///
    /// See [`Dimensions::new()`](crate::config::Dimensions::new) for constraints.
    InvalidDimensions {
        /// Width in pixels
        width: u16,
        /// Height in pixels
        height: u16,
    },
    /// The full refresh interval must be at least 1
    InvalidRefreshInterval,
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => write!(
                f,
                "Invalid dimensions {width}x{height} (max {MAX_SOURCE_OUTPUTS}x{MAX_GATE_OUTPUTS}, width must be multiple of 8)"
            ),
            Self::InvalidRefreshInterval => {
                write!(f, "Full refresh interval must be at least 1")
            }
        }
    }
}

impl core::error::Error for BuilderError {}

/// Errors that can occur when creating a [`BitCanvas`](crate::canvas::BitCanvas)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CanvasError {
    /// Width or height is zero
    InvalidDimensions {
        /// Width in pixels
        width: u16,
        /// Height in pixels
        height: u16,
    },
    /// Buffer length is not exactly `ceil(width * height / 8)`
    BufferSize {
        /// Required buffer size in bytes
        required: usize,
        /// Provided buffer size in bytes
        provided: usize,
    },
}

impl core::fmt::Display for CanvasError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "Invalid canvas dimensions: {width}x{height}")
            }
            Self::BufferSize { required, provided } => write!(
                f,
                "Canvas buffer must be {required} bytes, provided {provided}"
            ),
        }
    }
}

impl core::error::Error for CanvasError {}
