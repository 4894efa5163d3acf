//! State kept across deep sleep
//!
//! The scheduler needs two values that survive a deep-sleep wake but not a power
//! loss: the position inside the full-refresh interval, and the model that was last
//! sent to the panel. Where they live (RTC memory, flash, a file) is up to the
//! [`ViewStore`] implementation.
//!
//! Whether a boot is cold is decided by the platform, not by this crate. Call
//! [`init_store`] once per boot with the platform's reset reason.

use log::info;

use crate::view::ViewModel;

/// Storage for the refresh scheduler
pub trait ViewStore {
    /// Forget everything: counter 0, baseline model
    fn cold_boot_init(&mut self);

    /// Cycles since the last full refresh
    fn view_counter(&self) -> u8;

    /// Store the cycle counter
    fn set_view_counter(&mut self, counter: u8);

    /// Model currently shown on the panel
    fn last_view(&self) -> ViewModel;

    /// Store the model currently shown on the panel
    fn set_last_view(&mut self, model: ViewModel);
}

/// Why the device booted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetReason {
    /// Power applied
    PowerOn,
    /// Timer or external wake from deep sleep
    DeepSleepWake,
    /// Watchdog, brownout, software reset and the like
    Other,
}

/// Initialize `store` unless the device woke from deep sleep
///
/// Returns whether the store was reset.
pub fn init_store<S: ViewStore + ?Sized>(store: &mut S, reason: ResetReason) -> bool {
    if reason == ResetReason::DeepSleepWake {
        return false;
    }
    info!("{:?} reset, initializing persisted view state", reason);
    store.cold_boot_init();
    true
}

/// [`ViewStore`] backed by plain memory
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryStore {
    view_counter: u8,
    last_view: ViewModel,
}

impl MemoryStore {
    /// Store in the cold-boot state
    pub const fn new() -> Self {
        Self {
            view_counter: 0,
            last_view: ViewModel::baseline(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewStore for MemoryStore {
    fn cold_boot_init(&mut self) {
        *self = Self::new();
    }

    fn view_counter(&self) -> u8 {
        self.view_counter
    }

    fn set_view_counter(&mut self, counter: u8) {
        self.view_counter = counter;
    }

    fn last_view(&self) -> ViewModel {
        self.last_view
    }

    fn set_last_view(&mut self, model: ViewModel) {
        self.last_view = model;
    }
}

impl<S: ViewStore + ?Sized> ViewStore for &mut S {
    fn cold_boot_init(&mut self) {
        (**self).cold_boot_init();
    }

    fn view_counter(&self) -> u8 {
        (**self).view_counter()
    }

    fn set_view_counter(&mut self, counter: u8) {
        (**self).set_view_counter(counter);
    }

    fn last_view(&self) -> ViewModel {
        (**self).last_view()
    }

    fn set_last_view(&mut self, model: ViewModel) {
        (**self).set_last_view(model);
    }
}
