//! Interrupt-driven busy line
//!
//! The BUSY pin's rising edge (controller idle) is reported by an interrupt handler
//! through a [`BusyNotifier`]. The notification lands in a single-slot channel that
//! [`InterruptBusy`] drains before each operation and then waits on.
//!
//! Draining must happen before the command that asserts BUSY. If it happened after,
//! an edge raised by a fast operation could be discarded and the wait would run
//! into its timeout.

use core::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError, TrySendError};
use std::time::Duration;

use embedded_hal::delay::DelayNs;

use crate::interface::BusyLine;

/// Create a connected notifier/receiver pair
///
/// The notifier goes to the interrupt handler; the receiver is handed to
/// [`Interface`](crate::interface::Interface) as its busy source.
pub fn channel() -> (BusyNotifier, InterruptBusy) {
    let (tx, rx) = mpsc::sync_channel(1);
    (BusyNotifier { tx }, InterruptBusy { rx })
}

/// Sending half, called from the BUSY edge interrupt
#[derive(Clone, Debug)]
pub struct BusyNotifier {
    tx: SyncSender<()>,
}

impl BusyNotifier {
    /// Signal that the controller released BUSY
    ///
    /// Never blocks. Returns `false` if a notification was already pending or the
    /// receiver is gone.
    pub fn notify(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(()) | TrySendError::Disconnected(())) => false,
        }
    }
}

/// The notifier side was dropped, so no edge can arrive anymore
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NotifierGone;

impl fmt::Display for NotifierGone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "busy notifier disconnected")
    }
}

impl std::error::Error for NotifierGone {}

/// Receiving half, owned by the interface
#[derive(Debug)]
pub struct InterruptBusy {
    rx: Receiver<()>,
}

impl BusyLine for InterruptBusy {
    type Error = NotifierGone;

    fn poll_interval_ms(&self) -> Option<u32> {
        None
    }

    fn arm(&mut self) -> Result<(), Self::Error> {
        loop {
            match self.rx.try_recv() {
                Ok(()) => {}
                Err(TryRecvError::Empty) => return Ok(()),
                Err(TryRecvError::Disconnected) => return Err(NotifierGone),
            }
        }
    }

    fn wait_ready<D: DelayNs>(
        &mut self,
        _delay: &mut D,
        timeout_ms: u32,
    ) -> Result<bool, Self::Error> {
        if timeout_ms == 0 {
            return self.rx.recv().map(|()| true).map_err(|_| NotifierGone);
        }
        match self
            .rx
            .recv_timeout(Duration::from_millis(u64::from(timeout_ms)))
        {
            Ok(()) => Ok(true),
            Err(RecvTimeoutError::Timeout) => Ok(false),
            Err(RecvTimeoutError::Disconnected) => Err(NotifierGone),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[test]
    fn test_notify_is_single_slot() {
        let (notifier, _busy) = channel();
        assert!(notifier.notify());
        assert!(!notifier.notify());
    }

    #[test]
    fn test_arm_discards_stale_edge() {
        let (notifier, mut busy) = channel();
        notifier.notify();
        busy.arm().unwrap();
        assert!(!busy.wait_ready(&mut NoDelay, 20).unwrap());
    }

    #[test]
    fn test_wait_receives_edge_from_other_thread() {
        let (notifier, mut busy) = channel();
        busy.arm().unwrap();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            notifier.notify();
        });
        assert!(busy.wait_ready(&mut NoDelay, 5_000).unwrap());
        handle.join().unwrap();
    }

    #[test]
    fn test_dropped_notifier_is_an_error() {
        let (notifier, mut busy) = channel();
        drop(notifier);
        assert_eq!(busy.arm(), Err(NotifierGone));
        assert_eq!(busy.wait_ready(&mut NoDelay, 10), Err(NotifierGone));
    }

    #[test]
    fn test_notify_without_receiver() {
        let (notifier, busy) = channel();
        drop(busy);
        assert!(!notifier.notify());
    }
}
