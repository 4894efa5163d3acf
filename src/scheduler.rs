//! Full and partial refresh scheduling
//!
//! Every wake cycle shows one [`ViewModel`]. Cycle 0 of every `N` is a full refresh:
//! the new frame is rendered and driven with the strong waveforms, clearing any
//! ghosting. All other cycles are partial: the previously shown model is rendered
//! again to rebuild the frame that is physically on the panel, and the controller
//! gets the old and new frame pair.
//!
//! ```text
//! counter:  0     1        2       ...  N-1      0     1
//! refresh:  full  partial  partial ...  partial  full  partial
//! ```
//!
//! The cycle counter and the shown model are persisted through a
//! [`ViewStore`] only after the refresh went through. A failed cycle leaves the
//! store untouched, so the next wake retries against the same reference frame.
//!
//! With the `std` feature, [`DisplayTask`] runs one cycle on a worker thread.

use embedded_hal::delay::DelayNs;
use log::{error, info};

use crate::canvas::BitCanvas;
use crate::driver::PanelDriver;
use crate::error::{CanvasError, Error};
use crate::interface::DisplayInterface;
use crate::persistence::ViewStore;
use crate::view::{View, ViewModel};

/// Kind of panel update
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshKind {
    /// Full waveforms, single frame
    Full,
    /// Partial waveforms, old and new frame
    Partial,
}

/// Outcome of one successful wake cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleReport {
    /// Update performed
    pub kind: RefreshKind,
    /// Counter persisted for the next cycle
    pub next_counter: u8,
    /// Busy waits that expired during the cycle
    pub busy_timeouts: u32,
}

/// Chooses between full and partial refreshes and runs wake cycles
#[derive(Clone, Debug)]
pub struct RefreshScheduler<V> {
    view: V,
    interval: u8,
}

impl<V: View> RefreshScheduler<V> {
    /// Scheduler doing a full refresh every `interval` cycles
    ///
    /// An interval of 0 is treated as 1, i.e. every refresh is full.
    pub fn new(view: V, interval: u8) -> Self {
        Self {
            view,
            interval: interval.max(1),
        }
    }

    /// Cycles per full refresh
    pub fn interval(&self) -> u8 {
        self.interval
    }

    /// The view used for rendering
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Refresh kind for a cycle starting at `counter`
    pub fn select_mode(&self, counter: u8) -> RefreshKind {
        if counter % self.interval == 0 {
            RefreshKind::Full
        } else {
            RefreshKind::Partial
        }
    }

    /// Counter value following `counter`
    pub fn next_counter(&self, counter: u8) -> u8 {
        ((u16::from(counter) + 1) % u16::from(self.interval)) as u8
    }

    /// Run one wake cycle with caller-provided frame buffers
    ///
    /// Both buffers must hold at least one frame; only the first `W*H/8` bytes are
    /// used. The driver must be initialized. The panel is left powered on.
    pub fn run_cycle_in<I, S, D>(
        &self,
        driver: &mut PanelDriver<I>,
        store: &mut S,
        model: &ViewModel,
        delay: &mut D,
        old_frame: &mut [u8],
        new_frame: &mut [u8],
    ) -> Result<CycleReport, Error<I>>
    where
        I: DisplayInterface,
        S: ViewStore + ?Sized,
        D: DelayNs,
    {
        let result = self.cycle(driver, store, model, delay, old_frame, new_frame);
        if let Err(err) = &result {
            error!("refresh cycle failed: {}", err);
        }
        result
    }

    /// Run one wake cycle with freshly allocated frame buffers
    #[cfg(feature = "alloc")]
    pub fn run_cycle<I, S, D>(
        &self,
        driver: &mut PanelDriver<I>,
        store: &mut S,
        model: &ViewModel,
        delay: &mut D,
    ) -> Result<CycleReport, Error<I>>
    where
        I: DisplayInterface,
        S: ViewStore + ?Sized,
        D: DelayNs,
    {
        let size = driver.dimensions().buffer_size();
        let mut old_frame = alloc::vec![0xFF; size];
        let mut new_frame = alloc::vec![0xFF; size];
        self.run_cycle_in(driver, store, model, delay, &mut old_frame, &mut new_frame)
    }

    fn cycle<I, S, D>(
        &self,
        driver: &mut PanelDriver<I>,
        store: &mut S,
        model: &ViewModel,
        delay: &mut D,
        old_frame: &mut [u8],
        new_frame: &mut [u8],
    ) -> Result<CycleReport, Error<I>>
    where
        I: DisplayInterface,
        S: ViewStore + ?Sized,
        D: DelayNs,
    {
        let counter = store.view_counter();
        let kind = self.select_mode(counter);
        let timeouts_before = driver.busy_timeouts();
        info!("wake cycle {}/{}: {:?} refresh", counter, self.interval, kind);

        match kind {
            RefreshKind::Full => {
                let frame = self.render_into(driver, new_frame, model)?;
                driver.set_mode_full()?;
                driver.display_full(frame)?;
            }
            RefreshKind::Partial => {
                let previous = store.last_view();
                let old = self.render_into(driver, old_frame, &previous)?;
                driver.set_mode_partial()?;
                let new = self.render_into(driver, new_frame, model)?;
                driver.display_partial(old, new)?;
            }
        }
        driver.refresh(delay)?;

        let next_counter = self.next_counter(counter);
        store.set_view_counter(next_counter);
        store.set_last_view(*model);

        Ok(CycleReport {
            kind,
            next_counter,
            busy_timeouts: driver.busy_timeouts().saturating_sub(timeouts_before),
        })
    }

    /// Render `model` into the first frame of `buffer`
    fn render_into<'b, I>(
        &self,
        driver: &PanelDriver<I>,
        buffer: &'b mut [u8],
        model: &ViewModel,
    ) -> Result<&'b [u8], Error<I>>
    where
        I: DisplayInterface,
    {
        let dims = driver.dimensions();
        let required = dims.buffer_size();
        let provided = buffer.len();
        let frame = buffer
            .get_mut(..required)
            .ok_or(Error::BufferTooSmall { required, provided })?;

        let mut canvas =
            BitCanvas::new(dims.width, dims.height, &mut *frame).map_err(|err| match err {
                CanvasError::InvalidDimensions { width, height } => {
                    Error::InvalidDimensions { width, height }
                }
                CanvasError::BufferSize { required, provided } => {
                    Error::BufferTooSmall { required, provided }
                }
            })?;
        self.view.render(&mut canvas, model);
        Ok(frame)
    }
}

#[cfg(feature = "std")]
pub use task::{DisplayTask, TaskCompletion, TaskError};

#[cfg(feature = "std")]
mod task {
    use core::fmt;
    use std::io;
    use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
    use std::thread;
    use std::time::Duration;

    use log::{debug, info, warn};

    use super::*;

    /// Result handed back by the worker
    ///
    /// Driver and store always come back, whatever happened to the cycle.
    #[derive(Debug)]
    pub struct TaskCompletion<I: DisplayInterface, S> {
        /// The driver, panel powered off if initialization succeeded
        pub driver: PanelDriver<I>,
        /// The store, updated only if the cycle succeeded
        pub store: S,
        /// Outcome of initialization, cycle and power-off
        pub result: Result<CycleReport, Error<I>>,
    }

    /// Failure to hand a model to the worker or to hear back from it
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum TaskError {
        /// The worker thread ended without reporting
        WorkerGone,
        /// The worker did not report in time; it keeps running
        Timeout,
    }

    impl fmt::Display for TaskError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::WorkerGone => write!(f, "display worker ended without reporting"),
                Self::Timeout => write!(f, "display worker did not finish in time"),
            }
        }
    }

    impl std::error::Error for TaskError {}

    /// One wake cycle on a dedicated worker thread
    ///
    /// [`start`](Self::start) spawns the worker, which initializes the panel while
    /// the caller gathers data. [`display`](Self::display) hands over the model and
    /// waits for the worker to refresh the panel and power it off. Both calls
    /// consume the task, so at most one model is ever in flight.
    ///
    /// The caller must not power down before the completion arrived: cutting power
    /// during a refresh leaves the panel in an undefined state.
    pub struct DisplayTask<I: DisplayInterface, S> {
        request: SyncSender<ViewModel>,
        completion: Receiver<TaskCompletion<I, S>>,
        worker: thread::JoinHandle<()>,
    }

    impl<I, S> DisplayTask<I, S>
    where
        I: DisplayInterface + Send + 'static,
        I::Error: Send,
        S: ViewStore + Send + 'static,
    {
        /// Spawn the worker and start initializing the panel
        pub fn start<V, D>(
            mut driver: PanelDriver<I>,
            mut delay: D,
            mut store: S,
            scheduler: RefreshScheduler<V>,
        ) -> io::Result<Self>
        where
            V: View + Send + 'static,
            D: DelayNs + Send + 'static,
        {
            let (request, requests) = mpsc::sync_channel::<ViewModel>(1);
            let (done, completion) = mpsc::sync_channel(1);

            let worker = thread::Builder::new()
                .name("display".into())
                .spawn(move || {
                    let initialized = driver.init(&mut delay);
                    if initialized.is_ok() {
                        info!("panel initialized, waiting for view data");
                    }

                    let Ok(model) = requests.recv() else {
                        debug!("display task dropped before a model arrived");
                        return;
                    };
                    info!("received view data");

                    let result = initialized.and_then(|()| {
                        let cycle =
                            scheduler.run_cycle(&mut driver, &mut store, &model, &mut delay);
                        let off = driver.turn_off(&mut delay);
                        match (cycle, off) {
                            (Ok(report), Ok(())) => Ok(report),
                            (Ok(_), Err(err)) => Err(err),
                            (Err(err), off) => {
                                if let Err(off_err) = off {
                                    warn!("power off after failed cycle: {}", off_err);
                                }
                                Err(err)
                            }
                        }
                    });

                    let _ = done.send(TaskCompletion {
                        driver,
                        store,
                        result,
                    });
                })?;

            Ok(Self {
                request,
                completion,
                worker,
            })
        }

        /// Hand `model` to the worker and wait until the panel is done
        pub fn display(self, model: ViewModel) -> Result<TaskCompletion<I, S>, TaskError> {
            self.request
                .send(model)
                .map_err(|_| TaskError::WorkerGone)?;
            let completion = self.completion.recv().map_err(|_| TaskError::WorkerGone)?;
            let _ = self.worker.join();
            Ok(completion)
        }

        /// Like [`display`](Self::display), but give up waiting after `timeout`
        ///
        /// The worker is not cancelled; a refresh that was started runs to its end.
        pub fn display_timeout(
            self,
            model: ViewModel,
            timeout: Duration,
        ) -> Result<TaskCompletion<I, S>, TaskError> {
            self.request
                .send(model)
                .map_err(|_| TaskError::WorkerGone)?;
            match self.completion.recv_timeout(timeout) {
                Ok(completion) => {
                    let _ = self.worker.join();
                    Ok(completion)
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!("display worker still running after {:?}", timeout);
                    Err(TaskError::Timeout)
                }
                Err(RecvTimeoutError::Disconnected) => Err(TaskError::WorkerGone),
            }
        }
    }
}
