//! Recurring background task with cancellation
//!
//! A [`Ticker`] owns one named thread that runs a task after an initial delay
//! and then on a fixed interval. The control channel doubles as the
//! cancellation token: sending `Shutdown` or dropping the ticker ends the loop.
//! A `Wake` signal runs the task early without queueing extra runs.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender, TrySendError};

use crate::error::{GovernorError, GovernorResult};

/// Control messages understood by the ticker thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickerSignal {
    Wake,
    Shutdown,
}

/// Returned by the task to keep or end the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFlow {
    Continue,
    Stop,
}

/// Handle to a running ticker thread
#[derive(Debug)]
pub struct Ticker {
    name: String,
    control: Sender<TickerSignal>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Start the ticker thread
    pub fn spawn<F>(
        name: &str,
        initial_delay: Duration,
        interval: Duration,
        mut task: F,
    ) -> GovernorResult<Self>
    where
        F: FnMut() -> TickFlow + Send + 'static,
    {
        // Capacity one: a pending wake absorbs any further wakes.
        let (control, signals) = bounded::<TickerSignal>(1);

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let mut wait = initial_delay;
                loop {
                    match signals.recv_timeout(wait) {
                        Ok(TickerSignal::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                        Ok(TickerSignal::Wake) | Err(RecvTimeoutError::Timeout) => {}
                    }

                    if task() == TickFlow::Stop {
                        break;
                    }
                    wait = interval;
                }
                log::trace!("ticker thread exiting");
            })
            .map_err(|e| {
                GovernorError::resource_exhausted(format!("failed to spawn {}: {}", name, e))
            })?;

        log::debug!(
            "ticker '{}' started (delay {:?}, interval {:?})",
            name,
            initial_delay,
            interval
        );

        Ok(Self {
            name: name.to_string(),
            control,
            handle: Some(handle),
        })
    }

    /// Request an early run; returns false when a wake is already pending or
    /// the ticker has ended
    pub fn wake(&self) -> bool {
        match self.control.try_send(TickerSignal::Wake) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Cancel the schedule and wait for an in-flight run to finish
    ///
    /// When called from the ticker thread itself the join is skipped.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        if handle.thread().id() == thread::current().id() {
            let _ = self.control.try_send(TickerSignal::Shutdown);
            return;
        }

        // Fails only when the thread already ended on its own.
        let _ = self.control.send(TickerSignal::Shutdown);
        if handle.join().is_err() {
            log::warn!("ticker '{}' panicked before shutdown", self.name);
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
