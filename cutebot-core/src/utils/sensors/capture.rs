//! Pulse capture channels and the polling/retry plumbing shared by the
//! ultrasonic and infrared readers.
//!
//! A capture channel records the widths of successive pulses on one pin in
//! ticks (≈µs). Readers open a [`CaptureSession`] for each attempt; the session
//! pauses, clears and releases the channel when dropped, so no path through a
//! measurement leaves it running.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_time::Duration;
use embedded_hal::delay::DelayNs;

use crate::utils::error::DriverError;

/// A pulse-width recorder attached to one input pin.
pub trait PulseCapture {
    /// Start (or restart) recording.
    fn resume(&mut self);
    /// Stop recording without discarding what was captured.
    fn pause(&mut self);
    /// Number of pulses waiting to be read.
    fn len(&self) -> usize;
    /// Take the oldest recorded pulse width.
    fn pop_front(&mut self) -> Option<u16>;
    /// Discard every recorded pulse.
    fn clear(&mut self);
    /// Release the underlying hardware. `resume` re-acquires it.
    fn deinit(&mut self);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cooperative cancellation flag for the capture wait loops.
///
/// Can live in a `static` and be raised from an interrupt or another task.
#[derive(Debug, Default)]
pub struct CancelToken {
    cancelled: AtomicBool,
}

impl CancelToken {
    pub const fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Reasons a capture wait ends without enough pulses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitError {
    Timeout,
    Cancelled,
}

/// Polling budget for one wait on a capture channel.
#[derive(Debug, Clone, Copy)]
pub struct PollBudget {
    pub limit: u32,
    pub interval: Duration,
}

/// Exclusive, self-releasing use of a capture channel for one attempt.
pub struct CaptureSession<'c, C: PulseCapture> {
    capture: &'c mut C,
}

impl<'c, C: PulseCapture> CaptureSession<'c, C> {
    /// Clear stale pulses and start recording.
    pub fn start(capture: &'c mut C) -> Self {
        capture.clear();
        capture.resume();
        Self { capture }
    }

    /// Poll until at least `min` pulses are recorded, the budget runs out or
    /// the token is raised.
    pub fn wait_for<D: DelayNs>(
        &mut self,
        min: usize,
        budget: PollBudget,
        delay: &mut D,
        cancel: Option<&CancelToken>,
    ) -> Result<(), WaitError> {
        let interval_us = micros_u32(budget.interval);
        for _ in 0..budget.limit {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                return Err(WaitError::Cancelled);
            }
            if self.capture.len() >= min {
                self.capture.pause();
                return Ok(());
            }
            delay.delay_us(interval_us);
        }
        Err(WaitError::Timeout)
    }

    pub fn pop_front(&mut self) -> Option<u16> {
        self.capture.pop_front()
    }
}

impl<C: PulseCapture> Drop for CaptureSession<'_, C> {
    fn drop(&mut self) {
        self.capture.pause();
        self.capture.clear();
        self.capture.deinit();
    }
}

/// Whole microseconds of `d` for `DelayNs::delay_us`, saturating.
pub(crate) fn micros_u32(d: Duration) -> u32 {
    u32::try_from(d.as_micros()).unwrap_or(u32::MAX)
}

/// Outcome of one attempt inside [`retry`].
pub(crate) enum Attempt<T> {
    /// Finished with a value.
    Done(T),
    /// Transient failure; try again if budget remains.
    Retry,
    /// Stop immediately with this error.
    Abort(DriverError),
}

impl<T> From<WaitError> for Attempt<T> {
    fn from(e: WaitError) -> Self {
        match e {
            WaitError::Timeout => Attempt::Retry,
            WaitError::Cancelled => Attempt::Abort(DriverError::Cancelled),
        }
    }
}

/// Run `attempt` up to `max_attempts` times, replacing the self-recursive
/// retry of a blocking sensor read with a bounded loop.
pub(crate) fn retry<T>(
    what: &'static str,
    max_attempts: u8,
    mut attempt: impl FnMut(u8) -> Attempt<T>,
) -> Result<T, DriverError> {
    for n in 0..max_attempts {
        match attempt(n) {
            Attempt::Done(v) => return Ok(v),
            Attempt::Abort(e) => return Err(e),
            Attempt::Retry => tracing::debug!("{} attempt {} failed, retrying", what, n + 1),
        }
    }
    tracing::warn!("{} gave up after {} attempts", what, max_attempts);
    Err(DriverError::RetriesExhausted)
}
